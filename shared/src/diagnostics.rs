//! Warning counter shared by every stage of a conversion

use std::fmt;

/// Counts recoverable defects found while converting
///
/// Each warning is logged through `tracing` as it is raised. Stages that
/// must fail when anything went wrong compare [`Diagnostics::warnings`]
/// before and after their pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning and count it
    pub fn warn(&mut self, message: impl fmt::Display) {
        tracing::warn!("{}", message);
        self.warnings += 1;
    }

    /// Total warnings raised so far
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Warnings raised since `mark` was taken from [`Diagnostics::warnings`]
    pub fn since(&self, mark: usize) -> usize {
        self.warnings.saturating_sub(mark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_warnings() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.warnings(), 0);
        diag.warn("first");
        let mark = diag.warnings();
        diag.warn(format_args!("second {}", 2));
        diag.warn("third");
        assert_eq!(diag.warnings(), 3);
        assert_eq!(diag.since(mark), 2);
    }
}
