//! Ordered conversion stages over one model
//!
//! A pipeline starts from a source stage that produces the model (a
//! deserializer) and hands it to each following stage in turn. Stages never
//! see each other, only the model and the shared [`Diagnostics`].

use anyhow::Result;
use sms_audio_shared::Diagnostics;

type Source<'a, T> = Box<dyn FnOnce(&mut Diagnostics) -> Result<T> + 'a>;
type Stage<'a, T> = Box<dyn FnOnce(&mut T, &mut Diagnostics) -> Result<()> + 'a>;

pub struct Pipeline<'a, T> {
    source: (&'static str, Source<'a, T>),
    stages: Vec<(&'static str, Stage<'a, T>)>,
}

impl<'a, T> Pipeline<'a, T> {
    pub fn new(name: &'static str, source: impl FnOnce(&mut Diagnostics) -> Result<T> + 'a) -> Self {
        Self {
            source: (name, Box::new(source)),
            stages: Vec::new(),
        }
    }

    /// Append a stage
    pub fn then(
        mut self,
        name: &'static str,
        stage: impl FnOnce(&mut T, &mut Diagnostics) -> Result<()> + 'a,
    ) -> Self {
        self.stages.push((name, Box::new(stage)));
        self
    }

    /// Stage names in run order, source first
    pub fn names(&self) -> Vec<&'static str> {
        std::iter::once(self.source.0)
            .chain(self.stages.iter().map(|(name, _)| *name))
            .collect()
    }

    /// Run every stage, stopping at the first fatal error
    pub fn run(self, diag: &mut Diagnostics) -> Result<T> {
        let (name, source) = self.source;
        let mark = diag.warnings();
        let mut model = source(diag)?;
        tracing::debug!("{}: done, {} warning(s)", name, diag.since(mark));

        for (name, stage) in self.stages {
            let mark = diag.warnings();
            stage(&mut model, diag)?;
            tracing::debug!("{}: done, {} warning(s)", name, diag.since(mark));
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[test]
    fn test_stages_run_in_order() {
        let pipeline = Pipeline::new("source", |_| Ok(vec![1]))
            .then("double", |model: &mut Vec<i32>, _| {
                model.push(model[0] * 2);
                Ok(())
            })
            .then("warn", |model, diag| {
                diag.warn("third stage");
                model.push(3);
                Ok(())
            });
        assert_eq!(pipeline.names(), vec!["source", "double", "warn"]);

        let mut diag = Diagnostics::new();
        assert_eq!(pipeline.run(&mut diag).unwrap(), vec![1, 2, 3]);
        assert_eq!(diag.warnings(), 1);
    }

    #[test]
    fn test_fatal_stage_stops_the_run() {
        let mut reached = false;
        let result = Pipeline::new("source", |_| Ok(0))
            .then("fail", |_, _| bail!("broken"))
            .then("after", |_, _| {
                reached = true;
                Ok(())
            })
            .run(&mut Diagnostics::new());

        assert_eq!(result.unwrap_err().to_string(), "broken");
        assert!(!reached);
    }
}
