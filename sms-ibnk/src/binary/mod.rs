//! IBNK binary format
//!
//! - `read` - Parsing banks with per-entity warnings
//! - `write` - Two-pass layout and serialization
//! - `tests` - Round trips and layout checks

mod read;
mod write;

#[cfg(test)]
mod tests;

pub use read::read_ibnk;
pub use write::write_ibnk;
