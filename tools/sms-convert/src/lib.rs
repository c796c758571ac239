//! sms-convert library
//!
//! The three errands behind the `sms-convert` binary, usable from other tools:
//! instrument banks ([`ibnk`]), wave banks ([`wsys`]) and single waves
//! ([`wave`]). Each errand reads its input, runs the model through a
//! [`Pipeline`] and writes the output.

pub mod endpoint;
pub mod ibnk;
pub mod pipeline;
pub mod wave;
pub mod wsys;

pub use endpoint::{BankFormat, Endpoint};
pub use pipeline::Pipeline;
