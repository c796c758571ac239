//! WSYS binary codec

mod read;
mod write;

pub use read::read_wsys;
pub use write::write_wsys;
