//! Profile store: the sectioned credentials file and its in-memory form

mod codec;
mod file;
mod types;

pub use codec::{parse, parse_attributes, serialize};
pub use file::ProfileFile;
pub use types::{ProfileAttributes, ProfileSet, DEFAULT_PROFILE};
