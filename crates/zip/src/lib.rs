pub mod entry;
pub mod errors;

mod structs;

pub use entry::ZipArchive;
pub use errors::{FileCompressionType, ZipError};
