//! Input handling: discovering, reading and parsing record files.

pub mod loader;
pub mod parser;
pub mod scanner;

pub use loader::{load_file, load_files};
pub use parser::{parse_files, parse_records};
pub use scanner::{InputScanner, ScanConfig};
