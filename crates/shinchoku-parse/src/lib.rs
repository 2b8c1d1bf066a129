//! Anime release filename parsing.
//!
//! [`parse`] splits a single file or folder name into [`Elements`];
//! [`parse_path`] applies it to a full path, falling back to the parent
//! folders when the filename carries no usable title.

pub mod elements;
pub mod error;
pub mod keyword;
pub mod parser;
pub mod path;
pub mod tokenizer;

pub use elements::{Elements, MediaKind};
pub use error::ParseError;
pub use parser::{parse, parse_folder};
pub use path::{parse_path, parse_with_override, ParsedFilename};
