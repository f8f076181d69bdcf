//! Reading article input and turning it into paragraphs.

mod paragraphs;
mod reader;

pub use paragraphs::parse_paragraphs;
pub use reader::{InputReader, MAX_INPUT_SIZE};
