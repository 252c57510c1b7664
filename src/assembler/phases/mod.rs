pub mod types;

pub mod tokenize;

pub use tokenize::{tokenize, tokenize_lines};
