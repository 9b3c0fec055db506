//! Preprocessing-token-level tokenizer for C++20 source, grounded on the
//! restart-loop scanner in `extras/hilite-cxx` and `libhilite`: a flat
//! byte-level scan produces tokens that may still span physical lines,
//! then a post-processing pass splits, coalesces, and rebases them into
//! per-line records.

pub mod lines;
pub mod punctuators;
pub mod scanner;
pub mod splice;

pub use scanner::tokenize_preprocessing_file;

pub use cxxmod_model::{LineRecord, Token, TokenKind};
