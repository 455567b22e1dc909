pub mod tokenize;
pub mod types;

pub use tokenize::{BashTokenizer, Tokenizer};
pub use types::{Token, TokenKind, tokens_from};
