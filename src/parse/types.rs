//! Types produced by the tokenizer and consumed by the classifier.

use serde::Serialize;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Quoted string literal, quotes included in the token text.
    String,
    /// Numeric literal.
    Number,
    /// Bare word: argument, option, or path fragment.
    Identifier,
    /// Shell variable reference (`$HOME`, `${name}`) or assignment target.
    Variable,
    /// Punctuation that may be part of a path (`\`, `:`, `.`).
    Punctuation,
    /// Operators, redirections, brackets.
    Operator,
    /// Command names and reserved words.
    Keyword,
    /// Whitespace, comments, and anything without a more specific kind.
    Text,
}

impl TokenKind {
    /// Kinds that accumulate in the classifier's path buffer.
    pub fn is_path_fragment(self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::Punctuation)
    }
}

/// One lexical token of an analysed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the token in the tokenized source.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}

/// Build a token stream from `(kind, text)` pairs, assigning positions as
/// if the texts were laid end to end.
pub fn tokens_from(parts: &[(TokenKind, &str)]) -> Vec<Token> {
    let mut position = 0;
    parts
        .iter()
        .map(|(kind, text)| {
            let token = Token::new(*kind, *text, position);
            position += text.len();
            token
        })
        .collect()
}
