use tree_sitter::{Node, Parser};

use super::types::{Token, TokenKind};
use crate::error::{GadgetError, Result};

/// Splits raw command text into typed tokens.
///
/// Implementations must cover the whole input: concatenating the text of
/// every returned token reproduces the source. Gaps between lexical tokens
/// (whitespace, comments) are returned as [`TokenKind::Text`].
pub trait Tokenizer {
    fn tokenize(&self, source: &str) -> Result<Vec<Token>>;
}

/// Tokenizer backed by the tree-sitter bash grammar.
///
/// Walks the syntax tree leaf-first in source order. Quoted strings,
/// expansions and command names are taken as whole tokens; everything else
/// is classified by its leaf node kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct BashTokenizer;

impl Tokenizer for BashTokenizer {
    fn tokenize(&self, source: &str) -> Result<Vec<Token>> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_bash::LANGUAGE.into())
            .map_err(|e| GadgetError::Tokenize(format!("bash grammar unavailable: {e}")))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| GadgetError::Tokenize("parser produced no syntax tree".into()))?;

        let mut spans = Vec::new();
        collect_spans(tree.root_node(), source, &mut spans);
        Ok(fill_gaps(source, &spans))
    }
}

/// A classified byte range of the source.
type Span = (usize, usize, TokenKind);

fn collect_spans(node: Node, source: &str, out: &mut Vec<Span>) {
    // Zero-width nodes are MISSING insertions from error recovery.
    if node.start_byte() >= node.end_byte() {
        return;
    }
    if let Some(kind) = whole_node_kind(node, source) {
        out.push((node.start_byte(), node.end_byte(), kind));
        return;
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    if children.is_empty() {
        out.push((node.start_byte(), node.end_byte(), leaf_kind(node)));
        return;
    }
    for child in children {
        collect_spans(child, source, out);
    }
}

/// Node kinds taken as a single token without descending into children.
fn whole_node_kind(node: Node, source: &str) -> Option<TokenKind> {
    let kind = match node.kind() {
        "command_name" => TokenKind::Keyword,
        "string" | "raw_string" | "ansi_c_string" | "translated_string" => TokenKind::String,
        "simple_expansion" | "expansion" | "variable_name" | "special_variable_name" => {
            TokenKind::Variable
        }
        "number" => TokenKind::Number,
        "file_descriptor" => TokenKind::Operator,
        "comment" | "heredoc_body" | "heredoc_start" | "heredoc_end" => TokenKind::Text,
        "word" => {
            let text = source.get(node.start_byte()..node.end_byte())?;
            word_kind(text)
        }
        _ => return None,
    };
    Some(kind)
}

fn leaf_kind(node: Node) -> TokenKind {
    if node.is_named() {
        return TokenKind::Text;
    }
    // Anonymous leaves are grammar literals: reserved words or symbols.
    if node.kind().chars().all(|c| c.is_ascii_alphabetic()) {
        TokenKind::Keyword
    } else {
        TokenKind::Operator
    }
}

/// Bare words: all digits is a number, all ASCII punctuation (`.`, `{`,
/// `\`, `:`) is punctuation, anything else an identifier.
fn word_kind(text: &str) -> TokenKind {
    if text.is_empty() {
        TokenKind::Identifier
    } else if text.bytes().all(|b| b.is_ascii_digit()) {
        TokenKind::Number
    } else if text.bytes().all(|b| b.is_ascii_punctuation()) {
        TokenKind::Punctuation
    } else {
        TokenKind::Identifier
    }
}

/// Turn ordered spans into tokens, emitting `Text` tokens for uncovered bytes.
fn fill_gaps(source: &str, spans: &[Span]) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(spans.len() * 2);
    let mut pos = 0;
    for &(start, end, kind) in spans {
        if start < pos || end > source.len() {
            continue;
        }
        if start > pos
            && let Some(gap) = source.get(pos..start)
        {
            tokens.push(Token::new(TokenKind::Text, gap, pos));
        }
        let Some(text) = source.get(start..end) else {
            continue;
        };
        tokens.push(Token::new(kind, text, start));
        pos = end;
    }
    if pos < source.len()
        && let Some(tail) = source.get(pos..)
    {
        tokens.push(Token::new(TokenKind::Text, tail, pos));
    }
    tokens
}
