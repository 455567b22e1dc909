//! The classifier: guesses which fragments of a tokenized command are
//! user-supplied data and builds a parameterized template from them.

use super::oracle::IdentifierOracle;
use super::{Analysis, Suggestion};
use crate::parse::{Token, TokenKind};
use crate::template::{escape_literal, format_placeholder};

/// Shortest text that can be treated as a filesystem path.
const MIN_PATH_LEN: usize = 3;

/// Category of a suggestion; doubles as the generated name's stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    String,
    Number,
    Variable,
    Path,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::String => "string",
            Category::Number => "number",
            Category::Variable => "variable",
            Category::Path => "path",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::String => 0,
            Category::Number => 1,
            Category::Variable => 2,
            Category::Path => 3,
        }
    }
}

/// Classify a token stream.
///
/// Consecutive identifier/punctuation tokens are buffered and examined
/// together: if their joined text looks like a path they become one `path`
/// suggestion, otherwise each unknown, non-flag identifier becomes a
/// `string` suggestion. String literals, numbers and variable references
/// each yield one suggestion. Everything else is fixed syntax.
///
/// Placeholders are spliced in at the offsets the suggestions were taken
/// from, so repeated text is never matched against the wrong occurrence.
pub fn classify<O>(tokens: &[Token], oracle: &O) -> Analysis
where
    O: IdentifierOracle + ?Sized,
{
    let mut state = Classifier {
        oracle,
        counters: [0; 4],
        suggestions: Vec::new(),
        buffer: Vec::new(),
    };

    let mut source = String::new();
    for token in tokens {
        let offset = source.len();
        source.push_str(&token.text);
        if token.text.is_empty() {
            continue;
        }

        if token.kind.is_path_fragment() {
            state.buffer.push((offset, token));
            continue;
        }
        state.flush();

        match token.kind {
            TokenKind::String => {
                let (skip, inner) = unquote(&token.text);
                let start = offset + skip;
                state.push(Category::String, inner, start..start + inner.len());
            }
            TokenKind::Number => {
                state.push(Category::Number, &token.text, offset..offset + token.text.len());
            }
            TokenKind::Variable => {
                state.push(Category::Variable, &token.text, offset..offset + token.text.len());
            }
            // Operators, keywords and text are fixed syntax.
            _ => {}
        }
    }
    state.flush();

    let template = build_template(&source, &state.suggestions);
    log::debug!(
        "classified {} tokens into {} suggestions",
        tokens.len(),
        state.suggestions.len()
    );
    Analysis {
        suggestions: state.suggestions,
        template,
    }
}

/// Heuristic: long enough and contains a Unix or drive-style separator.
pub fn looks_like_path(text: &str) -> bool {
    text.len() >= MIN_PATH_LEN && (text.contains('/') || text.contains(":\\"))
}

struct Classifier<'a, O: ?Sized> {
    oracle: &'a O,
    counters: [usize; 4],
    suggestions: Vec<Suggestion>,
    buffer: Vec<(usize, &'a Token)>,
}

impl<O: IdentifierOracle + ?Sized> Classifier<'_, O> {
    fn next_name(&mut self, category: Category) -> String {
        let counter = &mut self.counters[category.index()];
        *counter += 1;
        if *counter == 1 {
            category.as_str().to_string()
        } else {
            format!("{}{}", category.as_str(), counter)
        }
    }

    fn push(&mut self, category: Category, text: &str, span: std::ops::Range<usize>) {
        let variable_name = self.next_name(category);
        self.suggestions.push(Suggestion {
            variable_name,
            original_text: text.to_string(),
            span,
        });
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let buffer = std::mem::take(&mut self.buffer);
        let joined: String = buffer.iter().map(|(_, t)| t.text.as_str()).collect();
        let start = buffer[0].0;

        if looks_like_path(&joined) {
            self.push(Category::Path, &joined, start..start + joined.len());
            return;
        }
        for (offset, token) in buffer {
            if token.kind == TokenKind::Identifier
                && !token.text.starts_with('-')
                && !self.oracle.is_known(&token.text)
            {
                self.push(Category::String, &token.text, offset..offset + token.text.len());
            }
        }
    }
}

/// Strip one pair of matching quotes (and a `$` prefix for `$'…'` / `$"…"`).
/// Returns the byte offset of the inner text and the inner text itself.
fn unquote(text: &str) -> (usize, &str) {
    let prefix = usize::from(text.starts_with("$'") || text.starts_with("$\""));
    let body = &text[prefix..];
    for quote in ['"', '\''] {
        if body.len() >= 2 && body.starts_with(quote) && body.ends_with(quote) {
            return (prefix + 1, &body[1..body.len() - 1]);
        }
    }
    (0, text)
}

fn build_template(source: &str, suggestions: &[Suggestion]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pos = 0;
    for s in suggestions {
        let Some(fixed) = source.get(pos..s.span.start) else {
            log::debug!("suggestion {} out of order, left unplaced", s.variable_name);
            continue;
        };
        out.push_str(&escape_literal(fixed));
        out.push_str(&format_placeholder(&s.variable_name));
        pos = s.span.end;
    }
    out.push_str(&escape_literal(source.get(pos..).unwrap_or_default()));
    out.trim().to_string()
}
