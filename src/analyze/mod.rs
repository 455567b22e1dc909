pub mod classify;
pub mod oracle;

pub use classify::{Category, classify, looks_like_path};
pub use oracle::{CommandOracle, IdentifierOracle, StaticOracle};

use std::ops::Range;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::parse::{BashTokenizer, Tokenizer};

/// A proposed placeholder: the generated name and the text it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub variable_name: String,
    pub original_text: String,
    /// Byte range of `original_text` within the analysed text.
    pub span: Range<usize>,
}

/// Result of analysing one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// Suggestions in order of first appearance; names are unique.
    pub suggestions: Vec<Suggestion>,
    /// The command with every suggestion replaced by its placeholder.
    pub template: String,
}

impl Analysis {
    /// True if at least one fragment was parameterized.
    pub fn is_parameterized(&self) -> bool {
        !self.suggestions.is_empty()
    }

    /// Suggested variable names, in template order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.suggestions
            .iter()
            .map(|s| s.variable_name.as_str())
            .collect()
    }
}

/// Tokenizer plus oracle: the full analysis pipeline for raw command text.
pub struct Analyzer<T = BashTokenizer, O = CommandOracle> {
    tokenizer: T,
    oracle: O,
}

impl Analyzer {
    /// Bash tokenizer with a lazily probed command oracle from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(BashTokenizer, CommandOracle::from_config(&config.oracle))
    }
}

impl<T: Tokenizer, O: IdentifierOracle> Analyzer<T, O> {
    pub fn new(tokenizer: T, oracle: O) -> Self {
        Self { tokenizer, oracle }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Analyse a command. Only tokenizer failures are errors; the
    /// classifier itself degrades to "no suggestions".
    pub fn analyze(&self, command: &str) -> Result<Analysis> {
        let command = command.trim();
        let tokens = self.tokenizer.tokenize(command)?;
        if tokens.is_empty() {
            return Ok(Analysis {
                suggestions: Vec::new(),
                template: command.to_string(),
            });
        }
        Ok(classify(&tokens, &self.oracle))
    }
}
