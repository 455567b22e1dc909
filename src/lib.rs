//! gadgetsmith: turn one-off shell commands into reusable gadgets.
//!
//! A gadget is a named command template with `{{placeholder}}` slots. This
//! crate guesses which parts of a command are user data, keeps the
//! placeholder model consistent across analysis, storage and editing, and
//! renders templates back into final command text. Running that text is
//! left to the caller.
//!
//! # Architecture
//!
//! - **[`parse`]** — Tokens and the tree-sitter-bash tokenizer.
//! - **[`analyze`]** — Classifier, known-identifier oracles, the analysis pipeline.
//! - **[`template`]** — Placeholder extraction, substitution, renaming, escaping.
//! - **[`store`]** — Gadget records and the atomic JSON collection.
//! - **[`config`]** — Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]** — File logger setup.

/// Command analysis: classifier, oracles, analyzer.
pub mod analyze;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error taxonomy.
pub mod error;
/// File-based logging.
pub mod logging;
/// Tokens and tokenizers.
pub mod parse;
/// Gadget records and their persistent store.
pub mod store;
/// Placeholder template engine.
pub mod template;

pub use analyze::{Analysis, Analyzer, Suggestion};
pub use error::{GadgetError, Result};
pub use store::{Gadget, GadgetStore, GadgetUpdate};

/// Analyse a command with the user's configuration (embedded defaults plus
/// `~/.config/gadgetsmith/config.toml`).
///
/// It probes the shell for known commands on every call; build an
/// [`Analyzer`] to reuse the probe.
pub fn analyze(command: &str) -> Result<Analysis> {
    analyze_with(&config::Config::load(), command)
}

/// Analyse a command with an explicit configuration.
pub fn analyze_with(config: &config::Config, command: &str) -> Result<Analysis> {
    Analyzer::from_config(config).analyze(command)
}
