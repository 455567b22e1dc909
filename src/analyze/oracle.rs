//! Known-identifier oracles: "is this word a fixed command in the target shell?"

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::config::OracleConfig;

/// Answers whether a bare word is a recognized command or keyword.
///
/// Recognized words are treated as fixed syntax by the classifier and never
/// suggested as variables.
pub trait IdentifierOracle {
    fn is_known(&self, word: &str) -> bool;
}

impl<F> IdentifierOracle for F
where
    F: Fn(&str) -> bool,
{
    fn is_known(&self, word: &str) -> bool {
        self(word)
    }
}

/// A fixed, case-insensitive word list.
#[derive(Debug, Default, Clone)]
pub struct StaticOracle {
    words: HashSet<String>,
}

impl StaticOracle {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl IdentifierOracle for StaticOracle {
    fn is_known(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

/// Oracle that asks the shell itself which commands exist.
///
/// The probe command runs once, on the first query, and its output (one
/// command name per line) is kept for the lifetime of the instance. The
/// configured `known` words are always included, so a failed probe degrades
/// to the static list.
#[derive(Debug)]
pub struct CommandOracle {
    probe: String,
    fallback: Vec<String>,
    known: OnceLock<StaticOracle>,
}

impl CommandOracle {
    pub fn new(probe: impl Into<String>, fallback: Vec<String>) -> Self {
        Self {
            probe: probe.into(),
            fallback,
            known: OnceLock::new(),
        }
    }

    pub fn from_config(config: &OracleConfig) -> Self {
        Self::new(config.probe.clone(), config.known.clone())
    }

    /// Drop the cached word list; the next query re-runs the probe.
    pub fn refresh(&mut self) {
        self.known = OnceLock::new();
    }

    /// Drop the cached word list and run the probe again now. Returns the
    /// number of known words.
    pub fn reload(&mut self) -> usize {
        self.refresh();
        self.words().len()
    }

    /// Whether the probe has already run.
    pub fn is_loaded(&self) -> bool {
        self.known.get().is_some()
    }

    fn words(&self) -> &StaticOracle {
        self.known.get_or_init(|| {
            let mut words = self.fallback.clone();
            match run_probe(&self.probe) {
                Ok(found) => {
                    log::debug!("command probe found {} names", found.len());
                    words.extend(found);
                }
                Err(e) => {
                    log::warn!("command probe '{}' failed: {e}", self.probe);
                }
            }
            StaticOracle::new(words)
        })
    }
}

impl IdentifierOracle for CommandOracle {
    fn is_known(&self, word: &str) -> bool {
        self.words().is_known(word)
    }
}

/// Run a shell-quoted probe command line and return its non-empty output lines.
fn run_probe(probe: &str) -> Result<Vec<String>, String> {
    if probe.trim().is_empty() {
        return Ok(Vec::new());
    }
    let argv = shlex::split(probe).ok_or_else(|| "unbalanced quoting".to_string())?;
    let Some((program, args)) = argv.split_first() else {
        return Ok(Vec::new());
    };
    let output = std::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .output()
        .map_err(|e| e.to_string())?;
    if !output.status.success() {
        return Err(format!("exited with {}", output.status));
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_oracle_ignores_case() {
        let oracle = StaticOracle::new(["Get-Content", "ls"]);
        assert!(oracle.is_known("get-content"));
        assert!(oracle.is_known("LS"));
        assert!(!oracle.is_known("UTF8"));
        assert_eq!(oracle.len(), 2);
    }

    #[test]
    fn closures_are_oracles() {
        let oracle = |w: &str| w == "echo";
        assert!(oracle.is_known("echo"));
        assert!(!oracle.is_known("hello"));
    }

    #[test]
    fn probe_is_lazy_and_cached() {
        let oracle = CommandOracle::new("echo mytool", vec!["ls".into()]);
        assert!(!oracle.is_loaded());
        assert!(oracle.is_known("mytool"));
        assert!(oracle.is_known("ls"));
        assert!(oracle.is_loaded());
    }

    #[test]
    fn failed_probe_falls_back() {
        let oracle = CommandOracle::new(
            "definitely-not-a-real-binary-4242",
            vec!["git".into()],
        );
        assert!(oracle.is_known("git"));
        assert!(!oracle.is_known("hello"));
    }

    #[test]
    fn empty_probe_uses_fallback_only() {
        let oracle = CommandOracle::new("", vec!["cargo".into()]);
        assert!(oracle.is_known("cargo"));
        assert!(oracle.is_loaded());
    }

    #[test]
    fn refresh_forgets_cache() {
        let mut oracle = CommandOracle::new("", vec![]);
        assert!(!oracle.is_known("x"));
        oracle.refresh();
        assert!(!oracle.is_loaded());
    }

    #[test]
    fn reload_runs_probe_eagerly() {
        let mut oracle = CommandOracle::new("echo mytool", vec!["ls".into()]);
        assert_eq!(oracle.reload(), 2);
        assert!(oracle.is_loaded());
    }

    #[test]
    fn unbalanced_probe_is_an_error() {
        assert!(run_probe("sh -c 'oops").is_err());
    }
}
