//! Persistent gadget collection.
//!
//! The whole collection is read into memory on open and rewritten on every
//! mutating call. Writes go to a temp file in the same directory and are
//! renamed over the target, so the file on disk is either the old or the
//! new collection. In-memory state only changes after a successful write.
//!
//! There is no locking: two stores opened on the same file are
//! last-writer-wins.

pub mod gadget;

pub use gadget::{Gadget, GadgetUpdate, VariableEdit};

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{GadgetError, Result};
use crate::template;

/// Gadgets keyed by name.
pub type Collection = BTreeMap<String, Gadget>;

/// Check a gadget name against `[A-Za-z0-9_-]+`.
pub fn validate_gadget_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(GadgetError::InvalidName(name.to_string()))
    }
}

/// Check a variable key against `[A-Za-z_][A-Za-z0-9_]*`.
///
/// Every key a caller supplies goes through this rule: the variable map on
/// create or edit, the target of a rename, and the subject of a describe.
/// Placeholders written directly into a command only need the looser
/// placeholder syntax; their auto-created entries are not re-checked.
pub fn validate_variable_name(name: &str) -> Result<()> {
    if template::is_valid_variable_name(name) {
        Ok(())
    } else {
        Err(GadgetError::InvalidVariableName(name.to_string()))
    }
}

/// Reject blank commands.
pub fn validate_command(command: &str) -> Result<()> {
    if command.trim().is_empty() {
        Err(GadgetError::EmptyCommand)
    } else {
        Ok(())
    }
}

#[derive(Debug)]
pub struct GadgetStore {
    path: PathBuf,
    gadgets: Collection,
}

impl GadgetStore {
    /// Load the collection at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let gadgets = Self::load(&path)?;
        log::debug!("loaded {} gadgets from {}", gadgets.len(), path.display());
        Ok(Self { path, gadgets })
    }

    /// Open the store at the configured path.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(config.store_path())
    }

    /// Read a collection from disk.
    ///
    /// A missing or blank file yields an empty collection. Unreadable files
    /// and invalid JSON are errors; the file is never reset.
    pub fn load(path: &Path) -> Result<Collection> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Collection::new()),
            Err(e) => return Err(GadgetError::storage_read(path, e)),
        };
        if data.trim().is_empty() {
            return Ok(Collection::new());
        }
        serde_json::from_str(&data).map_err(|source| GadgetError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the in-memory collection to disk.
    pub fn save(&self) -> Result<()> {
        write_collection(&self.path, &self.gadgets)
    }

    /// Discard in-memory state and re-read the file.
    pub fn reload(&mut self) -> Result<()> {
        self.gadgets = Self::load(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Result<&Gadget> {
        self.gadgets
            .get(name)
            .ok_or_else(|| GadgetError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.gadgets.contains_key(name)
    }

    /// All gadgets, sorted by name.
    pub fn list(&self) -> impl Iterator<Item = (&str, &Gadget)> {
        self.gadgets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.gadgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gadgets.is_empty()
    }

    /// Remove a gadget and persist. Absent names leave the file untouched.
    pub fn delete(&mut self, name: &str) -> Result<Gadget> {
        let mut next = self.gadgets.clone();
        let removed = next
            .remove(name)
            .ok_or_else(|| GadgetError::NotFound(name.to_string()))?;
        self.commit(next)?;
        log::info!("deleted gadget '{name}'");
        Ok(removed)
    }

    /// Validate and insert (or overwrite) a gadget, then persist.
    ///
    /// Placeholders in `command` without an entry in `variables` get an
    /// empty description.
    pub fn create(
        &mut self,
        name: &str,
        command: &str,
        description: &str,
        variables: BTreeMap<String, String>,
    ) -> Result<()> {
        validate_gadget_name(name)?;
        validate_command(command)?;
        variables.keys().try_for_each(|k| validate_variable_name(k))?;

        let mut gadget = Gadget {
            description: description.to_string(),
            command: command.to_string(),
            variables,
        };
        gadget.fill_missing_variables();

        if self.gadgets.contains_key(name) {
            log::info!("overwriting gadget '{name}'");
        }
        let mut next = self.gadgets.clone();
        next.insert(name.to_string(), gadget);
        self.commit(next)?;
        log::info!("created gadget '{name}'");
        Ok(())
    }

    /// Apply `update` to the gadget `name` and persist. Returns the name
    /// the gadget is stored under afterwards.
    ///
    /// A command change does not reconcile `variables`; entries for
    /// placeholders that disappeared are kept.
    pub fn edit(&mut self, name: &str, update: GadgetUpdate) -> Result<String> {
        let mut gadget = self.get(name)?.clone();
        let mut next = self.gadgets.clone();
        let mut final_name = name.to_string();

        if let Some(new_name) = update.name.filter(|n| !n.is_empty() && n != name) {
            validate_gadget_name(&new_name)?;
            next.remove(name);
            final_name = new_name;
        }
        if let Some(description) = update.description {
            gadget.description = description;
        }
        if let Some(command) = update.command {
            validate_command(&command)?;
            gadget.command = command;
        }
        if let Some(variables) = update.variables {
            variables.keys().try_for_each(|k| validate_variable_name(k))?;
            gadget.variables = variables;
        }
        for edit in update.variable_edits {
            apply_variable_edit(&mut gadget, edit)?;
        }

        let stale = gadget.stale_variables();
        if !stale.is_empty() {
            log::debug!("gadget '{final_name}' keeps unused variables: {stale:?}");
        }
        if final_name != name && next.contains_key(&final_name) {
            log::info!("rename of '{name}' overwrites gadget '{final_name}'");
        }
        next.insert(final_name.clone(), gadget);
        self.commit(next)?;
        log::info!("edited gadget '{final_name}'");
        Ok(final_name)
    }

    /// Persist `next`, then adopt it as the in-memory collection.
    fn commit(&mut self, next: Collection) -> Result<()> {
        write_collection(&self.path, &next)?;
        self.gadgets = next;
        Ok(())
    }
}

fn apply_variable_edit(gadget: &mut Gadget, edit: VariableEdit) -> Result<()> {
    match edit {
        VariableEdit::Rename { from, to } => {
            validate_variable_name(&to)?;
            if from == to {
                return Ok(());
            }
            let placeholders = gadget.placeholders();
            let has = |name: &str| {
                placeholders.iter().any(|p| p == name) || gadget.variables.contains_key(name)
            };
            if !has(&from) {
                log::debug!("rename of unknown variable '{from}' ignored");
                return Ok(());
            }
            if has(&to) {
                return Err(GadgetError::VariableExists(to));
            }
            gadget.command = template::rename(&gadget.command, &from, &to);
            let description = gadget.variables.remove(&from).unwrap_or_default();
            gadget.variables.insert(to, description);
        }
        VariableEdit::Describe { name, description } => {
            validate_variable_name(&name)?;
            gadget.variables.insert(name, description);
        }
    }
    Ok(())
}

fn write_collection(path: &Path, gadgets: &Collection) -> Result<()> {
    let mut json = serde_json::to_string_pretty(gadgets).map_err(GadgetError::Serialize)?;
    json.push('\n');
    atomic_write(path, json.as_bytes()).map_err(|e| GadgetError::storage_write(path, e))
}

/// Write to a sibling temp file, sync, then rename over `path`.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = parent.join(format!(".{file_name}.{}.{nanos}.tmp", std::process::id()));

    let result = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
