//! The gadget record and the edits that can be applied to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::template;

/// Description shown for a variable that has none.
const DEFAULT_DESCRIPTION: &str = "Value for";

/// A named command template plus metadata. The name is the key it is
/// stored under, not a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gadget {
    #[serde(default)]
    pub description: String,
    pub command: String,
    /// Placeholder name → human description.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl Gadget {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: command.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Placeholder names of the command, in order of first use.
    pub fn placeholders(&self) -> Vec<String> {
        template::extract_placeholders(&self.command)
    }

    /// The stored description of `name`, or a generic one when it is
    /// missing or blank.
    pub fn variable_description(&self, name: &str) -> String {
        match self.variables.get(name) {
            Some(desc) if !desc.trim().is_empty() => desc.clone(),
            _ => format!("{DEFAULT_DESCRIPTION} {name}"),
        }
    }

    /// Add an empty description for every placeholder that has none.
    /// Returns the names that were added.
    pub fn fill_missing_variables(&mut self) -> Vec<String> {
        let mut added = Vec::new();
        for name in self.placeholders() {
            if !self.variables.contains_key(&name) {
                self.variables.insert(name.clone(), String::new());
                added.push(name);
            }
        }
        added
    }

    /// Variable entries whose placeholder no longer occurs in the command.
    pub fn stale_variables(&self) -> Vec<String> {
        let live = self.placeholders();
        self.variables
            .keys()
            .filter(|k| !live.contains(k))
            .cloned()
            .collect()
    }

    /// Drop stale variable entries and add missing ones, keeping the
    /// descriptions of names that still occur. Returns the dropped names.
    ///
    /// The store never calls this on its own; command edits keep stale
    /// entries so a lightly edited command does not lose descriptions.
    pub fn reconcile_variables(&mut self) -> Vec<String> {
        let stale = self.stale_variables();
        for name in &stale {
            self.variables.remove(name);
        }
        self.fill_missing_variables();
        stale
    }

    /// Bind invocation arguments to placeholders. Named values take
    /// precedence; remaining placeholders are filled from `positional` in
    /// placeholder order. Positional values are consumed by index, whether
    /// or not a named value already covered that slot.
    pub fn bind_arguments(
        &self,
        positional: &[String],
        named: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        for (i, name) in self.placeholders().into_iter().enumerate() {
            let value = named
                .get(&name)
                .filter(|v| !v.is_empty())
                .or_else(|| positional.get(i).filter(|v| !v.is_empty()));
            if let Some(value) = value {
                values.insert(name, value.clone());
            }
        }
        values
    }

    /// Placeholders with no value in `values`.
    pub fn missing_values(&self, values: &BTreeMap<String, String>) -> Vec<String> {
        self.placeholders()
            .into_iter()
            .filter(|name| !values.contains_key(name))
            .collect()
    }

    /// The final command text for `values`.
    pub fn render(&self, values: &BTreeMap<String, String>) -> String {
        template::render(&self.command, values)
    }
}

/// One change to a gadget's variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableEdit {
    /// Rename a placeholder in the command and move its description.
    Rename { from: String, to: String },
    /// Set the description of a variable.
    Describe { name: String, description: String },
}

/// Changes to apply to an existing gadget. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GadgetUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub command: Option<String>,
    /// Replace the whole variable map.
    pub variables: Option<BTreeMap<String, String>>,
    /// Applied in order, after every other field.
    pub variable_edits: Vec<VariableEdit>,
}

impl GadgetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.command.is_none()
            && self.variables.is_none()
            && self.variable_edits.is_empty()
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn rename_variable(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.variable_edits.push(VariableEdit::Rename {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn describe_variable(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.variable_edits.push(VariableEdit::Describe {
            name: name.into(),
            description: description.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_description() {
        let mut g = Gadget::new("echo {{who}} {{what}}", "greet");
        g.variables.insert("who".into(), "Person to greet".into());
        g.variables.insert("what".into(), "  ".into());
        assert_eq!(g.variable_description("who"), "Person to greet");
        assert_eq!(g.variable_description("what"), "Value for what");
        assert_eq!(g.variable_description("nope"), "Value for nope");
    }

    #[test]
    fn fill_missing_only_adds() {
        let mut g = Gadget::new("cp {{a}} {{b}}", "");
        g.variables.insert("a".into(), "source".into());
        g.variables.insert("gone".into(), "old".into());
        assert_eq!(g.fill_missing_variables(), vec!["b"]);
        assert_eq!(g.variables, map(&[("a", "source"), ("b", ""), ("gone", "old")]));
    }

    #[test]
    fn reconcile_keeps_live_descriptions() {
        let mut g = Gadget::new("cp {{a}} {{c}}", "");
        g.variables = map(&[("a", "source"), ("b", "dest")]);
        assert_eq!(g.stale_variables(), vec!["b"]);
        assert_eq!(g.reconcile_variables(), vec!["b"]);
        assert_eq!(g.variables, map(&[("a", "source"), ("c", "")]));
    }

    #[test]
    fn bind_named_then_positional() {
        let g = Gadget::new("scp {{file}} {{host}}:{{dir}}", "");
        let values = g.bind_arguments(
            &["a.txt".into(), "ignored".into(), "/srv".into()],
            &map(&[("host", "web1")]),
        );
        assert_eq!(
            values,
            map(&[("file", "a.txt"), ("host", "web1"), ("dir", "/srv")])
        );
        assert!(g.missing_values(&values).is_empty());
        assert_eq!(g.render(&values), "scp a.txt web1:/srv");
    }

    #[test]
    fn missing_values_listed() {
        let g = Gadget::new("ping -c {{count}} {{host}}", "");
        let values = g.bind_arguments(&["3".into()], &BTreeMap::new());
        assert_eq!(g.missing_values(&values), vec!["host"]);
        assert_eq!(g.render(&values), "ping -c 3 {{host}}");
    }

    #[test]
    fn serialized_shape() {
        let mut g = Gadget::new("echo {{name}}", "desc");
        g.variables.insert("name".into(), "who".into());
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "description": "desc",
                "command": "echo {{name}}",
                "variables": { "name": "who" }
            })
        );
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let g: Gadget = serde_json::from_str(r#"{"command": "ls"}"#).unwrap();
        assert_eq!(g, Gadget::new("ls", ""));
    }

    #[test]
    fn update_builder() {
        assert!(GadgetUpdate::default().is_empty());
        let update = GadgetUpdate::default()
            .rename("new")
            .rename_variable("a", "b")
            .describe_variable("b", "thing");
        assert!(!update.is_empty());
        assert_eq!(update.name.as_deref(), Some("new"));
        assert_eq!(update.variable_edits.len(), 2);
    }
}
