//! Tool editing session.
//!
//! An editor session holds a draft of one [`ToolDefinition`] — either a
//! fresh draft (create mode) or a deep copy of an existing tool (edit
//! mode). All edits apply to the draft; nothing touches the tool list
//! until [`ToolEditorSession::finish`] produces a validated definition.
//!
//! Parameters are an ordered list of named entries, so renaming re-keys a
//! single entry in place and reordering is a pure permutation: neither can
//! disturb required-status or any other parameter's spec.

use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::ContextError;
use super::types::{ParamType, Parameter, ParameterSpec, ToolDefinition};

// ─── Editor Session ─────────────────────────────────────────────────────────

/// In-progress edit of a single tool definition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEditorSession {
    /// In edit mode, the name the tool had when the session opened; the
    /// save replaces the tool-list entry matched by this name. `None` in
    /// create mode (save appends).
    pub original_name: Option<String>,
    pub name: String,
    pub description: String,
    /// Ordered draft parameters; names unique.
    pub parameters: Vec<Parameter>,
    /// Required parameter names; subset of the parameter names.
    pub required: Vec<String>,
    /// Field-level validation errors keyed by parameter name. Save is
    /// blocked while this is non-empty.
    pub validation_errors: BTreeMap<String, String>,
}

impl ToolEditorSession {
    /// Open a session over an empty draft (create mode).
    pub fn create() -> Self {
        Self {
            original_name: None,
            name: String::new(),
            description: String::new(),
            parameters: Vec::new(),
            required: Vec::new(),
            validation_errors: BTreeMap::new(),
        }
    }

    /// Open a session over a copy of an existing tool (edit mode).
    pub fn edit(tool: &ToolDefinition) -> Self {
        Self {
            original_name: Some(tool.name.clone()),
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
            required: tool.required.clone(),
            validation_errors: BTreeMap::new(),
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    // ─── Parameter List Operations ──────────────────────────────────────

    /// Append a new string parameter with a generated placeholder name.
    ///
    /// The placeholder starts at `param{count + 1}` and increments past any
    /// existing names, so repeated adds after renames never collide.
    pub fn add_param(&mut self) -> String {
        let mut n = self.parameters.len() + 1;
        while self.has_param(&format!("param{n}")) {
            n += 1;
        }
        let name = format!("param{n}");
        self.parameters.push(Parameter {
            name: name.clone(),
            spec: ParameterSpec::string(),
        });
        name
    }

    /// Remove a parameter, its required membership, and its field error.
    pub fn remove_param(&mut self, name: &str) {
        self.parameters.retain(|p| p.name != name);
        self.required.retain(|r| r != name);
        self.validation_errors.remove(name);
    }

    /// Rename a parameter, preserving its spec, position, and required
    /// membership.
    ///
    /// The new name is whitespace-trimmed; an empty or unchanged name is a
    /// no-op. A rename that collides with another parameter's name is
    /// rejected: the keys are left untouched and a field error is recorded
    /// on the source parameter (blocking save until resolved).
    pub fn rename_param(&mut self, from: &str, to: &str) {
        let to = to.trim();
        if to.is_empty() || to == from {
            return;
        }
        if !self.has_param(from) {
            return;
        }
        if self.has_param(to) {
            self.validation_errors.insert(
                from.to_string(),
                format!("A parameter named '{to}' already exists."),
            );
            return;
        }

        if let Some(entry) = self.parameters.iter_mut().find(|p| p.name == from) {
            entry.name = to.to_string();
        }
        for r in self.required.iter_mut() {
            if r == from {
                *r = to.to_string();
            }
        }
        // Drop whatever error the old key carried and re-derive from the
        // current enum values — stale collision errors must not survive a
        // successful rename, while genuine duplicate-value errors must.
        self.validation_errors.remove(from);
        self.revalidate_enum(to);
    }

    /// Move a parameter from one position to another (drag reorder).
    ///
    /// A pure permutation: names, specs, and required flags are untouched.
    /// Out-of-range indices are ignored.
    pub fn move_param(&mut self, from: usize, to: usize) {
        if from == to || from >= self.parameters.len() || to >= self.parameters.len() {
            return;
        }
        let entry = self.parameters.remove(from);
        self.parameters.insert(to, entry);
    }

    // ─── Parameter Field Operations ─────────────────────────────────────

    pub fn set_param_description(&mut self, name: &str, description: &str) {
        if let Some(entry) = self.param_mut(name) {
            entry.spec.description = description.to_string();
        }
    }

    /// Change a parameter's type. Moving away from `string` drops any enum
    /// configuration together with its validation error.
    pub fn set_param_type(&mut self, name: &str, param_type: ParamType) {
        let Some(entry) = self.param_mut(name) else {
            return;
        };
        entry.spec.param_type = param_type;
        if param_type != ParamType::String {
            entry.spec.enum_values = None;
            self.validation_errors.remove(name);
        }
    }

    /// Toggle enum constraint on a string parameter.
    ///
    /// Enabling initializes an empty value list; disabling removes the
    /// list and clears any associated validation error. Non-string
    /// parameters are ignored.
    pub fn set_enum_enabled(&mut self, name: &str, enabled: bool) {
        let Some(entry) = self.param_mut(name) else {
            return;
        };
        if entry.spec.param_type != ParamType::String {
            return;
        }
        if enabled {
            if entry.spec.enum_values.is_none() {
                entry.spec.enum_values = Some(Vec::new());
            }
        } else {
            entry.spec.enum_values = None;
            self.validation_errors.remove(name);
        }
    }

    /// Re-parse the comma-separated enum text for a parameter.
    ///
    /// Entries are trimmed and empty entries dropped; duplicates are kept
    /// in the list but flagged as a field error that blocks save until the
    /// user resolves them.
    pub fn set_enum_values(&mut self, name: &str, raw: &str) {
        let Some(entry) = self.param_mut(name) else {
            return;
        };
        if entry.spec.param_type != ParamType::String {
            return;
        }
        entry.spec.enum_values = Some(parse_enum_text(raw));
        self.revalidate_enum(name);
    }

    /// Set or clear a parameter's required flag. Preserves the insertion
    /// order of the required list; unknown names are ignored.
    pub fn set_required(&mut self, name: &str, required: bool) {
        if !self.has_param(name) {
            return;
        }
        let present = self.required.iter().any(|r| r == name);
        if required && !present {
            self.required.push(name.to_string());
        } else if !required && present {
            self.required.retain(|r| r != name);
        }
    }

    // ─── Save ───────────────────────────────────────────────────────────

    /// Whether the draft can be saved (no outstanding validation errors).
    pub fn can_save(&self) -> bool {
        self.validation_errors.is_empty()
    }

    /// Produce the validated tool definition, consuming nothing — the
    /// caller commits it to the tool list and drops the session.
    pub fn finish(&self) -> Result<ToolDefinition, ContextError> {
        if !self.can_save() {
            let reasons: Vec<&str> =
                self.validation_errors.values().map(String::as_str).collect();
            return Err(ContextError::ValidationFailed {
                reason: reasons.join("; "),
            });
        }
        Ok(ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            required: self.required.clone(),
        })
    }

    // ─── Internals ──────────────────────────────────────────────────────

    fn has_param(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    fn param_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// Recompute the duplicate-value error for one parameter's enum list.
    fn revalidate_enum(&mut self, name: &str) {
        let duplicates = self
            .parameters
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.spec.enum_values.as_deref())
            .map(find_duplicates)
            .unwrap_or_default();

        if duplicates.is_empty() {
            self.validation_errors.remove(name);
        } else {
            self.validation_errors.insert(
                name.to_string(),
                format!("Duplicate values: {}", duplicates.join(", ")),
            );
        }
    }
}

// ─── Enum Parsing ───────────────────────────────────────────────────────────

/// Parse a comma-separated enum value list: split, trim, drop empties.
/// Duplicates are retained (they are flagged, not removed).
pub fn parse_enum_text(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Values that appear more than once (case-sensitive), each reported once,
/// in first-repeat order.
fn find_duplicates(values: &[String]) -> Vec<String> {
    let mut duplicates = Vec::new();
    for (i, v) in values.iter().enumerate() {
        if values[..i].contains(v) && !duplicates.contains(v) {
            duplicates.push(v.clone());
        }
    }
    duplicates
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_params(names: &[&str]) -> ToolEditorSession {
        let mut s = ToolEditorSession::create();
        for _ in names {
            s.add_param();
        }
        for (i, n) in names.iter().enumerate() {
            let current = s.parameters[i].name.clone();
            s.rename_param(&current, n);
        }
        s
    }

    #[test]
    fn add_param_generates_placeholder_names() {
        let mut s = ToolEditorSession::create();
        assert_eq!(s.add_param(), "param1");
        assert_eq!(s.add_param(), "param2");
        assert_eq!(s.parameters[0].spec.param_type, ParamType::String);
    }

    #[test]
    fn add_param_skips_colliding_placeholder() {
        let mut s = ToolEditorSession::create();
        s.add_param();
        s.rename_param("param1", "param2");
        // One parameter named "param2"; count + 1 = 2 collides, so skip to 3.
        assert_eq!(s.add_param(), "param3");
    }

    #[test]
    fn rename_preserves_spec_order_and_required() {
        let mut s = session_with_params(&["location", "unit"]);
        s.set_param_description("location", "City name");
        s.set_required("location", true);

        s.rename_param("location", "place");

        assert_eq!(s.parameters[0].name, "place");
        assert_eq!(s.parameters[0].spec.description, "City name");
        assert_eq!(s.parameters[1].name, "unit");
        assert_eq!(s.required, vec!["place".to_string()]);
        assert!(s.validation_errors.is_empty());
    }

    #[test]
    fn rename_collision_is_rejected_with_field_error() {
        let mut s = session_with_params(&["location", "unit"]);
        s.set_required("unit", true);

        s.rename_param("unit", "location");

        // Keys untouched, required untouched, error recorded on the source.
        assert_eq!(s.parameters[1].name, "unit");
        assert_eq!(s.required, vec!["unit".to_string()]);
        assert!(s.validation_errors.contains_key("unit"));
        assert!(!s.can_save());

        // A later successful rename clears the stale collision error.
        s.rename_param("unit", "measure");
        assert!(s.can_save());
        assert_eq!(s.required, vec!["measure".to_string()]);
    }

    #[test]
    fn rename_trims_and_ignores_empty() {
        let mut s = session_with_params(&["a"]);
        s.rename_param("a", "  b  ");
        assert_eq!(s.parameters[0].name, "b");
        s.rename_param("b", "   ");
        assert_eq!(s.parameters[0].name, "b");
    }

    #[test]
    fn rename_carries_enum_error_to_new_key() {
        let mut s = session_with_params(&["status"]);
        s.set_enum_enabled("status", true);
        s.set_enum_values("status", "open, closed, open");
        assert!(s.validation_errors.contains_key("status"));

        s.rename_param("status", "state");
        assert!(s.validation_errors.contains_key("state"));
        assert!(!s.validation_errors.contains_key("status"));
        assert!(!s.can_save());
    }

    #[test]
    fn reorder_is_pure_permutation() {
        let mut s = session_with_params(&["a", "b", "c"]);
        s.set_param_description("a", "first");
        s.set_required("a", true);
        s.set_required("c", true);

        let pairs_before: Vec<Parameter> = {
            let mut v = s.parameters.clone();
            v.sort_by(|x, y| x.name.cmp(&y.name));
            v
        };

        s.move_param(0, 2);
        assert_eq!(
            s.parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["b", "c", "a"]
        );

        // Same (name, spec) pairs, same required set, order permuted only.
        let mut pairs_after = s.parameters.clone();
        pairs_after.sort_by(|x, y| x.name.cmp(&y.name));
        assert_eq!(pairs_before, pairs_after);
        assert_eq!(s.required, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn reorder_out_of_range_is_ignored() {
        let mut s = session_with_params(&["a", "b"]);
        s.move_param(0, 5);
        s.move_param(5, 0);
        assert_eq!(s.parameters[0].name, "a");
    }

    #[test]
    fn remove_param_drops_required_and_error() {
        let mut s = session_with_params(&["a", "b"]);
        s.set_required("a", true);
        s.set_enum_enabled("a", true);
        s.set_enum_values("a", "x, x");
        assert!(!s.can_save());

        s.remove_param("a");
        assert_eq!(s.parameters.len(), 1);
        assert!(s.required.is_empty());
        assert!(s.can_save());
    }

    #[test]
    fn enum_toggle_initializes_and_clears() {
        let mut s = session_with_params(&["status"]);
        s.set_enum_enabled("status", true);
        assert_eq!(s.parameters[0].spec.enum_values, Some(Vec::new()));

        s.set_enum_values("status", "a, a");
        assert!(!s.can_save());

        s.set_enum_enabled("status", false);
        assert!(s.parameters[0].spec.enum_values.is_none());
        assert!(s.can_save());
    }

    #[test]
    fn enum_toggle_ignored_for_non_string() {
        let mut s = session_with_params(&["count"]);
        s.set_param_type("count", ParamType::Integer);
        s.set_enum_enabled("count", true);
        assert!(s.parameters[0].spec.enum_values.is_none());
    }

    #[test]
    fn enum_parse_trims_and_drops_empty() {
        assert_eq!(
            parse_enum_text(" a , b ,, c ,"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(parse_enum_text("  ,  , ").is_empty());
    }

    #[test]
    fn enum_parse_is_idempotent() {
        let parsed = parse_enum_text(" a , b , a ");
        let reparsed = parse_enum_text(&parsed.join(", "));
        assert_eq!(parsed, reparsed);
        // Duplicates flagged, not removed.
        assert_eq!(parsed, vec!["a".to_string(), "b".to_string(), "a".to_string()]);
    }

    #[test]
    fn enum_duplicates_block_save_until_resolved() {
        let mut s = session_with_params(&["lang"]);
        s.set_enum_enabled("lang", true);

        s.set_enum_values("lang", "it, en, it");
        assert!(!s.can_save());
        assert!(s.validation_errors["lang"].contains("it"));

        s.set_enum_values("lang", "it, en");
        assert!(s.can_save());
    }

    #[test]
    fn enum_duplicates_case_sensitive() {
        let mut s = session_with_params(&["lang"]);
        s.set_enum_enabled("lang", true);
        s.set_enum_values("lang", "It, it");
        assert!(s.can_save(), "case-different values are distinct");
    }

    #[test]
    fn type_change_away_from_string_drops_enum() {
        let mut s = session_with_params(&["status"]);
        s.set_enum_enabled("status", true);
        s.set_enum_values("status", "a, a");
        assert!(!s.can_save());

        s.set_param_type("status", ParamType::Number);
        assert!(s.parameters[0].spec.enum_values.is_none());
        assert!(s.can_save());
    }

    #[test]
    fn save_blocked_iff_errors_present() {
        let mut s = session_with_params(&["status"]);
        assert!(s.finish().is_ok());

        s.set_enum_enabled("status", true);
        s.set_enum_values("status", "a, a");
        let err = s.finish().unwrap_err();
        assert!(matches!(err, ContextError::ValidationFailed { .. }));

        s.set_enum_values("status", "a, b");
        assert!(s.finish().is_ok());
    }

    #[test]
    fn finish_produces_draft_contents() {
        let mut s = ToolEditorSession::create();
        s.set_name("get_weather");
        s.set_description("Current weather for a location.");
        s.add_param();
        s.rename_param("param1", "location");
        s.set_param_description("location", "City and state");
        s.set_required("location", true);

        let tool = s.finish().unwrap();
        assert_eq!(tool.name, "get_weather");
        assert_eq!(tool.parameters.len(), 1);
        assert_eq!(tool.parameters[0].name, "location");
        assert_eq!(tool.required, vec!["location".to_string()]);
    }

    #[test]
    fn edit_mode_remembers_original_name() {
        let tool = ToolDefinition {
            name: "send_email".to_string(),
            description: String::new(),
            parameters: Vec::new(),
            required: Vec::new(),
        };
        let mut s = ToolEditorSession::edit(&tool);
        assert_eq!(s.original_name.as_deref(), Some("send_email"));

        s.set_name("send_mail");
        let edited = s.finish().unwrap();
        assert_eq!(edited.name, "send_mail");
        // The session still targets the original entry for replacement.
        assert_eq!(s.original_name.as_deref(), Some("send_email"));
    }

    #[test]
    fn required_flag_ignores_unknown_param() {
        let mut s = session_with_params(&["a"]);
        s.set_required("ghost", true);
        assert!(s.required.is_empty());
    }
}
