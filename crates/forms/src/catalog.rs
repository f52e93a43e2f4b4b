//! State → LGA reference data and the dependent selector built on it.
//!
//! The reference payload is loosely keyed: a state may carry `state_id` or
//! `id` (as a number or a string), and an LGA `id` or `local_id` with `name`
//! or `local_name`. Matching and labelling accept every shape seen.

use serde_json::Value;

use crate::normalize::normalize_records;

pub const PLACEHOLDER_NO_PARENT: &str = "Select a state first";
pub const PLACEHOLDER_LOADING: &str = "Loading LGAs...";
pub const PLACEHOLDER_EMPTY: &str = "No LGAs available";
pub const PLACEHOLDER_READY: &str = "Select LGA";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid states data received from server")]
    InvalidShape,
}

/// One selectable option: the stored value and the display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// The full state + LGA dataset, fetched once per screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionCatalog {
    regions: Vec<Value>,
}

impl RegionCatalog {
    /// Build from a `/api/state_locals` response body.
    pub fn from_response(body: &Value) -> Result<Self, CatalogError> {
        let regions = normalize_records(body).ok_or(CatalogError::InvalidShape)?;
        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Parent options, in server order.
    pub fn states(&self) -> Vec<Choice> {
        self.regions
            .iter()
            .filter_map(|r| {
                let value = scalar(r.get("state_id")).or_else(|| scalar(r.get("id")))?;
                let label = scalar(r.get("name")).unwrap_or_else(|| value.clone());
                Some(Choice { value, label })
            })
            .collect()
    }

    /// Child options for `selection`, or `None` if no state matches.
    pub fn locals_for(&self, selection: &str) -> Option<Vec<Choice>> {
        let region = self.find(selection)?;
        let locals = region
            .get("locals")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(local_choice).collect())
            .unwrap_or_default();
        Some(locals)
    }

    fn find(&self, selection: &str) -> Option<&Value> {
        let numeric = selection.trim().parse::<i64>().ok();
        self.regions.iter().find(|r| {
            id_matches(r.get("state_id"), selection, numeric)
                || id_matches(r.get("id"), selection, numeric)
                || r.get("name").and_then(Value::as_str) == Some(selection)
        })
    }
}

fn id_matches(candidate: Option<&Value>, selection: &str, numeric: Option<i64>) -> bool {
    match candidate {
        Some(Value::Number(n)) => numeric.is_some() && n.as_i64() == numeric,
        Some(Value::String(s)) => s == selection,
        _ => false,
    }
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn local_choice(item: &Value) -> Option<Choice> {
    let value = scalar(item.get("id")).or_else(|| scalar(item.get("local_id")))?;
    let label = scalar(item.get("name"))
        .or_else(|| scalar(item.get("local_name")))
        .unwrap_or_else(|| value.clone());
    Some(Choice { value, label })
}

/// Why the dependent list shows what it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStatus {
    NoParent,
    Loading,
    Empty,
    Ready,
}

/// A parent selector whose choice filters a dependent selector.
///
/// Every parent change resets the dependent selection, whether or not the
/// new parent has any dependent entries.
#[derive(Debug, Clone, Default)]
pub struct CascadeSelect {
    catalog: Option<RegionCatalog>,
    parent: String,
    children: Vec<Choice>,
    child: String,
}

impl CascadeSelect {
    /// A selector whose dataset has not arrived yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: RegionCatalog) -> Self {
        let mut select = Self::new();
        select.load(catalog);
        select
    }

    /// Install the fetched dataset and recompute the dependent options.
    pub fn load(&mut self, catalog: RegionCatalog) {
        self.catalog = Some(catalog);
        self.recompute();
    }

    pub fn set_parent(&mut self, parent: &str) {
        self.parent = parent.to_string();
        self.recompute();
    }

    /// Select a dependent option. Values not in the current list are rejected.
    pub fn set_child(&mut self, child: &str) -> bool {
        if self.children.iter().any(|c| c.value == child) {
            self.child = child.to_string();
            true
        } else {
            false
        }
    }

    fn recompute(&mut self) {
        self.child.clear();
        self.children = match (&self.catalog, self.parent.is_empty()) {
            (Some(catalog), false) => catalog.locals_for(&self.parent).unwrap_or_default(),
            _ => Vec::new(),
        };
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn child(&self) -> &str {
        &self.child
    }

    pub fn parent_options(&self) -> Vec<Choice> {
        self.catalog.as_ref().map(RegionCatalog::states).unwrap_or_default()
    }

    pub fn child_options(&self) -> &[Choice] {
        &self.children
    }

    pub fn status(&self) -> CascadeStatus {
        if self.parent.is_empty() {
            CascadeStatus::NoParent
        } else if self.catalog.is_none() {
            CascadeStatus::Loading
        } else if self.children.is_empty() {
            CascadeStatus::Empty
        } else {
            CascadeStatus::Ready
        }
    }

    pub fn child_enabled(&self) -> bool {
        self.status() == CascadeStatus::Ready
    }

    pub fn placeholder(&self) -> &'static str {
        match self.status() {
            CascadeStatus::NoParent => PLACEHOLDER_NO_PARENT,
            CascadeStatus::Loading => PLACEHOLDER_LOADING,
            CascadeStatus::Empty => PLACEHOLDER_EMPTY,
            CascadeStatus::Ready => PLACEHOLDER_READY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> RegionCatalog {
        RegionCatalog::from_response(&json!({
            "data": [
                {"state_id": 25, "name": "Lagos", "locals": [
                    {"id": 1, "name": "Ikeja"},
                    {"local_id": "2", "local_name": "Epe"}
                ]},
                {"id": "37", "name": "FCT", "locals": [{"id": 9, "name": "Gwagwalada"}]},
                {"state_id": 20, "name": "Kano"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn rejects_payload_without_list() {
        assert_eq!(
            RegionCatalog::from_response(&json!({"message": "nope"})),
            Err(CatalogError::InvalidShape)
        );
    }

    #[test]
    fn matches_numeric_string_and_name_shapes() {
        let c = catalog();
        assert_eq!(c.locals_for("25").unwrap().len(), 2);
        assert_eq!(c.locals_for("37").unwrap()[0].label, "Gwagwalada");
        assert_eq!(c.locals_for("Lagos").unwrap()[1].value, "2");
        assert_eq!(c.locals_for("Kano"), Some(vec![]));
        assert_eq!(c.locals_for("99"), None);
    }

    #[test]
    fn states_list_uses_either_id_shape() {
        let values: Vec<String> = catalog().states().into_iter().map(|c| c.value).collect();
        assert_eq!(values, vec!["25", "37", "20"]);
    }

    #[test]
    fn parent_change_always_resets_child() {
        let mut s = CascadeSelect::with_catalog(catalog());
        s.set_parent("25");
        assert!(s.set_child("1"));
        assert_eq!(s.child(), "1");

        s.set_parent("Kano");
        assert_eq!(s.child(), "");
        assert_eq!(s.status(), CascadeStatus::Empty);

        s.set_parent("37");
        assert!(s.set_child("9"));
        s.set_parent("37");
        assert_eq!(s.child(), "", "reselecting the same parent still resets");
    }

    #[test]
    fn unknown_parent_gives_empty_disabled_list() {
        let mut s = CascadeSelect::with_catalog(catalog());
        s.set_parent("404");
        assert!(s.child_options().is_empty());
        assert!(!s.child_enabled());
        assert_eq!(s.placeholder(), PLACEHOLDER_EMPTY);
        assert!(!s.set_child("1"));
    }

    #[test]
    fn placeholders_explain_state() {
        let mut s = CascadeSelect::new();
        assert_eq!(s.placeholder(), PLACEHOLDER_NO_PARENT);
        s.set_parent("25");
        assert_eq!(s.placeholder(), PLACEHOLDER_LOADING);
        s.load(catalog());
        assert_eq!(s.placeholder(), PLACEHOLDER_READY);
        assert!(s.child_enabled());
    }
}
