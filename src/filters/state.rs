// Filter state synchronization: query string <-> typed filter state <-> filter definitions

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::query::QueryParams;
use crate::models::FilterDefinition;

/// Field key (or derived `_min`/`_max` key) to a single non-empty value.
///
/// Absence means "no constraint". Equality treats an absent key as distinct
/// from a key holding an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState(BTreeMap<String, String>);

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    // Non-empty value only; an empty string is no constraint
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Sets or clears `key`. Returns `false` when nothing changed so callers
    /// can skip downstream notifications (URL rewrites, re-renders).
    pub fn set_value(&mut self, key: &str, value: &str) -> bool {
        if value.is_empty() {
            return self.0.remove(key).is_some();
        }
        if self.get(key) == Some(value) {
            return false;
        }
        self.0.insert(key.to_string(), value.to_string());
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // Insert without the change check; used while building derived states
    fn insert(&mut self, key: String, value: String) {
        self.0.insert(key, value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FilterState(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Every definition key plus `{key}_min`/`{key}_max` for range filters.
pub fn recognized_keys(definitions: &[FilterDefinition]) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for def in definitions {
        keys.insert(def.key.clone());
        if def.is_range() {
            keys.insert(def.min_key());
            keys.insert(def.max_key());
        }
    }
    keys
}

pub fn compute_defaults(definitions: &[FilterDefinition]) -> FilterState {
    let mut state = FilterState::new();
    for def in definitions {
        if let Some(default) = &def.default {
            state.insert(def.key.clone(), default.to_string());
        }
    }
    state
}

// Unrecognized and empty parameters are dropped
pub fn parse_from_query(definitions: &[FilterDefinition], query: &QueryParams) -> FilterState {
    let mut state = FilterState::new();
    for key in recognized_keys(definitions) {
        if let Some(value) = query.get(&key).filter(|v| !v.is_empty()) {
            let value = value.to_string();
            state.insert(key, value);
        }
    }
    state
}

// Parsed values win over defaults
pub fn merge_initial(defaults: &FilterState, parsed: &FilterState) -> FilterState {
    let mut merged = defaults.clone();
    for (key, value) in parsed.iter() {
        merged.insert(key.to_string(), value.to_string());
    }
    merged
}

/// Rewrites `existing` so recognized keys reflect `state`. Parameters outside
/// `recognized` are preserved untouched.
pub fn serialize_to_query(
    state: &FilterState,
    recognized: &BTreeSet<String>,
    existing: &QueryParams,
) -> QueryParams {
    let mut params = existing.clone();
    for key in recognized {
        params.remove(key);
    }
    for (key, value) in state.iter() {
        if !value.is_empty() {
            params.set(key, value);
        }
    }
    params
}

pub fn states_equal(a: &FilterState, b: &FilterState) -> bool {
    a == b
}

/// A definition with no `visibleWhen` clause is always visible; otherwise
/// every controlling field must currently hold the expected value.
pub fn is_visible(def: &FilterDefinition, state: &FilterState) -> bool {
    match &def.visible_when {
        None => true,
        Some(clause) => clause
            .iter()
            .all(|(field, expected)| state.get(field) == Some(expected.to_string().as_str())),
    }
}

pub fn visible_filters<'a>(
    definitions: &'a [FilterDefinition],
    state: &FilterState,
) -> Vec<&'a FilterDefinition> {
    definitions.iter().filter(|def| is_visible(def, state)).collect()
}

pub fn humanize_key(key: &str) -> String {
    key.replace('_', " ")
}

/// Chip label for an active filter entry, e.g. `year ≥ 2019` or `condition: Used`.
pub fn describe_filter_value(key: &str, value: &str, definitions: &[FilterDefinition]) -> String {
    let (lookup_key, bound) = match key.rsplit_once('_') {
        Some((base, "min")) if !base.is_empty() => (base, Some("≥")),
        Some((base, "max")) if !base.is_empty() => (base, Some("≤")),
        _ => (key, None),
    };
    let def = definitions.iter().find(|d| d.key == lookup_key);
    let label = humanize_key(lookup_key);

    if let Some(symbol) = bound {
        return format!("{} {} {}", label, symbol, value);
    }

    if let Some(option) = def.and_then(|d| d.options.iter().find(|o| o.value() == value)) {
        return format!("{}: {}", label, option.label());
    }

    format!("{}: {}", label, value.replace('_', " "))
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveFilter {
    pub key: String,
    pub value: String,
    pub label: String,
    pub removable: bool,
}

/// Page-level synchronizer owning the definitions and the current state.
#[derive(Debug, Clone)]
pub struct FilterSync {
    definitions: Vec<FilterDefinition>,
    keys: BTreeSet<String>,
    state: FilterState,
}

impl FilterSync {
    pub fn new(definitions: Vec<FilterDefinition>, query: &QueryParams) -> Self {
        let keys = recognized_keys(&definitions);
        let mut sync = FilterSync {
            definitions,
            keys,
            state: FilterState::new(),
        };
        sync.reconcile(query);
        sync
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn definitions(&self) -> &[FilterDefinition] {
        &self.definitions
    }

    pub fn recognized_keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    /// Re-derives defaults + query values and adopts them only if they differ
    /// from the held state. Returns whether the state was replaced.
    pub fn reconcile(&mut self, query: &QueryParams) -> bool {
        let derived = merge_initial(
            &compute_defaults(&self.definitions),
            &parse_from_query(&self.definitions, query),
        );
        if states_equal(&self.state, &derived) {
            return false;
        }
        self.state = derived;
        true
    }

    /// Applies one field change. Returns the rewritten query only when the
    /// state actually changed.
    pub fn set_value(&mut self, key: &str, value: &str, existing: &QueryParams) -> Option<QueryParams> {
        if !self.state.set_value(key, value) {
            return None;
        }
        Some(serialize_to_query(&self.state, &self.keys, existing))
    }

    pub fn to_query(&self, existing: &QueryParams) -> QueryParams {
        serialize_to_query(&self.state, &self.keys, existing)
    }

    /// Keys with a default come back on every reload, so they can be changed but not removed.
    pub fn has_default(&self, key: &str) -> bool {
        self.definitions
            .iter()
            .any(|def| def.key == key && def.default.is_some())
    }

    // Link target for removing a single chip; None for keys that snap back to a default
    pub fn query_without(&self, key: &str, existing: &QueryParams) -> Option<QueryParams> {
        if self.has_default(key) {
            return None;
        }
        let mut next = self.clone();
        Some(
            next.set_value(key, "", existing)
                .unwrap_or_else(|| self.to_query(existing)),
        )
    }

    pub fn visible(&self) -> Vec<&FilterDefinition> {
        visible_filters(&self.definitions, &self.state)
    }

    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.state
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| ActiveFilter {
                key: key.to_string(),
                value: value.to_string(),
                label: describe_filter_value(key, value, &self.definitions),
                removable: !self.has_default(key),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilterKind, FilterOption, FilterScalar};

    fn def(key: &str, kind: FilterKind) -> FilterDefinition {
        FilterDefinition {
            key: key.to_string(),
            kind,
            options: vec![],
            source: None,
            depends_on: None,
            min: None,
            max: None,
            unit: None,
            default: None,
            visible_when: None,
        }
    }

    fn vehicle_defs() -> Vec<FilterDefinition> {
        let mut condition = def("condition", FilterKind::Segmented);
        condition.options = vec![
            FilterOption::Labeled { value: "new".into(), label: "New".into() },
            FilterOption::Labeled { value: "used".into(), label: "Used".into() },
        ];
        condition.default = Some(FilterScalar::Text("used".into()));

        let mut owners = def("owners", FilterKind::Number);
        owners.visible_when = Some(BTreeMap::from([(
            "condition".to_string(),
            FilterScalar::Text("used".into()),
        )]));

        vec![condition, def("brand", FilterKind::Select), def("year", FilterKind::Range), owners]
    }

    #[test]
    fn recognized_keys_include_range_bounds_only_for_ranges() {
        let keys = recognized_keys(&vehicle_defs());
        assert!(keys.contains("year_min"));
        assert!(keys.contains("year_max"));
        assert!(keys.contains("year"));
        assert!(!keys.contains("brand_min"));
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn defaults_are_stringified() {
        let mut defs = vehicle_defs();
        defs[1].default = Some(FilterScalar::Number(2020.into()));
        let defaults = compute_defaults(&defs);
        assert_eq!(defaults.get("condition"), Some("used"));
        assert_eq!(defaults.get("brand"), Some("2020"));
        assert_eq!(defaults.get("year"), None);
    }

    #[test]
    fn parse_drops_unknown_and_empty_params() {
        let query = QueryParams::parse("brand=toyota&year_min=2018&year_max=&utm_source=ad&colour=red");
        let parsed = parse_from_query(&vehicle_defs(), &query);
        let expected: FilterState = [("brand", "toyota"), ("year_min", "2018")].into_iter().collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn merge_prefers_parsed_values() {
        let defaults = compute_defaults(&vehicle_defs());
        let parsed: FilterState = [("condition", "new")].into_iter().collect();
        let merged = merge_initial(&defaults, &parsed);
        assert_eq!(merged.get("condition"), Some("new"));
    }

    #[test]
    fn set_value_reports_changes_only() {
        let mut state = FilterState::new();
        assert!(state.set_value("brand", "toyota"));
        let snapshot = state.clone();
        assert!(!state.set_value("brand", "toyota"));
        assert_eq!(state, snapshot);
        assert!(!state.set_value("model", ""));
        assert!(state.set_value("brand", ""));
        assert!(state.is_empty());
    }

    #[test]
    fn serialize_preserves_unrelated_params() {
        let defs = vehicle_defs();
        let keys = recognized_keys(&defs);
        let existing = QueryParams::parse("focus=suv&brand=nissan&year_min=2010");
        let state: FilterState = [("brand", "toyota"), ("condition", "used")].into_iter().collect();

        let query = serialize_to_query(&state, &keys, &existing);
        assert_eq!(query.get("focus"), Some("suv"));
        assert_eq!(query.get("brand"), Some("toyota"));
        assert_eq!(query.get("year_min"), None);
        assert_eq!(query.to_query_string(), "focus=suv&brand=toyota&condition=used");
    }

    #[test]
    fn query_round_trip_restricted_to_recognized_keys() {
        let defs = vehicle_defs();
        let keys = recognized_keys(&defs);
        let state: FilterState = [("brand", "toyota"), ("year_max", "2022"), ("stray", "x")]
            .into_iter()
            .collect();

        let query = serialize_to_query(&state, &keys, &QueryParams::new());
        let reparsed = parse_from_query(&defs, &query);

        let expected: FilterState = [("brand", "toyota"), ("year_max", "2022")].into_iter().collect();
        assert_eq!(reparsed, expected);
    }

    #[test]
    fn equality_distinguishes_absent_from_empty() {
        let a: FilterState = [("brand", "")].into_iter().collect();
        let b = FilterState::new();
        assert!(!states_equal(&a, &b));
        assert!(states_equal(&b, &FilterState::new()));
    }

    #[test]
    fn visibility_follows_controlling_field() {
        let defs = vehicle_defs();
        let new_state: FilterState = [("condition", "new")].into_iter().collect();
        let used_state: FilterState = [("condition", "used")].into_iter().collect();

        let hidden: Vec<&str> = visible_filters(&defs, &new_state).iter().map(|d| d.key.as_str()).collect();
        assert!(!hidden.contains(&"owners"));

        let shown: Vec<&str> = visible_filters(&defs, &used_state).iter().map(|d| d.key.as_str()).collect();
        assert!(shown.contains(&"owners"));
    }

    #[test]
    fn hidden_filter_keeps_its_value() {
        let defs = vehicle_defs();
        let mut sync = FilterSync::new(defs, &QueryParams::parse("owners=2"));
        assert!(sync.visible().iter().any(|d| d.key == "owners"));

        sync.set_value("condition", "new", &QueryParams::new());
        assert!(!sync.visible().iter().any(|d| d.key == "owners"));
        assert_eq!(sync.state().get("owners"), Some("2"));
    }

    #[test]
    fn describe_uses_option_labels_and_range_symbols() {
        let defs = vehicle_defs();
        assert_eq!(describe_filter_value("condition", "used", &defs), "condition: Used");
        assert_eq!(describe_filter_value("year_min", "2019", &defs), "year ≥ 2019");
        assert_eq!(describe_filter_value("mileage_max", "50000", &defs), "mileage ≤ 50000");
        assert_eq!(describe_filter_value("accident_history", "no_accidents", &defs), "accident history: no accidents");
    }

    #[test]
    fn sync_reconcile_is_guarded_by_equality() {
        let mut sync = FilterSync::new(vehicle_defs(), &QueryParams::parse("brand=toyota"));
        assert_eq!(sync.state().get("condition"), Some("used"));
        assert!(!sync.reconcile(&QueryParams::parse("brand=toyota&focus=suv")));
        assert!(sync.reconcile(&QueryParams::parse("brand=nissan")));
        assert_eq!(sync.state().get("brand"), Some("nissan"));
    }

    #[test]
    fn sync_set_value_skips_redundant_rewrites() {
        let existing = QueryParams::parse("focus=suv");
        let mut sync = FilterSync::new(vehicle_defs(), &existing);

        let rewritten = sync.set_value("brand", "toyota", &existing).unwrap();
        assert_eq!(rewritten.to_query_string(), "focus=suv&brand=toyota&condition=used");
        assert!(sync.set_value("brand", "toyota", &rewritten).is_none());

        let without = sync.query_without("brand", &rewritten).unwrap();
        assert_eq!(without.to_query_string(), "focus=suv&condition=used");
        // the chip link does not mutate the held state
        assert_eq!(sync.state().get("brand"), Some("toyota"));
    }

    #[test]
    fn defaulted_keys_have_no_remove_link() {
        let query = QueryParams::parse("brand=toyota");
        let sync = FilterSync::new(vehicle_defs(), &query);
        assert!(sync.has_default("condition"));
        assert!(sync.query_without("condition", &query).is_none());

        let removable: Vec<(String, bool)> = sync
            .active_filters()
            .into_iter()
            .map(|f| (f.key, f.removable))
            .collect();
        assert_eq!(
            removable,
            vec![("brand".to_string(), true), ("condition".to_string(), false)]
        );

        // following the brand link lands on a stable state
        let next = sync.query_without("brand", &query).unwrap();
        let reloaded = FilterSync::new(vehicle_defs(), &next);
        assert_eq!(reloaded.state().get("brand"), None);
        assert_eq!(reloaded.state().get("condition"), Some("used"));
        assert!(!reloaded.clone().reconcile(&next));
    }
}
