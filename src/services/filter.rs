// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity-type filter for the map layer.
//!
//! The UI shows one checkbox per known activity type plus "Other", which
//! stands for every type outside the known list. `FilterCompiler` holds the
//! checked set and turns it into a layer filter. Checked identifiers are
//! not validated against the known list: settings saved before the list
//! changed still compile, as plain literals.

use crate::models::FilterExpression;
use std::collections::HashMap;

/// Label of the catch-all category.
pub const OTHER_TYPE: &str = "Other";

/// Feature property the filter keys on.
pub const TYPE_PROPERTY: &str = "type";

/// Line color for types with no configured color.
pub const DEFAULT_LINE_COLOR: &str = "#ffff33";

/// Checked activity types and their compilation into a layer filter.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    known_types: Vec<String>,
    /// Insertion-ordered, no duplicates
    checked_types: Vec<String>,
    colors: HashMap<String, String>,
    default_color: String,
}

impl FilterCompiler {
    /// Create a compiler with every category checked.
    pub fn new(known_types: Vec<String>) -> Self {
        let mut known: Vec<String> = Vec::with_capacity(known_types.len());
        for t in known_types {
            if t != OTHER_TYPE && !known.contains(&t) {
                known.push(t);
            }
        }

        let mut checked_types = known.clone();
        checked_types.push(OTHER_TYPE.to_string());

        Self {
            known_types: known,
            checked_types,
            colors: HashMap::new(),
            default_color: DEFAULT_LINE_COLOR.to_string(),
        }
    }

    /// Attach per-type line colors.
    pub fn with_colors(mut self, colors: HashMap<String, String>, default_color: &str) -> Self {
        self.colors = colors;
        self.default_color = default_color.to_string();
        self
    }

    // ─── Checked set ─────────────────────────────────────────────────────────

    /// Check `activity_type` if unchecked, uncheck it otherwise.
    pub fn toggle(&mut self, activity_type: &str) {
        if let Some(pos) = self.checked_types.iter().position(|t| t == activity_type) {
            self.checked_types.remove(pos);
        } else {
            self.checked_types.push(activity_type.to_string());
        }
        tracing::debug!(activity_type, checked = ?self.checked_types, "Filter toggled");
    }

    /// Replace the checked set. Duplicates are dropped, first one wins.
    pub fn set_checked<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut checked: Vec<String> = Vec::new();
        for t in types.into_iter().map(Into::into) {
            if !checked.contains(&t) {
                checked.push(t);
            }
        }
        self.checked_types = checked;
    }

    pub fn checked_types(&self) -> &[String] {
        &self.checked_types
    }

    pub fn is_checked(&self, activity_type: &str) -> bool {
        self.checked_types.iter().any(|t| t == activity_type)
    }

    pub fn known_types(&self) -> &[String] {
        &self.known_types
    }

    /// Checkbox list in display order: known types, then "Other".
    pub fn list_filterable_types(&self) -> Vec<String> {
        let mut types = self.known_types.clone();
        types.push(OTHER_TYPE.to_string());
        types
    }

    // ─── Compilation ─────────────────────────────────────────────────────────

    /// Compile the checked set into a layer filter.
    ///
    /// - nothing checked: match nothing (`type == ""`)
    /// - "Other" and some types: those types, or anything unknown
    /// - only "Other": anything unknown
    /// - no "Other": exactly the checked types
    pub fn compile_filter(&self) -> FilterExpression {
        if self.checked_types.is_empty() {
            return FilterExpression::Equals {
                property: TYPE_PROPERTY.to_string(),
                value: String::new(),
            };
        }

        let other_checked = self.is_checked(OTHER_TYPE);
        let main_types: Vec<String> = self
            .checked_types
            .iter()
            .filter(|t| t.as_str() != OTHER_TYPE)
            .cloned()
            .collect();

        let unknown = || FilterExpression::NotIn {
            property: TYPE_PROPERTY.to_string(),
            values: self.known_types.clone(),
        };
        let selected = |values: Vec<String>| FilterExpression::In {
            property: TYPE_PROPERTY.to_string(),
            values,
        };

        match (other_checked, main_types.is_empty()) {
            (true, false) => FilterExpression::Any(vec![selected(main_types), unknown()]),
            (true, true) => unknown(),
            (false, _) => selected(main_types),
        }
    }

    // ─── Colors ──────────────────────────────────────────────────────────────

    /// Line color for an activity type.
    pub fn color_for(&self, activity_type: &str) -> &str {
        self.colors
            .get(activity_type)
            .map(String::as_str)
            .unwrap_or(&self.default_color)
    }

    /// `line-color` paint expression covering every colored known type.
    pub fn color_expression(&self) -> serde_json::Value {
        let mut expr = vec![
            serde_json::json!("match"),
            serde_json::json!(["get", TYPE_PROPERTY]),
        ];
        for t in &self.known_types {
            if let Some(color) = self.colors.get(t) {
                expr.push(serde_json::json!(t));
                expr.push(serde_json::json!(color));
            }
        }
        expr.push(serde_json::json!(self.default_color));
        serde_json::Value::Array(expr)
    }
}
