use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::{Group, Position, Version};

/// A registered script.
///
/// An asset without a `src` is an alias: it exists only to pull in its
/// dependencies (and optionally to carry inline code of its own).
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub handle: String,
    pub src: Option<String>,
    pub deps: Vec<String>,
    pub ver: Version,
    pub group: Group,
    /// Free-form data, e.g. `conditional` or localized `data`.
    pub extra: BTreeMap<String, Value>,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub textdomain: Option<String>,
    pub translations_path: Option<String>,
}

impl Asset {
    pub fn new(
        handle: impl Into<String>,
        src: Option<String>,
        deps: Vec<String>,
        ver: Version,
    ) -> Self {
        Self {
            handle: handle.into(),
            src,
            deps,
            ver,
            group: Group::Head,
            extra: BTreeMap::new(),
            before: Vec::new(),
            after: Vec::new(),
            textdomain: None,
            translations_path: None,
        }
    }

    pub fn is_alias(&self) -> bool {
        self.src.is_none()
    }

    pub fn has_inline(&self) -> bool {
        !self.before.is_empty() || !self.after.is_empty() || self.extra.contains_key("data")
    }

    /// Store a data point. A few keys are structural and land in dedicated
    /// fields; the rest go to `extra`.
    pub fn add_data(&mut self, key: &str, value: Value) {
        match key {
            "group" => {
                if let Some(group) = Group::from_value(&value) {
                    self.group = group;
                }
            }
            "before" | "after" => {
                let list = if key == "before" {
                    &mut self.before
                } else {
                    &mut self.after
                };
                match value {
                    Value::String(code) => list.push(code),
                    Value::Array(items) => list.extend(
                        items
                            .into_iter()
                            .filter_map(|item| item.as_str().map(str::to_string)),
                    ),
                    _ => {}
                }
            }
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub(crate) fn inline(&self, position: Position) -> &[String] {
        match position {
            Position::Before => &self.before,
            Position::After => &self.after,
        }
    }
}
