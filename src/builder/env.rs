//! Build environment exported to external tools.

use std::collections::BTreeMap;

use serde::Serialize;

/// Ordered set of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildEnvironment {
    vars: BTreeMap<String, String>,
}

impl BuildEnvironment {
    pub fn new() -> Self {
        BuildEnvironment {
            vars: BTreeMap::new(),
        }
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Set a `"1"`/`"0"` toggle.
    pub fn set_flag(&mut self, key: impl Into<String>, enabled: bool) {
        self.set(key, if enabled { "1" } else { "0" });
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
