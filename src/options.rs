// src/options.rs

//! The raw option mapping handed to a recipe by its host
//!
//! Options are plain string key/value pairs, the way a build orchestrator
//! section would hold them. Keys are kept in a `BTreeMap` so anything
//! derived from the mapping (serialized output, fingerprints) is stable.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Ordered string option mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options {
    values: BTreeMap<String, String>,
}

impl Options {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an option
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up an option, falling back to a default
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Look up an option and trim it, treating blank values as absent
    pub fn get_trimmed(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Whether the key is present at all (its value is irrelevant)
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Set an option, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Iterate over all options in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a `key=value` pair as given on the command line
    pub fn parse_pair(pair: &str) -> Result<(String, String)> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::ConfigError(format!("Expected key=value, got '{}'", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::ConfigError(format!("Empty option name in '{}'", pair)));
        }
        // Literal "\n" lets list options be passed on a single command line
        Ok((key.to_string(), value.replace("\\n", "\n")))
    }

    /// Load options from a TOML file holding a flat table
    ///
    /// Booleans and numbers are stringified; booleans set to `false` are
    /// dropped since flag options are checked by presence.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load options from TOML text holding a flat table
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = content
            .parse()
            .map_err(|e| Error::ConfigError(format!("Invalid options file: {}", e)))?;

        let mut options = Self::new();
        for (key, value) in table {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Boolean(true) => "true".to_string(),
                toml::Value::Boolean(false) => continue,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        toml::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
                other => {
                    return Err(Error::ConfigError(format!(
                        "Unsupported value for option '{}': {}",
                        key, other
                    )));
                }
            };
            options.set(key, value);
        }
        Ok(options)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Split a newline-separated option into trimmed, non-blank lines
pub fn split_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collapse any whitespace (including newlines) into single spaces
pub fn join_words(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
