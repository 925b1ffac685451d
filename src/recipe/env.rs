// src/recipe/env.rs

//! Scoped build environment
//!
//! A `BuildEnv` is an overlay of variables handed to every child process of
//! a recipe. The host process environment is only ever read, never changed,
//! so several recipes can run in one process without stepping on each other.

use super::configuration::BuildConfiguration;
use crate::options::{split_lines, Options};
use std::collections::BTreeMap;

/// Environment overlay applied to child processes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    vars: BTreeMap<String, String>,
}

impl BuildEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the overlay from the recipe options
    ///
    /// `inherited` looks up the value a variable has in the host environment
    /// so search paths can be prepended to it.
    pub fn prepare<F>(options: &Options, config: &BuildConfiguration, inherited: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = Self::new();

        let paths = split_lines(options.get_or("path", ""));
        if !paths.is_empty() {
            env.prepend_path("PATH", &paths, inherited("PATH"));
        }

        let pkgconfig = split_lines(options.get_or("pkgconfigpath", ""));
        if !pkgconfig.is_empty() {
            env.prepend_path("PKG_CONFIG_PATH", &pkgconfig, inherited("PKG_CONFIG_PATH"));
        }

        let includes: Vec<String> = split_lines(options.get_or("includes", ""))
            .iter()
            .map(|dir| format!("-I{}", dir))
            .collect();
        if !includes.is_empty() {
            let flags = includes.join(" ");
            env.append_flags("CFLAGS", &flags, inherited("CFLAGS"));
            env.append_flags("CPPFLAGS", &flags, inherited("CPPFLAGS"));
        }

        let rpath = options.contains("rpath");
        let mut libs = Vec::new();
        for dir in split_lines(options.get_or("libraries", "")) {
            libs.push(format!("-L{}", dir));
            if rpath {
                libs.push(format!("-Wl,-rpath,{}", dir));
            }
        }
        if !libs.is_empty() {
            env.append_flags("LDFLAGS", &libs.join(" "), inherited("LDFLAGS"));
        }

        if let Some(cflags) = options.get_trimmed("cflags") {
            let current = env.get("CFLAGS").map(str::to_string).or_else(|| inherited("CFLAGS"));
            env.append_flags("CFLAGS", cflags, current);
        }
        if let Some(ldflags) = options.get_trimmed("ldflags") {
            let current = env
                .get("LDFLAGS")
                .map(str::to_string)
                .or_else(|| inherited("LDFLAGS"));
            env.append_flags("LDFLAGS", ldflags, current);
        }

        for (key, value) in &config.environment {
            env.set(key.clone(), value.clone());
        }

        env
    }

    /// Overlay built against the real process environment
    pub fn from_process(options: &Options, config: &BuildConfiguration) -> Self {
        Self::prepare(options, config, |key| std::env::var(key).ok())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Variables in key order
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    fn prepend_path(&mut self, key: &str, entries: &[String], current: Option<String>) {
        let mut parts: Vec<String> = entries.to_vec();
        if let Some(current) = current.filter(|c| !c.is_empty()) {
            parts.push(current);
        }
        self.set(key, parts.join(":"));
    }

    fn append_flags(&mut self, key: &str, flags: &str, current: Option<String>) {
        let value = match current.filter(|c| !c.trim().is_empty()) {
            Some(current) => format!("{} {}", current.trim(), flags),
            None => flags.to_string(),
        };
        self.set(key, value);
    }
}
