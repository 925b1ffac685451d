// src/recipe/resolve.rs

//! Option resolution
//!
//! Raw options come in two forms: a generic key (`make-binary`) and a
//! platform-suffixed key (`make-binary-freebsd`). How the two combine is
//! described per option family by a small table of [`ResolutionRule`]s,
//! folded left to right:
//!
//! - **Override**: a present key replaces whatever was accumulated
//! - **Append**: a present key is appended, whitespace-normalized
//! - **ReplaceIfPresent**: a non-blank key replaces the accumulated value
//!
//! On darwin a third suffix, the OS flavor (`leopard`, `snowleopard`), is
//! consulted after the platform suffix.

use super::configuration::{BuildConfiguration, SkipFlags};
use super::fingerprint::Fingerprint;
use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::options::{join_words, split_lines, Options};
use crate::platform::Platform;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// How a present option combines with the value accumulated so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    Override,
    Append,
    ReplaceIfPresent,
}

/// Which form of the key a rule looks up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySuffix {
    /// `key`
    Generic,
    /// `key-<platform>`
    Platform,
    /// `key-<osx flavor>`, only on darwin kernels with a known flavor
    Flavor,
}

/// One step of an option family's resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionRule {
    pub key: &'static str,
    pub suffix: KeySuffix,
    pub strategy: MergeStrategy,
}

impl ResolutionRule {
    pub const fn new(key: &'static str, suffix: KeySuffix, strategy: MergeStrategy) -> Self {
        Self {
            key,
            suffix,
            strategy,
        }
    }

    /// The concrete option key this rule reads on a platform
    pub fn option_key(&self, platform: &Platform) -> Option<String> {
        match self.suffix {
            KeySuffix::Generic => Some(self.key.to_string()),
            KeySuffix::Platform => Some(platform.suffixed(self.key)),
            KeySuffix::Flavor => platform
                .osx_flavor()
                .map(|flavor| format!("{}-{}", self.key, flavor)),
        }
    }
}

use KeySuffix::{Flavor, Generic, Platform as ForPlatform};
use MergeStrategy::{Append, Override, ReplaceIfPresent};

pub const CONFIGURE_SCRIPT: &[ResolutionRule] = &[
    ResolutionRule::new("configure", Generic, Override),
    ResolutionRule::new("configure", ForPlatform, Override),
    ResolutionRule::new("configure", Flavor, Override),
];

/// Generic configure options; this part is also what gets fingerprinted
pub const BASE_CONFIGURE_OPTIONS: &[ResolutionRule] = &[
    ResolutionRule::new("configure-options", Generic, Append),
    ResolutionRule::new("extra_options", Generic, Append),
];

pub const PLATFORM_CONFIGURE_OPTIONS: &[ResolutionRule] = &[
    ResolutionRule::new("configure-options", ForPlatform, Append),
    ResolutionRule::new("configure-options-replace", ForPlatform, ReplaceIfPresent),
    ResolutionRule::new("configure-options", Flavor, Append),
];

pub const MAKE_BINARY: &[ResolutionRule] = &[
    ResolutionRule::new("make-binary", Generic, Override),
    ResolutionRule::new("make-binary", ForPlatform, Override),
];

pub const MAKE_OPTIONS: &[ResolutionRule] = &[
    ResolutionRule::new("make-options", Generic, Override),
    ResolutionRule::new("make-options", ForPlatform, Override),
];

pub const MAKEDIR: &[ResolutionRule] = &[
    ResolutionRule::new("makedir", Generic, Override),
    ResolutionRule::new("makedir", ForPlatform, Override),
];

pub const MAKEINSTALLDIR: &[ResolutionRule] = &[
    ResolutionRule::new("makeinstalldir", Generic, Override),
    ResolutionRule::new("makeinstalldir", ForPlatform, Override),
];

pub const MAKE_TARGETS: &[ResolutionRule] = &[
    ResolutionRule::new("make-targets", Generic, Override),
    ResolutionRule::new("make-targets", ForPlatform, Override),
];

pub const MAKE_INSTALL_TARGETS: &[ResolutionRule] = &[
    ResolutionRule::new("make-install-targets", Generic, Override),
    ResolutionRule::new("make-install-targets", ForPlatform, Override),
];

/// Fold a rule table over the options, starting from `initial`
pub fn resolve_rules(
    rules: &[ResolutionRule],
    options: &Options,
    platform: &Platform,
    initial: Option<String>,
) -> Option<String> {
    let mut value = initial;

    for rule in rules {
        let Some(key) = rule.option_key(platform) else {
            continue;
        };
        let Some(found) = options.get(&key) else {
            continue;
        };

        match rule.strategy {
            MergeStrategy::Override => {
                value = Some(found.trim().to_string());
            }
            MergeStrategy::Append => {
                let words = join_words(found);
                if words.is_empty() {
                    continue;
                }
                value = Some(match value.take().filter(|v| !v.is_empty()) {
                    Some(acc) => format!("{} {}", acc, words),
                    None => words,
                });
            }
            MergeStrategy::ReplaceIfPresent => {
                if !found.trim().is_empty() {
                    value = Some(join_words(found));
                }
            }
        }
    }

    value
}

/// Whether a flag option is set in generic or platform-suffixed form
pub fn flag_set(options: &Options, key: &str, platform: &Platform) -> bool {
    options.contains(key) || options.contains(&platform.suffixed(key))
}

/// Truthiness of a boolean-like option
fn is_enabled(options: &Options, key: &str) -> bool {
    match options.get(key) {
        Some(value) => !matches!(
            value.trim().to_lowercase().as_str(),
            "" | "false" | "no" | "off" | "0"
        ),
        None => false,
    }
}

/// Parse `KEY=VALUE` lines of the `environment` option
fn parse_environment(value: &str) -> BTreeMap<String, String> {
    let mut environment = BTreeMap::new();
    for line in split_lines(value) {
        match line.split_once('=') {
            Some((key, val)) if !key.trim().is_empty() => {
                environment.insert(key.trim().to_string(), val.trim().to_string());
            }
            _ => warn!("Ignoring malformed environment entry: {}", line),
        }
    }
    environment
}

impl BuildConfiguration {
    /// Resolve the effective configuration of recipe `name`
    ///
    /// Resolved `make-binary`, `make-options`, `configure-options`,
    /// `make-targets` and `make-install-targets` are written back into
    /// `options`, and so is `location` in shared mode.
    pub fn resolve(
        name: &str,
        options: &mut Options,
        platform: &Platform,
        host: &HostConfig,
    ) -> Result<Self> {
        let url = options
            .get_trimmed("url")
            .ok_or_else(|| Error::MissingOption("url".to_string()))?
            .to_string();

        let configure = resolve_rules(CONFIGURE_SCRIPT, options, platform, None)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "configure".to_string());

        let prefix_separator = match options.get("prefix-separator") {
            Some("") => " ".to_string(),
            Some(sep) => sep.to_string(),
            None => "=".to_string(),
        };
        let prefix_option = options
            .get("prefix-option")
            .map(str::to_string)
            .unwrap_or_else(|| format!("--prefix{}", prefix_separator));

        let extra_options =
            resolve_rules(BASE_CONFIGURE_OPTIONS, options, platform, None).unwrap_or_default();
        let configure_options = resolve_rules(
            PLATFORM_CONFIGURE_OPTIONS,
            options,
            platform,
            Some(extra_options.clone()),
        )
        .unwrap_or_default();

        let default_make = if host.has_part("gmake") && !platform.is_linux() && !platform.is_cygwin()
        {
            "gmake"
        } else {
            "make"
        };
        let make_binary = resolve_rules(MAKE_BINARY, options, platform, None)
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| default_make.to_string());
        let make_options = resolve_rules(MAKE_OPTIONS, options, platform, None).unwrap_or_default();

        let mut make_targets =
            split_lines(&resolve_rules(MAKE_TARGETS, options, platform, None).unwrap_or_default());
        if make_targets.is_empty() {
            make_targets.push(String::new());
        }

        let mut install_targets = split_lines(
            &resolve_rules(MAKE_INSTALL_TARGETS, options, platform, None).unwrap_or_default(),
        );
        if install_targets.is_empty() {
            install_targets.push("install".to_string());
        }

        let makedir = resolve_rules(MAKEDIR, options, platform, None).filter(|d| !d.is_empty());
        let makeinstalldir =
            resolve_rules(MAKEINSTALLDIR, options, platform, None).filter(|d| !d.is_empty());

        let skip = SkipFlags {
            noconfigure: flag_set(options, "noconfigure", platform),
            nomake: flag_set(options, "nomake", platform),
            noinstall: flag_set(options, "noinstall", platform),
        };

        let prefix = options
            .get_trimmed("location")
            .map(PathBuf::from)
            .unwrap_or_else(|| host.parts_dir.join(name));

        let mut config = Self {
            url,
            checksum: options.get_trimmed("md5").map(str::to_string),
            platform: platform.clone(),
            configure,
            prefix,
            prefix_separator,
            prefix_option,
            configure_options,
            extra_options,
            autogen: options.get_trimmed("autogen").map(str::to_string),
            make_binary,
            make_options,
            make_targets,
            install_targets,
            makedir,
            makeinstalldir,
            environment: parse_environment(options.get_or("environment", "")),
            shared: is_enabled(options, "shared"),
            install_in_place: is_enabled(options, "install-in-place"),
            patch_command: options
                .get_trimmed("patch-binary")
                .unwrap_or("patch")
                .to_string(),
            patch_options: options
                .get_trimmed("patch-options")
                .unwrap_or("-p0")
                .to_string(),
            patches: split_lines(options.get_or("patches", ""))
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            build_dir: options.get_trimmed("build-dir").map(PathBuf::from),
            inner_dir: options.get_trimmed("inner-dir").map(PathBuf::from),
            skip,
        };

        if config.shared {
            let fingerprint = Fingerprint::compute(&config);
            config.prefix = host.shared_root().join(fingerprint.as_str());
            info!(
                "Shared build for {}, using prefix {}",
                name,
                config.prefix.display()
            );
            options.set("location", config.prefix.to_string_lossy());
        }

        options.set("make-binary", config.make_binary.as_str());
        options.set("make-options", config.make_options.as_str());
        options.set("configure-options", config.configure_options.as_str());
        options.set("make-targets", config.make_targets.join("\n"));
        options.set("make-install-targets", config.install_targets.join("\n"));

        debug!(
            "Resolved {} for {}: configure={} make={} targets={:?}",
            name, config.platform, config.configure, config.make_binary, config.make_targets
        );

        Ok(config)
    }
}
