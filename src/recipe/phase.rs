// src/recipe/phase.rs

//! Build phases and hook points
//!
//! Phases advance strictly in declaration order; each one is the
//! precondition for the next. Any phase may end in `Failed`.

use std::fmt;

/// State of a recipe install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Directories created, nothing fetched yet
    Started,
    /// Source archive available locally
    Downloaded,
    /// Archive extracted, compile directory known
    Unpacked,
    /// Build environment overlay assembled
    EnvPrepared,
    /// Configure script and build directory resolved
    ConfigureChosen,
    /// Patches applied
    Patched,
    /// Autogen script run (or skipped)
    Autogenned,
    /// Configure script run (or skipped)
    Configured,
    /// Make targets built
    Made,
    /// Install targets run into the prefix
    Installed,
    /// Working directories removed
    Cleaned,
    /// Terminal failure
    Failed,
}

impl Phase {
    /// The phase that must follow this one on the success path
    pub fn next(self) -> Option<Phase> {
        match self {
            Self::Started => Some(Self::Downloaded),
            Self::Downloaded => Some(Self::Unpacked),
            Self::Unpacked => Some(Self::EnvPrepared),
            Self::EnvPrepared => Some(Self::ConfigureChosen),
            Self::ConfigureChosen => Some(Self::Patched),
            Self::Patched => Some(Self::Autogenned),
            Self::Autogenned => Some(Self::Configured),
            Self::Configured => Some(Self::Made),
            Self::Made => Some(Self::Installed),
            Self::Installed => Some(Self::Cleaned),
            Self::Cleaned | Self::Failed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Downloaded => "downloaded",
            Self::Unpacked => "unpacked",
            Self::EnvPrepared => "env-prepared",
            Self::ConfigureChosen => "configure-chosen",
            Self::Patched => "patched",
            Self::Autogenned => "autogenned",
            Self::Configured => "configured",
            Self::Made => "made",
            Self::Installed => "installed",
            Self::Cleaned => "cleaned",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed points in the phase sequence where a hook may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    PreUnpack,
    PostUnpack,
    PreConfigure,
    PreMake,
    PostBuild,
    PostMake,
    PendingMakeInstall,
}

impl HookPoint {
    /// Option key the hook is looked up under
    pub fn option_key(self) -> &'static str {
        match self {
            Self::PreUnpack => "pre-unpack-hook",
            Self::PostUnpack => "post-unpack-hook",
            Self::PreConfigure => "pre-configure-hook",
            Self::PreMake => "pre-make-hook",
            Self::PostBuild => "post-build-hook",
            Self::PostMake => "post-make-hook",
            Self::PendingMakeInstall => "pending-make-install-hook",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_key())
    }
}
