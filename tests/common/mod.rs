// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.
//!
//! The fakes record every collaborator call into one ordered event log so
//! tests can assert on phase ordering as well as on command lines.

#![allow(dead_code)]

use cmmi::filesystem::copy_tree;
use cmmi::{
    BuildEnv, Collaborators, Downloader, HookPoint, HookRunner, HostConfig, Invocation, Options,
    PatchApplier, PatchRequest, ProcessExecutor, Result, RunStatus, Unpacker,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const PKG_URL: &str = "http://x/pkg-1.0.tar.gz";

/// One collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Fetch(String),
    Unpack(PathBuf),
    Patch(usize),
    Hook(HookPoint),
    Run { command: String, cwd: PathBuf },
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

/// Downloader that hands out a fixture source tree for any URL
pub struct FixtureDownloader {
    source: PathBuf,
    log: EventLog,
}

impl Downloader for FixtureDownloader {
    fn fetch(&self, url: &str, _checksum: Option<&str>) -> Result<PathBuf> {
        self.log.lock().unwrap().push(Event::Fetch(url.to_string()));
        Ok(self.source.clone())
    }
}

/// Unpacker copying the fixture tree under its own name
pub struct CopyUnpacker {
    log: EventLog,
}

impl Unpacker for CopyUnpacker {
    fn unpack(&self, archive: &Path, destination: &Path) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(Event::Unpack(destination.to_path_buf()));
        let name = archive.file_name().unwrap();
        copy_tree(archive, &destination.join(name))
    }
}

pub struct RecordingPatcher {
    log: EventLog,
}

impl PatchApplier for RecordingPatcher {
    fn apply(&self, request: &PatchRequest<'_>) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(Event::Patch(request.patches.len()));
        Ok(())
    }
}

pub struct RecordingHooks {
    log: EventLog,
}

impl HookRunner for RecordingHooks {
    fn invoke(&self, hook: HookPoint, _value: &str, _cwd: &Path, _env: &BuildEnv) -> Result<()> {
        self.log.lock().unwrap().push(Event::Hook(hook));
        Ok(())
    }
}

/// Executor that records command lines instead of running them
///
/// It fails any command whose last word is the configured failing target,
/// and makes `install` targets drop a file into the install prefix.
pub struct FakeExecutor {
    log: EventLog,
    fail_on: Option<String>,
    install_into: Option<PathBuf>,
}

impl FakeExecutor {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_on: None,
            install_into: None,
        }
    }

    pub fn failing_on(mut self, target: &str) -> Self {
        self.fail_on = Some(target.to_string());
        self
    }

    pub fn installing_into(mut self, prefix: &Path) -> Self {
        self.install_into = Some(prefix.to_path_buf());
        self
    }
}

impl ProcessExecutor for FakeExecutor {
    fn run(&self, invocation: &Invocation<'_>) -> Result<RunStatus> {
        self.log.lock().unwrap().push(Event::Run {
            command: invocation.command.to_string(),
            cwd: invocation.cwd.to_path_buf(),
        });

        let last = invocation.command.split_whitespace().last().unwrap_or("");
        if self.fail_on.as_deref() == Some(last) {
            return Ok(RunStatus::from_code(2));
        }
        if last == "install" {
            if let Some(prefix) = &self.install_into {
                fs::create_dir_all(prefix.join("bin"))?;
                fs::write(prefix.join("bin/pkg"), "new build\n")?;
            }
        }
        Ok(RunStatus::from_code(0))
    }
}

/// Scratch host layout with a fixture source tree
pub struct Harness {
    pub temp_dir: TempDir,
    pub host: HostConfig,
    /// Fixture source tree, `<temp>/sources/pkg-1.0`
    pub source: PathBuf,
    pub log: EventLog,
}

impl Harness {
    /// A harness whose source tree has a configure script
    pub fn new() -> Self {
        let harness = Self::without_configure();
        write_script(&harness.source.join("configure"), "#!/bin/sh\nexit 0\n");
        harness
    }

    /// A harness whose source tree has no configure script
    pub fn without_configure() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let host = HostConfig::rooted_at(temp_dir.path());
        let source = temp_dir.path().join("sources").join("pkg-1.0");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("Makefile"), "all:\n").unwrap();

        Self {
            temp_dir,
            host,
            source,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Default prefix of part `name`
    pub fn prefix(&self, name: &str) -> PathBuf {
        self.host.parts_dir.join(name)
    }

    pub fn tmp_dir(&self, name: &str) -> PathBuf {
        self.host.work_dir.join(format!("__cmmi__{}__tmp", name))
    }

    pub fn executor(&self) -> FakeExecutor {
        FakeExecutor::new(Arc::clone(&self.log))
    }

    /// Recording collaborators around `executor`
    pub fn collaborators_with(&self, executor: FakeExecutor) -> Collaborators {
        Collaborators {
            downloader: Box::new(FixtureDownloader {
                source: self.source.clone(),
                log: Arc::clone(&self.log),
            }),
            unpacker: Box::new(CopyUnpacker {
                log: Arc::clone(&self.log),
            }),
            patcher: Box::new(RecordingPatcher {
                log: Arc::clone(&self.log),
            }),
            hooks: Box::new(RecordingHooks {
                log: Arc::clone(&self.log),
            }),
            executor: Arc::new(executor),
        }
    }

    /// Recording collaborators installing into the prefix of `name`
    pub fn collaborators(&self, name: &str) -> Collaborators {
        self.collaborators_with(self.executor().installing_into(&self.prefix(name)))
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    /// Command lines run so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Run { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

/// Build an option mapping from pairs
pub fn options(pairs: &[(&str, &str)]) -> Options {
    pairs.iter().copied().collect()
}

/// Write an executable script
pub fn write_script(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
