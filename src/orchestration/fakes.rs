//! Test doubles for the build collaborators

use crate::cache::Calculator;
use crate::error::{AssetsError, AssetsResult};
use crate::layer::{DirectoryIsolator, IsolationMapping};
use crate::orchestration::precompile::BuildProcess;
use crate::orchestration::process::{Executable, Execution, ExecutionOutput};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Ordered record of calls shared between fakes
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

#[derive(Debug, Default)]
struct CalculatorState {
    digest: String,
    fail: bool,
    received: Vec<Vec<PathBuf>>,
}

/// Calculator returning a preset digest
#[derive(Debug, Clone, Default)]
pub struct FakeCalculator {
    state: Arc<Mutex<CalculatorState>>,
}

impl FakeCalculator {
    pub fn new(digest: &str) -> Self {
        let fake = Self::default();
        fake.set_digest(digest);
        fake
    }

    pub fn set_digest(&self, digest: &str) {
        self.state.lock().unwrap().digest = digest.to_string();
    }

    pub fn fail(&self) {
        self.state.lock().unwrap().fail = true;
    }

    pub fn received(&self) -> Vec<Vec<PathBuf>> {
        self.state.lock().unwrap().received.clone()
    }
}

impl Calculator for FakeCalculator {
    fn sum(&self, paths: &[PathBuf]) -> AssetsResult<String> {
        let mut state = self.state.lock().unwrap();
        state.received.push(paths.to_vec());
        if state.fail {
            return Err(AssetsError::Checksum {
                path: paths.first().cloned().unwrap_or_default(),
                source: io::Error::other("some-error"),
            });
        }
        Ok(state.digest.clone())
    }
}

#[derive(Debug, Default)]
struct MemoryFs {
    dirs: BTreeSet<PathBuf>,
    links: BTreeMap<PathBuf, PathBuf>,
}

impl MemoryFs {
    fn occupied(&self, path: &Path) -> bool {
        self.dirs.contains(path) || self.links.contains_key(path)
    }
}

/// Directory isolator over an in-memory tree
///
/// Applies the same rules as the symlink isolator without touching disk:
/// links need an existing parent and an unoccupied target, and never
/// dangle, so the layer directory must have been reset first.
#[derive(Debug, Clone)]
pub struct MemoryIsolator {
    mapping: IsolationMapping,
    fs: Arc<Mutex<MemoryFs>>,
    fail_on: Arc<Mutex<Option<&'static str>>>,
    log: CallLog,
}

impl MemoryIsolator {
    pub fn new(mapping: IsolationMapping, log: CallLog) -> Self {
        Self {
            mapping,
            fs: Arc::default(),
            fail_on: Arc::default(),
            log,
        }
    }

    /// Make the named operation fail
    pub fn fail_on(&self, operation: &'static str) {
        *self.fail_on.lock().unwrap() = Some(operation);
    }

    /// Create a directory in the in-memory tree
    pub fn mkdir(&self, path: &Path) {
        self.fs.lock().unwrap().dirs.insert(path.to_path_buf());
    }

    /// Where a link in the in-memory tree points
    pub fn link_target(&self, path: &Path) -> Option<PathBuf> {
        self.fs.lock().unwrap().links.get(path).cloned()
    }

    fn check(&self, operation: &'static str, path: &Path) -> AssetsResult<()> {
        if *self.fail_on.lock().unwrap() != Some(operation) {
            return Ok(());
        }
        let source = io::Error::other("some-error");
        Err(match operation {
            "link" => AssetsError::Symlink {
                path: path.to_path_buf(),
                source,
            },
            _ => AssetsError::io(format!("{} {}", operation, path.display()), source),
        })
    }
}

impl DirectoryIsolator for MemoryIsolator {
    fn reset_local(&self, working_dir: &Path) -> AssetsResult<()> {
        self.log.push(format!("reset_local {}", working_dir.display()));
        self.check("reset_local", working_dir)?;

        let mut fs = self.fs.lock().unwrap();
        for entry in self.mapping.entries() {
            let target = working_dir.join(&entry.local);
            fs.dirs.retain(|d| !d.starts_with(&target));
            fs.links.remove(&target);
        }
        for entry in self.mapping.entries() {
            let target = working_dir.join(&entry.local);
            if let Some(parent) = target.parent() {
                fs.dirs.extend(parent.ancestors().map(Path::to_path_buf));
            }
        }
        Ok(())
    }

    fn reset_layer(&self, layer_path: &Path) -> AssetsResult<()> {
        self.log.push(format!("reset_layer {}", layer_path.display()));
        self.check("reset_layer", layer_path)?;

        let mut fs = self.fs.lock().unwrap();
        for entry in self.mapping.entries() {
            fs.dirs.insert(layer_path.join(&entry.slug));
        }
        Ok(())
    }

    fn link(&self, layer_path: &Path, working_dir: &Path) -> AssetsResult<()> {
        self.log
            .push(format!("link {} {}", layer_path.display(), working_dir.display()));
        self.check("link", working_dir)?;

        let mut fs = self.fs.lock().unwrap();
        for entry in self.mapping.entries() {
            let link = working_dir.join(&entry.local);
            let parent_exists = link.parent().is_some_and(|p| fs.dirs.contains(p));
            if !parent_exists {
                return Err(AssetsError::Symlink {
                    path: link,
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            }
            if fs.occupied(&link) {
                return Err(AssetsError::Symlink {
                    path: link,
                    source: io::Error::from(io::ErrorKind::AlreadyExists),
                });
            }
            let target = layer_path.join(&entry.slug);
            if !fs.dirs.contains(&target) {
                return Err(AssetsError::Symlink {
                    path: link,
                    source: io::Error::new(io::ErrorKind::NotFound, "dangling link"),
                });
            }
            fs.links.insert(link, target);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct BuildState {
    working_dirs: Vec<PathBuf>,
    error: Option<String>,
}

/// Build step that records its calls
#[derive(Debug, Clone)]
pub struct FakeBuildProcess {
    state: Arc<Mutex<BuildState>>,
    log: CallLog,
}

impl FakeBuildProcess {
    pub fn new(log: CallLog) -> Self {
        Self {
            state: Arc::default(),
            log,
        }
    }

    pub fn fail_with(&self, message: &str) {
        self.state.lock().unwrap().error = Some(message.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().working_dirs.len()
    }

    pub fn working_dirs(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().working_dirs.clone()
    }
}

#[async_trait]
impl BuildProcess for FakeBuildProcess {
    async fn execute(&self, working_dir: &Path) -> AssetsResult<()> {
        self.log.push(format!("execute {}", working_dir.display()));
        let mut state = self.state.lock().unwrap();
        state.working_dirs.push(working_dir.to_path_buf());
        match &state.error {
            Some(message) => Err(AssetsError::build_process("bundle", "exit status: 1", message)),
            None => Ok(()),
        }
    }
}

/// Executable that records executions and returns a preset output
#[derive(Debug, Clone)]
pub struct FakeExecutable {
    program: String,
    output: ExecutionOutput,
    executions: Arc<Mutex<Vec<Execution>>>,
}

impl FakeExecutable {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            output: ExecutionOutput::success(""),
            executions: Arc::default(),
        }
    }

    pub fn returning(mut self, output: ExecutionOutput) -> Self {
        self.output = output;
        self
    }

    pub fn executions(&self) -> Vec<Execution> {
        self.executions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Executable for FakeExecutable {
    fn program(&self) -> &str {
        &self.program
    }

    async fn execute(&self, execution: &Execution) -> AssetsResult<ExecutionOutput> {
        self.executions.lock().unwrap().push(execution.clone());
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_isolator_requires_reset_before_link() {
        let isolator = MemoryIsolator::new(IsolationMapping::default(), CallLog::new());
        let working = Path::new("/workspace");
        let layer = Path::new("/layers/assets");

        let err = isolator.link(layer, working).unwrap_err();
        assert!(matches!(err, AssetsError::Symlink { .. }));

        isolator.reset_local(working).unwrap();
        let err = isolator.link(layer, working).unwrap_err();
        assert!(err.to_string().contains("dangling link"));

        isolator.reset_layer(layer).unwrap();
        isolator.link(layer, working).unwrap();
        assert_eq!(
            isolator.link_target(&working.join("tmp/cache/assets")),
            Some(layer.join("tmp-cache-assets"))
        );
    }

    #[test]
    fn memory_isolator_rejects_occupied_target() {
        let isolator = MemoryIsolator::new(IsolationMapping::default(), CallLog::new());
        let working = Path::new("/workspace");
        isolator.reset_local(working).unwrap();
        isolator.reset_layer(Path::new("/layers/assets")).unwrap();
        isolator.mkdir(&working.join("public/packs"));

        let err = isolator.link(Path::new("/layers/assets"), working).unwrap_err();
        match err {
            AssetsError::Symlink { path, source } => {
                assert_eq!(path, working.join("public/packs"));
                assert_eq!(source.kind(), io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
