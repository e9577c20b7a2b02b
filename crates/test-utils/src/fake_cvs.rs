use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cvskeeper::config::ConfigFile;
use cvskeeper::errors::{KeeperError, Result};
use cvskeeper::exec::{BoxFuture, CommandResult, CommandRunner, Invocation, VcsOp};
use cvskeeper::fs::mock::MockFileSystem;
use cvskeeper::fs::FileSystem;
use cvskeeper::handler::KeeperHandler;

/// Shared record of every invocation a [`SimulatedCvs`] received.
#[derive(Debug, Clone, Default)]
pub struct CvsLog {
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl CvsLog {
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<VcsOp> {
        self.invocations().into_iter().map(|i| i.op).collect()
    }

    /// Op kinds in order, e.g. `["add", "commit"]`.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.ops().iter().map(VcsOp::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.ops().iter().filter(|op| op.kind() == kind).count()
    }

    pub fn adds(&self) -> Vec<Vec<String>> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                VcsOp::Add { paths } => Some(paths),
                _ => None,
            })
            .collect()
    }

    /// `(paths, message)` for every commit.
    pub fn commits(&self) -> Vec<(Vec<String>, String)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                VcsOp::Commit { paths, message } => Some((paths, message)),
                _ => None,
            })
            .collect()
    }

    /// Every path any op was issued with.
    pub fn all_paths(&self) -> Vec<String> {
        self.ops()
            .iter()
            .flat_map(|op| op.paths().to_vec())
            .collect()
    }

    pub fn clear(&self) {
        self.invocations.lock().unwrap().clear();
    }
}

/// A fake CVS client that keeps `CVS/Entries` in a [`MockFileSystem`] up to
/// date the way the real client does:
///
/// - `add` of a file appends a file entry to its directory's `Entries`;
/// - `add` of a directory creates `<dir>/CVS/Entries`, but the parent only
///   learns about it on the next `status`.
pub struct SimulatedCvs {
    fs: MockFileSystem,
    log: CvsLog,
    pending_dirs: Vec<PathBuf>,
    status_output: String,
    fail_on: Option<&'static str>,
}

impl SimulatedCvs {
    pub fn new(fs: MockFileSystem) -> (Self, CvsLog) {
        let log = CvsLog::default();
        let sim = Self {
            fs,
            log: log.clone(),
            pending_dirs: Vec::new(),
            status_output: String::new(),
            fail_on: None,
        };
        (sim, log)
    }

    /// Output returned for status queries that name files.
    pub fn with_status_output(mut self, output: &str) -> Self {
        self.status_output = output.to_string();
        self
    }

    /// Make every op of `kind` exit with status 1.
    pub fn failing_on(mut self, kind: &'static str) -> Self {
        self.fail_on = Some(kind);
        self
    }

    fn apply(&mut self, invocation: &Invocation) -> CommandResult {
        match &invocation.op {
            VcsOp::Add { paths } => {
                for rel in paths {
                    let abs = invocation.cwd.join(rel);
                    if self.fs_is_dir(&abs) {
                        self.fs.add_file(abs.join("CVS").join("Entries"), "");
                        self.pending_dirs.push(abs);
                    } else {
                        track_file(&self.fs, &abs);
                    }
                }
                CommandResult::success("")
            }
            VcsOp::Commit { .. } => CommandResult::success(""),
            VcsOp::Status { paths } => {
                for dir in std::mem::take(&mut self.pending_dirs) {
                    append_dir_entry(&self.fs, &dir);
                }
                if paths.is_empty() {
                    CommandResult::success("")
                } else {
                    CommandResult::success(self.status_output.clone())
                }
            }
        }
    }

    fn fs_is_dir(&self, path: &Path) -> bool {
        self.fs.is_dir(path)
    }
}

impl CommandRunner for SimulatedCvs {
    fn run<'a>(&'a mut self, invocation: &'a Invocation) -> BoxFuture<'a, Result<CommandResult>> {
        self.log.invocations.lock().unwrap().push(invocation.clone());
        let result = if self.fail_on == Some(invocation.op.kind()) {
            CommandResult {
                status: 1,
                stdout: String::new(),
                stderr: format!("cvs {}: simulated failure", invocation.op.kind()),
            }
        } else {
            self.apply(invocation)
        };
        Box::pin(async move { Ok::<_, KeeperError>(result) })
    }
}

/// Turn `root` into a CVS checkout with an empty `Entries`.
pub fn cvs_checkout(fs: &MockFileSystem, root: &str) {
    fs.add_file(Path::new(root).join("CVS").join("Entries"), "");
}

/// Record `path` as a tracked file in its directory's `Entries`.
pub fn track_file(fs: &MockFileSystem, path: impl AsRef<Path>) {
    let path = path.as_ref();
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return;
    };
    fs.append_line(
        dir.join("CVS").join("Entries"),
        &format!("/{}/1.1/Mon Jan  1 00:00:00 2024//", name.to_string_lossy()),
    );
}

/// Record `dir` as a tracked directory, including its own `CVS/Entries`.
pub fn track_dir(fs: &MockFileSystem, dir: impl AsRef<Path>) {
    let dir = dir.as_ref();
    fs.add_file(dir.join("CVS").join("Entries"), "");
    append_dir_entry(fs, dir);
}

fn append_dir_entry(fs: &MockFileSystem, dir: &Path) {
    let (Some(parent), Some(name)) = (dir.parent(), dir.file_name()) else {
        return;
    };
    fs.append_line(
        parent.join("CVS").join("Entries"),
        &format!("D/{}////", name.to_string_lossy()),
    );
}

/// A handler wired to a mock filesystem and a [`SimulatedCvs`].
pub struct Harness {
    pub fs: MockFileSystem,
    pub log: CvsLog,
    pub handler: KeeperHandler,
}

impl Harness {
    pub fn new(cfg: &ConfigFile, fs: MockFileSystem, acting_user: Option<&str>) -> Self {
        Self::with_cvs(cfg, fs, acting_user, |sim| sim)
    }

    /// Like [`Harness::new`], letting the caller tweak the simulator.
    pub fn with_cvs(
        cfg: &ConfigFile,
        fs: MockFileSystem,
        acting_user: Option<&str>,
        tweak: impl FnOnce(SimulatedCvs) -> SimulatedCvs,
    ) -> Self {
        let (sim, log) = SimulatedCvs::new(fs.clone());
        let handler = cvskeeper::build_handler(
            cfg,
            Arc::new(fs.clone()),
            Box::new(tweak(sim)),
            acting_user.map(str::to_string),
        );
        Self { fs, log, handler }
    }
}
