use std::{
    fs, io,
    path::{Path, PathBuf},
};

use jvmscan_core::{
    Platform, ScanConfig,
    config::{PROGRAM_FILES_VARS, RUNTIME_HOME_VARS, SEARCH_PATH_VAR, VERSION_MANAGER_VAR},
};
use tracing::{debug, trace};

use crate::candidate::{Candidate, CandidateError, CandidateSet};

const WINDOWS_VENDOR_DIRS: [&str; 5] = [
    "Java",
    "Eclipse Adoptium",
    "AdoptOpenJDK",
    "Amazon Corretto",
    "Zulu",
];

const MAC_ROOT: &str = "/Library/Java/JavaVirtualMachines";

const UNIX_ROOTS: [&str; 5] = [
    "/usr/lib/jvm",
    "/usr/java",
    "/opt/java",
    "/opt/jdk",
    "/usr/local/java",
];

/// Where a candidate path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    CurrentRuntime,
    EnvVar(&'static str),
    SearchPath,
    VersionManager,
    WellKnown(PathBuf),
}

#[derive(Debug)]
pub enum Outcome {
    Accepted,
    Duplicate,
    Rejected(CandidateError),
}

/// One path the collector looked at and what happened to it.
#[derive(Debug)]
pub struct Attempt {
    pub path: PathBuf,
    pub source: Source,
    pub outcome: Outcome,
}

/// Full account of a collection run; `candidates` is what the scan uses.
#[derive(Debug, Default)]
pub struct CollectTrace {
    pub candidates: CandidateSet,
    pub attempts: Vec<Attempt>,
    /// Roots that exist but could not be listed.
    pub unreadable_roots: Vec<(PathBuf, io::Error)>,
}

impl CollectTrace {
    pub fn rejections(&self) -> impl Iterator<Item = (&Path, &CandidateError)> {
        self.attempts.iter().filter_map(|attempt| match &attempt.outcome {
            Outcome::Rejected(err) => Some((attempt.path.as_path(), err)),
            _ => None,
        })
    }
}

/// Builds the candidate set for one platform from the sources in a fixed order.
#[derive(Debug, Clone)]
pub struct Collector {
    config: ScanConfig,
}

impl Collector {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn collect(&self) -> CandidateSet {
        self.collect_traced().candidates
    }

    pub fn collect_traced(&self) -> CollectTrace {
        let mut run = Run {
            exe: self.config.platform.java_executable(),
            trace: CollectTrace::default(),
        };

        self.add_current_runtime(&mut run);
        self.add_env_roots(&mut run);
        self.add_search_path(&mut run);
        self.add_version_manager(&mut run);

        match self.config.platform {
            Platform::Windows => self.add_windows_roots(&mut run),
            Platform::Mac => {
                let root = self.config.rooted(MAC_ROOT);
                run.add_from_parent(&root, &["Contents", "Home", "bin"]);
                run.add_from_parent(&root, &["Contents", "Home", "jre", "bin"]);
            }
            Platform::Unix => {
                for root in UNIX_ROOTS {
                    run.add_from_parent(&self.config.rooted(root), &["bin"]);
                }
            }
        }

        for root in &self.config.extra_roots {
            run.add_from_parent(root, &["bin"]);
        }

        debug!(
            platform = %self.config.platform,
            candidates = run.trace.candidates.len(),
            attempts = run.trace.attempts.len(),
            "candidate collection finished"
        );
        run.trace
    }

    fn add_current_runtime(&self, run: &mut Run) {
        let Some(home) = &self.config.runtime_home else {
            return;
        };
        let path = home.join("bin").join(run.exe);
        run.add(path, Source::CurrentRuntime);
        if let Some(parent) = home.parent() {
            let path = parent.join("bin").join(run.exe);
            run.add(path, Source::CurrentRuntime);
        }
    }

    fn add_env_roots(&self, run: &mut Run) {
        for var in RUNTIME_HOME_VARS {
            let Some(root) = self.config.env.get(var) else {
                continue;
            };
            let root = Path::new(root);
            run.add(root.join("bin").join(run.exe), Source::EnvVar(var));
            run.add(root.join("jre").join("bin").join(run.exe), Source::EnvVar(var));
        }
    }

    fn add_search_path(&self, run: &mut Run) {
        let Some(search_path) = self.config.env.get(SEARCH_PATH_VAR) else {
            return;
        };
        let separator = self.config.platform.path_list_separator();
        for entry in search_path.split(separator).filter(|e| !e.is_empty()) {
            run.add(Path::new(entry).join(run.exe), Source::SearchPath);
        }
    }

    fn add_version_manager(&self, run: &mut Run) {
        if let Some(dir) = self.config.env.get(VERSION_MANAGER_VAR) {
            run.add_from_parent(&Path::new(dir).join("java"), &["bin"]);
        }
    }

    fn add_windows_roots(&self, run: &mut Run) {
        for var in PROGRAM_FILES_VARS {
            let Some(root) = self.config.env.get(var) else {
                continue;
            };
            for vendor in WINDOWS_VENDOR_DIRS {
                run.add_from_parent(&Path::new(root).join(vendor), &["bin"]);
            }
        }
    }
}

struct Run {
    exe: &'static str,
    trace: CollectTrace,
}

impl Run {
    fn add(&mut self, path: PathBuf, source: Source) {
        let outcome = match Candidate::validate(&path) {
            Ok(candidate) => {
                let canonical = candidate.path().to_path_buf();
                if self.trace.candidates.insert(candidate) {
                    debug!(path = %path.display(), canonical = %canonical.display(), ?source, "candidate accepted");
                    Outcome::Accepted
                } else {
                    trace!(path = %path.display(), "duplicate candidate");
                    Outcome::Duplicate
                }
            }
            Err(err) => {
                debug!(path = %path.display(), reason = %err, "candidate rejected");
                Outcome::Rejected(err)
            }
        };
        self.trace.attempts.push(Attempt {
            path,
            source,
            outcome,
        });
    }

    /// Treat every subdirectory of `parent` as an installation and try
    /// `<child>/<suffix...>/<exe>`.
    fn add_from_parent(&mut self, parent: &Path, suffix: &[&str]) {
        let children = match child_dirs(parent) {
            Ok(children) => children,
            // Roots that do not exist contribute nothing.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return,
            Err(err) => {
                debug!(root = %parent.display(), error = %err, "cannot list installation root");
                self.trace.unreadable_roots.push((parent.to_path_buf(), err));
                return;
            }
        };

        for child in children {
            let mut path = child;
            path.extend(suffix);
            path.push(self.exe);
            self.add(path, Source::WellKnown(parent.to_path_buf()));
        }
    }
}

/// Subdirectories of `parent`, sorted by name so repeated scans agree.
fn child_dirs(parent: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(parent)? {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
