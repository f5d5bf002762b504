use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use snafu::{ResultExt, Snafu};

pub type CandidateResult<T> = std::result::Result<T, CandidateError>;

/// Why a path was not accepted as a launcher.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CandidateError {
    #[snafu(display("`{}` does not exist", path.display()))]
    Missing { path: PathBuf },
    #[snafu(display("cannot stat `{}`: {source}", path.display()))]
    Inaccessible {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("`{}` is not a regular file", path.display()))]
    NotAFile { path: PathBuf },
    #[snafu(display("`{}` is not executable", path.display()))]
    NotExecutable { path: PathBuf },
    #[snafu(display("cannot resolve `{}`: {source}", path.display()))]
    Canonicalize {
        source: std::io::Error,
        path: PathBuf,
    },
}

/// A launcher executable, identified by its canonical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Candidate {
    path: PathBuf,
}

impl Candidate {
    /// Accept `path` if it is an existing, executable regular file, and
    /// resolve it to its canonical form.
    pub fn validate(path: &Path) -> CandidateResult<Self> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CandidateError::Missing {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => {
                return Err(err).context(InaccessibleSnafu { path });
            }
        };

        if !metadata.is_file() {
            return NotAFileSnafu { path }.fail();
        }
        if !is_executable(&metadata) {
            return NotExecutableSnafu { path }.fail();
        }

        let canonical = fs::canonicalize(path).context(CanonicalizeSnafu { path })?;
        Ok(Self { path: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

/// Insertion-ordered set of candidates, unique by canonical path.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    ordered: Vec<Candidate>,
    seen: HashSet<PathBuf>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when a candidate with the same canonical path is
    /// already present.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if !self.seen.insert(candidate.path.clone()) {
            return false;
        }
        self.ordered.push(candidate);
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl IntoIterator for CandidateSet {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path, mode: u32) {
        fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = mode;
    }

    #[test]
    fn missing_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Candidate::validate(&dir.path().join("java")).unwrap_err();
        assert!(matches!(err, CandidateError::Missing { .. }));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Candidate::validate(dir.path()).unwrap_err();
        assert!(matches!(err, CandidateError::NotAFile { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let java = dir.path().join("java");
        touch(&java, 0o644);
        let err = Candidate::validate(&java).unwrap_err();
        assert!(matches!(err, CandidateError::NotExecutable { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn symlink_resolves_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real-java");
        touch(&real, 0o755);
        let link = dir.path().join("java");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let candidate = Candidate::validate(&link).unwrap();
        assert_eq!(candidate.path(), fs::canonicalize(&real).unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn dangling_symlink_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("java");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();
        let err = Candidate::validate(&link).unwrap_err();
        assert!(matches!(err, CandidateError::Missing { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn set_keeps_first_insertion_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        touch(&a, 0o755);
        touch(&b, 0o755);

        let mut set = CandidateSet::new();
        assert!(set.insert(Candidate::validate(&b).unwrap()));
        assert!(set.insert(Candidate::validate(&a).unwrap()));
        assert!(!set.insert(Candidate::validate(&b).unwrap()));

        let names: Vec<_> = set
            .iter()
            .map(|c| c.path().file_name().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
