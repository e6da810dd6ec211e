//! Project discovery and staged file listing.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};
use tracing::debug;

use crate::error::GitError;
use crate::git::run_git;
use crate::process::ProcessRunner;

/// A repository working tree the assistant operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    path: PathBuf,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Discover the repository containing `path` and describe its working tree.
    ///
    /// Searches parent directories like `git` does, so any path inside the
    /// working tree resolves to the same project.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|source| GitError::NotARepository {
            path: path.display().to_string(),
            source,
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::BareRepository(path.display().to_string()))?;
        let workdir = workdir
            .canonicalize()
            .unwrap_or_else(|_| workdir.to_path_buf());

        let name = workdir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| workdir.display().to_string());

        debug!(name = %name, path = %workdir.display(), "opened project");
        Ok(Self::new(name, workdir))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Short name of the checked-out branch.
    ///
    /// Returns `None` for a detached HEAD. An unborn branch (no commits yet)
    /// reports the name HEAD points at.
    pub fn current_branch(&self) -> Result<Option<String>, GitError> {
        let repo = Repository::open(&self.path).map_err(|source| GitError::NotARepository {
            path: self.path.display().to_string(),
            source,
        })?;

        match repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => Ok(repo
                .find_reference("HEAD")
                .ok()
                .and_then(|r| r.symbolic_target().map(str::to_string))
                .map(|target| target.trim_start_matches("refs/heads/").to_string())),
            Err(source) => Err(GitError::NotARepository {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }
}

/// Status of a staged file as reported by `git diff --name-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Other,
}

impl FileStatus {
    fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => FileStatus::Added,
            Some('M') => FileStatus::Modified,
            Some('D') => FileStatus::Deleted,
            Some('R') => FileStatus::Renamed,
            Some('C') => FileStatus::Copied,
            _ => FileStatus::Other,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
            FileStatus::Copied => write!(f, "Copied"),
            FileStatus::Other => write!(f, "Other"),
        }
    }
}

/// A file in the index that differs from HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: String,
    pub status: FileStatus,
    /// Source path for renames and copies.
    pub old_path: Option<String>,
}

/// List files currently staged in the project.
///
/// Does not stage anything itself; callers that want the full working tree
/// run the staging step first.
pub async fn staged_files<R: ProcessRunner + ?Sized>(
    runner: &R,
    project: &Project,
) -> Result<Vec<StagedFile>, GitError> {
    let output = run_git(runner, project.path(), &["diff", "--cached", "--name-status"]).await?;
    Ok(parse_name_status(&output))
}

fn parse_name_status(output: &str) -> Vec<StagedFile> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let code = fields.next()?.trim();
            if code.is_empty() {
                return None;
            }
            let status = FileStatus::from_code(code);
            let first = fields.next()?.to_string();

            match (status, fields.next()) {
                (FileStatus::Renamed | FileStatus::Copied, Some(new_path)) => Some(StagedFile {
                    path: new_path.to_string(),
                    status,
                    old_path: Some(first),
                }),
                _ => Some(StagedFile {
                    path: first,
                    status,
                    old_path: None,
                }),
            }
        })
        .collect()
}
