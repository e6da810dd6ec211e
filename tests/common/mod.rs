//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use commit_assist::{Project, SystemRunner};
use git2::{Oid, Repository, Signature};

/// A throwaway git repository usable by both git2 and the `git` CLI.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    ///
    /// Identity and signing are configured locally so `git commit` works
    /// regardless of the host's global config.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config
            .set_str("user.name", "Test User")
            .expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");
        config
            .set_bool("commit.gpgsign", false)
            .expect("Failed to disable signing");

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn project(&self) -> Project {
        Project::open(self.path()).expect("Failed to open project")
    }

    /// Write a file relative to the working tree root.
    pub fn write_file(&self, name: &str, content: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Stage `name` and commit it with git2. Returns the commit OID.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        self.write_file(name, content);

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Full message of the HEAD commit.
    pub fn head_message(&self) -> String {
        let head = self.repo.head().expect("Failed to read HEAD");
        let commit = head.peel_to_commit().expect("HEAD is not a commit");
        commit.message().expect("Commit message is not UTF-8").to_string()
    }

    /// Number of commits reachable from HEAD (0 for an unborn branch).
    pub fn commit_count(&self) -> usize {
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }
}

/// A runner with a generous timeout for real git invocations.
pub fn system_runner() -> SystemRunner {
    SystemRunner::new(Duration::from_secs(30))
}

/// Whether the `git` CLI is available; tests that shell out skip otherwise.
pub fn git_available() -> bool {
    which::which("git").is_ok()
}
