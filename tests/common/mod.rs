// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared fixtures for the integration tests.
//!
//! ```text
//! <tmp>/origin.git   bare remote, master = initial commit
//! <tmp>/work         clone-like working repo, HEAD -> refs/heads/master
//!                    origin fetches refs/heads/* and refs/tips/*
//! <tmp>/other        second clone pushing to origin on demand
//! ```

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;
use tie_rs::error::TieResult;
use tie_rs::git::{Editor, TerminalHooks, TieRepo};

pub const README: &str = "README";

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn configure_user(repo: &Repository) {
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();
}

pub fn signature() -> Signature<'static> {
    Signature::now("Test", "test@example.com").unwrap()
}

/// Write `content` to `path` in the working tree and stage it.
pub fn stage(repo: &Repository, path: &str, content: &str) {
    let workdir = repo.workdir().expect("bare repository");
    fs::write(workdir.join(path), content).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
}

/// Stage `path` and commit it on HEAD.
pub fn commit_file(repo: &Repository, path: &str, content: &str, message: &str) -> Oid {
    stage(repo, path, content);
    let mut index = repo.index().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let parent = repo.head().unwrap().peel_to_commit().unwrap();
    let sig = signature();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
        .unwrap()
}

pub fn message_of(repo: &Repository, oid: Oid) -> String {
    repo.find_commit(oid)
        .unwrap()
        .message()
        .unwrap_or_default()
        .to_string()
}

pub fn target(repo: &Repository, refname: &str) -> Option<Oid> {
    repo.find_reference(refname)
        .ok()
        .and_then(|r| r.peel_to_commit().ok())
        .map(|c| c.id())
}

pub fn head_name(repo: &Repository) -> String {
    repo.head().unwrap().name().unwrap_or("HEAD").to_string()
}

/// A working repository with a bare `origin`.
pub struct Fixture {
    pub dir: TempDir,
    pub origin: PathBuf,
    pub repo: TieRepo,
    pub hooks: TerminalHooks,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = temp_dir();
        let origin = dir.path().join("origin.git");
        Repository::init_bare(&origin).unwrap();

        let work = dir.path().join("work");
        let git = Repository::init(&work).unwrap();
        configure_user(&git);
        {
            let sig = signature();
            fs::write(work.join(README), "line one\n").unwrap();
            let mut index = git.index().unwrap();
            index.add_path(Path::new(README)).unwrap();
            index.write().unwrap();
            let tree = git.find_tree(index.write_tree().unwrap()).unwrap();
            git.commit(Some("refs/heads/master"), &sig, &sig, "initial\n", &tree, &[])
                .unwrap();
            git.set_head("refs/heads/master").unwrap();

            let url = origin.to_str().unwrap();
            let mut remote = git.remote("origin", url).unwrap();
            git.remote_add_fetch("origin", "+refs/tips/*:refs/rtips/origin/*")
                .unwrap();
            remote
                .push(&["refs/heads/master:refs/heads/master"], None)
                .unwrap();
        }
        {
            let mut remote = git.find_remote("origin").unwrap();
            remote.fetch::<&str>(&[], None, None).unwrap();
        }

        let hooks = TerminalHooks::quiet(&git);
        Self {
            dir,
            origin,
            repo: TieRepo::from_repository(git),
            hooks,
        }
    }

    pub fn git(&self) -> &Repository {
        self.repo.git()
    }

    pub fn origin_repo(&self) -> Repository {
        Repository::open_bare(&self.origin).unwrap()
    }

    /// Commit on origin's `master` from a second clone.
    pub fn push_upstream(&self, path: &str, content: &str, message: &str) -> Oid {
        let other = self.dir.path().join("other");
        let repo = if other.exists() {
            let repo = Repository::open(&other).unwrap();
            repo.find_remote("origin")
                .unwrap()
                .fetch(&["+refs/heads/*:refs/remotes/origin/*"], None, None)
                .unwrap();
            let upstream = target(&repo, "refs/remotes/origin/master").unwrap();
            repo.reference("refs/heads/master", upstream, true, "sync")
                .unwrap();
            repo.checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
                .unwrap();
            repo
        } else {
            let repo = git2::build::RepoBuilder::new()
                .branch("master")
                .clone(self.origin.to_str().unwrap(), &other)
                .unwrap();
            configure_user(&repo);
            repo
        };
        let oid = commit_file(&repo, path, content, message);
        repo.find_remote("origin")
            .unwrap()
            .push(&["refs/heads/master:refs/heads/master"], None)
            .unwrap();
        oid
    }

    /// Add a remote whose URL leads nowhere, with a tracking branch on the
    /// current master commit.
    pub fn add_unreachable_remote(&self, name: &str) {
        let url = self.dir.path().join("missing.git");
        self.git().remote(name, url.to_str().unwrap()).unwrap();
        let master = target(self.git(), "refs/heads/master").unwrap();
        self.git()
            .reference(&format!("refs/remotes/{name}/master"), master, true, "test")
            .unwrap();
    }

    pub fn set_config(&self, key: &str, value: &str) {
        self.git().config().unwrap().set_str(key, value).unwrap();
    }
}

/// Editor returning a fixed text and remembering what it was shown.
pub struct ScriptedEditor {
    reply: String,
    pub shown: RefCell<Option<String>>,
}

impl ScriptedEditor {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            shown: RefCell::new(None),
        }
    }
}

impl Editor for ScriptedEditor {
    fn edit(&self, _config: &git2::Config, path: &Path) -> TieResult<String> {
        *self.shown.borrow_mut() = Some(fs::read_to_string(path)?);
        fs::write(path, &self.reply)?;
        Ok(self.reply.clone())
    }
}
