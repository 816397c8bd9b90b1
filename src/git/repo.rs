// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository handle passed to every tip operation.
//!
//! ```text
//! TieRepo
//!   |-- HEAD       head_ref_name, current_tip, attach_head
//!   |-- status     is_clean, ensure_clean
//!   |-- config     base_of, set_base, remove_base, tip_bases, compat_prefix
//!   |-- refs       target_of, find_target, set_ref, delete_ref, refs_with_prefix
//!   '-- checkout   checkout_safe, checkout_from_baseline
//! ```

use std::cell::RefCell;
use std::path::Path;

use git2::{
    CheckoutNotificationType, Commit, ErrorCode, Oid, Repository, RepositoryState, Signature,
    Status, StatusOptions, build::CheckoutBuilder,
};

use super::refs::{self, REFS_TIPS};
use crate::error::{TieResult, TipError};

/// Git config switch for pushing tips into the branch namespace too.
pub const PUSH_TIPS_AS_BRANCHES_KEY: &str = "tie.pushTipsAsBranches";
/// Git config key naming an explicit branch prefix; enables the mode when set.
pub const TIPS_BRANCH_PREFIX_KEY: &str = "tie.tipsBranchPrefix";
/// Prefix used when the mode is enabled through the boolean switch.
pub const DEFAULT_TIPS_BRANCH_PREFIX: &str = "tips/";

/// Maps a missing config entry or ref to `None`.
pub(crate) fn optional<T>(result: Result<T, git2::Error>) -> Result<Option<T>, git2::Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// An opened repository plus the tool-level fallbacks that git config may
/// override.
pub struct TieRepo {
    repo: Repository,
    compat_fallback: Option<String>,
}

impl std::fmt::Debug for TieRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieRepo")
            .field("path", &self.repo.path())
            .field("compat_fallback", &self.compat_fallback)
            .finish()
    }
}

impl TieRepo {
    /// Find the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when no repository is found.
    pub fn discover<P: AsRef<Path>>(path: P) -> TieResult<Self> {
        Ok(Self::from_repository(Repository::discover(path)?))
    }

    /// Open the repository at exactly `path`.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when `path` is not a repository.
    pub fn open<P: AsRef<Path>>(path: P) -> TieResult<Self> {
        Ok(Self::from_repository(Repository::open(path)?))
    }

    #[must_use]
    pub const fn from_repository(repo: Repository) -> Self {
        Self {
            repo,
            compat_fallback: None,
        }
    }

    /// Branch prefix used when git config says nothing about the
    /// compatibility mode.
    #[must_use]
    pub fn with_compat_fallback(mut self, prefix: Option<String>) -> Self {
        self.compat_fallback = prefix;
        self
    }

    /// The underlying libgit2 repository.
    #[must_use]
    pub const fn git(&self) -> &Repository {
        &self.repo
    }

    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Directory holding the repository metadata (`.git`).
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    #[must_use]
    pub fn state(&self) -> RepositoryState {
        self.repo.state()
    }

    // --- HEAD ---

    /// Full name of the ref HEAD resolves to, `HEAD` when detached.
    ///
    /// # Errors
    ///
    /// Fails on an unborn HEAD.
    pub fn head_ref_name(&self) -> TieResult<String> {
        let head = self.repo.head()?;
        Ok(head.name().unwrap_or("HEAD").to_string())
    }

    /// Name of the tip HEAD is attached to.
    ///
    /// # Errors
    ///
    /// Returns `TipError::NotATip` when HEAD is on anything else.
    pub fn current_tip(&self) -> TieResult<String> {
        let head = self.head_ref_name()?;
        refs::tip_name(&head)
            .map(str::to_string)
            .ok_or_else(|| TipError::not_a_tip(head).into())
    }

    /// Point HEAD symbolically at `refname`.
    ///
    /// `set_head` would detach HEAD for refs outside `refs/heads/`.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when HEAD cannot be written.
    pub fn attach_head(&self, refname: &str, log_message: &str) -> TieResult<()> {
        self.repo
            .reference_symbolic("HEAD", refname, true, log_message)?;
        tracing::debug!(refname, "attached HEAD");
        Ok(())
    }

    // --- Status ---

    /// Tracked files that differ from HEAD in the index or the working tree.
    ///
    /// Untracked and ignored files are not reported.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the status cannot be computed.
    pub fn dirty_paths(&self) -> TieResult<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);
        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT)
            .map(|entry| entry.path().unwrap_or("<non-utf8 path>").to_string())
            .collect())
    }

    /// # Errors
    ///
    /// Returns the libgit2 error when the status cannot be computed.
    pub fn is_clean(&self) -> TieResult<bool> {
        Ok(self.dirty_paths()?.is_empty())
    }

    /// # Errors
    ///
    /// Returns `TipError::DirtyWorkingTree` listing the changed paths.
    pub fn ensure_clean(&self) -> TieResult<()> {
        let dirty = self.dirty_paths()?;
        if dirty.is_empty() {
            Ok(())
        } else {
            Err(TipError::DirtyWorkingTree(dirty.join(", ")).into())
        }
    }

    // --- Config ---

    /// Base recorded for tip `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the config cannot be read.
    pub fn base_of(&self, name: &str) -> TieResult<Option<String>> {
        let config = self.repo.config()?;
        Ok(optional(config.get_string(&refs::base_key(name)))?)
    }

    /// Base recorded for tip `name`.
    ///
    /// # Errors
    ///
    /// Returns `TipError::BaseMissing` when no base is recorded.
    pub fn require_base(&self, name: &str) -> TieResult<String> {
        self.base_of(name)?.ok_or_else(|| {
            TipError::BaseMissing {
                tip: name.to_string(),
                reason: format!("{} is not set", refs::base_key(name)),
            }
            .into()
        })
    }

    /// # Errors
    ///
    /// Returns the libgit2 error when the config cannot be written.
    pub fn set_base(&self, name: &str, base: &str) -> TieResult<()> {
        let mut config = self.repo.config()?;
        config.set_str(&refs::base_key(name), base)?;
        Ok(())
    }

    /// Remove the base entry of tip `name`; a missing entry is not an error.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the config cannot be written.
    pub fn remove_base(&self, name: &str) -> TieResult<()> {
        let mut config = self.repo.config()?;
        optional(config.remove(&refs::base_key(name)))?;
        Ok(())
    }

    /// Every `(tip, base)` pair recorded in git config.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the config cannot be read.
    pub fn tip_bases(&self) -> TieResult<Vec<(String, String)>> {
        let config = self.repo.config()?;
        let mut entries = config.entries(Some(r"^tip\..*\.base$"))?;
        let mut bases = Vec::new();
        while let Some(entry) = entries.next() {
            let entry = entry?;
            let (Some(key), Some(value)) = (entry.name(), entry.value()) else {
                continue;
            };
            if let Some(tip) = key
                .strip_prefix("tip.")
                .and_then(|rest| rest.strip_suffix(".base"))
            {
                bases.push((tip.to_string(), value.to_string()));
            }
        }
        Ok(bases)
    }

    /// Branch prefix of the compatibility mode, `None` when disabled.
    ///
    /// `tie.tipsBranchPrefix` wins over `tie.pushTipsAsBranches`, and both
    /// win over the tool-level fallback.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the config cannot be read.
    pub fn compat_prefix(&self) -> TieResult<Option<String>> {
        let config = self.repo.config()?;
        if let Some(prefix) = optional(config.get_string(TIPS_BRANCH_PREFIX_KEY))?
            && !prefix.is_empty()
        {
            return Ok(Some(prefix));
        }
        Ok(match optional(config.get_bool(PUSH_TIPS_AS_BRANCHES_KEY))? {
            Some(true) => Some(DEFAULT_TIPS_BRANCH_PREFIX.to_string()),
            Some(false) => None,
            None => self.compat_fallback.clone(),
        })
    }

    // --- Refs ---

    /// Commit a ref points to, peeling tags.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the ref does not exist.
    pub fn target_of(&self, refname: &str) -> TieResult<Oid> {
        let reference = self.repo.find_reference(refname)?;
        Ok(reference.peel_to_commit()?.id())
    }

    /// Like [`Self::target_of`], `None` when the ref does not exist.
    ///
    /// # Errors
    ///
    /// Returns other libgit2 errors.
    pub fn find_target(&self, refname: &str) -> TieResult<Option<Oid>> {
        match optional(self.repo.find_reference(refname))? {
            Some(reference) => Ok(Some(reference.peel_to_commit()?.id())),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns the libgit2 error when the ref cannot be written.
    pub fn set_ref(&self, refname: &str, target: Oid, log_message: &str) -> TieResult<()> {
        self.repo.reference(refname, target, true, log_message)?;
        tracing::debug!(refname, %target, "updated ref");
        Ok(())
    }

    /// Delete a ref; returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the ref cannot be deleted.
    pub fn delete_ref(&self, refname: &str) -> TieResult<bool> {
        match optional(self.repo.find_reference(refname))? {
            Some(mut reference) => {
                reference.delete()?;
                tracing::debug!(refname, "deleted ref");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Sorted full names of the refs under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the refs cannot be listed.
    pub fn refs_with_prefix(&self, prefix: &str) -> TieResult<Vec<String>> {
        let mut names = Vec::new();
        for reference in self.repo.references_glob(&format!("{prefix}*"))? {
            let reference = reference?;
            if let Some(name) = reference.name()
                && name.starts_with(prefix)
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Names of all local tips, sorted.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the refs cannot be listed.
    pub fn tip_names(&self) -> TieResult<Vec<String>> {
        Ok(self
            .refs_with_prefix(REFS_TIPS)?
            .iter()
            .filter_map(|r| refs::tip_name(r).map(str::to_string))
            .collect())
    }

    // --- Objects ---

    /// # Errors
    ///
    /// Returns the libgit2 error when `oid` is not a commit.
    pub fn commit(&self, oid: Oid) -> TieResult<Commit<'_>> {
        Ok(self.repo.find_commit(oid)?)
    }

    /// Signature from `user.name` and `user.email`.
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when no identity is configured.
    pub fn signature(&self) -> TieResult<Signature<'static>> {
        Ok(self.repo.signature()?)
    }

    /// Whether `ancestor` is reachable from `descendant` (or equal to it).
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the graph cannot be walked.
    pub fn contains(&self, descendant: Oid, ancestor: Oid) -> TieResult<bool> {
        Ok(descendant == ancestor || self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    // --- Checkout ---

    /// Safe checkout of `target`'s tree against the current HEAD.
    ///
    /// HEAD itself is not moved. A local change in the way surfaces as
    /// `TipError::DirtyWorkingTree`.
    ///
    /// # Errors
    ///
    /// Returns `TipError::DirtyWorkingTree` on checkout conflicts.
    pub fn checkout_safe(&self, target: Oid) -> TieResult<()> {
        let commit = self.repo.find_commit(target)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(checkout_error)?;
        Ok(())
    }

    /// Move the working tree of `refname` (HEAD's target) from `old` to
    /// `new`, applying only the diff between the two commits.
    ///
    /// HEAD is parked on `old` during the checkout so that libgit2 uses it as
    /// the baseline, then attached to `refname` again. When the checkout
    /// fails HEAD stays detached on `old`, which still matches the tree.
    ///
    /// # Errors
    ///
    /// Returns `TipError::DirtyWorkingTree` naming the paths in the way and
    /// the ref to select once they are moved.
    pub fn checkout_from_baseline(&self, refname: &str, old: Oid, new: Oid) -> TieResult<()> {
        self.repo.set_head_detached(old)?;
        let commit = self.repo.find_commit(new)?;
        let conflicts = RefCell::new(Vec::new());
        let result = {
            let mut checkout = CheckoutBuilder::new();
            checkout
                .safe()
                .notify_on(CheckoutNotificationType::CONFLICT)
                .notify(|_, path, _, _, _| {
                    if let Some(path) = path {
                        conflicts.borrow_mut().push(path.display().to_string());
                    }
                    true
                });
            self.repo
                .checkout_tree(commit.as_object(), Some(&mut checkout))
        };

        match result {
            Ok(()) => self.attach_head(refname, "tie: fetch"),
            Err(e) => {
                let conflicts = conflicts.into_inner();
                tracing::warn!(
                    %refname, %old, %new, ?conflicts,
                    "checkout failed, HEAD left detached on the previous commit"
                );
                if conflicts.is_empty() && e.code() != ErrorCode::Conflict {
                    return Err(e.into());
                }
                let paths = if conflicts.is_empty() {
                    e.message().to_string()
                } else {
                    conflicts.join(", ")
                };
                Err(TipError::DirtyWorkingTree(format!(
                    "{paths} would be overwritten by {refname}; HEAD is detached on {old}, \
                     run 'tie select {}' once they are moved away",
                    refs::shorthand(refname)
                ))
                .into())
            }
        }
    }
}

fn checkout_error(e: git2::Error) -> crate::error::TieError {
    if e.code() == ErrorCode::Conflict {
        TipError::DirtyWorkingTree(e.message().to_string()).into()
    } else {
        e.into()
    }
}
