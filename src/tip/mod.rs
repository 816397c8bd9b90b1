// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tip lifecycle and synchronization engine.
//!
//! ```text
//!            create ----------------------.
//!              |                          v
//!   commit / amend / rewrite -->  head advances      push_tip --> refs/rtips/<remote>/<name>
//!              |                                        ^
//!   update = fetch + upgrade:                           |
//!     Idle -> InProgress -> Completed ------------------'
//!                 |   ^
//!                 v   | continue
//!             Conflicted --abort--> Idle (head/tail restored)
//!              |
//!   stack:  tail == base ? fast-forward base to head, delete tip
//!   delete: local refs + config, best-effort remote cleanup
//! ```
//!
//! Refs of tip `<name>`:
//!
//! ```text
//! refs/tips/<name>    head          tip.<name>.base = <full ref name of base>
//! refs/tails/<name>   tail (I1: tail == base target outside an update)
//! ```
//!
//! Every operation takes the repository handle explicitly; network
//! operations take the caller's [`RemoteHooks`](crate::git::RemoteHooks).

pub mod commit;
pub mod list;
pub mod rewrite;
pub mod stack;
pub mod store;
pub mod sync;
pub mod update;


use git2::Oid;

use crate::error::{TieResult, TipError};
use crate::git::TieRepo;
use crate::git::refs::{tail_ref, tip_ref};

pub use commit::{AmendMessage, CommitOutcome, TipOption, amend, commit, format_commit_message, select};
pub use list::{ListEntry, ListFilter, list};
pub use rewrite::{RewriteOutcome, rewrite, rewrite_abort, rewrite_continue};
pub use stack::{StackOutcome, stack};
pub use store::{DeleteOutcome, RemoteCleanup, create, delete, delete_tips, stacked_tips};
pub use sync::{FetchOutcome, PushReport, PushedTip, fetch, publish, push_tip, remote_of};
pub use update::{
    UpdateOutcome, UpdateReport, UpdateState, update, update_abort, update_continue, upgrade,
};

/// Snapshot of the three persisted facts of a tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tip {
    pub name: String,
    pub head: Oid,
    pub tail: Oid,
    pub base: String,
}

impl Tip {
    /// Read tip `name` from the repository.
    ///
    /// # Errors
    ///
    /// Returns `TipError::NoRefForShorthand` for an unknown tip,
    /// `TipError::TailMissing` or `TipError::BaseMissing` for a broken one.
    pub fn load(repo: &TieRepo, name: &str) -> TieResult<Self> {
        let head = repo
            .find_target(&tip_ref(name))?
            .ok_or_else(|| TipError::NoRefForShorthand(name.to_string()))?;
        let tail = repo
            .find_target(&tail_ref(name))?
            .ok_or_else(|| TipError::TailMissing {
                tip: name.to_string(),
            })?;
        let base = repo.require_base(name)?;
        Ok(Self {
            name: name.to_string(),
            head,
            tail,
            base,
        })
    }

    /// Full name of the head ref.
    #[must_use]
    pub fn head_ref(&self) -> String {
        tip_ref(&self.name)
    }

    /// Number of commits the tip owns (`tail..head`).
    ///
    /// # Errors
    ///
    /// Returns the libgit2 error when the graph cannot be walked.
    pub fn own_commits(&self, repo: &TieRepo) -> TieResult<usize> {
        Ok(repo.git().graph_ahead_behind(self.head, self.tail)?.0)
    }
}
