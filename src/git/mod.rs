// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git adapter layer.
//!
//! ```text
//!              tip engine
//!                  |
//!      ,-----------+------------,
//!      v           v            v
//!   TieRepo      refs       callbacks / editor
//!  (git2 handle) (namespace, (RemoteHooks, Editor
//!                 resolve)    seams)
//!      |                        |
//!      v                        v
//!   libgit2                  ShellGit
//!  (refs, config, rebase,   (git rebase -i)
//!   push, fetch, checkout)
//! ```
//!
//! **`TieRepo`** is the only repository handle; every engine call borrows it.
//! **`ShellGit`** covers what libgit2 lacks.

pub mod callbacks;
pub mod editor;
pub mod refs;
pub mod repo;
pub mod shell;

pub use callbacks::{RefUpdate, RefUpdateKind, RemoteHooks, TerminalHooks};
pub use editor::{Editor, GitEditor};
pub use refs::BaseKind;
pub use repo::{
    DEFAULT_TIPS_BRANCH_PREFIX, PUSH_TIPS_AS_BRANCHES_KEY, TIPS_BRANCH_PREFIX_KEY, TieRepo,
};
pub use shell::ShellGit;

#[cfg(test)]
mod tests;
