// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Interactive rewrite of the commits a tip owns, through `git rebase -i`.

use std::fmt;
use std::path::Path;

use git2::RepositoryState;

use super::Tip;
use super::sync::{self, PushReport};
use crate::error::{TieResult, TipError};
use crate::git::{RemoteHooks, ShellGit, TieRepo};

/// Result of a rewrite step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The rebase finished and the tip was published.
    Finished { tip: String, push: PushReport },
    /// git stopped (edit, conflict); continue or abort later.
    Paused { tip: String },
}

impl fmt::Display for RewriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished { tip, .. } => write!(f, "Rewrote tip '{tip}'"),
            Self::Paused { tip } => write!(
                f,
                "Rewrite of tip '{tip}' paused. Run 'tie rewrite continue' or 'tie rewrite abort'"
            ),
        }
    }
}

fn workdir(repo: &TieRepo) -> TieResult<&Path> {
    repo.workdir()
        .ok_or_else(|| crate::error::other("cannot rewrite in a bare repository"))
}

/// Run `git rebase -i` over the commits of the current tip.
///
/// # Errors
///
/// - `TipError::NotATip` when HEAD is not on a tip.
/// - `ProcessError` when git fails without leaving a rebase in progress.
pub fn rewrite(repo: &TieRepo, hooks: &dyn RemoteHooks) -> TieResult<RewriteOutcome> {
    let name = repo.current_tip()?;
    let tip = Tip::load(repo, &name)?;
    let tail = tip.tail.to_string();
    tracing::info!(tip = %name, %tail, "rewriting tip");

    let result = ShellGit::git_interactive(&["rebase", "-i", "--onto", &tail, &tail], workdir(repo)?);
    settle(repo, hooks, name, result)
}

/// Tip being rewritten, from the state git keeps during the rebase.
fn rewritten_tip(repo: &TieRepo) -> TieResult<String> {
    if repo.state() != RepositoryState::RebaseInteractive {
        return Err(TipError::NoRewriteInProgress.into());
    }
    let head_name = std::fs::read_to_string(repo.git_dir().join("rebase-merge").join("head-name"))?;
    let head_name = head_name.trim();
    crate::git::refs::tip_name(head_name)
        .map(str::to_string)
        .ok_or_else(|| TipError::not_a_tip(head_name).into())
}

/// `git rebase --continue`.
///
/// # Errors
///
/// Returns `TipError::NoRewriteInProgress` outside of an interactive rebase.
pub fn rewrite_continue(repo: &TieRepo, hooks: &dyn RemoteHooks) -> TieResult<RewriteOutcome> {
    let name = rewritten_tip(repo)?;
    let result = ShellGit::git_interactive(&["rebase", "--continue"], workdir(repo)?);
    settle(repo, hooks, name, result)
}

/// `git rebase --abort`; the tip is back where it was.
///
/// # Errors
///
/// Returns `TipError::NoRewriteInProgress` outside of an interactive rebase.
pub fn rewrite_abort(repo: &TieRepo) -> TieResult<String> {
    let name = rewritten_tip(repo)?;
    ShellGit::git_interactive(&["rebase", "--abort"], workdir(repo)?)?;
    tracing::info!(tip = %name, "rewrite aborted");
    Ok(name)
}

fn settle(
    repo: &TieRepo,
    hooks: &dyn RemoteHooks,
    name: String,
    result: TieResult<()>,
) -> TieResult<RewriteOutcome> {
    if repo.state() != RepositoryState::Clean {
        if let Err(e) = &result {
            tracing::debug!(error = %e, "git stopped during the rewrite");
        }
        return Ok(RewriteOutcome::Paused { tip: name });
    }
    result?;

    let push = sync::publish(repo, hooks, &name);
    tracing::info!(tip = %name, "rewrite finished");
    Ok(RewriteOutcome::Finished { tip: name, push })
}
