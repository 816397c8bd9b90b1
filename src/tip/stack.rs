// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Fast-forward of a base to the current tip, which is then deleted.

use std::fmt;

use super::Tip;
use super::store::{self, DeleteOutcome};
use super::sync::{self, PushReport};
use crate::error::{SyncError, TieError, TieResult, TipError};
use crate::git::refs::{self, BaseKind};
use crate::git::{RemoteHooks, TieRepo};

/// Result of [`stack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutcome {
    pub tip: String,
    pub base: String,
    /// Commits the base moved forward by.
    pub commits: usize,
    /// Publication of the base when it is itself a tip.
    pub push: Option<PushReport>,
    pub deleted: DeleteOutcome,
}

impl fmt::Display for StackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.commits == 1 { "" } else { "s" };
        write!(
            f,
            "{} <- {} ({} commit{plural})\n{}",
            refs::shorthand(&self.base),
            self.tip,
            self.commits,
            self.deleted
        )
    }
}

/// Move the base of the current tip to the tip's head, attach HEAD to the
/// base and delete the tip.
///
/// # Errors
///
/// - `TipError::NotATip` when HEAD is not on a tip.
/// - `TipError::NotABranch` for a remote tip or any other non-branch base.
/// - `TipError::OutOfDate` when the tail is not the base target, or the
///   remote branch moved since the last fetch.
pub fn stack(repo: &TieRepo, hooks: &dyn RemoteHooks) -> TieResult<StackOutcome> {
    let name = repo.current_tip()?;
    let tip = Tip::load(repo, &name)?;
    let kind = BaseKind::of(&tip.base);
    if matches!(kind, BaseKind::RemoteTip { .. } | BaseKind::Other) {
        return Err(TipError::NotABranch(tip.base).into());
    }

    let base_target = repo
        .find_target(&tip.base)?
        .ok_or_else(|| TipError::BaseMissing {
            tip: name.clone(),
            reason: format!("{} does not exist", tip.base),
        })?;
    if tip.tail != base_target {
        return Err(out_of_date(&tip));
    }
    let commits = repo.git().graph_ahead_behind(tip.head, base_target)?.0;

    let log_message = format!("tie: stack {name}");
    let mut push = None;
    match &kind {
        BaseKind::RemoteBranch { remote, target } => {
            let refspec = format!("{}:{target}", tip.head_ref());
            sync::push(repo, hooks, remote, &[refspec]).map_err(|e| match e.as_sync() {
                Some(SyncError::NonFastForward { .. }) => out_of_date(&tip),
                _ => e,
            })?;
            repo.set_ref(&tip.base, tip.head, &log_message)?;
        }
        BaseKind::LocalTip => {
            repo.set_ref(&tip.base, tip.head, &log_message)?;
            if let Some(base_tip) = refs::tip_name(&tip.base) {
                push = Some(sync::publish(repo, hooks, base_tip));
            }
        }
        _ => repo.set_ref(&tip.base, tip.head, &log_message)?,
    }
    tracing::info!(tip = %name, base = %tip.base, commits, "stacked tip");

    repo.attach_head(&tip.base, &log_message)?;
    let deleted = store::delete(repo, hooks, &name)?;

    Ok(StackOutcome {
        tip: name,
        base: tip.base,
        commits,
        push,
        deleted,
    })
}

fn out_of_date(tip: &Tip) -> TieError {
    TipError::OutOfDate {
        tip: tip.name.clone(),
        base: tip.base.clone(),
    }
    .into()
}
