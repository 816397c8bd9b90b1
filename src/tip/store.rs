// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Creation and deletion of tips.

use std::fmt;

use super::Tip;
use super::sync;
use crate::error::{TieResult, TipError};
use crate::git::refs::{self, BaseKind, REFS_TIPS, remote_tip_ref, tail_ref, tip_ref};
use crate::git::{RemoteHooks, TieRepo};

/// Create tip `name` on `base` (HEAD's ref when `None` or empty) and select it.
///
/// `base` may be a shorthand. Afterwards head, tail and base point to the
/// same commit and HEAD is attached to the new tip.
///
/// # Errors
///
/// - `TipError::InvalidTipName` for an unusable name.
/// - `TipError::TipAlreadyExistsLocally` / `TipAlreadyExistsOnRemote`.
/// - `TipError::NoRefForShorthand` when `base` does not resolve.
/// - `TipError::DirtyWorkingTree` when switching to the base would
///   overwrite local changes.
pub fn create(repo: &TieRepo, name: &str, base: Option<&str>) -> TieResult<Tip> {
    refs::validate_tip_name(name)?;
    let previous_head = repo.head_ref_name()?;

    let base_ref = match base.map(str::trim).filter(|b| !b.is_empty()) {
        Some(short) => {
            let reference = refs::resolve(repo.git(), short)?;
            reference
                .name()
                .ok_or_else(|| TipError::NoRefForShorthand(short.to_string()))?
                .to_string()
        }
        None if previous_head == "HEAD" => {
            return Err(TipError::BaseMissing {
                tip: name.to_string(),
                reason: "HEAD is detached; name a base explicitly".to_string(),
            }
            .into());
        }
        None => previous_head.clone(),
    };

    if repo.find_target(&tip_ref(name))?.is_some() {
        return Err(TipError::TipAlreadyExistsLocally {
            name: name.to_string(),
        }
        .into());
    }
    if let Some(remote) = BaseKind::of(&base_ref).remote()
        && repo.find_target(&remote_tip_ref(remote, name))?.is_some()
    {
        return Err(TipError::TipAlreadyExistsOnRemote {
            name: name.to_string(),
            remote: remote.to_string(),
        }
        .into());
    }

    let target = repo.target_of(&base_ref)?;
    if base_ref != previous_head {
        repo.checkout_safe(target)?;
    }

    let log_message = format!("tie: create {name}");
    repo.set_ref(&tip_ref(name), target, &log_message)?;
    repo.set_ref(&tail_ref(name), target, &log_message)?;
    repo.set_base(name, &base_ref)?;
    repo.attach_head(&tip_ref(name), &log_message)?;

    tracing::info!(tip = name, base = %base_ref, %target, "created tip");
    Ok(Tip {
        name: name.to_string(),
        head: target,
        tail: target,
        base: base_ref,
    })
}

/// What happened to the remote copy of a deleted tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCleanup {
    /// The base is local; the tip was never pushed.
    NotNeeded,
    /// Removed from the remote and from the local mirrors.
    Removed { remote: String },
    /// The remote refused or could not be reached; the tip is gone locally only.
    Failed { remote: String, error: String },
}

/// Result of deleting one tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub tip: String,
    pub remote: RemoteCleanup,
}

impl DeleteOutcome {
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self.remote, RemoteCleanup::Failed { .. })
    }
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.remote {
            RemoteCleanup::Failed { remote, .. } => write!(
                f,
                "Tip '{}' has been deleted locally but not on {remote}.",
                self.tip
            ),
            _ => write!(f, "Deleted tip '{}'", self.tip),
        }
    }
}

/// Tip name from a tip name or a full `refs/tips/...` name.
fn normalize_tip_name(input: &str) -> TieResult<String> {
    if let Some(name) = refs::tip_name(input) {
        return Ok(name.to_string());
    }
    if input.starts_with("refs/") {
        return Err(TipError::not_a_tip(input).into());
    }
    Ok(input.to_string())
}

fn selected_tip(repo: &TieRepo) -> Option<String> {
    repo.current_tip().ok()
}

/// Delete tip `name`.
///
/// Local refs and the base entry are always removed. The remote copy is
/// removed on a best-effort basis, a failure only degrades the outcome.
///
/// # Errors
///
/// - `TipError::NotATip` for a full ref outside `refs/tips/`.
/// - `TipError::TipSelected` for the selected tip.
/// - `TipError::NoRefForShorthand` when no such tip exists.
pub fn delete(repo: &TieRepo, hooks: &dyn RemoteHooks, name: &str) -> TieResult<DeleteOutcome> {
    let name = normalize_tip_name(name)?;
    if selected_tip(repo).as_deref() == Some(name.as_str()) {
        return Err(TipError::TipSelected(name).into());
    }

    let base = repo.base_of(&name)?;
    let head_existed = repo.delete_ref(&tip_ref(&name))?;
    let tail_existed = repo.delete_ref(&tail_ref(&name))?;
    repo.remove_base(&name)?;
    if !head_existed && !tail_existed && base.is_none() {
        return Err(TipError::NoRefForShorthand(name).into());
    }
    tracing::info!(tip = %name, "deleted tip locally");

    let remote = match base.as_deref().map(BaseKind::of) {
        Some(kind) => match kind.remote() {
            Some(remote) => cleanup_remote(repo, hooks, remote, &name),
            None => RemoteCleanup::NotNeeded,
        },
        None => RemoteCleanup::NotNeeded,
    };

    Ok(DeleteOutcome { tip: name, remote })
}

fn cleanup_remote(
    repo: &TieRepo,
    hooks: &dyn RemoteHooks,
    remote: &str,
    name: &str,
) -> RemoteCleanup {
    match sync::delete_remote_tip(repo, hooks, remote, name) {
        Ok(()) => RemoteCleanup::Removed {
            remote: remote.to_string(),
        },
        Err(e) => {
            tracing::warn!(tip = name, remote, error = %e, "remote copy of the tip was not deleted");
            RemoteCleanup::Failed {
                remote: remote.to_string(),
                error: e.to_string(),
            }
        }
    }
}

/// Local tips, other than the selected one, whose own commits are all
/// contained in their base.
///
/// Tips without commits of their own are kept.
///
/// # Errors
///
/// Returns the libgit2 error when refs or the graph cannot be read.
pub fn stacked_tips(repo: &TieRepo) -> TieResult<Vec<String>> {
    let selected = selected_tip(repo);
    let mut stacked = Vec::new();
    for name in repo.tip_names()? {
        if selected.as_deref() == Some(name.as_str()) {
            continue;
        }
        let Ok(tip) = Tip::load(repo, &name) else {
            continue;
        };
        let Some(base_target) = repo.find_target(&tip.base)? else {
            continue;
        };
        if tip.head != tip.tail && repo.contains(base_target, tip.head)? {
            tracing::debug!(tip = %name, base = %tip.base, "tip is stacked");
            stacked.push(name);
        }
    }
    Ok(stacked)
}

/// Delete several tips, plus every stacked tip when `stacked` is set.
///
/// All names are checked before anything is deleted.
///
/// # Errors
///
/// Fails without deleting anything when a name is not a tip or is selected.
pub fn delete_tips(
    repo: &TieRepo,
    hooks: &dyn RemoteHooks,
    names: &[String],
    stacked: bool,
) -> TieResult<Vec<DeleteOutcome>> {
    let selected = selected_tip(repo);
    let mut targets: Vec<String> = Vec::new();
    for input in names {
        let name = normalize_tip_name(input)?;
        if selected.as_deref() == Some(name.as_str()) {
            return Err(TipError::TipSelected(name).into());
        }
        if repo.find_target(&format!("{REFS_TIPS}{name}"))?.is_none()
            && repo.base_of(&name)?.is_none()
        {
            return Err(TipError::NoRefForShorthand(input.clone()).into());
        }
        if !targets.contains(&name) {
            targets.push(name);
        }
    }
    if stacked {
        for name in stacked_tips(repo)? {
            if !targets.contains(&name) {
                targets.push(name);
            }
        }
    }

    targets
        .iter()
        .map(|name| delete(repo, hooks, name))
        .collect()
}
