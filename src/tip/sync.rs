// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Push and fetch of tips.
//!
//! ```text
//! push_tip(name)
//!   base = refs/remotes/<remote>/<b> | refs/rtips/<remote>/<t>   else NoRemoteBase
//!   +refs/tips/<name>:refs/tips/<name>
//!   +refs/tips/<name>:refs/heads/<prefix><name>     (compatibility mode)
//!   on success: refs/rtips/<remote>/<name> (+ refs/remotes/<remote>/<prefix><name>)
//!
//! fetch()
//!   HEAD -> remote ref | tip -> base -> ... -> remote ref   else no-op
//!   pruning fetch of the remote's refspecs
//!   HEAD's ref moved: baseline checkout old -> new
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use git2::{ErrorCode, FetchOptions, FetchPrune, Oid, PushOptions, Remote};

use crate::error::{SyncError, TieResult};
use crate::git::callbacks::{classify_error, classify_rejection, remote_callbacks};
use crate::git::refs::{self, REFS_HEADS, REFS_REMOTES, remote_tip_ref, tip_ref};
use crate::git::{RefUpdate, RemoteHooks, TieRepo};

/// A tip that reached its remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedTip {
    pub tip: String,
    pub remote: String,
    pub target: Oid,
}

/// Result of publishing a tip after a local change.
///
/// Failures are data here: the local change already happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushReport {
    Pushed(PushedTip),
    /// The base is local, nothing was sent.
    NotPushed { tip: String, base: String },
    Failed { tip: String, error: String },
}

impl PushReport {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for PushReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pushed(pushed) => write!(f, "Pushed tip '{}' to {}", pushed.tip, pushed.remote),
            Self::NotPushed { tip, base } => {
                write!(f, "Tip '{tip}' is based on local '{}'; not pushed", refs::shorthand(base))
            }
            Self::Failed { tip, error } => {
                write!(f, "Tip '{tip}' has been updated locally but not pushed: {error}")
            }
        }
    }
}

/// Result of [`fetch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Remote that was fetched, `None` when HEAD leads to no remote.
    pub remote: Option<String>,
    pub updates: Vec<RefUpdate>,
}

/// Force-push tip `name` to the remote of its base.
///
/// # Errors
///
/// - `SyncError::NoRemoteBase` when the base is not a remote ref; no
///   network call is made.
/// - `SyncError::RemoteNotFound`, `RemoteUnreachable`,
///   `AuthenticationFailed` or `PushRejected` from the push itself.
pub fn push_tip(repo: &TieRepo, hooks: &dyn RemoteHooks, name: &str) -> TieResult<PushedTip> {
    let base = repo.require_base(name)?;
    let Ok((remote, _)) = refs::explode_remote_ref(&base) else {
        return Err(SyncError::NoRemoteBase {
            tip: name.to_string(),
            base,
        }
        .into());
    };

    let head_ref = tip_ref(name);
    let target = repo.target_of(&head_ref)?;
    let compat = repo.compat_prefix()?;

    let mut refspecs = vec![format!("+{head_ref}:{head_ref}")];
    if let Some(prefix) = &compat {
        refspecs.push(format!("+{head_ref}:{REFS_HEADS}{prefix}{name}"));
    }
    push(repo, hooks, &remote, &refspecs)?;

    repo.set_ref(&remote_tip_ref(&remote, name), target, "tie: push")?;
    if let Some(prefix) = &compat {
        repo.set_ref(&compat_mirror(&remote, prefix, name), target, "tie: push")?;
    }

    tracing::info!(tip = name, %remote, %target, "pushed tip");
    Ok(PushedTip {
        tip: name.to_string(),
        remote,
        target,
    })
}

/// [`push_tip`] with the outcome folded into a [`PushReport`].
pub fn publish(repo: &TieRepo, hooks: &dyn RemoteHooks, name: &str) -> PushReport {
    match push_tip(repo, hooks, name) {
        Ok(pushed) => PushReport::Pushed(pushed),
        Err(e) => match e.as_sync() {
            Some(SyncError::NoRemoteBase { tip, base }) => {
                tracing::debug!(%tip, %base, "local base, tip not pushed");
                PushReport::NotPushed {
                    tip: tip.clone(),
                    base: base.clone(),
                }
            }
            _ => {
                tracing::warn!(tip = name, error = %e, "tip was not pushed");
                PushReport::Failed {
                    tip: name.to_string(),
                    error: e.to_string(),
                }
            }
        },
    }
}

/// Delete tip `name` (and its compatibility-mode branch) on `remote`, then
/// the local mirrors.
pub(crate) fn delete_remote_tip(
    repo: &TieRepo,
    hooks: &dyn RemoteHooks,
    remote: &str,
    name: &str,
) -> TieResult<()> {
    let compat = repo.compat_prefix()?;
    let mut refspecs = vec![format!(":{}", tip_ref(name))];
    if let Some(prefix) = &compat {
        refspecs.push(format!(":{REFS_HEADS}{prefix}{name}"));
    }
    push(repo, hooks, remote, &refspecs)?;

    repo.delete_ref(&remote_tip_ref(remote, name))?;
    if let Some(prefix) = &compat {
        repo.delete_ref(&compat_mirror(remote, prefix, name))?;
    }
    tracing::info!(tip = name, remote, "deleted tip on remote");
    Ok(())
}

fn compat_mirror(remote: &str, prefix: &str, name: &str) -> String {
    format!("{REFS_REMOTES}{remote}/{prefix}{name}")
}

fn find_remote<'r>(repo: &'r TieRepo, name: &str) -> TieResult<Remote<'r>> {
    repo.git().find_remote(name).map_err(|e| match e.code() {
        ErrorCode::NotFound | ErrorCode::InvalidSpec => SyncError::RemoteNotFound(name.to_string()).into(),
        _ => e.into(),
    })
}

/// Destination ref of a refspec.
fn refspec_destination(refspec: &str) -> &str {
    refspec
        .rsplit_once(':')
        .map_or(refspec, |(_, dst)| dst)
}

/// Push `refspecs` to `remote`, turning per-ref rejections into errors.
pub(crate) fn push(
    repo: &TieRepo,
    hooks: &dyn RemoteHooks,
    remote_name: &str,
    refspecs: &[String],
) -> TieResult<()> {
    let mut remote = find_remote(repo, remote_name)?;
    tracing::debug!(remote = remote_name, ?refspecs, "pushing");

    let rejection: RefCell<Option<(String, String)>> = RefCell::new(None);
    let mut callbacks = remote_callbacks(hooks);
    callbacks.push_update_reference(|refname, status| {
        if let Some(message) = status {
            rejection
                .borrow_mut()
                .get_or_insert_with(|| (refname.to_string(), message.to_string()));
        }
        Ok(())
    });
    let mut options = PushOptions::new();
    options.remote_callbacks(callbacks);

    let result = remote.push(refspecs, Some(&mut options));
    hooks.transfer_done();

    if let Err(e) = result {
        let refname = refspecs.first().map_or("", |s| refspec_destination(s));
        return Err(classify_error(remote_name, refname, &e).into());
    }
    if let Some((refname, status)) = rejection.borrow().as_ref() {
        return Err(classify_rejection(remote_name, refname, status).into());
    }
    Ok(())
}

/// Remote reached from `refname` by following tip bases.
///
/// Remote refs give their remote directly; tips defer to their base. The
/// walk ends with `None` on a local branch, a missing base or a cycle.
///
/// # Errors
///
/// Returns the libgit2 error when git config cannot be read.
pub fn remote_of(repo: &TieRepo, refname: &str) -> TieResult<Option<String>> {
    let mut seen = HashSet::new();
    let mut current = refname.to_string();
    loop {
        if let Ok((remote, _)) = refs::explode_remote_ref(&current) {
            return Ok(Some(remote));
        }
        let Some(tip) = refs::tip_name(&current) else {
            return Ok(None);
        };
        if !seen.insert(tip.to_string()) {
            tracing::warn!(tip, "tip bases form a cycle");
            return Ok(None);
        }
        match repo.base_of(tip)? {
            Some(base) => current = base,
            None => return Ok(None),
        }
    }
}

/// Fetch the remote HEAD leads to and bring HEAD's working tree along when
/// its ref moved.
///
/// # Errors
///
/// - `TipError::DirtyWorkingTree` when HEAD is on a remote ref and the tree
///   is not clean, or when a local change conflicts with the new target.
/// - `SyncError` variants from the fetch itself.
pub fn fetch(repo: &TieRepo, hooks: &dyn RemoteHooks) -> TieResult<FetchOutcome> {
    let head = repo.head_ref_name()?;
    if refs::explode_remote_ref(&head).is_ok() {
        repo.ensure_clean()?;
    }

    let Some(remote_name) = remote_of(repo, &head)? else {
        tracing::debug!(%head, "HEAD leads to no remote, nothing to fetch");
        return Ok(FetchOutcome::default());
    };
    let mut remote = find_remote(repo, &remote_name)?;
    let refspecs: Vec<String> = remote
        .fetch_refspecs()?
        .iter()
        .flatten()
        .map(str::to_string)
        .collect();
    tracing::debug!(remote = %remote_name, ?refspecs, "fetching");

    let updates = RefCell::new(Vec::new());
    let result = {
        let mut callbacks = remote_callbacks(hooks);
        callbacks.update_tips(|refname, old, new| {
            updates.borrow_mut().push(RefUpdate {
                refname: refname.to_string(),
                old,
                new,
            });
            true
        });
        let mut options = FetchOptions::new();
        options.prune(FetchPrune::On).remote_callbacks(callbacks);
        remote.fetch(&refspecs, Some(&mut options), None)
    };
    hooks.transfer_done();
    result.map_err(|e| classify_error(&remote_name, "", &e))?;

    let updates = updates.into_inner();
    for update in &updates {
        hooks.ref_updated(update);
    }
    if let Some(update) = updates
        .iter()
        .find(|u| u.refname == head && !u.old.is_zero() && !u.new.is_zero())
    {
        repo.checkout_from_baseline(&head, update.old, update.new)?;
    }

    Ok(FetchOutcome {
        remote: Some(remote_name),
        updates,
    })
}
