// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Rebase of the current tip onto the current target of its base.
//!
//! ```text
//!            upgrade()
//!   Idle ----------------> InProgress ---- all commits replayed ----> Completed
//!    ^                       |    ^                                     |
//!    |                       |    | update_continue()                   | tail := onto
//!    |           conflict    v    |                                     | push if replayed > 0
//!    '--- update_abort() -- Conflicted                                  v
//!         head/tail restored                                           Idle
//! ```
//!
//! The sequence survives the process: libgit2 keeps its own rebase state
//! under `.git/rebase-merge`, and `tie-update.json` next to it remembers the
//! tip, its base and the refs to restore on abort.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use git2::{ErrorCode, Oid, Rebase, RebaseOptions, RepositoryState, Signature};
use serde::{Deserialize, Serialize};

use super::sync::{self, FetchOutcome, PushReport};
use super::Tip;
use crate::error::{TieResult, TipError};
use crate::git::refs::{tail_ref, tip_ref};
use crate::git::repo::optional;
use crate::git::{RemoteHooks, TieRepo};

/// File holding the open update sequence, relative to the git directory.
pub const UPDATE_STATE_FILE: &str = "tie-update.json";

/// Durable description of an open update sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateState {
    pub tip: String,
    pub base: String,
    #[serde(with = "oid_hex")]
    pub onto: Oid,
    #[serde(with = "oid_hex")]
    pub orig_head: Oid,
    #[serde(with = "oid_hex")]
    pub orig_tail: Oid,
}

mod oid_hex {
    use git2::Oid;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(oid: &Oid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&oid.to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Oid, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Oid::from_str(&hex).map_err(serde::de::Error::custom)
    }
}

impl UpdateState {
    #[must_use]
    pub fn path(repo: &TieRepo) -> PathBuf {
        repo.git_dir().join(UPDATE_STATE_FILE)
    }

    /// The open sequence, `None` when there is none.
    ///
    /// # Errors
    ///
    /// Fails when the state file exists but cannot be read or parsed.
    pub fn load(repo: &TieRepo) -> TieResult<Option<Self>> {
        let content = match fs::read_to_string(Self::path(repo)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| crate::error::other(format!("corrupt {UPDATE_STATE_FILE}: {e}")))
    }

    /// # Errors
    ///
    /// Fails when the state file cannot be written.
    pub fn save(&self, repo: &TieRepo) -> TieResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::other(format!("cannot encode update state: {e}")))?;
        fs::write(Self::path(repo), json)?;
        tracing::debug!(tip = %self.tip, onto = %self.onto, "saved update state");
        Ok(())
    }

    /// # Errors
    ///
    /// Fails when an existing state file cannot be removed.
    pub fn clear(repo: &TieRepo) -> TieResult<()> {
        match fs::remove_file(Self::path(repo)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Result of a rebase of the current tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The tail already sits on the base target; nothing changed.
    UpToDate { tip: String, base: String },
    Updated {
        tip: String,
        base: String,
        /// Commits replayed onto the base; zero for an empty tip.
        replayed: usize,
        /// Present when commits were replayed.
        push: Option<PushReport>,
    },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate { tip, base } => {
                write!(f, "Current tip '{tip}' is already up to date with '{base}'")
            }
            Self::Updated { tip, base, .. } => {
                write!(f, "Updated current tip '{tip}' on top of '{base}'")
            }
        }
    }
}

/// Result of [`update`]: the fetch, then the rebase when HEAD is on a tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub fetch: FetchOutcome,
    pub upgrade: Option<UpdateOutcome>,
}

fn ensure_no_sequence(repo: &TieRepo) -> TieResult<()> {
    if UpdateState::path(repo).exists() || repo.state() != RepositoryState::Clean {
        return Err(TipError::UpdateInProgress.into());
    }
    Ok(())
}

/// Fetch the remote HEAD leads to, then rebase the current tip.
///
/// Outside of a tip only the fetch happens.
///
/// # Errors
///
/// Any error of [`sync::fetch`] or [`upgrade`].
pub fn update(repo: &TieRepo, hooks: &dyn RemoteHooks) -> TieResult<UpdateReport> {
    ensure_no_sequence(repo)?;
    let on_tip = repo.current_tip().is_ok();
    if on_tip {
        repo.ensure_clean()?;
    }

    let fetch = sync::fetch(repo, hooks)?;
    let upgrade = if on_tip {
        Some(upgrade(repo, hooks)?)
    } else {
        tracing::debug!("HEAD is not on a tip, fetch only");
        None
    };
    Ok(UpdateReport { fetch, upgrade })
}

/// Rebase the current tip onto the current target of its base, without
/// fetching.
///
/// # Errors
///
/// - `TipError::NotATip`, `DirtyWorkingTree`, `TailMissing`, `BaseMissing`
///   when the preconditions do not hold.
/// - `TipError::UpdateInProgress` while another sequence is open.
/// - `TipError::ConflictDuringUpdate` when a commit does not apply; the
///   sequence stays open for [`update_continue`] or [`update_abort`].
pub fn upgrade(repo: &TieRepo, hooks: &dyn RemoteHooks) -> TieResult<UpdateOutcome> {
    ensure_no_sequence(repo)?;
    let name = repo.current_tip()?;
    repo.ensure_clean()?;
    let tip = Tip::load(repo, &name)?;
    let onto = repo
        .find_target(&tip.base)?
        .ok_or_else(|| TipError::BaseMissing {
            tip: name.clone(),
            reason: format!("{} does not exist", tip.base),
        })?;

    if tip.tail == onto {
        tracing::info!(tip = %name, base = %tip.base, "tip is up to date");
        return Ok(UpdateOutcome::UpToDate {
            tip: name,
            base: tip.base,
        });
    }

    if tip.head == tip.tail {
        repo.checkout_safe(onto)?;
        repo.set_ref(&tip_ref(&name), onto, "tie: update")?;
        repo.set_ref(&tail_ref(&name), onto, "tie: update")?;
        tracing::info!(tip = %name, base = %tip.base, %onto, "fast-forwarded empty tip");
        return Ok(UpdateOutcome::Updated {
            tip: name,
            base: tip.base,
            replayed: 0,
            push: None,
        });
    }

    let state = UpdateState {
        tip: name,
        base: tip.base,
        onto,
        orig_head: tip.head,
        orig_tail: tip.tail,
    };
    state.save(repo)?;
    let mut rebase = match start_rebase(repo, &state) {
        Ok(rebase) => rebase,
        Err(e) => {
            UpdateState::clear(repo)?;
            return Err(e);
        }
    };
    tracing::info!(tip = %state.tip, base = %state.base, operations = rebase.len(), "rebasing tip");

    let signature = repo.signature()?;
    replay(repo, &state, &mut rebase, &signature)?;
    complete(repo, hooks, &state, &mut rebase, &signature)
}

fn start_rebase<'r>(repo: &'r TieRepo, state: &UpdateState) -> TieResult<Rebase<'r>> {
    let git = repo.git();
    let head = git.find_reference(&tip_ref(&state.tip))?;
    let branch = git.reference_to_annotated_commit(&head)?;
    let upstream = git.find_annotated_commit(state.orig_tail)?;
    let onto = git.find_annotated_commit(state.onto)?;
    let mut options = RebaseOptions::new();
    Ok(git.rebase(Some(&branch), Some(&upstream), Some(&onto), Some(&mut options))?)
}

fn replay(
    repo: &TieRepo,
    state: &UpdateState,
    rebase: &mut Rebase<'_>,
    signature: &Signature<'_>,
) -> TieResult<()> {
    while let Some(operation) = rebase.next() {
        let id = operation?.id();
        tracing::debug!(commit = %id, "replaying commit");
        commit_operation(repo, state, rebase, signature)?;
    }
    Ok(())
}

/// Commit the current operation, keeping author and message.
fn commit_operation(
    repo: &TieRepo,
    state: &UpdateState,
    rebase: &mut Rebase<'_>,
    signature: &Signature<'_>,
) -> TieResult<()> {
    let mut index = repo.git().index()?;
    index.read(false)?;
    if index.has_conflicts() {
        tracing::warn!(tip = %state.tip, "conflict while updating");
        return Err(TipError::ConflictDuringUpdate {
            tip: state.tip.clone(),
        }
        .into());
    }
    match rebase.commit(None, signature, None) {
        Ok(id) => {
            tracing::debug!(commit = %id, "replayed commit");
            Ok(())
        }
        Err(e) if e.code() == ErrorCode::Applied => {
            tracing::debug!("commit already applied upstream, skipped");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn complete(
    repo: &TieRepo,
    hooks: &dyn RemoteHooks,
    state: &UpdateState,
    rebase: &mut Rebase<'_>,
    signature: &Signature<'_>,
) -> TieResult<UpdateOutcome> {
    rebase.finish(Some(signature))?;

    let head_ref = tip_ref(&state.tip);
    repo.attach_head(&head_ref, "tie: update")?;
    repo.set_ref(&tail_ref(&state.tip), state.onto, "tie: update")?;
    UpdateState::clear(repo)?;
    // Commits already applied upstream were dropped by the rebase.
    let replayed = Tip::load(repo, &state.tip)?.own_commits(repo)?;
    tracing::info!(tip = %state.tip, base = %state.base, replayed, "updated tip");

    let push = (replayed > 0).then(|| sync::publish(repo, hooks, &state.tip));
    Ok(UpdateOutcome::Updated {
        tip: state.tip.clone(),
        base: state.base.clone(),
        replayed,
        push,
    })
}

fn open_sequence(repo: &TieRepo) -> TieResult<UpdateState> {
    UpdateState::load(repo)?.ok_or_else(|| TipError::NoUpdateInProgress.into())
}

/// Resume the open sequence after the conflicts were resolved and staged.
///
/// # Errors
///
/// - `TipError::NoUpdateInProgress` without an open sequence.
/// - `TipError::ConflictDuringUpdate` when conflicts remain or the next
///   commit conflicts too.
pub fn update_continue(repo: &TieRepo, hooks: &dyn RemoteHooks) -> TieResult<UpdateOutcome> {
    let state = open_sequence(repo)?;
    let Some(mut rebase) = optional(repo.git().open_rebase(None))? else {
        tracing::warn!(tip = %state.tip, "rebase state vanished, dropping update state");
        UpdateState::clear(repo)?;
        return Err(TipError::NoUpdateInProgress.into());
    };

    let signature = repo.signature()?;
    if rebase.operation_current().is_some() {
        commit_operation(repo, &state, &mut rebase, &signature)?;
    }
    replay(repo, &state, &mut rebase, &signature)?;
    complete(repo, hooks, &state, &mut rebase, &signature)
}

/// Drop the open sequence and restore head and tail as they were before it.
///
/// # Errors
///
/// Returns `TipError::NoUpdateInProgress` without an open sequence.
pub fn update_abort(repo: &TieRepo) -> TieResult<UpdateState> {
    let state = open_sequence(repo)?;
    if let Some(mut rebase) = optional(repo.git().open_rebase(None))? {
        rebase.abort()?;
    }

    let head_ref = tip_ref(&state.tip);
    repo.set_ref(&head_ref, state.orig_head, "tie: update abort")?;
    repo.set_ref(&tail_ref(&state.tip), state.orig_tail, "tie: update abort")?;
    repo.attach_head(&head_ref, "tie: update abort")?;
    UpdateState::clear(repo)?;
    tracing::info!(tip = %state.tip, "update aborted");
    Ok(state)
}
