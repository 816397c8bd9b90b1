// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit, amend and selection.

use std::fmt;
use std::fs;

use git2::Oid;

use super::Tip;
use super::store;
use super::sync::{self, PushReport};
use crate::error::{TieResult, TipError};
use crate::git::refs::{self, tip_ref};
use crate::git::{Editor, RemoteHooks, TieRepo};

const COMMIT_MESSAGE_FILE: &str = "COMMIT_EDITMSG";

/// How `commit` picks its tip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TipOption {
    /// Commit on the current tip.
    #[default]
    Absent,
    /// Create `<branch>-tip` on HEAD's ref first.
    Default,
    /// Create the named tip on HEAD's ref first.
    Named(String),
}

impl From<Option<Option<String>>> for TipOption {
    fn from(value: Option<Option<String>>) -> Self {
        match value {
            None => Self::Absent,
            Some(None) => Self::Default,
            Some(Some(name)) => Self::Named(name),
        }
    }
}

/// Message of an amended commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AmendMessage {
    /// Reuse the message of the amended commit.
    #[default]
    Keep,
    /// Open the editor on the message of the amended commit.
    Edit,
    Provided(String),
}

/// Result of [`commit`] and [`amend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub tip: String,
    pub commit: Oid,
    /// The tip was created by this commit.
    pub created_tip: bool,
    pub push: PushReport,
}

impl fmt::Display for CommitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.commit.to_string();
        write!(f, "[{} {}]", self.tip, &id[..id.len().min(7)])?;
        if self.created_tip {
            write!(f, " (new tip)")?;
        }
        Ok(())
    }
}

/// Clean up a commit message.
///
/// Comment lines (first non-blank character `#`) go away, trailing
/// whitespace is trimmed, leading and trailing blank lines are dropped and
/// the result ends with exactly one newline. Empty input gives `""`.
#[must_use]
pub fn format_commit_message(message: &str) -> String {
    let lines: Vec<&str> = message
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .map(str::trim_end)
        .collect();
    let Some(first) = lines.iter().position(|line| !line.is_empty()) else {
        return String::new();
    };
    let last = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .unwrap_or(first);

    let mut formatted = lines[first..=last].join("\n");
    formatted.push('\n');
    formatted
}

/// Write `preset` to `.git/COMMIT_EDITMSG`, open the editor on it and
/// return the edited text.
fn edit_message(repo: &TieRepo, editor: &dyn Editor, preset: &str) -> TieResult<String> {
    let path = repo.git_dir().join(COMMIT_MESSAGE_FILE);
    fs::write(&path, preset)?;
    let config = repo.git().config()?;
    editor.edit(&config, &path)
}

fn commented(message: &str) -> String {
    message.lines().map(|line| format!("#{line}\n")).collect()
}

fn non_empty(message: &str) -> TieResult<String> {
    let formatted = format_commit_message(message);
    if formatted.is_empty() {
        return Err(TipError::EmptyCommitMessage.into());
    }
    Ok(formatted)
}

/// Commit the index on a tip, then publish the tip.
///
/// Without `message` the editor opens on the commented message of the
/// current head commit.
///
/// # Errors
///
/// - `TipError::NotATip` when HEAD is not on a tip and `tip` is
///   [`TipOption::Absent`].
/// - `TipError::InvalidTipName` / `TipAlreadyExistsLocally` when creating
///   the tip fails.
/// - `TipError::EmptyCommitMessage` when the message is empty once cleaned
///   up; nothing is created then.
pub fn commit(
    repo: &TieRepo,
    hooks: &dyn RemoteHooks,
    editor: &dyn Editor,
    message: Option<&str>,
    tip: TipOption,
) -> TieResult<CommitOutcome> {
    let head = repo.head_ref_name()?;
    let (name, create) = match tip {
        TipOption::Absent => match refs::tip_name(&head) {
            Some(name) => (name.to_string(), false),
            None => {
                return Err(TipError::NotATip {
                    reference: head,
                    hint: "Run 'commit -t' to create a tip on the fly",
                }
                .into());
            }
        },
        TipOption::Default => (format!("{}-tip", refs::ref_name(&head)?), true),
        TipOption::Named(name) => {
            refs::validate_tip_name(&name)?;
            (name, true)
        }
    };

    let message = match message.filter(|m| !m.trim().is_empty()) {
        Some(text) => non_empty(text)?,
        None => {
            let current = repo.git().head()?.peel_to_commit()?;
            let preset = commented(current.message().unwrap_or_default());
            non_empty(&edit_message(repo, editor, &preset)?)?
        }
    };

    if create {
        store::create(repo, &name, None)?;
    }

    let git = repo.git();
    let head_ref = tip_ref(&name);
    let parent = git.find_reference(&head_ref)?.peel_to_commit()?;
    let tree = git.find_tree(git.index()?.write_tree()?)?;
    let signature = repo.signature()?;
    let id = git.commit(
        Some(&head_ref),
        &signature,
        &signature,
        &message,
        &tree,
        &[&parent],
    )?;
    tracing::info!(tip = %name, commit = %id, "committed");

    let push = sync::publish(repo, hooks, &name);
    Ok(CommitOutcome {
        tip: name,
        commit: id,
        created_tip: create,
        push,
    })
}

/// Replace the head commit of the current tip with the index, keeping its
/// author, then publish the tip.
///
/// # Errors
///
/// - `TipError::NotATip` when HEAD is not on a tip.
/// - `TipError::NothingToAmend` when the tip has no commit of its own.
/// - `TipError::EmptyCommitMessage` for an empty edited or provided message.
pub fn amend(
    repo: &TieRepo,
    hooks: &dyn RemoteHooks,
    editor: &dyn Editor,
    message: AmendMessage,
) -> TieResult<CommitOutcome> {
    let name = repo.current_tip()?;
    let tip = Tip::load(repo, &name)?;
    if tip.head == tip.tail {
        return Err(TipError::NothingToAmend { tip: name }.into());
    }

    let git = repo.git();
    let amended = git.find_commit(tip.head)?;
    let previous = amended.message().unwrap_or_default();
    let message = match message {
        AmendMessage::Keep => previous.to_string(),
        AmendMessage::Edit => non_empty(&edit_message(repo, editor, previous)?)?,
        AmendMessage::Provided(text) => non_empty(&text)?,
    };

    let tree = git.find_tree(git.index()?.write_tree()?)?;
    let committer = repo.signature()?;
    let id = amended.amend(
        Some(&tip.head_ref()),
        None,
        Some(&committer),
        None,
        Some(&message),
        Some(&tree),
    )?;
    tracing::info!(tip = %name, commit = %id, "amended");

    let push = sync::publish(repo, hooks, &name);
    Ok(CommitOutcome {
        tip: name,
        commit: id,
        created_tip: false,
        push,
    })
}

/// Check out the ref `short` resolves to and attach HEAD to it.
///
/// Returns the full ref name.
///
/// # Errors
///
/// - `TipError::NoRefForShorthand` when nothing matches.
/// - `TipError::DirtyWorkingTree` when local changes are in the way.
pub fn select(repo: &TieRepo, short: &str) -> TieResult<String> {
    let reference = refs::resolve(repo.git(), short)?;
    let refname = reference
        .name()
        .ok_or_else(|| TipError::NoRefForShorthand(short.to_string()))?
        .to_string();
    let target = reference.peel_to_commit()?.id();

    repo.checkout_safe(target)?;
    repo.attach_head(&refname, &format!("tie: select {short}"))?;
    tracing::info!(%refname, %target, "selected");
    Ok(refname)
}
