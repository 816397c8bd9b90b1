// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              TieError (~24 bytes)
//!                     |
//!   +------+------+---+----+-------+-----+------+
//!   |      |      |        |       |     |      |
//!   v      v      v        v       v     v      v
//!  Tip   Sync   Config  Process   Git   Io   Other
//!  Box   Box    Box     Box       Box   Box  Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Tip      NotATip, OutOfDate, TailMissing, ConflictDuringUpdate, ...
//!   Sync     NoRemoteBase, RemoteUnreachable, NonFastForward, ...
//!   Config   InvalidValue
//!   Process  ExecutableNotFound, SpawnFailed, NonZeroExit
//!
//! All variants boxed => TieError fits in 24 bytes.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`TieError`].
pub type TieResult<T> = std::result::Result<T, TieError>;

/// Top-level error type of the tip engine.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum TieError {
    /// Tip lifecycle error.
    #[error("{0}")]
    Tip(#[from] Box<TipError>),

    /// Push or fetch error.
    #[error("{0}")]
    Sync(#[from] Box<SyncError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// External process error (editor, git CLI).
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// Error reported by libgit2.
    #[error("{0}")]
    Git(#[from] Box<git2::Error>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl TieError {
    /// The tip error behind this error, if any.
    #[must_use]
    pub fn as_tip(&self) -> Option<&TipError> {
        match self {
            Self::Tip(e) => Some(e),
            _ => None,
        }
    }

    /// The sync error behind this error, if any.
    #[must_use]
    pub fn as_sync(&self) -> Option<&SyncError> {
        match self {
            Self::Sync(e) => Some(e),
            _ => None,
        }
    }
}

/// Create a [`TieError::Other`] from a message.
pub fn other(message: impl Into<String>) -> TieError {
    TieError::Other(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for TieError {
                fn from(err: $error) -> Self {
                    TieError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    TipError => Tip,
    SyncError => Sync,
    ConfigError => Config,
    ProcessError => Process,
    git2::Error => Git,
    std::io::Error => Io,
}

// --- Tip Errors ---

/// Errors of the tip lifecycle: store, update, stack and selection.
#[derive(Debug, Error)]
pub enum TipError {
    /// HEAD is not attached to a tip.
    #[error("HEAD is not on a tip ({reference}). {hint}")]
    NotATip { reference: String, hint: &'static str },

    /// No reference matches the given shorthand.
    #[error("No ref found for shorthand \"{0}\"")]
    NoRefForShorthand(String),

    /// The tail ref of the tip is missing.
    #[error("Tip '{tip}' has no tail (refs/tails/{tip} not found)")]
    TailMissing { tip: String },

    /// The base config entry or the base ref of the tip is missing.
    #[error("Tip '{tip}' has no usable base: {reason}")]
    BaseMissing { tip: String, reason: String },

    /// The tail of the tip is not on its base, or the base moved on the remote.
    #[error("Current tip '{tip}' is out of date with its base '{base}'. Please run 'tie update'")]
    OutOfDate { tip: String, base: String },

    /// The working tree or the index holds uncommitted changes.
    #[error("Working tree is not clean: {0}")]
    DirtyWorkingTree(String),

    /// A tip with that name already exists in this repository.
    #[error("Failed to create tip \"{name}\". A tip with that name already exists.")]
    TipAlreadyExistsLocally { name: String },

    /// A tip with that name is already tracked for the remote of the base.
    #[error("Failed to create tip \"{name}\". A tip with that name already exists on {remote}.")]
    TipAlreadyExistsOnRemote { name: String, remote: String },

    /// A replayed commit left conflicts in the index.
    #[error(
        "Conflict while updating tip '{tip}'. Resolve the conflicts then run 'tie update continue', or 'tie update abort'"
    )]
    ConflictDuringUpdate { tip: String },

    /// The reference is not a remote-tracking ref.
    #[error("'{0}' is not a remote ref.")]
    NotARemoteRef(String),

    /// The reference is not a branch (local or remote-tracking).
    #[error("Cannot stack the current tip on its base '{0}'. Tips can only be stacked on branches.")]
    NotABranch(String),

    /// The tip name is not usable as a ref name.
    #[error("{0}")]
    InvalidTipName(String),

    /// An update sequence is already open in this repository.
    #[error("An update is already in progress. Run 'tie update continue' or 'tie update abort'")]
    UpdateInProgress,

    /// `continue`/`abort` without an open update sequence.
    #[error("No update in progress.")]
    NoUpdateInProgress,

    /// The tip owns no commit that could be amended.
    #[error("Tip '{tip}' has no commit of its own to amend.")]
    NothingToAmend { tip: String },

    /// The commit message is empty after normalization.
    #[error("Aborting commit due to empty commit message.")]
    EmptyCommitMessage,

    /// The tip is currently selected and cannot be deleted.
    #[error("Cannot delete tip '{0}' while it is selected.")]
    TipSelected(String),

    /// `rewrite continue`/`abort` outside of an interactive rebase.
    #[error("Not in a rewrite sequence.")]
    NoRewriteInProgress,
}

impl TipError {
    /// `NotATip` for commands that only run on a tip.
    #[must_use]
    pub fn not_a_tip(reference: impl Into<String>) -> Self {
        Self::NotATip {
            reference: reference.into(),
            hint: "Only tips can be used here.",
        }
    }
}

// --- Sync Errors ---

/// Push and fetch errors, classified by cause.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The base of the tip is not a remote ref; nothing to push to.
    #[error("Tip '{tip}' is based on '{base}' which is not a remote ref; not pushed.")]
    NoRemoteBase { tip: String, base: String },

    /// The remote is not configured in this repository.
    #[error("remote '{0}' does not exist")]
    RemoteNotFound(String),

    /// Connectivity or transport failure.
    #[error("remote '{remote}' is unreachable: {message}")]
    RemoteUnreachable { remote: String, message: String },

    /// Credentials or certificate were refused.
    #[error("authentication to '{remote}' failed: {message}")]
    AuthenticationFailed { remote: String, message: String },

    /// The pushed ref does not fast-forward the remote ref.
    #[error("'{refname}' on '{remote}' cannot be fast-forwarded")]
    NonFastForward { remote: String, refname: String },

    /// The remote refused to update a ref.
    #[error("'{remote}' rejected '{refname}': {message}")]
    PushRejected {
        remote: String,
        refname: String,
        message: String,
    },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// External process errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with non-zero status.
    #[error("process '{command}' exited with code {code}: {message}")]
    NonZeroExit {
        command: String,
        code: i32,
        message: String,
    },
}

#[cfg(test)]
mod tests;
