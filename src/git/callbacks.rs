// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Caller-supplied behavior for network operations.
//!
//! ```text
//! push / fetch
//!      |
//!      v
//! remote_callbacks(&dyn RemoteHooks) --> git2::RemoteCallbacks
//!      |-- credentials        -> hooks.credentials
//!      |-- certificate_check  -> hooks.certificate_check
//!      '-- (push_)transfer_progress -> hooks.transfer_progress
//!
//! TerminalHooks (default)
//!      ssh-agent -> credential helper -> Cred::default
//!      certificate: defer to libgit2
//!      progress: indicatif bar on stderr
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::OnceLock;

use git2::{
    CertificateCheckStatus, Config, Cred, CredentialType, ErrorClass, ErrorCode, Oid,
    RemoteCallbacks, cert::Cert,
};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::SyncError;

/// Credential attempts before giving up on a URL.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// A ref changed by a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    pub refname: String,
    pub old: Oid,
    pub new: Oid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefUpdateKind {
    Created,
    Updated,
    Deleted,
}

impl RefUpdate {
    #[must_use]
    pub fn kind(&self) -> RefUpdateKind {
        if self.old.is_zero() {
            RefUpdateKind::Created
        } else if self.new.is_zero() {
            RefUpdateKind::Deleted
        } else {
            RefUpdateKind::Updated
        }
    }
}

impl fmt::Display for RefUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind() {
            RefUpdateKind::Created => "Created",
            RefUpdateKind::Updated => "Updated",
            RefUpdateKind::Deleted => "Deleted",
        };
        write!(f, "{verb} {}", self.refname)
    }
}

/// Hooks invoked during push and fetch.
pub trait RemoteHooks {
    /// Credentials for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error when no credential can be produced; the network
    /// operation then fails with an authentication error.
    fn credentials(
        &self,
        url: &str,
        username: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error>;

    /// Decide on a certificate libgit2 could not verify on its own.
    ///
    /// # Errors
    ///
    /// Returning an error rejects the certificate.
    fn certificate_check(
        &self,
        _cert: &Cert<'_>,
        _host: &str,
    ) -> Result<CertificateCheckStatus, git2::Error> {
        Ok(CertificateCheckStatus::CertificatePassthrough)
    }

    /// Object transfer progress.
    fn transfer_progress(&self, _current: usize, _total: usize) {}

    /// Transfer finished (successfully or not).
    fn transfer_done(&self) {}

    /// A fetch changed a local ref.
    fn ref_updated(&self, _update: &RefUpdate) {}
}

/// Pre-validated progress bar style for object transfers.
fn bar_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} objects",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        })
        .clone()
}

/// Default hooks for an interactive terminal.
pub struct TerminalHooks {
    config: Option<Config>,
    progress: bool,
    bar: RefCell<Option<ProgressBar>>,
    attempts: Cell<usize>,
}

impl TerminalHooks {
    /// Hooks using `config` for credential helpers.
    #[must_use]
    pub const fn new(config: Option<Config>, progress: bool) -> Self {
        Self {
            config,
            progress,
            bar: RefCell::new(None),
            attempts: Cell::new(0),
        }
    }

    /// Hooks for a repository, without progress output.
    #[must_use]
    pub fn quiet(repo: &git2::Repository) -> Self {
        Self::new(repo.config().ok(), false)
    }
}

impl RemoteHooks for TerminalHooks {
    fn credentials(
        &self,
        url: &str,
        username: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if attempt > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::new(
                ErrorCode::Auth,
                ErrorClass::Net,
                format!("no valid credentials for {url}"),
            ));
        }
        tracing::debug!(url, ?username, ?allowed, attempt, "credentials requested");

        if allowed.is_ssh_key()
            && let Some(user) = username
        {
            return Cred::ssh_key_from_agent(user);
        }
        if allowed.is_user_pass_plaintext()
            && let Some(ref cfg) = self.config
            && let Ok(cred) = Cred::credential_helper(cfg, url, username)
        {
            return Ok(cred);
        }
        Cred::default()
    }

    fn transfer_progress(&self, current: usize, total: usize) {
        if !self.progress || total == 0 {
            return;
        }
        let mut bar = self.bar.borrow_mut();
        let bar = bar.get_or_insert_with(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(bar_style());
            pb
        });
        bar.set_length(total as u64);
        bar.set_position(current as u64);
    }

    fn transfer_done(&self) {
        if let Some(bar) = self.bar.borrow_mut().take() {
            bar.finish_and_clear();
        }
        self.attempts.set(0);
    }

    fn ref_updated(&self, update: &RefUpdate) {
        tracing::info!(refname = %update.refname, old = %update.old, new = %update.new, "{update}");
    }
}

/// Route the libgit2 callbacks to `hooks`.
pub(crate) fn remote_callbacks(hooks: &dyn RemoteHooks) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username, allowed| hooks.credentials(url, username, allowed));
    callbacks.certificate_check(move |cert, host| hooks.certificate_check(cert, host));
    callbacks.transfer_progress(move |progress| {
        hooks.transfer_progress(progress.received_objects(), progress.total_objects());
        true
    });
    callbacks.push_transfer_progress(move |current, total, _bytes| {
        hooks.transfer_progress(current, total);
    });
    callbacks
}

/// Classify a failed network operation against `remote`.
pub(crate) fn classify_error(remote: &str, refname: &str, error: &git2::Error) -> SyncError {
    let message = error.message().to_string();
    let lowered = message.to_lowercase();
    match error.code() {
        ErrorCode::Auth | ErrorCode::Certificate => SyncError::AuthenticationFailed {
            remote: remote.to_string(),
            message,
        },
        ErrorCode::NotFastForward => SyncError::NonFastForward {
            remote: remote.to_string(),
            refname: refname.to_string(),
        },
        _ if lowered.contains("non-fast-forward") || lowered.contains("fetch first") => {
            SyncError::NonFastForward {
                remote: remote.to_string(),
                refname: refname.to_string(),
            }
        }
        _ if lowered.contains("authentication") || lowered.contains("credentials") => {
            SyncError::AuthenticationFailed {
                remote: remote.to_string(),
                message,
            }
        }
        _ => SyncError::RemoteUnreachable {
            remote: remote.to_string(),
            message,
        },
    }
}

/// Classify a ref the remote refused during a push.
pub(crate) fn classify_rejection(remote: &str, refname: &str, status: &str) -> SyncError {
    if status.contains("non-fast-forward") || status.contains("fetch first") {
        SyncError::NonFastForward {
            remote: remote.to_string(),
            refname: refname.to_string(),
        }
    } else {
        SyncError::PushRejected {
            remote: remote.to_string(),
            refname: refname.to_string(),
            message: status.to_string(),
        }
    }
}
