// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ref namespace of tips and shorthand resolution.
//!
//! ```text
//! refs/tips/<name>            tip head
//! refs/tails/<name>           last commit inherited from the base
//! refs/rtips/<remote>/<name>  remote tip mirror (after a successful push)
//! refs/heads/<name>           local branch
//! refs/remotes/<remote>/<b>   remote-tracking branch
//! ```
//!
//! Shorthands are probed in this order, first existing ref wins:
//!
//! ```text
//! %v  ->  refs/%v  ->  refs/tips/%v  ->  refs/rtips/%v  ->  refs/remotes/%v
//! ```

use std::sync::LazyLock;

use git2::{Reference, Repository};
use regex::Regex;

use crate::error::{TieResult, TipError};

pub const REFS_HEADS: &str = "refs/heads/";
pub const REFS_REMOTES: &str = "refs/remotes/";
pub const REFS_TIPS: &str = "refs/tips/";
pub const REFS_REMOTE_TIPS: &str = "refs/rtips/";
pub const REFS_TAILS: &str = "refs/tails/";

const DWIM_PATTERNS: [&str; 5] = [
    "",
    "refs/",
    REFS_TIPS,
    REFS_REMOTE_TIPS,
    REFS_REMOTES,
];

static SHORTHAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"refs/(?:heads|remotes|tips|rtips)/(.*)").expect("valid shorthand regex")
});

static REMOTE_BRANCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^refs/remotes/([^/]+)/(.+)$").expect("valid remote branch regex")
});

static REMOTE_TIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^refs/rtips/([^/]+)/(.+)$").expect("valid remote tip regex")
});

/// Full name of the head ref of tip `name`.
#[must_use]
pub fn tip_ref(name: &str) -> String {
    format!("{REFS_TIPS}{name}")
}

/// Full name of the tail ref of tip `name`.
#[must_use]
pub fn tail_ref(name: &str) -> String {
    format!("{REFS_TAILS}{name}")
}

/// Full name of the local mirror of tip `name` on `remote`.
#[must_use]
pub fn remote_tip_ref(remote: &str, name: &str) -> String {
    format!("{REFS_REMOTE_TIPS}{remote}/{name}")
}

/// Git config key holding the base of tip `name`.
#[must_use]
pub fn base_key(name: &str) -> String {
    format!("tip.{name}.base")
}

/// Strip the namespace of a branch, remote-tracking branch or tip.
///
/// Refs outside those namespaces are returned unchanged.
#[must_use]
pub fn shorthand(refname: &str) -> &str {
    SHORTHAND_RE
        .captures(refname)
        .and_then(|c| c.get(1))
        .map_or(refname, |m| m.as_str())
}

/// Name of the tip behind a full `refs/tips/...` name.
#[must_use]
pub fn tip_name(refname: &str) -> Option<&str> {
    refname.strip_prefix(REFS_TIPS)
}

/// Last path segment of a full ref name.
///
/// # Errors
///
/// Returns `TipError::InvalidTipName` for names without a namespace, like
/// `HEAD`.
pub fn ref_name(refname: &str) -> TieResult<&str> {
    match refname.rsplit_once('/') {
        Some((_, last)) if !last.is_empty() => Ok(last),
        _ => Err(TipError::InvalidTipName(format!("'{refname}' is not a physical ref.")).into()),
    }
}

/// Split a remote-tracking ref into the remote name and the ref it tracks
/// on that remote.
///
/// `refs/remotes/origin/master` is `("origin", "refs/heads/master")`,
/// `refs/rtips/origin/work` is `("origin", "refs/tips/work")`.
///
/// # Errors
///
/// Returns `TipError::NotARemoteRef` for any other ref.
pub fn explode_remote_ref(refname: &str) -> TieResult<(String, String)> {
    if let Some(c) = REMOTE_BRANCH_RE.captures(refname) {
        return Ok((c[1].to_string(), format!("{REFS_HEADS}{}", &c[2])));
    }
    if let Some(c) = REMOTE_TIP_RE.captures(refname) {
        return Ok((c[1].to_string(), format!("{REFS_TIPS}{}", &c[2])));
    }
    Err(TipError::NotARemoteRef(refname.to_string()).into())
}

#[must_use]
pub fn is_branch(refname: &str) -> bool {
    refname.starts_with(REFS_HEADS)
}

/// Kind of ref a tip is based on. Decides how it is pushed and stacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseKind {
    /// `refs/heads/<branch>`.
    LocalBranch,
    /// `refs/tips/<name>`.
    LocalTip,
    /// `refs/remotes/<remote>/<branch>`; `target` is the branch on the remote.
    RemoteBranch { remote: String, target: String },
    /// `refs/rtips/<remote>/<name>`; `target` is the tip on the remote.
    RemoteTip { remote: String, target: String },
    /// Any other ref (tags, notes, ...).
    Other,
}

impl BaseKind {
    #[must_use]
    pub fn of(refname: &str) -> Self {
        if is_branch(refname) {
            return Self::LocalBranch;
        }
        if tip_name(refname).is_some() {
            return Self::LocalTip;
        }
        match explode_remote_ref(refname) {
            Ok((remote, target)) if is_branch(&target) => Self::RemoteBranch { remote, target },
            Ok((remote, target)) => Self::RemoteTip { remote, target },
            Err(_) => Self::Other,
        }
    }

    /// Remote name for remote-tracking kinds.
    #[must_use]
    pub fn remote(&self) -> Option<&str> {
        match self {
            Self::RemoteBranch { remote, .. } | Self::RemoteTip { remote, .. } => Some(remote),
            _ => None,
        }
    }
}

/// Check that `name` can be used as a tip name.
///
/// # Errors
///
/// Returns `TipError::InvalidTipName` for blank names and names that do not
/// form a valid ref under `refs/tips/`.
pub fn validate_tip_name(name: &str) -> TieResult<()> {
    if name.trim().is_empty() {
        return Err(TipError::InvalidTipName("Name of the tip can't be empty.".to_string()).into());
    }
    if !Reference::is_valid_name(&tip_ref(name)) {
        return Err(TipError::InvalidTipName(format!("'{name}' is not a valid tip name.")).into());
    }
    Ok(())
}

/// Resolve a user supplied shorthand to an existing reference.
///
/// Symbolic refs are followed to the direct ref they point at, so `HEAD`
/// names the selected branch or tip and `origin/HEAD` the remote default
/// branch. Pseudo refs outside `refs/` (a detached `HEAD`, `FETCH_HEAD`)
/// never resolve.
///
/// # Errors
///
/// Returns `TipError::NoRefForShorthand` carrying the input when no pattern
/// matches an existing ref.
pub fn resolve<'r>(repo: &'r Repository, short: &str) -> TieResult<Reference<'r>> {
    for prefix in DWIM_PATTERNS {
        let candidate = format!("{prefix}{short}");
        if !Reference::is_valid_name(&candidate) {
            continue;
        }
        let Ok(reference) = repo.find_reference(&candidate) else {
            continue;
        };
        let Ok(direct) = reference.resolve() else {
            continue;
        };
        if direct.name().is_some_and(|name| name.starts_with("refs/")) {
            tracing::trace!(shorthand = short, refname = ?direct.name(), "resolved shorthand");
            return Ok(direct);
        }
    }
    Err(TipError::NoRefForShorthand(short.to_string()).into())
}
