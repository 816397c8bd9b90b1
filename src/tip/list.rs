// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Listing of tips, branches and their remote counterparts.
//!
//! ```text
//! filter (tips branches remotes all)    groups, in this order
//! ----------------------------------    --------------------------------
//! none                                  HEAD ref, local tips, bases
//! T . . .                               local tips
//! . B . .                               local branches
//! . . R .                               remote tips, remote branches
//! T . R .                               remote tips
//! . B R .                               remote branches
//! T B . .                               local tips, local branches
//! T B R .                               remote tips, remote branches
//! . . * A  /  T B * A                   all four groups
//! T . * A                               local tips, remote tips
//! . B * A                               local branches, remote branches
//! ```

use std::fmt;

use bitflags::bitflags;

use crate::error::TieResult;
use crate::git::TieRepo;
use crate::git::refs::{REFS_HEADS, REFS_REMOTE_TIPS, REFS_REMOTES, REFS_TIPS};

bitflags! {
    /// Ref groups requested by `tie list`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ListFilter: u8 {
        const TIPS = 1 << 0;
        const BRANCHES = 1 << 1;
        const REMOTES = 1 << 2;
        const ALL = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Head,
    Tips,
    Bases,
    RemoteTips,
    Branches,
    RemoteBranches,
}

impl ListFilter {
    fn groups(self) -> &'static [Group] {
        use Group::{Bases, Branches, Head, RemoteBranches, RemoteTips, Tips};

        let tips = self.contains(Self::TIPS);
        let branches = self.contains(Self::BRANCHES);
        if self.contains(Self::ALL) {
            return match (tips, branches) {
                (true, false) => &[Tips, RemoteTips],
                (false, true) => &[Branches, RemoteBranches],
                _ => &[Tips, RemoteTips, Branches, RemoteBranches],
            };
        }
        match (tips, branches, self.contains(Self::REMOTES)) {
            (false, false, false) => &[Head, Tips, Bases],
            (true, false, false) => &[Tips],
            (false, true, false) => &[Branches],
            (true, true, false) => &[Tips, Branches],
            (true, false, true) => &[RemoteTips],
            (false, true, true) => &[RemoteBranches],
            (false, false, true) | (true, true, true) => &[RemoteTips, RemoteBranches],
        }
    }
}

/// One listed ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub refname: String,
    /// HEAD is attached to this ref.
    pub is_head: bool,
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_head { "* " } else { "  " };
        write!(f, "{marker}{}", self.refname)
    }
}

/// Refs selected by `filter`, each group sorted, first occurrence kept.
///
/// # Errors
///
/// Returns the libgit2 error when refs or git config cannot be read.
pub fn list(repo: &TieRepo, filter: ListFilter) -> TieResult<Vec<ListEntry>> {
    // Unborn or broken HEAD: nothing is marked.
    let head = repo.head_ref_name().ok();

    let mut names: Vec<String> = Vec::new();
    for group in filter.groups() {
        let mut refs = match group {
            Group::Head => head.iter().filter(|h| h.as_str() != "HEAD").cloned().collect(),
            Group::Tips => repo.refs_with_prefix(REFS_TIPS)?,
            Group::RemoteTips => repo.refs_with_prefix(REFS_REMOTE_TIPS)?,
            Group::Branches => repo.refs_with_prefix(REFS_HEADS)?,
            Group::RemoteBranches => repo.refs_with_prefix(REFS_REMOTES)?,
            Group::Bases => existing_bases(repo)?,
        };
        refs.sort();
        tracing::trace!(?group, count = refs.len(), "listed group");
        for name in refs {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    Ok(names
        .into_iter()
        .map(|refname| ListEntry {
            is_head: head.as_deref() == Some(refname.as_str()),
            refname,
        })
        .collect())
}

/// Bases recorded in git config whose ref still exists.
fn existing_bases(repo: &TieRepo) -> TieResult<Vec<String>> {
    let mut bases = Vec::new();
    for (_, base) in repo.tip_bases()? {
        if repo.find_target(&base)?.is_some() {
            bases.push(base);
        }
    }
    Ok(bases)
}
