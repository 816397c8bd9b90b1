// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the tip commands.
//!
//! ```text
//! create NAME [BASE]
//! commit|ci [-m MSG] [-t [NAME]]
//! amend [-m [MSG]]
//! rewrite [continue|abort]
//! select|sl REF
//! stack
//! delete [NAME...] [--stacked]
//! update [continue|abort]
//! upgrade [continue|abort]
//! fetch
//! list|ls [-t] [-b] [-r] [-a]
//! ```

use clap::{Args, ValueEnum};

use crate::tip::{AmendMessage, ListFilter, TipOption};

/// Arguments for `create`.
#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Name of the new tip.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Ref to base the tip on (shorthand allowed). Defaults to the ref HEAD is on.
    #[arg(value_name = "BASE")]
    pub base: Option<String>,
}

/// Arguments for `commit`.
#[derive(Debug, Clone, Args)]
pub struct CommitArgs {
    /// Commit message. Opens the editor when omitted.
    #[arg(short = 'm', long = "message", value_name = "MSG")]
    pub message: Option<String>,

    /// Create a tip on HEAD's ref first; named `<branch>-tip` without NAME.
    #[arg(short = 't', long = "tip", value_name = "NAME", num_args = 0..=1)]
    pub tip: Option<Option<String>>,
}

impl CommitArgs {
    #[must_use]
    pub fn tip_option(&self) -> TipOption {
        TipOption::from(self.tip.clone())
    }
}

/// Arguments for `amend`.
#[derive(Debug, Clone, Args)]
pub struct AmendArgs {
    /// New message; `-m` alone opens the editor on the current one.
    #[arg(short = 'm', long = "message", value_name = "MSG", num_args = 0..=1)]
    pub message: Option<Option<String>>,
}

impl AmendArgs {
    #[must_use]
    pub fn amend_message(&self) -> AmendMessage {
        match &self.message {
            None => AmendMessage::Keep,
            Some(None) => AmendMessage::Edit,
            Some(Some(text)) => AmendMessage::Provided(text.clone()),
        }
    }
}

/// Step of a paused sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SequenceAction {
    /// Resume after resolving conflicts.
    Continue,
    /// Drop the sequence and restore the tip.
    Abort,
}

/// Arguments for `update`, `upgrade` and `rewrite`.
#[derive(Debug, Clone, Args)]
pub struct SequenceArgs {
    /// Continue or abort a paused sequence instead of starting one.
    #[arg(value_enum, value_name = "ACTION")]
    pub action: Option<SequenceAction>,
}

/// Arguments for `select`.
#[derive(Debug, Clone, Args)]
pub struct SelectArgs {
    /// Tip, branch or remote ref to select (shorthand allowed).
    #[arg(value_name = "REF")]
    pub name: String,
}

/// Arguments for `delete`.
#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// Tips to delete.
    #[arg(value_name = "NAME", required_unless_present = "stacked")]
    pub names: Vec<String>,

    /// Also delete every tip already contained in its base.
    #[arg(short = 's', long = "stacked")]
    pub stacked: bool,
}

/// Arguments for `list`.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct ListArgs {
    /// List tips.
    #[arg(short = 't', long = "tips")]
    pub tips: bool,

    /// List branches.
    #[arg(short = 'b', long = "branches")]
    pub branches: bool,

    /// List remote counterparts.
    #[arg(short = 'r', long = "remotes")]
    pub remotes: bool,

    /// List local and remote refs.
    #[arg(short = 'a', long = "all")]
    pub all: bool,
}

impl ListArgs {
    #[must_use]
    pub fn filter(self) -> ListFilter {
        let mut filter = ListFilter::empty();
        filter.set(ListFilter::TIPS, self.tips);
        filter.set(ListFilter::BRANCHES, self.branches);
        filter.set(ListFilter::REMOTES, self.remotes);
        filter.set(ListFilter::ALL, self.all);
        filter
    }
}
