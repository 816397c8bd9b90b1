// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for tie-rs using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! tie [global options] <command>
//! create | commit | amend | rewrite | select
//! stack | delete | update | upgrade | fetch | list
//! version | options | inis
//! ```

pub mod global;
pub mod tip;


use crate::cli::global::GlobalOptions;
use crate::cli::tip::{
    AmendArgs, CommitArgs, CreateArgs, DeleteArgs, ListArgs, SelectArgs, SequenceArgs,
};
use clap::{Parser, Subcommand};

/// Tips on top of moving git branches.
#[derive(Debug, Parser)]
#[command(
    name = "tie",
    author,
    version,
    about = "Force-pushable tips on top of moving git branches",
    long_about = "tie-rs Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  A tip is a named, force-pushable line of work on top of a base\n\
                  (a branch, a remote branch or another tip). `tie update` replays\n\
                  the tip on the latest base, `tie stack` fast-forwards the base to\n\
                  the tip once it is ready. See `tie <command> --help` for more\n\
                  information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  tie reads `~/.config/tie/tie.toml` then `tie.toml` in the current\n\
                  directory when present, then every --config in order. TIE_*\n\
                  environment variables (e.g. TIE_SYNC__PROGRESS=false) override\n\
                  the files. Repository state, such as tip bases and\n\
                  `tie.pushTipsAsBranches`, lives in git config."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their values from the config files.
    Options,

    /// Lists the config files used by tie.
    Inis,

    /// Creates a tip and selects it.
    Create(CreateArgs),

    /// Commits the index on the current tip and pushes it.
    #[command(visible_alias = "ci")]
    Commit(CommitArgs),

    /// Amends the last commit of the current tip and pushes it.
    Amend(AmendArgs),

    /// Reorders or edits the commits of the current tip with `git rebase -i`.
    Rewrite(SequenceArgs),

    /// Checks out a tip or branch.
    #[command(visible_alias = "sl")]
    Select(SelectArgs),

    /// Fast-forwards the base to the current tip and deletes the tip.
    Stack,

    /// Deletes tips, locally and on their remote.
    Delete(DeleteArgs),

    /// Fetches, then replays the current tip on its base.
    Update(SequenceArgs),

    /// Replays the current tip on its base without fetching.
    Upgrade(SequenceArgs),

    /// Fetches the remote of the current ref.
    Fetch,

    /// Lists tips and branches.
    #[command(visible_alias = "ls")]
    List(ListArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
