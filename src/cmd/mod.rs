// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers --> tip engine
//!   config (options, inis), tip (everything else)
//! ```

pub mod config;
pub mod tip;

use std::path::Path;

use anyhow::Context;

use crate::config::TieConfig;
use crate::error::Result;
use crate::git::{GitEditor, TerminalHooks, TieRepo};

/// Repository and collaborators shared by the tip commands.
pub struct Workspace {
    pub repo: TieRepo,
    pub hooks: TerminalHooks,
    pub editor: GitEditor,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("repo", &self.repo)
            .field("editor", &self.editor)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Open the repository containing `dir` (the current directory when
    /// `None`) with the tool settings of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when no repository contains `dir`.
    pub fn open(dir: Option<&Path>, config: &TieConfig) -> Result<Self> {
        let dir = dir.unwrap_or_else(|| Path::new("."));
        let repo = TieRepo::discover(dir)
            .with_context(|| format!("not a git repository: {}", dir.display()))?
            .with_compat_fallback(config.sync.compat_prefix().map(str::to_string));
        let hooks = TerminalHooks::new(repo.git().config().ok(), config.sync.progress);
        let editor = GitEditor::new(config.editor.command.clone());
        tracing::debug!(?repo, "opened workspace");
        Ok(Self {
            repo,
            hooks,
            editor,
        })
    }
}
