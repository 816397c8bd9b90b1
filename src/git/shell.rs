// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git CLI for what libgit2 does not offer (interactive rebase).

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{ProcessError, TieResult};

/// Shell-based git using the git CLI.
pub struct ShellGit;

impl ShellGit {
    fn base_command(cwd: &Path) -> TieResult<Command> {
        let git = which::which("git").map_err(|_| ProcessError::ExecutableNotFound {
            name: "git".to_string(),
        })?;
        let mut command = Command::new(git);
        command
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0");
        Ok(command)
    }

    /// Execute a git command attached to the terminal (sequence editor,
    /// conflict messages).
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::NonZeroExit` when git fails.
    pub fn git_interactive(args: &[&str], cwd: &Path) -> TieResult<()> {
        let status = Self::base_command(cwd)?
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ProcessError::SpawnFailed {
                command: format!("git {}", args.join(" ")),
                source,
            })?;

        if !status.success() {
            return Err(ProcessError::NonZeroExit {
                command: format!("git {}", args.join(" ")),
                code: status.code().unwrap_or(-1),
                message: "see the git output above".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
