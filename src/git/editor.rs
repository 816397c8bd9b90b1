// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit message editor.
//!
//! ```text
//! [editor] command -> core.editor -> GIT_EDITOR -> VISUAL -> EDITOR -> vi
//! ```

use std::path::Path;
use std::process::Command;

use crate::error::{ProcessError, TieResult};

/// Opens a file for the user to edit and returns its content afterwards.
pub trait Editor {
    /// # Errors
    ///
    /// Returns an error when the editor cannot be run or the file cannot be
    /// read back.
    fn edit(&self, config: &git2::Config, path: &Path) -> TieResult<String>;
}

/// Runs the editor git itself would run.
#[derive(Debug, Clone, Default)]
pub struct GitEditor {
    command: Option<String>,
}

impl GitEditor {
    /// `command` overrides every other source when set.
    #[must_use]
    pub const fn new(command: Option<String>) -> Self {
        Self { command }
    }

    /// Editor command line for `config` and the current environment.
    #[must_use]
    pub fn resolve(&self, config: &git2::Config) -> String {
        let from_env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        self.command
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| {
                config
                    .get_string("core.editor")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
            })
            .or_else(|| from_env("GIT_EDITOR"))
            .or_else(|| from_env("VISUAL"))
            .or_else(|| from_env("EDITOR"))
            .unwrap_or_else(|| "vi".to_string())
    }
}

/// Characters that make git hand the editor command to the shell.
const SHELL_SPECIAL: &[char] = &[
    '|', '&', ';', '<', '>', '(', ')', '$', '`', '\\', '"', '\'', ' ', '\t', '\n', '*', '?',
    '[', '#', '~', '=', '%',
];

/// Command running `command_line` on `path` the way git runs editors.
///
/// A plain program name is looked up on `PATH` and run directly. Anything
/// else goes through `sh -c '<command_line> "$@"'` so quoting and arguments
/// behave as they do for git.
///
/// # Errors
///
/// Returns `ProcessError::ExecutableNotFound` when the program or `sh`
/// cannot be found.
pub(crate) fn editor_command(command_line: &str, path: &Path) -> TieResult<Command> {
    let command_line = command_line.trim();
    if command_line.contains(SHELL_SPECIAL) {
        let shell = which::which("sh").map_err(|_| ProcessError::ExecutableNotFound {
            name: "sh".to_string(),
        })?;
        let mut command = Command::new(shell);
        command
            .arg("-c")
            .arg(format!("{command_line} \"$@\""))
            .arg(command_line)
            .arg(path);
        return Ok(command);
    }
    let executable = which::which(command_line).map_err(|_| ProcessError::ExecutableNotFound {
        name: command_line.to_string(),
    })?;
    let mut command = Command::new(executable);
    command.arg(path);
    Ok(command)
}

impl Editor for GitEditor {
    fn edit(&self, config: &git2::Config, path: &Path) -> TieResult<String> {
        let command_line = self.resolve(config);
        let mut command = editor_command(&command_line, path)?;

        tracing::debug!(editor = %command_line, file = %path.display(), "opening editor");
        let status = command
            .status()
            .map_err(|source| ProcessError::SpawnFailed {
                command: command_line.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ProcessError::NonZeroExit {
                command: command_line,
                code: status.code().unwrap_or(-1),
                message: "editor exited with an error".to_string(),
            }
            .into());
        }
        Ok(std::fs::read_to_string(path)?)
    }
}
