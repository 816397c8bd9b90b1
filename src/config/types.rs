// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! TieConfig: GlobalConfig, SyncConfig, EditorConfig
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::LogLevel;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-5).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-5).
    pub file_log_level: LogLevel,
    /// Path to log file. No file log when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::WARN,
            file_log_level: LogLevel::DEBUG,
            log_file: None,
        }
    }
}

/// Push and fetch behavior.
///
/// The git config keys `tie.pushTipsAsBranches` and `tie.tipsBranchPrefix`
/// take precedence over these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Also push tips into the branch namespace of the remote.
    pub push_tips_as_branches: bool,
    /// Branch prefix used for the mirrored tips.
    pub tips_branch_prefix: String,
    /// Show a transfer progress bar during push and fetch.
    pub progress: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            push_tips_as_branches: false,
            tips_branch_prefix: crate::git::DEFAULT_TIPS_BRANCH_PREFIX.to_string(),
            progress: true,
        }
    }
}

impl SyncConfig {
    /// Compatibility prefix, if tips are mirrored as branches.
    #[must_use]
    pub fn compat_prefix(&self) -> Option<&str> {
        self.push_tips_as_branches
            .then_some(self.tips_branch_prefix.as_str())
    }
}

/// Editor used for commit messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Editor command; overrides `core.editor` and the environment.
    pub command: Option<String>,
}
