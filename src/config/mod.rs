// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tool settings for tie.
//!
//! Per-tip state (`tip.<name>.base`) and the compatibility switches
//! (`tie.pushTipsAsBranches`, `tie.tipsBranchPrefix`) live in git config and
//! are read through [`crate::git::TieRepo`]. This module only covers the
//! settings of the tool itself.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. user tie.toml ($XDG_CONFIG_HOME/tie or ~/.config/tie)
//! 3. local tie.toml (cwd)
//! 4. --config (repeatable)
//! 5. TIE_* env vars
//! 6. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! TIE_GLOBAL__OUTPUT_LOG_LEVEL=4         → global.output_log_level = 4
//! TIE_SYNC__PUSH_TIPS_AS_BRANCHES=true   → sync.push_tips_as_branches = true
//! TIE_EDITOR__COMMAND=nano               → editor.command = "nano"
//! ```

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

use loader::ConfigLoader;
use types::{EditorConfig, GlobalConfig, SyncConfig};

/// File name searched in the user config directory and the working directory.
pub const CONFIG_FILE_NAME: &str = "tie.toml";

/// Prefix of the environment variables read by the loader.
pub const ENV_PREFIX: &str = "TIE";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TieConfig {
    /// Logging options.
    pub global: GlobalConfig,
    /// Push and fetch options.
    pub sync: SyncConfig,
    /// Commit message editor.
    pub editor: EditorConfig,
}

impl TieConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tie_rs::config::TieConfig;
    ///
    /// let config = TieConfig::builder()
    ///     .file_if_exists("tie.toml")
    ///     .with_env()
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `TieConfig` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `TieConfig` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().inline(content).build()
    }

    /// Location of the per-user configuration file.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("tie").join(CONFIG_FILE_NAME))
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_sync_options(&mut options);
        self.format_editor_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
    }

    fn format_sync_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "sync.push_tips_as_branches".into(),
            self.sync.push_tips_as_branches.to_string(),
        );
        options.insert(
            "sync.tips_branch_prefix".into(),
            self.sync.tips_branch_prefix.clone(),
        );
        options.insert("sync.progress".into(), self.sync.progress.to_string());
    }

    fn format_editor_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "editor.command".into(),
            self.editor.command.clone().unwrap_or_default(),
        );
    }
}
