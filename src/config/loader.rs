// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Layered loading of the tool settings.
//!
//! ```text
//! user tie.toml -> ./tie.toml -> --config files -> TIE_* env -> CLI overrides
//!   (optional)      (optional)     (required)
//! ```
//!
//! Later layers win key by key.

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};

use super::{CONFIG_FILE_NAME, ENV_PREFIX, TieConfig};
use crate::error::Result;

/// One settings source that contributed to the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    /// `tie.toml` in the user config directory.
    User(PathBuf),
    /// `tie.toml` in the working directory.
    Local(PathBuf),
    /// A file named on the command line.
    Explicit(PathBuf),
    /// TOML text handed over directly.
    Inline,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(path) => write!(f, "[user] {}", path.display()),
            Self::Local(path) => write!(f, "[local] {}", path.display()),
            Self::Explicit(path) => write!(f, "[file] {}", path.display()),
            Self::Inline => f.write_str("[inline]"),
        }
    }
}

/// Collects settings layers and merges them into a [`TieConfig`].
pub struct ConfigLoader {
    builder: ConfigBuilder<DefaultState>,
    layers: Vec<Layer>,
    env: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            layers: Vec::new(),
            env: false,
        }
    }

    /// Add the user and working directory `tie.toml`, each only when present.
    #[must_use]
    pub fn default_files(self) -> Self {
        let loader = match TieConfig::user_config_path() {
            Some(user) => self.optional(user, Layer::User),
            None => self,
        };
        loader.optional(PathBuf::from(CONFIG_FILE_NAME), Layer::Local)
    }

    /// Add a TOML file that must exist when [`build`](Self::build) runs.
    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml).required(true));
        self.layers.push(Layer::Explicit(path.to_path_buf()));
        self
    }

    /// Add a TOML file that is skipped when missing.
    #[must_use]
    pub fn file_if_exists(self, path: impl AsRef<Path>) -> Self {
        self.optional(path.as_ref().to_path_buf(), Layer::Explicit)
    }

    fn optional(mut self, path: PathBuf, layer: fn(PathBuf) -> Layer) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(false));
        if path.exists() {
            self.layers.push(layer(path));
        }
        self
    }

    /// Add TOML text.
    #[must_use]
    pub fn inline(mut self, content: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Toml));
        self.layers.push(Layer::Inline);
        self
    }

    /// Read `TIE_<SECTION>__<KEY>` variables, e.g.
    /// `TIE_SYNC__PUSH_TIPS_AS_BRANCHES=true`.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        self.env = true;
        self
    }

    /// Apply `key = value` overrides on top of every other layer.
    ///
    /// # Errors
    ///
    /// Returns an error for a key the config crate cannot address.
    pub fn overrides<K, V>(mut self, overrides: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<config::Value>,
    {
        for (key, value) in overrides {
            self.builder = self
                .builder
                .set_override(key.as_ref(), value)
                .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
        }
        Ok(self)
    }

    /// Merge the layers.
    ///
    /// # Errors
    ///
    /// Fails on a missing required file, invalid TOML, an unparsable
    /// environment variable or a value of the wrong type.
    pub fn build(self) -> Result<TieConfig> {
        let builder = if self.env {
            self.builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
        } else {
            self.builder
        };
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Layers added so far; optional files only when they exist.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Numbered listing for `tie inis`.
    #[must_use]
    pub fn format_layers(&self) -> Vec<String> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| format!("{}. {layer}", i + 1))
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
