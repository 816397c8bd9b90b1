// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::TieConfig;
use super::loader::{ConfigLoader, Layer};
use crate::logging::LogLevel;
use std::path::PathBuf;

#[test]
fn test_default_config() {
    let config = TieConfig::default();
    assert_eq!(config.global.output_log_level, LogLevel::WARN);
    assert!(config.global.log_file.is_none());
    assert!(!config.sync.push_tips_as_branches);
    assert_eq!(config.sync.tips_branch_prefix, "tips/");
    assert!(config.sync.progress);
    assert!(config.editor.command.is_none());
    assert_eq!(config.sync.compat_prefix(), None);
}

#[test]
fn test_config_parse() {
    let config = TieConfig::parse(
        r#"
[global]
output_log_level = 4
log_file = "logs/tie.log"

[sync]
push_tips_as_branches = true
tips_branch_prefix = "wip/"

[editor]
command = "nano"
"#,
    )
    .unwrap();

    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert_eq!(
        config.global.log_file,
        Some(PathBuf::from("logs/tie.log"))
    );
    assert_eq!(config.sync.compat_prefix(), Some("wip/"));
    assert_eq!(config.editor.command.as_deref(), Some("nano"));
}

#[test]
fn test_config_rejects_bad_log_level() {
    assert!(TieConfig::parse("[global]\noutput_log_level = 9\n").is_err());
}

#[test]
fn test_deny_unknown_fields() {
    assert!(TieConfig::parse("[sync]\nforce = true\n").is_err());
    assert!(TieConfig::parse("[remotes]\norigin = 1\n").is_err());
}

#[test]
fn test_format_options_deterministic() {
    let config =
        TieConfig::parse("[global]\nlog_file = \"tie.log\"\n[editor]\ncommand = \"vi\"\n").unwrap();
    insta::assert_snapshot!(config.format_options().join("\n"), @r"
    editor.command             = vi
    global.file_log_level      = 4
    global.log_file            = tie.log
    global.output_log_level    = 2
    sync.progress              = true
    sync.push_tips_as_branches = false
    sync.tips_branch_prefix    = tips/
    ");
}

#[test]
fn test_config_loader_tracks_layers() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("tie.toml");
    std::fs::write(&present, "[sync]\nprogress = false\n").unwrap();
    let missing = dir.path().join("missing.toml");

    let loader = ConfigLoader::new()
        .file_if_exists(&missing)
        .file_if_exists(&present)
        .inline("[editor]\ncommand = \"vim\"\n");

    assert_eq!(
        loader.layers(),
        [Layer::Explicit(present.clone()), Layer::Inline]
    );
    let formatted = loader.format_layers();
    assert_eq!(formatted[0], format!("1. [file] {}", present.display()));
    assert_eq!(formatted[1], "2. [inline]");

    let config = loader.build().unwrap();
    assert!(!config.sync.progress);
    assert_eq!(config.editor.command.as_deref(), Some("vim"));
}

#[test]
fn test_layer_display() {
    let path = PathBuf::from("/home/me/.config/tie/tie.toml");
    assert_eq!(
        Layer::User(path).to_string(),
        "[user] /home/me/.config/tie/tie.toml"
    );
    assert_eq!(Layer::Local(PathBuf::from("tie.toml")).to_string(), "[local] tie.toml");
}

#[test]
fn test_config_loader_required_file_not_found() {
    let result = ConfigLoader::new().file("/nonexistent/tie.toml").build();
    assert!(result.is_err());
}

#[test]
fn test_config_loader_layered_sources() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.toml");
    let second = dir.path().join("second.toml");
    std::fs::write(
        &first,
        "[sync]\npush_tips_as_branches = true\ntips_branch_prefix = \"a/\"\n",
    )
    .unwrap();
    std::fs::write(&second, "[sync]\ntips_branch_prefix = \"b/\"\n").unwrap();

    let config = ConfigLoader::new()
        .file(&first)
        .file(&second)
        .build()
        .unwrap();

    assert!(config.sync.push_tips_as_branches);
    assert_eq!(config.sync.tips_branch_prefix, "b/");
}

#[test]
fn test_config_loader_overrides_win() {
    let config = ConfigLoader::new()
        .inline("[global]\noutput_log_level = 1\n")
        .overrides([("global.output_log_level", 3)])
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.global.output_log_level, LogLevel::INFO);
}

#[test]
fn test_config_loader_default_impl() {
    let loader = ConfigLoader::default();
    assert!(loader.layers().is_empty());
    assert!(loader.build().is_ok());
}
