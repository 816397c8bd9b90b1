// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests the config module with realistic TOML files and checks how the
//! tool settings reach an opened workspace.

mod common;

use std::fs;

use common::{Fixture, temp_dir};
use tie_rs::cmd::Workspace;
use tie_rs::config::TieConfig;

// =============================================================================
// Loading from TOML strings
// =============================================================================

#[test]
fn config_parse_empty_is_default() {
    let config = TieConfig::parse("").unwrap();
    insta::assert_yaml_snapshot!(config, @r#"
    global:
      output_log_level: 2
      file_log_level: 4
      log_file: ~
    sync:
      push_tips_as_branches: false
      tips_branch_prefix: tips/
      progress: true
    editor:
      command: ~
    "#);
}

#[test]
fn config_parse_sync_section() {
    let toml = r#"
[sync]
push_tips_as_branches = true
tips_branch_prefix = "mirror/"
progress = false
"#;
    let config = TieConfig::parse(toml).unwrap();
    assert_eq!(config.sync.compat_prefix(), Some("mirror/"));
    assert!(!config.sync.progress);
}

#[test]
fn config_parse_invalid_toml() {
    assert!(TieConfig::parse("[global\noutput_log_level = ").is_err());
}

#[test]
fn config_parse_wrong_type() {
    assert!(TieConfig::parse("[sync]\nprogress = \"yes\"\n").is_err());
}

// =============================================================================
// Files and layering
// =============================================================================

#[test]
fn config_later_files_win() {
    let dir = temp_dir();
    let user = dir.path().join("user.toml");
    let local = dir.path().join("tie.toml");
    fs::write(&user, "[editor]\ncommand = \"vim\"\n[global]\noutput_log_level = 1\n").unwrap();
    fs::write(&local, "[editor]\ncommand = \"nano\"\n").unwrap();

    let loader = TieConfig::builder()
        .file(&user)
        .file_if_exists(&local)
        .file_if_exists(dir.path().join("absent.toml"));
    assert_eq!(loader.layers().len(), 2);
    let config = loader.build().unwrap();

    assert_eq!(config.editor.command.as_deref(), Some("nano"));
    assert_eq!(config.global.output_log_level.as_u8(), 1);
}

#[test]
fn config_from_missing_file_fails() {
    let dir = temp_dir();
    assert!(TieConfig::from_file(dir.path().join("nope.toml")).is_err());
}

#[test]
fn config_format_options_lists_every_key() {
    let config = TieConfig::parse("[editor]\ncommand = \"code --wait\"\n").unwrap();
    let keys: Vec<String> = config
        .format_options()
        .iter()
        .filter_map(|line| line.split_whitespace().next().map(str::to_string))
        .collect();
    insta::assert_debug_snapshot!(keys, @r#"
    [
        "editor.command",
        "global.file_log_level",
        "global.log_file",
        "global.output_log_level",
        "sync.progress",
        "sync.push_tips_as_branches",
        "sync.tips_branch_prefix",
    ]
    "#);
    assert!(config.format_options()[0].ends_with("= code --wait"));
}

// =============================================================================
// Workspace
// =============================================================================

#[test]
fn workspace_uses_config_as_compat_fallback() {
    let fx = Fixture::new();
    let workdir = fx.git().workdir().unwrap().to_path_buf();
    let config = TieConfig::parse("[sync]\npush_tips_as_branches = true\n").unwrap();

    let ws = Workspace::open(Some(&workdir), &config).unwrap();
    assert_eq!(ws.repo.compat_prefix().unwrap().as_deref(), Some("tips/"));

    fx.set_config("tie.pushTipsAsBranches", "false");
    assert_eq!(ws.repo.compat_prefix().unwrap(), None);
}

#[test]
fn workspace_outside_a_repository_fails() {
    let dir = temp_dir();
    let err = Workspace::open(Some(dir.path()), &TieConfig::default()).unwrap_err();
    assert!(err.to_string().contains("not a git repository"));
}
