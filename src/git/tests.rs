// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::refs::{
    BaseKind, explode_remote_ref, is_branch, ref_name, resolve, shorthand, tip_name,
    validate_tip_name,
};
use super::{GitEditor, RefUpdate, RefUpdateKind, TieRepo};
use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Repository with one empty commit on `refs/heads/master`.
fn init_repo(dir: &TempDir) -> Repository {
    let repo = Repository::init(dir.path()).expect("failed to init repo");
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("refs/heads/master"), &sig, &sig, "initial\n", &tree, &[])
            .unwrap();
        repo.set_head("refs/heads/master").unwrap();
    }
    repo
}

// ============================================================================
// Ref namespace
// ============================================================================

#[test]
fn test_shorthand() {
    assert_eq!(shorthand(""), "");
    assert_eq!(shorthand("refs/heads/master"), "master");
    assert_eq!(shorthand("refs/heads/work/local"), "work/local");
    assert_eq!(shorthand("refs/remotes/origin/master"), "origin/master");
    assert_eq!(shorthand("refs/remotes/origin/work/other"), "origin/work/other");
    assert_eq!(shorthand("refs/tips/a_tip"), "a_tip");
    assert_eq!(shorthand("refs/rtips/origin/a_tip"), "origin/a_tip");
    assert_eq!(shorthand("refs/tails/a_tip"), "refs/tails/a_tip");
}

#[test]
fn test_tip_name() {
    assert_eq!(tip_name("refs/remotes/origin/master"), None);
    assert_eq!(tip_name("refs/rtips/origin/test"), None);
    assert_eq!(tip_name("refs/tips/test"), Some("test"));
    assert_eq!(tip_name("refs/tips/tmp/test"), Some("tmp/test"));
}

#[test]
fn test_ref_name() {
    assert!(ref_name("").is_err());
    assert!(ref_name("HEAD").is_err());
    assert_eq!(ref_name("refs/heads/master").unwrap(), "master");
    assert_eq!(ref_name("refs/heads/work/mine").unwrap(), "mine");
    assert_eq!(ref_name("refs/remotes/origin/work/yours").unwrap(), "yours");
    assert_eq!(ref_name("refs/tips/tmp/my_tip").unwrap(), "my_tip");
    assert_eq!(ref_name("refs/rtips/origin/my_tip").unwrap(), "my_tip");
}

#[test]
fn test_explode_remote_ref() {
    for not_remote in ["", "refs/heads/master", "refs/tips/other", "origin/master"] {
        assert!(explode_remote_ref(not_remote).is_err(), "{not_remote}");
    }

    let exploded: Vec<_> = [
        "refs/remotes/origin/master",
        "refs/remotes/origin/features/work",
        "refs/remotes/someplace/features/work",
        "refs/rtips/origin/work",
        "refs/rtips/somewhere/work/mine",
    ]
    .into_iter()
    .map(|r| explode_remote_ref(r).unwrap())
    .collect();

    insta::assert_debug_snapshot!(exploded, @r#"
    [
        (
            "origin",
            "refs/heads/master",
        ),
        (
            "origin",
            "refs/heads/features/work",
        ),
        (
            "someplace",
            "refs/heads/features/work",
        ),
        (
            "origin",
            "refs/tips/work",
        ),
        (
            "somewhere",
            "refs/tips/work/mine",
        ),
    ]
    "#);
}

#[test]
fn test_is_branch() {
    assert!(!is_branch(""));
    assert!(is_branch("refs/heads/master"));
    assert!(is_branch("refs/heads/features/work"));
    assert!(!is_branch("refs/remotes/origin/master"));
    assert!(!is_branch("origin/master"));
    assert!(!is_branch("refs/tips/test"));
    assert!(!is_branch("refs/rtips/test"));
    assert!(!is_branch("refs/tails/test"));
}

#[test]
fn test_base_kind() {
    assert_eq!(BaseKind::of("refs/heads/master"), BaseKind::LocalBranch);
    assert_eq!(BaseKind::of("refs/tips/t"), BaseKind::LocalTip);
    assert_eq!(
        BaseKind::of("refs/remotes/origin/master"),
        BaseKind::RemoteBranch {
            remote: "origin".to_string(),
            target: "refs/heads/master".to_string(),
        }
    );
    assert_eq!(
        BaseKind::of("refs/rtips/origin/t").remote(),
        Some("origin")
    );
    assert!(matches!(
        BaseKind::of("refs/rtips/origin/t"),
        BaseKind::RemoteTip { .. }
    ));
    assert_eq!(BaseKind::of("refs/tags/v1"), BaseKind::Other);
}

#[test]
fn test_validate_tip_name() {
    assert!(validate_tip_name("fix").is_ok());
    assert!(validate_tip_name("work/fix").is_ok());
    let err = validate_tip_name("   ").unwrap_err();
    assert_eq!(err.to_string(), "Name of the tip can't be empty.");
    assert!(validate_tip_name("bad..name").is_err());
    assert!(validate_tip_name("bad name").is_err());
}

// ============================================================================
// Shorthand resolution
// ============================================================================

#[test]
fn test_resolve_order() {
    let dir = temp_dir();
    let repo = init_repo(&dir);
    let head = repo.head().unwrap().target().unwrap();
    for name in [
        "refs/tips/test",
        "refs/rtips/origin/testorigin",
        "refs/remotes/origin/master",
        "refs/remotes/origin/testorigin",
    ] {
        repo.reference(name, head, true, "").unwrap();
    }

    let resolved = |short: &str| {
        resolve(&repo, short)
            .map(|r| r.name().unwrap().to_string())
            .map_err(|e| e.to_string())
    };

    assert_eq!(
        resolved("foo").unwrap_err(),
        r#"No ref found for shorthand "foo""#
    );
    assert_eq!(resolved("test").unwrap(), "refs/tips/test");
    assert_eq!(resolved("tips/test").unwrap(), "refs/tips/test");
    assert!(resolved("testorigin").is_err());
    assert_eq!(
        resolved("origin/testorigin").unwrap(),
        "refs/rtips/origin/testorigin"
    );
    assert_eq!(
        resolved("rtips/origin/testorigin").unwrap(),
        "refs/rtips/origin/testorigin"
    );
    assert_eq!(resolved("origin/master").unwrap(), "refs/remotes/origin/master");
    assert_eq!(
        resolved("remotes/origin/testorigin").unwrap(),
        "refs/remotes/origin/testorigin"
    );
    assert_eq!(resolved("heads/master").unwrap(), "refs/heads/master");
    assert_eq!(resolved("refs/heads/master").unwrap(), "refs/heads/master");
}

#[test]
fn test_resolve_follows_symbolic_refs() {
    let dir = temp_dir();
    let repo = init_repo(&dir);
    let head = repo.head().unwrap().target().unwrap();
    repo.reference("refs/remotes/origin/master", head, true, "")
        .unwrap();
    repo.reference_symbolic(
        "refs/remotes/origin/HEAD",
        "refs/remotes/origin/master",
        true,
        "",
    )
    .unwrap();

    let resolved = |short: &str| {
        resolve(&repo, short)
            .map(|r| r.name().unwrap().to_string())
            .map_err(|e| e.to_string())
    };

    assert_eq!(resolved("HEAD").unwrap(), "refs/heads/master");
    assert_eq!(resolved("origin/HEAD").unwrap(), "refs/remotes/origin/master");

    repo.set_head_detached(head).unwrap();
    assert_eq!(
        resolved("HEAD").unwrap_err(),
        r#"No ref found for shorthand "HEAD""#
    );
}

// ============================================================================
// TieRepo
// ============================================================================

#[test]
fn test_current_tip_requires_tip() {
    let dir = temp_dir();
    let repo = TieRepo::from_repository(init_repo(&dir));
    let err = repo.current_tip().unwrap_err();
    assert!(err.to_string().contains("refs/heads/master"));

    let head = repo.target_of("refs/heads/master").unwrap();
    repo.set_ref("refs/tips/t", head, "test").unwrap();
    repo.attach_head("refs/tips/t", "test").unwrap();
    assert_eq!(repo.current_tip().unwrap(), "t");
    assert_eq!(repo.head_ref_name().unwrap(), "refs/tips/t");
}

#[test]
fn test_base_config_round() {
    let dir = temp_dir();
    let repo = TieRepo::from_repository(init_repo(&dir));

    assert_eq!(repo.base_of("a").unwrap(), None);
    assert!(repo.require_base("a").is_err());

    repo.set_base("a", "refs/heads/master").unwrap();
    repo.set_base("work.b", "refs/remotes/origin/master").unwrap();
    assert_eq!(
        repo.require_base("a").unwrap(),
        "refs/heads/master".to_string()
    );

    let mut bases = repo.tip_bases().unwrap();
    bases.sort();
    assert_eq!(
        bases,
        vec![
            ("a".to_string(), "refs/heads/master".to_string()),
            ("work.b".to_string(), "refs/remotes/origin/master".to_string()),
        ]
    );

    repo.remove_base("a").unwrap();
    repo.remove_base("a").unwrap();
    assert_eq!(repo.base_of("a").unwrap(), None);
}

#[test]
fn test_compat_prefix_precedence() {
    let dir = temp_dir();
    let repo = TieRepo::from_repository(init_repo(&dir)).with_compat_fallback(Some("x/".into()));
    assert_eq!(repo.compat_prefix().unwrap().as_deref(), Some("x/"));

    let mut config = repo.git().config().unwrap();
    config.set_bool("tie.pushTipsAsBranches", false).unwrap();
    assert_eq!(repo.compat_prefix().unwrap(), None);

    config.set_bool("tie.pushTipsAsBranches", true).unwrap();
    assert_eq!(repo.compat_prefix().unwrap().as_deref(), Some("tips/"));

    config.set_str("tie.tipsBranchPrefix", "wip/").unwrap();
    assert_eq!(repo.compat_prefix().unwrap().as_deref(), Some("wip/"));
}

#[test]
fn test_clean_ignores_untracked() {
    let dir = temp_dir();
    let repo = TieRepo::from_repository(init_repo(&dir));
    std::fs::write(dir.path().join("untracked"), "x").unwrap();
    assert!(repo.is_clean().unwrap());

    let mut index = repo.git().index().unwrap();
    index.add_path(std::path::Path::new("untracked")).unwrap();
    index.write().unwrap();
    assert!(!repo.is_clean().unwrap());
    let err = repo.ensure_clean().unwrap_err();
    assert!(err.to_string().contains("untracked"));
}

#[test]
fn test_refs_with_prefix_sorted() {
    let dir = temp_dir();
    let repo = TieRepo::from_repository(init_repo(&dir));
    let head = repo.target_of("HEAD").unwrap();
    for name in ["refs/tips/b", "refs/tips/a", "refs/tips/dir/c", "refs/tails/a"] {
        repo.set_ref(name, head, "test").unwrap();
    }
    assert_eq!(
        repo.refs_with_prefix("refs/tips/").unwrap(),
        vec!["refs/tips/a", "refs/tips/b", "refs/tips/dir/c"]
    );
    assert_eq!(repo.tip_names().unwrap(), vec!["a", "b", "dir/c"]);
    assert!(repo.delete_ref("refs/tips/a").unwrap());
    assert!(!repo.delete_ref("refs/tips/a").unwrap());
}

// ============================================================================
// Callbacks and editor
// ============================================================================

#[test]
fn test_ref_update_display() {
    let one = Oid::from_str("1111111111111111111111111111111111111111").unwrap();
    let two = Oid::from_str("2222222222222222222222222222222222222222").unwrap();
    let updates = [
        RefUpdate {
            refname: "refs/remotes/origin/a".into(),
            old: Oid::zero(),
            new: one,
        },
        RefUpdate {
            refname: "refs/remotes/origin/b".into(),
            old: one,
            new: two,
        },
        RefUpdate {
            refname: "refs/remotes/origin/c".into(),
            old: two,
            new: Oid::zero(),
        },
    ];
    assert_eq!(updates[0].kind(), RefUpdateKind::Created);
    let lines: Vec<String> = updates.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(lines.join("\n"), @r"
    Created refs/remotes/origin/a
    Updated refs/remotes/origin/b
    Deleted refs/remotes/origin/c
    ");
}

#[test]
fn test_editor_override_wins() {
    let dir = temp_dir();
    let repo = init_repo(&dir);
    let mut config = repo.config().unwrap();
    config.set_str("core.editor", "nano").unwrap();

    assert_eq!(GitEditor::new(Some("ed".into())).resolve(&config), "ed");
    assert_eq!(GitEditor::new(None).resolve(&config), "nano");
}

#[test]
fn test_editor_command_plain_program_runs_directly() {
    let command = super::editor::editor_command("sh", std::path::Path::new("MSG")).unwrap();
    assert!(command.get_program().to_string_lossy().ends_with("sh"));
    let args: Vec<_> = command.get_args().collect();
    assert_eq!(args, ["MSG"]);
}

#[test]
fn test_editor_command_with_arguments_goes_through_shell() {
    let command =
        super::editor::editor_command("'/opt/my editor/code' --wait", std::path::Path::new("MSG"))
            .unwrap();
    let args: Vec<String> = command
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    insta::assert_debug_snapshot!(args, @r#"
    [
        "-c",
        "'/opt/my editor/code' --wait \"$@\"",
        "'/opt/my editor/code' --wait",
        "MSG",
    ]
    "#);
}

#[cfg(unix)]
#[test]
fn test_editor_path_with_spaces_and_arguments() {
    use std::os::unix::fs::PermissionsExt;

    use super::Editor;

    let dir = temp_dir();
    let repo = init_repo(&dir);
    let tools = dir.path().join("my tools");
    std::fs::create_dir(&tools).unwrap();
    let script = tools.join("edit.sh");
    std::fs::write(&script, "#!/bin/sh\nprintf '%s\\n' \"$1\" > \"$2\"\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    let message = dir.path().join("MSG");
    std::fs::write(&message, "old\n").unwrap();

    let editor = GitEditor::new(Some(format!("'{}' --wait", script.display())));
    let content = editor.edit(&repo.config().unwrap(), &message).unwrap();

    assert_eq!(content, "--wait\n");
}
