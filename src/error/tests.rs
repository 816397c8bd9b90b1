// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{SyncError, TieError, TieResult, TipError};

#[test]
fn test_out_of_date_display() {
    let err = TipError::OutOfDate {
        tip: "test".to_string(),
        base: "refs/heads/master".to_string(),
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"Current tip 'test' is out of date with its base 'refs/heads/master'. Please run 'tie update'"
    );
}

#[test]
fn test_no_ref_for_shorthand_display() {
    let err: TieError = TipError::NoRefForShorthand("test".to_string()).into();
    insta::assert_snapshot!(err.to_string(), @r#"No ref found for shorthand "test""#);
}

#[test]
fn test_tip_exists_on_remote_display() {
    let err = TipError::TipAlreadyExistsOnRemote {
        name: "test".to_string(),
        remote: "github".to_string(),
    };
    insta::assert_snapshot!(
        err.to_string(),
        @r#"Failed to create tip "test". A tip with that name already exists on github."#
    );
}

#[test]
fn test_accessors_select_the_right_family() {
    let tip: TieError = TipError::UpdateInProgress.into();
    assert!(matches!(tip.as_tip(), Some(TipError::UpdateInProgress)));
    assert!(tip.as_sync().is_none());

    let sync: TieError = SyncError::RemoteNotFound("origin".to_string()).into();
    assert!(matches!(sync.as_sync(), Some(SyncError::RemoteNotFound(r)) if r == "origin"));
    assert!(sync.as_tip().is_none());
}

#[test]
fn test_tie_error_size() {
    // Box<str> variants are 16 bytes (fat pointer: ptr + len)
    // With discriminant + alignment = 24 bytes
    let size = std::mem::size_of::<TieError>();
    assert!(size <= 24, "TieError is {size} bytes, expected <= 24");
}

#[test]
fn test_tie_result_size() {
    let size = std::mem::size_of::<TieResult<()>>();
    assert!(size <= 24, "TieResult<()> is {size} bytes, expected <= 24");
}
