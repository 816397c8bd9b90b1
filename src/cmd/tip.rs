// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tip command handlers.

use anyhow::Context;

use super::Workspace;
use crate::cli::tip::{
    AmendArgs, CommitArgs, CreateArgs, DeleteArgs, ListArgs, SelectArgs, SequenceAction,
    SequenceArgs,
};
use crate::error::Result;
use crate::git::refs;
use crate::tip::{self, FetchOutcome, PushReport, RewriteOutcome};

/// Print the push result of a local change; a failure is a warning only.
fn report_push(push: &PushReport) {
    match push {
        PushReport::Pushed(_) => println!("{push}"),
        PushReport::NotPushed { .. } => {}
        PushReport::Failed { .. } => eprintln!("Warning: {push}"),
    }
}

fn report_fetch(fetch: &FetchOutcome) {
    for update in &fetch.updates {
        println!("{update}");
    }
}

/// Handler for `create`.
///
/// # Errors
///
/// Returns an error if the tip cannot be created.
pub fn run_create_command(args: &CreateArgs, ws: &Workspace) -> Result<()> {
    let created = tip::create(&ws.repo, &args.name, args.base.as_deref())
        .with_context(|| format!("failed to create tip '{}'", args.name))?;
    println!(
        "Created tip '{}' on '{}'",
        created.name,
        refs::shorthand(&created.base)
    );
    Ok(())
}

/// Handler for `commit`.
///
/// # Errors
///
/// Returns an error if nothing could be committed.
pub fn run_commit_command(args: &CommitArgs, ws: &Workspace) -> Result<()> {
    let outcome = tip::commit(
        &ws.repo,
        &ws.hooks,
        &ws.editor,
        args.message.as_deref(),
        args.tip_option(),
    )?;
    println!("{outcome}");
    report_push(&outcome.push);
    Ok(())
}

/// Handler for `amend`.
///
/// # Errors
///
/// Returns an error if the head commit could not be amended.
pub fn run_amend_command(args: &AmendArgs, ws: &Workspace) -> Result<()> {
    let outcome = tip::amend(&ws.repo, &ws.hooks, &ws.editor, args.amend_message())?;
    println!("{outcome}");
    report_push(&outcome.push);
    Ok(())
}

fn report_rewrite(outcome: &RewriteOutcome) {
    println!("{outcome}");
    if let RewriteOutcome::Finished { push, .. } = outcome {
        report_push(push);
    }
}

/// Handler for `rewrite [continue|abort]`.
///
/// # Errors
///
/// Returns an error if git fails or no rewrite is in progress.
pub fn run_rewrite_command(args: &SequenceArgs, ws: &Workspace) -> Result<()> {
    match args.action {
        None => report_rewrite(&tip::rewrite(&ws.repo, &ws.hooks)?),
        Some(SequenceAction::Continue) => {
            report_rewrite(&tip::rewrite_continue(&ws.repo, &ws.hooks)?);
        }
        Some(SequenceAction::Abort) => {
            let name = tip::rewrite_abort(&ws.repo)?;
            println!("Aborted rewrite of tip '{name}'");
        }
    }
    Ok(())
}

/// Handler for `select`.
///
/// # Errors
///
/// Returns an error if the ref does not exist or local changes are in the way.
pub fn run_select_command(args: &SelectArgs, ws: &Workspace) -> Result<()> {
    let refname = tip::select(&ws.repo, &args.name)?;
    println!("Selected {refname}");
    Ok(())
}

/// Handler for `stack`.
///
/// # Errors
///
/// Returns an error if the current tip cannot be stacked.
pub fn run_stack_command(ws: &Workspace) -> Result<()> {
    let outcome = tip::stack(&ws.repo, &ws.hooks)?;
    println!("{outcome}");
    if let Some(push) = &outcome.push {
        report_push(push);
    }
    Ok(())
}

/// Handler for `delete`.
///
/// # Errors
///
/// Returns an error if a name is not a deletable tip; nothing is deleted then.
pub fn run_delete_command(args: &DeleteArgs, ws: &Workspace) -> Result<()> {
    let outcomes = tip::delete_tips(&ws.repo, &ws.hooks, &args.names, args.stacked)?;
    if outcomes.is_empty() {
        println!("No tip to delete");
    }
    for outcome in &outcomes {
        if outcome.is_degraded() {
            eprintln!("Warning: {outcome}");
        } else {
            println!("{outcome}");
        }
    }
    Ok(())
}

fn run_sequence(args: &SequenceArgs, ws: &Workspace, fetch_first: bool) -> Result<()> {
    match args.action {
        None if fetch_first => {
            let report = tip::update(&ws.repo, &ws.hooks)?;
            report_fetch(&report.fetch);
            if let Some(outcome) = &report.upgrade {
                print_update(outcome);
            }
        }
        None => print_update(&tip::upgrade(&ws.repo, &ws.hooks)?),
        Some(SequenceAction::Continue) => {
            print_update(&tip::update_continue(&ws.repo, &ws.hooks)?);
        }
        Some(SequenceAction::Abort) => {
            let state = tip::update_abort(&ws.repo)?;
            println!("Aborted update of tip '{}'", state.tip);
        }
    }
    Ok(())
}

fn print_update(outcome: &tip::UpdateOutcome) {
    println!("{outcome}");
    if let tip::UpdateOutcome::Updated {
        push: Some(push), ..
    } = outcome
    {
        report_push(push);
    }
}

/// Handler for `update [continue|abort]`.
///
/// # Errors
///
/// Returns an error on fetch failures, conflicts or broken tips.
pub fn run_update_command(args: &SequenceArgs, ws: &Workspace) -> Result<()> {
    run_sequence(args, ws, true)
}

/// Handler for `upgrade [continue|abort]`.
///
/// # Errors
///
/// Returns an error on conflicts or broken tips.
pub fn run_upgrade_command(args: &SequenceArgs, ws: &Workspace) -> Result<()> {
    run_sequence(args, ws, false)
}

/// Handler for `fetch`.
///
/// # Errors
///
/// Returns an error if the remote cannot be fetched.
pub fn run_fetch_command(ws: &Workspace) -> Result<()> {
    let outcome = tip::fetch(&ws.repo, &ws.hooks)?;
    if outcome.remote.is_none() {
        println!("Nothing to fetch: HEAD is not tracking a remote");
    }
    report_fetch(&outcome);
    Ok(())
}

/// Handler for `list`.
///
/// # Errors
///
/// Returns an error if refs cannot be read.
pub fn run_list_command(args: &ListArgs, ws: &Workspace) -> Result<()> {
    for entry in tip::list(&ws.repo, args.filter())? {
        println!("{entry}");
    }
    Ok(())
}
