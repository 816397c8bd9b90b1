// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Create | Commit | Amend | Rewrite | Select | Stack | Delete
//!   Update | Upgrade | Fetch | List | Options | Inis | Version
//! ```

use std::process::ExitCode;

use tie_rs::cli::global::GlobalOptions;
use tie_rs::cli::{self, Command};
use tie_rs::cmd::Workspace;
use tie_rs::cmd::config::{run_inis_command, run_options_command};
use tie_rs::cmd::tip::{
    run_amend_command, run_commit_command, run_create_command, run_delete_command,
    run_fetch_command, run_list_command, run_rewrite_command, run_select_command,
    run_stack_command, run_update_command, run_upgrade_command,
};
use tie_rs::config::loader::ConfigLoader;
use tie_rs::config::TieConfig;
use tie_rs::logging::{LogConfig, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config)
}

fn build_log_config(config: &TieConfig) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(
            config
                .global
                .log_file
                .as_ref()
                .map(|p| p.display().to_string()),
        )
        .build()
}

fn dispatch_command(cli: &cli::Cli, config: &TieConfig) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => {
            run_options_command(config);
            Ok(())
        }
        Some(Command::Inis) => {
            let loader = build_config_loader(&cli.global);
            run_inis_command(&loader.format_layers());
            Ok(())
        }
        Some(command) => Workspace::open(cli.global.repo.as_deref(), config)
            .and_then(|ws| run_tip_command(command, &ws)),
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_tip_command(command: &Command, ws: &Workspace) -> tie_rs::error::Result<()> {
    match command {
        Command::Create(args) => run_create_command(args, ws),
        Command::Commit(args) => run_commit_command(args, ws),
        Command::Amend(args) => run_amend_command(args, ws),
        Command::Rewrite(args) => run_rewrite_command(args, ws),
        Command::Select(args) => run_select_command(args, ws),
        Command::Stack => run_stack_command(ws),
        Command::Delete(args) => run_delete_command(args, ws),
        Command::Update(args) => run_update_command(args, ws),
        Command::Upgrade(args) => run_upgrade_command(args, ws),
        Command::Fetch => run_fetch_command(ws),
        Command::List(args) => run_list_command(args, ws),
        Command::Version | Command::Options | Command::Inis => Ok(()),
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if !global.no_default_configs {
        loader = loader.default_files();
    }
    for path in &global.configs {
        loader = loader.file(path);
    }
    loader.with_env()
}

fn load_config(global: &GlobalOptions) -> tie_rs::error::Result<TieConfig> {
    build_config_loader(global)
        .overrides(global.to_config_overrides())?
        .build()
}
