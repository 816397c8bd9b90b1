// tie-rs: tips on top of moving git branches
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |                     |
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML + env, layered     |
//!              '-------------+-------------'
//!                            v
//!              ,---------------------------,
//!              |            tip            |
//!              |  store  sync  update      |
//!              |  stack  list  commit      |
//!              '-------------+-------------'
//!                            v
//!              ,---------------------------,
//!              |            git            |
//!              |  TieRepo, refs, hooks,    |
//!              |  editor, git CLI          |
//!              '---------------------------'
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod tip;
