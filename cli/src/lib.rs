//! Declarative Windows configuration for the dotfiles engine.
//!
//! Reconciles a `windows` directive (desktop personalization, registry
//! imports, per-user fonts) against the live system, idempotently and without
//! aborting on the first failed item.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: load directive trees, validate their shape, expand paths
//! - **[`resources`]**: idempotent `check + apply` primitives (registry values, colours, fonts, `.reg` files)
//! - **[`tasks`]**: the named units of work wired to resources
//! - **[`plugin`]**: the orchestrator that gates, validates, runs and aggregates tasks
//! - **[`commands`]**: top-level subcommand orchestration (`apply`, `validate`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod plugin;
pub mod resources;
pub mod tasks;
