//! nest-authctl: operator tooling for service trust.
//!
//! Each subcommand is a plain function in [`commands`] so it can be driven
//! from tests without spawning the binary.

pub mod commands;
