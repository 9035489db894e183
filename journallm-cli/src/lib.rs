//! journallm-cli library interface
//!
//! The `journallm` binary is a thin clap front end over these modules.

pub mod commands;
pub mod output;
pub mod poller;

pub use poller::{PollOutcome, StatusPoller};
