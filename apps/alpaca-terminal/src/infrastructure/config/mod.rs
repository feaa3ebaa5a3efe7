//! Configuration Module
//!
//! Configuration loading for the terminal commands.

mod settings;

pub use settings::{
    AlpacaSettings, ConfigError, Credentials, DataFeed, Environment, PollSettings, TerminalConfig,
};
