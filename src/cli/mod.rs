//! Operator command line interface

pub mod commands;

pub use commands::{
    cmd_add, cmd_ban, cmd_check, cmd_import, cmd_purge_epoch, cmd_show, cmd_shuffle, AppState,
    CliResult,
};
