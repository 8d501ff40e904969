//! CLI command handlers for the batcher binary

pub mod commands;

pub use commands::{
    cmd_delete, cmd_hash, cmd_pending, cmd_propose, cmd_sign, cmd_status, load_batch,
    signature_from_wire, CliResult,
};
