//! Command handlers for the `wallet` binary

pub mod commands;

pub use commands::{
    cmd_account_create, cmd_account_import, cmd_account_list, cmd_account_show, cmd_authorize,
    cmd_sign, cmd_tx_build, load_transaction, save_transaction, CliResult, TxOptions,
};
