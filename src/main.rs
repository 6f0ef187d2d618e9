//! Wallet CLI Application
//!
//! A command-line interface for managing account keys and authorizing
//! transactions.

use clap::{Parser, Subcommand};
use chain_wallet::account::AccountStore;
use chain_wallet::cli::{self, TxOptions};
use chain_wallet::config::WalletConfig;
use chain_wallet::crypto::Algorithm;
use chain_wallet::tx::DEFAULT_CHAIN_ID;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wallet")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Account keys and multi-signature transaction authorization", long_about = None)]
struct Cli {
    /// Account directory (defaults to ~/.chain_wallet)
    #[arg(long)]
    account_dir: Option<PathBuf>,

    /// Account used for signing
    #[arg(short, long)]
    account: Option<String>,

    /// Permission used for signing
    #[arg(long, default_value = "active")]
    sign_perm: String,

    /// Signature algorithm of key files (ed25519 or secp256k1)
    #[arg(long, default_value = "ed25519")]
    sign_algo: Algorithm,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account key operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Transaction request operations
    Tx {
        #[command(subcommand)]
        action: TxCommands,
    },

    /// Sign a transaction with the selected account, writing a signature file
    Sign {
        /// Transaction request file
        #[arg(short, long)]
        tx: PathBuf,

        /// Signature file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Attach signatures to a transaction
    Authorize {
        /// Transaction request file
        #[arg(short, long)]
        tx: PathBuf,

        /// Private key files to sign with
        #[arg(long, num_args = 1..)]
        sign_keys: Vec<PathBuf>,

        /// Signature files to verify and attach
        #[arg(long, num_args = 1..)]
        with_signs: Vec<PathBuf>,

        /// Signed transaction file to write
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Create a new account key
    Create {
        /// Account name
        #[arg(short, long)]
        name: String,
    },

    /// Import a base58 private key
    Import {
        /// Account name
        #[arg(short, long)]
        name: String,

        /// Base58 private key
        #[arg(short, long)]
        private_key: String,
    },

    /// List all accounts
    List,

    /// Show the keys of an account
    Show {
        /// Account name
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum TxCommands {
    /// Build an unsigned transaction request
    Build {
        /// Actions as `contract action data` triples
        #[arg(num_args = 1..)]
        actions: Vec<String>,

        /// Co-signers as account@permission
        #[arg(long, num_args = 1..)]
        signers: Vec<String>,

        /// Amount limits, e.g. iost:10|ram:unlimited
        #[arg(long, default_value = "")]
        amount_limit: String,

        #[arg(long, default_value = "1.0")]
        gas_ratio: f64,

        #[arg(long, default_value = "1000000")]
        gas_limit: f64,

        /// Validity window in seconds
        #[arg(long, default_value = "90")]
        expiration: i64,

        /// Deferred execution delay in seconds
        #[arg(long, default_value = "0")]
        delay: i64,

        #[arg(long, default_value_t = DEFAULT_CHAIN_ID)]
        chain_id: u32,

        /// Transaction request file to write
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.account_dir {
        Some(dir) => WalletConfig::new(dir),
        None => WalletConfig::from_home()?,
    };
    config = config
        .with_permission(&cli.sign_perm)
        .with_algorithm(cli.sign_algo);
    if let Some(name) = &cli.account {
        config = config.with_account(name);
    }
    let store = AccountStore::new(config);

    match cli.command {
        Commands::Account { action } => match action {
            AccountCommands::Create { name } => {
                cli::cmd_account_create(&store, &name, cli.sign_algo)?;
            }
            AccountCommands::Import { name, private_key } => {
                cli::cmd_account_import(&store, &name, cli.sign_algo, &private_key)?;
            }
            AccountCommands::List => {
                cli::cmd_account_list(&store)?;
            }
            AccountCommands::Show { name } => {
                cli::cmd_account_show(&store, &name)?;
            }
        },

        Commands::Tx { action } => match action {
            TxCommands::Build {
                actions,
                signers,
                amount_limit,
                gas_ratio,
                gas_limit,
                expiration,
                delay,
                chain_id,
                output,
            } => {
                let options = TxOptions {
                    actions,
                    signers,
                    amount_limit,
                    gas_ratio,
                    gas_limit,
                    expiration,
                    delay,
                    chain_id,
                };
                cli::cmd_tx_build(&options, &output)?;
            }
        },

        Commands::Sign { tx, output } => {
            cli::cmd_sign(&store, &tx, &output)?;
        }

        Commands::Authorize {
            tx,
            sign_keys,
            with_signs,
            output,
        } => {
            cli::cmd_authorize(&tx, &sign_keys, cli.sign_algo, &with_signs, &output)?;
        }
    }

    Ok(())
}
