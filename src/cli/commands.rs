//! CLI commands for the wallet
//!
//! Implements all command handlers for the CLI interface.

use std::fs;
use std::path::{Path, PathBuf};

use crate::account::AccountStore;
use crate::crypto::{Algorithm, KeyPair, NativeSigner};
use crate::tx::{
    actions_from_args, authorize, parse_amount_limits, parse_signers, sign_transaction,
    validate_signers, KeySource, SignerSpec, TransactionBuilder, TransactionRequest,
};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Options for building a transaction request
#[derive(Debug, Clone)]
pub struct TxOptions {
    pub actions: Vec<String>,
    pub signers: Vec<String>,
    pub amount_limit: String,
    pub gas_ratio: f64,
    pub gas_limit: f64,
    pub expiration: i64,
    pub delay: i64,
    pub chain_id: u32,
}

/// Load a transaction request from a JSON file
pub fn load_transaction(path: &Path) -> CliResult<TransactionRequest> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save a transaction request as JSON
pub fn save_transaction(tx: &TransactionRequest, path: &Path) -> CliResult<()> {
    fs::write(path, serde_json::to_string_pretty(tx)?)?;
    Ok(())
}

/// Create a new account key
pub fn cmd_account_create(store: &AccountStore, name: &str, algorithm: Algorithm) -> CliResult<()> {
    let key_pair = KeyPair::generate(algorithm);
    let path = store.save_key_pair(name, &key_pair)?;

    println!("🔐 New account key created!");
    println!("   👤 Account: {}", name);
    println!("   🔧 Algorithm: {}", algorithm);
    println!("   🔑 Public Key: {}", key_pair.public_key_base58());
    println!("   📁 Private key saved at: {}", path.display());
    println!("\n   ⚠️  IMPORTANT: Back up this file to avoid losing access to the account!");

    Ok(())
}

/// Import an existing private key
pub fn cmd_account_import(
    store: &AccountStore,
    name: &str,
    algorithm: Algorithm,
    private_key: &str,
) -> CliResult<()> {
    let key_pair = KeyPair::from_private_key_base58(algorithm, private_key)?;
    let path = store.save_key_pair(name, &key_pair)?;

    println!("📥 Key imported for {}", name);
    println!("   🔑 Public Key: {}", key_pair.public_key_base58());
    println!("   📁 Private key saved at: {}", path.display());

    Ok(())
}

/// List all accounts
pub fn cmd_account_list(store: &AccountStore) -> CliResult<()> {
    let names = store.list_accounts()?;

    if names.is_empty() {
        println!("📭 No accounts found. Create one with: wallet account create --name <NAME>");
        return Ok(());
    }

    println!("📋 Accounts in {}:", store.config().account_dir().display());
    for name in &names {
        println!("   {}", name);
    }

    Ok(())
}

/// Show the permissions and public keys of an account
pub fn cmd_account_show(store: &AccountStore, name: &str) -> CliResult<()> {
    let account = store.resolve(name, false)?;

    println!("👤 Account {}", account.name);
    for (permission, kp) in &account.keypairs {
        let state = if kp.encrypted { " (encrypted)" } else { "" };
        println!(
            "   └─ {} | {} | {}{}",
            permission,
            kp.algorithm,
            kp.public_key_base58(),
            state
        );
    }

    Ok(())
}

/// Build an unsigned transaction request
pub fn cmd_tx_build(options: &TxOptions, output: &Path) -> CliResult<()> {
    validate_signers(&options.signers)?;
    let signers = parse_signers(&options.signers)?;
    let amount_limit = parse_amount_limits(&options.amount_limit)?;
    let actions = actions_from_args(&options.actions)?;

    let mut builder = TransactionBuilder::new()
        .actions(actions)
        .amount_limit(amount_limit)
        .gas(options.gas_ratio, options.gas_limit)
        .chain_id(options.chain_id)
        .expiration_secs(options.expiration)
        .delay_secs(options.delay);
    for signer in signers {
        builder = builder.add_signer(signer);
    }
    let tx = builder.build()?;

    save_transaction(&tx, output)?;

    println!("📝 Transaction request written to {}", output.display());
    println!("   ├─ Hash: {}", tx.hash_hex());
    println!("   ├─ Actions: {}", tx.actions.len());
    println!("   └─ Signers: {}", tx.signers.len());

    Ok(())
}

/// Sign a transaction with the configured account and write a signature record
pub fn cmd_sign(store: &AccountStore, tx_path: &Path, output: &Path) -> CliResult<()> {
    let tx = load_transaction(tx_path)?;
    let config = store.config();
    let name = config.require_account_name()?;

    let key_pair = store.load_active_key()?;
    let signer = SignerSpec::new(name, &config.sign_permission);
    let signature = sign_transaction(&tx, &key_pair, Some(signer.clone()), &NativeSigner)?;
    drop(key_pair);

    signature.save(output)?;

    println!("✍️  Signed transaction {} as {}", tx.hash_hex(), signer);
    println!("   📁 Signature saved at: {}", output.display());

    Ok(())
}

/// Attach signatures to a transaction, signing or verifying as requested
pub fn cmd_authorize(
    tx_path: &Path,
    sign_keys: &[PathBuf],
    algorithm: Algorithm,
    with_signs: &[PathBuf],
    output: &Path,
) -> CliResult<()> {
    let mut tx = load_transaction(tx_path)?;
    let sources: Vec<KeySource> = sign_keys
        .iter()
        .map(|path| KeySource::new(path.clone(), algorithm))
        .collect();

    authorize(&mut tx, &sources, with_signs, &NativeSigner)?;
    save_transaction(&tx, output)?;

    println!("✅ Transaction authorized");
    println!("   ├─ Hash: {}", tx.hash_hex());
    println!("   ├─ Signatures: {}", tx.signatures.len());
    println!("   └─ Written to {}", output.display());

    Ok(())
}
