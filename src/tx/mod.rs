//! Transaction requests and their authorization
//!
//! - Declared co-signers (`account@permission`)
//! - Spending limits (`token:value|...`)
//! - Signature records for offline signing
//! - The multi-signature authorizer

pub mod authorize;
pub mod limit;
pub mod signature;
pub mod signer;
pub mod transaction;

pub use authorize::{
    authorize, authorize_request, sign_transaction, verify_transaction_signature, AuthError,
    KeySource, SigningRequest,
};
pub use limit::{parse_amount_limits, AmountLimit, LimitError, UNLIMITED};
pub use signature::{RecordError, Signature};
pub use signer::{parse_signers, validate_signers, SignerError, SignerSpec};
pub use transaction::{
    actions_from_args, Action, TransactionBuilder, TransactionRequest, TxError, DEFAULT_CHAIN_ID,
};
