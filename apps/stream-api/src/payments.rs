//! Payment execution seam.
//!
//! Transaction construction, signing and submission live behind
//! [`PaymentExecutor`]; the API only calls it and reacts to the outcome.

use async_trait::async_trait;

use crate::models::tip::{Amount, TokenType};

/// Reference to a settled on-chain transfer (a transaction signature).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRef(pub String);

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment rejected: {0}")]
    Rejected(String),
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("no payment executor configured")]
    Unavailable,
}

#[async_trait]
pub trait PaymentExecutor: Send + Sync {
    async fn execute(
        &self,
        amount: Amount,
        token_type: TokenType,
        destination: &str,
    ) -> Result<TransactionRef, PaymentError>;
}

/// Executor used when payments are signed client-side.
///
/// Every call fails with [`PaymentError::Unavailable`], so tip creation only
/// succeeds when the caller supplies the settled transaction hash.
pub struct ClientSignedPayments;

#[async_trait]
impl PaymentExecutor for ClientSignedPayments {
    async fn execute(
        &self,
        _amount: Amount,
        _token_type: TokenType,
        _destination: &str,
    ) -> Result<TransactionRef, PaymentError> {
        Err(PaymentError::Unavailable)
    }
}
