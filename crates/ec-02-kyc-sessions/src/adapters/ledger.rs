//! # In-Memory Credential Ledger
//!
//! Seedable stand-in for the on-chain credential program, used by the
//! development runtime and by tests.
//!
//! A node can start from a JSON seed: an array of credential accounts in the
//! same camelCase shape `GET /credentials/{holder}` returns.

use crate::domain::errors::LedgerError;
use crate::ports::outbound::CredentialLedger;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Credential, WalletAddress};
use std::collections::HashMap;
use tracing::{info, warn};

/// Credential accounts keyed by holder.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: RwLock<HashMap<WalletAddress, Credential>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger holding `credentials`.
    pub fn with_credentials(credentials: impl IntoIterator<Item = Credential>) -> Self {
        let ledger = Self::new();
        for credential in credentials {
            ledger.insert(credential);
        }
        ledger
    }

    /// Create a ledger from a JSON array of credential accounts.
    ///
    /// # Errors
    /// * `LedgerError::MalformedAccount` - the document is not an array of
    ///   well-formed credentials
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let credentials: Vec<Credential> = serde_json::from_str(json)
            .map_err(|e| LedgerError::MalformedAccount(format!("ledger seed: {e}")))?;
        let count = credentials.len();

        let ledger = Self::with_credentials(credentials);
        if ledger.len() < count {
            warn!(
                accounts = count,
                holders = ledger.len(),
                "Ledger seed repeats holders; later entries win"
            );
        }
        info!(holders = ledger.len(), "Seeded credential ledger");
        Ok(ledger)
    }

    /// Write (or replace) the holder's account.
    pub fn insert(&self, credential: Credential) {
        self.accounts
            .write()
            .insert(credential.holder.clone(), credential);
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialLedger for InMemoryLedger {
    async fn fetch_credential_account(
        &self,
        holder: &WalletAddress,
    ) -> Result<Option<Credential>, LedgerError> {
        Ok(self.accounts.read().get(holder).cloned())
    }
}
