//! # In-Memory Nonce Repository
//!
//! DashMap-backed implementation of [`NonceRepository`]. Contents are lost
//! on restart.

use crate::domain::entities::NonceRecord;
use crate::ports::outbound::NonceRepository;
use dashmap::DashMap;
use shared_types::WalletAddress;

/// Process-local challenge storage.
#[derive(Debug, Default)]
pub struct InMemoryNonceRepository {
    records: DashMap<WalletAddress, NonceRecord>,
}

impl InMemoryNonceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NonceRepository for InMemoryNonceRepository {
    fn get(&self, wallet: &WalletAddress) -> Option<NonceRecord> {
        self.records.get(wallet).map(|entry| entry.value().clone())
    }

    fn put(&self, record: NonceRecord) {
        self.records.insert(record.wallet.clone(), record);
    }

    fn remove_if(
        &self,
        wallet: &WalletAddress,
        predicate: &dyn Fn(&NonceRecord) -> bool,
    ) -> Option<NonceRecord> {
        self.records
            .remove_if(wallet, |_, record| predicate(record))
            .map(|(_, record)| record)
    }

    fn retain(&self, keep: &dyn Fn(&NonceRecord) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| keep(record));
        before.saturating_sub(self.records.len())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
