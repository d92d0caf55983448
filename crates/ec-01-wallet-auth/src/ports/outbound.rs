//! # Outbound Ports (Driven Ports / SPI)
//!
//! Storage this subsystem depends on. The TTL policy lives in
//! `NonceStore`; a repository only keeps records, so an in-process map and an
//! external key-value store are interchangeable.

use crate::domain::entities::NonceRecord;
use shared_types::WalletAddress;

/// Keyed storage for outstanding challenges, one record per wallet.
///
/// Each call must be atomic with respect to its key.
pub trait NonceRepository: Send + Sync {
    /// Current record for `wallet`, if any.
    fn get(&self, wallet: &WalletAddress) -> Option<NonceRecord>;

    /// Store `record`, replacing any record for the same wallet.
    fn put(&self, record: NonceRecord);

    /// Remove the wallet's record only if `predicate` holds for it.
    ///
    /// Returns the removed record. Check-and-remove happens atomically so two
    /// concurrent consumers cannot both take the same challenge.
    fn remove_if(
        &self,
        wallet: &WalletAddress,
        predicate: &dyn Fn(&NonceRecord) -> bool,
    ) -> Option<NonceRecord>;

    /// Keep only the records for which `keep` returns true.
    ///
    /// Returns the number of records removed.
    fn retain(&self, keep: &dyn Fn(&NonceRecord) -> bool) -> usize;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// Whether the repository is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
