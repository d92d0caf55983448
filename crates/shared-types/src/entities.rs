//! # Core Domain Entities
//!
//! Defines the entities shared between the authentication, KYC and gateway
//! crates.
//!
//! ## Clusters
//!
//! - **Identity**: `WalletAddress`, `PublicKey`
//! - **Credentials**: `CredentialType`, `CredentialStatus`, `Credential`

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A wallet address: the base58 text of a 32-byte Ed25519 public key.
///
/// Construction validates both the alphabet and the decoded length, so any
/// `WalletAddress` in the system can be turned into a verifying key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress {
    text: String,
    key: PublicKey,
}

impl WalletAddress {
    /// Parse and validate a base58 wallet address.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new("walletAddress", "must not be empty"));
        }

        let decoded = bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| ValidationError::new("walletAddress", format!("not base58: {e}")))?;

        let key: PublicKey = decoded.as_slice().try_into().map_err(|_| {
            ValidationError::new(
                "walletAddress",
                format!("expected 32 bytes, got {}", decoded.len()),
            )
        })?;

        Ok(Self {
            text: trimmed.to_string(),
            key,
        })
    }

    /// Build an address from raw public key bytes.
    pub fn from_public_key(key: PublicKey) -> Self {
        Self {
            text: bs58::encode(key).into_string(),
            key,
        }
    }

    /// Base58 text form.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Raw public key bytes.
    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletAddress({})", self.text)
    }
}

impl FromStr for WalletAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.text
    }
}

// =============================================================================
// CLUSTER B: CREDENTIALS
// =============================================================================

/// Kind of verification a credential (or a KYC session) attests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialType {
    /// Identity basics: name, birth date, nationality, email.
    KycBasic,
    /// Basic plus residential address and an identity document.
    KycEnhanced,
    /// Enhanced plus income or net-worth thresholds.
    AccreditedInvestor,
    /// Enhanced plus an investments threshold.
    QualifiedPurchaser,
    /// Legal entity with an authorized signatory.
    Institutional,
    /// Basic plus tax residency and an identity document.
    International,
}

impl CredentialType {
    /// All variants, in declaration order.
    pub const ALL: [CredentialType; 6] = [
        CredentialType::KycBasic,
        CredentialType::KycEnhanced,
        CredentialType::AccreditedInvestor,
        CredentialType::QualifiedPurchaser,
        CredentialType::Institutional,
        CredentialType::International,
    ];

    /// Wire name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialType::KycBasic => "kycBasic",
            CredentialType::KycEnhanced => "kycEnhanced",
            CredentialType::AccreditedInvestor => "accreditedInvestor",
            CredentialType::QualifiedPurchaser => "qualifiedPurchaser",
            CredentialType::Institutional => "institutional",
            CredentialType::International => "international",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CredentialType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::new("credentialType", format!("unknown type {s:?}")))
    }
}

/// Status stored in a ledger credential account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialStatus {
    Active,
    Expired,
    Revoked,
    Suspended,
}

/// A credential account as read from the ledger.
///
/// Never mutated locally; timestamps are unix seconds as stored on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Wallet the credential was issued to.
    pub holder: WalletAddress,
    /// Wallet of the issuing authority.
    pub issuer: WalletAddress,
    /// What the credential attests to.
    pub credential_type: CredentialType,
    /// Stored status.
    pub status: CredentialStatus,
    /// Issue time (unix seconds).
    pub issued_at: i64,
    /// Expiry time (unix seconds).
    pub expires_at: i64,
    /// Off-chain metadata document.
    pub metadata_uri: String,
    /// Set when the issuer revoked the credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_address_roundtrip_from_key() {
        let address = WalletAddress::from_public_key([7u8; 32]);
        let parsed = WalletAddress::parse(address.as_str()).unwrap();

        assert_eq!(parsed, address);
        assert_eq!(parsed.public_key(), &[7u8; 32]);
    }

    #[test]
    fn test_wallet_address_rejects_bad_alphabet() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet
        let err = WalletAddress::parse("0OIl").unwrap_err();
        assert_eq!(err.field, "walletAddress");
    }

    #[test]
    fn test_wallet_address_rejects_wrong_length() {
        let short = bs58::encode([1u8; 20]).into_string();
        let err = WalletAddress::parse(&short).unwrap_err();
        assert!(err.reason.contains("expected 32 bytes"));
    }

    #[test]
    fn test_wallet_address_rejects_empty() {
        assert!(WalletAddress::parse("   ").is_err());
    }

    #[test]
    fn test_wallet_address_serde_as_string() {
        let address = WalletAddress::from_public_key([9u8; 32]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", address));

        let back: WalletAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);

        assert!(serde_json::from_str::<WalletAddress>("\"not-a-wallet\"").is_err());
    }

    #[test]
    fn test_credential_type_wire_names() {
        for t in CredentialType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<CredentialType>().unwrap(), t);
        }
        assert!("kyc_basic".parse::<CredentialType>().is_err());
    }

    #[test]
    fn test_credential_deserializes_camel_case() {
        let holder = WalletAddress::from_public_key([1u8; 32]);
        let issuer = WalletAddress::from_public_key([2u8; 32]);
        let json = serde_json::json!({
            "holder": holder.as_str(),
            "issuer": issuer.as_str(),
            "credentialType": "accreditedInvestor",
            "status": "revoked",
            "issuedAt": 100,
            "expiresAt": 200,
            "metadataUri": "ipfs://meta",
            "revocationReason": "fraud"
        });

        let credential: Credential = serde_json::from_value(json).unwrap();

        assert_eq!(credential.credential_type, CredentialType::AccreditedInvestor);
        assert_eq!(credential.status, CredentialStatus::Revoked);
        assert_eq!(credential.revocation_reason.as_deref(), Some("fraud"));
    }
}
