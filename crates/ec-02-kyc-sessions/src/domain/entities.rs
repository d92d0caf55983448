//! # Domain Entities
//!
//! Core data structures for KYC sessions.
//!
//! ## Clusters
//!
//! - **Session**: `SessionId`, `SessionStatus`, `KycSession`, `VerificationResult`
//! - **Personal Data**: `PersonalData`, `ResidentialAddress`
//! - **Credential Lookup**: `CredentialView`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{Credential, CredentialStatus, CredentialType, ValidationError, WalletAddress};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: SESSION
// =============================================================================

/// Unique session identifier (UUID v4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the hyphenated text form.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(text.trim())
            .map(Self)
            .map_err(|e| ValidationError::new("sessionId", e.to_string()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Where a session is in its lifecycle.
///
/// Ordering follows the lifecycle: a session never moves to a lower rank,
/// and `Completed`/`Failed` share the terminal rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, collecting fields.
    Pending,
    /// Submitted, evaluation running.
    InProgress,
    /// Evaluation passed. Final.
    Completed,
    /// Evaluation failed. May be corrected and re-submitted.
    Failed,
}

impl SessionStatus {
    /// Lifecycle rank used to check that transitions only move forward.
    pub fn rank(&self) -> u8 {
        match self {
            SessionStatus::Pending => 0,
            SessionStatus::InProgress => 1,
            SessionStatus::Completed | SessionStatus::Failed => 2,
        }
    }

    /// Whether an evaluation has settled this session.
    pub fn is_terminal(&self) -> bool {
        self.rank() == 2
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating collected fields against a credential type's rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// True iff nothing is missing and every business check passed.
    pub passed: bool,
    /// Human readable failures.
    pub reasons: Vec<String>,
    /// camelCase names of required fields that were absent.
    pub missing_fields: Vec<String>,
    /// When the evaluation ran.
    pub evaluated_at: DateTime<Utc>,
}

/// A KYC session record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycSession {
    pub session_id: SessionId,
    pub wallet_address: WalletAddress,
    pub credential_type: CredentialType,
    pub status: SessionStatus,
    pub collected_fields: PersonalData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_result: Option<VerificationResult>,
}

impl KycSession {
    /// Whether the session is past its TTL at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// =============================================================================
// CLUSTER B: PERSONAL DATA
// =============================================================================

/// Postal address, every part optional while collection is under way.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResidentialAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2 code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ResidentialAddress {
    /// Overlay every present part of `update`.
    pub fn merge(&mut self, update: ResidentialAddress) {
        overlay(&mut self.street, update.street);
        overlay(&mut self.city, update.city);
        overlay(&mut self.region, update.region);
        overlay(&mut self.postal_code, update.postal_code);
        overlay(&mut self.country, update.country);
    }
}

/// Fields collected during a KYC session.
///
/// Partial by nature: the same type carries both the stored record and the
/// patch sent by `PUT /kyc/session/{id}`. Monetary amounts are whole USD.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// ISO 3166-1 alpha-2 code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residential_address: Option<ResidentialAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_document_number: Option<String>,
    /// ISO 3166-1 alpha-2 code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_residency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_income_usd: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_worth_usd: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investments_usd: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
}

impl PersonalData {
    /// Overlay every present field of `update` onto this record.
    ///
    /// Absent fields leave the stored value alone; the address is merged
    /// part by part.
    pub fn merge(&mut self, update: PersonalData) {
        overlay(&mut self.first_name, update.first_name);
        overlay(&mut self.last_name, update.last_name);
        overlay(&mut self.date_of_birth, update.date_of_birth);
        overlay(&mut self.nationality, update.nationality);
        overlay(&mut self.email, update.email);
        overlay(&mut self.phone, update.phone);
        overlay(&mut self.id_document_type, update.id_document_type);
        overlay(&mut self.id_document_number, update.id_document_number);
        overlay(&mut self.tax_residency, update.tax_residency);
        overlay(&mut self.annual_income_usd, update.annual_income_usd);
        overlay(&mut self.net_worth_usd, update.net_worth_usd);
        overlay(&mut self.investments_usd, update.investments_usd);
        overlay(&mut self.entity_name, update.entity_name);
        overlay(
            &mut self.entity_registration_number,
            update.entity_registration_number,
        );
        overlay(&mut self.jurisdiction, update.jurisdiction);

        if let Some(address) = update.residential_address {
            self.residential_address
                .get_or_insert_with(ResidentialAddress::default)
                .merge(address);
        }
    }
}

fn overlay<T>(slot: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *slot = update;
    }
}

// =============================================================================
// CLUSTER C: CREDENTIAL LOOKUP
// =============================================================================

/// A ledger credential together with its derived state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialView {
    pub credential: Credential,
    pub is_valid: bool,
    pub effective_status: CredentialStatus,
}
