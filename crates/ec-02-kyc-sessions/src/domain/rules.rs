//! # Completeness Rules
//!
//! Decides whether the fields collected in a session are enough for the
//! requested credential type.
//!
//! ## Required Fields
//!
//! | Type                 | Requires                                                        |
//! |----------------------|-----------------------------------------------------------------|
//! | `kycBasic`           | firstName, lastName, dateOfBirth, nationality, email            |
//! | `kycEnhanced`        | basic + residential address + identity document                 |
//! | `accreditedInvestor` | enhanced + income ≥ $200k or net worth ≥ $1M                    |
//! | `qualifiedPurchaser` | enhanced + investments ≥ $5M                                    |
//! | `institutional`      | entity name, registration number, jurisdiction, email, signatory |
//! | `international`      | basic + tax residency + identity document                       |
//!
//! Business checks run on every present field, required or not.

use super::entities::{PersonalData, VerificationResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use shared_types::CredentialType;

/// Minimum holder age in years.
pub const MINIMUM_AGE_YEARS: i32 = 18;

/// Accredited investor income threshold (USD).
pub const ACCREDITED_MIN_INCOME_USD: u64 = 200_000;

/// Accredited investor net worth threshold (USD).
pub const ACCREDITED_MIN_NET_WORTH_USD: u64 = 1_000_000;

/// Qualified purchaser investments threshold (USD).
pub const QUALIFIED_MIN_INVESTMENTS_USD: u64 = 5_000_000;

const BASIC_FIELDS: &[&str] = &["firstName", "lastName", "dateOfBirth", "nationality", "email"];

const ADDRESS_FIELDS: &[&str] = &[
    "residentialAddress.street",
    "residentialAddress.city",
    "residentialAddress.postalCode",
    "residentialAddress.country",
];

const DOCUMENT_FIELDS: &[&str] = &["idDocumentType", "idDocumentNumber"];

const INSTITUTIONAL_FIELDS: &[&str] = &[
    "entityName",
    "entityRegistrationNumber",
    "jurisdiction",
    "email",
    "firstName",
    "lastName",
];

/// Required field names for a credential type, in reporting order.
pub fn required_fields(credential_type: CredentialType) -> Vec<&'static str> {
    let mut fields = Vec::new();
    match credential_type {
        CredentialType::KycBasic => fields.extend_from_slice(BASIC_FIELDS),
        CredentialType::KycEnhanced | CredentialType::AccreditedInvestor => {
            fields.extend_from_slice(BASIC_FIELDS);
            fields.extend_from_slice(ADDRESS_FIELDS);
            fields.extend_from_slice(DOCUMENT_FIELDS);
        }
        CredentialType::QualifiedPurchaser => {
            fields.extend_from_slice(BASIC_FIELDS);
            fields.extend_from_slice(ADDRESS_FIELDS);
            fields.extend_from_slice(DOCUMENT_FIELDS);
            fields.push("investmentsUsd");
        }
        CredentialType::Institutional => fields.extend_from_slice(INSTITUTIONAL_FIELDS),
        CredentialType::International => {
            fields.extend_from_slice(BASIC_FIELDS);
            fields.push("taxResidency");
            fields.extend_from_slice(DOCUMENT_FIELDS);
        }
    }
    fields
}

/// Evaluate `data` against the rules for `credential_type` at time `now`.
pub fn evaluate(
    credential_type: CredentialType,
    data: &PersonalData,
    now: DateTime<Utc>,
) -> VerificationResult {
    let mut reasons = Vec::new();

    let missing_fields: Vec<String> = required_fields(credential_type)
        .into_iter()
        .filter(|field| !is_present(data, field))
        .map(str::to_string)
        .collect();
    if !missing_fields.is_empty() {
        reasons.push(format!(
            "Missing required fields: {}",
            missing_fields.join(", ")
        ));
    }

    match credential_type {
        CredentialType::AccreditedInvestor => {
            let income_ok = data
                .annual_income_usd
                .is_some_and(|v| v >= ACCREDITED_MIN_INCOME_USD);
            let net_worth_ok = data
                .net_worth_usd
                .is_some_and(|v| v >= ACCREDITED_MIN_NET_WORTH_USD);
            if !income_ok && !net_worth_ok {
                reasons.push(format!(
                    "Accredited investors need annual income of at least ${ACCREDITED_MIN_INCOME_USD} \
                     or net worth of at least ${ACCREDITED_MIN_NET_WORTH_USD}"
                ));
            }
        }
        CredentialType::QualifiedPurchaser => {
            // Absence is already reported through missing_fields
            if data
                .investments_usd
                .is_some_and(|v| v < QUALIFIED_MIN_INVESTMENTS_USD)
            {
                reasons.push(format!(
                    "Qualified purchasers need investments of at least ${QUALIFIED_MIN_INVESTMENTS_USD}"
                ));
            }
        }
        _ => {}
    }

    check_business_rules(data, now.date_naive(), &mut reasons);

    VerificationResult {
        passed: reasons.is_empty(),
        reasons,
        missing_fields,
        evaluated_at: now,
    }
}

fn check_business_rules(data: &PersonalData, today: NaiveDate, reasons: &mut Vec<String>) {
    if let Some(dob) = non_blank(&data.date_of_birth) {
        match NaiveDate::parse_from_str(dob, "%Y-%m-%d") {
            Ok(birth) if birth > today => {
                reasons.push("dateOfBirth is in the future".to_string());
            }
            Ok(birth) if age_on(birth, today) < MINIMUM_AGE_YEARS => {
                reasons.push(format!(
                    "Holder must be at least {MINIMUM_AGE_YEARS} years old"
                ));
            }
            Ok(_) => {}
            Err(_) => reasons.push("dateOfBirth must be formatted YYYY-MM-DD".to_string()),
        }
    }

    if let Some(email) = non_blank(&data.email) {
        if !is_plausible_email(email) {
            reasons.push("email is not a valid address".to_string());
        }
    }

    let address_country = data
        .residential_address
        .as_ref()
        .and_then(|a| non_blank(&a.country));
    let country_fields = [
        ("nationality", non_blank(&data.nationality)),
        ("taxResidency", non_blank(&data.tax_residency)),
        ("residentialAddress.country", address_country),
    ];
    for (field, value) in country_fields {
        if let Some(code) = value {
            if !is_country_code(code) {
                reasons.push(format!(
                    "{field} must be a two-letter uppercase country code"
                ));
            }
        }
    }
}

/// Whole years between `birth` and `today`.
fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
    )
}

fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn is_present(data: &PersonalData, field: &str) -> bool {
    let address = data.residential_address.as_ref();
    match field {
        "firstName" => non_blank(&data.first_name).is_some(),
        "lastName" => non_blank(&data.last_name).is_some(),
        "dateOfBirth" => non_blank(&data.date_of_birth).is_some(),
        "nationality" => non_blank(&data.nationality).is_some(),
        "email" => non_blank(&data.email).is_some(),
        "phone" => non_blank(&data.phone).is_some(),
        "idDocumentType" => non_blank(&data.id_document_type).is_some(),
        "idDocumentNumber" => non_blank(&data.id_document_number).is_some(),
        "taxResidency" => non_blank(&data.tax_residency).is_some(),
        "entityName" => non_blank(&data.entity_name).is_some(),
        "entityRegistrationNumber" => non_blank(&data.entity_registration_number).is_some(),
        "jurisdiction" => non_blank(&data.jurisdiction).is_some(),
        "annualIncomeUsd" => data.annual_income_usd.is_some(),
        "netWorthUsd" => data.net_worth_usd.is_some(),
        "investmentsUsd" => data.investments_usd.is_some(),
        "residentialAddress.street" => address.is_some_and(|a| non_blank(&a.street).is_some()),
        "residentialAddress.city" => address.is_some_and(|a| non_blank(&a.city).is_some()),
        "residentialAddress.postalCode" => {
            address.is_some_and(|a| non_blank(&a.postal_code).is_some())
        }
        "residentialAddress.country" => address.is_some_and(|a| non_blank(&a.country).is_some()),
        _ => false,
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::{basic_data, enhanced_data};
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_760_000_000, 0).unwrap()
    }

    #[test]
    fn test_empty_basic_reports_every_missing_field() {
        let result = evaluate(CredentialType::KycBasic, &PersonalData::default(), now());

        assert!(!result.passed);
        assert_eq!(result.missing_fields, BASIC_FIELDS.to_vec());
        assert_eq!(result.reasons.len(), 1);
        assert!(result.reasons[0].starts_with("Missing required fields"));
    }

    #[test]
    fn test_complete_basic_passes() {
        let result = evaluate(CredentialType::KycBasic, &basic_data(), now());

        assert!(result.passed, "unexpected reasons: {:?}", result.reasons);
        assert!(result.missing_fields.is_empty());
        assert_eq!(result.evaluated_at, now());
    }

    #[test]
    fn test_blank_strings_count_as_missing() {
        let data = PersonalData {
            email: Some("   ".into()),
            ..basic_data()
        };

        let result = evaluate(CredentialType::KycBasic, &data, now());

        assert_eq!(result.missing_fields, vec!["email".to_string()]);
    }

    #[test]
    fn test_enhanced_needs_address_and_document() {
        let result = evaluate(CredentialType::KycEnhanced, &basic_data(), now());
        assert!(!result.passed);
        assert!(result
            .missing_fields
            .contains(&"residentialAddress.postalCode".to_string()));
        assert!(result.missing_fields.contains(&"idDocumentNumber".to_string()));

        assert!(evaluate(CredentialType::KycEnhanced, &enhanced_data(), now()).passed);
    }

    #[test]
    fn test_accredited_income_or_net_worth() {
        let poor = evaluate(CredentialType::AccreditedInvestor, &enhanced_data(), now());
        assert!(!poor.passed);
        assert!(poor.missing_fields.is_empty());

        let by_income = PersonalData {
            annual_income_usd: Some(ACCREDITED_MIN_INCOME_USD),
            ..enhanced_data()
        };
        assert!(evaluate(CredentialType::AccreditedInvestor, &by_income, now()).passed);

        let by_net_worth = PersonalData {
            annual_income_usd: Some(50_000),
            net_worth_usd: Some(2_000_000),
            ..enhanced_data()
        };
        assert!(evaluate(CredentialType::AccreditedInvestor, &by_net_worth, now()).passed);
    }

    #[test]
    fn test_qualified_purchaser_threshold() {
        let below = PersonalData {
            investments_usd: Some(QUALIFIED_MIN_INVESTMENTS_USD - 1),
            ..enhanced_data()
        };
        assert!(!evaluate(CredentialType::QualifiedPurchaser, &below, now()).passed);

        let at = PersonalData {
            investments_usd: Some(QUALIFIED_MIN_INVESTMENTS_USD),
            ..enhanced_data()
        };
        assert!(evaluate(CredentialType::QualifiedPurchaser, &at, now()).passed);
    }

    #[test]
    fn test_qualified_purchaser_missing_investments_is_missing_field() {
        let result = evaluate(CredentialType::QualifiedPurchaser, &enhanced_data(), now());

        assert!(!result.passed);
        assert_eq!(result.missing_fields, vec!["investmentsUsd".to_string()]);
        assert_eq!(
            result.reasons,
            vec!["Missing required fields: investmentsUsd".to_string()]
        );
    }

    #[test]
    fn test_institutional_fields() {
        let data = PersonalData {
            entity_name: Some("Acme Holdings LLC".into()),
            entity_registration_number: Some("DE-1234567".into()),
            jurisdiction: Some("US-DE".into()),
            email: Some("legal@acme.example".into()),
            first_name: Some("Wile".into()),
            last_name: Some("Coyote".into()),
            ..Default::default()
        };

        let result = evaluate(CredentialType::Institutional, &data, now());
        assert!(result.passed, "unexpected reasons: {:?}", result.reasons);
    }

    #[test]
    fn test_international_needs_tax_residency() {
        let data = PersonalData {
            id_document_type: Some("passport".into()),
            id_document_number: Some("X1".into()),
            ..basic_data()
        };
        let result = evaluate(CredentialType::International, &data, now());
        assert_eq!(result.missing_fields, vec!["taxResidency".to_string()]);

        let complete = PersonalData {
            tax_residency: Some("SG".into()),
            ..data
        };
        assert!(evaluate(CredentialType::International, &complete, now()).passed);
    }

    #[test]
    fn test_underage_holder_fails() {
        let today = now().date_naive();
        let seventeen = today
            .with_year(today.year() - MINIMUM_AGE_YEARS + 1)
            .unwrap_or(today);
        let data = PersonalData {
            date_of_birth: Some(seventeen.format("%Y-%m-%d").to_string()),
            ..basic_data()
        };

        let result = evaluate(CredentialType::KycBasic, &data, now());

        assert!(!result.passed);
        assert!(result.reasons.iter().any(|r| r.contains("at least 18")));
    }

    #[test]
    fn test_age_boundary() {
        let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2018, 6, 14).unwrap()), 17);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2018, 6, 15).unwrap()), 18);
    }

    #[test]
    fn test_bad_date_format() {
        let data = PersonalData {
            date_of_birth: Some("10/12/1990".into()),
            ..basic_data()
        };
        let result = evaluate(CredentialType::KycBasic, &data, now());
        assert!(result.reasons.iter().any(|r| r.contains("YYYY-MM-DD")));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_plausible_email("a@b"));
        assert!(!is_plausible_email("ab"));
        assert!(!is_plausible_email("@b"));
        assert!(!is_plausible_email("a@"));
        assert!(!is_plausible_email("a@b@c"));
    }

    #[test]
    fn test_country_codes_checked_when_present() {
        let data = PersonalData {
            nationality: Some("gb".into()),
            tax_residency: Some("USA".into()),
            ..basic_data()
        };

        let result = evaluate(CredentialType::KycBasic, &data, now());

        assert!(result.reasons.iter().any(|r| r.starts_with("nationality")));
        assert!(result.reasons.iter().any(|r| r.starts_with("taxResidency")));
    }
}
