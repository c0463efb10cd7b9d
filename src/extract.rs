//! Candidate extraction
//!
//! Filters raw registry records down to usable candidates: an 11 digit ABN
//! whose status is `Active`. Everything else is dropped silently.

use regex::Regex;
use std::sync::LazyLock;

use crate::registry::RawRegistryRecord;
use crate::types::Candidate;

/// ABN pattern (11 digits)
static ABN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{11}$").unwrap());

/// Status value of a usable ABN
const ACTIVE_STATUS: &str = "Active";

/// Turn raw records into candidates, preserving register order
pub fn extract(records: &[RawRegistryRecord]) -> Vec<Candidate> {
    records.iter().filter_map(to_candidate).collect()
}

/// Whether `identifier` is a well-formed ABN (after trimming)
pub fn is_valid_abn(identifier: &str) -> bool {
    ABN_RE.is_match(identifier.trim())
}

fn to_candidate(record: &RawRegistryRecord) -> Option<Candidate> {
    let identifier = record.identifier_value.trim();
    if !is_valid_abn(identifier) || record.identifier_status.trim() != ACTIVE_STATUS {
        return None;
    }

    let legal_name = [
        &record.business_name,
        &record.main_name,
        &record.main_trading_name,
    ]
    .into_iter()
    .map(|field| field.organisation_name.trim())
    .find(|name| !name.is_empty())
    .unwrap_or_default();

    // First non-blank score wins even if it does not parse; the ranker then
    // falls back to its default registry score
    let score_text = [&record.business_name, &record.main_trading_name]
        .into_iter()
        .filter_map(|field| field.score.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty());

    Some(Candidate {
        identifier: identifier.to_string(),
        jurisdiction: record.state_code.trim().to_string(),
        legal_name: legal_name.to_string(),
        match_score: score_text.and_then(parse_score),
        match_score_text: score_text.map(str::to_string),
    })
}

fn parse_score(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|s| s.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NameField;
    use proptest::prelude::*;

    fn name(organisation_name: &str, score: Option<&str>) -> NameField {
        NameField {
            organisation_name: organisation_name.to_string(),
            score: score.map(str::to_string),
        }
    }

    fn record(abn: &str, status: &str) -> RawRegistryRecord {
        RawRegistryRecord {
            identifier_value: abn.to_string(),
            identifier_status: status.to_string(),
            state_code: "NSW".to_string(),
            business_name: name("Apple Pty Ltd", Some("95")),
            ..Default::default()
        }
    }

    #[test]
    fn test_active_record_becomes_candidate() {
        let candidates = extract(&[record(" 50169260144 ", " Active ")]);
        assert_eq!(
            candidates,
            vec![Candidate {
                identifier: "50169260144".to_string(),
                jurisdiction: "NSW".to_string(),
                legal_name: "Apple Pty Ltd".to_string(),
                match_score: Some(95.0),
                match_score_text: Some("95".to_string()),
            }]
        );
    }

    #[test]
    fn test_rejects_inactive_and_malformed() {
        let records = vec![
            record("50169260144", "Cancelled"),
            record("5016926014", "Active"),
            record("501692601445", "Active"),
            record("5016926014X", "Active"),
            record("50169260144", "active"),
        ];
        assert!(extract(&records).is_empty());
    }

    #[test]
    fn test_legal_name_priority() {
        let mut rec = record("50169260144", "Active");
        rec.business_name = name("  ", Some("80"));
        rec.main_name = name("Main Name Pty Ltd", None);
        rec.main_trading_name = name("Trading Name", Some("70"));
        let candidate = &extract(&[rec.clone()])[0];
        assert_eq!(candidate.legal_name, "Main Name Pty Ltd");
        // businessName score still wins even though its name was blank
        assert_eq!(candidate.match_score, Some(80.0));

        rec.main_name = NameField::default();
        let candidate = &extract(&[rec])[0];
        assert_eq!(candidate.legal_name, "Trading Name");
    }

    #[test]
    fn test_score_falls_back_to_trading_name() {
        let mut rec = record("50169260144", "Active");
        rec.business_name = name("Apple Pty Ltd", None);
        rec.main_trading_name = name("Apple", Some(" 88 "));
        assert_eq!(extract(&[rec.clone()])[0].match_score, Some(88.0));

        rec.main_trading_name.score = None;
        assert_eq!(extract(&[rec])[0].match_score, None);
    }

    #[test]
    fn test_score_text_kept_verbatim() {
        let mut rec = record("50169260144", "Active");
        rec.business_name.score = Some(" 095 ".to_string());
        let candidate = &extract(&[rec.clone()])[0];
        assert_eq!(candidate.match_score, Some(95.0));
        assert_eq!(candidate.match_score_text.as_deref(), Some("095"));

        rec.business_name.score = Some("95.50".to_string());
        let candidate = &extract(&[rec.clone()])[0];
        assert_eq!(candidate.match_score, Some(95.5));
        assert_eq!(candidate.match_score_text.as_deref(), Some("95.50"));

        // An unparseable business score still shadows the trading name score
        rec.business_name.score = Some("n/a".to_string());
        rec.main_trading_name.score = Some("88".to_string());
        let candidate = &extract(&[rec])[0];
        assert_eq!(candidate.match_score, None);
        assert_eq!(candidate.match_score_text.as_deref(), Some("n/a"));
    }

    #[test]
    fn test_preserves_input_order() {
        let mut second = record("11111111111", "Active");
        second.business_name = name("Second Pty Ltd", None);
        let candidates = extract(&[record("50169260144", "Active"), second]);
        let ids: Vec<_> = candidates.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["50169260144", "11111111111"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_candidates_always_valid(
            abn in "[0-9 ]{0,13}|[0-9A-Z]{11}",
            status in prop_oneof![Just("Active"), Just(" Active"), Just("Cancelled"), Just("")],
        ) {
            for candidate in extract(&[record(&abn, status)]) {
                prop_assert!(is_valid_abn(&candidate.identifier));
                prop_assert_eq!(candidate.identifier.len(), 11);
                prop_assert_eq!(status.trim(), "Active");
            }
        }
    }
}
