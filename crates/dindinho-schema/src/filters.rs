//! Cross-field rules for period filters.
//!
//! A query selects its period in exactly one style: a billing month
//! (`invoiceMonth`), a day range (`startDay`/`endDay`) or the legacy datetime
//! range (`startDate`/`endDate`/`from`/`to`).

use crate::fields::{Fields, code};

pub const INVOICE_MONTH_CONFLICT: &str = "Não combine invoiceMonth com filtros de período";
pub const DAY_RANGE_CONFLICT: &str = "Não combine startDay/endDay com filtros de data legados";
pub const RANGE_ORDER: &str = "Data inicial deve ser anterior ou igual à data final";

pub const DAY_RANGE_KEYS: &[&str] = &["startDay", "endDay"];
pub const LEGACY_RANGE_KEYS: &[&str] = &["startDate", "endDate", "from", "to"];

/// Report one issue per key that conflicts with the chosen period style.
pub fn check_period_exclusivity(fields: &mut Fields<'_>) {
    if fields.provided("invoiceMonth") {
        for key in DAY_RANGE_KEYS.iter().chain(LEGACY_RANGE_KEYS) {
            if fields.provided(key) {
                fields.issue(key, INVOICE_MONTH_CONFLICT, code::CUSTOM);
            }
        }
        return;
    }

    if DAY_RANGE_KEYS.iter().any(|key| fields.provided(key)) {
        for key in LEGACY_RANGE_KEYS {
            if fields.provided(key) {
                fields.issue(key, DAY_RANGE_CONFLICT, code::CUSTOM);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issues_for(input: serde_json::Value) -> Vec<(String, String)> {
        let mut fields = Fields::new(&input);
        check_period_exclusivity(&mut fields);
        match fields.finish(()) {
            Ok(()) => vec![],
            Err(failure) => failure
                .issues
                .into_iter()
                .map(|issue| (issue.path, issue.message))
                .collect(),
        }
    }

    #[test]
    fn invoice_month_alone_is_fine() {
        assert!(issues_for(json!({ "invoiceMonth": "2026-01" })).is_empty());
    }

    #[test]
    fn one_issue_per_conflicting_key() {
        let issues = issues_for(json!({
            "invoiceMonth": "2026-01",
            "startDay": "2026-01-01",
            "to": "2026-01-31T00:00:00Z"
        }));
        assert_eq!(
            issues,
            vec![
                ("startDay".to_string(), INVOICE_MONTH_CONFLICT.to_string()),
                ("to".to_string(), INVOICE_MONTH_CONFLICT.to_string()),
            ]
        );
    }

    #[test]
    fn day_range_with_legacy_keys() {
        let issues = issues_for(json!({
            "startDay": "2026-01-01",
            "startDate": "2026-01-01T00:00:00Z",
            "from": "2026-01-01"
        }));
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|(_, message)| message == DAY_RANGE_CONFLICT));
    }

    #[test]
    fn blank_values_do_not_conflict() {
        assert!(issues_for(json!({ "invoiceMonth": "2026-01", "startDay": "", "to": null })).is_empty());
    }
}
