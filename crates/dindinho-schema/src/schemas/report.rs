//! Report filters and period presets.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{TZ_OFFSET_MINUTES, narrow};
use crate::dates::{DayRange, first_of_month, last_of_month};
use crate::error::ValidationFailure;
use crate::fields::{Fields, code};
use crate::filters::{RANGE_ORDER, check_period_exclusivity};

pub const START_DAY_REQUIRED: &str = "Data inicial é obrigatória no preset CUSTOM";
pub const END_DAY_REQUIRED: &str = "Data final é obrigatória no preset CUSTOM";
pub const DAYS_ONLY_FOR_CUSTOM: &str = "Datas só podem ser informadas no preset CUSTOM";
const PRESET_INVALID: &str = "Período inválido";

/// Filters shared by every report endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_day: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_day: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    /// Restrict to these accounts; `accountIds=a,b` and JSON arrays both work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_pending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz_offset_minutes: Option<i32>,
}

impl ReportFilter {
    /// # Errors
    ///
    /// Field issues, period-style conflicts, or an inverted day range.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);

        let filter = Self {
            invoice_month: f.month("invoiceMonth"),
            start_day: f.day("startDay"),
            end_day: f.day("endDay"),
            start_date: f.datetime("startDate"),
            end_date: f.datetime("endDate"),
            from: f.datetime("from"),
            to: f.datetime("to"),
            account_ids: f.string_list("accountIds", "Contas"),
            include_pending: f.boolean("includePending", "Incluir pendentes"),
            tz_offset_minutes: narrow(f.optional_int("tzOffsetMinutes", TZ_OFFSET_MINUTES)),
        };

        check_period_exclusivity(&mut f);
        if let (Some(start), Some(end)) = (filter.start_day, filter.end_day)
            && start > end
        {
            f.issue("endDay", RANGE_ORDER, code::CUSTOM);
        }
        f.finish(filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodPreset {
    ThisMonth,
    LastMonth,
    #[serde(rename = "LAST_30_DAYS")]
    Last30Days,
    ThisYear,
    Custom,
}

/// A dashboard period: a preset, or explicit days for `CUSTOM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSelection {
    pub preset: PeriodPreset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_day: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_day: Option<NaiveDate>,
}

impl PeriodSelection {
    /// `startDay` and `endDay` are required with `CUSTOM` and rejected otherwise.
    ///
    /// # Errors
    ///
    /// Returns every field issue found.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);
        let preset = f.required_enumeration::<PeriodPreset>("preset", PRESET_INVALID);
        let start_day = f.day("startDay");
        let end_day = f.day("endDay");

        match preset {
            Some(PeriodPreset::Custom) => {
                if start_day.is_none() && !f.has_issue_at("startDay") {
                    f.issue("startDay", START_DAY_REQUIRED, code::CUSTOM);
                }
                if end_day.is_none() && !f.has_issue_at("endDay") {
                    f.issue("endDay", END_DAY_REQUIRED, code::CUSTOM);
                }
                if let (Some(start), Some(end)) = (start_day, end_day)
                    && start > end
                {
                    f.issue("endDay", RANGE_ORDER, code::CUSTOM);
                }
            }
            Some(_) => {
                for key in ["startDay", "endDay"] {
                    if f.provided(key) && !f.has_issue_at(key) {
                        f.issue(key, DAYS_ONLY_FOR_CUSTOM, code::CUSTOM);
                    }
                }
            }
            None => {}
        }

        f.finish_some(preset.map(|preset| Self {
            preset,
            start_day,
            end_day,
        }))
    }

    /// Inclusive day range this selection covers, relative to `today`.
    #[must_use]
    pub fn resolve(&self, today: NaiveDate) -> DayRange {
        let (start_day, end_day) = match self.preset {
            PeriodPreset::ThisMonth => (first_of_month(today), last_of_month(today)),
            PeriodPreset::LastMonth => {
                let previous = first_of_month(today).pred_opt().unwrap_or(today);
                (first_of_month(previous), last_of_month(previous))
            }
            PeriodPreset::Last30Days => (today - Duration::days(29), today),
            PeriodPreset::ThisYear => (
                today.with_ordinal(1).unwrap_or(today),
                NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
            ),
            PeriodPreset::Custom => (
                self.start_day.unwrap_or(today),
                self.end_day.unwrap_or(today),
            ),
        };
        DayRange { start_day, end_day }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::INVOICE_MONTH_CONFLICT;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn invoice_month_conflicts_with_days() {
        let failure = ReportFilter::parse(&json!({
            "invoiceMonth": "2026-01",
            "startDay": "2026-01-01"
        }))
        .unwrap_err();
        assert_eq!(failure.to_string(), INVOICE_MONTH_CONFLICT);
        assert_eq!(failure.issues[0].path, "startDay");
    }

    #[test]
    fn invoice_month_must_be_real() {
        let failure = ReportFilter::parse(&json!({ "invoiceMonth": "2026-13" })).unwrap_err();
        assert_eq!(failure.to_string(), "Mês inválido");
    }

    #[test]
    fn filter_reads_query_forms() {
        let filter = ReportFilter::parse(&json!({
            "startDay": "2026-01-01",
            "endDay": "2026-01-31",
            "accountIds": "acc-1,acc-2",
            "includePending": "true",
            "tzOffsetMinutes": "-180"
        }))
        .unwrap();
        assert_eq!(filter.account_ids, Some(vec!["acc-1".to_string(), "acc-2".to_string()]));
        assert_eq!(filter.include_pending, Some(true));
        assert_eq!(filter.tz_offset_minutes, Some(-180));
    }

    #[test]
    fn filter_rejects_impossible_day() {
        let failure = ReportFilter::parse(&json!({ "startDay": "2024-02-31" })).unwrap_err();
        assert_eq!(failure.messages_at("startDay"), vec!["Data inválida"]);
    }

    #[test]
    fn custom_requires_start_day() {
        let failure = PeriodSelection::parse(&json!({ "preset": "CUSTOM", "endDay": "2026-01-02" })).unwrap_err();
        assert_eq!(failure.to_string(), START_DAY_REQUIRED);
    }

    #[test]
    fn custom_requires_end_day() {
        let failure = PeriodSelection::parse(&json!({ "preset": "CUSTOM", "startDay": "2026-01-02" })).unwrap_err();
        assert_eq!(failure.to_string(), END_DAY_REQUIRED);
    }

    #[test]
    fn days_rejected_outside_custom() {
        let failure = PeriodSelection::parse(&json!({ "preset": "THIS_MONTH", "startDay": "2026-01-02" })).unwrap_err();
        assert_eq!(failure.messages_at("startDay"), vec![DAYS_ONLY_FOR_CUSTOM]);
    }

    #[rstest]
    #[case("THIS_MONTH", "2024-02-01", "2024-02-29")]
    #[case("LAST_MONTH", "2024-01-01", "2024-01-31")]
    #[case("LAST_30_DAYS", "2024-01-17", "2024-02-15")]
    #[case("THIS_YEAR", "2024-01-01", "2024-12-31")]
    fn presets_resolve(#[case] preset: &str, #[case] start: &str, #[case] end: &str) {
        let selection = PeriodSelection::parse(&json!({ "preset": preset })).unwrap();
        let range = selection.resolve(day("2024-02-15"));
        assert_eq!(range, DayRange { start_day: day(start), end_day: day(end) });
    }

    #[test]
    fn last_month_wraps_year() {
        let selection = PeriodSelection::parse(&json!({ "preset": "LAST_MONTH" })).unwrap();
        let range = selection.resolve(day("2026-01-10"));
        assert_eq!(range.start_day, day("2025-12-01"));
        assert_eq!(range.end_day, day("2025-12-31"));
    }

    #[test]
    fn custom_resolves_to_its_days() {
        let selection = PeriodSelection::parse(&json!({
            "preset": "CUSTOM",
            "startDay": "2026-01-01",
            "endDay": "2026-01-02"
        }))
        .unwrap();
        assert!(selection.resolve(day("2030-01-01")).contains(day("2026-01-02")));
    }
}
