//! Transaction payloads and the transaction list query.
//!
//! The `type` discriminant drives the cross-field rules: transfers need a
//! distinct destination account and cannot recur, and only expenses can be
//! split into installments.

use chrono::{DateTime, NaiveDate, Utc};
use dindinho_core::enums::TransactionType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PAGE_LIMIT, TZ_OFFSET_MINUTES, narrow, require_any_field};
use crate::dates::DayRange;
use crate::error::ValidationFailure;
use crate::fields::{Fields, IntRange, Text, code};
use crate::filters::{RANGE_ORDER, check_period_exclusivity};

const DESCRIPTION: Text = Text::new("Descrição", "Descrição é obrigatória", 255);
const NOTES: Text = Text::new("Observação", "Observação inválida", 1000);
const SEARCH: Text = Text::new("Busca", "Busca inválida", 100);
const TYPE_INVALID: &str = "Tipo de transação inválido";
const AMOUNT_REQUIRED: &str = "Valor é obrigatório";
const AMOUNT_POSITIVE: &str = "Valor deve ser maior que zero";
const DATE_REQUIRED: &str = "Data é obrigatória";
const ACCOUNT_REQUIRED: &str = "Conta é obrigatória";
const FREQUENCY_INVALID: &str = "Frequência inválida";

pub const DESTINATION_REQUIRED: &str = "Conta de destino é obrigatória para transferências";
pub const DESTINATION_ONLY_FOR_TRANSFER: &str = "Conta de destino só é permitida em transferências";
pub const DESTINATION_SAME_AS_SOURCE: &str = "Conta de destino deve ser diferente da conta de origem";
pub const INSTALLMENTS_ONLY_FOR_EXPENSE: &str = "Parcelamento só é permitido para despesas";
pub const TRANSFER_CANNOT_RECUR: &str = "Transferências não podem ser recorrentes";

pub const DEFAULT_PAGE_LIMIT: u32 = 50;

const INSTALLMENTS: IntRange = IntRange {
    label: "Parcelas",
    min: 2,
    max: 120,
    message: "Parcelas devem estar entre 2 e 120",
};

const OCCURRENCES: IntRange = IntRange {
    label: "Ocorrências",
    min: 1,
    max: 360,
    message: "Ocorrências devem estar entre 1 e 360",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceFrequency {
    Weekly,
    Monthly,
    Yearly,
}

/// Repeat rule for a recurring bill. `occurrences: None` repeats indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub frequency: RecurrenceFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
}

fn recurrence(f: &mut Fields<'_>, key: &str) -> Option<Recurrence> {
    let value = f.raw(key).filter(|v| !v.is_null())?;
    let prefix = format!("{key}.");
    let mut nested = Fields::nested(value, &prefix);
    let frequency = nested.required_enumeration::<RecurrenceFrequency>("frequency", FREQUENCY_INVALID);
    let occurrences = narrow(nested.optional_int("occurrences", OCCURRENCES));
    f.absorb(nested);
    frequency.map(|frequency| Recurrence {
        frequency,
        occurrences,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransaction {
    pub account_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_installments: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    pub is_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateTransaction {
    /// Parse a create payload and apply the type-dependent rules.
    ///
    /// # Errors
    ///
    /// Returns every field issue found.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);

        let account_id = f.required_id("accountId", ACCOUNT_REQUIRED);
        let transaction_type = f.required_enumeration::<TransactionType>("type", TYPE_INVALID);
        let amount = f.required_positive("amount", "Valor", AMOUNT_REQUIRED, AMOUNT_POSITIVE);
        let description = f.required_text("description", DESCRIPTION);
        let date = f.datetime("date");
        if date.is_none() && !f.has_issue_at("date") {
            f.issue("date", DATE_REQUIRED, code::INVALID_TYPE);
        }
        let category_id = f.optional_id("categoryId");
        let destination_account_id = f.optional_id("destinationAccountId");
        let total_installments = narrow(f.optional_int("totalInstallments", INSTALLMENTS));
        let recurrence = recurrence(&mut f, "recurrence");
        let is_paid = f.boolean("isPaid", "Pago").unwrap_or(true);
        let notes = f.nullable_text("notes", NOTES).flatten();

        if let Some(kind) = transaction_type {
            match (kind, &destination_account_id) {
                (TransactionType::Transfer, None) => {
                    if !f.has_issue_at("destinationAccountId") {
                        f.issue("destinationAccountId", DESTINATION_REQUIRED, code::CUSTOM);
                    }
                }
                (TransactionType::Transfer, Some(destination)) => {
                    if account_id.as_ref() == Some(destination) {
                        f.issue("destinationAccountId", DESTINATION_SAME_AS_SOURCE, code::CUSTOM);
                    }
                }
                (_, Some(_)) => {
                    f.issue("destinationAccountId", DESTINATION_ONLY_FOR_TRANSFER, code::CUSTOM);
                }
                (_, None) => {}
            }
            if kind != TransactionType::Expense && f.provided("totalInstallments") {
                f.issue("totalInstallments", INSTALLMENTS_ONLY_FOR_EXPENSE, code::CUSTOM);
            }
            if kind == TransactionType::Transfer && f.provided("recurrence") {
                f.issue("recurrence", TRANSFER_CANNOT_RECUR, code::CUSTOM);
            }
        }

        let value = match (account_id, transaction_type, amount, description, date) {
            (Some(account_id), Some(transaction_type), Some(amount), Some(description), Some(date)) => {
                Some(Self {
                    account_id,
                    transaction_type,
                    amount,
                    description,
                    date,
                    category_id,
                    destination_account_id,
                    total_installments,
                    recurrence,
                    is_paid,
                    notes,
                })
            }
            _ => None,
        };
        f.finish_some(value)
    }
}

/// Partial transaction update. The `type` and accounts of an existing
/// transaction are fixed; move it by deleting and recreating.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl UpdateTransaction {
    /// Parse a partial update.
    ///
    /// # Errors
    ///
    /// Field issues, or [`super::AT_LEAST_ONE_FIELD`] when nothing was sent.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);

        let amount = match f.number("amount", "Valor") {
            Some(Some(n)) if n > 0.0 => Some(n),
            Some(_) => {
                if !f.has_issue_at("amount") {
                    f.issue("amount", AMOUNT_POSITIVE, code::TOO_SMALL);
                }
                None
            }
            None => None,
        };
        let update = Self {
            amount,
            description: f.optional_text("description", DESCRIPTION),
            date: f.datetime("date"),
            category_id: f.nullable_id("categoryId"),
            is_paid: f.boolean("isPaid", "Pago"),
            notes: f.nullable_text("notes", NOTES),
        };

        require_any_field(&mut f, update == Self::default());
        f.finish(update)
    }
}

/// Query string of `GET /transactions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tz_offset_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl ListTransactionsQuery {
    /// Parse query parameters. Numeric values usually arrive as strings.
    ///
    /// # Errors
    ///
    /// Field issues and period-style conflicts.
    pub fn parse(input: &Value) -> Result<Self, ValidationFailure> {
        let mut f = Fields::new(input);

        let query = Self {
            account_id: f.optional_id("accountId"),
            transaction_type: f.enumeration("type", TYPE_INVALID),
            q: f.nullable_text("q", SEARCH).flatten(),
            invoice_month: f.month("invoiceMonth"),
            start_day: f.day("startDay"),
            end_day: f.day("endDay"),
            start_date: f.datetime("startDate"),
            end_date: f.datetime("endDate"),
            from: f.datetime("from"),
            to: f.datetime("to"),
            tz_offset_minutes: narrow(f.optional_int("tzOffsetMinutes", TZ_OFFSET_MINUTES)),
            limit: narrow(f.optional_int("limit", PAGE_LIMIT)),
            cursor: f.optional_id("cursor"),
        };

        check_period_exclusivity(&mut f);
        if let (Some(start), Some(end)) = (query.start_day, query.end_day)
            && start > end
        {
            f.issue("endDay", RANGE_ORDER, code::CUSTOM);
        }
        f.finish(query)
    }

    #[must_use]
    pub fn page_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    /// Day range when both ends are set.
    #[must_use]
    pub fn day_range(&self) -> Option<DayRange> {
        Some(DayRange {
            start_day: self.start_day?,
            end_day: self.end_day?,
        })
    }
}
