use crate::error::ApiError;
use crate::ledger::dto::{CreateEntryRequest, UpdateEntryRequest};
use crate::store::{Entry, EntryChanges, EntryKind};

/// Create-time input after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntry {
    pub amount: f64,
    pub description: Option<String>,
    pub kind: EntryKind,
    pub recurrence_day: Option<u8>,
}

/// Pure validation of a create request.
///
/// Rules: amount is a finite non-negative number; kind is one of the three
/// entry kinds; a recurrence day lies in [1, 31] and only appears on
/// fixed-expense entries.
pub fn validate_new(req: &CreateEntryRequest) -> Result<ValidEntry, ApiError> {
    let kind: EntryKind = req.kind.parse().map_err(|_| {
        ApiError::validation("type must be one of income, expense, fixed-expense")
    })?;

    if !req.amount.is_finite() || req.amount < 0.0 {
        return Err(ApiError::validation("amount must be a non-negative number"));
    }

    let recurrence_day = match req.recurrence_day {
        None => None,
        Some(day) => {
            if kind != EntryKind::FixedExpense {
                return Err(ApiError::validation(
                    "recurrence_day is only valid for fixed-expense entries",
                ));
            }
            if !(1..=31).contains(&day) {
                return Err(ApiError::validation(
                    "recurrence_day must be between 1 and 31",
                ));
            }
            Some(day as u8)
        }
    };

    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ValidEntry {
        amount: req.amount,
        description,
        kind,
        recurrence_day,
    })
}

/// Merges a partial update onto the current entry and re-runs the
/// create-time rules on the merged result.
pub fn validate_update(
    current: &Entry,
    req: &UpdateEntryRequest,
) -> Result<EntryChanges, ApiError> {
    let merged = CreateEntryRequest {
        amount: req.amount.unwrap_or(current.amount),
        description: req
            .description
            .clone()
            .or_else(|| current.description.clone()),
        kind: req
            .kind
            .clone()
            .unwrap_or_else(|| current.kind.as_str().to_string()),
        recurrence_day: req
            .recurrence_day
            .or_else(|| current.recurrence_day.map(i32::from)),
    };
    let valid = validate_new(&merged)?;
    Ok(EntryChanges {
        amount: valid.amount,
        description: valid.description,
        kind: valid.kind,
        recurrence_day: valid.recurrence_day,
    })
}
