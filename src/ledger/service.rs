use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, OffsetDateTime};

use crate::error::ApiError;
use crate::store::{Entry, EntryKind};

/// Signed-sum aggregation over a set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Sums income and expense sides over `entries` and derives the balance.
/// Non-finite amounts contribute nothing instead of poisoning the sums.
pub fn summarize(entries: &[Entry]) -> BalanceSummary {
    let mut income = 0.0;
    let mut expense = 0.0;
    for entry in entries {
        if !entry.amount.is_finite() {
            continue;
        }
        if entry.kind.is_expense() {
            expense += entry.amount;
        } else {
            income += entry.amount;
        }
    }
    BalanceSummary {
        income,
        expense,
        balance: income - expense,
    }
}

/// Validates raw calendar parts into a `Date`. Rejects out-of-range months
/// and days that do not exist in the given month (e.g. Feb 30).
pub fn calendar_date(year: i32, month: i32, day: i32) -> Result<Date, ApiError> {
    if year < 2000 {
        return Err(ApiError::validation("year must be 2000 or later"));
    }
    let month = parse_month(month)?;
    let day = u8::try_from(day)
        .map_err(|_| ApiError::validation("day must be between 1 and 31"))?;
    Date::from_calendar_date(year, month, day)
        .map_err(|_| ApiError::validation("no such calendar day"))
}

/// Inclusive UTC window covering one whole month:
/// `[YYYY-MM-01T00:00:00Z, last-dayT23:59:59.999Z]`.
pub fn month_window(year: i32, month: i32) -> Result<(OffsetDateTime, OffsetDateTime), ApiError> {
    if year < 2000 {
        return Err(ApiError::validation("year must be 2000 or later"));
    }
    let month = parse_month(month)?;
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|_| ApiError::validation("invalid month"))?;
    let next_first = match month {
        Month::December => Date::from_calendar_date(year + 1, Month::January, 1),
        m => Date::from_calendar_date(year, m.next(), 1),
    }
    .map_err(|_| ApiError::validation("invalid month"))?;
    let start = first.midnight().assume_utc();
    let end = next_first.midnight().assume_utc() - Duration::milliseconds(1);
    Ok((start, end))
}

/// Inclusive UTC window covering one calendar day.
pub fn day_bounds(date: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = date.midnight().assume_utc();
    (start, start + Duration::days(1) - Duration::milliseconds(1))
}

/// Day-query filter: plain entries pass through, fixed-expense entries are
/// additionally required to recur on the queried day.
pub fn day_view(entries: Vec<Entry>, day: u8) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|e| e.kind != EntryKind::FixedExpense || e.recurrence_day == Some(day))
        .collect()
}

fn parse_month(month: i32) -> Result<Month, ApiError> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| ApiError::validation("month must be between 1 and 12"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    fn entry(kind: EntryKind, amount: f64) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            owner: Uuid::new_v4(),
            amount,
            description: None,
            kind,
            recurrence_day: None,
            source_entry: None,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn summarize_signs_by_kind() {
        let entries = vec![
            entry(EntryKind::Income, 100.0),
            entry(EntryKind::Expense, 40.0),
            entry(EntryKind::FixedExpense, 10.0),
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.income, 100.0);
        assert_eq!(summary.expense, 50.0);
        assert_eq!(summary.balance, 50.0);
    }

    #[test]
    fn one_income_entry_moves_balance_by_exactly_its_amount() {
        let mut entries = vec![entry(EntryKind::Income, 100.0), entry(EntryKind::Expense, 40.0)];
        let before = summarize(&entries).balance;
        entries.push(entry(EntryKind::Income, 25.0));
        assert_eq!(summarize(&entries).balance, before + 25.0);
        entries.push(entry(EntryKind::Expense, 5.0));
        assert_eq!(summarize(&entries).balance, before + 25.0 - 5.0);
    }

    #[test]
    fn summarize_skips_non_finite_amounts() {
        let entries = vec![
            entry(EntryKind::Income, 100.0),
            entry(EntryKind::Income, f64::NAN),
            entry(EntryKind::Expense, f64::INFINITY),
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.income, 100.0);
        assert_eq!(summary.expense, 0.0);
        assert_eq!(summary.balance, 100.0);
    }

    #[test]
    fn empty_set_sums_to_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.income, 0.0);
        assert_eq!(summary.expense, 0.0);
        assert_eq!(summary.balance, 0.0);
    }

    #[test]
    fn month_window_is_boundary_inclusive() {
        let (start, end) = month_window(2026, 3).expect("valid month");
        assert_eq!(start, datetime!(2026-03-01 00:00:00 UTC));
        assert_eq!(end, datetime!(2026-03-31 23:59:59.999 UTC));
        // The first instant of the month is inside; the first instant of the
        // next month is not.
        let at_start = datetime!(2026-03-01 00:00:00 UTC);
        let next_month = datetime!(2026-04-01 00:00:00 UTC);
        assert!(at_start >= start && at_start <= end);
        assert!(!(next_month >= start && next_month <= end));
    }

    #[test]
    fn month_window_handles_december_and_leap_february() {
        let (_, end) = month_window(2025, 12).expect("valid month");
        assert_eq!(end, datetime!(2025-12-31 23:59:59.999 UTC));
        let (_, end) = month_window(2024, 2).expect("valid month");
        assert_eq!(end, datetime!(2024-02-29 23:59:59.999 UTC));
    }

    #[test]
    fn month_window_rejects_bad_parts() {
        assert!(month_window(2026, 0).is_err());
        assert!(month_window(2026, 13).is_err());
        assert!(month_window(1999, 5).is_err());
    }

    #[test]
    fn calendar_date_rejects_impossible_days() {
        assert!(calendar_date(2026, 2, 30).is_err());
        assert!(calendar_date(2026, 4, 31).is_err());
        assert!(calendar_date(2026, 1, 31).is_ok());
    }

    #[test]
    fn day_bounds_cover_one_day_inclusively() {
        let date = calendar_date(2026, 7, 15).expect("valid day");
        let (start, end) = day_bounds(date);
        assert_eq!(start, datetime!(2026-07-15 00:00:00 UTC));
        assert_eq!(end, datetime!(2026-07-15 23:59:59.999 UTC));
    }

    #[test]
    fn day_view_filters_fixed_entries_by_recurrence_day() {
        let plain = entry(EntryKind::Expense, 5.0);
        let mut on_day = entry(EntryKind::FixedExpense, 10.0);
        on_day.recurrence_day = Some(15);
        let mut off_day = entry(EntryKind::FixedExpense, 20.0);
        off_day.recurrence_day = Some(3);

        let kept = day_view(vec![plain.clone(), on_day.clone(), off_day], 15);
        let ids: Vec<_> = kept.iter().map(|e| e.id).collect();
        assert!(ids.contains(&plain.id));
        assert!(ids.contains(&on_day.id));
        assert_eq!(kept.len(), 2);
    }
}
