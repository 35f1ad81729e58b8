use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::InvalidRecordError;
use crate::models::{
    LongestGap, MonthlyCount, NewestReclamation, ReclamationRecord, StatsSummary, MONTH_NAMES,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and the Finnish `D.M.YYYY` form.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(value, "%d.%m.%Y").ok()
}

/// Whole days from `from` to `to`, floored so that partial days never round up
/// and instants before `from` stay negative.
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

pub fn monthly_trend(dates: &[NaiveDate], year: i32) -> Vec<MonthlyCount> {
    let mut trend: Vec<MonthlyCount> = MONTH_NAMES
        .iter()
        .map(|&month| MonthlyCount {
            month,
            reclamations: 0,
        })
        .collect();

    for date in dates.iter().filter(|date| date.year() == year) {
        trend[date.month0() as usize].reclamations += 1;
    }

    trend
}

pub fn year_total(dates: &[NaiveDate], year: i32) -> usize {
    dates.iter().filter(|date| date.year() == year).count()
}

pub fn compute_summary(
    records: &[ReclamationRecord],
    now: NaiveDateTime,
) -> Result<StatsSummary, InvalidRecordError> {
    let dates = parse_dates(records)?;
    let year = now.year();

    let Some(newest_index) = newest_index(&dates) else {
        tracing::debug!("no reclamation records, returning empty summary");
        return Ok(empty_summary(year));
    };

    let newest_record = &records[newest_index];
    let newest_date = dates[newest_index];
    let streak = days_between(midnight(newest_date), now);

    let trend = monthly_trend(&dates, year);
    let this_year: usize = trend.iter().map(|month| month.reclamations).sum();

    Ok(StatsSummary {
        newest: Some(NewestReclamation {
            date: newest_date,
            product: newest_record.product.clone(),
            customer: newest_record.customer.clone(),
            reason: newest_record.reason.clone(),
        }),
        days_since_previous: streak,
        longest_gap: longest_gap(&dates),
        current_streak: streak,
        year,
        monthly_trend: trend,
        year_total: this_year,
        previous_year_total: year_total(&dates, year - 1),
    })
}

fn parse_dates(records: &[ReclamationRecord]) -> Result<Vec<NaiveDate>, InvalidRecordError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            parse_record_date(&record.date).ok_or_else(|| InvalidRecordError {
                index,
                value: record.date.clone(),
            })
        })
        .collect()
}

// First occurrence wins among records sharing the latest date.
fn newest_index(dates: &[NaiveDate]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, date) in dates.iter().enumerate() {
        match best {
            Some(current) if dates[current] >= *date => {}
            _ => best = Some(index),
        }
    }
    best
}

fn longest_gap(dates: &[NaiveDate]) -> LongestGap {
    let mut sorted = dates.to_vec();
    sorted.sort();

    let mut gap = LongestGap::default();
    for pair in sorted.windows(2) {
        let days = days_between(midnight(pair[0]), midnight(pair[1]));
        if days > gap.days {
            gap = LongestGap {
                days,
                start: Some(pair[0]),
                end: Some(pair[1]),
            };
        }
    }
    gap
}

fn empty_summary(year: i32) -> StatsSummary {
    StatsSummary {
        newest: None,
        days_since_previous: 0,
        longest_gap: LongestGap::default(),
        current_streak: 0,
        year,
        monthly_trend: monthly_trend(&[], year),
        year_total: 0,
        previous_year_total: 0,
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(date: &str) -> ReclamationRecord {
        ReclamationRecord::new(date, "P5849206_A.07", "0001", "Burrs in hole - 3pcs")
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        midnight(date(year, month, day))
    }

    #[test]
    fn parses_supported_date_spellings() {
        assert_eq!(parse_record_date("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_record_date(" 2024-03-05 "), Some(date(2024, 3, 5)));
        assert_eq!(
            parse_record_date("2024-03-05T14:30:00+02:00"),
            Some(date(2024, 3, 5))
        );
        assert_eq!(parse_record_date("5.3.2024"), Some(date(2024, 3, 5)));
        assert_eq!(parse_record_date("not-a-date"), None);
        assert_eq!(parse_record_date("2024-02-30"), None);
        assert_eq!(parse_record_date(""), None);
    }

    #[test]
    fn days_between_floors_partial_days() {
        let from = at(2024, 3, 5);
        assert_eq!(days_between(from, from + chrono::Duration::hours(47)), 1);
        assert_eq!(days_between(from, from - chrono::Duration::hours(1)), -1);
        assert_eq!(days_between(from, from), 0);
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let summary = compute_summary(&[], at(2024, 3, 10)).expect("empty input is valid");

        assert!(summary.newest.is_none());
        assert_eq!(summary.days_since_previous, 0);
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.longest_gap, LongestGap::default());
        assert_eq!(summary.monthly_trend.len(), 12);
        assert!(summary.monthly_trend.iter().all(|m| m.reclamations == 0));
        assert_eq!(summary.monthly_trend[0].month, "Jan");
        assert_eq!(summary.monthly_trend[11].month, "Dec");
        assert_eq!(summary.year_total, 0);
        assert_eq!(summary.previous_year_total, 0);
    }

    #[test]
    fn two_records_give_streak_and_gap() {
        let records = vec![record("2024-01-10"), record("2024-03-05")];
        let summary = compute_summary(&records, at(2024, 3, 10)).expect("valid records");

        let newest = summary.newest.expect("newest record");
        assert_eq!(newest.date, date(2024, 3, 5));
        assert_eq!(summary.days_since_previous, 5);
        assert_eq!(summary.current_streak, 5);
        assert_eq!(summary.longest_gap.days, 55);
        assert_eq!(summary.longest_gap.start, Some(date(2024, 1, 10)));
        assert_eq!(summary.longest_gap.end, Some(date(2024, 3, 5)));
    }

    #[test]
    fn same_day_records_have_no_gap_and_first_wins() {
        let records = vec![
            ReclamationRecord::new("2024-06-01", "first", "A", "Packaging"),
            ReclamationRecord::new("2024-06-01", "second", "B", "Quality"),
        ];
        let summary = compute_summary(&records, at(2024, 6, 3)).expect("valid records");

        assert_eq!(summary.longest_gap.days, 0);
        assert!(summary.longest_gap.start.is_none());
        assert!(summary.longest_gap.end.is_none());
        assert_eq!(summary.newest.expect("newest record").product, "first");
    }

    #[test]
    fn tie_on_latest_date_prefers_input_order_regardless_of_position() {
        let records = vec![
            ReclamationRecord::new("2024-01-01", "old", "A", "x"),
            ReclamationRecord::new("2024-05-01", "early-entry", "A", "x"),
            ReclamationRecord::new("2024-02-01", "middle", "A", "x"),
            ReclamationRecord::new("2024-05-01", "late-entry", "A", "x"),
        ];
        let summary = compute_summary(&records, at(2024, 5, 2)).expect("valid records");
        assert_eq!(summary.newest.expect("newest record").product, "early-entry");
    }

    #[test]
    fn invalid_date_rejects_whole_computation() {
        let records = vec![record("2025-01-01"), record("not-a-date"), record("2025-02-01")];
        let err = compute_summary(&records, at(2025, 3, 1)).expect_err("must reject");

        assert_eq!(err.index, 1);
        assert_eq!(err.value, "not-a-date");
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn empty_date_is_rejected_with_its_index() {
        let records = vec![record("2025-01-01"), record("2025-01-02"), record("")];
        let err = compute_summary(&records, at(2025, 3, 1)).expect_err("must reject");
        assert_eq!(err.index, 2);
        assert_eq!(err.value, "");
    }

    #[test]
    fn trend_counts_only_the_requested_year() {
        let mut records: Vec<ReclamationRecord> = [
            "2024-01-03", "2024-01-17", "2024-01-28", "2024-02-14", "2024-02-20", "2024-05-02",
            "2024-05-09", "2024-05-30", "2024-09-11", "2024-09-12",
        ]
        .iter()
        .map(|d| record(d))
        .collect();
        records.extend(["2023-04-01", "2023-11-15", "2023-12-31"].iter().map(|d| record(d)));

        let summary = compute_summary(&records, at(2024, 10, 1)).expect("valid records");
        let counts: Vec<usize> = summary.monthly_trend.iter().map(|m| m.reclamations).collect();

        assert_eq!(counts, vec![3, 2, 0, 0, 3, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(summary.year_total, 10);
        assert_eq!(summary.previous_year_total, 3);
        let dates = parse_dates(&records).expect("valid dates");
        assert_eq!(counts.iter().sum::<usize>(), year_total(&dates, 2024));
    }

    #[test]
    fn future_dated_record_keeps_negative_streak() {
        let records = vec![record("2024-03-15")];
        let summary = compute_summary(&records, at(2024, 3, 10)).expect("valid records");

        assert_eq!(summary.days_since_previous, -5);
        assert_eq!(summary.current_streak, -5);
        assert_eq!(summary.longest_gap.days, 0);
    }

    #[test]
    fn streak_truncates_time_of_day() {
        let records = vec![record("2024-03-05")];
        let now = at(2024, 3, 10) + chrono::Duration::hours(23);
        let summary = compute_summary(&records, now).expect("valid records");
        assert_eq!(summary.days_since_previous, 5);
    }

    #[test]
    fn longest_gap_scans_sorted_adjacent_pairs() {
        let records = vec![
            record("2024-04-01"),
            record("2024-01-01"),
            record("2024-01-11"),
            record("2024-02-10"),
            record("2024-03-11"),
        ];
        let summary = compute_summary(&records, at(2024, 4, 2)).expect("valid records");

        // Jan 11 -> Feb 10 and Feb 10 -> Mar 11 are both 30 days; the earlier pair wins.
        assert_eq!(summary.longest_gap.days, 30);
        assert_eq!(summary.longest_gap.start, Some(date(2024, 1, 11)));
        assert_eq!(summary.longest_gap.end, Some(date(2024, 2, 10)));
    }

    #[test]
    fn summary_invariants_hold_across_inputs() {
        let inputs: Vec<Vec<ReclamationRecord>> = vec![
            vec![],
            vec![record("2023-07-07")],
            vec![record("2024-06-01"), record("2024-06-01"), record("2024-06-01")],
            vec![record("2022-12-31"), record("2024-01-01"), record("2024-12-31")],
        ];

        for records in inputs {
            let summary = compute_summary(&records, at(2024, 12, 31)).expect("valid records");
            assert_eq!(summary.days_since_previous, summary.current_streak);
            assert!(summary.longest_gap.days >= 0);
            if records.len() <= 1 {
                assert_eq!(summary.longest_gap.days, 0);
            }
            let trend_sum: usize = summary.monthly_trend.iter().map(|m| m.reclamations).sum();
            assert_eq!(trend_sum, summary.year_total);
        }
    }

    fn record_dates() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec((2020i32..=2025, 1u32..=12, 1u32..=28), 0..40).prop_map(|parts| {
            parts
                .into_iter()
                .map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn summary_invariants_hold_for_generated_records(
            dates in record_dates(),
            year in 2020i32..=2026,
            hour in 0u32..24,
        ) {
            let records: Vec<ReclamationRecord> = dates.iter().map(|d| record(d)).collect();
            let now = at(year, 12, 31) + chrono::Duration::hours(i64::from(hour));
            let summary = compute_summary(&records, now).expect("generated dates are valid");

            prop_assert_eq!(summary.days_since_previous, summary.current_streak);
            prop_assert!(summary.longest_gap.days >= 0);
            if records.len() <= 1 {
                prop_assert_eq!(summary.longest_gap.days, 0);
            }

            let parsed = parse_dates(&records).expect("generated dates are valid");
            let trend_sum: usize = summary.monthly_trend.iter().map(|m| m.reclamations).sum();
            prop_assert_eq!(summary.monthly_trend.len(), 12);
            prop_assert_eq!(trend_sum, summary.year_total);
            prop_assert_eq!(summary.year_total, year_total(&parsed, year));
            prop_assert_eq!(summary.previous_year_total, year_total(&parsed, year - 1));

            prop_assert_eq!(summary.newest.map(|n| n.date), parsed.iter().max().copied());
        }
    }
}
