//! Aggregate usage records into the dashboard summary.

use chrono::{DateTime, Days, TimeZone, Utc};

use crate::models::usage::{DashboardSummary, FeatureCounts, RequestHistory, UsageRecord};

/// Number of calendar days (UTC, today included) in the request history.
pub const HISTORY_DAYS: u64 = 7;

/// Build a summary as of `now`.
///
/// The language histogram and byte total cover every record. The request
/// history covers the last [`HISTORY_DAYS`] UTC calendar days, newest first,
/// labelled with the abbreviated weekday; a day only lists the features that
/// were used on it.
pub fn summarize(records: &[UsageRecord], now: DateTime<Utc>) -> DashboardSummary {
    let mut summary = DashboardSummary::default();

    for record in records {
        *summary
            .code_languages
            .entry(record.code_language.clone())
            .or_insert(0) += 1;
        summary.data_written += record.bytes.unwrap_or(0);
    }

    let today = now.date_naive();
    let mut days: Vec<FeatureCounts> = vec![FeatureCounts::new(); HISTORY_DAYS as usize];
    for record in records {
        let Some(when) = Utc.timestamp_opt(record.timestamp, 0).single() else {
            continue;
        };
        let age = (today - when.date_naive()).num_days();
        if let Ok(age) = usize::try_from(age)
            && let Some(counts) = days.get_mut(age)
        {
            *counts.entry(record.feature.as_str().to_string()).or_insert(0) += 1;
        }
    }

    let mut history = RequestHistory::new();
    for (age, counts) in days.into_iter().enumerate() {
        let Some(day) = today.checked_sub_days(Days::new(age as u64)) else {
            break;
        };
        history.push(day.format("%a").to_string(), counts);
    }
    summary.requests = history;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usage::FeatureKind;

    // 2024-12-05T12:00:00Z, a Thursday.
    const NOW: i64 = 1_733_400_000;
    const DAY: i64 = 86_400;

    fn record(ts: i64, feature: FeatureKind, lang: &str, bytes: Option<u64>) -> UsageRecord {
        UsageRecord {
            user_id: "U".to_string(),
            timestamp: ts,
            feature,
            code_language: lang.to_string(),
            bytes,
            accepted: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(NOW, 0).unwrap()
    }

    #[test]
    fn empty_input_still_lists_seven_days() {
        let summary = summarize(&[], now());
        assert!(summary.code_languages.is_empty());
        assert_eq!(summary.data_written, 0);
        let labels: Vec<&str> = summary.requests.labels().collect();
        assert_eq!(labels, vec!["Thu", "Wed", "Tue", "Mon", "Sun", "Sat", "Fri"]);
    }

    #[test]
    fn counts_languages_bytes_and_days() {
        let records = vec![
            record(NOW - 60, FeatureKind::CodeCompletion, "python", Some(10)),
            record(NOW - 120, FeatureKind::CodeCompletion, "python", None),
            record(NOW - DAY, FeatureKind::RefactorCode, "go", Some(30)),
            record(NOW - 2 * DAY, FeatureKind::DocString, "python", Some(5)),
        ];
        let summary = summarize(&records, now());

        assert_eq!(summary.code_languages["python"], 3);
        assert_eq!(summary.code_languages["go"], 1);
        assert_eq!(summary.data_written, 45);

        assert_eq!(summary.requests.count("Thu", FeatureKind::CodeCompletion), 2);
        assert_eq!(summary.requests.count("Wed", FeatureKind::RefactorCode), 1);
        assert_eq!(summary.requests.count("Tue", FeatureKind::DocString), 1);
        assert_eq!(summary.requests.count("Tue", FeatureKind::CodeCompletion), 0);
    }

    #[test]
    fn old_and_future_records_stay_out_of_history() {
        let records = vec![
            record(NOW - 7 * DAY, FeatureKind::CodeCompletion, "c", Some(1)),
            record(NOW + 2 * DAY, FeatureKind::CodeCompletion, "c", Some(1)),
        ];
        let summary = summarize(&records, now());
        assert_eq!(summary.code_languages["c"], 2);
        assert_eq!(summary.data_written, 2);
        for i in 0..summary.requests.len() {
            assert_eq!(summary.requests.count_at(i, FeatureKind::CodeCompletion), 0);
        }
    }

    #[test]
    fn six_days_ago_is_the_last_bucket() {
        let records = vec![record(NOW - 6 * DAY, FeatureKind::DocString, "c", None)];
        let summary = summarize(&records, now());
        assert_eq!(summary.requests.count("Fri", FeatureKind::DocString), 1);
        assert_eq!(summary.requests.count("Thu", FeatureKind::DocString), 0);
    }
}
