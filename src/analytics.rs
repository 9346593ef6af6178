use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::models::{
    AnalyticsReport, CriterionAverage, CriterionTrend, FeedbackRecord, RatingDistribution,
    SatisfactionLevel, TimeSeriesEntry,
};

const AVERAGE_LABEL_CHARS: usize = 20;
const TREND_LABEL_CHARS: usize = 15;

pub fn analyze_department(
    feedback: &[FeedbackRecord],
    dept_key: &str,
) -> Option<AnalyticsReport> {
    let dept_feedback = filter_department(feedback, dept_key);
    if dept_feedback.is_empty() {
        return None;
    }

    let all_ratings = extract_ratings(&dept_feedback);
    if all_ratings.is_empty() {
        return None;
    }

    let groups = criteria_ratings(&dept_feedback);
    let trends = rating_trends(&groups);
    let highest_rated_criteria = trends.first().cloned();
    let lowest_rated_criteria = trends.last().cloned();
    let response_rate = response_rate(all_ratings.len(), dept_feedback.len(), groups.len());

    Some(AnalyticsReport {
        total_responses: dept_feedback.len(),
        average_rating: mean(&all_ratings),
        rating_distribution: rating_distribution(&all_ratings),
        criteria_average: criteria_averages(&groups),
        feedback_comments: extract_comments(&dept_feedback),
        time_series_data: time_series(&dept_feedback),
        rating_trends: trends,
        satisfaction_levels: satisfaction_levels(&all_ratings),
        response_rate,
        highest_rated_criteria,
        lowest_rated_criteria,
    })
}

pub fn filter_department(feedback: &[FeedbackRecord], dept_key: &str) -> Vec<FeedbackRecord> {
    feedback
        .iter()
        .filter(|record| record.selected_dept == dept_key)
        .cloned()
        .collect()
}

pub fn extract_ratings(records: &[FeedbackRecord]) -> Vec<f64> {
    records
        .iter()
        .flat_map(|record| record.ratings.values())
        .filter_map(valid_rating)
        .collect()
}

fn valid_rating(value: &Value) -> Option<f64> {
    value.as_f64().filter(|rating| rating.is_finite())
}

pub fn rating_distribution(ratings: &[f64]) -> RatingDistribution {
    RatingDistribution {
        good: ratings.iter().filter(|r| **r >= 7.0).count(),
        average: ratings.iter().filter(|r| **r >= 4.0 && **r < 7.0).count(),
        poor: ratings.iter().filter(|r| **r < 4.0).count(),
    }
}

pub fn satisfaction_levels(ratings: &[f64]) -> Vec<SatisfactionLevel> {
    let between = |low: f64, high: f64| ratings.iter().filter(|r| **r >= low && **r < high).count();
    vec![
        SatisfactionLevel {
            level: "Excellent",
            full_level: "Excellent (9-10)",
            count: ratings.iter().filter(|r| **r >= 9.0).count(),
        },
        SatisfactionLevel {
            level: "Good",
            full_level: "Good (7-8)",
            count: between(7.0, 9.0),
        },
        SatisfactionLevel {
            level: "Average",
            full_level: "Average (5-6)",
            count: between(5.0, 7.0),
        },
        SatisfactionLevel {
            level: "Below Avg",
            full_level: "Below Average (3-4)",
            count: between(3.0, 5.0),
        },
        SatisfactionLevel {
            level: "Poor",
            full_level: "Poor (1-2)",
            count: ratings.iter().filter(|r| **r < 3.0).count(),
        },
    ]
}

// Groups valid scores by criterion label, keeping labels in first-observed order.
pub fn criteria_ratings(records: &[FeedbackRecord]) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();

    for record in records {
        for (criterion, value) in &record.ratings {
            let Some(rating) = valid_rating(value) else {
                continue;
            };
            match groups.iter_mut().find(|(label, _)| label == criterion) {
                Some((_, ratings)) => ratings.push(rating),
                None => groups.push((criterion.clone(), vec![rating])),
            }
        }
    }

    groups
}

pub fn criteria_averages(groups: &[(String, Vec<f64>)]) -> Vec<CriterionAverage> {
    groups
        .iter()
        .map(|(label, ratings)| CriterionAverage {
            criteria: truncate_label(label, AVERAGE_LABEL_CHARS),
            full_criteria: label.clone(),
            average: mean(ratings),
            count: ratings.len(),
        })
        .collect()
}

pub fn rating_trends(groups: &[(String, Vec<f64>)]) -> Vec<CriterionTrend> {
    let mut trends: Vec<CriterionTrend> = groups
        .iter()
        .map(|(label, ratings)| CriterionTrend {
            criteria: truncate_label(label, TREND_LABEL_CHARS),
            full_criteria: label.clone(),
            rating: mean(ratings),
        })
        .collect();

    // sort_by is stable: tied means keep first-observed label order.
    trends.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(std::cmp::Ordering::Equal));
    trends
}

pub fn time_series(records: &[FeedbackRecord]) -> Vec<TimeSeriesEntry> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for record in records {
        *by_day.entry(record.timestamp.date_naive()).or_insert(0) += 1;
    }

    by_day
        .into_iter()
        .map(|(date, count)| TimeSeriesEntry {
            date,
            count,
            formatted_date: date.format("%b %d").to_string(),
        })
        .collect()
}

pub fn extract_comments(records: &[FeedbackRecord]) -> Vec<FeedbackRecord> {
    records
        .iter()
        .filter(|record| !record.comments.trim().is_empty())
        .cloned()
        .collect()
}

pub fn response_rate(valid_ratings: usize, record_count: usize, criteria_count: usize) -> f64 {
    let possible = record_count * criteria_count;
    if possible == 0 {
        0.0
    } else {
        valid_ratings as f64 / possible as f64 * 100.0
    }
}

pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() > max_chars {
        let prefix: String = label.chars().take(max_chars).collect();
        format!("{prefix}...")
    } else {
        label.to_string()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Map, Value};

    fn sample_record(dept: &str, ratings: &[(&str, Value)], comments: &str, day: u32) -> FeedbackRecord {
        let mut map = Map::new();
        for (criterion, value) in ratings {
            map.insert(criterion.to_string(), value.clone());
        }
        FeedbackRecord {
            id: format!("fb-{dept}-{day}"),
            name: "Anonymous".to_string(),
            department: "Computer Science".to_string(),
            purse_number: "P-1001".to_string(),
            selected_dept: dept.to_string(),
            ratings: map,
            comments: comments.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, day, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn invalid_ratings_are_excluded_from_average() {
        let records = vec![sample_record(
            "library",
            &[
                ("Staff helpfulness", json!(8)),
                ("Cleanliness", json!("eight")),
                ("Noise levels", json!(null)),
                ("Book availability", json!(6)),
            ],
            "",
            1,
        )];

        let report = analyze_department(&records, "library").unwrap();
        assert!((report.average_rating - 7.0).abs() < 0.001);
        assert_eq!(report.rating_distribution.good + report.rating_distribution.average, 2);
    }

    #[test]
    fn coarse_tiers_partition_valid_ratings() {
        let ratings = vec![1.0, 3.9, 4.0, 6.9, 7.0, 9.5, 10.0];
        let distribution = rating_distribution(&ratings);
        assert_eq!(distribution.good, 3);
        assert_eq!(distribution.average, 2);
        assert_eq!(distribution.poor, 2);
        assert_eq!(
            distribution.good + distribution.average + distribution.poor,
            ratings.len()
        );
    }

    #[test]
    fn satisfaction_levels_partition_valid_ratings() {
        let ratings = vec![1.0, 2.9, 3.0, 4.9, 5.0, 6.9, 7.0, 8.9, 9.0, 10.0];
        let levels = satisfaction_levels(&ratings);
        let counts: Vec<usize> = levels.iter().map(|level| level.count).collect();
        assert_eq!(counts, vec![2, 2, 2, 2, 2]);
        assert_eq!(counts.iter().sum::<usize>(), ratings.len());
    }

    #[test]
    fn boundary_ratings_fall_into_upper_tiers() {
        let distribution = rating_distribution(&[7.0]);
        assert_eq!(distribution.good, 1);
        let levels = satisfaction_levels(&[7.0]);
        assert_eq!(levels.iter().find(|l| l.level == "Good").unwrap().count, 1);

        let distribution = rating_distribution(&[4.0]);
        assert_eq!(distribution.average, 1);
        let levels = satisfaction_levels(&[4.0]);
        assert_eq!(levels.iter().find(|l| l.level == "Below Avg").unwrap().count, 1);

        let levels = satisfaction_levels(&[9.0]);
        assert_eq!(levels.iter().find(|l| l.level == "Excellent").unwrap().count, 1);
    }

    #[test]
    fn trends_sort_descending_and_extremes_match() {
        let records = vec![
            sample_record("library", &[("A", json!(3)), ("B", json!(9)), ("C", json!(6))], "", 1),
            sample_record("library", &[("A", json!(5)), ("B", json!(7)), ("C", json!(6))], "", 2),
        ];

        let report = analyze_department(&records, "library").unwrap();
        let trends = &report.rating_trends;
        assert!(trends.windows(2).all(|pair| pair[0].rating >= pair[1].rating));
        assert_eq!(report.highest_rated_criteria.unwrap().full_criteria, "B");
        assert_eq!(report.lowest_rated_criteria.unwrap().full_criteria, "A");
    }

    #[test]
    fn tied_trends_keep_first_observed_order() {
        let records = vec![sample_record(
            "library",
            &[("First", json!(6)), ("Second", json!(6))],
            "",
            1,
        )];

        let trends = rating_trends(&criteria_ratings(&records));
        assert_eq!(trends[0].full_criteria, "First");
        assert_eq!(trends[1].full_criteria, "Second");
    }

    #[test]
    fn time_series_is_sorted_by_day_with_per_day_counts() {
        let records = vec![
            sample_record("library", &[("A", json!(5))], "", 9),
            sample_record("library", &[("A", json!(6))], "", 2),
            sample_record("library", &[("A", json!(7))], "", 2),
        ];

        let series = time_series(&records);
        assert_eq!(series.len(), 2);
        assert!(series[0].date < series[1].date);
        assert_eq!(series[0].count, 2);
        assert_eq!(series[1].count, 1);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn unmatched_department_returns_none() {
        let records = vec![sample_record("library", &[("A", json!(5))], "", 1)];
        assert!(analyze_department(&records, "cafeteria").is_none());
    }

    #[test]
    fn records_without_valid_ratings_return_none() {
        let records = vec![
            sample_record("library", &[("A", json!("five")), ("B", json!(null))], "", 1),
            sample_record("library", &[], "still no scores", 2),
        ];
        assert!(analyze_department(&records, "library").is_none());
    }

    #[test]
    fn zero_comments_still_yields_a_full_report() {
        let records = vec![
            sample_record("library", &[("A", json!(8))], "", 1),
            sample_record("library", &[("A", json!(6))], "   ", 2),
        ];

        let report = analyze_department(&records, "library").unwrap();
        assert_eq!(report.total_responses, 2);
        assert!(report.feedback_comments.is_empty());
    }

    #[test]
    fn comments_keep_input_order_and_skip_blank_text() {
        let records = vec![
            sample_record("library", &[("A", json!(8))], "Great staff", 1),
            sample_record("library", &[("A", json!(4))], "  ", 2),
            sample_record("library", &[("A", json!(6))], "More seating please", 3),
        ];

        let comments = extract_comments(&records);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].comments, "Great staff");
        assert_eq!(comments[1].comments, "More seating please");
    }

    #[test]
    fn library_scenario_matches_expected_numbers() {
        let records = vec![
            sample_record("library", &[("A", json!(8)), ("B", json!(6))], "", 1),
            sample_record("library", &[("A", json!(9)), ("B", json!(4))], "", 2),
            sample_record("library", &[("A", json!(7))], "", 3),
        ];

        let report = analyze_department(&records, "library").unwrap();
        assert_eq!(report.total_responses, 3);

        let a = report
            .criteria_average
            .iter()
            .find(|entry| entry.full_criteria == "A")
            .unwrap();
        assert!((a.average - 8.0).abs() < 0.001);
        assert_eq!(a.count, 3);

        let b = report
            .criteria_average
            .iter()
            .find(|entry| entry.full_criteria == "B")
            .unwrap();
        assert!((b.average - 5.0).abs() < 0.001);
        assert_eq!(b.count, 2);

        assert!((report.response_rate - 500.0 / 6.0).abs() < 0.001);
    }

    #[test]
    fn long_labels_are_truncated_with_full_label_kept() {
        let label = "Facility cleanliness and maintenance";
        let records = vec![sample_record("library", &[(label, json!(8))], "", 1)];

        let report = analyze_department(&records, "library").unwrap();
        let average = &report.criteria_average[0];
        assert_eq!(average.criteria, "Facility cleanliness...");
        assert_eq!(average.full_criteria, label);

        let trend = &report.rating_trends[0];
        assert_eq!(trend.criteria, "Facility cleanl...");
        assert_eq!(trend.full_criteria, label);

        assert_eq!(truncate_label("short", 15), "short");
    }

    #[test]
    fn response_rate_guards_against_empty_denominator() {
        assert_eq!(response_rate(0, 0, 0), 0.0);
        assert_eq!(response_rate(0, 3, 0), 0.0);
        assert!((response_rate(5, 3, 2) - 500.0 / 6.0).abs() < 0.001);
    }
}
