use std::fmt::Write;

use crate::models::AnalyticsReport;

pub fn rating_verdict(average: f64) -> &'static str {
    if average >= 7.0 {
        "Good"
    } else if average >= 4.0 {
        "Average"
    } else {
        "Poor"
    }
}

pub fn overall_trend(average: f64) -> &'static str {
    if average >= 7.0 {
        "Department is performing well with high satisfaction rates."
    } else if average >= 4.0 {
        "Department shows average performance with room for improvement."
    } else {
        "Department requires immediate attention and improvement strategies."
    }
}

pub fn build_report(dept_name: &str, analytics: Option<&AnalyticsReport>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Department Feedback Report");
    let _ = writeln!(output, "Generated for {dept_name}");
    let _ = writeln!(output);

    let Some(report) = analytics else {
        let _ = writeln!(output, "No feedback data available for this department.");
        return output;
    };

    let distribution = &report.rating_distribution;
    let total_valid = distribution.good + distribution.average + distribution.poor;
    let share = |count: usize| {
        if total_valid == 0 {
            0.0
        } else {
            count as f64 / total_valid as f64 * 100.0
        }
    };
    let comment_share = if report.total_responses == 0 {
        0.0
    } else {
        report.feedback_comments.len() as f64 / report.total_responses as f64 * 100.0
    };

    let _ = writeln!(output, "## Summary");
    let _ = writeln!(
        output,
        "- Total responses: {} ({:.1}% completion)",
        report.total_responses, report.response_rate
    );
    let _ = writeln!(
        output,
        "- Average rating: {:.1}/10 ({})",
        report.average_rating,
        rating_verdict(report.average_rating)
    );
    let _ = writeln!(
        output,
        "- Satisfaction rate: {:.1}% rated 7 or higher",
        share(distribution.good)
    );
    let _ = writeln!(
        output,
        "- Needs attention: {:.1}% rated below 4",
        share(distribution.poor)
    );
    let _ = writeln!(
        output,
        "- Written comments: {} ({:.0}% of responses)",
        report.feedback_comments.len(),
        comment_share
    );
    let _ = writeln!(output, "- {}", overall_trend(report.average_rating));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Satisfaction Levels");
    for level in &report.satisfaction_levels {
        let _ = writeln!(output, "- {}: {}", level.full_level, level.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Criteria Performance");
    for entry in &report.criteria_average {
        let _ = writeln!(
            output,
            "- {}: {:.1}/10 across {} ratings",
            entry.full_criteria, entry.average, entry.count
        );
    }
    if let Some(best) = &report.highest_rated_criteria {
        let _ = writeln!(
            output,
            "- Top performer: {} at {:.1}/10",
            best.full_criteria, best.rating
        );
    }
    if let Some(worst) = &report.lowest_rated_criteria {
        let _ = writeln!(
            output,
            "- Area for improvement: {} at {:.1}/10",
            worst.full_criteria, worst.rating
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Feedback Timeline");
    for entry in &report.time_series_data {
        let _ = writeln!(output, "- {}: {} responses", entry.date, entry.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Comments");
    if report.feedback_comments.is_empty() {
        let _ = writeln!(output, "No written comments were submitted.");
    } else {
        for (index, feedback) in report.feedback_comments.iter().enumerate() {
            let _ = writeln!(
                output,
                "- #{} ({}, {}): {}",
                index + 1,
                feedback.timestamp.date_naive(),
                feedback.department,
                feedback.comments.trim()
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics;
    use crate::models::FeedbackRecord;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Map};

    fn library_records() -> Vec<FeedbackRecord> {
        let mut first = Map::new();
        first.insert("Staff helpfulness".to_string(), json!(8));
        first.insert("Cleanliness".to_string(), json!(3));
        let mut second = Map::new();
        second.insert("Staff helpfulness".to_string(), json!(9));

        vec![
            FeedbackRecord {
                id: "fb-1".to_string(),
                name: "Anonymous".to_string(),
                department: "Physics".to_string(),
                purse_number: "P-2001".to_string(),
                selected_dept: "library".to_string(),
                ratings: first,
                comments: "Shelves need restocking".to_string(),
                timestamp: Utc.with_ymd_and_hms(2026, 2, 3, 9, 0, 0).unwrap(),
            },
            FeedbackRecord {
                id: "fb-2".to_string(),
                name: "Anonymous".to_string(),
                department: "History".to_string(),
                purse_number: "P-2002".to_string(),
                selected_dept: "library".to_string(),
                ratings: second,
                comments: String::new(),
                timestamp: Utc.with_ymd_and_hms(2026, 2, 4, 9, 0, 0).unwrap(),
            },
        ]
    }

    #[test]
    fn report_carries_headline_figures() {
        let records = library_records();
        let analytics = analytics::analyze_department(&records, "library").unwrap();
        let output = build_report("Library Services", Some(&analytics));

        assert!(output.contains("Generated for Library Services"));
        assert!(output.contains("- Total responses: 2"));
        assert!(output.contains("Top performer: Staff helpfulness at 8.5/10"));
        assert!(output.contains("Area for improvement: Cleanliness at 3.0/10"));
        assert!(output.contains("- #1 (2026-02-03, Physics): Shelves need restocking"));
    }

    #[test]
    fn missing_analytics_renders_no_data_body() {
        let output = build_report("Cafeteria Services", None);
        assert!(output.contains("No feedback data available for this department."));
    }

    #[test]
    fn verdict_bands_follow_rating_thresholds() {
        assert_eq!(rating_verdict(7.0), "Good");
        assert_eq!(rating_verdict(4.0), "Average");
        assert_eq!(rating_verdict(3.9), "Poor");
    }
}
