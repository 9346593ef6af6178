use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct FeedbackRecord {
    pub id: String,
    pub name: String,
    pub department: String,
    pub purse_number: String,
    pub selected_dept: String,
    pub ratings: Map<String, Value>,
    pub comments: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DepartmentInfo {
    pub key: String,
    pub name: String,
    pub criteria: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AnalyticsReport {
    pub total_responses: usize,
    pub average_rating: f64,
    pub rating_distribution: RatingDistribution,
    pub criteria_average: Vec<CriterionAverage>,
    pub feedback_comments: Vec<FeedbackRecord>,
    pub time_series_data: Vec<TimeSeriesEntry>,
    pub rating_trends: Vec<CriterionTrend>,
    pub satisfaction_levels: Vec<SatisfactionLevel>,
    pub response_rate: f64,
    pub highest_rated_criteria: Option<CriterionTrend>,
    pub lowest_rated_criteria: Option<CriterionTrend>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingDistribution {
    pub good: usize,
    pub average: usize,
    pub poor: usize,
}

#[derive(Debug, Clone)]
pub struct CriterionAverage {
    pub criteria: String,
    pub full_criteria: String,
    pub average: f64,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct CriterionTrend {
    pub criteria: String,
    pub full_criteria: String,
    pub rating: f64,
}

#[derive(Debug, Clone)]
pub struct SatisfactionLevel {
    pub level: &'static str,
    pub full_level: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct TimeSeriesEntry {
    pub date: NaiveDate,
    pub count: usize,
    pub formatted_date: String,
}
