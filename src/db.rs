use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{DepartmentInfo, FeedbackRecord};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            id SERIAL PRIMARY KEY,
            key VARCHAR(50) UNIQUE NOT NULL,
            name VARCHAR(255) NOT NULL,
            criteria JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            id SERIAL PRIMARY KEY,
            feedback_id VARCHAR(255) UNIQUE NOT NULL,
            name VARCHAR(255) NOT NULL,
            department VARCHAR(255) NOT NULL,
            purse_number VARCHAR(100) NOT NULL,
            selected_dept VARCHAR(50) NOT NULL,
            ratings JSONB NOT NULL,
            comments TEXT,
            "timestamp" TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS unique_purse_dept \
         ON feedback (purse_number, selected_dept)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let departments = vec![
        (
            "library",
            "Library Services",
            vec![
                "Book availability and collection quality",
                "Staff helpfulness and knowledge",
                "Facility cleanliness and maintenance",
                "Study environment and noise levels",
                "Digital resources and computer access",
            ],
        ),
        (
            "student_affairs",
            "Department of Student Affairs",
            vec![
                "Response time to student queries",
                "Staff professionalism and courtesy",
                "Problem resolution effectiveness",
                "Event organization and management",
                "Student support services quality",
            ],
        ),
        (
            "registrar",
            "Registrar Office",
            vec![
                "Document processing speed",
                "Accuracy of academic records",
                "Staff knowledge of procedures",
                "Online portal functionality",
                "Communication clarity and timeliness",
            ],
        ),
        (
            "cafeteria",
            "Cafeteria Services",
            vec![
                "Food quality and taste",
                "Hygiene and cleanliness standards",
                "Variety of menu options",
                "Pricing and value for money",
                "Service speed and staff behavior",
            ],
        ),
        (
            "transport",
            "Transport Services",
            vec![
                "Bus punctuality and reliability",
                "Vehicle condition and safety",
                "Route coverage and accessibility",
                "Driver behavior and professionalism",
                "Fare structure and payment options",
            ],
        ),
        (
            "it_services",
            "IT Services",
            vec![
                "Network connectivity and speed",
                "Software support and troubleshooting",
                "Hardware maintenance and availability",
                "Response time to technical issues",
                "User training and documentation",
            ],
        ),
    ];

    for (key, name, criteria) in departments {
        sqlx::query(
            r#"
            INSERT INTO departments (key, name, criteria)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
            SET name = EXCLUDED.name, criteria = EXCLUDED.criteria
            "#,
        )
        .bind(key)
        .bind(name)
        .bind(json!(criteria))
        .execute(pool)
        .await?;
    }

    let feedback = vec![
        (
            "seed-001",
            "Amina Yusuf",
            "Computer Science",
            "PN-48213",
            "library",
            json!({
                "Book availability and collection quality": 8,
                "Staff helpfulness and knowledge": 9,
                "Study environment and noise levels": 6
            }),
            "Quiet floors are great, but popular titles are always checked out.",
            Utc.with_ymd_and_hms(2026, 2, 2, 10, 30, 0),
        ),
        (
            "seed-002",
            "Daniel Okoro",
            "Mechanical Engineering",
            "PN-51077",
            "library",
            json!({
                "Book availability and collection quality": 7,
                "Facility cleanliness and maintenance": 8,
                "Digital resources and computer access": 5
            }),
            "",
            Utc.with_ymd_and_hms(2026, 2, 3, 14, 15, 0),
        ),
        (
            "seed-003",
            "Sara Haile",
            "Economics",
            "PN-46590",
            "cafeteria",
            json!({
                "Food quality and taste": 6,
                "Hygiene and cleanliness standards": 8,
                "Pricing and value for money": 4
            }),
            "Lunch prices went up again this semester.",
            Utc.with_ymd_and_hms(2026, 2, 3, 12, 45, 0),
        ),
    ];

    for (feedback_id, name, department, purse_number, selected_dept, ratings, comments, timestamp) in
        feedback
    {
        let timestamp = timestamp.single().context("invalid seed timestamp")?;
        sqlx::query(
            r#"
            INSERT INTO feedback
            (feedback_id, name, department, purse_number, selected_dept, ratings, comments, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(feedback_id)
        .bind(name)
        .bind(department)
        .bind(purse_number)
        .bind(selected_dept)
        .bind(ratings)
        .bind(comments)
        .bind(timestamp)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_feedback(
    pool: &PgPool,
    purse_number: Option<&str>,
) -> anyhow::Result<Vec<FeedbackRecord>> {
    let mut query = String::from(
        "SELECT feedback_id, name, department, purse_number, selected_dept, \
         ratings, comments, \"timestamp\" FROM feedback",
    );

    if purse_number.is_some() {
        query.push_str(" WHERE purse_number = $1");
    }
    query.push_str(" ORDER BY \"timestamp\" DESC");

    let mut rows = sqlx::query(&query);
    if let Some(value) = purse_number {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut feedback = Vec::new();

    for row in records {
        let ratings = match row.get::<Value, _>("ratings") {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let comments: Option<String> = row.get("comments");

        feedback.push(FeedbackRecord {
            id: row.get("feedback_id"),
            name: row.get("name"),
            department: row.get("department"),
            purse_number: row.get("purse_number"),
            selected_dept: row.get("selected_dept"),
            ratings,
            comments: comments.unwrap_or_default(),
            timestamp: row.get("timestamp"),
        });
    }

    Ok(feedback)
}

pub async fn fetch_departments(pool: &PgPool) -> anyhow::Result<Vec<DepartmentInfo>> {
    let rows = sqlx::query("SELECT key, name, criteria FROM departments ORDER BY name")
        .fetch_all(pool)
        .await?;

    let mut departments = Vec::new();
    for row in rows {
        let criteria = match row.get::<Value, _>("criteria") {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        };

        departments.push(DepartmentInfo {
            key: row.get("key"),
            name: row.get("name"),
            criteria,
        });
    }

    Ok(departments)
}

pub async fn submitted_departments(
    pool: &PgPool,
    purse_number: &str,
) -> anyhow::Result<Vec<String>> {
    let rows = sqlx::query("SELECT selected_dept FROM feedback WHERE purse_number = $1")
        .bind(purse_number)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|row| row.get("selected_dept")).collect())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        name: String,
        department: String,
        purse_number: String,
        selected_dept: String,
        ratings: String,
        comments: Option<String>,
        timestamp: DateTime<Utc>,
        feedback_id: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let ratings: Value = serde_json::from_str(&row.ratings)
            .with_context(|| format!("invalid ratings JSON for purse {}", row.purse_number))?;
        let feedback_id = row
            .feedback_id
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO feedback
            (feedback_id, name, department, purse_number, selected_dept, ratings, comments, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&feedback_id)
        .bind(&row.name)
        .bind(&row.department)
        .bind(&row.purse_number)
        .bind(&row.selected_dept)
        .bind(ratings)
        .bind(row.comments.as_deref().unwrap_or(""))
        .bind(row.timestamp)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
