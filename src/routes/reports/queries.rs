use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{assemble, DailyCount, Report, ReportPeriod, Summary, Window};

/// Completions per calendar day inside the window. Days without any
/// completion are absent.
pub async fn daily_counts(
    pool: &SqlitePool,
    user_id: Uuid,
    window: Window,
) -> Result<Vec<DailyCount>, sqlx::Error> {
    sqlx::query_as::<_, DailyCount>(
        r#"
        SELECT date(completed_at) AS date, COUNT(*) AS count
        FROM tasks
        WHERE user_id = $1 AND is_completed = 1
        AND completed_at IS NOT NULL
        AND date(completed_at) >= $2
        AND date(completed_at) <= $3
        GROUP BY date(completed_at)
        ORDER BY date
        "#,
    )
    .bind(user_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await
}

pub async fn summary(
    pool: &SqlitePool,
    user_id: Uuid,
    window: Window,
) -> Result<Summary, sqlx::Error> {
    sqlx::query_as::<_, Summary>(
        r#"
        SELECT
            COUNT(*) AS total_completed,
            MAX(completed_at) AS last_completed,
            COUNT(DISTINCT date(completed_at)) AS productive_days
        FROM tasks
        WHERE user_id = $1 AND is_completed = 1
        AND completed_at IS NOT NULL
        AND date(completed_at) >= $2
        AND date(completed_at) <= $3
        "#,
    )
    .bind(user_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_one(pool)
    .await
}

/// Aggregates the period's window and zero-fills it into a [`Report`]. The
/// best day is derived from the same grouped counts as the chart.
pub async fn build_report(
    pool: &SqlitePool,
    user_id: Uuid,
    period: ReportPeriod,
    today: NaiveDate,
) -> Result<Report, sqlx::Error> {
    let window = period.window(today);

    let counts = daily_counts(pool, user_id, window).await?;
    let summary = summary(pool, user_id, window).await?;

    Ok(assemble(period, window, &counts, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{seed_user, test_pool};
    use crate::routes::reports::{most_productive_day, MostProductiveDay};
    use chrono::{DateTime, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    async fn completed_task(pool: &SqlitePool, user_id: Uuid, completed_at: DateTime<Utc>) {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, user_id, title, due_date, is_completed, completed_at, created_at)
            VALUES ($1, $2, 'done', $3, 1, $4, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(completed_at.date_naive())
        .bind(completed_at)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn open_task(pool: &SqlitePool, user_id: Uuid) {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, user_id, title, due_date, created_at)
            VALUES ($1, $2, 'open', '2024-06-01', '2024-06-01T00:00:00+00:00')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
    }

    fn window(start: NaiveDate, end: NaiveDate) -> Window {
        Window { start, end }
    }

    #[tokio::test]
    async fn test_daily_counts_groups_by_completion_date() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "alice", "alice@example.com").await;

        completed_task(&pool, owner, at(2024, 6, 3, 8)).await;
        completed_task(&pool, owner, at(2024, 6, 3, 22)).await;
        completed_task(&pool, owner, at(2024, 6, 5, 12)).await;
        // Outside the window on either side.
        completed_task(&pool, owner, at(2024, 6, 1, 12)).await;
        completed_task(&pool, owner, at(2024, 6, 11, 0)).await;
        open_task(&pool, owner).await;

        let counts = daily_counts(&pool, owner, window(date(2024, 6, 2), date(2024, 6, 10)))
            .await
            .unwrap();

        assert_eq!(
            counts,
            vec![
                DailyCount { date: date(2024, 6, 3), count: 2 },
                DailyCount { date: date(2024, 6, 5), count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_summary_matches_daily_counts() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "alice", "alice@example.com").await;
        let w = window(date(2024, 6, 1), date(2024, 6, 7));

        completed_task(&pool, owner, at(2024, 6, 2, 9)).await;
        completed_task(&pool, owner, at(2024, 6, 2, 10)).await;
        completed_task(&pool, owner, at(2024, 6, 6, 18)).await;
        completed_task(&pool, owner, at(2024, 6, 4, 7)).await;

        let s = summary(&pool, owner, w).await.unwrap();
        let counts = daily_counts(&pool, owner, w).await.unwrap();

        assert_eq!(s.total_completed, 4);
        assert_eq!(s.last_completed, Some(at(2024, 6, 6, 18)));
        assert_eq!(s.productive_days, counts.iter().filter(|c| c.count > 0).count() as i64);
        assert_eq!(s.productive_days, 3);
    }

    #[tokio::test]
    async fn test_summary_empty_window() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "alice", "alice@example.com").await;

        let s = summary(&pool, owner, window(date(2024, 6, 1), date(2024, 6, 7)))
            .await
            .unwrap();

        assert_eq!(s.total_completed, 0);
        assert_eq!(s.last_completed, None);
        assert_eq!(s.productive_days, 0);
    }

    #[tokio::test]
    async fn test_most_productive_earliest_of_ties() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "alice", "alice@example.com").await;

        for h in 0..2 {
            completed_task(&pool, owner, at(2024, 6, 1, h)).await;
        }
        for h in 0..5 {
            completed_task(&pool, owner, at(2024, 6, 3, h)).await;
        }
        for h in 0..5 {
            completed_task(&pool, owner, at(2024, 6, 2, h)).await;
        }

        let counts = daily_counts(&pool, owner, window(date(2024, 6, 1), date(2024, 6, 3)))
            .await
            .unwrap();
        let best = most_productive_day(&counts);

        assert_eq!(best, MostProductiveDay { date: Some(date(2024, 6, 2)), count: 5 });
    }

    #[tokio::test]
    async fn test_aggregation_is_owner_scoped() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice", "alice@example.com").await;
        let bob = seed_user(&pool, "bob", "bob@example.com").await;

        completed_task(&pool, bob, at(2024, 6, 9, 12)).await;

        let report = build_report(&pool, alice, ReportPeriod::Weekly, date(2024, 6, 10))
            .await
            .unwrap();

        assert_eq!(report.summary.total_completed, 0);
        assert!(report.chart_data.iter().all(|e| e.count == 0));
        assert_eq!(report.most_productive.date, None);
    }

    #[tokio::test]
    async fn test_build_report_weekly() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "alice", "alice@example.com").await;

        completed_task(&pool, owner, at(2024, 6, 4, 12)).await;
        completed_task(&pool, owner, at(2024, 6, 10, 12)).await;
        completed_task(&pool, owner, at(2024, 6, 10, 13)).await;
        // One day before the weekly window opens.
        completed_task(&pool, owner, at(2024, 6, 3, 23)).await;

        let report = build_report(&pool, owner, ReportPeriod::Weekly, date(2024, 6, 10))
            .await
            .unwrap();

        assert_eq!(report.start_date, date(2024, 6, 4));
        assert_eq!(report.end_date, date(2024, 6, 10));
        let counts: Vec<i64> = report.chart_data.iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 0, 0, 2]);
        assert_eq!(report.summary.total_completed, 3);
        assert_eq!(report.summary.productive_days, 2);
        assert_eq!(report.most_productive.date, Some(date(2024, 6, 10)));
        assert_eq!(report.most_productive.count, 2);
    }
}
