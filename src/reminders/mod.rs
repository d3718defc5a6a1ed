pub mod notifier;

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::routes::tasks::model::OverdueTask;
use crate::routes::tasks::queries::find_all_overdue;
pub use notifier::{LogNotifier, Notifier, NotifyError, SmtpNotifier};

pub const REMINDER_SUBJECT: &str = "Task Reminder: Overdue Task";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub found: usize,
    pub sent: usize,
    pub failed: usize,
}

pub fn reminder_body(task: &OverdueTask) -> String {
    let description = if task.description.trim().is_empty() {
        "No description"
    } else {
        task.description.as_str()
    };

    format!(
        "Hello {},\n\n\
         You have an overdue task that needs your attention:\n\n\
         {}\n\
         Description: {}\n\
         Due Date: {}\n\n\
         Please complete this task as soon as possible to stay on track with your productivity goals!\n\n\
         Best regards,\n\
         Task Tracker\n",
        task.username,
        task.title,
        description,
        task.due_date.format("%Y-%m-%d"),
    )
}

/// Sends one reminder per incomplete task due before `as_of`.
///
/// A failed delivery is logged and counted; the rest of the sweep continues.
/// Tasks are only read, never modified.
pub async fn run_sweep(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    as_of: NaiveDate,
) -> Result<SweepReport, sqlx::Error> {
    let overdue = find_all_overdue(pool, as_of).await?;

    let mut report = SweepReport {
        found: overdue.len(),
        ..SweepReport::default()
    };

    for task in &overdue {
        match notifier
            .send(&task.email, REMINDER_SUBJECT, &reminder_body(task))
            .await
        {
            Ok(()) => {
                report.sent += 1;
                tracing::debug!(task_id = %task.id, recipient = %task.email, "reminder sent");
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!(task_id = %task.id, recipient = %task.email, "reminder failed: {}", e);
            }
        }
    }

    Ok(report)
}

/// Runs [`run_sweep`] every `every`, starting one period from now.
pub fn spawn(pool: SqlitePool, notifier: Arc<dyn Notifier>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let today = Utc::now().date_naive();
            tracing::info!(%today, "running overdue task check");

            match run_sweep(&pool, notifier.as_ref(), today).await {
                Ok(report) => tracing::info!(
                    found = report.found,
                    sent = report.sent,
                    failed = report.failed,
                    "overdue task check finished"
                ),
                Err(e) => tracing::error!("error fetching overdue tasks: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{seed_user, test_pool};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records deliveries and fails for one chosen recipient.
    struct Recording {
        fail_for: Option<String>,
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl Recording {
        fn new(fail_for: Option<&str>) -> Self {
            Self {
                fail_for: fail_for.map(str::to_string),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for Recording {
        async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
            if self.fail_for.as_deref() == Some(recipient) {
                // An unparsable mailbox stands in for a relay failure.
                return Err(NotifyError::Address(
                    "not an address".parse::<lettre::Address>().unwrap_err(),
                ));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn insert_task(pool: &SqlitePool, user_id: Uuid, title: &str, description: &str, due: &str) {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, user_id, title, description, due_date, created_at)
            VALUES ($1, $2, $3, $4, $5, '2024-06-01T00:00:00+00:00')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(due)
        .execute(pool)
        .await
        .unwrap();
    }

    #[test]
    fn test_reminder_body_placeholder() {
        let task = OverdueTask {
            id: Uuid::new_v4(),
            title: "File taxes".into(),
            description: String::new(),
            due_date: date(2024, 6, 9),
            username: "alice".into(),
            email: "alice@example.com".into(),
        };

        let body = reminder_body(&task);
        assert!(body.starts_with("Hello alice,"));
        assert!(body.contains("File taxes"));
        assert!(body.contains("Description: No description"));
        assert!(body.contains("Due Date: 2024-06-09"));
    }

    #[tokio::test]
    async fn test_sweep_only_notifies_past_due() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice", "alice@example.com").await;

        insert_task(&pool, alice, "late", "overdue one", "2024-06-09").await;
        insert_task(&pool, alice, "upcoming", "", "2024-06-11").await;
        insert_task(&pool, alice, "due today", "", "2024-06-10").await;

        let notifier = Recording::new(None);
        let report = run_sweep(&pool, &notifier, date(2024, 6, 10)).await.unwrap();

        assert_eq!(report, SweepReport { found: 1, sent: 1, failed: 0 });
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "alice@example.com");
        assert_eq!(sent[0].1, REMINDER_SUBJECT);
        assert!(sent[0].2.contains("late"));
        assert!(sent[0].2.contains("Description: overdue one"));
    }

    #[tokio::test]
    async fn test_sweep_isolates_failures() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice", "alice@example.com").await;
        let bob = seed_user(&pool, "bob", "bob@example.com").await;

        insert_task(&pool, bob, "bob first", "", "2024-06-01").await;
        insert_task(&pool, alice, "alice second", "", "2024-06-02").await;
        insert_task(&pool, bob, "bob third", "", "2024-06-03").await;

        let notifier = Recording::new(Some("bob@example.com"));
        let report = run_sweep(&pool, &notifier, date(2024, 6, 10)).await.unwrap();

        assert_eq!(report, SweepReport { found: 3, sent: 1, failed: 2 });
        assert_eq!(notifier.sent.lock().unwrap()[0].0, "alice@example.com");
    }

    #[tokio::test]
    async fn test_sweep_renotifies_and_does_not_mutate() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice", "alice@example.com").await;
        insert_task(&pool, alice, "late", "", "2024-06-09").await;

        let notifier = Recording::new(None);
        run_sweep(&pool, &notifier, date(2024, 6, 10)).await.unwrap();
        run_sweep(&pool, &notifier, date(2024, 6, 10)).await.unwrap();

        assert_eq!(notifier.sent.lock().unwrap().len(), 2);

        let completed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE is_completed = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(completed, 0);
    }
}
