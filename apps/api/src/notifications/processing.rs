//! Scheduled alert job. One failing user never stops the run; errors are
//! logged and counted in the summary.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::inventory::repo::{list_in_stock, users_with_stock};
use crate::notifications::alerts::{generate_alerts, DrinkingWindowAlert};
use crate::notifications::email::{render_digest, EmailSender};
use crate::notifications::preferences::NotificationPreferences;
use crate::notifications::repo;

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ProcessingSummary {
    pub users_scanned: usize,
    pub users_processed: usize,
    pub users_skipped: usize,
    pub notifications_created: usize,
    pub emails_sent: usize,
    pub email_failures: usize,
    pub errors: usize,
}

#[derive(Debug, PartialEq)]
enum EmailOutcome {
    NotSent,
    Sent,
    Failed,
}

#[derive(Debug, PartialEq)]
enum UserOutcome {
    Skipped,
    Processed { created: usize, email: EmailOutcome },
}

impl ProcessingSummary {
    fn record(&mut self, outcome: Result<UserOutcome, AppError>, user_id: Uuid) {
        match outcome {
            Ok(UserOutcome::Skipped) => self.users_skipped += 1,
            Ok(UserOutcome::Processed { created, email }) => {
                self.users_processed += 1;
                self.notifications_created += created;
                match email {
                    EmailOutcome::Sent => self.emails_sent += 1,
                    EmailOutcome::Failed => self.email_failures += 1,
                    EmailOutcome::NotSent => {}
                }
            }
            Err(e) => {
                error!("Alert processing failed for user {user_id}: {e}");
                self.errors += 1;
            }
        }
    }
}

pub struct JobContext<'a> {
    pub db: &'a PgPool,
    pub email: &'a dyn EmailSender,
    pub app_base_url: &'a str,
    pub today: NaiveDate,
    pub now: NaiveTime,
}

/// Sends the digest for newly created alerts. A failure leaves the stored
/// notifications in place.
async fn deliver_digest(
    ctx: &JobContext<'_>,
    user_id: Uuid,
    prefs: &NotificationPreferences,
    address: Option<&str>,
    alerts: &[DrinkingWindowAlert],
) -> EmailOutcome {
    if alerts.is_empty() || !prefs.email_enabled || !ctx.email.is_configured() {
        return EmailOutcome::NotSent;
    }
    let Some(address) = address else {
        debug!("User {user_id} has email digests on but no address on file");
        return EmailOutcome::NotSent;
    };
    if prefs.is_quiet_at(ctx.now) {
        debug!("Quiet hours for user {user_id}; digest not sent");
        return EmailOutcome::NotSent;
    }

    let message = render_digest(address, alerts, ctx.app_base_url);
    match ctx.email.send(&message).await {
        Ok(()) => EmailOutcome::Sent,
        Err(e) => {
            warn!("Digest email to user {user_id} failed: {e}");
            EmailOutcome::Failed
        }
    }
}

async fn process_user(ctx: &JobContext<'_>, user_id: Uuid) -> Result<UserOutcome, AppError> {
    let (prefs_row, wines) = tokio::try_join!(
        repo::get_preferences(ctx.db, user_id),
        list_in_stock(ctx.db, user_id),
    )?;
    let address = prefs_row.as_ref().and_then(|r| r.email.clone());
    let prefs: NotificationPreferences = prefs_row.map(Into::into).unwrap_or_default();

    if !prefs.drinking_window_alerts {
        return Ok(UserOutcome::Skipped);
    }

    let alerts = generate_alerts(&wines, ctx.today);
    if alerts.is_empty() {
        return Ok(UserOutcome::Processed {
            created: 0,
            email: EmailOutcome::NotSent,
        });
    }

    let created = repo::insert_alerts(
        ctx.db,
        user_id,
        &alerts,
        prefs.frequency.repeat_after_days(),
    )
    .await?;

    let fresh: Vec<DrinkingWindowAlert> = alerts
        .into_iter()
        .filter(|a| created.iter().any(|n| n.wine_id == Some(a.wine_id)))
        .collect();
    let email = deliver_digest(ctx, user_id, &prefs, address.as_deref(), &fresh).await;

    Ok(UserOutcome::Processed {
        created: created.len(),
        email,
    })
}

pub async fn process_all(ctx: &JobContext<'_>) -> Result<ProcessingSummary, AppError> {
    let users = users_with_stock(ctx.db).await?;
    let mut summary = ProcessingSummary {
        users_scanned: users.len(),
        ..Default::default()
    };

    for user_id in users {
        let outcome = process_user(ctx, user_id).await;
        summary.record(outcome, user_id);
    }

    info!(
        "Alert run finished: {} users, {} notifications, {} emails, {} errors",
        summary.users_scanned, summary.notifications_created, summary.emails_sent, summary.errors
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::email::{EmailError, EmailMessage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingSender {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
            if self.fail {
                return Err(EmailError::Api {
                    status: 500,
                    message: "down".into(),
                });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn alert() -> DrinkingWindowAlert {
        use crate::notifications::alerts::{AlertKind, Urgency};
        DrinkingWindowAlert {
            wine_id: Uuid::new_v4(),
            wine_name: "Barolo".into(),
            kind: AlertKind::LeavingPeak,
            urgency: Urgency::High,
            days: 5,
            title: "Barolo is leaving its peak".into(),
            message: "Soon".into(),
        }
    }

    fn ctx<'a>(db: &'a PgPool, email: &'a dyn EmailSender) -> JobContext<'a> {
        JobContext {
            db,
            email,
            app_base_url: "https://pourtrait.app",
            today: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            now: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        }
    }

    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap()
    }

    #[tokio::test]
    async fn test_digest_sent_when_enabled() {
        let db = lazy_pool();
        let sender = RecordingSender {
            sent: Mutex::new(vec![]),
            fail: false,
        };
        let prefs = NotificationPreferences {
            email_enabled: true,
            ..Default::default()
        };
        let a = alert();
        let outcome =
            deliver_digest(&ctx(&db, &sender), Uuid::new_v4(), &prefs, Some("me@example.com"), &[a.clone()])
                .await;
        assert_eq!(outcome, EmailOutcome::Sent);
        assert_eq!(sender.sent.lock().unwrap()[0].to, "me@example.com");
    }

    #[tokio::test]
    async fn test_digest_failure_reported_not_raised() {
        let db = lazy_pool();
        let sender = RecordingSender {
            sent: Mutex::new(vec![]),
            fail: true,
        };
        let prefs = NotificationPreferences {
            email_enabled: true,
            ..Default::default()
        };
        let a = alert();
        let outcome =
            deliver_digest(&ctx(&db, &sender), Uuid::new_v4(), &prefs, Some("me@example.com"), &[a.clone()])
                .await;
        assert_eq!(outcome, EmailOutcome::Failed);
    }

    #[tokio::test]
    async fn test_digest_skipped_without_opt_in_or_address() {
        let db = lazy_pool();
        let sender = RecordingSender {
            sent: Mutex::new(vec![]),
            fail: false,
        };
        let a = alert();
        let off = NotificationPreferences::default();
        let on = NotificationPreferences {
            email_enabled: true,
            ..Default::default()
        };
        let c = ctx(&db, &sender);
        let user = Uuid::new_v4();
        assert_eq!(
            deliver_digest(&c, user, &off, Some("me@example.com"), &[a.clone()]).await,
            EmailOutcome::NotSent
        );
        assert_eq!(deliver_digest(&c, user, &on, None, &[a.clone()]).await, EmailOutcome::NotSent);
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_summary_counts_errors_and_continues() {
        let mut summary = ProcessingSummary::default();
        let user = Uuid::new_v4();
        summary.record(Ok(UserOutcome::Skipped), user);
        summary.record(
            Ok(UserOutcome::Processed {
                created: 2,
                email: EmailOutcome::Failed,
            }),
            user,
        );
        summary.record(Err(AppError::NotFound("x".into())), user);
        summary.record(
            Ok(UserOutcome::Processed {
                created: 1,
                email: EmailOutcome::Sent,
            }),
            user,
        );
        assert_eq!(summary.users_skipped, 1);
        assert_eq!(summary.users_processed, 2);
        assert_eq!(summary.notifications_created, 3);
        assert_eq!(summary.emails_sent, 1);
        assert_eq!(summary.email_failures, 1);
        assert_eq!(summary.errors, 1);
    }
}
