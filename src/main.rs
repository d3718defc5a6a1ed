mod config;
mod db;
mod error;
mod reminders;
mod routes;
mod state;


use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::reminders::{LogNotifier, Notifier, SmtpNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,task_tracker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = db::connect(&config.database_url).await?;

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => {
            tracing::warn!("SMTP_HOST not set, overdue reminders will only be logged");
            Arc::new(LogNotifier)
        }
    };
    let reminders = reminders::spawn(db.clone(), notifier, config.reminder_interval);

    let state = state::AppState {
        db: db.clone(),
        jwt_secret: config.jwt_secret.as_str().into(),
    };

    let app = routes::routes(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;

    tracing::info!("server is listening at http://{}", config.addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    reminders.abort();
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
