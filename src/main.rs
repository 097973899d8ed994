//! feedback-cycles worker
//!
//! Loads configuration, connects to PostgreSQL, applies migrations and runs
//! the periodic broadcast check until interrupted.

use std::error::Error;
use std::sync::Arc;

use tracing::{error, info, warn};

use feedback_cycles::adapters::postgres::{
    PostgresBroadcastLedger, PostgresCycleRepository, PostgresDirectory,
    PostgresEnrollmentRepository, PostgresFormRepository,
};
use feedback_cycles::adapters::LoggingNotifier;
use feedback_cycles::application::{
    CheckAndSendCommand, CheckAndSendHandler, CheckAndSendOutcome, NotificationSettings,
    PhaseService,
};
use feedback_cycles::config::AppConfig;
use feedback_cycles::domain::cycle::PhaseClock;
use feedback_cycles::domain::foundation::Timestamp;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt().with_env_filter(config.log_filter()?);
    if config.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(
        homebase = %config.cycle.homebase_location,
        notifications = config.notification.enabled,
        "Starting feedback-cycles"
    );

    let pool = config.database.pool_options().connect(&config.database.url).await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Migrations applied");
    }

    let phases = Arc::new(PhaseService::new(
        Arc::new(PostgresCycleRepository::new(pool.clone())),
        PhaseClock::new(config.cycle.zones()?),
        config.cycle.selection(),
        config.cycle.display_policy()?,
    ));
    let form_repository = Arc::new(PostgresFormRepository::new(pool.clone()));
    let handler = CheckAndSendHandler::new(
        phases,
        Arc::new(PostgresBroadcastLedger::new(pool.clone())),
        Arc::new(PostgresDirectory::new(pool.clone())),
        Arc::new(PostgresEnrollmentRepository::new(pool.clone())),
        form_repository,
        Arc::new(LoggingNotifier::new()),
        NotificationSettings::from_config(&config.notification)?,
    );

    let Some(period) = config.notification.check_interval() else {
        warn!("Periodic check disabled, nothing to run");
        return Ok(());
    };

    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => run_check(&handler).await,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    pool.close().await;
    Ok(())
}

async fn run_check(handler: &CheckAndSendHandler) {
    let cmd = CheckAndSendCommand {
        cycle_id: None,
        code: None,
        force: false,
        now: Timestamp::now(),
    };
    match handler.handle(cmd).await {
        Ok(CheckAndSendOutcome::Sent { cycle_name, code, recipients, .. }) => {
            info!(cycle = %cycle_name, code = %code, recipients, "Periodic check sent broadcast");
        }
        Ok(CheckAndSendOutcome::Skipped(reason)) => {
            info!(reason = ?reason, "Periodic check sent nothing");
        }
        Err(e) => error!(error = %e, "Periodic check failed"),
    }
}
