//! Redemption service entry point.
//!
//! Loads configuration from the environment, connects PostgreSQL and Redis,
//! then serves the redemption API and runs the periodic cleanup sweep.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use redemption_service::adapters::cache::RedisGroupCache;
use redemption_service::adapters::http::{redemption_router, RedemptionAppState};
use redemption_service::adapters::postgres::{
    PgTransactionProvider, PostgresAuditLog, PostgresQuotaLedger, PostgresRedemptionRepository,
    PostgresSubscriptionProvisioner,
};
use redemption_service::application::{
    CleanupRedemptionsCommand, CleanupRedemptionsHandler, RedeemCodeHandler,
};
use redemption_service::config::AppConfig;
use redemption_service::domain::foundation::Timestamp;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    info!(
        environment = ?config.server.environment,
        "Starting redemption service"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn = time::timeout(
        config.redis.timeout(),
        redis_client.get_multiplexed_async_connection(),
    )
    .await??;

    let redeem_handler = RedeemCodeHandler::new(
        Arc::new(PgTransactionProvider::new(pool.clone())),
        Arc::new(PostgresSubscriptionProvisioner::new()),
        Arc::new(PostgresQuotaLedger::new()),
        Arc::new(RedisGroupCache::new(
            redis_conn,
            config.redis.group_cache_ttl_secs,
        )),
        Arc::new(PostgresAuditLog::new(pool.clone())),
    )
    .with_max_jitter(config.redemption.max_jitter());

    if let Some(period) = config.redemption.cleanup_interval() {
        let cleanup = CleanupRedemptionsHandler::new(Arc::new(
            PostgresRedemptionRepository::new(pool.clone()),
        ));
        tokio::spawn(run_cleanup(cleanup, period));
    }

    let app = redemption_router()
        .with_state(RedemptionAppState::new(redeem_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.server.request_timeout())),
        );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).pretty().init();
    }
}

/// Sweeps codes that can no longer be redeemed, once per `period`.
///
/// A failed sweep is logged and retried on the next tick.
async fn run_cleanup(handler: CleanupRedemptionsHandler, period: Duration) {
    let mut interval = time::interval(period);
    loop {
        interval.tick().await;
        let cmd = CleanupRedemptionsCommand {
            now: Timestamp::now(),
        };
        if let Err(e) = handler.handle(cmd).await {
            error!(error = %e, "Redemption cleanup sweep failed");
        }
    }
}
