//! # vip-bot
//!
//! Composition root: loads configuration, connects the membership store,
//! builds the signed affiliate client behind its verification cache, wires
//! the service layer, and runs the event loop until shutdown.

pub mod gateway;

use std::sync::Arc;
use tracing::{error, info, warn};

use vip_affiliate::{AffiliateClient, AffiliateClientConfig, CachedLookup};
use vip_common::{AppConfig, AppError, AppResult};
use vip_db::{
    create_pool, DatabaseConfig, PgLookupCacheRepository, PgMemberRepository, PgMetaRepository,
    PgTrackedAccountRepository, MIGRATOR,
};
use vip_service::{
    AdminCommands, AdmissionController, EventRouter, GateSettings, LifecycleScheduler,
    ReportingAggregator, ServiceContext,
};

use gateway::ConsoleGateway;

/// Build the full engine and run it until the event source closes or the
/// process receives a shutdown signal.
pub async fn run(config: AppConfig) -> AppResult<()> {
    // Membership store: the single durable store; refusing to start without
    // it beats running with amnesia
    let db_config = DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..DatabaseConfig::default()
    };
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Storage(format!("connect: {e}")))?;
    MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| AppError::Storage(format!("migrate: {e}")))?;
    info!("membership store ready");

    let member_repo = Arc::new(PgMemberRepository::new(pool.clone()));
    let tracked_repo = Arc::new(PgTrackedAccountRepository::new(pool.clone()));
    let cache_repo = Arc::new(PgLookupCacheRepository::new(pool.clone()));
    let meta_repo = Arc::new(PgMetaRepository::new(pool));

    // Signed client behind the verification cache
    let client = AffiliateClient::new(AffiliateClientConfig {
        base_url: config.affiliate.base_url.clone(),
        api_key: config.affiliate.api_key.clone(),
        api_secret: config.affiliate.api_secret.clone(),
        passphrase: config.affiliate.passphrase.clone(),
    })?;
    let lookup = Arc::new(CachedLookup::new(
        client,
        cache_repo,
        config.affiliate.cache_ttl_seconds,
    ));

    let platform = Arc::new(ConsoleGateway::new());
    let ctx = Arc::new(ServiceContext::new(
        member_repo,
        tracked_repo,
        meta_repo,
        lookup,
        platform,
        GateSettings::from(&config),
    ));

    let scheduler = LifecycleScheduler::new(Arc::clone(&ctx));
    let armed = scheduler
        .rearm_all()
        .await
        .map_err(AppError::internal)?;
    info!(checkpoints = armed, "lifecycle scheduler armed");

    let aggregator = ReportingAggregator::new(Arc::clone(&ctx));
    tokio::spawn(aggregator.run_forever());

    let admission = Arc::new(AdmissionController::new(Arc::clone(&ctx), scheduler));
    let admin = Arc::new(AdminCommands::new(Arc::clone(&ctx)));
    let router = Arc::new(EventRouter::new(admission, admin));

    let mut events = gateway::spawn_stdin_events();
    info!("engine running; reading gateway events");

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    warn!("event source closed");
                    break;
                };
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(e) = router.handle(event).await {
                        error!(error = %e, "event handling failed");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
