//! Background purge of orders that were never paid, plus expired token bookkeeping.

use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::time::{self, MissedTickBehavior};

use crate::{
    config::OrderSweepConfig,
    db::OrmConn,
    services::{auth_service, order_service},
};

/// Runs one sweep and logs the outcome. Errors are logged, never propagated.
pub async fn sweep_once(orm: &OrmConn, config: &OrderSweepConfig) -> u64 {
    let max_age = Duration::minutes(config.expiry_minutes);
    match order_service::purge_expired_orders(orm, Utc::now(), max_age).await {
        Ok(0) => {
            tracing::debug!("no expired orders");
            0
        }
        Ok(count) => {
            tracing::info!(count, "purged expired orders");
            count
        }
        Err(err) => {
            tracing::error!(error = %err, "order sweep failed");
            0
        }
    }
}

/// Drops revocations and refresh tokens that have expired on their own.
pub async fn sweep_tokens_once(orm: &OrmConn) -> u64 {
    match auth_service::purge_expired_tokens(orm, Utc::now()).await {
        Ok(count) => {
            if count > 0 {
                tracing::info!(count, "purged expired tokens");
            }
            count
        }
        Err(err) => {
            tracing::error!(error = %err, "token sweep failed");
            0
        }
    }
}

/// Spawns the periodic sweep on the current runtime.
pub fn start_order_sweeper(orm: OrmConn, config: OrderSweepConfig) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            expiry_minutes = config.expiry_minutes,
            interval_secs = config.interval_secs,
            "order sweeper started"
        );
        let mut interval = time::interval(StdDuration::from_secs(config.interval_secs.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            sweep_once(&orm, &config).await;
            sweep_tokens_once(&orm).await;
        }
    })
}
