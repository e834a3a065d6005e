use std::sync::Arc;

use crate::{
    config::JwtConfig,
    db::{DbPool, OrmConn},
    gateway::PaymentGateway,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub jwt: Arc<JwtConfig>,
    pub gateway: Arc<dyn PaymentGateway>,
    /// Public gateway key handed to the checkout widget.
    pub checkout_key: Arc<str>,
}

impl AppState {
    pub fn new(orm: OrmConn, jwt: JwtConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            pool: crate::db::shared_pool(&orm),
            orm,
            jwt: Arc::new(jwt),
            gateway,
            checkout_key: Arc::from(""),
        }
    }

    pub fn with_checkout_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.checkout_key = key.into();
        self
    }
}
