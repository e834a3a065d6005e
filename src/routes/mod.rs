use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod credit;
pub mod doc;
pub mod health;
pub mod members;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(members::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(credit::router())
        .merge(reviews::router())
}
