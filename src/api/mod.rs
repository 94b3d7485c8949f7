mod chain;
mod health;
pub mod models;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

/// Largest candidate chain body accepted, in bytes.
const MAX_CHAIN_BODY: usize = 8 << 20;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(MAX_CHAIN_BODY))
        .service(chain::get_chain)
        .service(
            web::scope("/api/v1")
                .service(health::health_check)
                .service(chain::submit_chain),
        );
}
