pub mod transcribe;

pub use transcribe::*;

use actix_web::web;

use crate::contract;
use crate::health;

/// Route table shared by the server binary and the service tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::service_banner))
        .route("/health", web::get().to(health::health_check))
        .route(
            contract::TRANSCRIBE_PATH,
            web::post().to(transcribe::transcribe_audio),
        );
}
