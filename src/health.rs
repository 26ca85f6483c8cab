use crate::contract;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// `GET /` - service banner, also doubles as a liveness probe.
pub async fn service_banner() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Comedy Transcription API",
        "status": "running"
    }))
}

/// `GET /health` - status plus the counters collected since startup.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let metrics = state.get_metrics_snapshot();
    let config = state.get_config();
    let uptime_seconds = state.get_uptime_seconds();

    let mut endpoint_stats = Vec::new();
    for (endpoint, metric) in metrics.endpoint_metrics.iter() {
        endpoint_stats.push(json!({
            "endpoint": endpoint,
            "request_count": metric.request_count,
            "error_count": metric.error_count,
            "average_duration_ms": if metric.request_count > 0 {
                metric.total_duration_ms as f64 / metric.request_count as f64
            } else {
                0.0
            }
        }));
    }

    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds,
        "service": {
            "name": "comedy-transcription",
            "version": env!("CARGO_PKG_VERSION"),
            "contract_version": contract::VERSION,
            "host": config.server.host,
            "port": config.server.port
        },
        "metrics": {
            "total_requests": metrics.request_count,
            "total_errors": metrics.error_count,
            "error_rate": if metrics.request_count > 0 {
                metrics.error_count as f64 / metrics.request_count as f64
            } else {
                0.0
            },
            "inflight_transcriptions": metrics.inflight_transcriptions,
            "transcriptions_completed": metrics.transcriptions_completed,
            "transcriptions_failed": metrics.transcriptions_failed
        },
        "endpoints": endpoint_stats,
        "engine": {
            "endpoint": config.engine.endpoint,
            "description": state.transcriber().describe()
        },
        "upload_limits": {
            "max_file_size_mb": config.upload.max_file_size_mb,
            "allowed_extensions": config.upload.allowed_extensions
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::contract::AudioClip;
    use crate::transcriber::{Transcript, Transcriber};
    use actix_web::{test, App};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NullTranscriber;

    #[async_trait]
    impl Transcriber for NullTranscriber {
        fn describe(&self) -> String {
            "null engine".to_string()
        }

        async fn transcribe(&self, _clip: &AudioClip) -> anyhow::Result<Transcript> {
            Ok(Transcript {
                text: String::new(),
                language: "unknown".to_string(),
            })
        }
    }

    fn state() -> AppState {
        AppState::new(AppConfig::default(), Arc::new(NullTranscriber))
    }

    #[actix_web::test]
    async fn test_banner_matches_published_shape() {
        let app = test::init_service(
            App::new().route("/", web::get().to(service_banner)),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Comedy Transcription API");
        assert_eq!(body["status"], "running");
    }

    #[actix_web::test]
    async fn test_health_reports_counters_and_engine() {
        let state = state();
        state.record_request("POST /api/transcribe", 40, true);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/health", web::get().to(health_check)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"]["contract_version"], "v1");
        assert_eq!(body["metrics"]["total_requests"], 1);
        assert_eq!(body["metrics"]["total_errors"], 1);
        assert_eq!(body["engine"]["description"], "null engine");
        assert_eq!(body["upload_limits"]["max_file_size_mb"], 25);

        let endpoints = body["endpoints"].as_array().unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0]["endpoint"], "POST /api/transcribe");
    }
}
