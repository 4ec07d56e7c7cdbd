use actix_web::{HttpResponse, get, web};

use crate::error::ApiError;
use crate::status::StatusAggregator;

/// Current status of every target, in registry order
#[get("/api/status")]
pub async fn status_route(
    aggregator: web::Data<StatusAggregator>,
) -> Result<HttpResponse, ApiError> {
    let summary = aggregator.summarize().await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};

    use crate::database::{MemoryStore, ObservationStore};
    use crate::monitoring::types::{NewObservation, ProbeOutcome};
    use crate::registry::{Target, TargetRegistry};
    use crate::routes::routes;
    use crate::status::StatusAggregator;

    fn aggregator(store: Arc<MemoryStore>) -> web::Data<StatusAggregator> {
        let registry = Arc::new(
            TargetRegistry::new(vec![Target::new("a", "Site A", "The first site", "https://a")]).unwrap(),
        );
        web::Data::new(StatusAggregator::new(registry, store))
    }

    #[actix_web::test]
    async fn empty_store_reports_every_target_up() {
        let store = Arc::new(MemoryStore::new());
        let app = test::init_service(App::new().app_data(aggregator(store)).configure(routes)).await;

        let req = test::TestRequest::get().uri("/api/status").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            json!([{
                "id": "a",
                "name": "Site A",
                "description": "The first site",
                "url": "https://a",
                "isUp": true,
                "latency": 0,
                "uptime": 100,
                "history": [],
            }])
        );
    }

    #[actix_web::test]
    async fn history_echoes_raw_records() {
        let store = Arc::new(MemoryStore::new());
        store
            .append(&NewObservation::new("https://a", ProbeOutcome::Failure, Utc::now() - Duration::minutes(1)))
            .await
            .unwrap();
        let app = test::init_service(App::new().app_data(aggregator(store)).configure(routes)).await;

        let req = test::TestRequest::get().uri("/api/status").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let site = &body[0];
        assert_eq!(site["isUp"], json!(false));
        assert_eq!(site["latency"], json!(-1));
        assert_eq!(site["uptime"], json!(0));

        let record = &site["history"][0];
        assert_eq!(record["status"], json!(-1));
        assert_eq!(record["url"], json!("https://a"));
        assert!(record["timestamp"].as_str().is_some_and(|ts| ts.ends_with('Z')));
    }

    #[actix_web::test]
    async fn store_failure_returns_error_body() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let app = test::init_service(App::new().app_data(aggregator(store)).configure(routes)).await;

        let req = test::TestRequest::get().uri("/api/status").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }

    #[actix_web::test]
    async fn health_is_ok() {
        let store = Arc::new(MemoryStore::new());
        let app = test::init_service(App::new().app_data(aggregator(store)).configure(routes)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
