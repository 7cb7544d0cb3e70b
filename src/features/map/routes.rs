use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::map::handlers;
use crate::features::map::services::MapService;

/// Public map routes (no auth)
pub fn public_routes(service: Arc<MapService>) -> Router {
    Router::new()
        .route("/api/map-data", get(handlers::list_public_points))
        .route("/api/public-stats", get(handlers::get_public_stats))
        .with_state(service)
}

/// Map editor routes (the caller applies admin auth)
pub fn admin_routes(service: Arc<MapService>) -> Router {
    Router::new()
        .route("/api/map-data", post(handlers::save_geometry))
        .route(
            "/api/map-data/{family_id}",
            get(handlers::get_family_geometry),
        )
        .route(
            "/api/map-geometry/{type}/{id}",
            delete(handlers::delete_geometry),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{lazy_pool, with_operator};

    fn server() -> TestServer {
        let service = Arc::new(MapService::new(lazy_pool()));
        TestServer::new(with_operator(admin_routes(service))).unwrap()
    }

    async fn post_geometry(geometry_type: &str, data: &str) -> Value {
        let response = server()
            .post("/api/map-data")
            .json(&json!({
                "keluarga_id": uuid::Uuid::new_v4(),
                "type": geometry_type,
                "data": data,
                "nama": "Kebun"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.json()
    }

    #[tokio::test]
    async fn test_polygon_with_two_vertices_is_rejected() {
        let body = post_geometry(
            "polygon",
            r#"[{"lat": -6.2, "lng": 106.8}, {"lat": -6.3, "lng": 106.9}]"#,
        )
        .await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_geometry_type_is_rejected() {
        let body = post_geometry("circle", r#"[{"lat": -6.2, "lng": 106.8}]"#).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_malformed_vertex_data_is_rejected() {
        post_geometry("point", "[{lat: -6.2}]").await;
        post_geometry("point", r#"[{"lat": 120, "lng": 106.8}]"#).await;
    }

    #[tokio::test]
    async fn test_delete_unknown_type_is_rejected() {
        let response = server()
            .delete(&format!("/api/map-geometry/circle/{}", uuid::Uuid::new_v4()))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
