use std::sync::Arc;

use axum::{
    routing::{get, patch, put},
    Router,
};

use crate::features::families::handlers::{self, FamilyState};
use crate::features::families::services::{FamilyService, MemberService};

/// Create routes for families and their members (admin only; the caller applies auth)
pub fn routes(family_service: Arc<FamilyService>, member_service: Arc<MemberService>) -> Router {
    let state = FamilyState {
        family_service,
        member_service,
    };

    Router::new()
        .route(
            "/api/families",
            get(handlers::list_families).post(handlers::create_family),
        )
        .route(
            "/api/families/{id}",
            get(handlers::get_family)
                .put(handlers::update_family)
                .delete(handlers::delete_family),
        )
        .route(
            "/api/families/{id}/verification",
            patch(handlers::verify_family),
        )
        .route(
            "/api/families/{id}/visibility",
            patch(handlers::set_family_visibility),
        )
        .route(
            "/api/families/{id}/members",
            get(handlers::list_members).post(handlers::create_member),
        )
        .route(
            "/api/members/{id}",
            put(handlers::update_member).delete(handlers::delete_member),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{lazy_pool, with_operator};

    fn server() -> TestServer {
        let pool = lazy_pool();
        let app = routes(
            Arc::new(FamilyService::new(pool.clone())),
            Arc::new(MemberService::new(pool)),
        );
        TestServer::new(with_operator(app)).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_rejected() {
        let server = server();

        let response = server
            .get("/api/families")
            .add_query_param("status", "kaya")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_malformed_page_returns_error_envelope() {
        let server = server();

        let response = server
            .get("/api/families")
            .add_query_param("page", "abc")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert!(body["message"]
            .as_str()
            .map_or(false, |m| m.starts_with("Invalid query parameters")));
    }

    #[tokio::test]
    async fn test_create_family_rejects_invalid_payload() {
        let server = server();

        let response = server
            .post("/api/families")
            .json(&json!({
                "no_kk": "123",
                "nama_kepala_keluarga": "",
                "status_ekonomi": "miskin",
                "penghasilan_bulanan": "1000000",
                "jumlah_anggota": 3
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["errors"].as_array().map_or(false, |e| !e.is_empty()));
    }

    #[tokio::test]
    async fn test_create_family_rejects_unknown_economic_status() {
        let server = server();

        let response = server
            .post("/api/families")
            .json(&json!({
                "no_kk": "3201010101010001",
                "nama_kepala_keluarga": "Budi",
                "status_ekonomi": "kaya",
                "penghasilan_bulanan": "1000000",
                "jumlah_anggota": 3
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_member_rejects_bad_nik() {
        let server = server();

        let response = server
            .post(&format!("/api/families/{}/members", uuid::Uuid::new_v4()))
            .json(&json!({
                "nik": "12",
                "nama": "Siti",
                "jenis_kelamin": "P",
                "hubungan_keluarga": "Istri"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
