use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::exports::handlers;
use crate::features::exports::services::ExportService;

/// Create routes for CSV exports (admin only)
pub fn routes(service: Arc<ExportService>) -> Router {
    Router::new()
        .route(
            "/api/exports/{category}",
            get(handlers::export_families).post(handlers::export_records),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::features::families::FamilyService;
    use crate::shared::test_helpers::lazy_pool;

    fn server() -> TestServer {
        let families = Arc::new(FamilyService::new(lazy_pool()));
        TestServer::new(routes(Arc::new(ExportService::new(families)))).unwrap()
    }

    #[tokio::test]
    async fn test_post_formats_supplied_records() {
        let response = server()
            .post("/api/exports/koordinat")
            .json(&json!([
                {"no_kk": "3201010101010001", "nama_kepala_keluarga": "Budi, S.", "kota": "Bogor",
                 "latitude": -6.6, "longitude": 106.8}
            ]))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("content-type").to_str().unwrap(),
            "text/csv; charset=utf-8"
        );
        let disposition = response.header("content-disposition");
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"laporan-koordinat-"));
        assert!(disposition.ends_with(".csv\""));

        assert_eq!(
            response.text(),
            "\u{feff}No KK,Kepala Keluarga,Kota,Latitude,Longitude\r\n\
             3201010101010001,\"Budi, S.\",Bogor,-6.6,106.8\r\n"
        );
    }

    #[tokio::test]
    async fn test_post_rejects_non_object_records() {
        server()
            .post("/api/exports/wilayah")
            .json(&json!([1, 2, 3]))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_rejects_unknown_status() {
        server()
            .get("/api/exports/status-ekonomi")
            .add_query_param("status", "kaya")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
