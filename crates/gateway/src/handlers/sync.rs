//! Sync handlers
//!
//! `GET /sync` serves one sheet's records, `POST /sync` applies a single
//! create, update or delete. Any failure becomes a JSON `{ error }` body.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use brandsheet_common::{
    errors::{AppError, Result},
    metrics::RequestMetrics,
    sync::{ReadQuery, SheetSnapshot, WriteAck, WriteRequest},
};

use crate::AppState;

/// Records of the requested sheet, or the first sheet when none is named
pub async fn read(
    State(state): State<AppState>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<SheetSnapshot>> {
    let metrics = RequestMetrics::start("GET", "/sync");
    let result = state.sync.read(query.sheet.as_deref()).await;
    metrics.finish(status_of(&result));
    Ok(Json(result?))
}

/// Apply one write
pub async fn write(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WriteRequest>, JsonRejection>,
) -> Result<Json<WriteAck>> {
    let metrics = RequestMetrics::start("POST", "/sync");

    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            let err = rejection_error(rejection);
            metrics.finish(err.status_code().as_u16());
            return Err(err);
        }
    };

    // A write whose serial matched nothing is still acknowledged.
    let result = state.sync.write(request).await;
    metrics.finish(status_of(&result));
    result?;

    Ok(Json(WriteAck { success: true }))
}

/// Unparseable JSON is a format error, a body of the wrong shape a validation error
fn rejection_error(rejection: JsonRejection) -> AppError {
    let message = rejection.body_text();
    if matches!(rejection, JsonRejection::JsonSyntaxError(_)) {
        AppError::InvalidFormat { message }
    } else {
        AppError::Validation {
            message,
            field: None,
        }
    }
}

fn status_of<T>(result: &Result<T>) -> u16 {
    match result {
        Ok(_) => 200,
        Err(e) => e.status_code().as_u16(),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::router_with;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use brandsheet_common::sheets::MemorySheetStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const HEADERS: &[&str] = &["s_no", "brand_name", "slug", "Cover_text_1", "Cover_text", "tag"];

    fn brands() -> MemorySheetStore {
        MemorySheetStore::new(2).with_sheet(
            "Sheet1",
            HEADERS,
            vec![
                vec!["1", "Acme", "acme", "", "Legacy", "x,y"],
                vec!["2", "", "", "", "", ""],
            ],
        )
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post(body: Value) -> Request<Body> {
        Request::post("/sync")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_read_skips_placeholder_rows() {
        let app = router_with(brands());
        let (status, body) = send(&app, get("/sync")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sheet"], "Sheet1");
        assert_eq!(body["sheets"], json!(["Sheet1"]));

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["s_no"], "1");
        assert_eq!(data[0]["brand_name"], "Acme");
        assert_eq!(data[0]["Cover_text"], "Legacy");
        assert_eq!(data[0]["tag"], json!(["x", "y"]));
        assert_eq!(data[0]["rowIndex"], 3);
    }

    #[tokio::test]
    async fn test_read_unknown_sheet_is_500_naming_it() {
        let app = router_with(brands());
        let (status, body) = send(&app, get("/sync?sheet=Nonexistent")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Nonexistent"));
    }

    #[tokio::test]
    async fn test_update_overwrites_then_reads_back() {
        let app = router_with(brands());
        let (status, body) = send(
            &app,
            post(json!({
                "sheetName": "Sheet1",
                "data": { "s_no": "1", "brand_name": "Acme Inc", "tag": ["new"] },
                "action": "UPDATE"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (_, body) = send(&app, get("/sync?sheet=Sheet1")).await;
        let acme = &body["data"][0];
        assert_eq!(acme["brand_name"], "Acme Inc");
        assert_eq!(acme["slug"], "");
        assert_eq!(acme["tag"], json!(["new"]));
    }

    #[tokio::test]
    async fn test_create_then_delete() {
        let app = router_with(brands());
        let (status, _) = send(
            &app,
            post(json!({
                "data": { "s_no": 3, "brand_name": "Beta" },
                "action": "CREATE"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, get("/sync")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, _) = send(
            &app,
            post(json!({ "data": { "s_no": "3" }, "action": "DELETE" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, get("/sync")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_of_missing_serial_still_succeeds() {
        let app = router_with(brands());
        let (status, body) = send(
            &app,
            post(json!({ "data": { "s_no": "99" }, "action": "DELETE" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_write_to_unknown_sheet_is_500() {
        let app = router_with(brands());
        let (status, body) = send(
            &app,
            post(json!({
                "sheetName": "Missing",
                "data": { "s_no": "1" },
                "action": "CREATE"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Missing"));
    }

    #[tokio::test]
    async fn test_delete_without_serial_is_rejected() {
        let store = MemorySheetStore::new(2).with_sheet(
            "Sheet1",
            HEADERS,
            vec![
                vec!["", "Unnumbered", "", "", "", ""],
                vec!["1", "Acme", "acme", "", "", ""],
            ],
        );
        let app = router_with(store);

        let (status, body) = send(&app, post(json!({ "data": {}, "action": "DELETE" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");

        let (_, body) = send(&app, get("/sync")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"][0]["brand_name"], "Unnumbered");
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let app = router_with(brands());
        let (status, body) = send(
            &app,
            post(json!({ "data": { "s_no": "1" }, "action": "UPSERT" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = router_with(brands());
        let request = Request::post("/sync")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"action\": "))
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_JSON");
    }
}
