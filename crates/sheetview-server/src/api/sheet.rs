use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sheetview_core::{DataStatistics, FetchResult, Snapshot};

use crate::error::AppError;
use crate::AppState;

/// Request to (re)initialize the service against a spreadsheet
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequest {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

/// Request to refresh data; the sheet defaults to the configured one
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub sheet_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub initialized: bool,
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
}

/// Get the latest snapshot (empty until the first fetch)
async fn get_snapshot(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.service.snapshot().await)
}

/// Initialize and fetch. Fetch failures are reported inside the envelope.
async fn initialize(
    State(state): State<AppState>,
    payload: Result<Json<InitializeRequest>, JsonRejection>,
) -> Result<Json<FetchResult>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let result = state
        .service
        .initialize_and_fetch(&req.spreadsheet_id, &req.sheet_name)
        .await;
    Ok(Json(result))
}

/// Refresh from the initialized spreadsheet. Without a sheet name the
/// initialized sheet is read again.
async fn refresh(State(state): State<AppState>, body: Bytes) -> Result<Json<Snapshot>, AppError> {
    let req: RefreshRequest = if body.is_empty() {
        RefreshRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let sheet_name = match req.sheet_name {
        Some(name) => name,
        None => state
            .service
            .config()
            .await
            .map(|config| config.sheet_name)
            .unwrap_or_else(|| state.default_sheet.clone()),
    };
    let snapshot = state.service.fetch_default_data(&sheet_name).await?;
    Ok(Json(snapshot))
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let initialized = state.service.initialization_status().await;
    let config = state.service.config().await;
    Json(StatusResponse {
        initialized,
        spreadsheet_id: config.as_ref().map(|c| c.spreadsheet_id.clone()),
        sheet_name: config.map(|c| c.sheet_name),
    })
}

/// Counts for the latest snapshot, `null` before the first fetch
async fn statistics(State(state): State<AppState>) -> Json<Option<DataStatistics>> {
    let snapshot = state.service.snapshot().await;
    Json(state.service.data_statistics(&snapshot))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sheet", get(get_snapshot))
        .route("/api/sheet/initialize", post(initialize))
        .route("/api/sheet/refresh", post(refresh))
        .route("/api/sheet/status", get(status))
        .route("/api/sheet/statistics", get(statistics))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::service::SheetDataService;
    use crate::testing::{sample_batch, ScriptedClient};
    use crate::AppState;

    fn test_app(client: &Arc<ScriptedClient>) -> axum::Router {
        crate::app(AppState {
            service: Arc::new(SheetDataService::new(client.clone())),
            default_sheet: "DB".to_string(),
        })
    }

    async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let client = Arc::new(ScriptedClient::new(sample_batch("DB")));
        let app = test_app(&client);

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sheetLoaded"], false);
    }

    #[tokio::test]
    async fn test_initialize_then_read() {
        let client = Arc::new(ScriptedClient::new(sample_batch("DB")));
        let app = test_app(&client);

        let (_, body) = send(&app, "GET", "/api/sheet/statistics", None).await;
        assert!(body.is_null());

        let (status, body) = send(
            &app,
            "POST",
            "/api/sheet/initialize",
            Some(json!({"spreadsheetId": "sheet-123", "sheetName": "DB"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["normals"], json!(["alice", "bob"]));
        assert_eq!(body["data"]["filterPairs"], json!([["g1", "h1"], ["g4", "h4"]]));
        assert_eq!(body["data"]["metadata"]["spreadsheetId"], "sheet-123");

        let (_, body) = send(&app, "GET", "/api/sheet", None).await;
        assert_eq!(body["leaders"], json!(["lee"]));

        let (_, body) = send(&app, "GET", "/api/sheet/status", None).await;
        assert_eq!(
            body,
            json!({"initialized": true, "spreadsheetId": "sheet-123", "sheetName": "DB"})
        );

        let (_, body) = send(&app, "GET", "/api/sheet/statistics", None).await;
        assert_eq!(body, json!({"totalItems": 4, "totalPairs": 2}));
    }

    #[tokio::test]
    async fn test_initialize_failure_is_enveloped() {
        let client = Arc::new(ScriptedClient::failing("quota exceeded"));
        let app = test_app(&client);

        let (status, body) = send(
            &app,
            "POST",
            "/api/sheet/initialize",
            Some(json!({"spreadsheetId": "sheet-123", "sheetName": "DB"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "failure", "error": "quota exceeded"}));

        let (_, body) = send(&app, "GET", "/api/sheet/status", None).await;
        assert_eq!(body["initialized"], false);
        assert!(body["spreadsheetId"].is_null());
    }

    #[tokio::test]
    async fn test_initialize_rejects_bad_body() {
        let client = Arc::new(ScriptedClient::new(sample_batch("DB")));
        let app = test_app(&client);

        let (status, body) = send(
            &app,
            "POST",
            "/api/sheet/initialize",
            Some(json!({"sheetName": "DB"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_before_initialize() {
        let client = Arc::new(ScriptedClient::new(sample_batch("DB")));
        let app = test_app(&client);

        let (status, body) = send(&app, "POST", "/api/sheet/refresh", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Sheet data service has not been initialized");
    }

    #[tokio::test]
    async fn test_refresh() {
        let client = Arc::new(ScriptedClient::new(sample_batch("DB")));
        let app = test_app(&client);
        send(
            &app,
            "POST",
            "/api/sheet/initialize",
            Some(json!({"spreadsheetId": "sheet-123", "sheetName": "DB"})),
        )
        .await;

        let (status, body) = send(&app, "POST", "/api/sheet/refresh", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["normals"], json!(["alice", "bob"]));
        assert_eq!(body["metadata"]["sheetName"], "DB");

        client.respond_with(sample_batch("Archive"));
        let (status, body) = send(
            &app,
            "POST",
            "/api/sheet/refresh",
            Some(json!({"sheetName": "Archive"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["sheetName"], "Archive");
        assert_eq!(client.calls()[2].1[0], "Archive!A4:A");
    }

    #[tokio::test]
    async fn test_refresh_defaults_to_initialized_sheet() {
        let client = Arc::new(ScriptedClient::new(sample_batch("Roster")));
        let app = test_app(&client);
        let (_, body) = send(
            &app,
            "POST",
            "/api/sheet/initialize",
            Some(json!({"spreadsheetId": "sheet-123", "sheetName": "Roster"})),
        )
        .await;
        assert_eq!(body["status"], "success");

        let (status, body) = send(&app, "POST", "/api/sheet/refresh", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["sheetName"], "Roster");
        assert_eq!(body["normals"], json!(["alice", "bob"]));
        assert_eq!(client.calls()[1].1[0], "Roster!A4:A");
    }

    #[tokio::test]
    async fn test_refresh_transport_error() {
        let client = Arc::new(ScriptedClient::new(sample_batch("DB")));
        let app = test_app(&client);
        send(
            &app,
            "POST",
            "/api/sheet/initialize",
            Some(json!({"spreadsheetId": "sheet-123", "sheetName": "DB"})),
        )
        .await;

        client.fail_with("quota exceeded");
        let (status, body) = send(&app, "POST", "/api/sheet/refresh", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "quota exceeded");

        // Previous data is still served
        let (_, body) = send(&app, "GET", "/api/sheet", None).await;
        assert_eq!(body["normals"], json!(["alice", "bob"]));
    }
}
