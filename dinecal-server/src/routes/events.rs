//! Event endpoints

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use dinecal_core::{EventRecord, EventUpdate};
use serde::Serialize;
use tracing::info;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
}

/// Response from a successful delete
#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// GET /events - List every event
async fn list_events(State(state): State<AppState>) -> Json<Vec<EventRecord>> {
    Json(state.store.list().await)
}

/// POST /events - Create a new event
async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<EventRecord>, JsonRejection>,
) -> Result<Json<EventRecord>, AppError> {
    let Json(record) = payload?;

    let created = state.store.insert(record).await?;
    info!(
        "Created event {} ({})",
        created.id.as_ref().map(ToString::to_string).unwrap_or_default(),
        created.title
    );

    Ok(Json(created))
}

/// GET /events/:id - Fetch one event
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventRecord>, AppError> {
    let id = parse_id(&id)?;

    state
        .store
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PUT /events/:id - Update the fields present in the body
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EventUpdate>, JsonRejection>,
) -> Result<Json<EventRecord>, AppError> {
    let id = parse_id(&id)?;
    let Json(update) = payload?;

    let updated = state
        .store
        .update(id, update)
        .await?
        .ok_or_else(|| not_found(id))?;
    info!("Updated event {}", id);

    Ok(Json(updated))
}

/// DELETE /events/:id - Delete an event
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_id(&id)?;

    if !state.store.delete(id).await? {
        return Err(not_found(id));
    }
    info!("Deleted event {}", id);

    Ok(Json(DeleteResponse {
        message: "Event deleted".to_string(),
    }))
}

/// Ids this server hands out are integers; anything else cannot exist.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Event not found: {}", raw)))
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Event not found: {}", id))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::routes::router;
    use crate::state::AppState;

    async fn app(dir: &TempDir) -> axum::Router {
        let state = AppState::open_at(dir.path(), dir.path().join("uploads"))
            .await
            .unwrap();
        router(state)
    }

    async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn create_list_delete_round_trip() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir).await;

        let (status, created) = send(
            &app,
            json_request(
                "POST",
                "/events",
                json!({
                    "title": "Hotpot",
                    "location": "Haidilao",
                    "category": "聚餐",
                    "participants": ["Alice", "Bob"],
                    "cost_total": 320.5,
                    "rating": 4,
                    "tags": ["spicy"],
                    "notes": "",
                    "date": "2024-05-01T18:00",
                    "end_datetime": "2024-05-01T20:00",
                    "image_path": null
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["id"], json!(1));
        assert_eq!(created["category"], json!("聚餐"));

        send(
            &app,
            json_request("POST", "/events", json!({"title": "Lunch", "date": "2024-05-02T12:00"})),
        )
        .await;

        let (_, list) = send(&app, empty_request("GET", "/events")).await;
        assert_eq!(list.as_array().unwrap().len(), 2);

        let (status, body) = send(&app, empty_request("DELETE", "/events/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], json!("Event deleted"));

        let (_, list) = send(&app, empty_request("GET", "/events")).await;
        let ids: Vec<_> = list.as_array().unwrap().iter().map(|e| e["id"].clone()).collect();
        assert_eq!(ids, vec![json!(2)]);
    }

    #[tokio::test]
    async fn validation_failure_returns_detail() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir).await;

        let (status, body) = send(
            &app,
            json_request("POST", "/events", json!({"title": " ", "date": "2024-05-01T18:00"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], json!("title must not be empty"));
    }

    #[tokio::test]
    async fn malformed_body_returns_detail() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir).await;

        let (status, body) =
            send(&app, json_request("POST", "/events", json!({"location": "nowhere"}))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn body_rejections_keep_their_status() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir).await;

        let no_content_type = Request::builder()
            .method("POST")
            .uri("/events")
            .body(Body::from(
                json!({"title": "Hotpot", "date": "2024-05-01T18:00"}).to_string(),
            ))
            .unwrap();
        let (status, body) = send(&app, no_content_type).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["detail"].is_string());

        let broken = Request::builder()
            .method("PUT")
            .uri("/events/1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"rating\": "))
            .unwrap();
        let (status, body) = send(&app, broken).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let (_, list) = send(&app, empty_request("GET", "/events")).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir).await;

        let (status, body) = send(&app, empty_request("DELETE", "/events/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], json!("Event not found: 42"));

        let (status, _) = send(&app, empty_request("GET", "/events/abc")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_applies_partial_update() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir).await;

        send(
            &app,
            json_request(
                "POST",
                "/events",
                json!({"title": "Hotpot", "location": "Haidilao", "date": "2024-05-01T18:00"}),
            ),
        )
        .await;

        let (status, updated) =
            send(&app, json_request("PUT", "/events/1", json!({"rating": 5}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["rating"], json!(5));
        assert_eq!(updated["location"], json!("Haidilao"));

        let (_, fetched) = send(&app, empty_request("GET", "/events/1")).await;
        assert_eq!(fetched["rating"], json!(5));
    }
}
