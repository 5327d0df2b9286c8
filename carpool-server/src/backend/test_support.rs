//! A stand-in backend served on a random local port.

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

/// CSRF token and session cookie the stand-in accepts.
pub const TOKEN: &str = "tok";
pub const SESSION: &str = "sess";

fn authorized(headers: &HeaderMap) -> bool {
    let cookie = format!("csrftoken={TOKEN}; sessionid={SESSION}");
    headers.get("x-csrftoken").is_some_and(|v| v == TOKEN)
        && headers
            .get("cookie")
            .is_some_and(|v| v == cookie.as_str())
}

fn booking_json(id: u64, body: &Value) -> Value {
    json!({
        "id": id,
        "driver": body.get("driver").cloned().unwrap_or(json!(1)),
        "passengers": body.get("passengers").cloned().unwrap_or(json!([])),
        "route_link": body.get("route_link").cloned().unwrap_or(json!("")),
        "departure_time": body.get("departure_time").cloned().unwrap_or(Value::Null),
        "arrival_time": body.get("arrival_time").cloned().unwrap_or(Value::Null),
        "created_at": null
    })
}

fn user_json(id: u64) -> Value {
    json!({
        "id": id,
        "username": "rider",
        "email": "rider@example.test",
        "first_name": "Ria",
        "last_name": "Der",
        "phone_number": null
    })
}

async fn booking_create(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(booking_json(1, &body)))
}

async fn booking_detail(headers: HeaderMap, Path(id): Path<u64>) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::FORBIDDEN);
    }
    if id == 404 {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(booking_json(id, &json!({}))))
}

async fn booking_put(Path(id): Path<u64>, Json(body): Json<Value>) -> Json<Value> {
    Json(booking_json(id, &body))
}

async fn user_detail(Path(id): Path<u64>) -> Json<Value> {
    Json(user_json(id))
}

async fn user_put(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

/// Rejects bodies carrying anything but the one field being changed.
async fn user_patch(Path(id): Path<u64>, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    let fields = body.as_object().map(|o| o.len()).unwrap_or_default();
    if fields != 1 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut user = user_json(id);
    user["phone_number"] = body["phone_number"].clone();
    Ok(Json(user))
}

async fn user_delete(Path(id): Path<u64>) -> StatusCode {
    if id == 500 {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::NO_CONTENT
    }
}

/// Serve the stand-in and return its API base URL.
pub async fn stand_in_backend() -> String {
    let app = Router::new()
        .route("/api/bookings/", post(booking_create))
        .route("/api/bookings/:id/", get(booking_detail).put(booking_put))
        .route(
            "/api/users/:id/",
            get(user_detail)
                .put(user_put)
                .patch(user_patch)
                .delete(user_delete),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/api")
}
