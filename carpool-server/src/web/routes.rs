//! HTTP route handlers.

use std::sync::Arc;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Utc;
use tower_http::services::ServeDir;
use tracing::info;

use crate::backend::{BookingDto, BookingUpdate, LocationFilter, UserPatch, UserProfile};
use crate::domain::{Coordinate, LocationRecord, Place};
use crate::geocode::{Geocoder, display_label};
use crate::link::resolve_and_build_link;
use crate::planner::{RideRequest, plan_ride, validate_ride_request};
use crate::scheduler::SystemClock;
use crate::store::{CoordinateStore, SessionContext, SessionId, StoreError};

use super::dto::*;
use super::error::AppError;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/session/:id", get(get_session).delete(delete_session))
        .route("/api/session/:id/start", put(set_start))
        .route("/api/session/:id/end", put(set_end))
        .route("/api/rides/request", post(request_ride))
        .route("/api/rides/plan", post(plan_ride_handler))
        .route("/api/bookings", post(create_booking).get(booking_history))
        .route("/api/bookings/:id", get(get_booking).put(update_booking))
        .route(
            "/api/users/:id",
            get(get_user)
                .put(update_user)
                .patch(patch_user)
                .delete(delete_user),
        )
        .route("/api/links", post(build_link))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page with the trip form.
async fn index_page() -> IndexTemplate {
    IndexTemplate
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        ErrorTemplate {
            title: "Not found".to_string(),
            message: "That page does not exist.".to_string(),
        },
    )
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn parse_session(id: &str) -> Result<SessionId, AppError> {
    Ok(SessionId::parse(id)?)
}

/// Run blocking store IO on the blocking thread pool.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&CoordinateStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("store task failed: {e}"),
        })?
        .map_err(AppError::from)
}

async fn load_session(state: &AppState, id: SessionId) -> Result<SessionContext, AppError> {
    with_store(state, move |store| SessionContext::load(store, id)).await
}

async fn save_session(state: &AppState, ctx: SessionContext) -> Result<SessionContext, AppError> {
    with_store(state, move |store| ctx.save(store).map(|()| ctx)).await
}

async fn clear_session(state: &AppState, mut ctx: SessionContext) -> Result<(), AppError> {
    with_store(state, move |store| ctx.clear(store)).await
}

/// Resolve a place to a coordinate and a display label.
///
/// Addresses that cannot be geocoded are rejected; a failed reverse lookup
/// only costs the label.
async fn resolve_place(state: &AppState, place: &Place) -> Result<(Coordinate, String), AppError> {
    match place {
        Place::Coordinate(coordinate) => {
            let address = state.geocoder.reverse_geocode(*coordinate).await;
            Ok((*coordinate, display_label(*coordinate, &address)))
        }
        Place::Address(address) => {
            let coordinate =
                state
                    .geocoder
                    .geocode(address)
                    .await
                    .ok_or_else(|| AppError::Unprocessable {
                        message: format!("could not find address: {address}"),
                    })?;
            Ok((coordinate, address.clone()))
        }
    }
}

async fn endpoint(state: &AppState, coordinate: Option<Coordinate>) -> Option<EndpointResult> {
    let coordinate = coordinate?;
    let address = state.geocoder.reverse_geocode(coordinate).await;
    Some(EndpointResult {
        coordinate,
        label: display_label(coordinate, &address),
    })
}

async fn session_response(state: &AppState, ctx: SessionContext) -> SessionResponse {
    let (start, end) = futures::join!(endpoint(state, ctx.start), endpoint(state, ctx.end));
    SessionResponse {
        session_id: ctx.id.to_string(),
        start,
        end,
        selected_passengers: ctx.selected_passengers,
    }
}

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let ctx = load_session(&state, parse_session(&id)?).await?;
    Ok(Json(session_response(&state, ctx).await))
}

/// Forget a session, e.g. when the user navigates away.
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ctx = SessionContext::new(parse_session(&id)?);
    clear_session(&state, ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Clone, Copy)]
enum Endpoint {
    Start,
    End,
}

async fn set_endpoint(
    state: AppState,
    id: String,
    req: SetPlaceRequest,
    which: Endpoint,
) -> Result<Json<SessionResponse>, AppError> {
    let session = parse_session(&id)?;
    let (coordinate, _) = resolve_place(&state, &req.place).await?;

    let mut ctx = load_session(&state, session).await?;
    match which {
        Endpoint::Start => ctx.start = Some(coordinate),
        Endpoint::End => ctx.end = Some(coordinate),
    }
    // Any earlier plan was made for different endpoints.
    ctx.clear_plan();
    let ctx = save_session(&state, ctx).await?;

    Ok(Json(session_response(&state, ctx).await))
}

async fn set_start(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetPlaceRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    set_endpoint(state, id, req, Endpoint::Start).await
}

async fn set_end(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetPlaceRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    set_endpoint(state, id, req, Endpoint::End).await
}

// ----------------------------------------------------------------------------
// Rides
// ----------------------------------------------------------------------------

/// Store a rider's request once its route is known to be drivable.
async fn request_ride(
    State(state): State<AppState>,
    Json(req): Json<RideRequestBody>,
) -> Result<(StatusCode, Json<RideRequestResponse>), AppError> {
    let ((start, pickup_address), (end, dropoff_address)) = futures::try_join!(
        resolve_place(&state, &req.pickup),
        resolve_place(&state, &req.dropoff)
    )?;

    let record = LocationRecord {
        user_id: req.user_id,
        start,
        end,
        pickup_address,
        dropoff_address,
        requested_at: req.requested_at.unwrap_or_else(Utc::now),
    };

    // Unreachable trips are rejected here and never reach the backend.
    let route = validate_ride_request(state.directions.as_ref(), &record, &state.config.retry).await?;
    let location = state.backend.create_location(&record).await?;

    info!(user = %record.user_id, "Stored ride request");

    Ok((
        StatusCode::CREATED,
        Json(RideRequestResponse {
            location,
            duration_secs: route.total_duration_secs(),
            distance_meters: route.total_distance_meters(),
        }),
    ))
}

/// Plan a ride from the session's endpoints and remember the pickups.
async fn plan_ride_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PlanRideRequest>,
) -> Result<Response, AppError> {
    let mut ctx = load_session(&state, parse_session(&req.session_id)?).await?;

    let mut request = RideRequest::from_session(&ctx)?;
    request.anchor = req.anchor;
    request.mode = req.mode;

    let candidates = state.backend.list_locations(&LocationFilter::default()).await?;
    let plan = plan_ride(
        state.directions.as_ref(),
        &request,
        &candidates,
        &state.config,
        &SystemClock,
    )
    .await?;

    ctx.selected_passengers = plan.passenger_selections();
    ctx.planned_trip = Some(plan.planned_trip());
    save_session(&state, ctx).await?;

    // Return HTML or JSON based on Accept header
    if accepts_html(&headers) {
        let template = PlanResultsTemplate {
            plan: PlanView::from_plan(&plan),
        };
        let html = template.render().map_err(|e| AppError::Internal {
            message: format!("Template error: {e}"),
        })?;

        Ok(Html(html).into_response())
    } else {
        Ok(Json(PlanRideResponse::from_plan(&plan)).into_response())
    }
}

// ----------------------------------------------------------------------------
// Bookings
// ----------------------------------------------------------------------------

/// Book the session's selected passengers on its planned route, then reset
/// the session.
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingDto>), AppError> {
    let ctx = load_session(&state, parse_session(&req.session_id)?).await?;

    let Some(trip) = ctx.planned_trip.as_ref() else {
        return Err(AppError::bad_request("no ride planned"));
    };
    if ctx.selected_passengers.is_empty() {
        return Err(AppError::bad_request("no passengers selected"));
    }

    let booking = state
        .backend
        .create_booking(&req.to_booking(trip, &ctx.selected_passengers))
        .await?;
    clear_session(&state, ctx).await?;

    info!(
        booking = booking.id,
        passengers = booking.passengers.len(),
        "Created booking"
    );

    Ok((StatusCode::CREATED, Json(booking)))
}

async fn booking_history(
    State(state): State<AppState>,
    Query(query): Query<BookingHistoryQuery>,
) -> Result<Json<BookingHistoryResponse>, AppError> {
    let bookings = state.backend.list_bookings(query.user_id).await?;
    Ok(Json(BookingHistoryResponse { bookings }))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<BookingDto>, AppError> {
    Ok(Json(state.backend.get_booking(id).await?))
}

async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(update): Json<BookingUpdate>,
) -> Result<Json<BookingDto>, AppError> {
    let booking = state.backend.update_booking(id, &update).await?;
    info!(booking = id, "Updated booking");
    Ok(Json(booking))
}

// ----------------------------------------------------------------------------
// Users
// ----------------------------------------------------------------------------

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.backend.get_user(id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<UserProfile>, AppError> {
    if profile.id != id {
        return Err(AppError::bad_request(format!(
            "profile id {} does not match user {id}",
            profile.id
        )));
    }
    Ok(Json(state.backend.update_user(&profile).await?))
}

async fn patch_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.backend.patch_user(id, &patch).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.backend.delete_user(id).await?;
    info!(user = id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Links
// ----------------------------------------------------------------------------

async fn build_link(
    State(state): State<AppState>,
    Json(req): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let url = resolve_and_build_link(
        state.geocoder.as_ref(),
        &req.origin,
        &req.destination,
        &req.waypoints,
    )
    .await?;
    Ok(Json(LinkResponse { url }))
}
