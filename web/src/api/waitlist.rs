//! Waitlist endpoints.
//!
//! - `POST /api/waitlist` - join a category waitlist (requires auth)
//! - `GET /api/waitlist` - list own waitlist entries
//! - `GET /api/events/:id/waitlist` - full event waitlist, FIFO (admin)

use crate::auth::{AuthUser, RequireAdmin};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use eventease_core::types::{EventId, TicketCategory};
use eventease_core::waitlist::WaitlistEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to join a waitlist.
#[derive(Debug, Deserialize)]
pub struct JoinWaitlistRequest {
    /// Event to wait for.
    pub event_id: Uuid,
    /// Tier to wait for.
    pub category: TicketCategory,
}

/// Wire representation of a waitlist entry.
#[derive(Debug, Serialize)]
pub struct WaitlistEntryResponse {
    /// Entry id.
    pub id: Uuid,
    /// Event waited on.
    pub event_id: Uuid,
    /// Waiting user.
    pub user_id: Uuid,
    /// Tier waited on.
    pub category: String,
    /// When the user joined; orders the queue.
    pub joined_at: DateTime<Utc>,
}

impl From<WaitlistEntry> for WaitlistEntryResponse {
    fn from(entry: WaitlistEntry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            event_id: *entry.event_id.as_uuid(),
            user_id: *entry.user_id.as_uuid(),
            category: entry.category.as_str().to_string(),
            joined_at: entry.joined_at,
        }
    }
}

/// POST /api/waitlist
pub async fn join_waitlist(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(request): Json<JoinWaitlistRequest>,
) -> Result<(StatusCode, Json<WaitlistEntryResponse>), AppError> {
    let entry = state
        .waitlist
        .join_waitlist(
            EventId::from_uuid(request.event_id),
            request.category,
            identity.user_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// GET /api/waitlist
pub async fn list_my_waitlist(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<WaitlistEntryResponse>>, AppError> {
    let entries = state
        .waitlist
        .list_waitlist_for_user(identity.user_id)
        .await?;
    Ok(Json(
        entries.into_iter().map(WaitlistEntryResponse::from).collect(),
    ))
}

/// GET /api/events/:id/waitlist
pub async fn list_event_waitlist(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<WaitlistEntryResponse>>, AppError> {
    let entries = state
        .waitlist
        .list_waitlist_for_event(EventId::from_uuid(id))
        .await?;
    Ok(Json(
        entries.into_iter().map(WaitlistEntryResponse::from).collect(),
    ))
}
