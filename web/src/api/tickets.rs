//! Ticket endpoints: primary purchase, resale lifecycle and admin
//! assignment.
//!
//! - `POST /api/tickets/purchase` - buy tickets (requires auth)
//! - `GET /api/tickets` - list own tickets
//! - `GET /api/tickets/resale` - all resale listings (admin)
//! - `GET /api/tickets/:id` - ticket details (owner or admin)
//! - `DELETE /api/tickets/:id` - delete a ticket (admin escape hatch)
//! - `POST /api/tickets/:id/resale` - list for resale (owner)
//! - `DELETE /api/tickets/:id/resale` - cancel a listing (owner)
//! - `POST /api/tickets/:id/purchase-resale` - buy a listed ticket
//! - `POST /api/tickets/:id/assign` - assign to a waitlist entry (admin)

use super::TicketResponse;
use crate::auth::{AuthUser, RequireAdmin};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use eventease_core::types::{PaymentMethod, TicketCategory, TicketId, WaitlistEntryId};
use eventease_core::user::UserRole;
use eventease_core::TicketingError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to purchase tickets.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// Event to buy tickets for.
    pub event_id: Uuid,
    /// Tier to buy in.
    pub category: TicketCategory,
    /// Number of tickets.
    pub quantity: u32,
    /// `"wallet"` or `"card"`; anything else is rejected with
    /// `INVALID_PAYMENT_METHOD`.
    pub payment_method: String,
}

/// Response after a successful purchase.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    /// Success message.
    pub message: String,
    /// The created tickets.
    pub tickets: Vec<TicketResponse>,
}

/// Request to list a ticket for resale.
#[derive(Debug, Deserialize)]
pub struct ListForResaleRequest {
    /// Asking price.
    pub price: u64,
    /// Optional reason shown to the admin.
    pub reason: Option<String>,
}

/// Request to assign a listed ticket to a waitlist entry.
#[derive(Debug, Deserialize)]
pub struct AssignTicketRequest {
    /// The waitlist entry whose user receives the ticket.
    pub waitlist_entry_id: Uuid,
}

// ============================================================================
// Handlers
// ============================================================================

fn parse_payment_method(token: &str) -> Result<PaymentMethod, TicketingError> {
    match token {
        "wallet" => Ok(PaymentMethod::Wallet),
        "card" => Ok(PaymentMethod::Card),
        other => Err(TicketingError::InvalidPaymentMethod {
            method: other.to_string(),
        }),
    }
}

/// POST /api/tickets/purchase
pub async fn purchase_tickets(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(request): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), AppError> {
    let payment_method = parse_payment_method(&request.payment_method)?;
    let tickets = state
        .purchase
        .purchase(
            eventease_core::types::EventId::from_uuid(request.event_id),
            request.category,
            request.quantity,
            payment_method,
            identity.user_id,
        )
        .await?;

    let count = tickets.len();
    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            message: format!("{count} ticket(s) purchased successfully"),
            tickets: tickets.into_iter().map(TicketResponse::from).collect(),
        }),
    ))
}

/// GET /api/tickets
pub async fn list_my_tickets(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<TicketResponse>>, AppError> {
    let tickets = state
        .repository
        .list_tickets_for_user(identity.user_id)
        .await?;
    Ok(Json(tickets.into_iter().map(TicketResponse::from).collect()))
}

/// GET /api/tickets/resale
pub async fn list_resale_tickets(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<TicketResponse>>, AppError> {
    let tickets = state.resale.list_resale_tickets().await?;
    Ok(Json(tickets.into_iter().map(TicketResponse::from).collect()))
}

/// GET /api/tickets/:id
pub async fn get_ticket(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = state.repository.get_ticket(TicketId::from_uuid(id)).await?;
    if ticket.owner_id != identity.user_id && identity.role != UserRole::Admin {
        return Err(AppError::forbidden("Not your ticket"));
    }
    Ok(Json(ticket.into()))
}

/// DELETE /api/tickets/:id
pub async fn delete_ticket(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.repository.delete_ticket(TicketId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tickets/:id/resale
pub async fn list_for_resale(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ListForResaleRequest>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = state
        .resale
        .list_for_resale(
            TicketId::from_uuid(id),
            request.price,
            request.reason,
            identity.user_id,
        )
        .await?;
    Ok(Json(ticket.into()))
}

/// DELETE /api/tickets/:id/resale
pub async fn cancel_resale_listing(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = state
        .resale
        .cancel_listing(TicketId::from_uuid(id), identity.user_id)
        .await?;
    Ok(Json(ticket.into()))
}

/// POST /api/tickets/:id/purchase-resale
pub async fn purchase_resale_ticket(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = state
        .resale
        .purchase_resale_ticket(TicketId::from_uuid(id), identity.user_id)
        .await?;
    Ok(Json(ticket.into()))
}

/// POST /api/tickets/:id/assign
pub async fn assign_ticket(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignTicketRequest>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = state
        .waitlist
        .assign_resale_ticket(
            TicketId::from_uuid(id),
            WaitlistEntryId::from_uuid(request.waitlist_entry_id),
        )
        .await?;
    Ok(Json(ticket.into()))
}
