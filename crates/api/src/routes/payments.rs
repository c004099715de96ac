//! Payment routes.
//!
//! ```text
//! POST   /api/payments              - Pay for an appointment you booked
//! GET    /api/payments              - Own payments (admin: all)
//! GET    /api/payments/{id}         - Payer or admin
//! PATCH  /api/payments/{id}/status  - Admin
//! DELETE /api/payments/{id}         - Admin
//! ```
//!
//! There is no gateway: a card that passes validation is recorded as paid.
//! Only its brand, last four digits and keyed fingerprint are stored.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::Utc;
use serde::Deserialize;

use pawgo_core::card::CardDetails;
use pawgo_core::{AppointmentId, PaymentId, PaymentStatus};

use super::{JsonBody, PathParam};
use crate::db::payments::NewPayment;
use crate::db::{AppointmentRepository, PaymentRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::Payment;
use crate::services::access::ensure_owner;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).delete(remove))
        .route("/{id}/status", patch(set_status))
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub appointment_id: AppointmentId,
    pub card: CardDetails,
}

/// POST /api/payments
///
/// # Errors
///
/// 403 unless the caller booked the appointment, 400 for a cancelled or
/// rejected appointment or an invalid card, 409 if it is already paid.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(req): JsonBody<PaymentRequest>,
) -> Result<impl IntoResponse> {
    let appointment = AppointmentRepository::new(state.pool())
        .get(req.appointment_id)
        .await?
        .ok_or_else(|| AppError::not_found("appointment"))?;
    ensure_owner(&user, appointment.owner_id, "appointment")?;

    if !appointment.status.is_payable() {
        return Err(AppError::BadRequest(format!(
            "a {} appointment cannot be paid",
            appointment.status
        )));
    }

    let card = req.card.validate(Utc::now().date_naive())?;
    let fingerprint = state.fingerprinter().fingerprint(&card);

    let payment = PaymentRepository::new(state.pool())
        .create(
            user.id,
            &NewPayment {
                appointment_id: appointment.id,
                amount: appointment.total,
                status: PaymentStatus::Paid,
                card_brand: card.brand().as_str(),
                card_last4: card.last4(),
                card_fingerprint: &fingerprint,
                holder_name: card.holder_name(),
            },
        )
        .await?;

    tracing::info!(
        payment_id = %payment.id,
        appointment_id = %appointment.id,
        amount = %payment.amount,
        brand = card.brand().as_str(),
        "Payment recorded"
    );

    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /api/payments
///
/// # Errors
///
/// 401 without a token.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Payment>>> {
    let repo = PaymentRepository::new(state.pool());
    let payments = if user.is_admin() {
        repo.list_all().await?
    } else {
        repo.list_for_payer(user.id).await?
    };
    Ok(Json(payments))
}

/// GET /api/payments/{id}
///
/// # Errors
///
/// 403 unless the caller made the payment or is an admin.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<PaymentId>,
) -> Result<Json<Payment>> {
    let payment = PaymentRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("payment"))?;
    ensure_owner(&user, payment.payer_id, "payment")?;

    Ok(Json(payment))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: PaymentStatus,
}

/// PATCH /api/payments/{id}/status
///
/// # Errors
///
/// 403 for non-admins, 404 if unknown.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<PaymentId>,
    JsonBody(req): JsonBody<StatusRequest>,
) -> Result<Json<Payment>> {
    let payment = PaymentRepository::new(state.pool())
        .set_status(id, req.status)
        .await?;

    tracing::info!(payment_id = %id, status = %req.status, admin_id = %admin.id, "Payment status set");

    Ok(Json(payment))
}

/// DELETE /api/payments/{id}
///
/// # Errors
///
/// 403 for non-admins, 404 if unknown.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<PaymentId>,
) -> Result<StatusCode> {
    PaymentRepository::new(state.pool()).delete(id).await?;
    tracing::info!(payment_id = %id, admin_id = %admin.id, "Payment deleted");

    Ok(StatusCode::NO_CONTENT)
}
