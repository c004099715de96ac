//! Appointment and scheduling routes.
//!
//! ```text
//! POST   /api/appointments                 - Book a pet onto a service tier
//! GET    /api/appointments                 - Own bookings / provider's bookings / all (admin)
//! GET    /api/appointments/{id}            - Pet owner, provider or admin
//! PUT    /api/appointments/{id}            - Pet owner while pending
//! PATCH  /api/appointments/{id}/status     - Status transition
//! DELETE /api/appointments/{id}            - Pet owner or admin
//! POST   /api/appointments/{id}/schedule   - Attach the time slot
//! GET    /api/appointments/{id}/schedule   - Pet owner, provider or admin
//! ```
//!
//! Status changes follow [`AppointmentStatus::can_transition_to`]. The
//! provider confirms, rejects and completes; the pet owner cancels; an admin
//! may do any of these.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use pawgo_core::schedule;
use pawgo_core::{
    AppointmentId, AppointmentStatus, PackageTier, PetId, ScheduleKind, ServiceCategory, ServiceId,
    UserRole,
};

use super::{JsonBody, PathParam, optional, required, weight_kg};
use crate::db::appointments::{AppointmentUpdate, NewAppointment, NewSchedule};
use crate::db::{AppointmentRepository, PetRepository, ServiceRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Appointment, CurrentUser, Schedule};
use crate::services::access::{Forbidden, ensure_any_of, ensure_is, ensure_owner};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/status", patch(set_status))
        .route("/{id}/schedule", get(show_schedule).post(create_schedule))
}

// ============================================================================
// Booking
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub pet_id: PetId,
    pub service_id: ServiceId,
    pub package_tier: PackageTier,
    pub start_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub contact_phone: Option<String>,
    pub pet_type: Option<String>,
    pub pet_weight_kg: Option<Decimal>,
    #[serde(default)]
    pub redeem_points: bool,
}

fn ensure_future(start_time: DateTime<Utc>) -> Result<()> {
    if start_time <= Utc::now() {
        return Err(AppError::BadRequest("start_time must be in the future".to_owned()));
    }
    Ok(())
}

async fn load(state: &AppState, id: AppointmentId) -> Result<Appointment> {
    AppointmentRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("appointment"))
}

/// Load an appointment visible to the caller: either party, or an admin.
async fn visible(state: &AppState, user: &CurrentUser, id: AppointmentId) -> Result<Appointment> {
    let appointment = load(state, id).await?;
    ensure_any_of(
        user,
        &[appointment.owner_id, appointment.provider_id],
        "appointment",
    )?;
    Ok(appointment)
}

/// POST /api/appointments
///
/// The appointment belongs to the pet's owner. With `redeem_points`, the
/// owner's loyalty balance becomes a discount and resets to zero.
///
/// # Errors
///
/// 403 for someone else's pet, 404 for an unknown pet or service, 400 for a
/// past start time.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(req): JsonBody<BookRequest>,
) -> Result<impl IntoResponse> {
    ensure_future(req.start_time)?;
    let pet_weight_kg = weight_kg("pet_weight_kg", req.pet_weight_kg)?;

    let pet = PetRepository::new(state.pool())
        .get(req.pet_id)
        .await?
        .ok_or_else(|| AppError::not_found("pet"))?;
    ensure_owner(&user, pet.owner_id, "pet")?;

    let appointment = AppointmentRepository::new(state.pool())
        .create(
            pet.owner_id,
            &NewAppointment {
                pet_id: pet.id,
                service_id: req.service_id,
                package_tier: req.package_tier,
                start_time: req.start_time,
                notes: optional(req.notes.as_deref()),
                contact_phone: optional(req.contact_phone.as_deref()),
                pet_type: optional(req.pet_type.as_deref()),
                pet_weight_kg,
                redeem_points: req.redeem_points,
            },
        )
        .await?;

    tracing::info!(
        appointment_id = %appointment.id,
        owner_id = %appointment.owner_id,
        discount_percent = appointment.discount_percent,
        "Appointment booked"
    );

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// GET /api/appointments
///
/// # Errors
///
/// 401 without a token.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Appointment>>> {
    let repo = AppointmentRepository::new(state.pool());
    let appointments = match user.role {
        UserRole::Admin => repo.list_all().await?,
        UserRole::ServiceProvider => repo.list_for_provider(user.id).await?,
        UserRole::PetOwner => repo.list_for_owner(user.id).await?,
    };
    Ok(Json(appointments))
}

/// GET /api/appointments/{id}
///
/// # Errors
///
/// 403 unless the caller is a party or an admin.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<AppointmentId>,
) -> Result<Json<Appointment>> {
    Ok(Json(visible(&state, &user, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub start_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub contact_phone: Option<String>,
    pub pet_type: Option<String>,
    pub pet_weight_kg: Option<Decimal>,
}

/// PUT /api/appointments/{id}
///
/// # Errors
///
/// 403 unless the caller owns the booking, 409 once it has left `pending`.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<AppointmentId>,
    JsonBody(req): JsonBody<RescheduleRequest>,
) -> Result<Json<Appointment>> {
    let appointment = load(&state, id).await?;
    ensure_owner(&user, appointment.owner_id, "appointment")?;
    if let Some(start_time) = req.start_time {
        ensure_future(start_time)?;
    }
    let pet_weight_kg = weight_kg("pet_weight_kg", req.pet_weight_kg)?;

    let updated = AppointmentRepository::new(state.pool())
        .update(
            id,
            &AppointmentUpdate {
                start_time: req.start_time,
                notes: optional(req.notes.as_deref()),
                contact_phone: optional(req.contact_phone.as_deref()),
                pet_type: optional(req.pet_type.as_deref()),
                pet_weight_kg,
            },
        )
        .await?;

    Ok(Json(updated))
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: AppointmentStatus,
}

/// Check who may move `appointment` to `next`.
///
/// Strangers and parties acting outside their role get 403. A move the
/// transition table forbids is a 400.
fn authorize_status_change(
    user: &CurrentUser,
    appointment: &Appointment,
    next: AppointmentStatus,
) -> Result<()> {
    ensure_any_of(
        user,
        &[appointment.owner_id, appointment.provider_id],
        "appointment",
    )?;

    if !user.is_admin() {
        let party = match next {
            AppointmentStatus::Confirmed
            | AppointmentStatus::Rejected
            | AppointmentStatus::Completed => appointment.provider_id,
            AppointmentStatus::Cancelled => appointment.owner_id,
            AppointmentStatus::Pending => return Err(Forbidden("appointment").into()),
        };
        ensure_is(user, party, "appointment")?;
    }

    if !appointment.status.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "cannot move appointment from {} to {next}",
            appointment.status
        )));
    }
    Ok(())
}

/// PATCH /api/appointments/{id}/status
///
/// Confirming credits the tier's loyalty points to the pet owner.
///
/// # Errors
///
/// 403 for callers who may not make this move, 400 for a transition outside
/// the table, 409 if the status changed concurrently.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<AppointmentId>,
    JsonBody(req): JsonBody<StatusRequest>,
) -> Result<Json<Appointment>> {
    let appointment = load(&state, id).await?;
    authorize_status_change(&user, &appointment, req.status)?;

    let updated = AppointmentRepository::new(state.pool())
        .set_status(id, appointment.status, req.status)
        .await?;

    tracing::info!(
        appointment_id = %id,
        from = %appointment.status,
        to = %updated.status,
        by = %user.id,
        "Appointment status changed"
    );

    Ok(Json(updated))
}

/// DELETE /api/appointments/{id}
///
/// # Errors
///
/// 403 unless the caller owns the booking, 409 if it has a payment.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<AppointmentId>,
) -> Result<StatusCode> {
    let appointment = load(&state, id).await?;
    ensure_owner(&user, appointment.owner_id, "appointment")?;
    AppointmentRepository::new(state.pool()).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Schedule
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub kind: ScheduleKind,
    /// Duration label such as `overnight`, `spa`, `half_day` or `custom`.
    pub duration: String,
    pub start_time: DateTime<Utc>,
    /// Required when the label has no fixed length.
    pub end_time: Option<DateTime<Utc>>,
}

/// Check that `appointment` can take a schedule of `kind`.
///
/// The kind must match the booked service's category, and a rejected,
/// cancelled or completed booking takes no new slot.
fn ensure_schedulable(
    appointment: &Appointment,
    category: ServiceCategory,
    kind: ScheduleKind,
) -> Result<()> {
    if appointment.status.is_terminal() {
        return Err(AppError::BadRequest(format!(
            "cannot schedule a {} appointment",
            appointment.status
        )));
    }
    if category.schedule_kind() != kind {
        return Err(AppError::BadRequest(format!(
            "a {category} appointment needs a {} schedule, not {kind}",
            category.schedule_kind()
        )));
    }
    Ok(())
}

/// POST /api/appointments/{id}/schedule
///
/// # Errors
///
/// 403 unless the caller owns the booking, 400 when the kind does not match
/// the service, the booking is closed or the end time cannot be resolved,
/// 409 if a schedule already exists.
pub async fn create_schedule(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<AppointmentId>,
    JsonBody(req): JsonBody<ScheduleRequest>,
) -> Result<impl IntoResponse> {
    let appointment = load(&state, id).await?;
    ensure_owner(&user, appointment.owner_id, "appointment")?;

    let service = ServiceRepository::new(state.pool())
        .get(appointment.service_id)
        .await?
        .ok_or_else(|| AppError::not_found("service"))?;
    ensure_schedulable(&appointment, service.category, req.kind)?;

    let duration = required("duration", &req.duration)?;
    let end_time = schedule::end_time(req.kind, duration, req.start_time, req.end_time)?;

    let created = AppointmentRepository::new(state.pool())
        .create_schedule(
            id,
            &NewSchedule {
                kind: req.kind,
                duration,
                start_time: req.start_time,
                end_time,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/appointments/{id}/schedule
///
/// # Errors
///
/// 403 unless the caller is a party or an admin, 404 when unscheduled.
pub async fn show_schedule(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<AppointmentId>,
) -> Result<Json<Schedule>> {
    visible(&state, &user, id).await?;

    AppointmentRepository::new(state.pool())
        .get_schedule(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("schedule"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::response::IntoResponse;
    use pawgo_core::{Price, UserId};

    use super::*;

    const OWNER: i32 = 1;
    const PROVIDER: i32 = 2;

    fn appointment(status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: AppointmentId::new(10),
            owner_id: UserId::new(OWNER),
            pet_id: PetId::new(3),
            service_id: ServiceId::new(4),
            provider_id: UserId::new(PROVIDER),
            package_tier: PackageTier::Premium,
            start_time: now,
            status,
            price: Price::from_cents(4000),
            discount_percent: 0,
            total: Price::from_cents(4000),
            notes: None,
            contact_phone: None,
            pet_type: None,
            pet_weight_kg: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(id: i32, role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            role,
        }
    }

    fn status_of(result: Result<()>) -> StatusCode {
        result.unwrap_err().into_response().status()
    }

    #[test]
    fn test_provider_confirms_and_owner_cancels() {
        let pending = appointment(AppointmentStatus::Pending);
        let provider = user(PROVIDER, UserRole::ServiceProvider);
        let owner = user(OWNER, UserRole::PetOwner);

        assert!(authorize_status_change(&provider, &pending, AppointmentStatus::Confirmed).is_ok());
        assert!(authorize_status_change(&provider, &pending, AppointmentStatus::Rejected).is_ok());
        assert!(authorize_status_change(&owner, &pending, AppointmentStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_parties_outside_their_role_are_forbidden() {
        let pending = appointment(AppointmentStatus::Pending);
        let owner = user(OWNER, UserRole::PetOwner);

        assert_eq!(
            status_of(authorize_status_change(&owner, &pending, AppointmentStatus::Confirmed)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_strangers_are_forbidden() {
        let pending = appointment(AppointmentStatus::Pending);
        let stranger = user(99, UserRole::ServiceProvider);

        assert_eq!(
            status_of(authorize_status_change(&stranger, &pending, AppointmentStatus::Confirmed)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_transitions_outside_the_table_are_bad_requests() {
        let provider = user(PROVIDER, UserRole::ServiceProvider);
        let admin = user(50, UserRole::Admin);

        let pending = appointment(AppointmentStatus::Pending);
        assert_eq!(
            status_of(authorize_status_change(&provider, &pending, AppointmentStatus::Completed)),
            StatusCode::BAD_REQUEST
        );

        let rejected = appointment(AppointmentStatus::Rejected);
        assert_eq!(
            status_of(authorize_status_change(&admin, &rejected, AppointmentStatus::Confirmed)),
            StatusCode::BAD_REQUEST
        );
        let confirmed = appointment(AppointmentStatus::Confirmed);
        assert!(authorize_status_change(&admin, &confirmed, AppointmentStatus::Completed).is_ok());
    }

    #[test]
    fn test_owner_cannot_confirm_even_as_a_party() {
        let pending = appointment(AppointmentStatus::Pending);
        let provider = user(PROVIDER, UserRole::ServiceProvider);
        let owner = user(OWNER, UserRole::PetOwner);

        assert_eq!(
            status_of(authorize_status_change(&provider, &pending, AppointmentStatus::Cancelled)),
            StatusCode::FORBIDDEN
        );
        for next in [AppointmentStatus::Rejected, AppointmentStatus::Completed] {
            assert_eq!(
                status_of(authorize_status_change(&owner, &pending, next)),
                StatusCode::FORBIDDEN
            );
        }
        assert_eq!(
            status_of(authorize_status_change(&provider, &pending, AppointmentStatus::Pending)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_schedule_kind_must_match_service() {
        let pending = appointment(AppointmentStatus::Pending);
        assert!(ensure_schedulable(&pending, ServiceCategory::Grooming, ScheduleKind::Grooming).is_ok());
        assert!(ensure_schedulable(&pending, ServiceCategory::Boarding, ScheduleKind::Boarding).is_ok());

        let err = ensure_schedulable(&pending, ServiceCategory::Grooming, ScheduleKind::Boarding);
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
        let err = ensure_schedulable(&pending, ServiceCategory::Training, ScheduleKind::Grooming);
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_closed_appointments_take_no_schedule() {
        let confirmed = appointment(AppointmentStatus::Confirmed);
        assert!(ensure_schedulable(&confirmed, ServiceCategory::Training, ScheduleKind::Training).is_ok());

        for status in [
            AppointmentStatus::Rejected,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            let closed = appointment(status);
            assert_eq!(
                status_of(ensure_schedulable(&closed, ServiceCategory::Grooming, ScheduleKind::Grooming)),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn test_start_time_must_be_future() {
        assert!(ensure_future(Utc::now() - chrono::Duration::minutes(1)).is_err());
        assert!(ensure_future(Utc::now() + chrono::Duration::hours(1)).is_ok());
    }
}
