//! Role, tier and status enums.
//!
//! All of these are stored as Postgres enum types in the `pawgo` schema and
//! travel over JSON as `snake_case` strings.

use serde::{Deserialize, Serialize};

/// Implements `as_str`, `Display` and `FromStr` from a single label table.
macro_rules! labelled {
    ($ty:ident, $what:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire/database label.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", $what, ": {}"), s)),
                }
            }
        }
    };
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "pawgo.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Owns pets and books appointments.
    PetOwner,
    /// Lists services, products and advertisements.
    ServiceProvider,
    /// Full access, passes every ownership check.
    Admin,
}

labelled!(UserRole, "user role", {
    PetOwner => "pet_owner",
    ServiceProvider => "service_provider",
    Admin => "admin",
});

impl UserRole {
    /// Whether this role may be chosen at self-registration.
    #[must_use]
    pub const fn is_self_assignable(&self) -> bool {
        !matches!(self, Self::Admin)
    }

    /// Whether this role may list services, products and advertisements.
    #[must_use]
    pub const fn can_sell(&self) -> bool {
        matches!(self, Self::ServiceProvider | Self::Admin)
    }
}

/// Fixed package tier offered by every service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "pawgo.package_tier", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PackageTier {
    Basic,
    Premium,
    Luxury,
}

labelled!(PackageTier, "package tier", {
    Basic => "basic",
    Premium => "premium",
    Luxury => "luxury",
});

/// Kind of service a provider lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "pawgo.service_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Grooming,
    Boarding,
    Training,
}

labelled!(ServiceCategory, "service category", {
    Grooming => "grooming",
    Boarding => "boarding",
    Training => "training",
});

impl ServiceCategory {
    /// The scheduling table bookings of this category use.
    #[must_use]
    pub const fn schedule_kind(&self) -> ScheduleKind {
        match self {
            Self::Grooming => ScheduleKind::Grooming,
            Self::Boarding => ScheduleKind::Boarding,
            Self::Training => ScheduleKind::Training,
        }
    }
}

/// Appointment lifecycle.
///
/// ```text
/// pending ──► confirmed ──► completed
///    │            │
///    ├──► rejected └──► cancelled
///    └──► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "pawgo.appointment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

labelled!(AppointmentStatus, "appointment status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Rejected => "rejected",
    Cancelled => "cancelled",
    Completed => "completed",
});

impl AppointmentStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Rejected | Self::Cancelled)
                | (Self::Confirmed, Self::Completed | Self::Cancelled)
        )
    }

    /// No further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled | Self::Completed)
    }

    /// Loyalty points are credited exactly once, when a booking is confirmed.
    #[must_use]
    pub const fn awards_loyalty(&self, next: Self) -> bool {
        matches!((self, next), (Self::Pending, Self::Confirmed))
    }

    /// Whether a payment may still be taken for an appointment in this state.
    #[must_use]
    pub const fn is_payable(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Completed)
    }
}

/// Which scheduling table an appointment's time slot uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "pawgo.schedule_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Boarding,
    Grooming,
    Training,
}

labelled!(ScheduleKind, "schedule kind", {
    Boarding => "boarding",
    Grooming => "grooming",
    Training => "training",
});

/// Payment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "pawgo.payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
    Failed,
}

labelled!(PaymentStatus, "payment status", {
    Pending => "pending",
    Paid => "paid",
    Refunded => "refunded",
    Failed => "failed",
});

/// Marketplace order state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "pawgo.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

labelled!(OrderStatus, "order status", {
    Pending => "pending",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Shipped | Self::Cancelled) | (Self::Shipped, Self::Delivered)
        )
    }

    /// Cancelling puts the ordered quantity back on the shelf.
    #[must_use]
    pub const fn restocks(&self, next: Self) -> bool {
        matches!((self, next), (Self::Pending, Self::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appointment_transition_table() {
        use AppointmentStatus::{Cancelled, Completed, Confirmed, Pending, Rejected};

        let allowed = [
            (Pending, Confirmed),
            (Pending, Rejected),
            (Pending, Cancelled),
            (Confirmed, Completed),
            (Confirmed, Cancelled),
        ];

        for from in AppointmentStatus::ALL {
            for to in AppointmentStatus::ALL {
                let expected = allowed.contains(&(*from, *to));
                assert_eq!(
                    from.can_transition_to(*to),
                    expected,
                    "{from} -> {to} should be {expected}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for from in AppointmentStatus::ALL.iter().filter(|s| s.is_terminal()) {
            assert!(
                AppointmentStatus::ALL
                    .iter()
                    .all(|to| !from.can_transition_to(*to))
            );
        }
    }

    #[test]
    fn test_only_confirmation_awards_loyalty() {
        for from in AppointmentStatus::ALL {
            for to in AppointmentStatus::ALL {
                let expected =
                    *from == AppointmentStatus::Pending && *to == AppointmentStatus::Confirmed;
                assert_eq!(from.awards_loyalty(*to), expected);
            }
        }
    }

    #[test]
    fn test_order_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::Pending.restocks(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.restocks(OrderStatus::Delivered));
    }

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>(), Ok(*role));
        }
        assert!("superuser".parse::<UserRole>().is_err());
        assert_eq!("luxury".parse::<PackageTier>(), Ok(PackageTier::Luxury));
    }

    #[test]
    fn test_each_category_has_its_own_schedule_kind() {
        for category in ServiceCategory::ALL {
            assert_eq!(category.schedule_kind().as_str(), category.as_str());
        }
    }

    #[test]
    fn test_admin_is_not_self_assignable() {
        assert!(UserRole::PetOwner.is_self_assignable());
        assert!(UserRole::ServiceProvider.is_self_assignable());
        assert!(!UserRole::Admin.is_self_assignable());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&UserRole::ServiceProvider).unwrap_or_default();
        assert_eq!(json, "\"service_provider\"");
    }
}
