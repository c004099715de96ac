//! Pawgo Core - domain types and business rules.
//!
//! Shared by every Pawgo component:
//! - `api` - the REST backend consumed by the web client
//! - `cli` - migrations, admin bootstrap and seeding
//!
//! # Architecture
//!
//! Nothing in here touches the network or the database. The rules that decide
//! prices, loyalty accrual, schedule end times, stock reservation and card
//! acceptance are plain functions so they can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices and status enums
//! - [`loyalty`] - Loyalty point accrual and redemption discounts
//! - [`schedule`] - Duration label to end-time derivation
//! - [`inventory`] - Stock reservation checks
//! - [`card`] - Payment card validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod card;
pub mod inventory;
pub mod loyalty;
pub mod schedule;
pub mod types;

pub use types::*;
