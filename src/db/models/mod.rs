//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by repositories to return query results
//! and accept insertion/update data.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: Each model struct matches a database table schema
//! - **SQLx Integration**: Response models derive `sqlx::FromRow` for query results
//! - **Separation**: Database models are distinct from API models to allow
//!   independent evolution of storage and API representations
//!
//! # Modules
//!
//! - [`users`]: User accounts and profiles
//! - [`branches`]: Branch master records
//! - [`masters`]: Master-data items
//! - [`applications`]: Service applications
//! - [`registrations`]: Vehicle registrations
//! - [`fancy_numbers`]: Fancy-number bookings
//! - [`cash_register`]: Cash-register entries
//! - [`activity_logs`]: Audit trail entries

pub mod activity_logs;
pub mod applications;
pub mod branches;
pub mod cash_register;
pub mod fancy_numbers;
pub mod masters;
pub mod registrations;
pub mod users;
