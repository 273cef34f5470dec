//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern and most implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//! - Uses the connection's transaction for ACID guarantees
//!
//! # Available Repositories
//!
//! - [`Users`]: User account management and authentication
//! - [`Branches`]: Branch master records
//! - [`Masters`]: Master-data items across the seven categories
//! - [`Applications`]: Service applications (create/read plus the advance increment)
//! - [`Registrations`]: Vehicle registrations and number allotment
//! - [`FancyNumbers`]: Fancy-number bookings and auction resolution
//! - [`CashRegister`]: Cash-register entries with application reconciliation
//! - [`ActivityLogs`]: Append-only audit trail
//!
//! # Common Pattern
//!
//! All repositories follow this usage pattern:
//!
//! ```ignore
//! use mvdesk::db::handlers::{Users, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     // Start a transaction
//!     let mut tx = pool.begin().await?;
//!
//!     // Create repository from transaction
//!     let mut repo = Users::new(&mut tx);
//!
//!     // Perform operations
//!     let users = repo.list(&Default::default()).await?;
//!
//!     // Commit or rollback
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod activity_logs;
pub mod applications;
pub mod branches;
pub mod cash_register;
pub mod fancy_numbers;
pub mod masters;
pub mod registrations;
pub mod repository;
pub mod users;

pub use activity_logs::ActivityLogs;
pub use applications::Applications;
pub use branches::Branches;
pub use cash_register::CashRegister;
pub use fancy_numbers::FancyNumbers;
pub use masters::Masters;
pub use registrations::Registrations;
pub use repository::Repository;
pub use users::Users;

pub use activity_logs::ActivityLogFilter;
pub use applications::ApplicationFilter;
pub use branches::BranchFilter;
pub use cash_register::CashEntryFilter;
pub use fancy_numbers::{FancyNumberFilter, ResolveOutcome};
pub use masters::MasterItemFilter;
pub use registrations::{AllotOutcome, RegistrationFilter};
pub use users::UserFilter;
