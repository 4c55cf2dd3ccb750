//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for data access.

pub mod credit_ledger;
pub mod entitlement;
pub mod material;

pub use credit_ledger::{CreditLedger, DebitOutcome, LedgerError};
pub use entitlement::{EntitlementError, EntitlementRepository};
pub use material::MaterialRepository;
