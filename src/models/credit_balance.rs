//! Credit balance entity model
//!
//! This module contains the SeaORM entity model for the credit_balances
//! table, which holds the remaining generation credits per user. The
//! balance is mutated exclusively through the credit ledger repository's
//! single-statement conditional updates.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Per-user credit balance
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_balances")]
pub struct Model {
    /// Owning user (primary key, external auth identity)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,

    /// Remaining credits, never negative
    pub balance: i64,

    /// Timestamp when the row was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp of the last balance mutation
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
