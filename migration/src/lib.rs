//! Database migrations for the SAM API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_12_01_100000_create_credit_balances;
mod m2025_12_01_100100_create_feature_flags;
mod m2025_12_01_100200_create_user_features;
mod m2025_12_01_100300_create_generated_materials;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_12_01_100000_create_credit_balances::Migration),
            Box::new(m2025_12_01_100100_create_feature_flags::Migration),
            Box::new(m2025_12_01_100200_create_user_features::Migration),
            Box::new(m2025_12_01_100300_create_generated_materials::Migration),
        ]
    }
}
