//! Seeding functionality for initial data

pub mod feature_flag;

pub use feature_flag::seed_feature_flags;
