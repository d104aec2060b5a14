//! `SeaORM` entities backing `SqliteStore`.

pub mod deletion_job;
pub mod domain_claim;
pub mod user;
