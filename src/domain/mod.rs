//! Domain Layer - Pure business logic for artifact ingestion

pub mod catalog;
pub mod identity;
pub mod report;
pub mod severity;
