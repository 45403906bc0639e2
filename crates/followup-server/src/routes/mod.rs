pub mod commitments;
pub mod health;
pub mod ingest;
pub mod query;
pub mod reconcile;
pub mod risks;
