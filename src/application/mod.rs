// Application layer - chart use cases
pub mod chart_repository;
pub mod chart_service;
#[cfg(test)]
pub mod fake_source;
pub mod streaming_service;
pub mod view_store;
