//! Remote work-tracking client: domain types, wire types and the REST
//! implementation.

pub mod api_types;
pub mod client;
pub mod types;
