//! FortiOS Core
//!
//! Core library of the FortiOS configuration provider: typed values, field
//! descriptor tables, the generic field mapper and the provider contract.

pub mod differ;
pub mod mapper;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod transform;
