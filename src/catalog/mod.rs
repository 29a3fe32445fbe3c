//! Read-only projections over the infrastructure catalog schema.
//!
//! The aggregators join normalized relational rows into the nested objects
//! the HTTP surface serves: a single `Endpoint` with its location and open
//! ports, and named collections of endpoints per domain or organization.

pub mod lookup;
pub mod model;
mod resolve;

pub use lookup::LookupLists;
pub use model::{DomainData, Endpoint, Location, OpenPort, OrgData};
