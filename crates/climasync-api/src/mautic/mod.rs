// Mautic REST API client.
//
// `client` owns transport mechanics (auth, URL building, response
// handling); `endpoints` adds the pairwise action calls on top.

pub mod client;
mod endpoints;
pub mod types;

pub use client::{MauticClient, search, where_eq};
pub use types::{Endpoint, RecordSet};
