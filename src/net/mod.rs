//! Network-facing pipeline stages: station association and the raw HTTP fetch.

pub mod connectivity;
pub mod fetcher;
