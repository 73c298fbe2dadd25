//! Documentation for adscout that is not tied to one crate.

pub mod api;
pub mod overview;
pub mod testing;
