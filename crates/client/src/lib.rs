//! Client side of Farm Milk Monitor: the HTTP client for the record store,
//! the session gate and the terminal views built on the engine's
//! aggregation.

pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod local_state;
pub mod prompt;
pub mod store;
pub mod views;

#[cfg(test)]
mod testing;
