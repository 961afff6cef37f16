//! Gym front-desk service: member registry, check-in log and petty-cash
//! ledger over a hosted table-store.
//!
//! The store is the single source of truth; this crate holds no state of
//! its own beyond the data fetched for the current operation.

pub mod config;
pub mod domain;
pub mod rest;
pub mod storage;
