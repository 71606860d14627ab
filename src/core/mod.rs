//! Core library components.
//!
//! This module contains the reconciliation engine: configuration, value
//! realization, sealing, workflow scanning, diffing, planning and apply,
//! plus the remote API seam they run against.

pub mod apply;
pub mod config;
pub mod constants;
pub mod diff;
pub mod env;
pub mod plan;
pub mod planner;
pub mod remote;
pub mod scan;
pub mod seal;
pub mod secrets;
pub mod target;
pub mod types;
pub mod validation;
pub mod visibility;
