//! Termination Policy - Decides when a practice conversation may end
//!
//! This crate implements the ending rules for simulated counseling sessions:
//! a minimum number of student turns, coverage of core interviewing
//! techniques, and an explicit two-phase suggest/confirm protocol, with a
//! mutual-intent fast path and a stateless legacy check.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
