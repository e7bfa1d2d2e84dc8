//! API handlers for the MedCare backend.
//!
//! `auth` owns the verification flow; `health` and `root` are the
//! operational endpoints.

pub mod auth;
pub mod health;
pub mod root;
