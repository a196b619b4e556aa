#![deny(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Supervisor and HTTP control plane for a single stream recorder worker.

pub mod adapters;
pub mod app;
pub mod common;
pub mod domain;
pub mod infra;
pub mod usecases;

#[cfg(test)]
mod test_support;

pub use app::Application;
