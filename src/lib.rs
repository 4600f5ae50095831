//! nadri — a command-line companion for Korean day trips.
//!
//! The interesting part of this crate is the data-access layer: a
//! cache-aside repository that reconciles cache freshness, network
//! reachability, and upstream API health, degrading to bundled sample
//! data when the tourism service is unhealthy and refusing writes while
//! fabricated content is on screen.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod presentation;
pub mod state;
