//! SaintsHub daily content API.
//!
//! Scrapes a daily Bible verse and a daily sermon quote with a headless
//! browser, caches each for 24 hours in Redis, and serves them over HTTP
//! alongside object-storage listings for a music library.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod music;
pub mod refresh;
pub mod scrapers;
pub mod server;
