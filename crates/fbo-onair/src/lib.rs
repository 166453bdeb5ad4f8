//! Client for the OnAir company API.
//!
//! Fetches airport metadata and a company's FBO list, and converts them into
//! the network models used by `fbo-core` and `fbo-store`.

pub mod client;
pub mod models;

pub use client::{OnAirClient, DEFAULT_BASE_URL};
pub use models::{OaResponse, OnAirAirport, OnAirFbo};
