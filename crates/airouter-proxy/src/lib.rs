//! OpenAI-compatible front end for discovered inference backends.
//!
//! Serves `GET /v1/models` from the model registry and relays
//! `POST /v1/chat/completions` to whichever backend serves the requested
//! model, streaming the response back unchanged.
#![deny(unsafe_code)]

pub mod forward;
pub mod models;
pub mod server;

pub use server::{AppState, create_router, serve};
