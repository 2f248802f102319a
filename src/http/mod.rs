// src/http/mod.rs
//
// HTTP module for the pre-signed URL fetch path

pub mod client;

pub use client::{build_client, get_range, HttpClientConfig};
