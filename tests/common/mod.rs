//! Integration test common infrastructure.
//!
//! Provides a loopback server, a wrapper around the connection under test,
//! and TLS certificate generation.
//!
//! Each test binary uses a different subset of these helpers.

#![allow(dead_code)]

pub mod client;
pub mod server;
pub mod tls;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::{Peer, TestServer};
