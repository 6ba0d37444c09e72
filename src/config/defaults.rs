//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Transport Defaults
// =============================================================================

pub fn default_socks_port() -> u16 {
    1080
}

pub fn default_tls_ciphers() -> String {
    "DEFAULT".to_string()
}

pub fn default_connect_timeout() -> u64 {
    30
}

// =============================================================================
// Flood Control Defaults
// =============================================================================

pub fn default_flood_penalty() -> f64 {
    2.0
}

pub fn default_flood_threshold() -> f64 {
    10.0
}

// =============================================================================
// Client Defaults
// =============================================================================

pub fn default_event_queue_size() -> usize {
    1024
}
