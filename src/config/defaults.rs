//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "chatd".to_string()
}

pub fn default_nickname_prefix() -> String {
    "AnonymousUser".to_string()
}

// =============================================================================
// Listener Defaults
// =============================================================================

pub fn default_listen_address() -> std::net::SocketAddr {
    std::net::SocketAddr::from(([0, 0, 0, 0], 3333))
}

// =============================================================================
// Liveness Defaults
// =============================================================================

pub fn default_liveness_interval_ms() -> u64 {
    3000
}

// =============================================================================
// Limits Defaults
// =============================================================================

pub fn default_outbound_queue() -> usize {
    256
}
