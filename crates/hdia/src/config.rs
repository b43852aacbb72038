// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node runtime configuration
//!
//! Wire constants live in [`crate::protocol::constants`]; this module holds
//! the runtime knobs of a node: identity, timers, retransmission budget and
//! resource bounds.

use std::time::Duration;

/// IANA-registered Diameter port (RFC 3588 Sec.2.1, TCP/SCTP).
pub const DIAMETER_PORT: u16 = 3868;

/// IANA-registered Diameter-over-TLS port (RFC 6733 Sec.2.1).
pub const DIAMETER_TLS_PORT: u16 = 5658;

/// Default time a request may stay pending before the deadline fires.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of T-flag retransmissions before a transaction times out.
pub const DEFAULT_MAX_RETRANSMITS: u32 = 2;

/// Default bound on simultaneously pending transactions per peer connection.
pub const DEFAULT_MAX_PENDING: usize = 4096;

/// Default capacity of the end-to-end duplicate-request cache.
pub const DEFAULT_DUPLICATE_CACHE: usize = 1024;

/// Upper bound on a single inbound frame. A Message Length beyond this is
/// treated as corrupt framing rather than an allocation request.
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// Runtime configuration for a [`crate::node::Node`].
///
/// # Example
///
/// ```rust
/// use hdia::config::NodeConfig;
/// use std::time::Duration;
///
/// let config = NodeConfig::new("scscf.cipango.org", "cipango.org")
///     .with_product_name("hdia")
///     .with_request_timeout(Duration::from_secs(5))
///     .with_max_retransmits(1);
/// assert_eq!(config.origin_host, "scscf.cipango.org");
/// ```
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// DiameterIdentity stamped as Origin-Host on everything this node sends.
    pub origin_host: String,
    /// DiameterIdentity stamped as Origin-Realm.
    pub origin_realm: String,
    /// Product-Name advertised during capabilities exchange.
    pub product_name: String,
    /// Firmware-Revision advertised during capabilities exchange.
    pub firmware_revision: u32,
    pub request_timeout: Duration,
    pub max_retransmits: u32,
    pub max_pending: usize,
    pub duplicate_cache_size: usize,
    pub max_frame_len: usize,
}

impl NodeConfig {
    pub fn new(origin_host: impl Into<String>, origin_realm: impl Into<String>) -> Self {
        Self {
            origin_host: origin_host.into(),
            origin_realm: origin_realm.into(),
            product_name: "hdia".to_string(),
            firmware_revision: 1,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retransmits: DEFAULT_MAX_RETRANSMITS,
            max_pending: DEFAULT_MAX_PENDING,
            duplicate_cache_size: DEFAULT_DUPLICATE_CACHE,
            max_frame_len: MAX_FRAME_LEN,
        }
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_retransmits(mut self, budget: u32) -> Self {
        self.max_retransmits = budget;
        self
    }

    pub fn with_max_pending(mut self, limit: usize) -> Self {
        self.max_pending = limit;
        self
    }

    pub fn with_duplicate_cache_size(mut self, capacity: usize) -> Self {
        self.duplicate_cache_size = capacity;
        self
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::new("localhost.localdomain", "localdomain")
    }
}
