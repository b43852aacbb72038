// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HDIA - Diameter base protocol stack
//!
//! A pure Rust implementation of the Diameter AAA base protocol (RFC 3588 /
//! RFC 6733): bit-exact message and AVP codecs, extensible type and command
//! dictionaries, and a concurrent transaction layer correlating requests
//! with answers across peer connections, with retransmission and timeout
//! semantics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hdia::{DiameterFactory, Node, NodeConfig, Transport};
//! use hdia::dictionary::{cx, sh};
//! use std::sync::Arc;
//!
//! # struct Tcp; impl Transport for Tcp { fn send(&self, _: &[u8]) -> std::io::Result<()> { Ok(()) } }
//! fn main() -> hdia::Result<()> {
//!     // A node with the shipped base + Cx + Sh dictionaries
//!     let node = Node::new(NodeConfig::new("as.cipango.org", "cipango.org"))?;
//!     let peer = node.connect("hss.cipango.org", Arc::new(Tcp));
//!
//!     // Build a Sh User-Data-Request bound to a fresh session
//!     let factory = DiameterFactory::new(Arc::clone(&node));
//!     let (_session, mut udr) =
//!         factory.create_request(sh::APPLICATION_ID, 306, "cipango.org", None)?;
//!     udr.add(hdia::Avp::new(&cx::PUBLIC_IDENTITY, "sip:alice@cipango.org"));
//!
//!     // Send; await the matched answer or a local timeout
//!     let handle = peer.send_request(&mut udr, 2)?;
//!     let _answer = handle.wait()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------------+
//! |                        Application Layer                           |
//! |     DiameterFactory -> Session -> Request  /  RequestHandler       |
//! +--------------------------------------------------------------------+
//! |                          Node Layer                                |
//! |   SessionManager | Peer | TransactionTable | DeadlineTimer         |
//! +--------------------------------------------------------------------+
//! |                          Wire Layer                                |
//! |   Message Codec | AVP Codec | Data Formats | Dictionaries          |
//! +--------------------------------------------------------------------+
//! |                       Transport Boundary                           |
//! |        Transport trait (bytes out) | FrameBuffer (bytes in)        |
//! +--------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Node`] | Process-wide identity, dictionaries, sessions and peers |
//! | [`Peer`] | One connection: transaction table + deadline timer |
//! | [`Message`] | Header fields plus an ordered AVP body |
//! | [`Avp`] | Typed attribute-value pair |
//! | [`DiameterFactory`] | Builds session-bound requests |
//! | [`TransactionHandle`] | Await the answer or timeout of one request |
//!
//! ## Modules Overview
//!
//! - [`protocol`] - wire codecs (start here for the byte format)
//! - [`dictionary`] - type/command registries and shipped tables
//! - [`node`] - sessions, peers, transactions
//! - [`transport`] - the bytes in/bytes out boundary
//! - [`config`] - runtime knobs
//!
//! ## See Also
//!
//! - [RFC 3588](https://www.rfc-editor.org/rfc/rfc3588) - Diameter Base Protocol
//! - [RFC 6733](https://www.rfc-editor.org/rfc/rfc6733) - Diameter Base Protocol (bis)
//! - 3GPP TS 29.228/29.229 (Cx), TS 29.328/29.329 (Sh)

/// Node runtime configuration (identity, timers, resource bounds).
pub mod config;
/// Type and command dictionaries (base, Cx, Sh) and their registries.
pub mod dictionary;
/// Node layer: sessions, peers, transaction correlation.
pub mod node;
/// Wire protocol: AVP and message codecs, data formats, constants.
pub mod protocol;
/// Byte-level big-endian cursors shared by the codecs.
pub mod ser;
/// Transport boundary: `Transport` trait and stream frame reassembly.
pub mod transport;

pub use config::NodeConfig;
pub use dictionary::{Command, CommandDictionary, DictionaryError, TypeRegistry};
pub use node::{
    DiameterFactory, Error, Node, Peer, RequestHandler, Result, Session, SessionManager,
    TransactionHandle, TransactionOutcome, TransactionTable,
};
pub use protocol::{
    ApplicationId, ApplicationIdKind, Avp, AvpList, AvpType, AvpValue, CodecError, DataFormat,
    EnumValue, EnumValueSet, Message,
};
pub use transport::{FrameBuffer, Transport};
