// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request factory: opens a session and pre-populates a request with its
//! session-derived AVPs. The caller appends application AVPs and sends
//! through a peer; the only state mutated here is session creation.

use crate::node::{Node, Result, Session};
use crate::protocol::message::{ApplicationId, Message};
use std::sync::Arc;

/// Builds new outgoing requests bound to fresh sessions.
///
/// # Example
///
/// ```rust,no_run
/// use hdia::{DiameterFactory, Node, NodeConfig};
/// use hdia::dictionary::sh;
///
/// let node = Node::new(NodeConfig::new("as.cipango.org", "cipango.org"))?;
/// let factory = DiameterFactory::new(Arc::clone(&node));
/// let (session, mut udr) = factory.create_request(
///     sh::APPLICATION_ID,
///     306,
///     "hss.cipango.org",
///     Some("hss1.hss.cipango.org"),
/// )?;
/// // append application AVPs, then node.send_request(&mut udr)
/// # use std::sync::Arc;
/// # Ok::<(), hdia::Error>(())
/// ```
pub struct DiameterFactory {
    node: Arc<Node>,
}

impl DiameterFactory {
    pub fn new(node: Arc<Node>) -> Self {
        Self { node }
    }

    /// Open a session and build a request stamped with Session-Id,
    /// Origin-Host/Realm, Destination-Realm, optional Destination-Host and
    /// the application id advertisement.
    pub fn create_request(
        &self,
        application_id: ApplicationId,
        command_code: u32,
        destination_realm: &str,
        destination_host: Option<&str>,
    ) -> Result<(Arc<Session>, Message)> {
        let session = self.node.sessions().new_session();
        session.set_application_id(application_id);
        session.set_destination_realm(destination_realm);
        if let Some(host) = destination_host {
            session.set_destination_host(host);
        }
        let request = session.create_request(command_code)?;
        Ok((session, request))
    }

    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }
}
