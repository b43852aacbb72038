// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sessions: identifier-bearing conversations between two Diameter
//! identities.
//!
//! A session owns the routing attributes every request of the conversation
//! shares (destination realm/host, application id) and stamps them, together
//! with Session-Id and the node's origin identity, onto requests and answers
//! it creates. Session-Ids follow the conventional
//! `<origin-host>;<high32>;<low32>` form (RFC 3588 Sec.8.8).

use crate::dictionary::base;
use crate::node::{Error, Result};
use crate::protocol::avp::{Avp, AvpList};
use crate::protocol::message::{ApplicationId, ApplicationIdKind, Message};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Node-lifetime End-to-End Identifier allocator.
///
/// Seeded per RFC 3588 Sec.3: high 12 bits from the low bits of the boot
/// time, low 20 bits pseudo-random, then monotonically incremented. Ids are
/// never reused for semantically distinct requests.
pub(crate) struct EndToEndAllocator {
    next: AtomicU32,
}

impl EndToEndAllocator {
    pub(crate) fn new() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let high = (now.as_secs() as u32 & 0x0FFF) << 20;
        let low = now.subsec_nanos() & 0x000F_FFFF;
        Self {
            next: AtomicU32::new(high | low),
        }
    }

    pub(crate) fn allocate(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

#[derive(Default)]
struct SessionState {
    application_id: Option<ApplicationId>,
    destination_realm: Option<String>,
    destination_host: Option<String>,
}

/// One logical multi-exchange conversation.
pub struct Session {
    id: String,
    origin_host: Arc<str>,
    origin_realm: Arc<str>,
    end_to_end: Arc<EndToEndAllocator>,
    state: Mutex<SessionState>,
}

impl Session {
    /// Globally unique session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_application_id(&self, application_id: ApplicationId) {
        self.state.lock().application_id = Some(application_id);
    }

    pub fn application_id(&self) -> Option<ApplicationId> {
        self.state.lock().application_id
    }

    pub fn set_destination_realm(&self, realm: impl Into<String>) {
        self.state.lock().destination_realm = Some(realm.into());
    }

    pub fn set_destination_host(&self, host: impl Into<String>) {
        self.state.lock().destination_host = Some(host.into());
    }

    pub fn destination_host(&self) -> Option<String> {
        self.state.lock().destination_host.clone()
    }

    /// Build a request bound to this session.
    ///
    /// Stamps Session-Id, Origin-Host/Realm, Destination-Realm, optional
    /// Destination-Host and the application id advertisement
    /// (Vendor-Specific-Application-Id when the application carries a vendor
    /// id). The caller appends application AVPs and sends via a peer; no
    /// I/O happens here.
    pub fn create_request(&self, command_code: u32) -> Result<Message> {
        let state = self.state.lock();
        let application_id = state
            .application_id
            .ok_or_else(|| Error::InvalidState("session has no application id".to_string()))?;
        let destination_realm = state
            .destination_realm
            .clone()
            .ok_or(Error::MissingAvp("Destination-Realm"))?;
        let destination_host = state.destination_host.clone();
        drop(state);

        let mut request = Message::request(command_code, application_id.id);
        request.set_proxiable();
        request.end_to_end_id = self.end_to_end.allocate();

        request.add(Avp::new(&base::SESSION_ID, self.id.as_str()));
        request.add(application_id_avp(&application_id));
        request.add(Avp::new(&base::ORIGIN_HOST, &*self.origin_host));
        request.add(Avp::new(&base::ORIGIN_REALM, &*self.origin_realm));
        request.add(Avp::new(&base::DESTINATION_REALM, destination_realm));
        if let Some(host) = destination_host {
            request.add(Avp::new(&base::DESTINATION_HOST, host));
        }
        Ok(request)
    }

    /// Build an answer to `request` within this session: mirrored
    /// identifiers, Session-Id, Result-Code and the node's origin identity.
    pub fn create_answer(&self, request: &Message, result_code: u32) -> Message {
        let mut answer = Message::answer_to(request);
        answer.add(Avp::new(&base::SESSION_ID, self.id.as_str()));
        answer.add(Avp::new(&base::RESULT_CODE, result_code));
        answer.add(Avp::new(&base::ORIGIN_HOST, &*self.origin_host));
        answer.add(Avp::new(&base::ORIGIN_REALM, &*self.origin_realm));
        answer
    }
}

/// Application id advertisement AVP for a request.
///
/// Vendor-specific applications are announced through the grouped
/// Vendor-Specific-Application-Id; plain ones through Auth-/
/// Acct-Application-Id directly (RFC 3588 Sec.6.11).
pub fn application_id_avp(application_id: &ApplicationId) -> Avp {
    let inner = match application_id.kind {
        ApplicationIdKind::Acct => Avp::new(&base::ACCT_APPLICATION_ID, application_id.id),
        _ => Avp::new(&base::AUTH_APPLICATION_ID, application_id.id),
    };
    if !application_id.is_vendor_specific() {
        return inner;
    }
    let mut members = AvpList::new();
    members.add(Avp::new(&base::VENDOR_ID, application_id.vendor_id));
    members.add(inner);
    Avp::new(&base::VENDOR_SPECIFIC_APPLICATION_ID, members)
}

/// Creates sessions and tracks them by id until removed.
pub struct SessionManager {
    origin_host: Arc<str>,
    origin_realm: Arc<str>,
    end_to_end: Arc<EndToEndAllocator>,
    sessions: Mutex<HashMap<String, Arc<Session>>>,
    id_high: u32,
    id_low: AtomicU32,
}

impl SessionManager {
    pub(crate) fn new(origin_host: &str, origin_realm: &str) -> Self {
        let boot = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            origin_host: Arc::from(origin_host),
            origin_realm: Arc::from(origin_realm),
            end_to_end: Arc::new(EndToEndAllocator::new()),
            sessions: Mutex::new(HashMap::new()),
            id_high: boot.as_secs() as u32,
            id_low: AtomicU32::new(1),
        }
    }

    /// Open a new session with a fresh globally unique id.
    pub fn new_session(&self) -> Arc<Session> {
        let low = self.id_low.fetch_add(1, Ordering::Relaxed);
        let id = format!("{};{};{}", self.origin_host, self.id_high, low);
        let session = Arc::new(Session {
            id: id.clone(),
            origin_host: Arc::clone(&self.origin_host),
            origin_realm: Arc::clone(&self.origin_realm),
            end_to_end: Arc::clone(&self.end_to_end),
            state: Mutex::new(SessionState::default()),
        });
        self.sessions.lock().insert(id, Arc::clone(&session));
        session
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().get(session_id).cloned()
    }

    /// Drop a finished session. Returns it if it was still tracked.
    pub fn remove(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().remove(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
