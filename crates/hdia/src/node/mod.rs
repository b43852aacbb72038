// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Diameter node: identity, sessions, peers and request/answer correlation.
//!
//! ## Entity Hierarchy
//!
//! ```text
//! Node
//! +-- TypeRegistry / CommandDictionary   (immutable after startup)
//! +-- SessionManager -> Session          (conversation state)
//! +-- Peer (one per connection)
//!     +-- TransactionTable               (pending requests, hop-by-hop)
//!     +-- DeadlineTimer                  (retransmission / timeout)
//!     +-- FrameBuffer                    (inbound byte reassembly)
//! ```
//!
//! Outbound: a [`crate::DiameterFactory`] request is sent through a [`Peer`],
//! which allocates the Hop-by-Hop Identifier, parks a pending transaction and
//! hands back a [`TransactionHandle`]. Inbound bytes enter [`Node::receive`]:
//! answers are matched against the peer's transaction table, requests are
//! dispatched to the registered [`RequestHandler`].

pub mod factory;
pub mod session;
pub mod timer;
pub mod transaction;

pub use self::factory::DiameterFactory;
pub use self::session::{Session, SessionManager};
pub use self::transaction::{TransactionHandle, TransactionOutcome, TransactionTable};

use crate::config::NodeConfig;
use crate::dictionary::{base, CommandDictionary, DictionaryError, TypeRegistry};
use crate::protocol::avp::{Avp, AvpList};
use crate::protocol::constants::FLAG_PROXIABLE;
use crate::protocol::message::{Header, Message};
use crate::protocol::CodecError;
use crate::transport::{FrameBuffer, Transport};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use self::timer::{DeadlineTimer, TimerHandle};
use self::transaction::DeadlineAction;

/// Errors returned by node-level operations.
#[derive(Debug)]
pub enum Error {
    /// Wire encode/decode failure.
    Codec(CodecError),
    /// Startup dictionary configuration failure.
    Dictionary(DictionaryError),
    /// Transport send failure.
    Io(std::io::Error),
    /// Transaction table at capacity; nothing was sent.
    Overloaded { pending: usize, limit: usize },
    /// Retry budget exhausted; local terminal error, distinct from any
    /// peer-supplied result code.
    TransactionTimeout { hop_by_hop_id: u32 },
    /// Transaction cancelled or its connection torn down.
    Cancelled,
    /// A required AVP is absent.
    MissingAvp(&'static str),
    /// Operation not valid in the current state.
    InvalidState(String),
    /// No peer connection can carry the message.
    UnableToDeliver(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Codec(e) => write!(f, "codec error: {}", e),
            Error::Dictionary(e) => write!(f, "dictionary error: {}", e),
            Error::Io(e) => write!(f, "transport error: {}", e),
            Error::Overloaded { pending, limit } => {
                write!(f, "transaction table full: {} pending, limit {}", pending, limit)
            }
            Error::TransactionTimeout { hop_by_hop_id } => {
                write!(f, "transaction {:#010x} timed out", hop_by_hop_id)
            }
            Error::Cancelled => write!(f, "transaction cancelled"),
            Error::MissingAvp(name) => write!(f, "missing AVP: {}", name),
            Error::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            Error::UnableToDeliver(msg) => write!(f, "unable to deliver: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Codec(e) => Some(e),
            Error::Dictionary(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}

impl From<DictionaryError> for Error {
    fn from(e: DictionaryError) -> Self {
        Error::Dictionary(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Convenient alias for node-level results.
pub type Result<T> = core::result::Result<T, Error>;

/// Application callback for inbound requests.
///
/// Runs on the thread that delivered the bytes; return the answer to send
/// back, or `None` to stay silent (e.g. when answering later on another
/// path). Build answers with [`Node::create_answer`] or
/// [`Session::create_answer`].
pub trait RequestHandler: Send + Sync {
    fn on_request(&self, node: &Node, request: &Message) -> Option<Message>;
}

struct PeerInner {
    identity: String,
    transport: Arc<dyn Transport>,
    table: Arc<TransactionTable>,
    frames: Mutex<FrameBuffer>,
    timer: TimerHandle,
    request_timeout: Duration,
}

impl PeerInner {
    fn handle_deadline(&self, hop_by_hop_id: u32) {
        match self.table.on_deadline(hop_by_hop_id) {
            DeadlineAction::Retransmit(wire) => {
                log::warn!(
                    "[peer {}] retransmitting hbh={:#010x} ({} bytes, T flag set)",
                    self.identity,
                    hop_by_hop_id,
                    wire.len()
                );
                if let Err(e) = self.transport.send(&wire) {
                    log::error!(
                        "[peer {}] retransmission send failed: {}",
                        self.identity,
                        e
                    );
                }
                // Re-arm regardless: a dead transport drains the budget into
                // a clean timeout instead of stranding the caller.
                self.timer
                    .schedule(hop_by_hop_id, Instant::now() + self.request_timeout);
            }
            DeadlineAction::Expired | DeadlineAction::Stale => {}
        }
    }
}

/// One peer connection: transaction table, deadline timer and frame
/// reassembly on top of a byte transport.
pub struct Peer {
    inner: Arc<PeerInner>,
    // Owns the timer thread; dropped (and joined) with the peer.
    _timer: DeadlineTimer,
}

impl Peer {
    fn new(identity: String, transport: Arc<dyn Transport>, config: &NodeConfig) -> Arc<Self> {
        let table = Arc::new(TransactionTable::new(config.max_pending));

        // The expiry callback needs the assembled PeerInner (it re-arms via
        // the timer's own handle), so it is wired through a slot filled in
        // after construction. Deadlines cannot fire before the first
        // schedule() call, which happens strictly later.
        let cb_slot: Arc<Mutex<Option<Arc<PeerInner>>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&cb_slot);
        let timer = DeadlineTimer::spawn(move |hop| {
            if let Some(inner) = slot.lock().clone() {
                inner.handle_deadline(hop);
            }
        });

        let inner = Arc::new(PeerInner {
            identity,
            transport,
            table,
            frames: Mutex::new(FrameBuffer::new(config.max_frame_len)),
            timer: timer.handle(),
            request_timeout: config.request_timeout,
        });
        *cb_slot.lock() = Some(Arc::clone(&inner));

        Arc::new(Self {
            inner,
            _timer: timer,
        })
    }

    /// Peer identity (its Origin-Host / Destination-Host name).
    pub fn identity(&self) -> &str {
        &self.inner.identity
    }

    /// Number of transactions currently pending on this connection.
    pub fn pending(&self) -> usize {
        self.inner.table.len()
    }

    /// Send a request and park a pending transaction.
    ///
    /// Assigns the Hop-by-Hop Identifier (unique among pending transactions
    /// on this connection), arms the deadline and returns the handle the
    /// caller awaits. Fails with [`Error::Overloaded`] at capacity before
    /// any bytes reach the transport.
    pub fn send_request(&self, message: &mut Message, max_retransmits: u32) -> Result<TransactionHandle> {
        if !message.is_request() {
            return Err(Error::InvalidState(
                "send_request needs the R bit set".to_string(),
            ));
        }
        let inner = &self.inner;
        message.hop_by_hop_id = inner.table.allocate_hop_by_hop();

        let wire = message.encode()?;
        let handle = inner.table.insert(message, &wire, max_retransmits)?;
        if let Err(e) = inner.transport.send(&wire) {
            inner.table.abort(message.hop_by_hop_id);
            return Err(Error::Io(e));
        }
        inner
            .timer
            .schedule(message.hop_by_hop_id, Instant::now() + inner.request_timeout);
        log::debug!(
            "[peer {}] sent request cmd={} hbh={:#010x} e2e={:#010x}",
            inner.identity,
            message.command_code,
            message.hop_by_hop_id,
            message.end_to_end_id
        );
        Ok(handle)
    }

    /// Send an answer or other fire-and-forget message.
    pub fn send(&self, message: &Message) -> Result<()> {
        let wire = message.encode()?;
        self.inner.transport.send(&wire)?;
        Ok(())
    }

    /// Cancel a pending transaction by its Hop-by-Hop Identifier.
    pub fn cancel(&self, hop_by_hop_id: u32) -> bool {
        self.inner.table.cancel(hop_by_hop_id)
    }

    /// The connection's transaction table (shared with answer matching).
    pub fn transactions(&self) -> &TransactionTable {
        &self.inner.table
    }
}

/// A Diameter node: local identity plus the registries, sessions and peer
/// connections of one process.
pub struct Node {
    config: NodeConfig,
    registry: Arc<TypeRegistry>,
    commands: Arc<CommandDictionary>,
    sessions: SessionManager,
    peers: Mutex<HashMap<String, Arc<Peer>>>,
    /// Node-lifetime duplicate-request detector keyed by
    /// (Origin-Host, End-to-End Identifier).
    duplicates: Mutex<LruCache<(String, u32), ()>>,
    handler: RwLock<Option<Arc<dyn RequestHandler>>>,
    host_ip: Option<IpAddr>,
}

impl Node {
    /// Node with the shipped base + Cx + Sh dictionaries.
    pub fn new(config: NodeConfig) -> Result<Arc<Self>> {
        let registry = TypeRegistry::with_defaults()?;
        let commands = CommandDictionary::with_defaults()?;
        Ok(Self::with_dictionaries(config, registry, commands))
    }

    /// Node with caller-supplied dictionary tables (registered before any
    /// traffic is processed).
    pub fn with_dictionaries(
        config: NodeConfig,
        registry: TypeRegistry,
        commands: CommandDictionary,
    ) -> Arc<Self> {
        let sessions = SessionManager::new(&config.origin_host, &config.origin_realm);
        let cache_size = NonZeroUsize::new(config.duplicate_cache_size.max(1))
            .unwrap_or(NonZeroUsize::MIN);
        let host_ip = local_ip_address::local_ip().ok();
        log::debug!(
            "[node {}] up (realm {}, host ip {:?})",
            config.origin_host,
            config.origin_realm,
            host_ip
        );
        Arc::new(Self {
            config,
            registry: Arc::new(registry),
            commands: Arc::new(commands),
            sessions,
            peers: Mutex::new(HashMap::new()),
            duplicates: Mutex::new(LruCache::new(cache_size)),
            handler: RwLock::new(None),
            host_ip,
        })
    }

    pub fn origin_host(&self) -> &str {
        &self.config.origin_host
    }

    pub fn origin_realm(&self) -> &str {
        &self.config.origin_realm
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn commands(&self) -> &Arc<CommandDictionary> {
        &self.commands
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Host-IP-Address AVP for capability advertisement, when a local
    /// interface address could be determined.
    pub fn host_ip_avp(&self) -> Option<Avp> {
        self.host_ip
            .map(|ip| Avp::new(&base::HOST_IP_ADDRESS, ip))
    }

    /// Register the inbound-request callback.
    pub fn set_request_handler(&self, handler: Arc<dyn RequestHandler>) {
        *self.handler.write() = Some(handler);
    }

    /// Attach a peer connection over `transport`, keyed by the peer's
    /// Diameter identity.
    pub fn connect(&self, identity: impl Into<String>, transport: Arc<dyn Transport>) -> Arc<Peer> {
        let identity = identity.into();
        let peer = Peer::new(identity.clone(), transport, &self.config);
        self.peers.lock().insert(identity, Arc::clone(&peer));
        peer
    }

    /// Look up a connected peer by identity.
    pub fn peer(&self, identity: &str) -> Option<Arc<Peer>> {
        self.peers.lock().get(identity).cloned()
    }

    /// Drop a peer connection. In-flight transactions on it are abandoned
    /// (their handles see [`Error::Cancelled`] when the table drops).
    pub fn disconnect(&self, identity: &str) -> Option<Arc<Peer>> {
        self.peers.lock().remove(identity)
    }

    /// Pick the peer for an outgoing request: its Destination-Host when that
    /// peer is connected, any connected peer otherwise.
    pub fn route(&self, message: &Message) -> Result<Arc<Peer>> {
        let peers = self.peers.lock();
        if let Some(host) = message
            .get(&base::DESTINATION_HOST)
            .and_then(|a| a.value.as_str())
        {
            if let Some(peer) = peers.get(host) {
                return Ok(Arc::clone(peer));
            }
        }
        peers
            .values()
            .next()
            .cloned()
            .ok_or_else(|| Error::UnableToDeliver("no peer connections".to_string()))
    }

    /// Route and send a request, using the node's retransmission budget.
    pub fn send_request(&self, message: &mut Message) -> Result<TransactionHandle> {
        let peer = self.route(message)?;
        peer.send_request(message, self.config.max_retransmits)
    }

    /// Feed raw transport bytes from `peer` into the stack.
    ///
    /// Drains every complete frame: answers are matched to pending
    /// transactions, requests dispatched to the handler, malformed messages
    /// rejected where the protocol defines a result code. An error return
    /// means framing is lost and the connection must be closed.
    pub fn receive(&self, peer: &Peer, bytes: &[u8]) -> Result<()> {
        let mut frames = Vec::new();
        {
            let mut fb = peer.inner.frames.lock();
            fb.extend(bytes);
            loop {
                match fb.next_frame() {
                    Ok(Some(frame)) => frames.push(frame),
                    Ok(None) => break,
                    Err(e) => {
                        log::error!(
                            "[peer {}] framing lost ({}), closing",
                            peer.identity(),
                            e
                        );
                        return Err(Error::Codec(e));
                    }
                }
            }
        }
        for frame in frames {
            self.handle_frame(peer, &frame)?;
        }
        Ok(())
    }

    fn handle_frame(&self, peer: &Peer, frame: &[u8]) -> Result<()> {
        match Message::decode(frame, &self.registry) {
            Ok(message) if message.is_request() => {
                self.dispatch_request(peer, message);
                Ok(())
            }
            Ok(message) => {
                let hop = message.hop_by_hop_id;
                let name =
                    self.commands
                        .name_of(message.application_id, message.command_code, false);
                if !peer.inner.table.match_answer(message) {
                    // Stale, duplicate or unsolicited: discard, never fatal.
                    log::debug!(
                        "[peer {}] discarding unmatched {} hbh={:#010x}",
                        peer.identity(),
                        name,
                        hop
                    );
                }
                Ok(())
            }
            Err(e) if e.is_connection_fatal() => {
                log::error!("[peer {}] fatal decode error: {}", peer.identity(), e);
                Err(Error::Codec(e))
            }
            Err(e) => {
                log::warn!("[peer {}] dropping malformed message: {}", peer.identity(), e);
                // Well-framed but malformed request: answer with the
                // protocol-defined rejection instead of tearing down.
                if let (Ok(header), Some(result_code)) = (Header::decode(frame), e.result_code()) {
                    if header.is_request() {
                        let reject = self.reject(&header, result_code);
                        if let Err(send_err) = peer.send(&reject) {
                            log::warn!(
                                "[peer {}] could not send rejection: {}",
                                peer.identity(),
                                send_err
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn dispatch_request(&self, peer: &Peer, request: Message) {
        let name = self
            .commands
            .name_of(request.application_id, request.command_code, true);
        if self.is_duplicate(&request) {
            log::warn!(
                "[node {}] duplicate {} e2e={:#010x} (T={}) discarded",
                self.config.origin_host,
                name,
                request.end_to_end_id,
                request.is_retransmission()
            );
            return;
        }
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => {
                if let Some(answer) = handler.on_request(self, &request) {
                    if let Err(e) = peer.send(&answer) {
                        log::error!(
                            "[peer {}] failed to send {} answer: {}",
                            peer.identity(),
                            name,
                            e
                        );
                    }
                }
            }
            None => {
                log::debug!(
                    "[node {}] no handler for inbound {}, dropped",
                    self.config.origin_host,
                    name
                );
            }
        }
    }

    /// Record and test the (Origin-Host, End-to-End Identifier) pair; a hit
    /// means the request was already delivered once on this node.
    fn is_duplicate(&self, request: &Message) -> bool {
        let origin = request
            .get(&base::ORIGIN_HOST)
            .and_then(|a| a.value.as_str())
            .unwrap_or_default()
            .to_string();
        self.duplicates
            .lock()
            .put((origin, request.end_to_end_id), ())
            .is_some()
    }

    /// Build an answer to `request`: mirrored identifiers, Session-Id,
    /// Result-Code and this node's origin identity. Mandatory AVPs the
    /// registry does not know are echoed inside Failed-AVP so the peer can
    /// react (RFC 3588 Sec.7.5). Protocol-error result codes set the E bit.
    pub fn create_answer(&self, request: &Message, result_code: u32) -> Message {
        let mut answer = Message::answer_to(request);
        if let Some(session_id) = request.get(&base::SESSION_ID) {
            answer.add(session_id.clone());
        }
        answer.add(Avp::new(&base::RESULT_CODE, result_code));
        answer.add(Avp::new(&base::ORIGIN_HOST, self.config.origin_host.as_str()));
        answer.add(Avp::new(&base::ORIGIN_REALM, self.config.origin_realm.as_str()));

        for unknown in self.unknown_mandatory(request) {
            let mut failed = AvpList::new();
            failed.add(unknown.clone());
            answer.add(Avp::new(&base::FAILED_AVP, failed));
        }

        if (3000..4000).contains(&result_code) {
            answer.set_error();
        }
        answer
    }

    /// Mandatory-flagged AVPs of `message` with no registry entry.
    pub fn unknown_mandatory<'m>(&self, message: &'m Message) -> Vec<&'m Avp> {
        message
            .avps
            .iter()
            .filter(|avp| avp.is_mandatory() && self.registry.lookup(avp.code, avp.vendor_id).is_none())
            .collect()
    }

    fn reject(&self, header: &Header, result_code: u32) -> Message {
        let mut answer = Message {
            flags: header.flags & FLAG_PROXIABLE,
            command_code: header.command_code,
            application_id: header.application_id,
            hop_by_hop_id: header.hop_by_hop_id,
            end_to_end_id: header.end_to_end_id,
            avps: AvpList::new(),
        };
        answer.set_error();
        answer.add(Avp::new(&base::RESULT_CODE, result_code));
        answer.add(Avp::new(&base::ORIGIN_HOST, self.config.origin_host.as_str()));
        answer.add(Avp::new(&base::ORIGIN_REALM, self.config.origin_realm.as_str()));
        answer
    }
}
