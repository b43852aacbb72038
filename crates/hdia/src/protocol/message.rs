// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message codec (RFC 3588 Sec.3)
//!
//! A Diameter message is a fixed 20-byte header followed by an ordered
//! sequence of AVPs. The Message Length field covers the entire message,
//! padding included, and is the sole framing mechanism on the byte stream.
//!
//! # Wire Format
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    Version    |                 Message Length                |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |R P E T r r r r|                  Command-Code                 |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Application-ID                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Hop-by-Hop Identifier                      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    End-to-End Identifier                      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  AVPs ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-
//! ```

use crate::dictionary::TypeRegistry;
use crate::protocol::avp::{Avp, AvpList, AvpType};
use crate::protocol::codec::{decode_avp, encode_avp};
use crate::protocol::constants::{
    DIAMETER_VERSION, FLAG_ERROR, FLAG_PROXIABLE, FLAG_REQUEST, FLAG_RETRANSMITTED, MSG_HDR_LEN,
};
use crate::protocol::{CodecError, CodecResult};
use crate::ser::{Cursor, CursorMut};

/// What role an application plays for a session (RFC 3588 Sec.2.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationIdKind {
    Auth,
    Acct,
    Relay,
}

/// Identifies the Diameter application a message belongs to.
///
/// `vendor_id != 0` marks a vendor-specific application (advertised through
/// the Vendor-Specific-Application-Id grouped AVP).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationId {
    pub kind: ApplicationIdKind,
    pub id: u32,
    pub vendor_id: u32,
}

impl ApplicationId {
    pub const fn auth(id: u32) -> Self {
        Self {
            kind: ApplicationIdKind::Auth,
            id,
            vendor_id: 0,
        }
    }

    pub const fn auth_vendor(id: u32, vendor_id: u32) -> Self {
        Self {
            kind: ApplicationIdKind::Auth,
            id,
            vendor_id,
        }
    }

    pub const fn acct(id: u32) -> Self {
        Self {
            kind: ApplicationIdKind::Acct,
            id,
            vendor_id: 0,
        }
    }

    pub const fn acct_vendor(id: u32, vendor_id: u32) -> Self {
        Self {
            kind: ApplicationIdKind::Acct,
            id,
            vendor_id,
        }
    }

    pub fn is_vendor_specific(&self) -> bool {
        self.vendor_id != 0
    }
}

/// Decoded fixed message header.
///
/// Kept separate from [`Message`] so a malformed body can still yield the
/// identifiers needed to build a protocol rejection answer.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub version: u8,
    pub length: u32,
    pub flags: u8,
    pub command_code: u32,
    pub application_id: u32,
    pub hop_by_hop_id: u32,
    pub end_to_end_id: u32,
}

impl Header {
    /// Parse the 20-byte fixed header. Does not touch the body.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let mut cur = Cursor::new(bytes);
        let version = cur.read_u8()?;
        if version != DIAMETER_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let length = cur.read_u24_be()?;
        let flags = cur.read_u8()?;
        let command_code = cur.read_u24_be()?;
        let application_id = cur.read_u32_be()?;
        let hop_by_hop_id = cur.read_u32_be()?;
        let end_to_end_id = cur.read_u32_be()?;
        Ok(Self {
            version,
            length,
            flags,
            command_code,
            application_id,
            hop_by_hop_id,
            end_to_end_id,
        })
    }

    pub fn is_request(&self) -> bool {
        self.flags & FLAG_REQUEST != 0
    }
}

/// A Diameter message: header fields plus an ordered AVP body.
///
/// A request is mutable until sent; an answer mirrors the command code,
/// application id, hop-by-hop and end-to-end identifiers of its request.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub flags: u8,
    pub command_code: u32,
    pub application_id: u32,
    pub hop_by_hop_id: u32,
    pub end_to_end_id: u32,
    pub avps: AvpList,
}

impl Message {
    /// New request (R bit set). Hop-by-hop and end-to-end ids are assigned
    /// later, by the sending connection and the owning node respectively.
    pub fn request(command_code: u32, application_id: u32) -> Self {
        Self {
            flags: FLAG_REQUEST,
            command_code,
            application_id,
            hop_by_hop_id: 0,
            end_to_end_id: 0,
            avps: AvpList::new(),
        }
    }

    /// New answer for `request`: same command code, application id and
    /// correlation identifiers, R bit cleared, P bit carried over.
    pub fn answer_to(request: &Message) -> Self {
        Self {
            flags: request.flags & FLAG_PROXIABLE,
            command_code: request.command_code,
            application_id: request.application_id,
            hop_by_hop_id: request.hop_by_hop_id,
            end_to_end_id: request.end_to_end_id,
            avps: AvpList::new(),
        }
    }

    pub fn is_request(&self) -> bool {
        self.flags & FLAG_REQUEST != 0
    }

    pub fn is_proxiable(&self) -> bool {
        self.flags & FLAG_PROXIABLE != 0
    }

    pub fn is_error(&self) -> bool {
        self.flags & FLAG_ERROR != 0
    }

    pub fn is_retransmission(&self) -> bool {
        self.flags & FLAG_RETRANSMITTED != 0
    }

    pub fn set_proxiable(&mut self) {
        self.flags |= FLAG_PROXIABLE;
    }

    pub fn set_error(&mut self) {
        self.flags |= FLAG_ERROR;
    }

    pub fn set_retransmitted(&mut self) {
        self.flags |= FLAG_RETRANSMITTED;
    }

    pub fn add(&mut self, avp: Avp) {
        self.avps.add(avp);
    }

    /// First AVP of a dictionary type, if present.
    pub fn get(&self, avp_type: &AvpType) -> Option<&Avp> {
        self.avps.get_typed(avp_type)
    }

    /// Exact serialized byte count: header + every AVP including padding.
    pub fn wire_len(&self) -> usize {
        MSG_HDR_LEN + self.avps.wire_len()
    }

    /// Serialize to bytes. The Message Length field is the final byte count.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let total = self.wire_len();
        let mut buf = vec![0u8; total];
        let mut cur = CursorMut::new(&mut buf);

        cur.write_u8(DIAMETER_VERSION)?;
        cur.write_u24_be(total as u32)?;
        cur.write_u8(self.flags)?;
        cur.write_u24_be(self.command_code)?;
        cur.write_u32_be(self.application_id)?;
        cur.write_u32_be(self.hop_by_hop_id)?;
        cur.write_u32_be(self.end_to_end_id)?;

        for avp in &self.avps {
            encode_avp(&mut cur, avp)?;
        }
        debug_assert_eq!(cur.offset(), total);
        Ok(buf)
    }

    /// Parse one complete message.
    ///
    /// `bytes` must be exactly one frame as delimited by the Message Length
    /// field (the frame buffer guarantees this for stream input). The AVP
    /// body must exhaust the declared length exactly; a short or overrun
    /// remainder is a format error.
    pub fn decode(bytes: &[u8], registry: &TypeRegistry) -> CodecResult<Self> {
        let header = Header::decode(bytes)?;
        if (header.length as usize) != bytes.len() || (header.length as usize) < MSG_HDR_LEN {
            return Err(CodecError::InvalidMessageLength {
                declared: header.length as usize,
                actual: bytes.len(),
            });
        }

        let mut cur = Cursor::new(&bytes[MSG_HDR_LEN..]);
        let mut avps = AvpList::new();
        while !cur.is_eof() {
            avps.add(decode_avp(&mut cur, registry)?);
        }

        Ok(Self {
            flags: header.flags,
            command_code: header.command_code,
            application_id: header.application_id,
            hop_by_hop_id: header.hop_by_hop_id,
            end_to_end_id: header.end_to_end_id,
            avps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::APP_3GPP_CX;
    use crate::protocol::format::DataFormat;

    static SESSION_ID: AvpType = AvpType::base(263, "Session-Id", DataFormat::Utf8String);
    static RESULT_CODE: AvpType = AvpType::base(268, "Result-Code", DataFormat::Unsigned32);

    fn registry() -> TypeRegistry {
        let mut reg = TypeRegistry::new();
        reg.register(&SESSION_ID).expect("register Session-Id");
        reg.register(&RESULT_CODE).expect("register Result-Code");
        reg
    }

    fn sample_request() -> Message {
        let mut msg = Message::request(300, APP_3GPP_CX);
        msg.hop_by_hop_id = 0x1111_2222;
        msg.end_to_end_id = 0x3333_4444;
        msg.add(Avp::new(&SESSION_ID, "hss.cipango.org;1;42"));
        msg
    }

    #[test]
    fn test_header_layout_on_wire() {
        let msg = sample_request();
        let buf = msg.encode().expect("encode should succeed");

        assert_eq!(buf[0], 1); // version
        assert_eq!(buf[4], 0x80); // R bit
        assert_eq!(&buf[5..8], &[0, 1, 44]); // command 300 = 0x00012C
        assert_eq!(&buf[8..12], &APP_3GPP_CX.to_be_bytes());
        assert_eq!(&buf[12..16], &0x1111_2222u32.to_be_bytes());
        assert_eq!(&buf[16..20], &0x3333_4444u32.to_be_bytes());
    }

    #[test]
    fn test_message_length_field_is_exact_byte_count() {
        let msg = sample_request();
        let buf = msg.encode().expect("encode should succeed");
        let declared = ((buf[1] as usize) << 16) | ((buf[2] as usize) << 8) | buf[3] as usize;
        assert_eq!(declared, buf.len());
        assert_eq!(declared, msg.wire_len());
    }

    #[test]
    fn test_roundtrip() {
        let reg = registry();
        let msg = sample_request();
        let buf = msg.encode().expect("encode should succeed");
        let decoded = Message::decode(&buf, &reg).expect("decode should succeed");
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_answer_mirrors_request_identifiers() {
        let req = sample_request();
        let ans = Message::answer_to(&req);
        assert!(!ans.is_request());
        assert_eq!(ans.command_code, req.command_code);
        assert_eq!(ans.application_id, req.application_id);
        assert_eq!(ans.hop_by_hop_id, req.hop_by_hop_id);
        assert_eq!(ans.end_to_end_id, req.end_to_end_id);
    }

    #[test]
    fn test_version_mismatch_is_connection_fatal() {
        let mut buf = sample_request().encode().expect("encode should succeed");
        buf[0] = 2;
        let err = Message::decode(&buf, &registry()).unwrap_err();
        assert!(err.is_connection_fatal());
        match err {
            CodecError::UnsupportedVersion(2) => {}
            other => std::panic::panic_any(format!("unexpected error {:?}", other)),
        }
    }

    #[test]
    fn test_length_field_mismatch_rejected() {
        let mut buf = sample_request().encode().expect("encode should succeed");
        // Inflate the declared length past the actual frame.
        buf[3] = buf[3].wrapping_add(8);
        let err = Message::decode(&buf, &registry()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidMessageLength { .. }));
        assert!(!err.is_connection_fatal());
    }

    #[test]
    fn test_truncated_avp_body_rejected() {
        let buf = sample_request().encode().expect("encode should succeed");
        // Chop the final AVP but fix up the length field to match, leaving a
        // body that ends mid-AVP.
        let cut = buf.len() - 4;
        let mut short = buf[..cut].to_vec();
        short[1] = ((cut >> 16) & 0xFF) as u8;
        short[2] = ((cut >> 8) & 0xFF) as u8;
        short[3] = (cut & 0xFF) as u8;
        assert!(Message::decode(&short, &registry()).is_err());
    }

    #[test]
    fn test_unknown_command_still_decodes() {
        let reg = registry();
        let mut msg = Message::request(63000, 99); // no dictionary entry anywhere
        msg.add(Avp::new(&RESULT_CODE, 2001u32));
        let buf = msg.encode().expect("encode should succeed");
        let decoded = Message::decode(&buf, &reg).expect("structural decode must not need a command entry");
        assert_eq!(decoded.command_code, 63000);
    }

    #[test]
    fn test_retransmission_flag() {
        let mut msg = sample_request();
        assert!(!msg.is_retransmission());
        msg.set_retransmitted();
        assert!(msg.is_retransmission());
        let buf = msg.encode().expect("encode should succeed");
        assert_eq!(buf[4] & 0x10, 0x10);
    }
}
