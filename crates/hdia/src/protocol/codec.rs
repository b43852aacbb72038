// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AVP codec (RFC 3588 Sec.4.1)
//!
//! Encodes and decodes a single AVP against a byte buffer, consulting the
//! type registry to interpret or produce the value.
//!
//! # Wire Format
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           AVP Code                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |V M P r r r r r|                  AVP Length                   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        Vendor-ID (opt)                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    Data ...                           |  0-3 zero pad bytes   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! AVP Length covers header + data; padding to the next 4-byte boundary is
//! on the wire but outside the length field. A Grouped value is the
//! concatenation of its member encodings, each independently padded, so the
//! group itself never needs trailing pad.

use crate::dictionary::TypeRegistry;
use crate::protocol::avp::{Avp, AvpList, AvpValue};
use crate::protocol::constants::{pad4, AVP_FLAG_VENDOR, AVP_HDR_LEN, AVP_VENDOR_HDR_LEN};
use crate::protocol::format::{self, DataFormat};
use crate::protocol::{CodecError, CodecResult};
use crate::ser::{Cursor, CursorMut};

/// Encode one AVP: header, value, zero padding.
pub fn encode_avp(cur: &mut CursorMut<'_>, avp: &Avp) -> CodecResult<()> {
    let unpadded = avp.unpadded_len();

    cur.write_u32_be(avp.code)?;
    cur.write_u8(avp.flags)?;
    cur.write_u24_be(unpadded as u32)?;
    if avp.flags & AVP_FLAG_VENDOR != 0 {
        cur.write_u32_be(avp.vendor_id)?;
    }

    match &avp.value {
        AvpValue::Grouped(list) => {
            for member in list {
                encode_avp(cur, member)?;
            }
        }
        other => format::encode_value(cur, other)?,
    }

    cur.write_zeros(pad4(unpadded) - unpadded)?;
    Ok(())
}

/// Decode one AVP, including its padding.
///
/// Unknown `(code, vendor-id)` pairs fall back to a raw octet-string value so
/// the AVP can be carried or forwarded without loss; that is required relay
/// behavior, not an error.
pub fn decode_avp(cur: &mut Cursor<'_>, registry: &TypeRegistry) -> CodecResult<Avp> {
    let code = cur.read_u32_be()?;
    let flags = cur.read_u8()?;
    let declared = cur.read_u24_be()?;

    let header_len = if flags & AVP_FLAG_VENDOR != 0 {
        AVP_VENDOR_HDR_LEN
    } else {
        AVP_HDR_LEN
    };
    if (declared as usize) < header_len {
        return Err(CodecError::InvalidAvpLength { code, declared });
    }

    let vendor_id = if flags & AVP_FLAG_VENDOR != 0 {
        cur.read_u32_be()?
    } else {
        0
    };

    let value_len = declared as usize - header_len;
    if value_len > cur.remaining() {
        return Err(CodecError::InvalidAvpLength { code, declared });
    }

    let value = match registry.lookup(code, vendor_id) {
        Some(avp_type) => match avp_type.format {
            DataFormat::Grouped => {
                // Contain the recursion to exactly the declared value bytes;
                // a member overrunning the group surfaces as a read failure.
                let group_bytes = cur.read_bytes(value_len)?;
                let mut sub = Cursor::new(group_bytes);
                let mut members = AvpList::new();
                while !sub.is_eof() {
                    members.add(decode_avp(&mut sub, registry)?);
                }
                AvpValue::Grouped(members)
            }
            ref scalar => format::decode_value(scalar, cur, value_len, code)?,
        },
        None => AvpValue::OctetString(cur.read_bytes(value_len)?.to_vec()),
    };

    // Padding is derived from the declared length, never stored in it.
    cur.skip(pad4(declared as usize) - declared as usize)?;

    Ok(Avp {
        code,
        vendor_id,
        flags,
        value,
    })
}
