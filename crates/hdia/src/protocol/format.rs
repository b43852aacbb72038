// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data format codecs (RFC 3588 Sec.4.2 and Sec.4.3)
//!
//! One stateless encoder/decoder per Diameter basic or derived data format.
//! Every format except Grouped is handled here; Grouped recursion lives in
//! [`crate::protocol::codec`] because it needs the type registry.
//!
//! Enumerated formats are polymorphic over an [`EnumValueSet`]: a static
//! name/integer table supplied by the dictionary. New application-defined
//! enumerations register their own table; the codec never changes.

use crate::protocol::avp::AvpValue;
use crate::protocol::constants::{ADDR_FAMILY_IPV4, ADDR_FAMILY_IPV6, NTP_UNIX_OFFSET};
use crate::protocol::{CodecError, CodecResult};
use crate::ser::{Cursor, CursorMut};
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Finite set of named integer constants backing an Enumerated format.
///
/// Pure data: application dictionaries declare these as statics and hand
/// them to [`DataFormat::Enumerated`].
#[derive(Debug)]
pub struct EnumValueSet {
    pub name: &'static str,
    pub values: &'static [(i32, &'static str)],
}

impl EnumValueSet {
    pub fn name_of(&self, value: i32) -> Option<&'static str> {
        self.values
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, n)| *n)
    }

    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(v, _)| *v)
    }
}

/// Decoded Enumerated value.
///
/// `name` is `None` when the integer is not part of the value set: a
/// distinct "unknown enumerated value" outcome, not a decode failure, so
/// peers running newer dictionaries interoperate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub value: i32,
    pub name: Option<&'static str>,
}

impl EnumValue {
    /// Value drawn from a set, resolving the name if the set defines it.
    pub fn of(set: &'static EnumValueSet, value: i32) -> Self {
        Self {
            value,
            name: set.name_of(value),
        }
    }

    pub fn is_known(&self) -> bool {
        self.name.is_some()
    }
}

/// Data format discriminant: selects the wire codec for an AVP type.
#[derive(Debug)]
pub enum DataFormat {
    /// 32-bit unsigned integer, network order.
    Unsigned32,
    /// 32-bit signed integer, network order.
    Integer32,
    /// 64-bit unsigned integer, network order.
    Unsigned64,
    /// 64-bit signed integer, network order.
    Integer64,
    /// Raw bytes, no interpretation.
    OctetString,
    /// Octet string validated as UTF-8 text.
    Utf8String,
    /// DiameterIdentity / DiameterURI: UTF-8 host or URI string.
    Identity,
    /// 32-bit seconds since the NTP epoch (1900-01-01).
    Time,
    /// 2-byte address family tag + 4 (IPv4) or 16 (IPv6) address bytes.
    Address,
    /// 32-bit signed integer constrained to a named value set.
    Enumerated(&'static EnumValueSet),
    /// Ordered sequence of nested AVPs.
    Grouped,
}

impl DataFormat {
    pub fn name(&self) -> &'static str {
        match self {
            DataFormat::Unsigned32 => "Unsigned32",
            DataFormat::Integer32 => "Integer32",
            DataFormat::Unsigned64 => "Unsigned64",
            DataFormat::Integer64 => "Integer64",
            DataFormat::OctetString => "OctetString",
            DataFormat::Utf8String => "UTF8String",
            DataFormat::Identity => "DiameterIdentity",
            DataFormat::Time => "Time",
            DataFormat::Address => "Address",
            DataFormat::Enumerated(_) => "Enumerated",
            DataFormat::Grouped => "Grouped",
        }
    }
}

/// Value byte length of an encoded [`AvpValue`] (header and padding excluded).
pub fn value_len(value: &AvpValue) -> usize {
    match value {
        AvpValue::Unsigned32(_)
        | AvpValue::Integer32(_)
        | AvpValue::Time(_)
        | AvpValue::Enumerated(_) => 4,
        AvpValue::Unsigned64(_) | AvpValue::Integer64(_) => 8,
        AvpValue::OctetString(b) => b.len(),
        AvpValue::Utf8String(s) => s.len(),
        AvpValue::Address(IpAddr::V4(_)) => 2 + 4,
        AvpValue::Address(IpAddr::V6(_)) => 2 + 16,
        AvpValue::Grouped(list) => list.wire_len(),
    }
}

/// Encode a non-Grouped value. The value variant is self-describing, so no
/// registry access is needed on the encode path.
pub fn encode_value(cur: &mut CursorMut<'_>, value: &AvpValue) -> CodecResult<()> {
    match value {
        AvpValue::Unsigned32(v) => cur.write_u32_be(*v)?,
        AvpValue::Integer32(v) => cur.write_i32_be(*v)?,
        AvpValue::Unsigned64(v) => cur.write_u64_be(*v)?,
        AvpValue::Integer64(v) => cur.write_i64_be(*v)?,
        AvpValue::OctetString(b) => cur.write_bytes(b)?,
        AvpValue::Utf8String(s) => cur.write_bytes(s.as_bytes())?,
        AvpValue::Time(secs) => cur.write_u32_be(*secs)?,
        AvpValue::Enumerated(e) => cur.write_i32_be(e.value)?,
        AvpValue::Address(IpAddr::V4(addr)) => {
            cur.write_u16_be(ADDR_FAMILY_IPV4)?;
            cur.write_bytes(&addr.octets())?;
        }
        AvpValue::Address(IpAddr::V6(addr)) => {
            cur.write_u16_be(ADDR_FAMILY_IPV6)?;
            cur.write_bytes(&addr.octets())?;
        }
        // Grouped values are encoded member-by-member in protocol::codec.
        AvpValue::Grouped(_) => unreachable!("grouped values are encoded by the AVP codec"),
    }
    Ok(())
}

/// Decode exactly `len` value bytes under a non-Grouped format.
pub fn decode_value(
    format: &DataFormat,
    cur: &mut Cursor<'_>,
    len: usize,
    code: u32,
) -> CodecResult<AvpValue> {
    let fixed_len = |expected: usize| -> CodecResult<()> {
        if len == expected {
            Ok(())
        } else {
            Err(CodecError::InvalidAvpValue {
                code,
                reason: format!("{} expects {} value bytes, got {}", format.name(), expected, len),
            })
        }
    };

    let value = match format {
        DataFormat::Unsigned32 => {
            fixed_len(4)?;
            AvpValue::Unsigned32(cur.read_u32_be()?)
        }
        DataFormat::Integer32 => {
            fixed_len(4)?;
            AvpValue::Integer32(cur.read_i32_be()?)
        }
        DataFormat::Unsigned64 => {
            fixed_len(8)?;
            AvpValue::Unsigned64(cur.read_u64_be()?)
        }
        DataFormat::Integer64 => {
            fixed_len(8)?;
            AvpValue::Integer64(cur.read_i64_be()?)
        }
        DataFormat::OctetString => AvpValue::OctetString(cur.read_bytes(len)?.to_vec()),
        DataFormat::Utf8String | DataFormat::Identity => {
            let bytes = cur.read_bytes(len)?;
            let s = std::str::from_utf8(bytes).map_err(|e| CodecError::InvalidAvpValue {
                code,
                reason: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
            })?;
            AvpValue::Utf8String(s.to_string())
        }
        DataFormat::Time => {
            fixed_len(4)?;
            AvpValue::Time(cur.read_u32_be()?)
        }
        DataFormat::Address => {
            if len != 2 + 4 && len != 2 + 16 {
                return Err(CodecError::InvalidAvpValue {
                    code,
                    reason: format!("Address expects 6 or 18 value bytes, got {}", len),
                });
            }
            let family = cur.read_u16_be()?;
            match (family, len - 2) {
                (ADDR_FAMILY_IPV4, 4) => {
                    let mut octets = [0u8; 4];
                    octets.copy_from_slice(cur.read_bytes(4)?);
                    AvpValue::Address(IpAddr::from(octets))
                }
                (ADDR_FAMILY_IPV6, 16) => {
                    let mut octets = [0u8; 16];
                    octets.copy_from_slice(cur.read_bytes(16)?);
                    AvpValue::Address(IpAddr::from(octets))
                }
                (other, _) => {
                    return Err(CodecError::InvalidAvpValue {
                        code,
                        reason: format!("address family {} does not match length {}", other, len),
                    })
                }
            }
        }
        DataFormat::Enumerated(set) => {
            fixed_len(4)?;
            AvpValue::Enumerated(EnumValue::of(set, cur.read_i32_be()?))
        }
        DataFormat::Grouped => unreachable!("grouped values are decoded by the AVP codec"),
    };
    Ok(value)
}

/// Current time in the Time format (NTP seconds).
pub fn ntp_now() -> u32 {
    let unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    ntp_from_unix(unix)
}

/// Convert Unix seconds to NTP seconds (wraps in 2036, like the wire format).
pub fn ntp_from_unix(unix_secs: u64) -> u32 {
    (unix_secs as u32).wrapping_add(NTP_UNIX_OFFSET)
}

/// Convert NTP seconds back to Unix seconds.
pub fn unix_from_ntp(ntp_secs: u32) -> u64 {
    u64::from(ntp_secs.wrapping_sub(NTP_UNIX_OFFSET))
}
