// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AVP data model: typed attribute-value pairs and ordered AVP lists.
//!
//! An [`Avp`] carries its code, vendor id, flag byte and a decoded
//! [`AvpValue`]. The value variant is self-describing for encoding; the
//! [`crate::dictionary::TypeRegistry`] is only consulted when decoding, to
//! pick the variant for a given `(code, vendor-id)` pair.

use crate::protocol::constants::{
    pad4, AVP_FLAG_MANDATORY, AVP_FLAG_PROTECTED, AVP_FLAG_VENDOR, AVP_HDR_LEN,
    AVP_VENDOR_HDR_LEN,
};
use crate::protocol::format::{DataFormat, EnumValue};
use std::fmt;
use std::net::IpAddr;

/// Static descriptor of an AVP type: identity, name, and data format.
///
/// Identity is the `(code, vendor_id)` pair; `vendor_id == 0` means no
/// vendor. Two types with the same code under different vendor ids are
/// unrelated. Instances are `'static` dictionary entries, immutable once
/// registered.
#[derive(Debug)]
pub struct AvpType {
    pub code: u32,
    pub vendor_id: u32,
    pub name: &'static str,
    pub format: DataFormat,
    /// Default M flag for AVPs created from this type.
    pub mandatory: bool,
    /// Default P flag for AVPs created from this type.
    pub protected: bool,
}

impl AvpType {
    /// Descriptor for a base (no-vendor) AVP, mandatory by default.
    pub const fn base(code: u32, name: &'static str, format: DataFormat) -> Self {
        Self {
            code,
            vendor_id: 0,
            name,
            format,
            mandatory: true,
            protected: false,
        }
    }

    /// Descriptor for a vendor-specific AVP, mandatory by default.
    pub const fn vendor(code: u32, vendor_id: u32, name: &'static str, format: DataFormat) -> Self {
        Self {
            code,
            vendor_id,
            name,
            format,
            mandatory: true,
            protected: false,
        }
    }

    /// Clear the default M flag (for optional AVPs such as Firmware-Revision).
    pub const fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    /// Default flag byte for AVPs created from this type.
    pub fn default_flags(&self) -> u8 {
        let mut flags = 0u8;
        if self.vendor_id != 0 {
            flags |= AVP_FLAG_VENDOR;
        }
        if self.mandatory {
            flags |= AVP_FLAG_MANDATORY;
        }
        if self.protected {
            flags |= AVP_FLAG_PROTECTED;
        }
        flags
    }
}

impl fmt::Display for AvpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vendor_id == 0 {
            write!(f, "{}({})", self.name, self.code)
        } else {
            write!(f, "{}({}/{})", self.name, self.code, self.vendor_id)
        }
    }
}

/// Decoded AVP value, one variant per data format.
///
/// `OctetString` doubles as the raw fallback for AVPs whose `(code,
/// vendor-id)` is not registered, so unknown AVPs survive a decode/encode
/// round-trip byte-for-byte (relay semantics).
#[derive(Debug, Clone, PartialEq)]
pub enum AvpValue {
    Unsigned32(u32),
    Integer32(i32),
    Unsigned64(u64),
    Integer64(i64),
    OctetString(Vec<u8>),
    Utf8String(String),
    Address(IpAddr),
    /// Seconds since the NTP epoch (1900-01-01), RFC 3588 Sec.4.3.
    Time(u32),
    Enumerated(EnumValue),
    Grouped(AvpList),
}

impl AvpValue {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            AvpValue::Unsigned32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            AvpValue::Integer32(v) => Some(*v),
            AvpValue::Enumerated(e) => Some(e.value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AvpValue::Utf8String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AvpValue::OctetString(b) => Some(b),
            AvpValue::Utf8String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_grouped(&self) -> Option<&AvpList> {
        match self {
            AvpValue::Grouped(list) => Some(list),
            _ => None,
        }
    }
}

impl From<u32> for AvpValue {
    fn from(v: u32) -> Self {
        AvpValue::Unsigned32(v)
    }
}

impl From<i32> for AvpValue {
    fn from(v: i32) -> Self {
        AvpValue::Integer32(v)
    }
}

impl From<u64> for AvpValue {
    fn from(v: u64) -> Self {
        AvpValue::Unsigned64(v)
    }
}

impl From<i64> for AvpValue {
    fn from(v: i64) -> Self {
        AvpValue::Integer64(v)
    }
}

impl From<&str> for AvpValue {
    fn from(v: &str) -> Self {
        AvpValue::Utf8String(v.to_string())
    }
}

impl From<String> for AvpValue {
    fn from(v: String) -> Self {
        AvpValue::Utf8String(v)
    }
}

impl From<Vec<u8>> for AvpValue {
    fn from(v: Vec<u8>) -> Self {
        AvpValue::OctetString(v)
    }
}

impl From<&[u8]> for AvpValue {
    fn from(v: &[u8]) -> Self {
        AvpValue::OctetString(v.to_vec())
    }
}

impl From<IpAddr> for AvpValue {
    fn from(v: IpAddr) -> Self {
        AvpValue::Address(v)
    }
}

impl From<AvpList> for AvpValue {
    fn from(v: AvpList) -> Self {
        AvpValue::Grouped(v)
    }
}

/// A single attribute-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Avp {
    pub code: u32,
    /// 0 when the V flag is clear.
    pub vendor_id: u32,
    /// Raw flag byte (V/M/P in the high bits, rest reserved).
    pub flags: u8,
    pub value: AvpValue,
}

impl Avp {
    /// Build an AVP from a dictionary type, applying the type's default flags.
    pub fn new(avp_type: &AvpType, value: impl Into<AvpValue>) -> Self {
        Self {
            code: avp_type.code,
            vendor_id: avp_type.vendor_id,
            flags: avp_type.default_flags(),
            value: value.into(),
        }
    }

    /// Build a raw AVP from wire-level fields (unknown-type fallback).
    pub fn raw(code: u32, vendor_id: u32, flags: u8, data: Vec<u8>) -> Self {
        Self {
            code,
            vendor_id,
            flags,
            value: AvpValue::OctetString(data),
        }
    }

    pub fn is_vendor_specific(&self) -> bool {
        self.flags & AVP_FLAG_VENDOR != 0
    }

    pub fn is_mandatory(&self) -> bool {
        self.flags & AVP_FLAG_MANDATORY != 0
    }

    pub fn is_protected(&self) -> bool {
        self.flags & AVP_FLAG_PROTECTED != 0
    }

    /// AVP header size for this AVP (8, or 12 with Vendor-Id).
    pub fn header_len(&self) -> usize {
        if self.is_vendor_specific() {
            AVP_VENDOR_HDR_LEN
        } else {
            AVP_HDR_LEN
        }
    }

    /// Header + value length, the number recorded in the AVP Length field
    /// (padding excluded, RFC 3588 Sec.4.1).
    pub fn unpadded_len(&self) -> usize {
        self.header_len() + crate::protocol::format::value_len(&self.value)
    }

    /// On-wire footprint including trailing padding to a 4-byte boundary.
    pub fn wire_len(&self) -> usize {
        pad4(self.unpadded_len())
    }
}

/// Ordered sequence of heterogeneous AVPs.
///
/// Insertion order is preserved (wire-significant inside some Grouped AVPs);
/// lookup is by `(code, vendor-id)` and returns the first or all matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvpList {
    avps: Vec<Avp>,
}

impl AvpList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, avp: Avp) {
        self.avps.push(avp);
    }

    /// First AVP with the given code and vendor id.
    pub fn get(&self, code: u32, vendor_id: u32) -> Option<&Avp> {
        self.avps
            .iter()
            .find(|a| a.code == code && a.vendor_id == vendor_id)
    }

    /// All AVPs with the given code and vendor id, in list order.
    pub fn get_all(&self, code: u32, vendor_id: u32) -> impl Iterator<Item = &Avp> {
        self.avps
            .iter()
            .filter(move |a| a.code == code && a.vendor_id == vendor_id)
    }

    /// First AVP matching a dictionary type.
    pub fn get_typed(&self, avp_type: &AvpType) -> Option<&Avp> {
        self.get(avp_type.code, avp_type.vendor_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Avp> {
        self.avps.iter()
    }

    pub fn len(&self) -> usize {
        self.avps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avps.is_empty()
    }

    /// Sum of the members' on-wire footprints (each independently padded).
    ///
    /// Also the declared value length of a Grouped AVP wrapping this list:
    /// member footprints are multiples of 4, so a Grouped value needs no
    /// trailing padding of its own.
    pub fn wire_len(&self) -> usize {
        self.avps.iter().map(Avp::wire_len).sum()
    }
}

impl<'a> IntoIterator for &'a AvpList {
    type Item = &'a Avp;
    type IntoIter = std::slice::Iter<'a, Avp>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for AvpList {
    type Item = Avp;
    type IntoIter = std::vec::IntoIter<Avp>;

    fn into_iter(self) -> Self::IntoIter {
        self.avps.into_iter()
    }
}

impl FromIterator<Avp> for AvpList {
    fn from_iter<T: IntoIterator<Item = Avp>>(iter: T) -> Self {
        Self {
            avps: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::format::DataFormat;

    static TEST_TYPE: AvpType = AvpType::base(9901, "Test-Attr", DataFormat::Unsigned32);
    static TEST_VENDOR_TYPE: AvpType =
        AvpType::vendor(9902, 10415, "Test-Vendor-Attr", DataFormat::OctetString);

    #[test]
    fn test_default_flags_from_type() {
        let avp = Avp::new(&TEST_TYPE, 7u32);
        assert!(avp.is_mandatory());
        assert!(!avp.is_vendor_specific());
        assert_eq!(avp.header_len(), 8);

        let avp = Avp::new(&TEST_VENDOR_TYPE, vec![1, 2, 3]);
        assert!(avp.is_vendor_specific());
        assert_eq!(avp.vendor_id, 10415);
        assert_eq!(avp.header_len(), 12);
    }

    #[test]
    fn test_optional_clears_mandatory_default() {
        static OPT: AvpType = AvpType::base(9903, "Opt-Attr", DataFormat::Unsigned32).optional();
        let avp = Avp::new(&OPT, 1u32);
        assert!(!avp.is_mandatory());
    }

    #[test]
    fn test_unpadded_and_wire_len() {
        // 1-byte octet string under a vendor type: 12 header + 1 value,
        // padded to 16 on the wire.
        let avp = Avp::new(&TEST_VENDOR_TYPE, vec![13u8]);
        assert_eq!(avp.unpadded_len(), 13);
        assert_eq!(avp.wire_len(), 16);

        // 4-byte scalar without vendor id: already aligned.
        let avp = Avp::new(&TEST_TYPE, 1u32);
        assert_eq!(avp.unpadded_len(), 12);
        assert_eq!(avp.wire_len(), 12);
    }

    #[test]
    fn test_list_lookup_first_and_all() {
        let mut list = AvpList::new();
        list.add(Avp::new(&TEST_TYPE, 1u32));
        list.add(Avp::new(&TEST_VENDOR_TYPE, vec![1]));
        list.add(Avp::new(&TEST_TYPE, 2u32));

        let first = list.get(9901, 0).expect("first match");
        assert_eq!(first.value.as_u32(), Some(1));
        assert_eq!(list.get_all(9901, 0).count(), 2);
        // Vendor-qualified lookup is a distinct namespace
        assert!(list.get(9902, 0).is_none());
        assert!(list.get(9902, 10415).is_some());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut list = AvpList::new();
        for v in [5u32, 3, 9] {
            list.add(Avp::new(&TEST_TYPE, v));
        }
        let order: Vec<u32> = list.iter().filter_map(|a| a.value.as_u32()).collect();
        assert_eq!(order, vec![5, 3, 9]);
    }

    #[test]
    fn test_grouped_list_wire_len_sums_padded_members() {
        let mut inner = AvpList::new();
        inner.add(Avp::new(&TEST_VENDOR_TYPE, vec![13u8])); // 16 padded
        inner.add(Avp::new(&TEST_TYPE, 1u32)); // 12
        assert_eq!(inner.wire_len(), 28);
    }
}
