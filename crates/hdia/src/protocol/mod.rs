// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Diameter wire protocol implementation
//!
//! This module contains the core wire-format components:
//! - Constants: header sizes, flag masks, command codes, result codes
//! - AVP model: [`Avp`], [`AvpList`], [`AvpValue`], [`AvpType`]
//! - Data format codecs: integers, strings, time, address, enumerated
//! - AVP codec: header + value + padding against the type registry
//! - Message codec: fixed 20-byte header plus an ordered AVP body

pub mod avp;
pub mod codec;
pub mod constants;
pub mod format;
pub mod message;

pub use avp::{Avp, AvpList, AvpType, AvpValue};
pub use format::{DataFormat, EnumValue, EnumValueSet};
pub use message::{ApplicationId, ApplicationIdKind, Message};

use crate::ser::SerError;
use std::fmt;

/// Result type for wire codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding Diameter frames.
///
/// A codec error aborts the decode of the current message. Most variants are
/// message-level and, for a well-framed request, map to a protocol rejection
/// result code via [`CodecError::result_code`]. A bad Version byte poisons
/// the framing itself and is connection-fatal.
#[derive(Debug)]
pub enum CodecError {
    /// Version byte is not 1. The byte stream can no longer be trusted.
    UnsupportedVersion(u8),
    /// Message Length field disagrees with the bytes actually present.
    InvalidMessageLength { declared: usize, actual: usize },
    /// AVP Length below the minimum header size or past the message end.
    InvalidAvpLength { code: u32, declared: u32 },
    /// Value bytes do not parse under the registered data format.
    InvalidAvpValue { code: u32, reason: String },
    /// Cursor-level failure (truncated buffer).
    Ser(SerError),
}

impl CodecError {
    /// True when the error invalidates the whole connection, not just the
    /// message (a corrupt Version byte means framing is lost).
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self, CodecError::UnsupportedVersion(_))
    }

    /// Protocol result code for a rejection answer, where one is defined
    /// (RFC 3588 Sec.7.1).
    pub fn result_code(&self) -> Option<u32> {
        match self {
            CodecError::UnsupportedVersion(_) => Some(constants::DIAMETER_UNSUPPORTED_VERSION),
            CodecError::InvalidMessageLength { .. } => {
                Some(constants::DIAMETER_INVALID_MESSAGE_LENGTH)
            }
            CodecError::InvalidAvpLength { .. } => Some(constants::DIAMETER_INVALID_AVP_LENGTH),
            CodecError::InvalidAvpValue { .. } => Some(constants::DIAMETER_INVALID_AVP_VALUE),
            CodecError::Ser(_) => None,
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnsupportedVersion(v) => {
                write!(f, "unsupported Diameter version {}", v)
            }
            CodecError::InvalidMessageLength { declared, actual } => {
                write!(
                    f,
                    "message length field {} does not match {} bytes on the wire",
                    declared, actual
                )
            }
            CodecError::InvalidAvpLength { code, declared } => {
                write!(f, "AVP {} declares invalid length {}", code, declared)
            }
            CodecError::InvalidAvpValue { code, reason } => {
                write!(f, "AVP {} value invalid: {}", code, reason)
            }
            CodecError::Ser(e) => write!(f, "serialization failed: {}", e),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Ser(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SerError> for CodecError {
    fn from(e: SerError) -> Self {
        CodecError::Ser(e)
    }
}
