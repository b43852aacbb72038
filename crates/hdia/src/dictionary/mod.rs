// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type and command dictionaries
//!
//! The [`TypeRegistry`] maps `(AVP code, vendor-id)` to a static
//! [`AvpType`] descriptor; the [`CommandDictionary`] maps
//! `(application-id, command-code, R-bit)` to a [`Command`] used for
//! classification and diagnostics. Both are built once at startup from
//! static tables and shared by reference afterwards: no global mutable
//! state, and registration order never matters because duplicates are a
//! configuration error rather than last-writer-wins.
//!
//! Shipped tables:
//! - [`base`] - RFC 3588 base protocol AVPs, commands, result codes
//! - [`cx`] - 3GPP Cx/Dx (TS 29.228/29.229, vendor 10415)
//! - [`sh`] - 3GPP Sh (TS 29.328/29.329, vendor 10415)
//!
//! Applications add their own tables the same way the shipped ones are
//! declared: static [`AvpType`]/[`Command`] items (with
//! [`crate::protocol::EnumValueSet`] tables for their enumerations)
//! registered before any traffic is processed.

pub mod base;
pub mod cx;
pub mod sh;

use crate::protocol::avp::AvpType;
use crate::protocol::constants::APP_COMMON_MESSAGES;
use std::collections::HashMap;
use std::fmt;

/// Startup-time dictionary configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    /// An `(AVP code, vendor-id)` pair was registered twice.
    DuplicateType { code: u32, vendor_id: u32 },
    /// An `(application-id, command-code, R-bit)` triple was registered twice.
    DuplicateCommand {
        application_id: u32,
        code: u32,
        request: bool,
    },
}

impl fmt::Display for DictionaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryError::DuplicateType { code, vendor_id } => {
                write!(
                    f,
                    "duplicate AVP type registration: code {} vendor {}",
                    code, vendor_id
                )
            }
            DictionaryError::DuplicateCommand {
                application_id,
                code,
                request,
            } => {
                write!(
                    f,
                    "duplicate command registration: app {} code {} request {}",
                    application_id, code, request
                )
            }
        }
    }
}

impl std::error::Error for DictionaryError {}

/// Immutable `(code, vendor-id) -> AvpType` mapping.
///
/// Lookup is by exact pair; a code under one vendor is unrelated to the same
/// code under another vendor or under no vendor.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<(u32, u32), &'static AvpType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the shipped base, Cx and Sh tables.
    pub fn with_defaults() -> Result<Self, DictionaryError> {
        let mut reg = Self::new();
        reg.register_all(base::TYPES)?;
        reg.register_all(cx::TYPES)?;
        reg.register_all(sh::TYPES)?;
        Ok(reg)
    }

    pub fn register(&mut self, avp_type: &'static AvpType) -> Result<(), DictionaryError> {
        let key = (avp_type.code, avp_type.vendor_id);
        if self.types.contains_key(&key) {
            return Err(DictionaryError::DuplicateType {
                code: avp_type.code,
                vendor_id: avp_type.vendor_id,
            });
        }
        self.types.insert(key, avp_type);
        Ok(())
    }

    pub fn register_all(
        &mut self,
        table: &[&'static AvpType],
    ) -> Result<(), DictionaryError> {
        for &avp_type in table {
            self.register(avp_type)?;
        }
        Ok(())
    }

    pub fn lookup(&self, code: u32, vendor_id: u32) -> Option<&'static AvpType> {
        self.types.get(&(code, vendor_id)).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Static command descriptor. Request and answer share a code; the `request`
/// flag records which of the pair this descriptor names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub code: u32,
    pub name: &'static str,
    pub request: bool,
}

impl Command {
    pub const fn request(code: u32, name: &'static str) -> Self {
        Self {
            code,
            name,
            request: true,
        }
    }

    pub const fn answer(code: u32, name: &'static str) -> Self {
        Self {
            code,
            name,
            request: false,
        }
    }
}

/// Immutable `(application-id, command-code, R-bit) -> Command` mapping.
///
/// Used for logging and dispatch diagnostics only: decoding never requires a
/// command entry.
#[derive(Debug, Default)]
pub struct CommandDictionary {
    commands: HashMap<(u32, u32, bool), &'static Command>,
}

impl CommandDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary pre-loaded with the shipped base, Cx and Sh commands.
    pub fn with_defaults() -> Result<Self, DictionaryError> {
        let mut dict = Self::new();
        dict.register_all(APP_COMMON_MESSAGES, base::COMMANDS)?;
        dict.register_all(cx::APPLICATION, cx::COMMANDS)?;
        dict.register_all(sh::APPLICATION, sh::COMMANDS)?;
        Ok(dict)
    }

    pub fn register(
        &mut self,
        application_id: u32,
        command: &'static Command,
    ) -> Result<(), DictionaryError> {
        let key = (application_id, command.code, command.request);
        if self.commands.contains_key(&key) {
            return Err(DictionaryError::DuplicateCommand {
                application_id,
                code: command.code,
                request: command.request,
            });
        }
        self.commands.insert(key, command);
        Ok(())
    }

    pub fn register_all(
        &mut self,
        application_id: u32,
        table: &[&'static Command],
    ) -> Result<(), DictionaryError> {
        for &command in table {
            self.register(application_id, command)?;
        }
        Ok(())
    }

    /// Resolve a command for diagnostics.
    ///
    /// Exact `(application-id, code, R)` first, then the common-message
    /// table: base commands such as STR/STA travel under the application id
    /// of the session that terminates.
    pub fn lookup(&self, application_id: u32, code: u32, request: bool) -> Option<&'static Command> {
        self.commands
            .get(&(application_id, code, request))
            .or_else(|| self.commands.get(&(APP_COMMON_MESSAGES, code, request)))
            .copied()
    }

    /// Human-readable command name, `"Unknown"` when no entry exists.
    pub fn name_of(&self, application_id: u32, code: u32, request: bool) -> &'static str {
        self.lookup(application_id, code, request)
            .map_or("Unknown", |c| c.name)
    }
}
