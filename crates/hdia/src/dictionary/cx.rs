// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cx/Dx interface dictionary (3GPP TS 29.228 / TS 29.229, vendor 10415)
//!
//! The Cx interface connects the IMS CSCF to the HSS for registration,
//! authorization and authentication of SIP users.

use crate::dictionary::Command;
use crate::protocol::avp::AvpType;
use crate::protocol::constants::{APP_3GPP_CX, VENDOR_3GPP};
use crate::protocol::format::{DataFormat, EnumValueSet};
use crate::protocol::message::ApplicationId;

/// Cx/Dx application id (TS 29.228).
pub const APPLICATION: u32 = APP_3GPP_CX;

/// Vendor-qualified application id for session and request stamping.
pub const APPLICATION_ID: ApplicationId = ApplicationId::auth_vendor(APP_3GPP_CX, VENDOR_3GPP);

// ============================================================================
// Experimental result codes (TS 29.229 Sec.6.2)
// ============================================================================

pub const DIAMETER_ERROR_USER_UNKNOWN: u32 = 5001;
pub const DIAMETER_ERROR_IDENTITIES_DONT_MATCH: u32 = 5002;
pub const DIAMETER_ERROR_AUTH_SCHEME_NOT_SUPPORTED: u32 = 5006;

// ============================================================================
// Enumerated value sets (TS 29.229 Sec.6.3)
// ============================================================================

pub static SERVER_ASSIGNMENT_TYPE_VALUES: EnumValueSet = EnumValueSet {
    name: "Server-Assignment-Type",
    values: &[
        (0, "NO_ASSIGNMENT"),
        (1, "REGISTRATION"),
        (2, "RE_REGISTRATION"),
        (3, "UNREGISTERED_USER"),
        (4, "TIMEOUT_DEREGISTRATION"),
        (5, "USER_DEREGISTRATION"),
        (6, "TIMEOUT_DEREGISTRATION_STORE_SERVER_NAME"),
        (7, "USER_DEREGISTRATION_STORE_SERVER_NAME"),
        (8, "ADMINISTRATIVE_DEREGISTRATION"),
        (9, "AUTHENTICATION_FAILURE"),
        (10, "AUTHENTICATION_TIMEOUT"),
        (11, "DEREGISTRATION_TOO_MUCH_DATA"),
    ],
};

pub static USER_DATA_ALREADY_AVAILABLE_VALUES: EnumValueSet = EnumValueSet {
    name: "User-Data-Already-Available",
    values: &[(0, "USER_DATA_NOT_AVAILABLE"), (1, "USER_DATA_ALREADY_AVAILABLE")],
};

pub static REASON_CODE_VALUES: EnumValueSet = EnumValueSet {
    name: "Reason-Code",
    values: &[
        (0, "PERMANENT_TERMINATION"),
        (1, "NEW_SERVER_ASSIGNED"),
        (2, "SERVER_CHANGE"),
        (3, "REMOVE_SCSCF"),
    ],
};

// ============================================================================
// AVP types (TS 29.229 Sec.6.3)
// ============================================================================

const fn cx(code: u32, name: &'static str, format: DataFormat) -> AvpType {
    AvpType::vendor(code, VENDOR_3GPP, name, format)
}

pub static VISITED_NETWORK_IDENTIFIER: AvpType =
    cx(600, "Visited-Network-Identifier", DataFormat::OctetString);
pub static PUBLIC_IDENTITY: AvpType = cx(601, "Public-Identity", DataFormat::Utf8String);
pub static SERVER_NAME: AvpType = cx(602, "Server-Name", DataFormat::Utf8String);
pub static SERVER_CAPABILITIES: AvpType = cx(603, "Server-Capabilities", DataFormat::Grouped);
pub static MANDATORY_CAPABILITY: AvpType =
    cx(604, "Mandatory-Capability", DataFormat::Unsigned32);
pub static OPTIONAL_CAPABILITY: AvpType = cx(605, "Optional-Capability", DataFormat::Unsigned32);
pub static USER_DATA: AvpType = cx(606, "User-Data", DataFormat::OctetString);
pub static SIP_NUMBER_AUTH_ITEMS: AvpType =
    cx(607, "SIP-Number-Auth-Items", DataFormat::Unsigned32);
pub static SIP_AUTHENTICATION_SCHEME: AvpType =
    cx(608, "SIP-Authentication-Scheme", DataFormat::Utf8String);
pub static SIP_AUTHENTICATE: AvpType = cx(609, "SIP-Authenticate", DataFormat::OctetString);
pub static SIP_AUTHORIZATION: AvpType = cx(610, "SIP-Authorization", DataFormat::OctetString);
pub static SIP_AUTHENTICATION_CONTEXT: AvpType =
    cx(611, "SIP-Authentication-Context", DataFormat::OctetString);
pub static SIP_AUTH_DATA_ITEM: AvpType = cx(612, "SIP-Auth-Data-Item", DataFormat::Grouped);
pub static SIP_ITEM_NUMBER: AvpType = cx(613, "SIP-Item-Number", DataFormat::Unsigned32);
pub static SERVER_ASSIGNMENT_TYPE: AvpType = cx(
    614,
    "Server-Assignment-Type",
    DataFormat::Enumerated(&SERVER_ASSIGNMENT_TYPE_VALUES),
);
pub static DEREGISTRATION_REASON: AvpType =
    cx(615, "Deregistration-Reason", DataFormat::Grouped);
pub static REASON_CODE: AvpType =
    cx(616, "Reason-Code", DataFormat::Enumerated(&REASON_CODE_VALUES));
pub static REASON_INFO: AvpType = cx(617, "Reason-Info", DataFormat::Utf8String);
pub static CHARGING_INFORMATION: AvpType =
    cx(618, "Charging-Information", DataFormat::Grouped);
pub static USER_DATA_ALREADY_AVAILABLE: AvpType = cx(
    624,
    "User-Data-Already-Available",
    DataFormat::Enumerated(&USER_DATA_ALREADY_AVAILABLE_VALUES),
);
pub static CONFIDENTIALITY_KEY: AvpType =
    cx(625, "Confidentiality-Key", DataFormat::OctetString);
pub static INTEGRITY_KEY: AvpType = cx(626, "Integrity-Key", DataFormat::OctetString);

/// Registration table for the Cx AVP types.
pub static TYPES: &[&AvpType] = &[
    &VISITED_NETWORK_IDENTIFIER,
    &PUBLIC_IDENTITY,
    &SERVER_NAME,
    &SERVER_CAPABILITIES,
    &MANDATORY_CAPABILITY,
    &OPTIONAL_CAPABILITY,
    &USER_DATA,
    &SIP_NUMBER_AUTH_ITEMS,
    &SIP_AUTHENTICATION_SCHEME,
    &SIP_AUTHENTICATE,
    &SIP_AUTHORIZATION,
    &SIP_AUTHENTICATION_CONTEXT,
    &SIP_AUTH_DATA_ITEM,
    &SIP_ITEM_NUMBER,
    &SERVER_ASSIGNMENT_TYPE,
    &DEREGISTRATION_REASON,
    &REASON_CODE,
    &REASON_INFO,
    &CHARGING_INFORMATION,
    &USER_DATA_ALREADY_AVAILABLE,
    &CONFIDENTIALITY_KEY,
    &INTEGRITY_KEY,
];

// ============================================================================
// Commands (TS 29.228 Sec.6.1)
// ============================================================================

pub static UAR: Command = Command::request(300, "User-Authorization-Request");
pub static UAA: Command = Command::answer(300, "User-Authorization-Answer");
pub static SAR: Command = Command::request(301, "Server-Assignment-Request");
pub static SAA: Command = Command::answer(301, "Server-Assignment-Answer");
pub static LIR: Command = Command::request(302, "Location-Info-Request");
pub static LIA: Command = Command::answer(302, "Location-Info-Answer");
pub static MAR: Command = Command::request(303, "Multimedia-Auth-Request");
pub static MAA: Command = Command::answer(303, "Multimedia-Auth-Answer");
pub static RTR: Command = Command::request(304, "Registration-Termination-Request");
pub static RTA: Command = Command::answer(304, "Registration-Termination-Answer");
pub static PPR: Command = Command::request(305, "Push-Profile-Request");
pub static PPA: Command = Command::answer(305, "Push-Profile-Answer");

/// Registration table for the Cx commands.
pub static COMMANDS: &[&Command] = &[
    &UAR, &UAA, &SAR, &SAA, &LIR, &LIA, &MAR, &MAA, &RTR, &RTA, &PPR, &PPA,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_carry_the_3gpp_vendor() {
        for avp_type in TYPES {
            assert_eq!(avp_type.vendor_id, VENDOR_3GPP, "{}", avp_type.name);
        }
    }

    #[test]
    fn test_application_id_is_vendor_specific() {
        assert!(APPLICATION_ID.is_vendor_specific());
        assert_eq!(APPLICATION_ID.id, 16_777_216);
        assert_eq!(APPLICATION_ID.vendor_id, 10415);
    }

    #[test]
    fn test_server_assignment_type_set() {
        assert_eq!(
            SERVER_ASSIGNMENT_TYPE_VALUES.name_of(1),
            Some("REGISTRATION")
        );
        assert_eq!(SERVER_ASSIGNMENT_TYPE_VALUES.value_of("NO_ASSIGNMENT"), Some(0));
        assert_eq!(SERVER_ASSIGNMENT_TYPE_VALUES.name_of(77), None);
    }
}
