// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Base protocol dictionary (RFC 3588 Sec.4.5 and Sec.8)
//!
//! AVP types and commands every Diameter node understands, independent of
//! any application.

use crate::dictionary::Command;
use crate::protocol::avp::AvpType;
use crate::protocol::format::{DataFormat, EnumValueSet};

// ============================================================================
// Enumerated value sets
// ============================================================================

pub static AUTH_SESSION_STATE_VALUES: EnumValueSet = EnumValueSet {
    name: "Auth-Session-State",
    values: &[(0, "STATE_MAINTAINED"), (1, "NO_STATE_MAINTAINED")],
};

pub static DISCONNECT_CAUSE_VALUES: EnumValueSet = EnumValueSet {
    name: "Disconnect-Cause",
    values: &[
        (0, "REBOOTING"),
        (1, "BUSY"),
        (2, "DO_NOT_WANT_TO_TALK_TO_YOU"),
    ],
};

pub static RE_AUTH_REQUEST_TYPE_VALUES: EnumValueSet = EnumValueSet {
    name: "Re-Auth-Request-Type",
    values: &[(0, "AUTHORIZE_ONLY"), (1, "AUTHORIZE_AUTHENTICATE")],
};

pub static TERMINATION_CAUSE_VALUES: EnumValueSet = EnumValueSet {
    name: "Termination-Cause",
    values: &[
        (1, "DIAMETER_LOGOUT"),
        (2, "DIAMETER_SERVICE_NOT_PROVIDED"),
        (3, "DIAMETER_BAD_ANSWER"),
        (4, "DIAMETER_ADMINISTRATIVE"),
        (5, "DIAMETER_LINK_BROKEN"),
        (6, "DIAMETER_AUTH_EXPIRED"),
        (7, "DIAMETER_USER_MOVED"),
        (8, "DIAMETER_SESSION_TIMEOUT"),
    ],
};

pub static ACCOUNTING_RECORD_TYPE_VALUES: EnumValueSet = EnumValueSet {
    name: "Accounting-Record-Type",
    values: &[
        (1, "EVENT_RECORD"),
        (2, "START_RECORD"),
        (3, "INTERIM_RECORD"),
        (4, "STOP_RECORD"),
    ],
};

// ============================================================================
// AVP types
// ============================================================================

pub static USER_NAME: AvpType = AvpType::base(1, "User-Name", DataFormat::Utf8String);
pub static CLASS: AvpType = AvpType::base(25, "Class", DataFormat::OctetString);
pub static PROXY_STATE: AvpType = AvpType::base(33, "Proxy-State", DataFormat::OctetString);
pub static EVENT_TIMESTAMP: AvpType = AvpType::base(55, "Event-Timestamp", DataFormat::Time);
pub static HOST_IP_ADDRESS: AvpType = AvpType::base(257, "Host-IP-Address", DataFormat::Address);
pub static AUTH_APPLICATION_ID: AvpType =
    AvpType::base(258, "Auth-Application-Id", DataFormat::Unsigned32);
pub static ACCT_APPLICATION_ID: AvpType =
    AvpType::base(259, "Acct-Application-Id", DataFormat::Unsigned32);
pub static VENDOR_SPECIFIC_APPLICATION_ID: AvpType =
    AvpType::base(260, "Vendor-Specific-Application-Id", DataFormat::Grouped);
pub static SESSION_ID: AvpType = AvpType::base(263, "Session-Id", DataFormat::Utf8String);
pub static ORIGIN_HOST: AvpType = AvpType::base(264, "Origin-Host", DataFormat::Identity);
pub static SUPPORTED_VENDOR_ID: AvpType =
    AvpType::base(265, "Supported-Vendor-Id", DataFormat::Unsigned32);
pub static VENDOR_ID: AvpType = AvpType::base(266, "Vendor-Id", DataFormat::Unsigned32);
pub static FIRMWARE_REVISION: AvpType =
    AvpType::base(267, "Firmware-Revision", DataFormat::Unsigned32).optional();
pub static RESULT_CODE: AvpType = AvpType::base(268, "Result-Code", DataFormat::Unsigned32);
pub static PRODUCT_NAME: AvpType =
    AvpType::base(269, "Product-Name", DataFormat::Utf8String).optional();
pub static DISCONNECT_CAUSE: AvpType = AvpType::base(
    273,
    "Disconnect-Cause",
    DataFormat::Enumerated(&DISCONNECT_CAUSE_VALUES),
);
pub static AUTH_SESSION_STATE: AvpType = AvpType::base(
    277,
    "Auth-Session-State",
    DataFormat::Enumerated(&AUTH_SESSION_STATE_VALUES),
);
pub static ORIGIN_STATE_ID: AvpType =
    AvpType::base(278, "Origin-State-Id", DataFormat::Unsigned32);
pub static FAILED_AVP: AvpType = AvpType::base(279, "Failed-AVP", DataFormat::Grouped);
pub static PROXY_HOST: AvpType = AvpType::base(280, "Proxy-Host", DataFormat::Identity);
pub static ERROR_MESSAGE: AvpType =
    AvpType::base(281, "Error-Message", DataFormat::Utf8String).optional();
pub static ROUTE_RECORD: AvpType = AvpType::base(282, "Route-Record", DataFormat::Identity);
pub static DESTINATION_REALM: AvpType =
    AvpType::base(283, "Destination-Realm", DataFormat::Identity);
pub static PROXY_INFO: AvpType = AvpType::base(284, "Proxy-Info", DataFormat::Grouped);
pub static RE_AUTH_REQUEST_TYPE: AvpType = AvpType::base(
    285,
    "Re-Auth-Request-Type",
    DataFormat::Enumerated(&RE_AUTH_REQUEST_TYPE_VALUES),
);
pub static REDIRECT_HOST: AvpType = AvpType::base(292, "Redirect-Host", DataFormat::Identity);
pub static DESTINATION_HOST: AvpType =
    AvpType::base(293, "Destination-Host", DataFormat::Identity);
pub static ERROR_REPORTING_HOST: AvpType =
    AvpType::base(294, "Error-Reporting-Host", DataFormat::Identity).optional();
pub static TERMINATION_CAUSE: AvpType = AvpType::base(
    295,
    "Termination-Cause",
    DataFormat::Enumerated(&TERMINATION_CAUSE_VALUES),
);
pub static ORIGIN_REALM: AvpType = AvpType::base(296, "Origin-Realm", DataFormat::Identity);
pub static EXPERIMENTAL_RESULT: AvpType =
    AvpType::base(297, "Experimental-Result", DataFormat::Grouped);
pub static EXPERIMENTAL_RESULT_CODE: AvpType =
    AvpType::base(298, "Experimental-Result-Code", DataFormat::Unsigned32);
pub static ACCOUNTING_RECORD_TYPE: AvpType = AvpType::base(
    480,
    "Accounting-Record-Type",
    DataFormat::Enumerated(&ACCOUNTING_RECORD_TYPE_VALUES),
);
pub static ACCOUNTING_RECORD_NUMBER: AvpType =
    AvpType::base(485, "Accounting-Record-Number", DataFormat::Unsigned32);

/// Registration table for the base AVP types.
pub static TYPES: &[&AvpType] = &[
    &USER_NAME,
    &CLASS,
    &PROXY_STATE,
    &EVENT_TIMESTAMP,
    &HOST_IP_ADDRESS,
    &AUTH_APPLICATION_ID,
    &ACCT_APPLICATION_ID,
    &VENDOR_SPECIFIC_APPLICATION_ID,
    &SESSION_ID,
    &ORIGIN_HOST,
    &SUPPORTED_VENDOR_ID,
    &VENDOR_ID,
    &FIRMWARE_REVISION,
    &RESULT_CODE,
    &PRODUCT_NAME,
    &DISCONNECT_CAUSE,
    &AUTH_SESSION_STATE,
    &ORIGIN_STATE_ID,
    &FAILED_AVP,
    &PROXY_HOST,
    &ERROR_MESSAGE,
    &ROUTE_RECORD,
    &DESTINATION_REALM,
    &PROXY_INFO,
    &RE_AUTH_REQUEST_TYPE,
    &REDIRECT_HOST,
    &DESTINATION_HOST,
    &ERROR_REPORTING_HOST,
    &TERMINATION_CAUSE,
    &ORIGIN_REALM,
    &EXPERIMENTAL_RESULT,
    &EXPERIMENTAL_RESULT_CODE,
    &ACCOUNTING_RECORD_TYPE,
    &ACCOUNTING_RECORD_NUMBER,
];

// ============================================================================
// Commands (RFC 3588 Sec.3.1)
// ============================================================================

pub static CER: Command = Command::request(257, "Capabilities-Exchange-Request");
pub static CEA: Command = Command::answer(257, "Capabilities-Exchange-Answer");
pub static RAR: Command = Command::request(258, "Re-Auth-Request");
pub static RAA: Command = Command::answer(258, "Re-Auth-Answer");
pub static ACR: Command = Command::request(271, "Accounting-Request");
pub static ACA: Command = Command::answer(271, "Accounting-Answer");
pub static ASR: Command = Command::request(274, "Abort-Session-Request");
pub static ASA: Command = Command::answer(274, "Abort-Session-Answer");
pub static STR: Command = Command::request(275, "Session-Termination-Request");
pub static STA: Command = Command::answer(275, "Session-Termination-Answer");
pub static DWR: Command = Command::request(280, "Device-Watchdog-Request");
pub static DWA: Command = Command::answer(280, "Device-Watchdog-Answer");
pub static DPR: Command = Command::request(282, "Disconnect-Peer-Request");
pub static DPA: Command = Command::answer(282, "Disconnect-Peer-Answer");

/// Registration table for the base commands (common-message application).
pub static COMMANDS: &[&Command] = &[
    &CER, &CEA, &RAR, &RAA, &ACR, &ACA, &ASR, &ASA, &STR, &STA, &DWR, &DWA, &DPR, &DPA,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_entries_are_self_consistent() {
        for avp_type in TYPES {
            assert_eq!(avp_type.vendor_id, 0, "{} is a base AVP", avp_type.name);
            assert!(!avp_type.name.is_empty());
        }
        for command in COMMANDS {
            assert!(command.code >= 257 && command.code <= 282);
        }
    }

    #[test]
    fn test_identity_avps_use_identity_format() {
        for avp_type in [&ORIGIN_HOST, &ORIGIN_REALM, &DESTINATION_HOST, &DESTINATION_REALM] {
            assert!(matches!(avp_type.format, DataFormat::Identity));
        }
    }

    #[test]
    fn test_optional_defaults() {
        assert!(!FIRMWARE_REVISION.mandatory);
        assert!(!PRODUCT_NAME.mandatory);
        assert!(!ERROR_MESSAGE.mandatory);
        assert!(SESSION_ID.mandatory);
        assert!(RESULT_CODE.mandatory);
    }
}
