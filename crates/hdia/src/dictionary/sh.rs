// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sh interface dictionary (3GPP TS 29.328 / TS 29.329, vendor 10415)
//!
//! The Sh interface lets an IMS application server read, update and
//! subscribe to user profile data held in the HSS.

use crate::dictionary::Command;
use crate::protocol::avp::AvpType;
use crate::protocol::constants::{APP_3GPP_SH, VENDOR_3GPP};
use crate::protocol::format::{DataFormat, EnumValueSet};
use crate::protocol::message::ApplicationId;

/// Sh application id (TS 29.328).
pub const APPLICATION: u32 = APP_3GPP_SH;

/// Vendor-qualified application id for session and request stamping.
pub const APPLICATION_ID: ApplicationId = ApplicationId::auth_vendor(APP_3GPP_SH, VENDOR_3GPP);

// ============================================================================
// Enumerated value sets (TS 29.329 Sec.6.3)
// ============================================================================

/// Kinds of user data addressed by UDR and SNR.
pub static DATA_REFERENCE_VALUES: EnumValueSet = EnumValueSet {
    name: "Data-Reference",
    values: &[
        (0, "RepositoryData"),
        (10, "IMSPublicIdentity"),
        (11, "IMSUserState"),
        (12, "SCSCFName"),
        (13, "InitialFilterCriteria"),
        (14, "LocationInformation"),
        (15, "UserState"),
        (16, "ChargingInformation"),
        (17, "MSISDN"),
        (18, "PSIActivation"),
        (19, "DSAI"),
        (20, "AliasesRepositoryData"),
    ],
};

pub static IDENTITY_SET_VALUES: EnumValueSet = EnumValueSet {
    name: "Identity-Set",
    values: &[
        (0, "ALL_IDENTITIES"),
        (1, "REGISTERED_IDENTITIES"),
        (2, "IMPLICIT_IDENTITIES"),
        (3, "ALIAS_IDENTITIES"),
    ],
};

pub static REQUESTED_DOMAIN_VALUES: EnumValueSet = EnumValueSet {
    name: "Requested-Domain",
    values: &[(0, "CS-Domain"), (1, "PS-Domain")],
};

pub static SUBS_REQ_TYPE_VALUES: EnumValueSet = EnumValueSet {
    name: "Subs-Req-Type",
    values: &[(0, "Subscribe"), (1, "Unsubscribe")],
};

pub static CURRENT_LOCATION_VALUES: EnumValueSet = EnumValueSet {
    name: "Current-Location",
    values: &[
        (0, "DoNotNeedInitiateActiveLocationRetrieval"),
        (1, "InitiateActiveLocationRetrieval"),
    ],
};

pub static SEND_DATA_INDICATION_VALUES: EnumValueSet = EnumValueSet {
    name: "Send-Data-Indication",
    values: &[(0, "USER_DATA_NOT_REQUESTED"), (1, "USER_DATA_REQUESTED")],
};

// ============================================================================
// AVP types (TS 29.329 Sec.6.3)
// ============================================================================

const fn sh(code: u32, name: &'static str, format: DataFormat) -> AvpType {
    AvpType::vendor(code, VENDOR_3GPP, name, format)
}

/// Grouped wrapper holding either a Public-Identity or an MSISDN AVP.
pub static USER_IDENTITY: AvpType = sh(700, "User-Identity", DataFormat::Grouped);
/// MSISDN in international E.164 format, TBCD-encoded.
pub static MSISDN: AvpType = sh(701, "MSISDN", DataFormat::OctetString);
/// Transparent Sh-Data document (TS 29.328 Annex C).
pub static USER_DATA: AvpType = sh(702, "User-Data", DataFormat::OctetString);
pub static DATA_REFERENCE: AvpType = sh(
    703,
    "Data-Reference",
    DataFormat::Enumerated(&DATA_REFERENCE_VALUES),
);
pub static SERVICE_INDICATION: AvpType =
    sh(704, "Service-Indication", DataFormat::OctetString);
pub static SUBS_REQ_TYPE: AvpType = sh(
    705,
    "Subs-Req-Type",
    DataFormat::Enumerated(&SUBS_REQ_TYPE_VALUES),
);
pub static REQUESTED_DOMAIN: AvpType = sh(
    706,
    "Requested-Domain",
    DataFormat::Enumerated(&REQUESTED_DOMAIN_VALUES),
);
pub static CURRENT_LOCATION: AvpType = sh(
    707,
    "Current-Location",
    DataFormat::Enumerated(&CURRENT_LOCATION_VALUES),
);
pub static IDENTITY_SET: AvpType = sh(
    708,
    "Identity-Set",
    DataFormat::Enumerated(&IDENTITY_SET_VALUES),
);
/// Expiry of a notification subscription in the HSS.
pub static EXPIRY_TIME: AvpType = sh(709, "Expiry-Time", DataFormat::Time);
pub static SEND_DATA_INDICATION: AvpType = sh(
    710,
    "Send-Data-Indication",
    DataFormat::Enumerated(&SEND_DATA_INDICATION_VALUES),
);
pub static DSAI_TAG: AvpType = sh(711, "DSAI-Tag", DataFormat::OctetString);

/// Registration table for the Sh AVP types.
pub static TYPES: &[&AvpType] = &[
    &USER_IDENTITY,
    &MSISDN,
    &USER_DATA,
    &DATA_REFERENCE,
    &SERVICE_INDICATION,
    &SUBS_REQ_TYPE,
    &REQUESTED_DOMAIN,
    &CURRENT_LOCATION,
    &IDENTITY_SET,
    &EXPIRY_TIME,
    &SEND_DATA_INDICATION,
    &DSAI_TAG,
];

// ============================================================================
// Commands (TS 29.328 Sec.6.1)
// ============================================================================

/// Client pulls user data from the HSS.
pub static UDR: Command = Command::request(306, "User-Data-Request");
pub static UDA: Command = Command::answer(306, "User-Data-Answer");
/// Client pushes updated repository data to the HSS.
pub static PUR: Command = Command::request(307, "Profile-Update-Request");
pub static PUA: Command = Command::answer(307, "Profile-Update-Answer");
/// Client subscribes to change notifications.
pub static SNR: Command = Command::request(308, "Subscribe-Notifications-Request");
pub static SNA: Command = Command::answer(308, "Subscribe-Notifications-Answer");
/// HSS notifies the client of changed data.
pub static PNR: Command = Command::request(309, "Push-Notification-Request");
pub static PNA: Command = Command::answer(309, "Push-Notifications-Answer");

/// Registration table for the Sh commands.
pub static COMMANDS: &[&Command] = &[&UDR, &UDA, &PUR, &PUA, &SNR, &SNA, &PNR, &PNA];

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
    fn test_data_reference_sparse_values() {
        // Value 1..=9 are not assigned; only 0 and 10..=20 resolve.
        assert_eq!(DATA_REFERENCE_VALUES.name_of(0), Some("RepositoryData"));
        assert_eq!(DATA_REFERENCE_VALUES.name_of(5), None);
        assert_eq!(DATA_REFERENCE_VALUES.name_of(13), Some("InitialFilterCriteria"));
    }

    #[test]
    fn test_command_pairs_share_codes() {
        for (req, ans) in [(&UDR, &UDA), (&PUR, &PUA), (&SNR, &SNA), (&PNR, &PNA)] {
            assert_eq!(req.code, ans.code);
            assert!(req.request);
            assert!(!ans.request);
        }
    }
}
