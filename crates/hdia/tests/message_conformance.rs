// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Message-level conformance: golden wire vectors, the length invariant,
// and stream reframing across partial reads.

use hdia::dictionary::{base, sh};
use hdia::{Avp, AvpValue, FrameBuffer, Message, TypeRegistry};

fn registry() -> TypeRegistry {
    TypeRegistry::with_defaults().expect("shipped dictionaries must register cleanly")
}

/// Hand-checked golden vector: a minimal request with one Result-Code AVP.
#[test]
fn golden_vector_minimal_message() {
    let mut msg = Message::request(257, 0);
    msg.hop_by_hop_id = 0x0102_0304;
    msg.end_to_end_id = 0x0506_0708;
    msg.add(Avp::new(&base::RESULT_CODE, 2001u32));

    let wire = msg.encode().expect("encode should succeed");
    #[rustfmt::skip]
    let expected: [u8; 32] = [
        // Version 1, Message Length 32
        0x01, 0x00, 0x00, 0x20,
        // Flags R, Command-Code 257
        0x80, 0x00, 0x01, 0x01,
        // Application-Id 0
        0x00, 0x00, 0x00, 0x00,
        // Hop-by-Hop, End-to-End
        0x01, 0x02, 0x03, 0x04,
        0x05, 0x06, 0x07, 0x08,
        // Result-Code(268), flags M, length 12, value 2001
        0x00, 0x00, 0x01, 0x0C,
        0x40, 0x00, 0x00, 0x0C,
        0x00, 0x00, 0x07, 0xD1,
    ];
    assert_eq!(wire, expected);

    let decoded = Message::decode(&wire, &registry()).expect("decode should succeed");
    assert_eq!(decoded, msg);
}

#[test]
fn message_length_invariant_across_random_bodies() {
    let reg = registry();
    fastrand::seed(0x4D53_474C);
    for _ in 0..32 {
        let mut msg = Message::request(306, 16_777_217);
        msg.hop_by_hop_id = fastrand::u32(..);
        msg.end_to_end_id = fastrand::u32(..);
        for _ in 0..fastrand::usize(0..8) {
            let len = fastrand::usize(0..40);
            let payload: Vec<u8> = (0..len).map(|_| fastrand::u8(..)).collect();
            msg.add(Avp::new(&sh::USER_DATA, payload));
        }
        let wire = msg.encode().expect("encode should succeed");
        let declared =
            ((wire[1] as usize) << 16) | ((wire[2] as usize) << 8) | wire[3] as usize;
        assert_eq!(declared, wire.len(), "length field must be exact");
        assert_eq!(declared, msg.wire_len());

        let decoded = Message::decode(&wire, &reg).expect("decode should succeed");
        assert_eq!(decoded, msg);
    }
}

#[test]
fn message_with_unknown_avp_reencodes_identically() {
    let reg = registry();
    let mut msg = Message::request(306, 16_777_217);
    msg.end_to_end_id = 5;
    msg.add(Avp::new(&base::SESSION_ID, "as.cipango.org;1;1"));
    // Unregistered (code, vendor) pair, mandatory-flagged, odd length.
    msg.add(Avp::raw(62001, 4491, 0xC0, vec![0xDE, 0xAD, 0xBE]));
    msg.add(Avp::new(&base::ORIGIN_HOST, "as.cipango.org"));

    let wire = msg.encode().expect("encode should succeed");
    let decoded = Message::decode(&wire, &reg).expect("decode with unknown AVP must succeed");
    let rewire = decoded.encode().expect("re-encode should succeed");
    assert_eq!(rewire, wire, "unknown AVPs must be carried without loss");
}

#[test]
fn stream_reframing_across_partial_reads() {
    let reg = registry();
    let mut first = Message::request(306, 16_777_217);
    first.end_to_end_id = 1;
    first.add(Avp::new(&base::SESSION_ID, "as.cipango.org;9;1"));
    let mut second = Message::answer_to(&first);
    second.add(Avp::new(&base::RESULT_CODE, 2001u32));

    let mut stream = first.encode().expect("encode first");
    stream.extend(second.encode().expect("encode second"));

    // Feed the byte stream in 7-byte slices, as a socket might deliver it.
    let mut fb = FrameBuffer::new(1 << 20);
    let mut frames = Vec::new();
    for chunk in stream.chunks(7) {
        fb.extend(chunk);
        while let Some(frame) = fb.next_frame().expect("framing intact") {
            frames.push(frame);
        }
    }
    assert_eq!(frames.len(), 2);
    assert_eq!(fb.buffered(), 0);

    let a = Message::decode(&frames[0], &reg).expect("first frame decodes");
    let b = Message::decode(&frames[1], &reg).expect("second frame decodes");
    assert_eq!(a, first);
    assert_eq!(b, second);
}

#[test]
fn grouped_avp_length_counts_padded_members() {
    let reg = registry();
    // User-Identity wrapping a single MSISDN with a 2-byte TBCD value: the
    // member occupies 12 + 2 + 2 pad = 16 bytes, and the group's declared
    // value length must be exactly that.
    let mut members = hdia::AvpList::new();
    members.add(Avp::new(&sh::MSISDN, vec![0x21, 0x43]));
    let group = Avp::new(&sh::USER_IDENTITY, members);
    assert_eq!(group.unpadded_len(), 12 + 16);

    let mut msg = Message::request(306, 16_777_217);
    msg.add(group);
    let wire = msg.encode().expect("encode should succeed");
    let decoded = Message::decode(&wire, &reg).expect("decode should succeed");

    let got = decoded
        .get(&sh::USER_IDENTITY)
        .expect("group present")
        .value
        .as_grouped()
        .expect("grouped value");
    assert_eq!(
        got.get_typed(&sh::MSISDN).and_then(|a| a.value.as_bytes()),
        Some(&[0x21, 0x43][..])
    );
}

#[test]
fn time_avp_uses_ntp_epoch() {
    let reg = registry();
    // 2008-07-07T00:00:00Z = Unix 1215388800 = NTP 3424377600 (0xCC1B_DB00)
    let ntp = hdia::protocol::format::ntp_from_unix(1_215_388_800);
    assert_eq!(ntp, 0xCC1B_DB00);

    let mut msg = Message::request(308, 16_777_217);
    msg.add(Avp::new(&sh::EXPIRY_TIME, AvpValue::Time(ntp)));
    let wire = msg.encode().expect("encode should succeed");
    let decoded = Message::decode(&wire, &reg).expect("decode should succeed");
    match decoded.get(&sh::EXPIRY_TIME).map(|a| &a.value) {
        Some(AvpValue::Time(secs)) => {
            assert_eq!(hdia::protocol::format::unix_from_ntp(*secs), 1_215_388_800);
        }
        other => panic!("unexpected value {:?}", other),
    }
}
