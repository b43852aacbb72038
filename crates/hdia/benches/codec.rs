// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encode/decode throughput for a representative Sh User-Data-Request.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hdia::dictionary::{base, cx, sh};
use hdia::{Avp, AvpList, Message, TypeRegistry};

fn sample_udr() -> Message {
    let mut msg = Message::request(306, 16_777_217);
    msg.hop_by_hop_id = 0x1234_5678;
    msg.end_to_end_id = 0x9ABC_DEF0;
    msg.add(Avp::new(&base::SESSION_ID, "as.cipango.org;1162300;42"));
    msg.add(Avp::new(&base::ORIGIN_HOST, "as.cipango.org"));
    msg.add(Avp::new(&base::ORIGIN_REALM, "cipango.org"));
    msg.add(Avp::new(&base::DESTINATION_REALM, "hss.cipango.org"));
    let mut identity = AvpList::new();
    identity.add(Avp::new(&cx::PUBLIC_IDENTITY, "sip:alice@cipango.org"));
    msg.add(Avp::new(&sh::USER_IDENTITY, identity));
    msg.add(Avp::new(&sh::USER_DATA, vec![0xAB; 64]));
    msg
}

fn bench_encode(c: &mut Criterion) {
    let msg = sample_udr();
    c.bench_function("message_encode", |b| {
        b.iter(|| black_box(&msg).encode().expect("encode"));
    });
}

fn bench_decode(c: &mut Criterion) {
    let registry = TypeRegistry::with_defaults().expect("registry");
    let wire = sample_udr().encode().expect("encode");
    c.bench_function("message_decode", |b| {
        b.iter(|| Message::decode(black_box(&wire), &registry).expect("decode"));
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
