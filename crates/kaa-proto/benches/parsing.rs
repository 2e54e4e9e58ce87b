//! Benchmarks for line framing and message parsing.

use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kaa_proto::{format_command, LineCodec, Message};
use tokio_util::codec::Decoder;

/// Simple PING message
const SIMPLE_MESSAGE: &str = "PING :irc.example.com";

/// Message with prefix
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Numeric response
const NUMERIC_RESPONSE: &str =
    ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Parsing");

    group.bench_function("simple_ping", |b| {
        b.iter(|| {
            let msg: Message = black_box(SIMPLE_MESSAGE).parse().unwrap();
            black_box(msg)
        })
    });

    group.bench_function("with_prefix", |b| {
        b.iter(|| {
            let msg: Message = black_box(PREFIX_MESSAGE).parse().unwrap();
            black_box(msg)
        })
    });

    group.bench_function("numeric_response", |b| {
        b.iter(|| {
            let msg: Message = black_box(NUMERIC_RESPONSE).parse().unwrap();
            black_box(msg)
        })
    });

    group.finish();
}

fn benchmark_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Line Framing");

    let mut burst = String::new();
    for _ in 0..100 {
        burst.push_str(PREFIX_MESSAGE);
        burst.push_str("\r\n");
    }

    group.bench_function("burst_of_100", |b| {
        b.iter(|| {
            let mut codec = LineCodec::new();
            let mut buf = BytesMut::from(black_box(burst.as_str()));
            let mut count = 0;
            while let Some(line) = codec.decode(&mut buf).unwrap() {
                black_box(line);
                count += 1;
            }
            count
        })
    });

    group.bench_function("format_command", |b| {
        b.iter(|| format_command("PRIVMSG", black_box(&["#channel", "Hello, world!"][..]), true))
    });

    group.finish();
}

criterion_group!(benches, benchmark_parsing, benchmark_framing);
criterion_main!(benches);
