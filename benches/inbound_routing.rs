//! Inbound routing benchmark suite.
//!
//! Measures frame decoding and session filtering on the hot receive path:
//! - Chat replies of increasing size
//! - Transcription updates for the current and a stale session
//!
//! Run with: cargo bench --bench inbound_routing
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rubberduck_link::{InboundRouter, Service};
use serde_json::json;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const REPLY_SIZES: &[usize] = &[64, 1024, 16 * 1024];

// ============================================================================
// Helpers
// ============================================================================

fn chat_reply(size: usize) -> String {
    json!({
        "type": "response",
        "message": "a".repeat(size),
        "session_id": "bench"
    })
    .to_string()
}

fn transcription_update(session: &str, status: &str, text: Option<&str>) -> String {
    json!({
        "type": "transcription",
        "data": { "sessionId": session, "status": status, "text": text }
    })
    .to_string()
}

// ============================================================================
// Benchmark: Chat Replies
// ============================================================================

fn bench_chat_replies(c: &mut Criterion) {
    let mut group = c.benchmark_group("chat_reply");

    for &size in REPLY_SIZES {
        let frame = chat_reply(size);
        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_with_input(BenchmarkId::new("route", size), &frame, |b, frame| {
            let mut router = InboundRouter::new(Service::Chat);
            b.iter(|| router.route(black_box(frame)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Transcription Updates
// ============================================================================

fn bench_transcription_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("transcription_update");

    let ready = transcription_update("current", "ready", None);
    let current = transcription_update("current", "transcribing", Some("hello world"));
    let stale = transcription_update("previous", "transcribing", Some("hello world"));

    for (name, frame) in [("current_session", &current), ("stale_session", &stale)] {
        group.bench_function(name, |b| {
            let mut router = InboundRouter::new(Service::Transcription);
            let _ = router.route(&ready);
            b.iter(|| router.route(black_box(frame)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chat_replies, bench_transcription_updates);
criterion_main!(benches);
