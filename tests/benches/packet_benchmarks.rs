//! # Packet Benchmarks
//!
//! | Operation | Lock work |
//! |-----------|-----------|
//! | `send_packet` | one channel write |
//! | full lifecycle | three packet writes + one channel write |
//! | contended send | channel write under N threads |

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::RngCore;

use ibc_core::{generate_identifier, ChannelConfig, IdentifierKind};
use ibc_tests::fixtures::open_path_with;

fn random_payload(size: usize) -> Vec<u8> {
    let mut payload = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut payload);
    payload
}

// ============================================================================
// Identifier generation
// ============================================================================

fn bench_identifier(c: &mut Criterion) {
    c.bench_function("generate_identifier", |b| {
        b.iter(|| black_box(generate_identifier(IdentifierKind::Packet)))
    });
}

// ============================================================================
// send_packet by payload size
// ============================================================================

fn bench_send_packet(c: &mut Criterion) {
    let mut group = c.benchmark_group("send_packet");
    let path = open_path_with(ChannelConfig::default());

    for size in [0usize, 256, 4096, 64 * 1024] {
        let payload = random_payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| {
                black_box(
                    path.channel
                        .send_packet(payload.clone(), "transfer", "channel-0", 0, None)
                        .unwrap(),
                )
            })
        });
    }
    group.finish();
}

// ============================================================================
// Pending -> Acknowledged
// ============================================================================

fn bench_full_lifecycle(c: &mut Criterion) {
    let path = open_path_with(ChannelConfig::default());
    let payload = random_payload(256);

    c.bench_function("packet_full_lifecycle", |b| {
        b.iter(|| {
            let packet = path
                .channel
                .send_packet(payload.clone(), "transfer", "channel-0", 0, None)
                .unwrap();
            packet.send_now().unwrap();
            packet.receive().unwrap();
            packet.acknowledge().unwrap();
            black_box(packet)
        })
    });
}

// ============================================================================
// Contended sequence assignment
// ============================================================================

fn bench_contended_send(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_send");
    group.measurement_time(Duration::from_secs(10));
    const PER_THREAD: usize = 100;

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * PER_THREAD) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            let path = open_path_with(ChannelConfig::default());
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let channel = Arc::clone(&path.channel);
                        thread::spawn(move || {
                            for _ in 0..PER_THREAD {
                                channel
                                    .send_packet(b"c".to_vec(), "transfer", "channel-0", 0, None)
                                    .unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_identifier,
    bench_send_packet,
    bench_full_lifecycle,
    bench_contended_send
);
criterion_main!(benches);
