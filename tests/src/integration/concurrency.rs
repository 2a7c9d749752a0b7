//! # Concurrency Tests
//!
//! Entities are shared as `Arc` across OS threads and tokio tasks.
//!
//! - Concurrent sends on one channel yield exactly the sequences 1..=N
//! - Concurrent acknowledgements are each counted once on the channel
//! - Acknowledging while other threads send never deadlocks
//! - Connection creation races against counterparty status changes

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    use parking_lot::Mutex;
    use rand::Rng;

    use ibc_core::{Client, ClientStatus, ConnectionConfig, IbcError, Packet, PacketStatus};

    use crate::fixtures::{client_pair, open_path};

    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    // =============================================================================
    // SEQUENCE ASSIGNMENT
    // =============================================================================

    #[test]
    fn test_concurrent_sends_yield_permutation() {
        let path = open_path();
        let channel = Arc::clone(&path.channel);
        let barrier = Arc::new(Barrier::new(THREADS));
        let sequences = Arc::new(Mutex::new(Vec::with_capacity(THREADS * PER_THREAD)));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let channel = Arc::clone(&channel);
                let barrier = Arc::clone(&barrier);
                let sequences = Arc::clone(&sequences);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..PER_THREAD {
                        let packet = channel
                            .send_packet(b"data".to_vec(), "transfer", "channel-0", 0, None)
                            .unwrap();
                        sequences.lock().push(packet.sequence());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut sequences = sequences.lock().clone();
        sequences.sort_unstable();
        let expected: Vec<u64> = (1..=(THREADS * PER_THREAD) as u64).collect();
        assert_eq!(sequences, expected);
        assert_eq!(channel.metrics().total_packets, (THREADS * PER_THREAD) as u64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sends_from_tasks() {
        let path = open_path();
        let mut handles = Vec::new();
        for _ in 0..THREADS {
            let channel = Arc::clone(&path.channel);
            handles.push(tokio::spawn(async move {
                let mut seen = Vec::with_capacity(PER_THREAD);
                for _ in 0..PER_THREAD {
                    let packet = channel
                        .send_packet(b"data".to_vec(), "transfer", "channel-0", 0, None)
                        .unwrap();
                    seen.push(packet.sequence());
                    tokio::task::yield_now().await;
                }
                seen
            }));
        }

        let mut all = HashSet::new();
        for handle in handles {
            for sequence in handle.await.unwrap() {
                assert!(all.insert(sequence), "duplicate sequence {}", sequence);
            }
        }
        assert_eq!(all.len(), THREADS * PER_THREAD);
        assert_eq!(all.iter().max().copied(), Some((THREADS * PER_THREAD) as u64));
    }

    // =============================================================================
    // METRICS PROPAGATION
    // =============================================================================

    #[test]
    fn test_concurrent_acknowledgements_counted_once() {
        let path = open_path();
        let packets: Vec<Arc<Packet>> = (0..THREADS * PER_THREAD)
            .map(|_| {
                let packet = path
                    .channel
                    .send_packet(b"ack me".to_vec(), "transfer", "channel-0", 0, None)
                    .unwrap();
                packet.send_now().unwrap();
                packet.receive().unwrap();
                packet
            })
            .collect();
        let packets = Arc::new(packets);

        // Every packet is acknowledged by two threads; only one may win.
        let handles: Vec<_> = (0..THREADS * 2)
            .map(|worker| {
                let packets = Arc::clone(&packets);
                thread::spawn(move || {
                    let mut won = 0usize;
                    for packet in packets.iter().skip(worker % THREADS).step_by(THREADS) {
                        if packet.acknowledge().is_ok() {
                            won += 1;
                        }
                    }
                    won
                })
            })
            .collect();
        let won: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(won, THREADS * PER_THREAD);
        let metrics = path.channel.metrics();
        assert_eq!(metrics.successful_packets, (THREADS * PER_THREAD) as u64);
        assert!(packets.iter().all(|p| p.status() == PacketStatus::Acknowledged));
    }

    #[test]
    fn test_mixed_outcomes_add_up() {
        let path = open_path();
        let mut rng = rand::thread_rng();
        let mut expected_ok = 0u64;
        let mut expected_failed = 0u64;

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let fail = rng.gen_bool(0.3);
                if fail {
                    expected_failed += 1;
                } else {
                    expected_ok += 1;
                }
                let channel = Arc::clone(&path.channel);
                thread::spawn(move || {
                    let packet = channel
                        .send_packet(b"maybe".to_vec(), "transfer", "channel-0", 0, None)
                        .unwrap();
                    packet.send_now().unwrap();
                    if fail {
                        packet.mark_failed().unwrap();
                    } else {
                        packet.receive().unwrap();
                        packet.acknowledge().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let metrics = path.channel.metrics();
        assert_eq!(metrics.total_packets, 64);
        assert_eq!(metrics.successful_packets, expected_ok);
        assert_eq!(metrics.failed_packets, expected_failed);
    }

    // =============================================================================
    // LOCK ORDER
    // =============================================================================

    #[test]
    fn test_acknowledge_while_sending_does_not_deadlock() {
        let path = open_path();
        let channel = Arc::clone(&path.channel);
        let barrier = Arc::new(Barrier::new(2));

        let sender = {
            let channel = Arc::clone(&channel);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..500 {
                    channel
                        .send_packet(b"s".to_vec(), "transfer", "channel-0", 0, None)
                        .unwrap();
                    let _ = channel.metrics();
                }
            })
        };

        let acker = {
            let channel = Arc::clone(&channel);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..500 {
                    let packet = channel
                        .send_packet(b"a".to_vec(), "transfer", "channel-0", 0, None)
                        .unwrap();
                    packet.send_now().unwrap();
                    packet.receive().unwrap();
                    packet.acknowledge().unwrap();
                }
            })
        };

        sender.join().unwrap();
        acker.join().unwrap();

        let metrics = channel.metrics();
        assert_eq!(metrics.total_packets, 1000);
        assert_eq!(metrics.successful_packets, 500);
    }

    #[test]
    fn test_mutual_connection_creation_does_not_deadlock() {
        let (a, b) = client_pair();
        let a = Arc::new(a);
        let b = Arc::new(b);
        let barrier = Arc::new(Barrier::new(2));

        let spawn = |from: Arc<Client>, to: Arc<Client>, barrier: Arc<Barrier>| {
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    from.create_connection(&to, ConnectionConfig::default())
                        .unwrap();
                }
            })
        };
        let ab = spawn(Arc::clone(&a), Arc::clone(&b), Arc::clone(&barrier));
        let ba = spawn(Arc::clone(&b), Arc::clone(&a), barrier);
        ab.join().unwrap();
        ba.join().unwrap();

        assert_eq!(a.metrics().total_connections, 200);
        assert_eq!(b.metrics().total_connections, 200);
    }

    #[test]
    fn test_connection_creation_races_counterparty_freeze() {
        let (a, b) = client_pair();
        let a = Arc::new(a);
        let b = Arc::new(b);

        let creator = {
            let a = Arc::clone(&a);
            let b = Arc::clone(&b);
            thread::spawn(move || {
                let mut created = 0u64;
                for _ in 0..500 {
                    match a.create_connection(&b, ConnectionConfig::default()) {
                        Ok(_) => created += 1,
                        Err(IbcError::CounterpartyNotActive { status, .. }) => {
                            assert_ne!(status, ClientStatus::Active)
                        }
                        Err(other) => panic!("unexpected error: {}", other),
                    }
                }
                created
            })
        };

        let toggler = {
            let b = Arc::clone(&b);
            thread::spawn(move || {
                for i in 0..500 {
                    let status = if i % 2 == 0 {
                        ClientStatus::Frozen
                    } else {
                        ClientStatus::Active
                    };
                    b.set_status(status);
                    thread::sleep(Duration::from_micros(10));
                }
                b.set_status(ClientStatus::Active);
            })
        };

        let created = creator.join().unwrap();
        toggler.join().unwrap();
        assert_eq!(a.metrics().total_connections, created);
        assert_eq!(b.metrics().total_connections, 0);
    }
}
