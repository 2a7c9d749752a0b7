//! # Integration Test Flows
//!
//! Client → Connection → Channel → Packet as one path:
//!
//! 1. **Handshake**: two clients, connection Init → Open, channel Init → Open
//! 2. **Delivery**: packets Pending → Sent → Received → Acknowledged
//! 3. **Gating**: every precondition failure leaves state untouched
//! 4. **Deadlines**: receive past the deadline times the packet out

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    use proptest::prelude::*;

    use ibc_core::{
        ChainValidator, ChannelConfig, ChannelOrdering, ChannelState, Client, ClientConfig,
        ClientKind, ClientStatus, ConnectionConfig, ConnectionStatus, IbcConfigFile, IbcError,
        MockChainValidator, PacketStatus,
    };

    use crate::fixtures::{client_pair, open_path, open_path_with};

    // =============================================================================
    // END-TO-END
    // =============================================================================

    #[test]
    fn test_end_to_end_single_packet() {
        let (a, b) = client_pair();
        assert_eq!(a.status(), ClientStatus::Active);

        let conn = a.create_connection(&b, ConnectionConfig::default()).unwrap();
        assert_eq!(conn.status(), ConnectionStatus::Init);
        conn.open_connection().unwrap();
        assert_eq!(conn.status(), ConnectionStatus::Open);

        let channel = conn
            .create_channel(
                "transfer",
                "channel-0",
                ChannelOrdering::Ordered,
                ChannelConfig::default(),
            )
            .unwrap();
        channel.open_channel().unwrap();

        let packet = channel
            .send_packet(b"hello".to_vec(), "transfer", "channel-0", 0, None)
            .unwrap();
        assert_eq!(packet.sequence(), 1);
        assert_eq!(packet.status(), PacketStatus::Pending);

        packet.send_now().unwrap();
        packet.receive().unwrap();
        packet.acknowledge().unwrap();
        assert_eq!(packet.status(), PacketStatus::Acknowledged);

        let metrics = channel.metrics();
        assert_eq!(metrics.total_packets, 1);
        assert_eq!(metrics.successful_packets, 1);
        assert_eq!(a.metrics().total_connections, 1);
    }

    #[test]
    fn test_ids_carry_kind_prefixes() {
        let path = open_path();
        let packet = path
            .channel
            .send_packet(b"x".to_vec(), "transfer", "channel-0", 0, None)
            .unwrap();

        assert!(path.client_a.id().starts_with("ibc_client_"));
        assert!(path.connection.id().starts_with("ibc_connection_"));
        assert!(path.channel.id().starts_with("ibc_channel_"));
        assert!(packet.id().starts_with("ibc_packet_"));
        assert_eq!(packet.channel_id(), path.channel.id());
    }

    #[tokio::test]
    async fn test_end_to_end_with_header_validation() {
        let validator: Arc<dyn ChainValidator> = Arc::new(MockChainValidator::new());
        let a = Client::new("chain-a", ClientKind::Tendermint, ClientConfig::default())
            .with_validator(Arc::clone(&validator));
        let b = Client::new("chain-b", ClientKind::Polkadot, ClientConfig::default())
            .with_validator(validator);

        let height = b.latest_height().await.unwrap();
        assert_eq!(height, 1000);
        a.update_header(&height.to_be_bytes()).await.unwrap();
        a.verify_proof(b"proof", b"commitment").await.unwrap();

        let conn = a.create_connection(&b, ConnectionConfig::default()).unwrap();
        conn.open_connection().unwrap();
    }

    #[test]
    fn test_end_to_end_from_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
            [clients.default]
            trusting_period = "336h"
            security_level = "ultra"

            [channels.transfer]
            max_packet_size = 8
            max_packet_timeout = "1m"
            "#,
        )
        .unwrap();

        let config = IbcConfigFile::load(file.path()).unwrap();
        let a = Client::new(
            "chain-a",
            ClientKind::Tendermint,
            config.client_config("default").unwrap(),
        );
        let b = Client::new("chain-b", ClientKind::Tendermint, ClientConfig::default());
        assert_eq!(a.config().trusting_period, Duration::from_secs(336 * 3600));
        assert_eq!(a.config().max_clock_drift, Duration::from_secs(10));

        let conn = a
            .create_connection(&b, config.connection_config("default").unwrap())
            .unwrap();
        conn.open_connection().unwrap();
        let channel = conn
            .create_channel(
                "transfer",
                "channel-0",
                ChannelOrdering::Unordered,
                config.channel_config("transfer").unwrap(),
            )
            .unwrap();
        channel.open_channel().unwrap();

        assert!(channel.send_packet(vec![1u8; 8], "transfer", "channel-0", 0, None).is_ok());
        assert!(matches!(
            channel.send_packet(vec![1u8; 9], "transfer", "channel-0", 0, None),
            Err(IbcError::PacketTooLarge { .. })
        ));
    }

    // =============================================================================
    // GATING
    // =============================================================================

    #[test]
    fn test_frozen_client_blocks_connection() {
        let (a, b) = client_pair();
        a.freeze();
        let err = a.create_connection(&b, ConnectionConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "ClientNotActive");
        assert_eq!(a.metrics().total_connections, 0);
    }

    #[test]
    fn test_inactive_counterparty_blocks_connection() {
        for status in [ClientStatus::Frozen, ClientStatus::Expired, ClientStatus::Revoked] {
            let (a, b) = client_pair();
            b.set_status(status);
            let err = a.create_connection(&b, ConnectionConfig::default()).unwrap_err();
            assert_eq!(err.kind(), "CounterpartyNotActive");
            assert_eq!(err.entity_id(), Some(b.id()));
        }
    }

    #[test]
    fn test_channel_requires_open_connection() {
        let (a, b) = client_pair();
        let conn = a.create_connection(&b, ConnectionConfig::default()).unwrap();

        for status in [
            ConnectionStatus::Init,
            ConnectionStatus::TryOpen,
            ConnectionStatus::Closed,
        ] {
            conn.set_status(status);
            let err = conn
                .create_channel(
                    "transfer",
                    "channel-0",
                    ChannelOrdering::Unordered,
                    ChannelConfig::default(),
                )
                .unwrap_err();
            assert_eq!(err.kind(), "ConnectionNotOpen");
        }
    }

    #[test]
    fn test_send_requires_open_channel() {
        let path = open_path();
        for state in [ChannelState::Init, ChannelState::TryOpen, ChannelState::Closed] {
            path.channel.set_state(state);
            let err = path
                .channel
                .send_packet(b"x".to_vec(), "transfer", "channel-0", 0, None)
                .unwrap_err();
            assert_eq!(err.kind(), "ChannelNotOpen");
        }
        assert_eq!(path.channel.metrics().total_packets, 0);
    }

    #[test]
    fn test_reopen_is_rejected() {
        let path = open_path();
        assert_eq!(
            path.connection.open_connection().unwrap_err().kind(),
            "InvalidConnectionState"
        );
        assert_eq!(
            path.channel.open_channel().unwrap_err().kind(),
            "InvalidChannelState"
        );
    }

    #[test]
    fn test_freezing_client_does_not_close_existing_path() {
        let path = open_path();
        path.client_a.freeze();

        assert_eq!(path.connection.status(), ConnectionStatus::Open);
        let packet = path
            .channel
            .send_packet(b"still flows".to_vec(), "transfer", "channel-0", 0, None)
            .unwrap();
        packet.send_now().unwrap();
        packet.receive().unwrap();
        packet.acknowledge().unwrap();
    }

    // =============================================================================
    // DEADLINES
    // =============================================================================

    #[test]
    fn test_timeout_propagates_to_channel() {
        let path = open_path();
        let deadline = SystemTime::now() + Duration::from_secs(30);
        let packet = path
            .channel
            .send_packet(b"late".to_vec(), "transfer", "channel-0", 0, Some(deadline))
            .unwrap();
        packet.send_now().unwrap();

        let err = packet.receive_at(deadline + Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), "PacketTimedOut");
        assert_eq!(err.entity_id(), Some(packet.id()));
        assert_eq!(packet.status(), PacketStatus::Timeout);
        assert!(packet.status().is_terminal());

        let metrics = path.channel.metrics();
        assert_eq!(metrics.failed_packets, 1);
        assert_eq!(metrics.successful_packets, 0);
    }

    #[test]
    fn test_past_deadline_packet_times_out_on_receive() {
        let path = open_path();
        let deadline = SystemTime::now() - Duration::from_secs(1);
        let packet = path
            .channel
            .send_packet(b"stale".to_vec(), "transfer", "channel-0", 0, Some(deadline))
            .unwrap();
        assert!(packet.is_expired());

        packet.send_now().unwrap();
        assert!(matches!(packet.receive(), Err(IbcError::PacketTimedOut { .. })));
    }

    #[test]
    fn test_default_deadline_is_channel_max_timeout() {
        let path = open_path_with(ChannelConfig {
            max_packet_timeout: Duration::from_secs(90),
            ..Default::default()
        });
        let packet = path
            .channel
            .send_packet(b"x".to_vec(), "transfer", "channel-0", 0, None)
            .unwrap();

        let remaining = packet.time_remaining();
        assert!(remaining <= Duration::from_secs(90));
        assert!(remaining > Duration::from_secs(80));
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_size_limit_is_inclusive(max in 1usize..256, extra in 0usize..4) {
            let path = open_path_with(ChannelConfig {
                max_packet_size: max,
                ..Default::default()
            });
            let size = max - 1 + extra;
            let result = path
                .channel
                .send_packet(vec![0u8; size], "transfer", "channel-0", 0, None);
            if size <= max {
                prop_assert!(result.is_ok());
            } else {
                let is_too_large = matches!(result, Err(IbcError::PacketTooLarge { .. }));
                prop_assert!(is_too_large);
            }
        }

        #[test]
        fn test_sequences_follow_send_count(count in 1usize..32) {
            let path = open_path();
            for expected in 1..=count as u64 {
                let packet = path
                    .channel
                    .send_packet(b"p".to_vec(), "transfer", "channel-0", 0, None)
                    .unwrap();
                prop_assert_eq!(packet.sequence(), expected);
            }
            prop_assert_eq!(path.channel.metrics().total_packets, count as u64);
        }
    }
}
