//! End-to-end handshake scenario.
//!
//! Two clients, one connection, one channel, and `packets` packets driven
//! through Pending → Sent → Received → Acknowledged by `workers` tasks.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info};

use ibc_core::{
    Channel, ChannelMetrics, ChannelOrdering, Client, ClientKind, ClientMetrics, ConnectionMetrics,
    IbcConfigFile, IbcError, MockChainValidator, PacketConfig, PacketParams,
};
use ibc_telemetry::entity_span;

/// Port used on both ends.
pub const PORT_ID: &str = "transfer";
/// Caller-chosen channel name.
pub const CHANNEL_NAME: &str = "channel-0";

/// Scenario knobs.
#[derive(Clone, Debug)]
pub struct ScenarioOptions {
    /// Packets to drive.
    pub packets: usize,
    /// Concurrent worker tasks.
    pub workers: usize,
    /// Payload of every packet.
    pub payload: Vec<u8>,
    /// Packet deadline, relative to send time.
    pub timeout: Duration,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            packets: 8,
            workers: 4,
            payload: b"hello".to_vec(),
            timeout: Duration::from_secs(3600),
        }
    }
}

/// Final metrics, printed as JSON.
#[derive(Clone, Debug, Serialize)]
pub struct ScenarioReport {
    /// Originating client.
    pub client_a: ClientMetrics,
    /// Counterparty client.
    pub client_b: ClientMetrics,
    /// The connection.
    pub connection: ConnectionMetrics,
    /// The channel.
    pub channel: ChannelMetrics,
    /// Sequences acknowledged, sorted.
    pub acknowledged_sequences: Vec<u64>,
}

#[derive(Clone, Copy)]
struct Batching {
    size: usize,
    delay: Duration,
}

/// Run the scenario against `config`.
///
/// Sections used: `clients.default`, `connections.default`,
/// `channels.transfer`, `packets.default`, `security.validation`,
/// `performance.packet_batching`.
pub async fn run_scenario(
    config: &IbcConfigFile,
    options: &ScenarioOptions,
) -> anyhow::Result<ScenarioReport> {
    let client_config = config.client_config("default").map_err(IbcError::from)?;
    let connection_config = config.connection_config("default").map_err(IbcError::from)?;
    let channel_config = config.channel_config(PORT_ID).map_err(IbcError::from)?;
    let packet_config = config.packet_config("default").map_err(IbcError::from)?;

    let batching_section = &config.performance.packet_batching;
    let batching = (batching_section.enabled && batching_section.max_batch_size > 0)
        .then(|| -> anyhow::Result<Batching> {
            Ok(Batching {
                size: batching_section.max_batch_size,
                delay: batching_section.batch_delay().map_err(IbcError::from)?,
            })
        })
        .transpose()?;

    let validator = Arc::new(MockChainValidator::new());
    let client_a = Client::new("chain-a", ClientKind::Tendermint, client_config.clone())
        .with_validator(validator.clone());
    let client_b =
        Client::new("chain-b", ClientKind::Ethereum, client_config).with_validator(validator);

    if config.security.validation.validate_headers {
        let height = client_b.latest_height().await?;
        client_a.update_header(&height.to_be_bytes()).await?;
        let height = client_a.latest_height().await?;
        client_b.update_header(&height.to_be_bytes()).await?;
    }

    let connection = client_a.create_connection(&client_b, connection_config)?;
    connection.open_connection()?;

    let channel = connection.create_channel(
        PORT_ID,
        CHANNEL_NAME,
        ChannelOrdering::Unordered,
        channel_config,
    )?;
    channel.open_channel()?;

    info!(
        connection_id = %connection.id(),
        channel_id = %channel.id(),
        packets = options.packets,
        workers = options.workers,
        "Handshake complete, driving packets"
    );

    let workers = options.workers.max(1);
    let mut tasks = JoinSet::new();
    for worker in 0..workers {
        let share = (worker..options.packets).step_by(workers).count();
        if share == 0 {
            continue;
        }
        let channel = Arc::clone(&channel);
        let payload = options.payload.clone();
        let packet_config = packet_config.clone();
        let timeout = options.timeout;
        tasks.spawn(async move {
            drive_packets(&channel, share, payload, packet_config, timeout, batching).await
        });
    }

    let mut acknowledged_sequences = Vec::with_capacity(options.packets);
    while let Some(joined) = tasks.join_next().await {
        let sequences = joined.context("packet worker panicked")??;
        acknowledged_sequences.extend(sequences);
    }
    acknowledged_sequences.sort_unstable();

    Ok(ScenarioReport {
        client_a: client_a.metrics(),
        client_b: client_b.metrics(),
        connection: connection.metrics(),
        channel: channel.metrics(),
        acknowledged_sequences,
    })
}

async fn drive_packets(
    channel: &Arc<Channel>,
    count: usize,
    payload: Vec<u8>,
    packet_config: PacketConfig,
    timeout: Duration,
    batching: Option<Batching>,
) -> anyhow::Result<Vec<u64>> {
    let mut sequences = Vec::with_capacity(count);
    for sent in 0..count {
        if let Some(batching) = batching {
            if sent > 0 && sent % batching.size == 0 {
                tokio::time::sleep(batching.delay).await;
            }
        }

        let deadline = SystemTime::now()
            .checked_add(timeout)
            .context("packet timeout overflows the clock")?;
        let params = PacketParams::new(payload.clone(), PORT_ID, CHANNEL_NAME)
            .timeout_timestamp(Some(deadline));

        let packet = channel.send_packet_with_config(params, packet_config.clone())?;
        {
            let _span = entity_span!(
                "packet",
                packet_id = %packet.id(),
                sequence = packet.sequence()
            )
            .entered();
            packet.send_now()?;
            packet.receive()?;
            packet.acknowledge()?;
            debug!("Packet delivered");
        }
        sequences.push(packet.sequence());
    }
    Ok(sequences)
}
