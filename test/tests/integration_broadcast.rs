/// Broadcast topology over the in-memory network: one `UpdateSource`
/// keeping an `UpdateTarget` current through lost, late and duplicated
/// packets.
use proptest::prelude::*;

use runt_client::UpdateTarget;
use runt_server::{BufferedUpdateProvider, ServerConfig, UpdateSource};
use runt_shared::{ConnectionKey, Host, Identity, RuntMessage, UpdateBatch, UpdateMessage};
use runt_test::{
    init_logger, protocol, EndpointId, Health, LocalNetwork, ManualClock, RecordingHandler,
    UpdateLog,
};

struct Broadcast {
    network: LocalNetwork,
    clock: ManualClock,
    source: UpdateSource,
    target: UpdateTarget,
    target_endpoint: EndpointId,
    source_key: ConnectionKey,
    target_key: ConnectionKey,
    provider: BufferedUpdateProvider,
    log: UpdateLog,
}

impl Broadcast {
    fn new() -> Self {
        init_logger();

        let network = LocalNetwork::new(protocol().into_codec());
        let (source_endpoint, source_connections) = network.endpoint();
        let (target_endpoint, target_connections) = network.endpoint();
        let clock = ManualClock::new("NetworkClock");

        let mut server_host = Host::new()
            .with_connections(source_connections)
            .with_clock(clock.clone());
        let mut source = UpdateSource::attach(&ServerConfig::default(), &mut server_host)
            .expect("server host has connections and clock");

        let mut client_host = Host::new().with_connections(target_connections);
        let mut target =
            UpdateTarget::attach(&mut client_host).expect("client host has connections");

        let identity = Identity::generate();
        let provider = BufferedUpdateProvider::new(identity);
        source.add_provider(provider.clone());

        let log = UpdateLog::new();
        target.add_handler(RecordingHandler::new(identity, &log));

        let (source_key, target_key) = network.connect(source_endpoint, target_endpoint);

        Self {
            network,
            clock,
            source,
            target,
            target_endpoint,
            source_key,
            target_key,
            provider,
            log,
        }
    }

    /// Runs one source tick, leaving the batch in flight
    fn tick(&mut self) {
        self.clock.fire();
        self.source.update();
    }

    /// Lets the target process what reached it and sends its acks on their way
    fn receive(&mut self) {
        self.target.update();
        self.network.flush();
    }

    /// One tick with nothing lost
    fn step(&mut self) {
        self.tick();
        self.network.flush();
        self.receive();
    }

    fn healths(&self) -> Vec<u32> {
        self.log
            .payloads::<Health>()
            .into_iter()
            .map(|health| health.0)
            .collect()
    }
}

#[test]
fn empty_batches_still_flow_and_are_acknowledged() {
    let mut world = Broadcast::new();

    world.step();
    world.step();
    world.source.receive_all();

    assert_eq!(world.target.last_accepted_sequence(), Some(1));
    assert_eq!(world.source.acknowledged_sequence(&world.source_key), Some(1));
    assert!(world.log.is_empty());
}

#[test]
fn lost_batch_contents_arrive_with_the_next_batch() {
    let mut world = Broadcast::new();

    world.provider.push(Health(10));
    world.step();
    assert_eq!(world.healths(), vec![10]);

    world.provider.push(Health(11));
    world.tick();
    assert_eq!(world.network.drop_in_flight(), 1);

    world.provider.push(Health(12));
    world.tick();
    world.network.flush();
    world.receive();

    assert_eq!(world.healths(), vec![10, 11, 12]);
    assert_eq!(world.target.last_accepted_sequence(), Some(2));
}

#[test]
fn acknowledged_updates_are_not_resent() {
    let mut world = Broadcast::new();

    world.provider.push(Health(1));
    world.step();
    world.provider.push(Health(2));
    world.step();
    world.step();

    assert_eq!(world.healths(), vec![1, 2]);
    // once the last ack is in, the next tick trims everything
    world.source.receive_all();
    world.tick();
    assert_eq!(world.provider.retained_len(), 0);
}

#[test]
fn late_batch_is_discarded_after_a_newer_one() {
    let mut world = Broadcast::new();

    for value in 0..=5 {
        world.provider.push(Health(value));
        world.tick();
    }
    let packets = world.network.take_in_flight();
    assert_eq!(packets.len(), 6);

    world.network.deliver_packet(packets[5].clone());
    world.network.deliver_packet(packets[3].clone());
    world.receive();

    assert_eq!(world.target.last_accepted_sequence(), Some(5));
    assert_eq!(world.healths(), vec![0, 1, 2, 3, 4, 5]);

    world.source.receive_all();
    assert_eq!(world.source.acknowledged_sequence(&world.source_key), Some(5));
}

#[test]
fn duplicate_batch_is_applied_once() {
    let mut world = Broadcast::new();

    world.provider.push(Health(3));
    world.tick();
    let packets = world.network.take_in_flight();
    world.network.deliver_packet(packets[0].clone());
    world.network.deliver_packet(packets[0].clone());
    world.receive();

    assert_eq!(world.healths(), vec![3]);
}

#[test]
fn stale_ack_does_not_move_the_target_backwards() {
    let mut world = Broadcast::new();
    for _ in 0..6 {
        world.step();
    }
    world.source.receive_all();
    assert_eq!(world.source.acknowledged_sequence(&world.source_key), Some(5));

    let stale = world
        .network
        .encode(
            world.target_endpoint,
            &world.target_key,
            &RuntMessage::Batch(UpdateBatch::ack(3)),
        )
        .expect("target knows its link");
    world.network.deliver_packet(stale);
    world.source.receive_all();

    assert_eq!(world.source.acknowledged_sequence(&world.source_key), Some(5));
}

#[test]
fn unregistered_payload_does_not_stall_other_updates() {
    let mut world = Broadcast::new();
    let unregistered = BufferedUpdateProvider::new(Identity::generate());
    world.source.add_provider(unregistered.clone());

    // u64 is not part of the test protocol
    unregistered.push(7_u64);
    for value in 0..5 {
        world.provider.push(Health(value));
        world.step();
    }
    world.source.receive_all();

    assert_eq!(world.target.last_accepted_sequence(), Some(4));
    assert_eq!(world.healths(), vec![0, 1, 2, 3, 4]);
    assert_eq!(world.source.acknowledged_sequence(&world.source_key), Some(4));

    // acks keep flowing, so the history behind them is released
    world.tick();
    assert_eq!(unregistered.retained_len(), 0);
}

#[test]
fn nothing_is_sent_without_targets() {
    init_logger();
    let network = LocalNetwork::new(protocol().into_codec());
    let (_, connections) = network.endpoint();
    let clock = ManualClock::new("NetworkClock");
    let mut host = Host::new()
        .with_connections(connections)
        .with_clock(clock.clone());
    let mut source = UpdateSource::attach(&ServerConfig::default(), &mut host)
        .expect("host has connections and clock");
    let provider = BufferedUpdateProvider::new(Identity::generate());
    source.add_provider(provider.clone());

    provider.push(Health(1));
    clock.fire();
    source.update();

    assert_eq!(source.sequence(), 0);
    assert_eq!(network.in_flight_len(), 0);
    assert_eq!(provider.retained_len(), 1);
}

proptest! {
    #[test]
    fn only_batches_newer_than_all_before_them_are_applied(
        sequences in prop::collection::vec(0u32..40, 1..30)
    ) {
        let mut world = Broadcast::new();
        let identity = Identity::from_u128(0xfeed);
        let log = UpdateLog::new();
        world.target.add_handler(RecordingHandler::new(identity, &log));

        let mut expected = Vec::new();
        let mut newest: Option<u32> = None;
        for sequence in &sequences {
            if newest.map_or(true, |newest| *sequence > newest) {
                expected.push(*sequence);
                newest = Some(*sequence);
            }
            let batch = UpdateBatch::new(
                *sequence,
                vec![UpdateMessage::new(identity, Health(*sequence))],
            );
            world.target.receive_batch(&world.target_key, batch);
        }

        let applied: Vec<u32> = log.payloads::<Health>().into_iter().map(|health| health.0).collect();
        prop_assert_eq!(applied, expected);
        prop_assert_eq!(world.target.last_accepted_sequence(), sequences.iter().max().copied());
    }
}
