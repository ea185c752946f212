/// Fan-out topology over the in-memory network: a `ClientUpdateManager`
/// tailoring batches for several `ServerUpdateClient`s.
use runt_client::ServerUpdateClient;
use runt_server::{ClientUpdateManager, HistoryUpdater, ServerConfig};
use runt_shared::{ClientBatch, ClientId, ConnectionKey, Host, Identity, RuntMessage, UpdateMessage};
use runt_test::{
    init_logger, protocol, EndpointId, Health, LocalConnections, LocalNetwork, ManualClock,
    Position, RecordingHandler, UpdateLog,
};

struct Client {
    endpoint: EndpointId,
    key: ConnectionKey,
    client: ServerUpdateClient,
    log: UpdateLog,
}

struct FanOut {
    network: LocalNetwork,
    clock: ManualClock,
    server_endpoint: EndpointId,
    manager: ClientUpdateManager,
    identity: Identity,
    updater: HistoryUpdater,
    clients: Vec<Client>,
}

impl FanOut {
    fn new() -> Self {
        init_logger();

        let network = LocalNetwork::new(protocol().into_codec());
        let (server_endpoint, server_connections) = network.endpoint();
        let clock = ManualClock::new("NetworkClock");

        let mut host = Host::new()
            .with_connections(server_connections)
            .with_clock(clock.clone());
        let mut manager = ClientUpdateManager::attach(&ServerConfig::default(), &mut host)
            .expect("host has connections and clock");

        let identity = Identity::generate();
        let updater = HistoryUpdater::new(identity);
        manager.add_updater(updater.clone());

        Self {
            network,
            clock,
            server_endpoint,
            manager,
            identity,
            updater,
            clients: Vec::new(),
        }
    }

    /// Connects a new client, returning its index in `clients`
    fn connect(&mut self) -> usize {
        let (endpoint, connections): (EndpointId, LocalConnections) = self.network.endpoint();
        let mut host = Host::new().with_connections(connections);
        let mut client = ServerUpdateClient::attach(&mut host).expect("host has connections");

        let log = UpdateLog::new();
        client.add_handler(RecordingHandler::new(self.identity, &log));

        let (_, key) = self.network.connect(self.server_endpoint, endpoint);
        self.clients.push(Client {
            endpoint,
            key,
            client,
            log,
        });
        self.clients.len() - 1
    }

    /// Runs one manager tick, delivering batches only to clients `reaches`
    /// accepts, then lets every client report back
    fn step_where(&mut self, reaches: impl Fn(usize) -> bool) {
        self.clock.fire();
        self.manager.update();

        for packet in self.network.take_in_flight() {
            let index = self
                .clients
                .iter()
                .position(|client| client.endpoint == packet.to);
            if index.map_or(true, &reaches) {
                self.network.deliver_packet(packet);
            }
        }

        for client in self.clients.iter_mut() {
            client.client.update();
        }
        self.network.flush();
    }

    fn step(&mut self) {
        self.step_where(|_| true);
    }

    fn client_id(&self, index: usize) -> ClientId {
        self.clients[index]
            .client
            .client_id()
            .expect("client has been assigned an id")
    }

    fn healths(&self, index: usize) -> Vec<u32> {
        self.clients[index]
            .log
            .payloads::<Health>()
            .into_iter()
            .map(|health| health.0)
            .collect()
    }

    /// Sends a report to the manager as if client `index` had sent it
    fn forge_report(&self, index: usize, report: ClientBatch) {
        let client = &self.clients[index];
        let packet = self
            .network
            .encode(client.endpoint, &client.key, &RuntMessage::ClientBatch(report))
            .expect("client knows its link");
        self.network.deliver_packet(packet);
    }
}

#[test]
fn clients_get_changes_since_their_own_acknowledgement() {
    let mut world = FanOut::new();
    let behind = world.connect();
    let current = world.connect();
    let also_current = world.connect();

    for value in 0..=2 {
        world.updater.push_change(Health(value));
        world.step();
    }
    for value in 3..=4 {
        world.updater.push_change(Health(value));
        world.step_where(|index| index != behind);
    }

    // the manager picks up the last reports at the start of the next tick
    world.manager.receive_all();
    assert_eq!(world.manager.client_sequence(world.client_id(behind)), Some(2));
    assert_eq!(world.manager.client_sequence(world.client_id(current)), Some(4));
    assert_eq!(world.manager.client_sequence(world.client_id(also_current)), Some(4));

    for client in &world.clients {
        client.log.clear();
    }
    world.updater.push_change(Health(5));
    world.step();

    assert_eq!(world.healths(behind), vec![3, 4, 5]);
    assert_eq!(world.healths(current), vec![5]);
    assert_eq!(world.healths(also_current), vec![5]);
}

#[test]
fn every_client_gets_a_batch_each_tick_even_when_empty() {
    let mut world = FanOut::new();
    let first = world.connect();
    let second = world.connect();

    world.step();
    world.step();

    assert_eq!(world.clients[first].client.last_accepted_sequence(), Some(1));
    assert_eq!(world.clients[second].client.last_accepted_sequence(), Some(1));
    assert!(world.clients[first].log.is_empty());
    assert!(world.clients[first].client.has_handler(&world.identity));
    assert_ne!(world.client_id(first), world.client_id(second));
}

#[test]
fn late_joiner_is_seeded_with_the_snapshot_then_gets_changes() {
    let mut world = FanOut::new();
    let early = world.connect();

    for value in 0..=2 {
        world.updater.push_change(Health(value));
        world.updater.set_snapshot(Position::new(value as f32, 0.0));
        world.step();
    }

    let late = world.connect();
    world.updater.push_change(Health(3));
    world.updater.set_snapshot(Position::new(3.0, 0.0));
    world.step();

    assert_eq!(
        world.clients[late].log.payloads::<Position>(),
        vec![Position::new(3.0, 0.0)]
    );
    assert!(world.healths(late).is_empty());
    assert!(world.updater.is_seeding(world.client_id(late)));

    world.updater.push_change(Health(4));
    world.updater.set_snapshot(Position::new(4.0, 0.0));
    world.step();

    assert_eq!(world.healths(late), vec![4]);
    assert!(!world.updater.is_seeding(world.client_id(late)));

    assert_eq!(
        world.clients[early].log.payloads::<Position>(),
        vec![Position::new(0.0, 0.0)]
    );
    assert_eq!(world.healths(early), vec![1, 2, 3, 4]);
}

#[test]
fn client_updates_reach_the_updater_they_are_addressed_to() {
    let mut world = FanOut::new();
    let other_identity = Identity::generate();
    let other = HistoryUpdater::new(other_identity);
    world.manager.add_updater(other.clone());
    let index = world.connect();

    world.clients[index]
        .client
        .queue_update(world.identity, Health(1));
    world.clients[index]
        .client
        .queue_update(other_identity, Health(2));

    world.step();
    world.manager.receive_all();

    let first: Vec<Health> = world
        .updater
        .drain_inbound()
        .iter()
        .filter_map(|message| message.payload_as::<Health>().copied())
        .collect();
    let second: Vec<Health> = other
        .drain_inbound()
        .iter()
        .filter_map(|message| message.payload_as::<Health>().copied())
        .collect();
    assert_eq!(first, vec![Health(1)]);
    assert_eq!(second, vec![Health(2)]);
}

#[test]
fn stale_report_is_ignored_along_with_its_updates() {
    let mut world = FanOut::new();
    let index = world.connect();
    for _ in 0..4 {
        world.step();
    }
    world.manager.receive_all();
    let client = world.client_id(index);
    assert_eq!(world.manager.client_sequence(client), Some(3));

    world.forge_report(
        index,
        ClientBatch::new(
            client,
            1,
            vec![UpdateMessage::new(world.identity, Health(99))],
        ),
    );
    world.manager.receive_all();

    assert_eq!(world.manager.client_sequence(client), Some(3));
    assert!(world.updater.drain_inbound().is_empty());
}

#[test]
fn report_from_unknown_client_is_ignored() {
    let mut world = FanOut::new();
    let index = world.connect();
    world.step();
    world.manager.receive_all();

    world.forge_report(
        index,
        ClientBatch::new(
            ClientId::new(77),
            9,
            vec![UpdateMessage::new(world.identity, Health(1))],
        ),
    );
    world.manager.receive_all();

    assert_eq!(world.manager.client_count(), 1);
    assert_eq!(world.manager.client_sequence(ClientId::new(77)), None);
    assert!(world.updater.drain_inbound().is_empty());
}

#[test]
fn departed_client_ids_are_not_reused() {
    let mut world = FanOut::new();
    let first = world.connect();
    world.step();
    let first_id = world.client_id(first);

    let key = world.clients[first].key;
    let endpoint = world.clients[first].endpoint;
    world.network.disconnect(endpoint, key);
    world.step();
    assert_eq!(world.manager.client_count(), 0);

    let second = world.connect();
    world.step();

    assert_ne!(world.client_id(second), first_id);
}

#[test]
fn lost_assignment_is_repeated_until_the_client_reports() {
    let mut world = FanOut::new();
    let index = world.connect();

    // the whole first tick, assignment included, never arrives
    world.step_where(|_| false);
    assert_eq!(world.clients[index].client.client_id(), None);

    world.step();
    let client = world.client_id(index);
    world.manager.receive_all();
    assert_eq!(world.manager.client_sequence(client), Some(1));

    // reported in, so only the batch goes out now
    world.clock.fire();
    world.manager.update();
    assert_eq!(world.network.in_flight_len(), 1);
}

#[test]
fn nothing_is_sent_without_clients() {
    let mut world = FanOut::new();

    world.updater.push_change(Health(1));
    world.clock.fire();
    world.manager.update();

    assert_eq!(world.manager.sequence(), 0);
    assert_eq!(world.network.in_flight_len(), 0);
    assert_eq!(world.updater.retained_len(), 1);
}

#[test]
fn departing_client_is_dropped_from_updater_bookkeeping() {
    let mut world = FanOut::new();
    world.updater.set_snapshot(Position::new(1.0, 1.0));
    let index = world.connect();

    world.step();
    let client = world.client_id(index);
    assert!(world.updater.is_seeding(client));

    let key = world.clients[index].key;
    let endpoint = world.clients[index].endpoint;
    world.network.disconnect(endpoint, key);
    world.step();

    assert_eq!(world.manager.client_count(), 0);
    assert!(!world.updater.is_seeding(client));
}
