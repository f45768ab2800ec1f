//! The river status client: connection supervisor and protocol dispatch.
//!
//! A single dedicated worker thread owns the Wayland connection and runs the
//! lifecycle `Disconnected → Connecting → Discovering → Binding → Ready →
//! Terminated`. All protocol state (registry mirror, output table, seat) is
//! mutated only on that thread; consumers observe immutable snapshots and
//! receive typed events through the [`EventBus`].
//!
//! The only blocking operation is the roundtrip at the heart of the `Ready`
//! loop. Stop requests are honored between roundtrips; there is no timeout
//! on a roundtrip itself, and no reconnect once the transport errors — the
//! client stays `Terminated` until restarted by the process.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, trace, warn};
use wayland_client::protocol::wl_output::{self, WlOutput};
use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::protocol::wl_seat::{self, WlSeat};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle};

use crate::bus::{EventBus, Subscription};
use crate::error::{Result, StatusError};
use crate::event::{EventFilter, StatusEvent};
use crate::protocol::{
    ZriverOutputStatusV1, ZriverSeatStatusV1, ZriverStatusManagerV1, zriver_output_status_v1,
    zriver_seat_status_v1, zriver_status_manager_v1,
};
use crate::state::{OutputTable, StatusSnapshot};

/// Interface name of the status manager global.
const STATUS_MANAGER_INTERFACE: &str = "zriver_status_manager_v1";

/// Highest protocol versions this client understands.
const MANAGER_VERSION: u32 = 4;
const OUTPUT_VERSION: u32 = 4;
const SEAT_VERSION: u32 = 4;

/// Lifecycle phase of the connection supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    /// Not started yet.
    Disconnected,
    /// Opening the compositor socket.
    Connecting,
    /// First roundtrip in flight, populating the registry mirror.
    Discovering,
    /// Status objects being created for known outputs and the seat.
    Binding,
    /// Dispatch loop running; events flow.
    Ready,
    /// Worker exited, cleanly or on error. Terminal.
    Terminated,
}

/// State shared between the worker thread and consumer-facing handles.
struct Shared {
    snapshot: RwLock<StatusSnapshot>,
    phase: RwLock<ClientPhase>,
    stop: AtomicBool,
    ready_latch: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self {
            snapshot: RwLock::new(StatusSnapshot::default()),
            phase: RwLock::new(ClientPhase::Disconnected),
            stop: AtomicBool::new(false),
            ready_latch: AtomicBool::new(false),
        }
    }

    fn set_phase(&self, phase: ClientPhase) {
        let mut current = self.phase.write();
        if *current != phase {
            debug!("client phase {:?} -> {:?}", *current, phase);
            *current = phase;
        }
    }

    fn phase(&self) -> ClientPhase {
        *self.phase.read()
    }

    /// Latch readiness; returns true only for the first caller.
    fn mark_ready(&self) -> bool {
        !self.ready_latch.swap(true, Ordering::SeqCst)
    }

    fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// One entry in the registry mirror.
#[derive(Debug, Clone)]
struct GlobalEntry {
    interface: String,
    #[allow(dead_code)] // kept for logging and future version checks
    version: u32,
}

/// A bound output and, once the manager is available, its status object.
struct TrackedOutput {
    wl_output: WlOutput,
    status: Option<ZriverOutputStatusV1>,
}

/// Worker-thread-only protocol state.
struct WaylandState {
    /// Mirror of the compositor's advertised globals, keyed by registry name.
    globals: HashMap<u32, GlobalEntry>,
    manager: Option<ZriverStatusManagerV1>,
    seat: Option<WlSeat>,
    seat_status: Option<ZriverSeatStatusV1>,
    /// Tracked outputs keyed by registry name.
    outputs: HashMap<u32, TrackedOutput>,
    table: OutputTable,
    bus: Arc<EventBus>,
    shared: Arc<Shared>,
}

impl WaylandState {
    fn new(bus: Arc<EventBus>, shared: Arc<Shared>) -> Self {
        Self {
            globals: HashMap::new(),
            manager: None,
            seat: None,
            seat_status: None,
            outputs: HashMap::new(),
            table: OutputTable::new(),
            bus,
            shared,
        }
    }

    /// Publish an event and refresh the shared snapshot in one step, so
    /// consumers reading the snapshot after an event always see at least
    /// the state that produced it.
    fn publish(&self, event: StatusEvent) {
        *self.shared.snapshot.write() = self.table.snapshot();
        self.bus.publish(&event);
    }

    fn sync_snapshot(&self) {
        *self.shared.snapshot.write() = self.table.snapshot();
    }

    /// Create status objects for every output and the seat, where missing.
    ///
    /// Idempotent per output: an already-bound output keeps its existing
    /// status object, so a compositor-side state change never produces
    /// duplicate listeners or duplicate events.
    fn bind_status_objects(&mut self, qh: &QueueHandle<Self>) {
        let Some(manager) = &self.manager else {
            return;
        };

        for (&id, tracked) in self.outputs.iter_mut() {
            if tracked.status.is_some() {
                continue;
            }
            debug!("binding output status for output {}", id);
            let status = manager.get_river_output_status(&tracked.wl_output, qh, id);
            tracked.status = Some(status);
        }

        if self.seat_status.is_none()
            && let Some(seat) = &self.seat
        {
            debug!("binding seat status");
            self.seat_status = Some(manager.get_river_seat_status(seat, qh, ()));
        }
    }

    /// Handle a `global_remove` for a tracked output: tear down its proxies,
    /// purge its state, and announce the removal. Subsequent events for the
    /// retracted id are dropped by the table.
    fn remove_output(&mut self, id: u32) {
        let Some(tracked) = self.outputs.remove(&id) else {
            return;
        };
        if let Some(status) = tracked.status {
            status.destroy();
        }
        if tracked.wl_output.version() >= 3 {
            tracked.wl_output.release();
        }
        if let Some(event) = self.table.remove(id) {
            self.publish(event);
        }
    }

    /// Translate a seat-status output reference back to a registry name.
    fn output_registry_name(&self, output: &WlOutput) -> Option<u32> {
        output.data::<u32>().copied()
    }
}

impl Dispatch<WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => {
                trace!("global: {} v{} (name={})", interface, version, name);
                state.globals.insert(name, GlobalEntry {
                    interface: interface.clone(),
                    version,
                });

                match interface.as_str() {
                    "wl_output" => {
                        let wl_output: WlOutput =
                            registry.bind(name, version.min(OUTPUT_VERSION), qh, name);
                        state.table.upsert(name);
                        state.outputs.insert(name, TrackedOutput {
                            wl_output,
                            status: None,
                        });
                        state.sync_snapshot();
                        // Late-arriving outputs get their status object
                        // immediately; early ones wait for the manager.
                        state.bind_status_objects(qh);
                    }
                    "wl_seat" => {
                        if state.seat.is_some() {
                            debug!("ignoring additional seat (name={})", name);
                            return;
                        }
                        let seat: WlSeat = registry.bind(name, version.min(SEAT_VERSION), qh, ());
                        state.seat = Some(seat);
                        state.bind_status_objects(qh);
                    }
                    STATUS_MANAGER_INTERFACE => {
                        info!("found {} v{}", interface, version);
                        let manager: ZriverStatusManagerV1 =
                            registry.bind(name, version.min(MANAGER_VERSION), qh, ());
                        state.manager = Some(manager);
                        state.bind_status_objects(qh);
                    }
                    _ => {}
                }
            }
            wl_registry::Event::GlobalRemove { name } => {
                let Some(entry) = state.globals.remove(&name) else {
                    return;
                };
                trace!("global removed: {} (name={})", entry.interface, name);
                if entry.interface == "wl_output" {
                    state.remove_output(name);
                }
            }
            _ => {}
        }
    }
}

impl Dispatch<WlOutput, u32> for WaylandState {
    fn event(
        state: &mut Self,
        _output: &WlOutput,
        event: wl_output::Event,
        registry_name: &u32,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_output::Event::Name { name } = event {
            trace!("output {} is {}", registry_name, name);
            state.table.set_output_name(*registry_name, name);
            state.sync_snapshot();
        }
    }
}

impl Dispatch<WlSeat, ()> for WaylandState {
    fn event(
        _state: &mut Self,
        _seat: &WlSeat,
        _event: wl_seat::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        // Capabilities and seat name are irrelevant here.
    }
}

impl Dispatch<ZriverStatusManagerV1, ()> for WaylandState {
    fn event(
        _state: &mut Self,
        _manager: &ZriverStatusManagerV1,
        event: zriver_status_manager_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        // The manager has no events.
        match event {}
    }
}

impl Dispatch<ZriverOutputStatusV1, u32> for WaylandState {
    fn event(
        state: &mut Self,
        _status: &ZriverOutputStatusV1,
        event: zriver_output_status_v1::Event,
        output_id: &u32,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            zriver_output_status_v1::Event::FocusedTags { tags } => {
                if let Some(event) = state.table.apply_focused_tags(*output_id, tags) {
                    state.publish(event);
                }
            }
            zriver_output_status_v1::Event::ViewTags { tags } => {
                if let Some(event) = state.table.apply_view_tags(*output_id, &tags) {
                    state.publish(event);
                }
            }
            zriver_output_status_v1::Event::UrgentTags { tags } => {
                if let Some(event) = state.table.apply_urgent_tags(*output_id, tags) {
                    state.publish(event);
                }
            }
            zriver_output_status_v1::Event::LayoutName { name } => {
                trace!("output {} layout: {}", output_id, name);
            }
            zriver_output_status_v1::Event::LayoutNameClear => {
                trace!("output {} layout cleared", output_id);
            }
        }
    }
}

impl Dispatch<ZriverSeatStatusV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _status: &ZriverSeatStatusV1,
        event: zriver_seat_status_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            zriver_seat_status_v1::Event::FocusedView { title } => {
                let event = state.table.apply_focused_view(title);
                state.publish(event);
            }
            zriver_seat_status_v1::Event::FocusedOutput { output } => {
                let id = output.as_ref().and_then(|o| state.output_registry_name(o));
                state.table.set_focused_output(id);
                state.sync_snapshot();
            }
            zriver_seat_status_v1::Event::UnfocusedOutput { output: _ } => {
                state.table.set_focused_output(None);
                state.sync_snapshot();
            }
            zriver_seat_status_v1::Event::Mode { name } => {
                trace!("seat mode: {}", name);
            }
        }
    }
}

/// Handle to the status client.
///
/// Construct with [`RiverStatusClient::new`], subscribe to the bus, then
/// [`start`](RiverStatusClient::start) the worker. The handle is cheap to
/// share behind an `Arc`.
pub struct RiverStatusClient {
    bus: Arc<EventBus>,
    shared: Arc<Shared>,
    running: AtomicBool,
    worker: Mutex<Option<JoinHandle<Result<()>>>>,
}

impl RiverStatusClient {
    /// Create an unstarted client in the `Disconnected` phase.
    pub fn new() -> Self {
        Self {
            bus: Arc::new(EventBus::new()),
            shared: Arc::new(Shared::new()),
            running: AtomicBool::new(false),
            worker: Mutex::new(None),
        }
    }

    /// The event bus; subscribe before [`start`](Self::start) to observe
    /// the full lifecycle including `Ready`.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Shorthand for `self.bus().subscribe(filter)`.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    /// Current snapshot of all output and seat state.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.shared.snapshot.read().clone()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ClientPhase {
        self.shared.phase()
    }

    /// Whether the initial handshake completed and the dispatch loop runs.
    pub fn is_ready(&self) -> bool {
        self.shared.phase() == ClientPhase::Ready
    }

    /// Spawn the worker thread. Calling this twice is a logged no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("status client already running");
            return;
        }

        let shared = self.shared.clone();
        let bus = self.bus.clone();
        let handle = thread::Builder::new()
            .name("river-status".to_string())
            .spawn(move || {
                let result = run_connection(&shared, &bus);
                shared.set_phase(ClientPhase::Terminated);
                if let Err(ref e) = result {
                    error!("status client terminated: {}", e);
                }
                result
            });

        match handle {
            Ok(handle) => *self.worker.lock() = Some(handle),
            Err(e) => {
                error!("failed to spawn river-status thread: {}", e);
                self.shared.set_phase(ClientPhase::Terminated);
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Ask the worker to exit after its current roundtrip.
    ///
    /// A roundtrip blocked on an unresponsive compositor is not interrupted;
    /// the request takes effect at the next loop iteration.
    pub fn stop(&self) {
        self.shared.request_stop();
    }

    /// Wait for the worker to exit and return its terminal result.
    ///
    /// `Ok(())` after a requested stop, or the fatal transport/bind error
    /// that ended the lifecycle.
    pub fn join(&self) -> Result<()> {
        let handle = self.worker.lock().take();
        match handle {
            Some(handle) => match handle.join() {
                Ok(result) => result,
                Err(_) => {
                    error!("river-status worker panicked");
                    Ok(())
                }
            },
            None => Ok(()),
        }
    }
}

impl Default for RiverStatusClient {
    fn default() -> Self {
        Self::new()
    }
}

/// One full connection lifecycle, run on the worker thread.
fn run_connection(shared: &Arc<Shared>, bus: &Arc<EventBus>) -> Result<()> {
    shared.set_phase(ClientPhase::Connecting);
    let conn = Connection::connect_to_env()?;
    let mut queue = conn.new_event_queue();
    let qh = queue.handle();
    let display = conn.display();
    let _registry = display.get_registry(&qh, ());

    let mut state = WaylandState::new(bus.clone(), shared.clone());

    // First roundtrip populates the registry mirror; globals are bound as
    // they are announced.
    shared.set_phase(ClientPhase::Discovering);
    queue.roundtrip(&mut state)?;

    if state.manager.is_none() {
        return Err(StatusError::ExtensionUnavailable {
            interface: STATUS_MANAGER_INTERFACE,
        });
    }

    // Status objects for outputs that arrived before the manager did.
    shared.set_phase(ClientPhase::Binding);
    state.bind_status_objects(&qh);

    // Second roundtrip confirms the bindings and delivers the initial
    // tag and focus state for every bound output.
    queue.roundtrip(&mut state)?;

    info!(
        "ready: {} output(s), seat {}",
        state.outputs.len(),
        if state.seat_status.is_some() {
            "bound"
        } else {
            "absent"
        }
    );
    shared.set_phase(ClientPhase::Ready);
    if shared.mark_ready() {
        state.publish(StatusEvent::Ready);
    }

    // Dispatch indefinitely. Each roundtrip flushes queued requests and
    // drains incoming events; stop requests are honored between iterations.
    loop {
        if shared.stop_requested() {
            debug!("stop requested, ending dispatch loop");
            return Ok(());
        }
        queue.roundtrip(&mut state)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_latch_fires_once() {
        let shared = Shared::new();
        assert!(shared.mark_ready());
        assert!(!shared.mark_ready());
        assert!(!shared.mark_ready());
    }

    #[test]
    fn phase_starts_disconnected() {
        let shared = Shared::new();
        assert_eq!(shared.phase(), ClientPhase::Disconnected);
        shared.set_phase(ClientPhase::Connecting);
        shared.set_phase(ClientPhase::Terminated);
        assert_eq!(shared.phase(), ClientPhase::Terminated);
    }

    #[test]
    fn stop_request_is_sticky() {
        let shared = Shared::new();
        assert!(!shared.stop_requested());
        shared.request_stop();
        assert!(shared.stop_requested());
        assert!(shared.stop_requested());
    }

    #[test]
    fn unstarted_client_reports_disconnected() {
        let client = RiverStatusClient::new();
        assert_eq!(client.phase(), ClientPhase::Disconnected);
        assert!(!client.is_ready());
        assert!(client.snapshot().outputs.is_empty());
        // Joining an unstarted client is a no-op.
        assert!(client.join().is_ok());
    }
}
