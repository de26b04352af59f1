//! Connection state machine and per-tick sample drain.

use crate::buffer::{SampleBuffer, DEFAULT_CAPACITY};
use crate::config::ConfigStore;
use crate::driver::Driver;
use crate::error::OwlError;
use crate::observer::{SubscriberId, UpdateBroadcaster};
use crate::protocol::{
    ErrorCode, InitFlags, COMMON_ENABLE, DEFAULT_FREQUENCY, NO_ERROR, SET_FREQUENCY, SET_STREAMING,
};
use crate::types::SampleCategory;
use crate::Result;

/// Config key under which the server address persists.
pub const ADDRESS_PROPERTY: &str = "owl_address";

/// Connection lifecycle state.
///
/// `Error` is terminal: `poll` alone never leaves it. An external
/// [`OwlClient::reset`] (or shutdown) is required to get back to
/// `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Error,
}

/// Tunables for an [`OwlClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Server address; replaced by the persisted `owl_address` property at
    /// `on_start` when one exists.
    pub server_address: String,
    /// Streaming frequency requested at connect, in Hz.
    pub server_frequency: f32,
    /// Scalar applied to every retrieved position component.
    pub space_scalar: f32,
    pub capture_markers: bool,
    pub capture_rigids: bool,
    pub capture_cameras: bool,
    /// Slot count per sample category.
    pub capacity: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            server_address: "127.0.0.1".to_string(),
            server_frequency: DEFAULT_FREQUENCY,
            space_scalar: 1.0,
            capture_markers: true,
            capture_rigids: true,
            capture_cameras: true,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Tick-driven client for an OWL motion-capture server.
///
/// The owning host loop drives the four lifecycle operations: `on_attach`
/// (register config properties), `on_start` (read persisted address),
/// `poll` (once per tick), `on_shutdown` (teardown). `poll` runs to
/// completion with no internal suspension; hosts calling it from multiple
/// threads must serialize externally.
pub struct OwlClient<D> {
    driver: D,
    settings: ClientSettings,
    state: ConnectionState,
    running: bool,
    frames: SampleBuffer,
    broadcaster: UpdateBroadcaster,
}

impl<D: Driver> OwlClient<D> {
    pub fn new(driver: D, settings: ClientSettings) -> OwlClient<D> {
        let frames = SampleBuffer::new(settings.capacity);
        OwlClient {
            driver,
            settings,
            state: ConnectionState::Disconnected,
            running: false,
            frames,
            broadcaster: UpdateBroadcaster::new(),
        }
    }

    pub fn with_defaults(driver: D) -> OwlClient<D> {
        OwlClient::new(driver, ClientSettings::default())
    }

    /// Reserve the address property, defaulting to the configured address.
    pub fn on_attach(&self, config: &mut ConfigStore) {
        config.register_property(ADDRESS_PROPERTY, &self.settings.server_address);
    }

    /// Adopt the persisted server address, falling back to the configured one.
    pub fn on_start(&mut self, config: &mut ConfigStore) {
        let fallback = self.settings.server_address.clone();
        self.settings.server_address = config.get_property(ADDRESS_PROPERTY, &fallback);
    }

    /// Per-tick entry point.
    ///
    /// `Disconnected`: attempt the connect handshake. `Connected`: drain the
    /// enabled categories and notify subscribers when any batch was
    /// non-empty. `Error`: no-op. `running` is recomputed every call.
    pub fn poll(&mut self) {
        match self.state {
            ConnectionState::Disconnected => match self.connect() {
                Ok(()) => self.state = ConnectionState::Connected,
                Err(err) => {
                    log::error!("owl connect failed: {}", err);
                    self.driver.shutdown();
                    self.state = ConnectionState::Error;
                }
            },
            ConnectionState::Connected => match self.drain_tick() {
                Ok(true) => self.broadcaster.notify(&self.frames),
                Ok(false) => {}
                Err(err) => {
                    log::error!("owl tick aborted: {}", err);
                    self.driver.shutdown();
                    self.state = ConnectionState::Error;
                }
            },
            ConnectionState::Error => {}
        }
        self.running = self.state == ConnectionState::Connected;
    }

    /// Release any live session and force the state machine back to
    /// `Disconnected`. This is the only way out of `Error`; the next `poll`
    /// will attempt a fresh connect.
    pub fn reset(&mut self) {
        self.disconnect();
    }

    /// Final teardown. Safe to call from any state; the live session is only
    /// released when one exists.
    pub fn on_shutdown(&mut self) {
        self.disconnect();
    }

    fn disconnect(&mut self) {
        if self.state == ConnectionState::Connected {
            log::info!("stopping owl client");
            self.driver.shutdown();
        }
        self.state = ConnectionState::Disconnected;
        self.running = false;
    }

    fn connect(&mut self) -> Result<()> {
        log::info!(
            "connecting to owl server at {}",
            self.settings.server_address
        );
        // Clear any stale session before (re)connecting.
        self.driver.shutdown();

        let rc = self
            .driver
            .init(&self.settings.server_address, InitFlags::SLAVE);
        if rc < 0 {
            return Err(OwlError::InitFailed { rc });
        }
        if let Some(code) = self.take_error() {
            return Err(OwlError::ConnectRejected { code });
        }

        self.driver
            .set_float(SET_FREQUENCY, self.settings.server_frequency);
        self.check_param(SET_FREQUENCY)?;

        self.driver.set_int(SET_STREAMING, COMMON_ENABLE);
        self.check_param(SET_STREAMING)?;

        log::info!(
            "owl server streaming at {} Hz",
            self.settings.server_frequency
        );
        Ok(())
    }

    /// Drain every enabled category in order markers → rigids → cameras.
    ///
    /// Markers and rigids repeat the retrieval until the driver reports no
    /// further data; every call fully overwrites the category's slots, so
    /// only the last non-empty batch of the tick survives. Cameras are a
    /// single call (their counts never backlog). The error check runs after
    /// every retrieval and aborts the whole tick.
    fn drain_tick(&mut self) -> Result<bool> {
        let mut got_data = false;

        if self.settings.capture_markers {
            loop {
                let n = self.driver.get_markers(self.frames.marker_slots_mut());
                if n > 0 {
                    got_data = true;
                    self.frames
                        .commit_markers(n as usize, self.settings.space_scalar);
                }
                self.check_retrieval(SampleCategory::Markers)?;
                if n <= 0 {
                    break;
                }
            }
        }

        if self.settings.capture_rigids {
            loop {
                let n = self.driver.get_rigids(self.frames.rigid_slots_mut());
                if n > 0 {
                    got_data = true;
                    self.frames
                        .commit_rigids(n as usize, self.settings.space_scalar);
                }
                self.check_retrieval(SampleCategory::Rigids)?;
                if n <= 0 {
                    break;
                }
            }
        }

        if self.settings.capture_cameras {
            let n = self.driver.get_cameras(self.frames.camera_slots_mut());
            if n > 0 {
                got_data = true;
                self.frames
                    .commit_cameras(n as usize, self.settings.space_scalar);
            }
            self.check_retrieval(SampleCategory::Cameras)?;
        }

        Ok(got_data)
    }

    fn take_error(&mut self) -> Option<ErrorCode> {
        let code = self.driver.last_error();
        if code != NO_ERROR {
            Some(ErrorCode::from_raw(code))
        } else {
            None
        }
    }

    fn check_param(&mut self, param: u32) -> Result<()> {
        match self.take_error() {
            Some(code) => Err(OwlError::ParameterRejected { param, code }),
            None => Ok(()),
        }
    }

    fn check_retrieval(&mut self, category: SampleCategory) -> Result<()> {
        match self.take_error() {
            Some(code) => Err(OwlError::RetrievalFailed { category, code }),
            None => Ok(()),
        }
    }

    // -- Observables & registration --

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True iff the client is currently connected; recomputed every `poll`.
    pub fn running(&self) -> bool {
        self.running
    }

    /// The sample storage subscribers read from.
    pub fn frames(&self) -> &SampleBuffer {
        &self.frames
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&SampleBuffer) + 'static,
    {
        self.broadcaster.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.broadcaster.unsubscribe(id)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockDriver};
    use crate::protocol::{WireMarker, WirePose, WireRigid};
    use crate::types::Marker;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn marker(id: i32, x: f32, y: f32, z: f32) -> WireMarker {
        WireMarker {
            id,
            frame: 1,
            x,
            y,
            z,
            cond: 1.0,
            flag: 0,
        }
    }

    fn markers_only() -> ClientSettings {
        ClientSettings {
            capture_rigids: false,
            capture_cameras: false,
            ..ClientSettings::default()
        }
    }

    fn connected(settings: ClientSettings) -> OwlClient<MockDriver> {
        let mut client = OwlClient::new(MockDriver::new(), settings);
        client.poll();
        assert_eq!(client.state(), ConnectionState::Connected);
        client
    }

    fn notification_counter(client: &mut OwlClient<MockDriver>) -> Rc<RefCell<usize>> {
        let count = Rc::new(RefCell::new(0usize));
        let clone = count.clone();
        client.subscribe(move |_| *clone.borrow_mut() += 1);
        count
    }

    #[test]
    fn connect_runs_handshake_in_order() {
        let mut client = OwlClient::with_defaults(MockDriver::new());
        client.poll();

        assert_eq!(client.state(), ConnectionState::Connected);
        assert!(client.running());
        assert_eq!(
            &client.driver().calls()[..4],
            &[
                Call::Shutdown,
                Call::Init {
                    address: "127.0.0.1".to_string(),
                    flags: InitFlags::SLAVE.bits(),
                },
                Call::SetFloat {
                    param: SET_FREQUENCY,
                    value: DEFAULT_FREQUENCY,
                },
                Call::SetInt {
                    param: SET_STREAMING,
                    value: COMMON_ENABLE,
                },
            ],
        );
    }

    #[test]
    fn failed_init_goes_to_error() {
        let mut client = OwlClient::with_defaults(MockDriver::new().fail_init(-1));
        client.poll();
        assert_eq!(client.state(), ConnectionState::Error);
        assert!(!client.running());
    }

    #[test]
    fn connect_rejection_tears_down_session() {
        let mut client = OwlClient::with_defaults(MockDriver::new().reject_connect(0x0022));
        client.poll();
        assert_eq!(client.state(), ConnectionState::Error);
        assert!(!client.driver().session_live());
    }

    #[test]
    fn parameter_rejection_is_fatal() {
        let mut client =
            OwlClient::with_defaults(MockDriver::new().reject_param(SET_STREAMING, 0x0020));
        client.poll();
        assert_eq!(client.state(), ConnectionState::Error);
        assert!(!client.running());
        assert!(!client.driver().session_live());
    }

    #[test]
    fn error_state_is_terminal_without_reset() {
        let mut client = OwlClient::with_defaults(MockDriver::new().fail_init(-1));
        client.poll();
        assert_eq!(client.state(), ConnectionState::Error);

        for _ in 0..5 {
            client.poll();
        }
        assert_eq!(client.state(), ConnectionState::Error);
        // A single connect attempt: no retries happen from poll alone.
        assert_eq!(
            client
                .driver()
                .count_calls(|c| matches!(c, Call::Init { .. })),
            1
        );

        client.reset();
        assert_eq!(client.state(), ConnectionState::Disconnected);
        client.poll();
        assert_eq!(
            client
                .driver()
                .count_calls(|c| matches!(c, Call::Init { .. })),
            2
        );
    }

    #[test]
    fn drain_stops_on_empty_and_keeps_last_batch() {
        let mut client = connected(markers_only());
        let notifications = notification_counter(&mut client);

        client.driver_mut().push_markers(vec![marker(1, 9.0, 9.0, 9.0); 5]);
        client
            .driver_mut()
            .push_markers((0..5).map(|i| marker(i, 1.0, 2.0, 3.0)).collect());
        let calls_before = client.driver().calls().len();

        client.poll();

        // Two batches plus the terminating empty read.
        assert_eq!(client.driver().calls().len() - calls_before, 3);
        assert_eq!(client.frames().marker_count(), 5);
        // Only the second batch survives.
        assert_eq!(client.frames().marker(0).unwrap().x, 1.0);
        assert_eq!(*notifications.borrow(), 1);
    }

    #[test]
    fn drain_scales_positions_with_space_scalar() {
        let settings = ClientSettings {
            space_scalar: 2.0,
            ..markers_only()
        };
        let mut client = connected(settings);
        client.driver_mut().push_markers(vec![marker(0, 1.0, 2.0, 3.0)]);
        client.poll();

        let wire = client.frames().marker(0).unwrap();
        assert_eq!((wire.x, wire.y, wire.z), (2.0, 4.0, 6.0));
        // Materialised consumer-space position flips Z after scaling.
        assert_eq!(Marker::from_wire(wire).position, [2.0, 4.0, -6.0]);
    }

    #[test]
    fn retrieval_error_aborts_tick_and_keeps_partial_writes() {
        let settings = ClientSettings {
            capture_cameras: false,
            ..ClientSettings::default()
        };
        let mut client = connected(settings);
        let notifications = notification_counter(&mut client);

        client.driver_mut().push_markers(vec![marker(0, 1.0, 1.0, 1.0); 5]);
        client.driver_mut().push_marker_error(0x0022);
        client.poll();

        assert_eq!(client.state(), ConnectionState::Error);
        assert!(!client.running());
        // First batch is retained, not rolled back.
        assert_eq!(client.frames().marker_count(), 5);
        // The failing category aborts the tick: rigids were never fetched
        // and no notification fired.
        assert_eq!(client.driver().count_calls(|c| *c == Call::GetRigids), 0);
        assert_eq!(*notifications.borrow(), 0);
        assert!(!client.driver().session_live());
    }

    #[test]
    fn empty_tick_fires_no_notification() {
        let mut client = connected(ClientSettings::default());
        let notifications = notification_counter(&mut client);
        client.poll();
        client.poll();
        assert_eq!(*notifications.borrow(), 0);
    }

    #[test]
    fn one_notification_per_tick_across_categories() {
        let mut client = connected(ClientSettings::default());
        let notifications = notification_counter(&mut client);

        client.driver_mut().push_markers(vec![marker(0, 1.0, 1.0, 1.0)]);
        client.driver_mut().push_rigids(vec![WireRigid {
            id: 1,
            frame: 1,
            pose: WirePose {
                pz: 1.0,
                rw: 1.0,
                ..WirePose::default()
            },
            cond: 1.0,
            flag: 0,
        }]);
        client.poll();

        assert_eq!(*notifications.borrow(), 1);
        assert_eq!(client.frames().marker_count(), 1);
        assert_eq!(client.frames().rigid_count(), 1);
    }

    #[test]
    fn cameras_are_fetched_once_per_tick() {
        let settings = ClientSettings {
            capture_markers: false,
            capture_rigids: false,
            ..ClientSettings::default()
        };
        let mut client = connected(settings);
        client.driver_mut().push_cameras(vec![Default::default(); 2]);
        client.driver_mut().push_cameras(vec![Default::default(); 3]);

        client.poll();
        assert_eq!(client.driver().count_calls(|c| *c == Call::GetCameras), 1);
        assert_eq!(client.frames().camera_count(), 2);

        // The second scripted batch is served on the next tick.
        client.poll();
        assert_eq!(client.frames().camera_count(), 3);
    }

    #[test]
    fn shutdown_from_connected_releases_session() {
        let mut client = connected(ClientSettings::default());
        client.on_shutdown();
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(!client.running());
        assert!(!client.driver().session_live());
    }

    #[test]
    fn shutdown_from_error_skips_live_teardown() {
        let mut client = OwlClient::with_defaults(MockDriver::new().fail_init(-1));
        client.poll();
        let teardowns = client.driver().count_calls(|c| *c == Call::Shutdown);
        client.on_shutdown();
        // No session existed, so no further shutdown call was issued.
        assert_eq!(
            client.driver().count_calls(|c| *c == Call::Shutdown),
            teardowns
        );
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn on_start_adopts_persisted_address() {
        let mut config = ConfigStore::new();
        config.set_property(ADDRESS_PROPERTY, "10.0.0.5");

        let mut client = OwlClient::with_defaults(MockDriver::new());
        client.on_attach(&mut config);
        client.on_start(&mut config);
        client.poll();

        assert!(client.driver().calls().contains(&Call::Init {
            address: "10.0.0.5".to_string(),
            flags: InitFlags::SLAVE.bits(),
        }));
    }

    #[test]
    fn on_attach_registers_default_address() {
        let mut config = ConfigStore::new();
        let client = OwlClient::with_defaults(MockDriver::new());
        client.on_attach(&mut config);
        assert_eq!(config.get_property(ADDRESS_PROPERTY, ""), "127.0.0.1");
    }
}
