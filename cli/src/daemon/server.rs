use std::collections::HashMap;
use std::fs;
use std::time::{Duration, Instant};

use droplet_protocol::{DaemonRequest, DaemonResponse, DaemonStatus, TabEvent};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{runtime_dir, LogLevel, TrackingConfig, UserConfig};
use crate::daemon::socket_path;
use crate::data::{
    KeyValueStore, StoreError, TabDirectory, UsageAccumulator, UsageLedger, UsageStore,
};

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Already running")]
    AlreadyRunning,

    #[error("Failed to daemonize: {0}")]
    Daemonize(String),
}

pub type Result<T> = std::result::Result<T, DaemonError>;

type ClientId = u64;

enum ClientMessage {
    Request { request: DaemonRequest },
    Disconnect,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

struct DaemonState<S> {
    accumulator: UsageAccumulator<S>,
    tabs: TabDirectory,
    start_time: Instant,
    tracking: TrackingConfig,
}

impl<S: KeyValueStore> DaemonState<S> {
    fn new(store: S, tracking: TrackingConfig, now_ms: i64) -> Result<Self> {
        let mut ledger = UsageLedger::new(store);
        if ledger.initialize(now_ms)? {
            info!("Seeded empty usage totals");
        }

        Ok(Self {
            accumulator: UsageAccumulator::new(ledger),
            tabs: TabDirectory::new(),
            start_time: Instant::now(),
            tracking,
        })
    }

    fn tick(&mut self, now_ms: i64) {
        if !self.tracking.enabled {
            return;
        }
        if let Err(e) = self.accumulator.on_periodic_tick(&self.tabs, now_ms) {
            error!(error = %e, "Error accruing active tab time");
        }
    }

    fn handle_tab_event(&mut self, event: &TabEvent, now_ms: i64) {
        if !self.tracking.enabled {
            debug!(tab_id = event.tab_id(), "Tracking disabled, ignoring tab event");
            return;
        }

        self.tabs.apply(event);

        match event {
            TabEvent::NavigationCompleted {
                tab_id,
                frame_id,
                url,
            } => {
                if let Err(e) =
                    self.accumulator
                        .on_navigation_completed(*tab_id, *frame_id, url, now_ms)
                {
                    error!(tab_id, error = %e, "Error recording visit");
                }
            }
            TabEvent::Activated { tab_id, .. } => {
                self.accumulator.on_tab_activated(*tab_id, &self.tabs, now_ms);
            }
            TabEvent::Updated { .. } => {}
            TabEvent::Removed { tab_id } => {
                self.accumulator.on_tab_removed(*tab_id);
            }
        }
    }

    fn get_status(&self) -> DaemonStatus {
        DaemonStatus {
            running: true,
            uptime_secs: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            tracked_tabs: self.accumulator.sessions().len(),
            tracking_enabled: self.tracking.enabled,
            database_size_bytes: self.accumulator.ledger().store().size_bytes(),
            ..DaemonStatus::default()
        }
    }

    fn handle_request(&mut self, request: &DaemonRequest, now_ms: i64) -> DaemonResponse {
        match request {
            DaemonRequest::GetStatus => DaemonResponse::Status(self.get_status()),
            DaemonRequest::GetData => match self.accumulator.get_data() {
                Ok(data) => DaemonResponse::Data(data),
                Err(e) => DaemonResponse::Error(e.to_string()),
            },
            DaemonRequest::ResetData => match self.accumulator.reset_all(now_ms) {
                Ok(()) => {
                    info!("Usage data reset");
                    DaemonResponse::Reset { success: true }
                }
                Err(e) => {
                    error!(error = %e, "Error resetting usage data");
                    DaemonResponse::Error(e.to_string())
                }
            },
            DaemonRequest::Tab(event) => {
                self.handle_tab_event(event, now_ms);
                DaemonResponse::Ok
            }
            DaemonRequest::RecordUsage { domain, duration } => {
                if !self.tracking.enabled {
                    debug!(domain = %domain, "Tracking disabled, ignoring usage report");
                    return DaemonResponse::Ok;
                }
                match self.accumulator.record_usage(domain, *duration) {
                    Ok(_) => DaemonResponse::Ok,
                    Err(e) => {
                        error!(domain = %domain, error = %e, "Error recording usage");
                        DaemonResponse::Error(e.to_string())
                    }
                }
            }
            DaemonRequest::Shutdown => DaemonResponse::Ok,
        }
    }
}

async fn client_reader_task(
    mut reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    msg_tx: mpsc::Sender<(ClientId, ClientMessage)>,
    client_id: ClientId,
) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                let _ = msg_tx.send((client_id, ClientMessage::Disconnect)).await;
                break;
            }
            Ok(_) => match DaemonRequest::from_json(line.trim()) {
                Ok(request) => {
                    if msg_tx
                        .send((client_id, ClientMessage::Request { request }))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    warn!(client_id, error = %e, "Invalid request from client");
                }
            },
            Err(e) => {
                debug!(client_id, error = %e, "Client read error");
                let _ = msg_tx.send((client_id, ClientMessage::Disconnect)).await;
                break;
            }
        }
    }
}

async fn client_writer_task(
    mut writer: tokio::net::unix::OwnedWriteHalf,
    mut response_rx: mpsc::Receiver<DaemonResponse>,
) {
    while let Some(response) = response_rx.recv().await {
        let json = match response.to_json() {
            Ok(j) => j,
            Err(_) => continue,
        };
        if writer
            .write_all(format!("{}\n", json).as_bytes())
            .await
            .is_err()
        {
            break;
        }
    }
}

pub fn run_daemon(
    foreground: bool,
    log_level: LogLevel,
    log_level_override: Option<LogLevel>,
) -> Result<()> {
    let socket = socket_path();

    if socket.exists() {
        if crate::daemon::is_daemon_running() {
            return Err(DaemonError::AlreadyRunning);
        }
        fs::remove_file(&socket)?;
    }

    fs::create_dir_all(runtime_dir())?;

    if !foreground {
        match daemonize::Daemonize::new()
            .working_directory(runtime_dir())
            .start()
        {
            Ok(_) => {}
            Err(e) => return Err(DaemonError::Daemonize(e.to_string())),
        }
        let _guard =
            crate::logging::init(log_level, crate::logging::LogMode::File, log_level_override);
        std::mem::forget(_guard);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Daemon starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run_daemon_async(socket))
}

async fn run_daemon_async(socket: std::path::PathBuf) -> Result<()> {
    let user_config = UserConfig::load();
    let store = UsageStore::open_configured(&user_config)?;
    info!(database = ?store.path(), "Opened usage store");

    let mut state = DaemonState::new(store, user_config.tracking.clone(), now_ms())?;

    let listener = UnixListener::bind(&socket)?;
    info!(socket = ?socket, "Listening for connections");

    let tick_interval = Duration::from_secs(user_config.tick_interval_secs());
    debug!(
        tick_interval_secs = tick_interval.as_secs(),
        tracking_enabled = state.tracking.enabled,
        "Starting event loop"
    );

    let mut tick = tokio::time::interval(tick_interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick completes immediately; nothing can have accrued yet.
    tick.tick().await;

    let (msg_tx, mut msg_rx) = mpsc::channel::<(ClientId, ClientMessage)>(256);
    let mut clients: HashMap<ClientId, mpsc::Sender<DaemonResponse>> = HashMap::new();
    let mut next_client_id: ClientId = 1;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                state.tick(now_ms());
            }
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let client_id = next_client_id;
                        next_client_id += 1;
                        debug!(client_id, "Client connected");

                        let (reader, writer) = stream.into_split();
                        let (response_tx, response_rx) = mpsc::channel::<DaemonResponse>(64);
                        clients.insert(client_id, response_tx);

                        tokio::task::spawn_local(client_reader_task(
                            BufReader::new(reader),
                            msg_tx.clone(),
                            client_id,
                        ));
                        tokio::task::spawn_local(client_writer_task(writer, response_rx));
                    }
                    Err(e) => {
                        error!(error = %e, "Socket accept error");
                    }
                }
            }
            Some((client_id, msg)) = msg_rx.recv() => {
                match msg {
                    ClientMessage::Disconnect => {
                        if clients.remove(&client_id).is_some() {
                            debug!(client_id, count = clients.len(), "Client disconnected");
                        }
                    }
                    ClientMessage::Request { request } => {
                        debug!(client_id, request = ?request, "Handling request");

                        let shutdown_requested = matches!(request, DaemonRequest::Shutdown);
                        if shutdown_requested {
                            info!("Shutdown requested by client");
                        }

                        let response = state.handle_request(&request, now_ms());
                        if let Some(client) = clients.get(&client_id) {
                            let _ = client.send(response).await;
                        }

                        if shutdown_requested {
                            break;
                        }
                    }
                }
            }
        }
    }

    info!("Daemon shutting down");
    fs::remove_file(&socket).ok();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::MemoryStore;

    const T0: i64 = 1_704_067_200_000;

    fn state(enabled: bool) -> DaemonState<MemoryStore> {
        let tracking = TrackingConfig {
            enabled,
            ..TrackingConfig::default()
        };
        DaemonState::new(MemoryStore::new(), tracking, T0).unwrap()
    }

    fn navigate(tab_id: i64, url: &str) -> DaemonRequest {
        DaemonRequest::Tab(TabEvent::NavigationCompleted {
            tab_id,
            frame_id: 0,
            url: url.to_string(),
        })
    }

    fn data(state: &mut DaemonState<MemoryStore>) -> droplet_protocol::UsageData {
        match state.handle_request(&DaemonRequest::GetData, T0) {
            DaemonResponse::Data(data) => data,
            other => panic!("Expected data, got {other:?}"),
        }
    }

    #[test]
    fn test_new_state_seeds_session_start() {
        let mut state = state(true);
        let data = data(&mut state);
        assert_eq!(data.session_start, T0);
        assert_eq!(data.total_energy, 0.0);
    }

    #[test]
    fn test_tab_events_accrue() {
        let mut state = state(true);
        assert_eq!(
            state.handle_request(&navigate(1, "https://www.youtube.com/"), T0),
            DaemonResponse::Ok
        );
        state.handle_request(
            &DaemonRequest::Tab(TabEvent::Activated { tab_id: 1, url: None }),
            T0,
        );
        state.tick(T0 + 60_000);

        let data = data(&mut state);
        let site = &data.site_data["youtube.com"];
        assert_eq!(site.visit_count, 1);
        assert_eq!(site.accumulated_units, 1.0);

        match state.handle_request(&DaemonRequest::GetStatus, T0) {
            DaemonResponse::Status(status) => {
                assert!(status.running);
                assert_eq!(status.tracked_tabs, 1);
                assert!(status.tracking_enabled);
            }
            other => panic!("Expected status, got {other:?}"),
        }
    }

    #[test]
    fn test_tracking_disabled_ignores_tab_events() {
        let mut state = state(false);
        state.handle_request(&navigate(1, "https://netflix.com/"), T0);
        state.tick(T0 + 120_000);

        assert!(data(&mut state).site_data.is_empty());
        assert_eq!(state.accumulator.sessions().len(), 0);
    }

    #[test]
    fn test_reset_data() {
        let mut state = state(true);
        state.handle_request(&navigate(1, "https://chatgpt.com/"), T0);

        let response = state.handle_request(&DaemonRequest::ResetData, T0 + 1_000);
        assert_eq!(response, DaemonResponse::Reset { success: true });

        let data = data(&mut state);
        assert!(data.site_data.is_empty());
        assert_eq!(data.session_start, T0 + 1_000);
    }

    #[test]
    fn test_record_usage_request() {
        let mut state = state(true);
        let request = DaemonRequest::RecordUsage {
            domain: "www.Gmail.com".to_string(),
            duration: 2.0,
        };
        assert_eq!(state.handle_request(&request, T0), DaemonResponse::Ok);
        assert_eq!(state.handle_request(&request, T0), DaemonResponse::Ok);

        let data = data(&mut state);
        let site = &data.site_data["gmail.com"];
        assert_eq!(site.visit_count, 2);
        assert!((data.total_energy - 0.0002).abs() < 1e-12);
        assert_eq!(state.accumulator.sessions().len(), 0);
    }

    #[test]
    fn test_record_usage_ignored_when_tracking_disabled() {
        let mut state = state(false);
        let request = DaemonRequest::RecordUsage {
            domain: "gmail.com".to_string(),
            duration: 1.0,
        };
        assert_eq!(state.handle_request(&request, T0), DaemonResponse::Ok);
        assert!(data(&mut state).site_data.is_empty());
    }

    #[test]
    fn test_record_usage_storage_failure_is_reported() {
        let mut state = state(true);
        state
            .accumulator
            .ledger_mut()
            .store_mut()
            .set_fail_writes(true);

        let request = DaemonRequest::RecordUsage {
            domain: "gmail.com".to_string(),
            duration: 1.0,
        };
        assert!(matches!(
            state.handle_request(&request, T0),
            DaemonResponse::Error(_)
        ));
    }

    #[test]
    fn test_storage_failure_is_reported_not_fatal() {
        let mut state = state(true);
        state
            .accumulator
            .ledger_mut()
            .store_mut()
            .set_fail_writes(true);

        assert_eq!(
            state.handle_request(&navigate(1, "https://reddit.com/"), T0),
            DaemonResponse::Ok
        );
        assert!(matches!(
            state.handle_request(&DaemonRequest::ResetData, T0),
            DaemonResponse::Error(_)
        ));

        state
            .accumulator
            .ledger_mut()
            .store_mut()
            .set_fail_writes(false);
        state.handle_request(&navigate(1, "https://reddit.com/"), T0);
        assert_eq!(data(&mut state).site_data["reddit.com"].visit_count, 1);
    }
}
