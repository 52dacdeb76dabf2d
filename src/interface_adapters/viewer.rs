// Headless map viewer: consumes the pushed event stream and keeps a reconciled marker list.

use crate::domain::Clock;
use crate::interface_adapters::protocol::decode_event;
use crate::use_cases::reconciler::{ClientReconciler, Marker, ReconcilerSettings};

use futures_util::StreamExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Notify, watch};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until, timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

type ViewerSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingConnect = Pin<Box<dyn Future<Output = Option<ViewerSocket>> + Send>>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub url: String,
    pub reconnect_delay: Duration,
    pub player_sweep_every: Duration,
    pub building_sweep_every: Duration,
    pub reconciler: ReconcilerSettings,
}

/// Event consumption and both sweeps run in one task, so they never interleave.
pub struct MapViewer {
    settings: ViewerSettings,
    reconciler: ClientReconciler,
    clock: Arc<dyn Clock>,
    markers_tx: watch::Sender<Vec<Marker>>,
}

impl MapViewer {
    pub fn new(settings: ViewerSettings, clock: Arc<dyn Clock>) -> Self {
        let reconciler = ClientReconciler::new(settings.reconciler.clone());
        let (markers_tx, _) = watch::channel(Vec::new());
        Self {
            settings,
            reconciler,
            clock,
            markers_tx,
        }
    }

    pub fn reconciler(&self) -> &ClientReconciler {
        &self.reconciler
    }

    /// Latest marker list, republished after every change.
    pub fn subscribe_markers(&self) -> watch::Receiver<Vec<Marker>> {
        self.markers_tx.subscribe()
    }

    /// Applies one text frame. Undecodable frames are skipped.
    pub fn handle_frame(&mut self, text: &str) -> bool {
        let event = match decode_event(text) {
            Ok(event) => event,
            Err(error) => {
                debug!(%error, "ignoring undecodable frame");
                return false;
            }
        };

        let kind = event.kind();
        let changed = self.reconciler.apply(event, self.clock.now_millis());
        debug!(kind, changed, "event applied");
        if changed {
            self.publish_markers();
        }
        changed
    }

    pub fn sweep_players(&mut self) -> usize {
        let removed = self.reconciler.sweep_players(self.clock.now_millis());
        if removed > 0 {
            debug!(removed, "evicted silent players");
            self.publish_markers();
        }
        removed
    }

    pub fn sweep_buildings(&mut self) -> usize {
        let removed = self.reconciler.sweep_buildings(self.clock.now_millis());
        if removed > 0 {
            debug!(removed, "evicted repaired buildings");
            self.publish_markers();
        }
        removed
    }

    /// Runs until `shutdown` is notified, reconnecting whenever the stream drops. State and
    /// sweeps survive disconnects. Returns the viewer so callers can inspect the final state.
    pub async fn run(mut self, shutdown: Arc<Notify>) -> Self {
        let mut player_sweep = interval(self.settings.player_sweep_every);
        player_sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut building_sweep = interval(self.settings.building_sweep_every);
        building_sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut socket: Option<ViewerSocket> = None;
        // Polled as its own branch so a stalled handshake never holds up the sweeps.
        let mut connecting: Option<PendingConnect> = None;
        let mut reconnect_at = Instant::now();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.notified() => break,
                _ = player_sweep.tick() => {
                    self.sweep_players();
                }
                _ = building_sweep.tick() => {
                    self.sweep_buildings();
                }
                _ = sleep_until(reconnect_at), if socket.is_none() && connecting.is_none() => {
                    connecting = Some(Box::pin(connect(self.settings.url.clone())));
                }
                connected = finish_connect(&mut connecting), if connecting.is_some() => {
                    connecting = None;
                    socket = connected;
                    if socket.is_none() {
                        reconnect_at = Instant::now() + self.settings.reconnect_delay;
                    }
                }
                frame = next_frame(&mut socket), if socket.is_some() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_frame(&text);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            warn!(url = %self.settings.url, "stream closed; reconnecting");
                            socket = None;
                            reconnect_at = Instant::now() + self.settings.reconnect_delay;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(error)) => {
                            warn!(
                                url = %self.settings.url,
                                %error,
                                "stream read error; reconnecting"
                            );
                            socket = None;
                            reconnect_at = Instant::now() + self.settings.reconnect_delay;
                        }
                    }
                }
            }
        }

        if let Some(mut socket) = socket {
            let _ = socket.close(None).await;
        }
        info!("viewer stopped");
        self
    }

    fn publish_markers(&self) {
        let markers = self.reconciler.markers();
        let players = self.reconciler.players().len();
        info!(
            players,
            clusters = self.reconciler.clusters().len(),
            buildings = self.reconciler.building_count(),
            "map updated"
        );
        for marker in &markers {
            debug!(%marker, "marker");
        }
        self.markers_tx.send_replace(markers);
    }
}

async fn connect(url: String) -> Option<ViewerSocket> {
    match timeout(CONNECT_TIMEOUT, connect_async(url.as_str())).await {
        Ok(Ok((socket, _response))) => {
            info!(%url, "connected to map server");
            Some(socket)
        }
        Ok(Err(error)) => {
            warn!(%url, %error, "failed to connect to map server");
            None
        }
        Err(_) => {
            warn!(%url, "timed out connecting to map server");
            None
        }
    }
}

async fn finish_connect(pending: &mut Option<PendingConnect>) -> Option<ViewerSocket> {
    match pending {
        Some(connect) => connect.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn next_frame(
    socket: &mut Option<ViewerSocket>,
) -> Option<Result<Message, tokio_tungstenite::tungstenite::Error>> {
    match socket {
        Some(socket) => socket.next().await,
        None => std::future::pending().await,
    }
}
