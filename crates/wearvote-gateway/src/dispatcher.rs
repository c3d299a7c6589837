use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, trace};
use uuid::Uuid;

use wearvote_types::events::GatewayEvent;
use wearvote_types::models::UserId;

type UserSender = mpsc::UnboundedSender<GatewayEvent>;

/// Requests handled by the registry task, which alone owns the
/// user -> connection table.
enum RegistryCommand {
    Register {
        user_id: UserId,
        conn_id: Uuid,
        tx: UserSender,
    },
    Unregister {
        user_id: UserId,
        conn_id: Uuid,
    },
    SendTo {
        user_id: UserId,
        event: GatewayEvent,
        delivered: oneshot::Sender<bool>,
    },
    OnlineUsers {
        reply: oneshot::Sender<Vec<UserId>>,
    },
}

/// Tracks connected clients and routes events to them.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Every connected client receives these
    broadcast_tx: broadcast::Sender<GatewayEvent>,

    /// Handle to the registry task
    registry_tx: mpsc::UnboundedSender<RegistryCommand>,
}

impl Dispatcher {
    /// Spawns the registry task; must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        let (registry_tx, registry_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_registry(registry_rx));

        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                registry_tx,
            }),
        }
    }

    /// Subscribe to gateway events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected clients.
    pub fn broadcast(&self, event: GatewayEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }

    /// Register a per-user targeted channel. A later registration for the
    /// same user replaces this one. Returns (conn_id, receiver).
    pub fn register_user_channel(
        &self,
        user_id: UserId,
    ) -> (Uuid, mpsc::UnboundedReceiver<GatewayEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.command(RegistryCommand::Register {
            user_id,
            conn_id,
            tx,
        });
        (conn_id, rx)
    }

    /// Unregister a per-user targeted channel, but only if conn_id matches.
    pub fn unregister_user_channel(&self, user_id: UserId, conn_id: Uuid) {
        self.command(RegistryCommand::Unregister { user_id, conn_id });
    }

    /// Send a targeted event to a specific user. Returns false when the user
    /// has no open connection; nothing is queued.
    pub async fn send_to_user(&self, user_id: UserId, event: GatewayEvent) -> bool {
        let (delivered, rx) = oneshot::channel();
        self.command(RegistryCommand::SendTo {
            user_id,
            event,
            delivered,
        });
        rx.await.unwrap_or(false)
    }

    /// Users with an open connection, ascending.
    pub async fn online_users(&self) -> Vec<UserId> {
        let (reply, rx) = oneshot::channel();
        self.command(RegistryCommand::OnlineUsers { reply });
        rx.await.unwrap_or_default()
    }

    fn command(&self, cmd: RegistryCommand) {
        // Only fails once the registry task is gone, i.e. during shutdown.
        let _ = self.inner.registry_tx.send(cmd);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_registry(mut rx: mpsc::UnboundedReceiver<RegistryCommand>) {
    let mut sessions: HashMap<UserId, (Uuid, UserSender)> = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            RegistryCommand::Register {
                user_id,
                conn_id,
                tx,
            } => {
                if sessions.insert(user_id, (conn_id, tx)).is_some() {
                    debug!("User {} reconnected, replacing previous session", user_id);
                }
            }

            RegistryCommand::Unregister { user_id, conn_id } => {
                if sessions.get(&user_id).is_some_and(|(cid, _)| *cid == conn_id) {
                    sessions.remove(&user_id);
                }
            }

            RegistryCommand::SendTo {
                user_id,
                event,
                delivered,
            } => {
                let name = event.name();
                let ok = match sessions.get(&user_id) {
                    Some((_, tx)) => tx.send(event).is_ok(),
                    None => false,
                };
                if !ok {
                    // Receiver dropped without unregistering
                    if sessions.get(&user_id).is_some_and(|(_, tx)| tx.is_closed()) {
                        sessions.remove(&user_id);
                    }
                }
                trace!("{} -> user {} (delivered: {})", name, user_id, ok);
                let _ = delivered.send(ok);
            }

            RegistryCommand::OnlineUsers { reply } => {
                let mut users: Vec<UserId> = sessions
                    .iter()
                    .filter(|(_, (_, tx))| !tx.is_closed())
                    .map(|(id, _)| *id)
                    .collect();
                users.sort_unstable();
                let _ = reply.send(users);
            }
        }
    }
}
