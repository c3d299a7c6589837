use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use wearvote_types::events::{GatewayCommand, GatewayEvent};
use wearvote_types::models::UserId;

use crate::relay::MessageRelay;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// How long a fresh socket may take to send `identify`.
const IDENTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle a single WebSocket connection: `identify` handshake, then the
/// event loop until either side goes away.
pub async fn handle_connection(socket: WebSocket, relay: MessageRelay) {
    let (mut sender, mut receiver) = socket.split();

    let Some(user_id) = wait_for_identify(&mut receiver, IDENTIFY_TIMEOUT).await else {
        warn!("WebSocket client failed to identify, closing");
        return;
    };

    // Register before `ready` so nothing targeted at this user is lost.
    let dispatcher = relay.dispatcher().clone();
    let (conn_id, user_rx) = dispatcher.register_user_channel(user_id);
    let broadcast_rx = dispatcher.subscribe();
    info!(
        "User {} connected to gateway ({} online)",
        user_id,
        dispatcher.online_users().await.len()
    );

    if send_event(&mut sender, &GatewayEvent::Ready { user_id })
        .await
        .is_err()
    {
        dispatcher.unregister_user_channel(user_id, conn_id);
        return;
    }

    run_connection_loop(sender, receiver, relay, user_id, conn_id, user_rx, broadcast_rx).await;
}

async fn run_connection_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    relay: MessageRelay,
    user_id: UserId,
    conn_id: Uuid,
    mut user_rx: mpsc::UnboundedReceiver<GatewayEvent>,
    mut broadcast_rx: broadcast::Receiver<GatewayEvent>,
) {
    let dispatcher = relay.dispatcher().clone();

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward broadcasts + targeted events -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                result = broadcast_rx.recv() => {
                    let event = match result {
                        Ok(event) => event,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("Broadcast receiver lagged by {} events", n);
                            continue;
                        }
                        Err(_) => break,
                    };
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                result = user_rx.recv() => {
                    let Some(event) = result else { break };
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read commands from client
    let recv_relay = relay.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<GatewayCommand>(&text) {
                    Ok(cmd) => handle_command(&recv_relay, user_id, cmd).await,
                    Err(e) => {
                        warn!(
                            "User {} bad command: {} -- raw: {}",
                            user_id,
                            e,
                            text.chars().take(200).collect::<String>()
                        );
                    }
                },
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    dispatcher.unregister_user_channel(user_id, conn_id);
    info!("User {} disconnected from gateway", user_id);
}

async fn wait_for_identify<S>(receiver: &mut S, within: Duration) -> Option<UserId>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let identify = async {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Text(text) = msg {
                if let Ok(GatewayCommand::Identify { user_id }) =
                    serde_json::from_str::<GatewayCommand>(&text)
                {
                    return Some(user_id);
                }
            }
        }
        None
    };

    tokio::time::timeout(within, identify).await.ok().flatten()
}

async fn handle_command(relay: &MessageRelay, user_id: UserId, cmd: GatewayCommand) {
    match cmd {
        GatewayCommand::Identify { user_id: other } => {
            if other != user_id {
                warn!("User {} tried to re-identify as {}, ignoring", user_id, other);
            }
        }

        GatewayCommand::SendMessage { receiver_id, text } => {
            if text.trim().is_empty() {
                warn!("User {} sent an empty message to {}, ignoring", user_id, receiver_id);
                return;
            }
            match relay.send(user_id, receiver_id, text).await {
                Ok(message) => debug!("Message {} from {} to {}", message.id, user_id, receiver_id),
                Err(e) => warn!("Message from {} to {} failed: {}", user_id, receiver_id, e),
            }
        }

        GatewayCommand::Typing { receiver_id } => relay.typing(user_id, receiver_id).await,

        GatewayCommand::StopTyping { receiver_id } => relay.stop_typing(user_id, receiver_id).await,
    }
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &GatewayEvent,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to encode {} event: {}", event.name(), e);
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use wearvote_db::{Document, Store};
    use wearvote_types::models::User;

    use crate::dispatcher::Dispatcher;

    fn relay() -> (MessageRelay, Dispatcher, Arc<Store>) {
        let users = (1..=3)
            .map(|id| User {
                id,
                name: format!("user {id}"),
                avatar: String::new(),
                bio: String::new(),
                followers: 0,
            })
            .collect();
        let store = Arc::new(Store::in_memory(Document {
            users,
            ..Document::default()
        }));
        let dispatcher = Dispatcher::new();
        let relay = MessageRelay::new(store.clone(), dispatcher.clone(), None);
        (relay, dispatcher, store)
    }

    fn frame(json: &str) -> Result<Message, axum::Error> {
        Ok(Message::Text(json.into()))
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<GatewayEvent>) -> GatewayEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn identify_skips_noise_before_the_handshake() {
        let mut frames = stream::iter(vec![
            frame("not json"),
            frame(r#"{"type":"typing","data":{"receiverId":2}}"#),
            Ok(Message::Ping(Bytes::new())),
            frame(r#"{"type":"identify","data":{"userId":7}}"#),
        ]);
        assert_eq!(wait_for_identify(&mut frames, IDENTIFY_TIMEOUT).await, Some(7));
    }

    #[tokio::test]
    async fn closed_socket_never_identifies() {
        let mut frames = stream::iter(vec![frame(r#"{"type":"stop_typing","data":{"receiverId":2}}"#)]);
        assert_eq!(wait_for_identify(&mut frames, IDENTIFY_TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn silent_socket_times_out() {
        let mut frames = stream::pending::<Result<Message, axum::Error>>();
        let started = tokio::time::Instant::now();
        assert_eq!(wait_for_identify(&mut frames, Duration::from_millis(50)).await, None);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn send_message_goes_out_as_the_identified_user() {
        let (relay, dispatcher, store) = relay();
        let (_c2, mut rx2) = dispatcher.register_user_channel(2);
        let (_c3, mut rx3) = dispatcher.register_user_channel(3);

        let cmd: GatewayCommand = serde_json::from_str(
            r#"{"type":"send_message","data":{"receiverId":3,"text":"hey","senderId":1}}"#,
        )
        .unwrap();
        handle_command(&relay, 2, cmd).await;

        match next(&mut rx3).await {
            GatewayEvent::ReceiveMessage(m) => assert_eq!((m.sender_id, m.text.as_str()), (2, "hey")),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(next(&mut rx2).await, GatewayEvent::MessageSent(m) if m.sender_id == 2));
        assert_eq!(store.conversation(2, 3).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_message_is_dropped() {
        let (relay, dispatcher, store) = relay();
        let (_c2, mut rx2) = dispatcher.register_user_channel(2);
        let (_c3, mut rx3) = dispatcher.register_user_channel(3);

        let cmd = GatewayCommand::SendMessage {
            receiver_id: 3,
            text: "   ".into(),
        };
        handle_command(&relay, 2, cmd).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(store.snapshot().unwrap().messages.is_empty());
        assert!(rx2.try_recv().is_err());
        assert!(rx3.try_recv().is_err());
    }

    #[tokio::test]
    async fn reidentify_as_someone_else_is_ignored() {
        let (relay, dispatcher, store) = relay();
        let (_c2, mut rx2) = dispatcher.register_user_channel(2);
        let (_c3, mut rx3) = dispatcher.register_user_channel(3);

        handle_command(&relay, 2, GatewayCommand::Identify { user_id: 3 }).await;
        handle_command(&relay, 2, GatewayCommand::Typing { receiver_id: 3 }).await;

        assert!(matches!(next(&mut rx3).await, GatewayEvent::UserTyping { sender_id: 2 }));
        assert!(rx2.try_recv().is_err());
        assert!(store.snapshot().unwrap().messages.is_empty());
        assert_eq!(dispatcher.online_users().await, vec![2, 3]);
    }

    #[tokio::test]
    async fn typing_hints_carry_the_connection_user() {
        let (relay, dispatcher, _) = relay();
        let (_c1, mut rx1) = dispatcher.register_user_channel(1);

        let typing: GatewayCommand =
            serde_json::from_str(r#"{"type":"typing","data":{"receiverId":1,"senderId":3}}"#).unwrap();
        handle_command(&relay, 2, typing).await;
        handle_command(&relay, 2, GatewayCommand::StopTyping { receiver_id: 1 }).await;

        assert!(matches!(next(&mut rx1).await, GatewayEvent::UserTyping { sender_id: 2 }));
        assert!(matches!(next(&mut rx1).await, GatewayEvent::UserStopTyping { sender_id: 2 }));
    }
}
