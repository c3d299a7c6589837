use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

use wearvote_db::Store;
use wearvote_db::lifecycle::now_millis;
use wearvote_types::events::GatewayEvent;
use wearvote_types::models::{Message, UserId};

use crate::dispatcher::Dispatcher;

/// A reply a simulated counterpart will send after `delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedReply {
    pub delay: Duration,
    pub text: String,
}

/// Decides whether a delivered message gets an automatic answer from its
/// receiver.
pub trait Counterpart: Send + Sync {
    fn reply_to(&self, message: &Message) -> Option<ScriptedReply>;
}

const REPLY_PHRASES: &[&str] = &[
    "Haha, totally agree!",
    "Where did you get that jacket?",
    "Just saw your latest post, love it",
    "Let me think about it and get back to you.",
    "That color really works on you.",
    "Are you going out this weekend?",
    "Send me the link!",
    "Honestly I'd go with the first one.",
    "Ok, talk later!",
    "No way, really?",
];

/// Answers every message sent *by* the primary demo user, after a random
/// delay, with a canned phrase.
pub struct ScriptedCounterpart {
    primary_user: UserId,
    phrases: Vec<String>,
    delay_ms: RangeInclusive<u64>,
}

impl ScriptedCounterpart {
    pub fn new(primary_user: UserId) -> Self {
        Self {
            primary_user,
            phrases: REPLY_PHRASES.iter().map(|p| p.to_string()).collect(),
            delay_ms: 2_000..=7_000,
        }
    }

    pub fn with_delay(mut self, delay: RangeInclusive<Duration>) -> Self {
        self.delay_ms = delay.start().as_millis() as u64..=delay.end().as_millis() as u64;
        self
    }
}

impl Counterpart for ScriptedCounterpart {
    fn reply_to(&self, message: &Message) -> Option<ScriptedReply> {
        if message.sender_id != self.primary_user || message.receiver_id == self.primary_user {
            return None;
        }

        let mut rng = rand::rng();
        let text = self.phrases.choose(&mut rng)?.clone();
        let delay = Duration::from_millis(rng.random_range(self.delay_ms.clone()));
        Some(ScriptedReply { delay, text })
    }
}

/// Direct-message delivery: persist, push to whoever is online, and hand the
/// message to the counterpart strategy if one is installed.
#[derive(Clone)]
pub struct MessageRelay {
    inner: Arc<RelayInner>,
}

struct RelayInner {
    store: Arc<Store>,
    dispatcher: Dispatcher,
    counterpart: Option<Arc<dyn Counterpart>>,
}

impl MessageRelay {
    pub fn new(
        store: Arc<Store>,
        dispatcher: Dispatcher,
        counterpart: Option<Arc<dyn Counterpart>>,
    ) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                store,
                dispatcher,
                counterpart,
            }),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// User-initiated send. The receiver gets `receive_message` if online;
    /// the sender always gets `message_sent`.
    pub async fn send(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        text: String,
    ) -> anyhow::Result<Message> {
        let message = self.persist(sender_id, receiver_id, text).await?;
        self.dispatch(&message).await;

        if let Some(counterpart) = &self.inner.counterpart {
            if let Some(reply) = counterpart.reply_to(&message) {
                self.schedule_reply(&message, reply);
            }
        }

        Ok(message)
    }

    pub async fn typing(&self, sender_id: UserId, receiver_id: UserId) {
        self.inner
            .dispatcher
            .send_to_user(receiver_id, GatewayEvent::UserTyping { sender_id })
            .await;
    }

    pub async fn stop_typing(&self, sender_id: UserId, receiver_id: UserId) {
        self.inner
            .dispatcher
            .send_to_user(receiver_id, GatewayEvent::UserStopTyping { sender_id })
            .await;
    }

    /// Push an already-stored message to its receiver. Returns whether the
    /// receiver was online.
    pub async fn deliver(&self, message: &Message) -> bool {
        self.inner
            .dispatcher
            .send_to_user(message.receiver_id, GatewayEvent::ReceiveMessage(message.clone()))
            .await
    }

    async fn dispatch(&self, message: &Message) {
        let online = self.deliver(message).await;
        if !online {
            debug!(
                "User {} offline, message {} kept for history",
                message.receiver_id, message.id
            );
        }
        self.inner
            .dispatcher
            .send_to_user(message.sender_id, GatewayEvent::MessageSent(message.clone()))
            .await;
    }

    async fn persist(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        text: String,
    ) -> anyhow::Result<Message> {
        let store = self.inner.store.clone();
        let message = tokio::task::spawn_blocking(move || {
            store.insert_message(sender_id, receiver_id, &text, now_millis())
        })
        .await
        .context("spawn_blocking join error")??;
        Ok(message)
    }

    /// The reply is sent from the original receiver back to the original
    /// sender and never triggers another reply.
    fn schedule_reply(&self, original: &Message, reply: ScriptedReply) {
        let relay = self.clone();
        let from = original.receiver_id;
        let to = original.sender_id;

        debug!("Scheduling reply from {} to {} in {:?}", from, to, reply.delay);
        tokio::spawn(async move {
            tokio::time::sleep(reply.delay).await;
            match relay.persist(from, to, reply.text).await {
                Ok(message) => {
                    relay.dispatch(&message).await;
                    info!("Simulated reply {} from {} to {}", message.id, from, to);
                }
                Err(e) => warn!("Simulated reply from {} to {} failed: {}", from, to, e),
            }
        });
    }
}
