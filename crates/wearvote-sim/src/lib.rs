//! Synthetic activity that keeps the demo feed, inbox and notification list
//! moving, plus the hourly cleanup.

pub mod cleanup;
pub mod content;
pub mod interactions;
pub mod pools;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use wearvote_db::Store;
use wearvote_db::lifecycle::now_millis;
use wearvote_gateway::MessageRelay;
use wearvote_types::events::GatewayEvent;
use wearvote_types::models::UserId;

pub use cleanup::run_cleanup_loop;

/// Periods and batch sizes for the background jobs.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub startup_delay: Duration,
    pub post_interval: Duration,
    pub post_batch: usize,
    pub interaction_interval: Duration,
    pub interaction_batch: usize,
    pub message_interval: Duration,
    pub message_batch: usize,
    pub cleanup_interval: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(2),
            post_interval: Duration::from_secs(600),
            post_batch: 4,
            interaction_interval: Duration::from_secs(360),
            interaction_batch: 3,
            message_interval: Duration::from_secs(900),
            message_batch: 2,
            cleanup_interval: Duration::from_secs(3600),
        }
    }
}

/// One pass of each job, against a shared store. Live events go out through
/// the relay's dispatcher.
#[derive(Clone)]
pub struct Simulation {
    store: Arc<Store>,
    relay: MessageRelay,
    primary_user: UserId,
}

impl Simulation {
    pub fn new(store: Arc<Store>, relay: MessageRelay, primary_user: UserId) -> Self {
        Self {
            store,
            relay,
            primary_user,
        }
    }

    /// Insert a batch of posts and tell every client there is something new.
    pub async fn generate_posts(&self, count: usize) -> anyhow::Result<usize> {
        let report = self
            .blocking(move |store| {
                store.with_doc_mut(|doc| {
                    Ok(content::generate_posts(doc, &mut rand::rng(), count, now_millis()))
                })
            })
            .await?;

        if report.posts > 0 {
            info!(
                "Generated {} posts with {} comments",
                report.posts, report.comments
            );
            self.relay
                .dispatcher()
                .broadcast(GatewayEvent::NewPostsAvailable {
                    count: report.posts,
                });
        } else {
            debug!("Post generator skipped: no users");
        }
        Ok(report.posts)
    }

    pub async fn seed_comments(&self) -> anyhow::Result<usize> {
        let added = self
            .blocking(|store| {
                store.with_doc_mut(|doc| {
                    Ok(content::seed_comments(doc, &mut rand::rng(), now_millis()))
                })
            })
            .await?;
        if added > 0 {
            info!("Seeded {} comments on active posts", added);
        }
        Ok(added)
    }

    /// Likes and comments on the primary user's posts; each notification is
    /// pushed live when the user is online.
    pub async fn generate_interactions(&self, count: usize) -> anyhow::Result<usize> {
        let target = self.primary_user;
        let created = self
            .blocking(move |store| {
                store.with_doc_mut(|doc| {
                    Ok(interactions::generate_interactions(
                        doc,
                        &mut rand::rng(),
                        target,
                        count,
                        now_millis(),
                    ))
                })
            })
            .await?;

        let total = created.len();
        for view in created {
            self.relay
                .dispatcher()
                .send_to_user(target, GatewayEvent::NewNotification(view))
                .await;
        }
        if total > 0 {
            info!("Generated {} interactions for user {}", total, target);
        }
        Ok(total)
    }

    /// Inbound messages to the primary user. Delivered like a normal send but
    /// without a simulated reply.
    pub async fn generate_messages(&self, max: usize) -> anyhow::Result<usize> {
        let target = self.primary_user;
        let sent = self
            .blocking(move |store| {
                store.with_doc_mut(|doc| {
                    Ok(interactions::generate_inbound_messages(
                        doc,
                        &mut rand::rng(),
                        target,
                        max,
                        now_millis(),
                    ))
                })
            })
            .await?;

        for message in &sent {
            self.relay.deliver(message).await;
        }
        if !sent.is_empty() {
            info!("Generated {} inbound messages for user {}", sent.len(), target);
        }
        Ok(sent.len())
    }

    async fn blocking<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> wearvote_db::Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        let out = tokio::task::spawn_blocking(move || f(&store))
            .await
            .context("spawn_blocking join error")??;
        Ok(out)
    }
}

/// Spawn every background job. The post generator and comment seeding run
/// once after `startup_delay`; the other generators wait a full period before
/// their first run.
pub fn spawn_jobs(sim: Simulation, schedule: Schedule) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(4);
    let store = sim.store.clone();

    let posts = sim.clone();
    let (delay, every, batch) = (
        schedule.startup_delay,
        schedule.post_interval,
        schedule.post_batch,
    );
    handles.push(tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        log_failure("post generator", posts.generate_posts(batch).await);
        log_failure("comment seeding", posts.seed_comments().await);

        let mut interval = tokio::time::interval_at(Instant::now() + every, every);
        loop {
            interval.tick().await;
            log_failure("post generator", posts.generate_posts(batch).await);
        }
    }));

    let interactions = sim.clone();
    let (every, batch) = (schedule.interaction_interval, schedule.interaction_batch);
    handles.push(tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + every, every);
        loop {
            interval.tick().await;
            log_failure(
                "interaction generator",
                interactions.generate_interactions(batch).await,
            );
        }
    }));

    let messages = sim;
    let (every, batch) = (schedule.message_interval, schedule.message_batch);
    handles.push(tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + every, every);
        loop {
            interval.tick().await;
            log_failure("message generator", messages.generate_messages(batch).await);
        }
    }));

    handles.push(tokio::spawn(run_cleanup_loop(store, schedule.cleanup_interval)));

    handles
}

fn log_failure<T>(job: &str, result: anyhow::Result<T>) {
    if let Err(e) = result {
        warn!("{} failed: {:#}", job, e);
    }
}
