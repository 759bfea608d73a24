//! Fixed-interval polling tied to the lifetime of a handle.
//!
//! Dropping a [`PollHandle`] aborts its task, so a view that goes away takes
//! its polling loops with it.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::feeds::Feed;
use crate::scope::FetchScope;
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FeedState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            FeedState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub interval: Duration,
    pub view_all: bool,
}

impl PollOptions {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            view_all: false,
        }
    }

    pub fn view_all(mut self, view_all: bool) -> Self {
        self.view_all = view_all;
        self
    }
}

pub struct PollHandle<T> {
    name: &'static str,
    state: watch::Receiver<FeedState<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone> PollHandle<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> FeedState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<T>> {
        self.state.clone()
    }

    /// Wait for the next published state.
    pub async fn changed(&mut self) -> FeedState<T> {
        if self.state.changed().await.is_err() {
            debug!(feed = self.name, "poll loop ended");
        }
        self.state.borrow_and_update().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a polling loop for `feed`. The first fetch happens immediately.
pub fn spawn_feed<F: Feed>(
    feed: F,
    api: ApiClient,
    session: SessionContext,
    options: PollOptions,
) -> PollHandle<F::Output> {
    let name = feed.name();
    let (tx, rx) = watch::channel(FeedState::Loading);
    let task = tokio::spawn(run_feed(feed, api, session, options, tx));
    PollHandle {
        name,
        state: rx,
        task,
    }
}

async fn run_feed<F: Feed>(
    feed: F,
    api: ApiClient,
    session: SessionContext,
    options: PollOptions,
    tx: watch::Sender<FeedState<F::Output>>,
) {
    let name = feed.name();
    let metrics = session.metrics().clone();
    let mut ticker = interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut loaded = false;

    loop {
        ticker.tick().await;
        match poll_once(&feed, &api, &session, options.view_all).await {
            Ok(output) => {
                metrics.record_poll(name, "ok");
                loaded = true;
                tx.send_replace(FeedState::Ready(output));
            }
            Err(err) if err.ends_session() => {
                let outcome = if matches!(err, ClientError::Unauthorized) {
                    "unauthorized"
                } else {
                    "session_ended"
                };
                metrics.record_poll(name, outcome);
                warn!(feed = name, error = %err, "session ended; logging out");
                session.logout();
                tx.send_replace(FeedState::Failed(err.to_string()));
                break;
            }
            Err(err) if !loaded => {
                metrics.record_poll(name, "error");
                error!(feed = name, error = %err, "initial load failed");
                tx.send_replace(FeedState::Failed(err.to_string()));
            }
            Err(err) => {
                metrics.record_poll(name, "error");
                warn!(feed = name, error = %err, "poll failed; keeping previous data");
            }
        }
    }
}

async fn poll_once<F: Feed>(
    feed: &F,
    api: &ApiClient,
    session: &SessionContext,
    view_all: bool,
) -> ClientResult<F::Output> {
    session.sync_from_store();
    let snapshot = session.snapshot();
    let token = snapshot.token.as_deref().ok_or(ClientError::NoSession)?;
    let claims = snapshot.decoded().map_err(|err| ClientError::Auth(err.clone()))?;
    let scope = FetchScope::for_claims(claims, view_all)?;
    feed.fetch(api, token, &scope).await
}
