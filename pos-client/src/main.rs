use anyhow::{bail, Context};
use pos_client::config::load_client_config;
use pos_client::poller::{FeedState, PollHandle};
use pos_client::views::MountedView;
use pos_client::{auth_flow, ClientState, Route};
use tokio::signal;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_client_config()?;
    let state = ClientState::from_config(config).context("Failed to build client state")?;
    info!(api_url = state.api.base_url(), "starting pos-client");

    if let Some((email, password)) = state.config.credentials() {
        auth_flow::login(&state.api, &state.router, email, password)
            .await
            .context("Login failed")?;
    }

    let navigation = state.router.visit(&state.config.start_route);
    let Some(route) = navigation.landed_on() else {
        bail!("no route for '{}'", state.config.start_route);
    };
    if route == Route::Login {
        warn!("no usable session; set POS_EMAIL and POS_PASSWORD to log in");
        return Ok(());
    }

    let mut view = state.mount(route);
    info!(route = route.path(), feeds = ?view.feed_names(), "view mounted");

    let mut location = state.session.navigator().subscribe();
    let mut ticker = interval(state.config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("interrupted; shutting down");
                break;
            }
            changed = location.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *location.borrow_and_update();
                if current == Route::Login {
                    warn!("session ended; log in again to continue");
                    break;
                }
                if current != view.route {
                    view = state.mount(current);
                    info!(route = current.path(), feeds = ?view.feed_names(), "view remounted");
                }
            }
            _ = ticker.tick() => report(&view),
        }
    }

    drop(view);
    Ok(())
}

fn report(view: &MountedView) {
    log_feed(view.inventory.as_ref());
    log_feed(view.low_stock.as_ref());
    log_feed(view.pending_requests.as_ref());
    log_feed(view.shipments.as_ref());
    log_feed(view.branches.as_ref());
    log_feed(view.sales.as_ref());
}

fn log_feed<T: Clone>(handle: Option<&PollHandle<Vec<T>>>) {
    let Some(handle) = handle else {
        return;
    };
    match handle.state() {
        FeedState::Loading => info!(feed = handle.name(), "loading"),
        FeedState::Ready(items) => info!(feed = handle.name(), items = items.len(), "feed ready"),
        FeedState::Failed(error) => warn!(feed = handle.name(), %error, "feed unavailable"),
    }
}
