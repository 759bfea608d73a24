//! Feeds mounted for each page.

use crate::app::ClientState;
use crate::feeds::{
    BranchesFeed, InventoryFeed, InventoryRow, LowStockFeed, LowStockItem, PendingRequestsFeed,
    SaleRow, SalesReportFeed, ShipmentFeed,
};
use crate::models::{Branch, Shipment, StockRequest};
use crate::poller::{spawn_feed, PollHandle, PollOptions};
use crate::routes::Route;

/// Polling loops owned by one mounted page. Dropping it unmounts the page.
pub struct MountedView {
    pub route: Route,
    pub inventory: Option<PollHandle<Vec<InventoryRow>>>,
    pub low_stock: Option<PollHandle<Vec<LowStockItem>>>,
    pub pending_requests: Option<PollHandle<Vec<StockRequest>>>,
    pub shipments: Option<PollHandle<Vec<Shipment>>>,
    pub branches: Option<PollHandle<Vec<Branch>>>,
    pub sales: Option<PollHandle<Vec<SaleRow>>>,
}

impl MountedView {
    fn empty(route: Route) -> Self {
        Self {
            route,
            inventory: None,
            low_stock: None,
            pending_requests: None,
            shipments: None,
            branches: None,
            sales: None,
        }
    }

    pub fn feed_names(&self) -> Vec<&'static str> {
        [
            self.inventory.as_ref().map(PollHandle::name),
            self.low_stock.as_ref().map(PollHandle::name),
            self.pending_requests.as_ref().map(PollHandle::name),
            self.shipments.as_ref().map(PollHandle::name),
            self.branches.as_ref().map(PollHandle::name),
            self.sales.as_ref().map(PollHandle::name),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Start the polling loops a page needs. Pages without live data mount empty.
pub fn mount(state: &ClientState, route: Route) -> MountedView {
    let config = &state.config;
    let regular = PollOptions::every(config.poll_interval).view_all(config.view_all_branches);
    let shipments = PollOptions::every(config.shipment_poll_interval);
    let session = state.session.clone();
    let api = state.api.clone();
    let low_stock = || {
        spawn_feed(
            LowStockFeed::new(config.low_stock_threshold),
            api.clone(),
            session.clone(),
            regular,
        )
    };

    let mut view = MountedView::empty(route);
    match route {
        Route::Dashboard => {
            view.low_stock = Some(low_stock());
            view.pending_requests = Some(spawn_feed(
                PendingRequestsFeed,
                api.clone(),
                session.clone(),
                regular,
            ));
            view.shipments = Some(spawn_feed(ShipmentFeed, api.clone(), session.clone(), shipments));
            view.sales = Some(spawn_feed(SalesReportFeed, api.clone(), session.clone(), regular));
        }
        Route::Reports => {
            view.sales = Some(spawn_feed(SalesReportFeed, api.clone(), session.clone(), regular));
        }
        Route::Inventory => {
            view.inventory = Some(spawn_feed(InventoryFeed, api.clone(), session.clone(), regular));
            view.low_stock = Some(low_stock());
            view.pending_requests = Some(spawn_feed(
                PendingRequestsFeed,
                api.clone(),
                session.clone(),
                regular,
            ));
            view.shipments = Some(spawn_feed(ShipmentFeed, api.clone(), session.clone(), shipments));
        }
        Route::Product => {
            view.inventory = Some(spawn_feed(InventoryFeed, api.clone(), session.clone(), regular));
        }
        Route::SelectBranch => {
            view.branches = Some(spawn_feed(
                BranchesFeed,
                api.clone(),
                session.clone(),
                PollOptions::every(config.poll_interval).view_all(true),
            ));
        }
        _ => {}
    }
    view
}
