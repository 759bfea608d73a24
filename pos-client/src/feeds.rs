//! Branch-scoped reads shared by the dashboard, inventory and shipment views.
//!
//! Each feed is a single fetch; `poller` repeats it on an interval.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::{Branch, InventoryItem, Product, Sale, SaleItem, Shipment, StockRequest};
use crate::scope::FetchScope;

const UNKNOWN_LABEL: &str = "N/A";

#[async_trait]
pub trait Feed: Send + Sync + 'static {
    type Output: Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    async fn fetch(&self, api: &ApiClient, token: &str, scope: &FetchScope) -> ClientResult<Self::Output>;
}

/// Inventory row joined with product and branch names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRow {
    pub inventory_id: String,
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub branch_id: String,
    pub branch_name: String,
    pub quantity: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockItem {
    pub branch_id: String,
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i64,
}

/// A sale with its branch name and product lines, as shown on report pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRow {
    pub sale_id: String,
    pub branch_id: String,
    pub branch_name: String,
    pub employee_id: Option<String>,
    pub total_amount: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<SaleLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleLine {
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i64,
    pub total_price: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryFeed;

#[async_trait]
impl Feed for InventoryFeed {
    type Output = Vec<InventoryRow>;

    fn name(&self) -> &'static str {
        "inventory"
    }

    async fn fetch(&self, api: &ApiClient, token: &str, scope: &FetchScope) -> ClientResult<Self::Output> {
        let (inventory, products, branches) = tokio::try_join!(
            api.list::<InventoryItem>(token, "/inventory", &[]),
            api.list::<Product>(token, "/products", &[]),
            api.list::<Branch>(token, "/branches", &[]),
        )?;
        Ok(join_inventory(inventory, &products, &branches, scope))
    }
}

/// Products running low in the scoped branch, or inventory rows running low
/// anywhere when the scope covers every branch.
#[derive(Debug, Clone, Copy)]
pub struct LowStockFeed {
    pub threshold: i64,
}

impl LowStockFeed {
    pub fn new(threshold: i64) -> Self {
        Self { threshold }
    }
}

#[async_trait]
impl Feed for LowStockFeed {
    type Output = Vec<LowStockItem>;

    fn name(&self) -> &'static str {
        "low_stock"
    }

    async fn fetch(&self, api: &ApiClient, token: &str, scope: &FetchScope) -> ClientResult<Self::Output> {
        let query: Vec<(&str, &str)> = scope
            .branch_id()
            .map(|branch| vec![("branchid", branch)])
            .unwrap_or_default();
        let (inventory, products) = tokio::try_join!(
            api.list::<InventoryItem>(token, "/inventory", &query),
            api.list::<Product>(token, "/products", &[]),
        )?;
        Ok(low_stock(&inventory, &products, scope, self.threshold))
    }
}

/// Pending inter-branch requests touching the scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingRequestsFeed;

#[async_trait]
impl Feed for PendingRequestsFeed {
    type Output = Vec<StockRequest>;

    fn name(&self) -> &'static str {
        "pending_requests"
    }

    async fn fetch(&self, api: &ApiClient, token: &str, scope: &FetchScope) -> ClientResult<Self::Output> {
        let requests = api.list::<StockRequest>(token, "/requests", &[]).await?;
        Ok(requests
            .into_iter()
            .filter(|request| {
                request.is_pending()
                    && (scope.includes(&request.from_branch_id)
                        || scope.includes(&request.to_branch_id))
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShipmentFeed;

#[async_trait]
impl Feed for ShipmentFeed {
    type Output = Vec<Shipment>;

    fn name(&self) -> &'static str {
        "shipments"
    }

    async fn fetch(&self, api: &ApiClient, token: &str, scope: &FetchScope) -> ClientResult<Self::Output> {
        match scope.branch_id() {
            Some(branch) => {
                api.list(token, "/shipments", &[("branchid", branch)])
                    .await
            }
            None => api.list(token, "/shipments", &[]).await,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BranchesFeed;

#[async_trait]
impl Feed for BranchesFeed {
    type Output = Vec<Branch>;

    fn name(&self) -> &'static str {
        "branches"
    }

    async fn fetch(&self, api: &ApiClient, token: &str, _scope: &FetchScope) -> ClientResult<Self::Output> {
        api.list(token, "/branches", &[]).await
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SalesReportFeed;

#[async_trait]
impl Feed for SalesReportFeed {
    type Output = Vec<SaleRow>;

    fn name(&self) -> &'static str {
        "sales"
    }

    async fn fetch(&self, api: &ApiClient, token: &str, scope: &FetchScope) -> ClientResult<Self::Output> {
        let (sales, items, products, branches) = tokio::try_join!(
            api.list::<Sale>(token, "/sales", &[]),
            api.list::<SaleItem>(token, "/saleitems", &[]),
            api.list::<Product>(token, "/products", &[]),
            api.list::<Branch>(token, "/branches", &[]),
        )?;
        Ok(join_sales(sales, items, &products, &branches, scope))
    }
}

pub fn join_inventory(
    inventory: Vec<InventoryItem>,
    products: &[Product],
    branches: &[Branch],
    scope: &FetchScope,
) -> Vec<InventoryRow> {
    let products: HashMap<&str, &Product> = products
        .iter()
        .map(|product| (product.product_id.as_str(), product))
        .collect();
    let branches: HashMap<&str, &Branch> = branches
        .iter()
        .map(|branch| (branch.branch_id.as_str(), branch))
        .collect();

    let mut rows: Vec<InventoryRow> = inventory
        .into_iter()
        .filter(|item| scope.includes(&item.branch_id))
        .map(|item| {
            let product = products.get(item.product_id.as_str());
            let branch = branches.get(item.branch_id.as_str());
            InventoryRow {
                product_code: product
                    .map(|p| p.product_code.clone())
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                product_name: product
                    .map(|p| p.product_name.clone())
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                branch_name: branch
                    .map(|b| b.name.clone())
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                inventory_id: item.inventory_id,
                product_id: item.product_id,
                branch_id: item.branch_id,
                quantity: item.quantity,
                updated_at: item.updated_at,
            }
        })
        .collect();

    // Newest first; rows without a timestamp sink to the bottom.
    rows.sort_by_key(|row| Reverse(row.updated_at));
    rows
}

pub fn low_stock(
    inventory: &[InventoryItem],
    products: &[Product],
    scope: &FetchScope,
    threshold: i64,
) -> Vec<LowStockItem> {
    match scope {
        FetchScope::Branch(branch_id) => products
            .iter()
            .filter_map(|product| {
                let quantity = inventory
                    .iter()
                    .find(|item| item.branch_id == *branch_id && item.product_id == product.product_id)
                    .map(|item| item.quantity)
                    .unwrap_or(0);
                (quantity < threshold).then(|| LowStockItem {
                    branch_id: branch_id.clone(),
                    product_id: product.product_id.clone(),
                    product_code: product.product_code.clone(),
                    product_name: product.product_name.clone(),
                    quantity,
                })
            })
            .collect(),
        FetchScope::AllBranches => {
            let products: HashMap<&str, &Product> = products
                .iter()
                .map(|product| (product.product_id.as_str(), product))
                .collect();
            inventory
                .iter()
                .filter(|item| item.quantity < threshold)
                .map(|item| {
                    let product = products.get(item.product_id.as_str());
                    LowStockItem {
                        branch_id: item.branch_id.clone(),
                        product_id: item.product_id.clone(),
                        product_code: product
                            .map(|p| p.product_code.clone())
                            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                        product_name: product
                            .map(|p| p.product_name.clone())
                            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                        quantity: item.quantity,
                    }
                })
                .collect()
        }
    }
}

pub fn join_sales(
    sales: Vec<Sale>,
    items: Vec<SaleItem>,
    products: &[Product],
    branches: &[Branch],
    scope: &FetchScope,
) -> Vec<SaleRow> {
    let products: HashMap<&str, &Product> = products
        .iter()
        .map(|product| (product.product_id.as_str(), product))
        .collect();
    let branches: HashMap<&str, &Branch> = branches
        .iter()
        .map(|branch| (branch.branch_id.as_str(), branch))
        .collect();

    let mut lines: HashMap<String, Vec<SaleLine>> = HashMap::new();
    for item in items {
        let product = products.get(item.product_id.as_str());
        lines.entry(item.sale_id).or_default().push(SaleLine {
            product_code: product
                .map(|p| p.product_code.clone())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            product_name: product
                .map(|p| p.product_name.clone())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            product_id: item.product_id,
            quantity: item.quantity,
            total_price: item.total_price,
        });
    }

    let mut rows: Vec<SaleRow> = sales
        .into_iter()
        .filter(|sale| scope.includes(&sale.branch_id))
        .map(|sale| SaleRow {
            branch_name: branches
                .get(sale.branch_id.as_str())
                .map(|b| b.name.clone())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            items: lines.remove(&sale.sale_id).unwrap_or_default(),
            sale_id: sale.sale_id,
            branch_id: sale.branch_id,
            employee_id: sale.employee_id,
            total_amount: sale.total_amount,
            created_at: sale.created_at,
        })
        .collect();

    rows.sort_by_key(|row| Reverse(row.created_at));
    rows
}
