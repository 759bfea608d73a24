//! Backend records as the REST API returns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// List endpoints wrap their results as `{"Data": [...]}`; an empty result may
/// come back as `null`.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(rename = "Data")]
    pub data: Option<Vec<T>>,
}

impl<T> DataEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

/// Create endpoints echo the stored record as `{"New": {...}}`.
#[derive(Debug, Deserialize)]
pub struct CreatedEnvelope<T> {
    #[serde(rename = "New")]
    pub new: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(rename = "branchid")]
    pub branch_id: String,
    #[serde(rename = "bname", default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "productid")]
    pub product_id: String,
    #[serde(rename = "productcode", default)]
    pub product_code: String,
    #[serde(rename = "productname", default)]
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "unitsperbox", default)]
    pub units_per_box: i64,
    #[serde(rename = "categoryid", default)]
    pub category_id: Option<String>,
    #[serde(rename = "imageurl", default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "inventoryid")]
    pub inventory_id: String,
    #[serde(rename = "productid")]
    pub product_id: String,
    #[serde(rename = "branchid")]
    pub branch_id: String,
    pub quantity: i64,
    #[serde(rename = "updatedat", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Inter-branch stock request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRequest {
    #[serde(rename = "requestid")]
    pub request_id: String,
    #[serde(rename = "frombranchid")]
    pub from_branch_id: String,
    #[serde(rename = "tobranchid")]
    pub to_branch_id: String,
    #[serde(rename = "productid")]
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "createdat", default)]
    pub created_at: Option<DateTime<Utc>>,
}

pub const REQUEST_PENDING: &str = "pending";
pub const REQUEST_COMPLETE: &str = "complete";

impl StockRequest {
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case(REQUEST_PENDING)
    }
}

/// Body of `POST /requests`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewStockRequest {
    #[serde(rename = "frombranchid")]
    pub from_branch_id: String,
    #[serde(rename = "tobranchid")]
    pub to_branch_id: String,
    #[serde(rename = "productid")]
    pub product_id: String,
    pub quantity: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(rename = "shipmentid")]
    pub shipment_id: String,
    #[serde(rename = "requestid", default)]
    pub request_id: Option<String>,
    #[serde(rename = "frombranchid")]
    pub from_branch_id: String,
    #[serde(rename = "tobranchid")]
    pub to_branch_id: String,
    #[serde(rename = "productid")]
    pub product_id: String,
    pub quantity: i64,
    #[serde(rename = "unitsperbox", default)]
    pub units_per_box: i64,
    #[serde(rename = "createdat", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(rename = "saleid")]
    pub sale_id: String,
    #[serde(rename = "employeeid", default)]
    pub employee_id: Option<String>,
    #[serde(rename = "branchid")]
    pub branch_id: String,
    #[serde(rename = "totalamount")]
    pub total_amount: f64,
    #[serde(rename = "createdat", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One product line of a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    #[serde(rename = "saleitemid")]
    pub sale_item_id: String,
    #[serde(rename = "saleid")]
    pub sale_id: String,
    #[serde(rename = "productid")]
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "totalprice", default)]
    pub total_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_data_is_an_empty_list() {
        let envelope: DataEnvelope<Branch> =
            serde_json::from_value(json!({"Data": null})).expect("envelope");
        assert!(envelope.into_items().is_empty());
    }

    #[test]
    fn inventory_timestamps_accept_offsets() {
        let item: InventoryItem = serde_json::from_value(json!({
            "inventoryid": "I1",
            "productid": "P1",
            "branchid": "B1",
            "quantity": 4,
            "updatedat": "2025-01-02T10:00:00+07:00"
        }))
        .expect("inventory");
        assert_eq!(
            item.updated_at.map(|at| at.to_rfc3339()),
            Some("2025-01-02T03:00:00+00:00".to_string())
        );
    }

    #[test]
    fn request_status_is_case_insensitive() {
        let request: StockRequest = serde_json::from_value(json!({
            "requestid": "R1",
            "frombranchid": "B1",
            "tobranchid": "B2",
            "productid": "P1",
            "quantity": 3,
            "status": "Pending"
        }))
        .expect("request");
        assert!(request.is_pending());
    }

    #[test]
    fn new_request_uses_backend_field_names() {
        let body = serde_json::to_value(NewStockRequest {
            from_branch_id: "B2".into(),
            to_branch_id: "B1".into(),
            product_id: "P1".into(),
            quantity: 6,
            status: REQUEST_PENDING.into(),
        })
        .expect("body");
        assert_eq!(
            body,
            json!({
                "frombranchid": "B2",
                "tobranchid": "B1",
                "productid": "P1",
                "quantity": 6,
                "status": "pending"
            })
        );
    }
}
