//! Order line items plus the pure grouping, search and formatting helpers
//! applied to them. Everything here is side-effect free; the update loop and
//! view builders in `lib.rs` are the only consumers.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Item uid used by the remote API to address an entire (location, shipper)
/// group in a cancellation request.
pub const GROUP_CANCEL_UID: i64 = -1;

/// One line item as returned by the active-orders, returns and history
/// endpoints. The API backfills absent fields with empty strings, so every
/// field defaults rather than failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    #[serde(default, rename = "locationNumber")]
    pub location_number: String,
    #[serde(default, rename = "shipperNumber")]
    pub shipper_number: String,
    #[serde(default, rename = "itemUIDNumber")]
    pub item_uid_number: i64,
    #[serde(default, rename = "partDescription")]
    pub part_description: String,
    #[serde(default, rename = "shipQuantity")]
    pub ship_quantity: String,
    #[serde(default, rename = "unitPrice")]
    pub unit_price: String,
    #[serde(default, rename = "totalPrice")]
    pub total_price: String,
    #[serde(default, rename = "orderStatusCode")]
    pub order_status_code: String,
    #[serde(default, rename = "customerPONumber")]
    pub customer_po_number: String,
    #[serde(default, rename = "lineItemPoNumber")]
    pub line_item_po_number: String,
    #[serde(default, rename = "callerName")]
    pub caller_name: String,
    #[serde(default, rename = "departureDateTime")]
    pub departure_date_time: String,
    #[serde(default, rename = "orderType")]
    pub order_type: String,
    #[serde(default, rename = "customerItemPONumber")]
    pub customer_item_po_number: String,
    #[serde(default, rename = "purchaseLocationNumber")]
    pub purchase_location_number: String,
    #[serde(default, rename = "purchaseShipperNumber")]
    pub purchase_shipper_number: String,
    #[serde(default, rename = "sellingPrice")]
    pub selling_price: String,
    #[serde(default, rename = "orderDate")]
    pub order_date: String,
    #[serde(default, rename = "returnedQuantity")]
    pub returned_quantity: String,
}

impl OrderLineItem {
    /// Grouping identity. Items sharing this key belong to one order.
    #[must_use]
    pub fn group_key(&self) -> String {
        format!("{}-{}", self.location_number, self.shipper_number)
    }

    /// Open line items are the only ones the API accepts cancellations for.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.order_status_code == "OPN"
    }
}

/// A flat item list regrouped under its (location, shipper) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderGroup {
    pub location_number: String,
    pub shipper_number: String,
    /// First-seen customer PO for the group; later items never overwrite it.
    pub customer_po_number: String,
    pub items: Vec<OrderLineItem>,
}

impl OrderGroup {
    /// Group-level cancellation is offered only while every item is open.
    #[must_use]
    pub fn all_items_open(&self) -> bool {
        self.items.iter().all(OrderLineItem::is_open)
    }
}

/// Groups items by (location, shipper), preserving the order in which each
/// key first appears and the input order of items within a group.
#[must_use]
pub fn group_by_location_and_shipper(items: &[OrderLineItem]) -> Vec<OrderGroup> {
    let mut groups: Vec<OrderGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = item.group_key();
        match index.get(&key) {
            Some(&i) => groups[i].items.push(item.clone()),
            None => {
                index.insert(key, groups.len());
                groups.push(OrderGroup {
                    location_number: item.location_number.clone(),
                    shipper_number: item.shipper_number.clone(),
                    customer_po_number: item.customer_po_number.clone(),
                    items: vec![item.clone()],
                });
            }
        }
    }

    groups
}

/// Searchable fields of a line item. Field lists are fixed per entity kind
/// at the call site, never user-configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchField {
    LocationNumber,
    ShipperNumber,
    CustomerPoNumber,
    PartDescription,
    ShipQuantity,
    TotalPrice,
    UnitPrice,
    SellingPrice,
    DepartureDateTime,
    OrderDate,
    CallerName,
    LineItemPoNumber,
    OrderType,
    CustomerItemPoNumber,
    PurchaseLocationNumber,
    PurchaseShipperNumber,
    ReturnedQuantity,
}

impl SearchField {
    #[must_use]
    pub fn value_of<'a>(self, item: &'a OrderLineItem) -> &'a str {
        match self {
            Self::LocationNumber => &item.location_number,
            Self::ShipperNumber => &item.shipper_number,
            Self::CustomerPoNumber => &item.customer_po_number,
            Self::PartDescription => &item.part_description,
            Self::ShipQuantity => &item.ship_quantity,
            Self::TotalPrice => &item.total_price,
            Self::UnitPrice => &item.unit_price,
            Self::SellingPrice => &item.selling_price,
            Self::DepartureDateTime => &item.departure_date_time,
            Self::OrderDate => &item.order_date,
            Self::CallerName => &item.caller_name,
            Self::LineItemPoNumber => &item.line_item_po_number,
            Self::OrderType => &item.order_type,
            Self::CustomerItemPoNumber => &item.customer_item_po_number,
            Self::PurchaseLocationNumber => &item.purchase_location_number,
            Self::PurchaseShipperNumber => &item.purchase_shipper_number,
            Self::ReturnedQuantity => &item.returned_quantity,
        }
    }
}

pub const ACTIVE_ORDER_SEARCH_FIELDS: &[SearchField] = &[
    SearchField::LocationNumber,
    SearchField::ShipperNumber,
    SearchField::CustomerPoNumber,
    SearchField::PartDescription,
    SearchField::ShipQuantity,
    SearchField::TotalPrice,
    SearchField::UnitPrice,
    SearchField::DepartureDateTime,
    SearchField::CallerName,
    SearchField::LineItemPoNumber,
];

pub const ACTIVE_RETURN_SEARCH_FIELDS: &[SearchField] = &[
    SearchField::LocationNumber,
    SearchField::ShipperNumber,
    SearchField::CustomerPoNumber,
    SearchField::PartDescription,
    SearchField::ShipQuantity,
    SearchField::OrderType,
    SearchField::CustomerItemPoNumber,
    SearchField::PurchaseLocationNumber,
    SearchField::PurchaseShipperNumber,
    SearchField::CallerName,
];

pub const ORDER_HISTORY_SEARCH_FIELDS: &[SearchField] = &[
    SearchField::LocationNumber,
    SearchField::ShipperNumber,
    SearchField::CustomerPoNumber,
    SearchField::PartDescription,
    SearchField::ShipQuantity,
    SearchField::SellingPrice,
    SearchField::OrderDate,
    SearchField::UnitPrice,
    SearchField::ReturnedQuantity,
];

/// Case-insensitive substring search across a fixed field list. An empty or
/// whitespace-only term is the identity; otherwise an item matches when the
/// term appears in at least one listed field.
#[must_use]
pub fn search_items(
    items: &[OrderLineItem],
    term: &str,
    fields: &[SearchField],
) -> Vec<OrderLineItem> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| {
            fields
                .iter()
                .any(|f| f.value_of(item).to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

/// Renders a stored price string as `$x.yy`. Empty input stays empty and
/// non-numeric input is echoed back, matching how the screens show pricing.
#[must_use]
pub fn format_price(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match trimmed.parse::<f64>() {
        Ok(amount) => format!("${amount:.2}"),
        Err(_) => value.to_string(),
    }
}

/// Formats an ISO-ish `YYYY-MM-DDTHH:MM:SS` timestamp as
/// `dd-MMM-yyyy hh:mm:ss AM/PM`. Unparseable input is returned unchanged so
/// the screens always have something to show.
#[must_use]
pub fn format_departure(raw: &str) -> String {
    match parse_departure(raw) {
        Some(formatted) => formatted,
        None => raw.to_string(),
    }
}

fn parse_departure(raw: &str) -> Option<String> {
    // Accept a space separator and a trailing Z; seconds may carry a
    // fractional part.
    let normalized = raw.trim().trim_end_matches('Z').replace(' ', "T");
    let parsed = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Some(parsed.format("%d-%b-%Y %I:%M:%S %p").to_string())
}

/// `YYYY-MM-DD` for a UTC epoch-milliseconds instant.
#[must_use]
pub fn date_string_from_epoch_ms(epoch_ms: u64) -> String {
    let instant = i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(DateTime::UNIX_EPOCH);
    instant.format("%Y-%m-%d").to_string()
}

pub const DEFAULT_HISTORY_RANGE_DAYS: u64 = 30;

/// Search form for the order-history endpoint. Doubles as the request body
/// for both the plain date-range lookup and the criteria search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderHistorySearchParams {
    #[serde(rename = "partNumber", skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(rename = "shipperNumber", skip_serializing_if = "Option::is_none")]
    pub shipper_number: Option<String>,
    #[serde(rename = "purchasePO", skip_serializing_if = "Option::is_none")]
    pub purchase_po: Option<String>,
    #[serde(rename = "linePO", skip_serializing_if = "Option::is_none")]
    pub line_po: Option<String>,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl OrderHistorySearchParams {
    /// Default lookup window: the 30 days ending today.
    #[must_use]
    pub fn default_range(now_ms: u64) -> Self {
        let start_ms = now_ms.saturating_sub(DEFAULT_HISTORY_RANGE_DAYS * 86_400_000);
        Self {
            start_date: Some(date_string_from_epoch_ms(start_ms)),
            end_date: Some(date_string_from_epoch_ms(now_ms)),
            ..Self::default()
        }
    }

    /// A search may only be submitted once at least one field is non-empty.
    #[must_use]
    pub fn has_criteria(&self) -> bool {
        [
            &self.part_number,
            &self.shipper_number,
            &self.purchase_po,
            &self.line_po,
            &self.start_date,
            &self.end_date,
        ]
        .into_iter()
        .any(|f| f.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}
