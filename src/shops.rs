//! Shops available to the signed-in account and the selector-modal search.

use serde::{Deserialize, Serialize};

/// One ship-to location. `cached_cart_items` is attached client-side when
/// the list is fetched and mirrored into the session cart on selection; its
/// contents are opaque to this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(rename = "shipto")]
    pub ship_to: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, rename = "cachedCartItems")]
    pub cached_cart_items: Vec<serde_json::Value>,
}

/// Selector-modal search: case-insensitive substring over name and address.
/// The currently selected shop is always listed first, even when it does not
/// match the term, so the selection never disappears from the modal.
#[must_use]
pub fn search_shops(shops: &[Shop], term: &str, selected_ship_to: Option<&str>) -> Vec<Shop> {
    let term = term.trim().to_lowercase();

    let mut matches: Vec<Shop> = shops
        .iter()
        .filter(|shop| {
            term.is_empty()
                || shop.name.to_lowercase().contains(&term)
                || shop.address.to_lowercase().contains(&term)
        })
        .cloned()
        .collect();

    if let Some(selected) = selected_ship_to {
        if let Some(pos) = matches.iter().position(|s| s.ship_to == selected) {
            let shop = matches.remove(pos);
            matches.insert(0, shop);
        } else if let Some(shop) = shops.iter().find(|s| s.ship_to == selected) {
            matches.insert(0, shop.clone());
        }
    }

    matches
}
