// lib.rs - Shared core for the auto-glass storefront client

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod api;
pub mod cache;
pub mod cancellations;
pub mod capabilities;
pub mod event;
pub mod orders;
pub mod part_search;
pub mod session;
pub mod shops;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api::SecurityQuestion;
use crate::cache::{CacheKind, OrderContext};
use crate::cancellations::CancellationLog;
use crate::orders::OrderHistorySearchParams;
use crate::part_search::{MakeModelYear, PartSearchContext};
use crate::session::Session;
use crate::shops::Shop;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Authentication,
    Authorization,
    Validation,
    NotFound,
    Conflict,
    RateLimited,
    Storage,
    Serialization,
    Schema,
    InvalidState,
    Internal,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Authentication => "AUTH_ERROR",
            Self::Authorization => "FORBIDDEN",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::RateLimited => "RATE_LIMITED",
            Self::Storage => "STORAGE_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Schema => "SCHEMA_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Internal => "INTERNAL_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Network | Self::Timeout | Self::Conflict | Self::RateLimited | Self::Storage => {
                ErrorSeverity::Transient
            }

            Self::Serialization | Self::Schema | Self::Internal | Self::InvalidState => {
                ErrorSeverity::Fatal
            }

            Self::Authentication
            | Self::Authorization
            | Self::Validation
            | Self::NotFound
            | Self::Unknown => ErrorSeverity::Permanent,
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimited | Self::Storage | Self::Conflict
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable() && !matches!(self.severity, ErrorSeverity::Fatal)
    }

    /// What the shell should show in the dismissible alert. Kinds whose
    /// message carries the server's own wording pass it through; the rest
    /// get a canned line.
    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::Authentication => {
                "Please check your credentials and try again.".into()
            }
            ErrorKind::Authorization => {
                "You don't have permission to perform this action.".into()
            }
            ErrorKind::Validation
            | ErrorKind::NotFound
            | ErrorKind::Conflict
            | ErrorKind::RateLimited
            | ErrorKind::Internal
            | ErrorKind::Unknown => self.message.clone(),
            ErrorKind::Storage => "Unable to save data on this device.".into(),
            ErrorKind::Serialization | ErrorKind::Schema => {
                "A data error occurred. Please try again or contact support.".into()
            }
            ErrorKind::InvalidState => {
                "The app is in an invalid state. Please restart the app.".into()
            }
        }
    }

    /// Maps a non-2xx response to an error, lifting the server's `error`
    /// field out of the body when it parses as JSON.
    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let kind = match status {
            400 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Authorization,
            404 => ErrorKind::NotFound,
            408 => ErrorKind::Timeout,
            409 => ErrorKind::Conflict,
            429 => ErrorKind::RateLimited,
            500..=599 => ErrorKind::Internal,
            _ => ErrorKind::Unknown,
        };

        let message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .and_then(|e| e.error)
            .unwrap_or_else(|| format!("API call failed: {status}"));

        Self::new(kind, message).with_context("http_status", status.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

pub type AppResult<T> = Result<T, AppError>;

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// Startup gate: resume of a persisted session has not resolved yet.
    /// Shells must not render authenticated content in this state.
    #[default]
    Loading,
    Unauthenticated,
    Authenticating,
    Ready,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms: get_current_time_ms(),
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

/// One live search box per list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerms {
    pub active_orders: String,
    pub active_returns: String,
    pub order_history: String,
}

impl SearchTerms {
    #[must_use]
    pub fn get(&self, kind: CacheKind) -> &str {
        match kind {
            CacheKind::ActiveOrders => &self.active_orders,
            CacheKind::ActiveReturns => &self.active_returns,
            CacheKind::OrderHistory => &self.order_history,
        }
    }

    pub fn set(&mut self, kind: CacheKind, term: String) {
        match kind {
            CacheKind::ActiveOrders => self.active_orders = term,
            CacheKind::ActiveReturns => self.active_returns = term,
            CacheKind::OrderHistory => self.order_history = term,
        }
    }
}

pub struct Model {
    pub state: AppState,
    pub api_base_url: String,
    pub session: Option<Session>,
    pub shops: Vec<Shop>,
    pub selected_shop: Option<Shop>,
    /// Session-visible mirror of the selected shop's cart.
    pub cart_items: Vec<serde_json::Value>,
    pub shop_search_term: String,
    pub orders: OrderContext,
    pub part_search: PartSearchContext,
    pub search_terms: SearchTerms,
    pub history_search: OrderHistorySearchParams,
    pub cancellations: CancellationLog,
    pub security_profile: Option<api::SecurityProfileResponse>,
    pub all_questions: Vec<SecurityQuestion>,
    pub profile_loading: bool,
    pub pending_email: Option<String>,
    pub active_error: Option<AppError>,
    pub active_toast: Option<ToastMessage>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            state: AppState::Loading,
            api_base_url: api::DEFAULT_API_BASE_URL.to_string(),
            session: None,
            shops: Vec::new(),
            selected_shop: None,
            cart_items: Vec::new(),
            shop_search_term: String::new(),
            orders: OrderContext::new(),
            part_search: PartSearchContext::new(),
            search_terms: SearchTerms::default(),
            history_search: OrderHistorySearchParams::default(),
            cancellations: CancellationLog::new(),
            security_profile: None,
            all_questions: Vec::new(),
            profile_loading: false,
            pending_email: None,
            active_error: None,
            active_toast: None,
        }
    }
}

impl Model {
    pub fn set_error(&mut self, error: AppError) {
        tracing::warn!(code = error.code(), message = %error, "surfacing error");
        self.active_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn selected_ship_to(&self) -> Option<&str> {
        self.selected_shop.as_ref().map(|s| s.ship_to.as_str())
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopListItem {
    pub ship_to: String,
    pub name: String,
    pub address: String,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedShopView {
    pub ship_to: String,
    pub name: String,
    pub cart_item_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemView {
    pub item_uid_number: i64,
    pub part_description: String,
    pub ship_quantity: String,
    /// Status as displayed: "CAN" when the cancellation log covers the
    /// item, otherwise the item's own status code.
    pub status_code: String,
    pub is_cancelled: bool,
    pub can_cancel: bool,
    pub unit_price_display: String,
    pub total_price_display: String,
    pub selling_price_display: String,
    pub departure_display: String,
    pub order_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderGroupView {
    pub location_number: String,
    pub shipper_number: String,
    pub customer_po_number: String,
    pub can_cancel_group: bool,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSection {
    pub loading: bool,
    pub loaded: bool,
    pub item_count: usize,
    pub groups: Vec<OrderGroupView>,
}

/// Vehicle the part-search screens are scoped to, with the last complete
/// combination offered for restoration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartSearchView {
    pub current: MakeModelYear,
    pub last: MakeModelYear,
    pub vin: String,
    pub last_vin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityView {
    pub loading: bool,
    pub email: Option<String>,
    pub questions: Vec<SecurityQuestion>,
    pub all_questions: Vec<SecurityQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorView {
    pub message: String,
    pub code: String,
    pub is_retryable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub state: AppState,
    pub is_authenticated: bool,
    /// True once signed in until a shop is chosen; drives the selector modal.
    pub needs_shop_selection: bool,
    pub shop_selector: Vec<ShopListItem>,
    pub selected_shop: Option<SelectedShopView>,
    pub active_orders: OrderSection,
    pub active_returns: OrderSection,
    pub order_history: OrderSection,
    pub history_search_enabled: bool,
    pub part_search: PartSearchView,
    pub security: SecurityView,
    pub error: Option<ErrorView>,
    pub toast: Option<ToastMessage>,
}

pub mod app {
    use super::*;
    use crate::cancellations::CancelledItemRecord;
    use crate::orders::{
        self, GROUP_CANCEL_UID, ACTIVE_ORDER_SEARCH_FIELDS, ACTIVE_RETURN_SEARCH_FIELDS,
        ORDER_HISTORY_SEARCH_FIELDS, OrderLineItem, SearchField,
    };
    use crate::session::storage_keys;
    use crate::validation::{self, ValidationError};
    use secrecy::ExposeSecret;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct App;

    impl App {
        fn search_fields(kind: CacheKind) -> &'static [SearchField] {
            match kind {
                CacheKind::ActiveOrders => ACTIVE_ORDER_SEARCH_FIELDS,
                CacheKind::ActiveReturns => ACTIVE_RETURN_SEARCH_FIELDS,
                CacheKind::OrderHistory => ORDER_HISTORY_SEARCH_FIELDS,
            }
        }

        fn bearer_token(model: &Model) -> AppResult<String> {
            model
                .bearer_token()
                .map(|t| format!("Bearer {t}"))
                .ok_or_else(|| {
                    AppError::new(ErrorKind::Authentication, "No authentication token found")
                })
        }

        fn json_body<T: serde::Serialize>(value: &T) -> AppResult<Vec<u8>> {
            serde_json::to_vec(value).map_err(|e| {
                AppError::new(ErrorKind::Serialization, "Could not encode the request")
                    .with_internal(e.to_string())
            })
        }

        fn persist_value(caps: &Capabilities, key: &'static str, value: String) {
            caps.secure_store.set(key, value, move |result| Event::StoreWriteCompleted {
                key: key.to_string(),
                result,
            });
        }

        fn delete_value(caps: &Capabilities, key: &'static str) {
            caps.secure_store.delete(key, move |result| Event::StoreWriteCompleted {
                key: key.to_string(),
                result,
            });
        }

        fn persist_shops(model: &Model, caps: &Capabilities) {
            match serde_json::to_string(&model.shops) {
                Ok(json) => Self::persist_value(caps, storage_keys::SHOPS, json),
                Err(e) => tracing::warn!(error = %e, "failed to encode shop list for storage"),
            }
        }

        fn persist_cancellations(model: &Model, caps: &Capabilities) {
            match serde_json::to_string(&model.cancellations) {
                Ok(json) => Self::persist_value(caps, storage_keys::CANCELLED_ORDERS, json),
                Err(e) => tracing::warn!(error = %e, "failed to encode cancellation log"),
            }
        }

        fn send_login(
            model: &Model,
            caps: &Capabilities,
            username: &str,
            password: &str,
        ) -> AppResult<()> {
            let url = api::login_url(&model.api_base_url)?;
            let body = Self::json_body(&api::LoginRequest { username, password })?;

            caps.http
                .post(url)
                .header("Content-Type", "application/json")
                .body(body)
                .send(|result| Event::LoginResponse(Box::new(api::into_api_result(result))));
            Ok(())
        }

        fn send_shops_request(model: &Model, caps: &Capabilities) -> AppResult<()> {
            let token = Self::bearer_token(model)?;
            let username = model
                .session
                .as_ref()
                .map(|s| s.username.clone())
                .unwrap_or_default();
            let url = api::shops_url(&model.api_base_url, &username)?;

            caps.http
                .get(url)
                .header("Content-Type", "application/json")
                .header("Authorization", token.as_str())
                .send(|result| Event::ShopsResponse(Box::new(api::into_api_result(result))));
            Ok(())
        }

        fn send_orders_request(
            model: &Model,
            caps: &Capabilities,
            kind: CacheKind,
            generation: u64,
        ) -> AppResult<()> {
            let token = Self::bearer_token(model)?;
            let ship_to = model.selected_ship_to().ok_or_else(|| {
                AppError::new(ErrorKind::InvalidState, "No shop is selected")
            })?;

            let request_id = Uuid::new_v4();
            tracing::debug!(
                %request_id,
                kind = kind.as_str(),
                generation,
                ship_to,
                "issuing order fetch"
            );

            match kind {
                CacheKind::ActiveOrders | CacheKind::ActiveReturns => {
                    let url = if kind == CacheKind::ActiveOrders {
                        api::active_orders_url(&model.api_base_url, ship_to)?
                    } else {
                        api::returns_url(&model.api_base_url, ship_to)?
                    };
                    caps.http
                        .get(url)
                        .header("Content-Type", "application/json")
                        .header("Authorization", token.as_str())
                        .send(move |result| Event::OrdersResponse {
                            kind,
                            generation,
                            result: Box::new(api::into_api_result(result)),
                        });
                }
                CacheKind::OrderHistory => {
                    let url = api::history_url(&model.api_base_url, ship_to)?;
                    let body = Self::json_body(&model.history_search)?;
                    caps.http
                        .post(url)
                        .header("Content-Type", "application/json")
                        .header("Authorization", token.as_str())
                        .body(body)
                        .send(move |result| Event::OrdersResponse {
                            kind,
                            generation,
                            result: Box::new(api::into_api_result(result)),
                        });
                }
            }
            Ok(())
        }

        /// Begins a load for the kind, rolling the slot back if the request
        /// could not even be issued.
        fn request_orders(model: &mut Model, caps: &Capabilities, kind: CacheKind) {
            let generation = model.orders.slot_mut(kind).begin_load();
            if let Err(e) = Self::send_orders_request(model, caps, kind, generation) {
                model.orders.slot_mut(kind).fail(generation);
                model.set_error(e);
            }
        }

        fn send_cancel_request(
            model: &Model,
            caps: &Capabilities,
            record: CancelledItemRecord,
            arg_part_no: serde_json::Value,
        ) -> AppResult<()> {
            let token = Self::bearer_token(model)?;
            let url = api::cancel_order_url(&model.api_base_url)?;
            let body = Self::json_body(&api::CancelOrderRequest {
                loc_no: record.location_number.clone(),
                shipper_no: record.shipper_number.clone(),
                item_uid_no: record.item_uid_number,
                arg_part_no,
            })?;

            caps.http
                .post(url)
                .header("Content-Type", "application/json")
                .header("Authorization", token.as_str())
                .body(body)
                .send(move |result| Event::CancelResponse {
                    record: record.clone(),
                    result: Box::new(api::into_api_result(result)),
                });
            Ok(())
        }

        fn send_security_get(
            model: &Model,
            caps: &Capabilities,
            url: String,
            make_event: fn(Box<api::ApiResult>) -> Event,
        ) -> AppResult<()> {
            let token = Self::bearer_token(model)?;
            caps.http
                .get(url)
                .header("Content-Type", "application/json")
                .header("Authorization", token.as_str())
                .send(move |result| make_event(Box::new(api::into_api_result(result))));
            Ok(())
        }

        fn send_security_put<T: serde::Serialize>(
            model: &Model,
            caps: &Capabilities,
            url: String,
            request: &T,
            make_event: fn(Box<api::ApiResult>) -> Event,
        ) -> AppResult<()> {
            let token = Self::bearer_token(model)?;
            let body = Self::json_body(request)?;
            caps.http
                .put(url)
                .header("Content-Type", "application/json")
                .header("Authorization", token.as_str())
                .body(body)
                .send(move |result| make_event(Box::new(api::into_api_result(result))));
            Ok(())
        }

        fn username(model: &Model) -> String {
            model
                .session
                .as_ref()
                .map(|s| s.username.clone())
                .unwrap_or_default()
        }

        /// Applies a selection that is known to exist in the shop list:
        /// mirrors the cart and runs the cache invalidation gate.
        fn apply_shop_selection(model: &mut Model, shop: Shop) {
            let ship_to = shop.ship_to.clone();
            model.cart_items = shop.cached_cart_items.clone();
            model.selected_shop = Some(shop);

            let cleared = model.orders.check_and_clear(&ship_to);
            if cleared {
                // The vehicle being searched belongs to the shop's customer.
                model.part_search.clear_all();
                tracing::info!(ship_to, "shop changed; order and vehicle context cleared");
            }
        }

        fn handle_orders_outcome(
            model: &mut Model,
            kind: CacheKind,
            generation: u64,
            result: api::ApiResult,
        ) {
            let outcome: AppResult<Vec<OrderLineItem>> = result.and_then(|resp| match kind {
                CacheKind::ActiveOrders => {
                    resp.decode::<api::ActiveOrdersResponse>().map(|r| r.orders)
                }
                CacheKind::ActiveReturns => {
                    resp.decode::<api::ActiveReturnsResponse>().map(|r| r.returns)
                }
                CacheKind::OrderHistory => {
                    resp.decode::<api::OrderHistoryResponse>().map(|r| r.history)
                }
            });

            let slot = model.orders.slot_mut(kind);
            match outcome {
                Ok(items) => {
                    if slot.complete(generation, items) {
                        tracing::debug!(kind = kind.as_str(), generation, "cache filled");
                    } else {
                        tracing::debug!(
                            kind = kind.as_str(),
                            generation,
                            current = slot.generation,
                            "dropping stale order response"
                        );
                    }
                }
                Err(e) => {
                    if slot.fail(generation) {
                        model.set_error(e);
                    } else {
                        tracing::debug!(kind = kind.as_str(), generation, "dropping stale failure");
                    }
                }
            }
        }

        fn build_shop_selector(model: &Model) -> Vec<ShopListItem> {
            let selected = model.selected_ship_to();
            crate::shops::search_shops(&model.shops, &model.shop_search_term, selected)
                .into_iter()
                .map(|shop| ShopListItem {
                    is_selected: selected == Some(shop.ship_to.as_str()),
                    ship_to: shop.ship_to,
                    name: shop.name,
                    address: shop.address,
                })
                .collect()
        }

        fn build_order_section(model: &Model, kind: CacheKind) -> OrderSection {
            let slot = model.orders.slot(kind);
            let ship_to = model.selected_ship_to().unwrap_or_default();

            let filtered = orders::search_items(
                &slot.items,
                model.search_terms.get(kind),
                Self::search_fields(kind),
            );

            let groups = orders::group_by_location_and_shipper(&filtered)
                .into_iter()
                .map(|group| {
                    let items: Vec<OrderItemView> = group
                        .items
                        .iter()
                        .map(|item| {
                            let is_cancelled = model.cancellations.is_item_cancelled(
                                ship_to,
                                &item.location_number,
                                &item.shipper_number,
                                item.item_uid_number,
                            );
                            let status_code = if is_cancelled {
                                "CAN".to_string()
                            } else {
                                item.order_status_code.clone()
                            };
                            OrderItemView {
                                item_uid_number: item.item_uid_number,
                                part_description: item.part_description.clone(),
                                ship_quantity: item.ship_quantity.clone(),
                                can_cancel: kind == CacheKind::ActiveOrders
                                    && status_code == "OPN",
                                is_cancelled,
                                status_code,
                                unit_price_display: orders::format_price(&item.unit_price),
                                total_price_display: orders::format_price(&item.total_price),
                                selling_price_display: orders::format_price(&item.selling_price),
                                departure_display: orders::format_departure(
                                    &item.departure_date_time,
                                ),
                                order_date: item.order_date.clone(),
                            }
                        })
                        .collect();

                    OrderGroupView {
                        location_number: group.location_number,
                        shipper_number: group.shipper_number,
                        customer_po_number: group.customer_po_number,
                        can_cancel_group: kind == CacheKind::ActiveOrders
                            && !items.is_empty()
                            && items.iter().all(|i| i.status_code == "OPN"),
                        items,
                    }
                })
                .collect();

            OrderSection {
                loading: slot.is_loading(),
                loaded: slot.loaded,
                item_count: slot.items.len(),
                groups,
            }
        }

        /// Final step of both the resume chain and the login side effects.
        fn finish_restore(model: &mut Model, raw_log: Option<String>) {
            if let Some(json) = raw_log {
                match serde_json::from_str::<CancellationLog>(&json) {
                    Ok(log) => model.cancellations = log,
                    Err(e) => {
                        tracing::warn!(error = %e, "stored cancellation log is unreadable");
                    }
                }
            }
            if model.state == AppState::Loading {
                model.state = if model.is_authenticated() {
                    AppState::Ready
                } else {
                    AppState::Unauthenticated
                };
            }
        }

        fn clear_session_storage(caps: &Capabilities) {
            Self::delete_value(caps, storage_keys::JWT_TOKEN);
            Self::delete_value(caps, storage_keys::JWT_EXPIRY);
            Self::delete_value(caps, storage_keys::SHOPS);
            Self::delete_value(caps, storage_keys::SELECTED_SHOP);
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            tracing::debug!(event = event.name(), "handling event");

            match event {
                Event::AppStarted => {
                    model.state = AppState::Loading;
                    caps.secure_store
                        .get(storage_keys::JWT_TOKEN, Event::StoredTokenLoaded);
                    caps.render.render();
                }

                Event::StoredTokenLoaded(None) => {
                    model.state = AppState::Unauthenticated;
                    caps.render.render();
                }

                Event::StoredTokenLoaded(Some(token)) => {
                    caps.secure_store.get(storage_keys::JWT_EXPIRY, move |expiry| {
                        Event::StoredExpiryLoaded { token, expiry }
                    });
                }

                Event::StoredExpiryLoaded { token, expiry } => {
                    let now = get_current_time_ms();
                    let expiry = expiry.unwrap_or_default();
                    match Session::resume(&token, &expiry, now) {
                        Some(session) => {
                            model.history_search =
                                OrderHistorySearchParams::default_range(now);
                            model.session = Some(session);
                            caps.secure_store
                                .get(storage_keys::SHOPS, Event::StoredShopsLoaded);
                        }
                        None => {
                            tracing::info!("stored session missing or expired");
                            Self::clear_session_storage(caps);
                            model.state = AppState::Unauthenticated;
                            caps.render.render();
                        }
                    }
                }

                Event::StoredShopsLoaded(raw) => {
                    if let Some(json) = raw {
                        match serde_json::from_str::<Vec<Shop>>(&json) {
                            Ok(shops) => model.shops = shops,
                            Err(e) => {
                                tracing::warn!(error = %e, "stored shop list is unreadable");
                            }
                        }
                    }
                    caps.secure_store
                        .get(storage_keys::SELECTED_SHOP, Event::StoredSelectionLoaded);
                }

                Event::StoredSelectionLoaded(raw) => {
                    // The stored selection only survives if its shop is
                    // still in the stored list; otherwise fall back to none.
                    if let Some(shop) = raw
                        .as_deref()
                        .and_then(|json| serde_json::from_str::<Shop>(json).ok())
                    {
                        if model.shops.iter().any(|s| s.ship_to == shop.ship_to) {
                            Self::apply_shop_selection(model, shop);
                        } else {
                            tracing::info!("stored selection no longer in shop list");
                        }
                    }
                    caps.secure_store.get(
                        storage_keys::CANCELLED_ORDERS,
                        Event::StoredCancellationsLoaded,
                    );
                }

                Event::StoredCancellationsLoaded(raw) => {
                    Self::finish_restore(model, raw);
                    caps.render.render();
                }

                Event::StoreWriteCompleted { key, result } => {
                    if let Err(e) = result {
                        tracing::warn!(key, error = %e, "secure store write failed");
                        model.set_error(
                            AppError::new(ErrorKind::Storage, "Unable to save data on this device")
                                .with_internal(e.to_string())
                                .with_context("key", key),
                        );
                        caps.render.render();
                    }
                }

                Event::LoginSubmitted { username, password } => {
                    if username.trim().is_empty() || password.expose_secret().is_empty() {
                        model.set_error(ValidationError::MissingCredentials.into());
                        caps.render.render();
                        return;
                    }

                    model.clear_error();
                    model.state = AppState::Authenticating;
                    if let Err(e) =
                        Self::send_login(model, caps, username.trim(), password.expose_secret())
                    {
                        model.state = AppState::Unauthenticated;
                        model.set_error(e);
                    }
                    caps.render.render();
                }

                Event::LoginResponse(result) => {
                    let outcome = (*result).and_then(|resp| {
                        if resp.is_success() {
                            resp.decode::<api::LoginResponse>()
                        } else {
                            // Login failures are credential problems as far
                            // as the user is concerned.
                            Err(AppError::new(
                                ErrorKind::Authentication,
                                "Please check your credentials and try again.",
                            )
                            .with_context("http_status", resp.status.to_string()))
                        }
                    });

                    match outcome.and_then(|login| {
                        Session::from_token(&login.token).map_err(AppError::from)
                    }) {
                        Ok(session) => {
                            let now = get_current_time_ms();
                            Self::persist_value(
                                caps,
                                storage_keys::JWT_TOKEN,
                                session.token.clone(),
                            );
                            Self::persist_value(
                                caps,
                                storage_keys::JWT_EXPIRY,
                                session.expiry_epoch_ms.to_string(),
                            );
                            tracing::info!(username = session.username, "login succeeded");

                            model.history_search =
                                OrderHistorySearchParams::default_range(now);
                            model.session = Some(session);
                            model.state = AppState::Ready;

                            if let Err(e) = Self::send_shops_request(model, caps) {
                                model.set_error(e);
                            }
                            caps.secure_store.get(
                                storage_keys::CANCELLED_ORDERS,
                                Event::StoredCancellationsLoaded,
                            );
                        }
                        Err(e) => {
                            model.state = AppState::Unauthenticated;
                            model.set_error(e);
                        }
                    }
                    caps.render.render();
                }

                Event::LogoutRequested => {
                    model.session = None;
                    model.shops.clear();
                    model.selected_shop = None;
                    model.cart_items.clear();
                    model.shop_search_term.clear();
                    model.orders.reset();
                    model.part_search.clear_all();
                    model.search_terms = SearchTerms::default();
                    model.history_search = OrderHistorySearchParams::default();
                    model.security_profile = None;
                    model.all_questions.clear();
                    model.pending_email = None;
                    model.state = AppState::Unauthenticated;

                    // The cancellation log stays; it is scoped by shop, not
                    // by session.
                    Self::clear_session_storage(caps);
                    caps.render.render();
                }

                Event::ShopsRefreshRequested => {
                    if let Err(e) = Self::send_shops_request(model, caps) {
                        model.set_error(e);
                    }
                    caps.render.render();
                }

                Event::ShopsResponse(result) => {
                    match (*result).and_then(|resp| resp.decode::<api::ShopsResponse>()) {
                        Ok(response) => {
                            let mut shops = response.shops;
                            for shop in &mut shops {
                                shop.cached_cart_items = Vec::new();
                            }
                            tracing::info!(count = shops.len(), "shop list refreshed");
                            model.shops = shops;
                            // A previously selected shop is not pruned here
                            // even if it vanished from the list.
                            Self::persist_shops(model, caps);
                        }
                        Err(e) => model.set_error(e),
                    }
                    caps.render.render();
                }

                Event::ShopSelected { ship_to } => {
                    match model.shops.iter().find(|s| s.ship_to == ship_to).cloned() {
                        Some(shop) => {
                            match serde_json::to_string(&shop) {
                                Ok(json) => Self::persist_value(
                                    caps,
                                    storage_keys::SELECTED_SHOP,
                                    json,
                                ),
                                Err(e) => {
                                    tracing::warn!(error = %e, "failed to encode selection");
                                }
                            }
                            Self::apply_shop_selection(model, shop);
                        }
                        None => model.set_error(AppError::new(
                            ErrorKind::NotFound,
                            "That shop is no longer available",
                        )),
                    }
                    caps.render.render();
                }

                Event::ShopSearchTermChanged { term } => {
                    model.shop_search_term = term;
                    caps.render.render();
                }

                Event::OrdersRequested { kind, force } => {
                    if model.selected_shop.is_none() {
                        model.set_error(AppError::new(
                            ErrorKind::InvalidState,
                            "No shop is selected",
                        ));
                        caps.render.render();
                        return;
                    }

                    if !force && model.orders.slot(kind).is_hit() {
                        tracing::debug!(kind = kind.as_str(), "cache hit, skipping fetch");
                    } else {
                        Self::request_orders(model, caps, kind);
                    }
                    caps.render.render();
                }

                Event::OrdersResponse { kind, generation, result } => {
                    Self::handle_orders_outcome(model, kind, generation, *result);
                    caps.render.render();
                }

                Event::HistorySearchSubmitted { params } => {
                    if !params.has_criteria() {
                        model.set_error(ValidationError::EmptySearchCriteria.into());
                        caps.render.render();
                        return;
                    }
                    let dates_ok = [&params.start_date, &params.end_date]
                        .into_iter()
                        .flatten()
                        .filter(|d| !d.trim().is_empty())
                        .all(|d| validation::is_valid_date_string(d));
                    if !dates_ok {
                        model.set_error(ValidationError::InvalidDate.into());
                        caps.render.render();
                        return;
                    }

                    model.history_search = params;
                    Self::request_orders(model, caps, CacheKind::OrderHistory);
                    caps.render.render();
                }

                Event::SearchTermChanged { kind, term } => {
                    model.search_terms.set(kind, term);
                    caps.render.render();
                }

                Event::CancelGroupRequested { location_number, shipper_number } => {
                    let Some(ship_to) = model.selected_ship_to().map(str::to_string) else {
                        model.set_error(AppError::new(
                            ErrorKind::InvalidState,
                            "No shop is selected",
                        ));
                        caps.render.render();
                        return;
                    };

                    // Gate on the displayed status: an item whose line or
                    // whole group is already in the cancellation log is no
                    // longer open, whatever the server last said.
                    let group: Vec<&OrderLineItem> = model
                        .orders
                        .active_orders
                        .items
                        .iter()
                        .filter(|i| {
                            i.location_number == location_number
                                && i.shipper_number == shipper_number
                        })
                        .collect();
                    let group_open = !group.is_empty()
                        && group.iter().all(|i| {
                            i.is_open()
                                && !model.cancellations.is_item_cancelled(
                                    &ship_to,
                                    &i.location_number,
                                    &i.shipper_number,
                                    i.item_uid_number,
                                )
                        });
                    if !group_open {
                        model.set_error(AppError::new(
                            ErrorKind::Validation,
                            "Only fully open orders can be cancelled",
                        ));
                        caps.render.render();
                        return;
                    }

                    let record = CancelledItemRecord {
                        location_number,
                        shipper_number,
                        item_uid_number: GROUP_CANCEL_UID,
                        part_description: "ENTIRE_ORDER".into(),
                        cancelled_at_ms: get_current_time_ms(),
                    };
                    if let Err(e) = Self::send_cancel_request(
                        model,
                        caps,
                        record,
                        serde_json::Value::from(GROUP_CANCEL_UID),
                    ) {
                        model.set_error(e);
                    }
                    caps.render.render();
                }

                Event::CancelItemRequested {
                    location_number,
                    shipper_number,
                    item_uid_number,
                    part_description,
                } => {
                    let arg_part_no = serde_json::Value::from(part_description.clone());
                    let record = CancelledItemRecord {
                        location_number,
                        shipper_number,
                        item_uid_number,
                        part_description,
                        cancelled_at_ms: get_current_time_ms(),
                    };
                    if let Err(e) = Self::send_cancel_request(model, caps, record, arg_part_no) {
                        model.set_error(e);
                    }
                    caps.render.render();
                }

                Event::CancelResponse { record, result } => {
                    match (*result).and_then(|resp| resp.decode::<api::CancelOrderResponse>()) {
                        Ok(response) if response.success => {
                            if let Some(ship_to) =
                                model.selected_ship_to().map(str::to_string)
                            {
                                model.cancellations.add(&ship_to, record.clone());
                                Self::persist_cancellations(model, caps);
                            } else {
                                tracing::warn!("cancel succeeded with no selected shop");
                            }

                            let fallback = if record.is_group_cancel() {
                                "Order cancelled successfully"
                            } else {
                                "Item deleted successfully"
                            };
                            let message = if response.message.is_empty() {
                                fallback.to_string()
                            } else {
                                response.message
                            };
                            model.show_toast(message, ToastKind::Success);

                            Self::request_orders(model, caps, CacheKind::ActiveOrders);
                        }
                        Ok(response) => {
                            let message = if response.message.is_empty() {
                                "Failed to cancel order".to_string()
                            } else {
                                response.message
                            };
                            model.set_error(AppError::new(ErrorKind::Conflict, message));
                        }
                        Err(e) => model.set_error(e),
                    }
                    caps.render.render();
                }

                Event::VehicleMmyChanged { mmy } => {
                    model.part_search.set_mmy(mmy);
                    caps.render.render();
                }

                Event::VehicleVinChanged { vin } => {
                    model.part_search.set_vin(vin);
                    caps.render.render();
                }

                Event::VehicleContextCleared => {
                    model.part_search.clear();
                    caps.render.render();
                }

                Event::SecurityProfileRequested => {
                    model.profile_loading = true;
                    let send = api::security_profile_url(
                        &model.api_base_url,
                        &Self::username(model),
                    )
                    .and_then(|url| {
                        Self::send_security_get(model, caps, url, Event::SecurityProfileResponse)
                    });
                    if let Err(e) = send {
                        model.profile_loading = false;
                        model.set_error(e);
                    }
                    caps.render.render();
                }

                Event::SecurityProfileResponse(result) => {
                    model.profile_loading = false;
                    match (*result)
                        .and_then(|resp| resp.decode::<api::SecurityProfileResponse>())
                    {
                        Ok(profile) => model.security_profile = Some(profile),
                        Err(e) => model.set_error(e),
                    }
                    caps.render.render();
                }

                Event::AllQuestionsRequested => {
                    let send = api::all_questions_url(&model.api_base_url).and_then(|url| {
                        Self::send_security_get(model, caps, url, Event::AllQuestionsResponse)
                    });
                    if let Err(e) = send {
                        model.set_error(e);
                        caps.render.render();
                    }
                }

                Event::AllQuestionsResponse(result) => {
                    match (*result).and_then(|resp| resp.decode::<Vec<SecurityQuestion>>()) {
                        Ok(questions) => model.all_questions = questions,
                        Err(e) => model.set_error(e),
                    }
                    caps.render.render();
                }

                Event::PasswordUpdateSubmitted { password } => {
                    if let Err(e) = validation::validate_password(password.expose_secret()) {
                        model.set_error(e.into());
                        caps.render.render();
                        return;
                    }

                    let send = api::update_password_url(
                        &model.api_base_url,
                        &Self::username(model),
                    )
                    .and_then(|url| {
                        Self::send_security_put(
                            model,
                            caps,
                            url,
                            &api::UpdatePasswordRequest { password: password.expose_secret() },
                            Event::PasswordUpdateResponse,
                        )
                    });
                    if let Err(e) = send {
                        model.set_error(e);
                    }
                    caps.render.render();
                }

                Event::PasswordUpdateResponse(result) => {
                    match (*result).and_then(|resp| resp.ack()) {
                        Ok(()) => {
                            model.show_toast("Password updated successfully", ToastKind::Success);
                        }
                        Err(e) => model.set_error(e),
                    }
                    caps.render.render();
                }

                Event::EmailUpdateSubmitted { email } => {
                    if let Err(e) = validation::validate_email(email.trim()) {
                        model.set_error(e.into());
                        caps.render.render();
                        return;
                    }
                    let current = model
                        .security_profile
                        .as_ref()
                        .map(|p| p.email.to_lowercase());
                    if current.as_deref() == Some(email.trim().to_lowercase().as_str()) {
                        model.set_error(ValidationError::EmailUnchanged.into());
                        caps.render.render();
                        return;
                    }

                    let email = email.trim().to_string();
                    let send = api::update_email_url(&model.api_base_url, &Self::username(model))
                        .and_then(|url| {
                            Self::send_security_put(
                                model,
                                caps,
                                url,
                                &api::UpdateEmailRequest { email: &email },
                                Event::EmailUpdateResponse,
                            )
                        });
                    match send {
                        Ok(()) => model.pending_email = Some(email),
                        Err(e) => model.set_error(e),
                    }
                    caps.render.render();
                }

                Event::EmailUpdateResponse(result) => {
                    match (*result).and_then(|resp| resp.ack()) {
                        Ok(()) => {
                            if let (Some(profile), Some(email)) =
                                (model.security_profile.as_mut(), model.pending_email.take())
                            {
                                profile.email = email;
                            }
                            model.show_toast("Email updated successfully", ToastKind::Success);
                        }
                        Err(e) => {
                            model.pending_email = None;
                            model.set_error(e);
                        }
                    }
                    caps.render.render();
                }

                Event::QuestionsUpdateSubmitted { answers } => {
                    if answers.iter().any(|q| q.answer.trim().chars().count() < 2) {
                        model.set_error(ValidationError::AnswerTooShort.into());
                        caps.render.render();
                        return;
                    }

                    let send = api::update_questions_url(
                        &model.api_base_url,
                        &Self::username(model),
                    )
                    .and_then(|url| {
                        Self::send_security_put(
                            model,
                            caps,
                            url,
                            &api::UpdateQuestionsRequest { answers },
                            Event::QuestionsUpdateResponse,
                        )
                    });
                    if let Err(e) = send {
                        model.set_error(e);
                    }
                    caps.render.render();
                }

                Event::QuestionsUpdateResponse(result) => {
                    match (*result).and_then(|resp| resp.ack()) {
                        Ok(()) => {
                            model.show_toast(
                                "Security questions updated successfully",
                                ToastKind::Success,
                            );
                        }
                        Err(e) => model.set_error(e),
                    }
                    caps.render.render();
                }

                Event::ErrorDismissed => {
                    model.clear_error();
                    caps.render.render();
                }

                Event::ToastDismissed => {
                    model.clear_toast();
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel {
                state: model.state,
                is_authenticated: model.is_authenticated(),
                needs_shop_selection: model.is_authenticated()
                    && model.selected_shop.is_none(),
                shop_selector: Self::build_shop_selector(model),
                selected_shop: model.selected_shop.as_ref().map(|shop| SelectedShopView {
                    ship_to: shop.ship_to.clone(),
                    name: shop.name.clone(),
                    cart_item_count: model.cart_items.len(),
                }),
                active_orders: Self::build_order_section(model, CacheKind::ActiveOrders),
                active_returns: Self::build_order_section(model, CacheKind::ActiveReturns),
                order_history: Self::build_order_section(model, CacheKind::OrderHistory),
                history_search_enabled: model.history_search.has_criteria(),
                part_search: PartSearchView {
                    current: model.part_search.current_mmy.clone(),
                    last: model.part_search.last_mmy.clone(),
                    vin: model.part_search.current_vin.clone(),
                    last_vin: model.part_search.last_vin.clone(),
                },
                security: SecurityView {
                    loading: model.profile_loading,
                    email: model.security_profile.as_ref().map(|p| p.email.clone()),
                    questions: model
                        .security_profile
                        .as_ref()
                        .map(|p| p.questions.clone())
                        .unwrap_or_default(),
                    all_questions: model.all_questions.clone(),
                },
                error: model.active_error.as_ref().map(|e| ErrorView {
                    message: e.user_facing_message(),
                    code: e.code().to_string(),
                    is_retryable: e.is_retryable(),
                }),
                toast: model.active_toast.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod errors {
        use super::*;

        #[test]
        fn server_error_field_becomes_the_message() {
            let err = AppError::from_http_status(409, Some(br#"{"error":"Order already shipped"}"#));
            assert_eq!(err.kind, ErrorKind::Conflict);
            assert_eq!(err.message, "Order already shipped");
            assert_eq!(err.user_facing_message(), "Order already shipped");
        }

        #[test]
        fn unparseable_body_falls_back_to_generic_message() {
            let err = AppError::from_http_status(500, Some(b"<html>oops</html>"));
            assert_eq!(err.message, "API call failed: 500");
            assert_eq!(err.kind, ErrorKind::Internal);

            let err = AppError::from_http_status(418, None);
            assert_eq!(err.message, "API call failed: 418");
            assert_eq!(err.kind, ErrorKind::Unknown);
        }

        #[test]
        fn auth_errors_hide_the_server_wording() {
            let err = AppError::from_http_status(401, Some(br#"{"error":"bad row in users"}"#));
            assert_eq!(err.kind, ErrorKind::Authentication);
            assert_eq!(
                err.user_facing_message(),
                "Please check your credentials and try again."
            );
        }

        #[test]
        fn schema_errors_are_fatal_and_not_retryable() {
            let err = AppError::new(ErrorKind::Schema, "bad payload");
            assert_eq!(err.severity, ErrorSeverity::Fatal);
            assert!(!err.is_retryable());
        }
    }

    mod model {
        use super::*;

        #[test]
        fn starts_at_the_loading_gate() {
            let model = Model::default();
            assert_eq!(model.state, AppState::Loading);
            assert!(!model.is_authenticated());
            assert!(model.selected_ship_to().is_none());
        }

        #[test]
        fn search_terms_are_tracked_per_kind() {
            let mut terms = SearchTerms::default();
            terms.set(CacheKind::ActiveOrders, "wind".into());
            terms.set(CacheKind::OrderHistory, "po-9".into());

            assert_eq!(terms.get(CacheKind::ActiveOrders), "wind");
            assert_eq!(terms.get(CacheKind::ActiveReturns), "");
            assert_eq!(terms.get(CacheKind::OrderHistory), "po-9");
        }
    }

    mod view {
        use super::*;
        use crate::orders::OrderLineItem;
        use crate::cancellations::CancelledItemRecord;
        use crux_core::App as _;

        fn item(uid: i64, status: &str) -> OrderLineItem {
            OrderLineItem {
                location_number: "100".into(),
                shipper_number: "A".into(),
                item_uid_number: uid,
                order_status_code: status.into(),
                unit_price: "10".into(),
                total_price: "20".into(),
                ..OrderLineItem::default()
            }
        }

        fn model_with_orders(items: Vec<OrderLineItem>) -> Model {
            let mut model = Model::default();
            model.state = AppState::Ready;
            model.session = Some(Session {
                username: "glassguy".into(),
                token: "t".into(),
                expiry_epoch_ms: u64::MAX,
            });
            model.selected_shop = Some(Shop {
                ship_to: "1001".into(),
                name: "City Auto Glass".into(),
                address: "200 Oak Ave".into(),
                cached_cart_items: Vec::new(),
            });
            model.orders.check_and_clear("1001");
            let generation = model.orders.active_orders.begin_load();
            model.orders.active_orders.complete(generation, items);
            model
        }

        #[test]
        fn cancelled_item_displays_can_without_touching_siblings() {
            let mut model = model_with_orders(vec![item(42, "OPN"), item(43, "OPN")]);
            model.cancellations.add(
                "1001",
                CancelledItemRecord {
                    location_number: "100".into(),
                    shipper_number: "A".into(),
                    item_uid_number: 42,
                    part_description: "FW02995".into(),
                    cancelled_at_ms: 0,
                },
            );

            let vm = App::default().view(&model);
            let group = &vm.active_orders.groups[0];
            let by_uid = |uid: i64| group.items.iter().find(|i| i.item_uid_number == uid);

            assert_eq!(by_uid(42).unwrap().status_code, "CAN");
            assert!(by_uid(42).unwrap().is_cancelled);
            assert_eq!(by_uid(43).unwrap().status_code, "OPN");
            assert!(!by_uid(43).unwrap().is_cancelled);
        }

        #[test]
        fn group_cancel_offered_only_when_every_item_is_open() {
            let model = model_with_orders(vec![item(1, "OPN"), item(2, "OPN")]);
            let vm = App::default().view(&model);
            assert!(vm.active_orders.groups[0].can_cancel_group);

            let model = model_with_orders(vec![item(1, "OPN"), item(2, "SHP")]);
            let vm = App::default().view(&model);
            assert!(!vm.active_orders.groups[0].can_cancel_group);
        }

        #[test]
        fn group_cancellation_disables_group_cancel_button() {
            let mut model = model_with_orders(vec![item(1, "OPN"), item(2, "OPN")]);
            model.cancellations.add(
                "1001",
                CancelledItemRecord {
                    location_number: "100".into(),
                    shipper_number: "A".into(),
                    item_uid_number: crate::orders::GROUP_CANCEL_UID,
                    part_description: "ENTIRE_ORDER".into(),
                    cancelled_at_ms: 0,
                },
            );

            let vm = App::default().view(&model);
            let group = &vm.active_orders.groups[0];
            assert!(group.items.iter().all(|i| i.status_code == "CAN"));
            assert!(!group.can_cancel_group);
        }

        #[test]
        fn section_search_term_filters_displayed_groups() {
            let mut a = item(1, "OPN");
            a.part_description = "Windshield".into();
            let mut b = item(2, "OPN");
            b.part_description = "Door glass".into();
            b.shipper_number = "B".into();

            let mut model = model_with_orders(vec![a, b]);
            model.search_terms.set(CacheKind::ActiveOrders, "windshield".into());

            let vm = App::default().view(&model);
            assert_eq!(vm.active_orders.groups.len(), 1);
            assert_eq!(vm.active_orders.groups[0].items[0].part_description, "Windshield");
            // Counts reflect the cache, not the filter.
            assert_eq!(vm.active_orders.item_count, 2);
        }

        #[test]
        fn shop_selection_modal_is_required_until_a_shop_is_chosen() {
            let mut model = model_with_orders(vec![]);
            model.selected_shop = None;
            let vm = App::default().view(&model);
            assert!(vm.needs_shop_selection);

            let model = model_with_orders(vec![]);
            let vm = App::default().view(&model);
            assert!(!vm.needs_shop_selection);
        }

        #[test]
        fn prices_and_departures_are_formatted_for_display() {
            let mut it = item(1, "OPN");
            it.unit_price = "12.5".into();
            it.departure_date_time = "2024-03-05T14:30:45".into();
            let model = model_with_orders(vec![it]);

            let vm = App::default().view(&model);
            let shown = &vm.active_orders.groups[0].items[0];
            assert_eq!(shown.unit_price_display, "$12.50");
            assert_eq!(shown.departure_display, "05-Mar-2024 02:30:45 PM");
        }
    }
}
