use secrecy::SecretString;

use crate::api::{ApiResult, SecurityQuestion};
use crate::cache::CacheKind;
use crate::cancellations::CancelledItemRecord;
use crate::capabilities::SecureStoreResult;
use crate::orders::OrderHistorySearchParams;
use crate::part_search::MakeModelYear;

/// Everything that can happen to the core: user intents from the shell and
/// resolutions of previously requested effects. Response payloads are boxed
/// to keep the enum small.
#[derive(Debug, Clone)]
pub enum Event {
    // Startup and persisted-state restore. The stored reads arrive in a
    // fixed chain; see the resume handling in `app`.
    AppStarted,
    StoredTokenLoaded(Option<String>),
    StoredExpiryLoaded { token: String, expiry: Option<String> },
    StoredShopsLoaded(Option<String>),
    StoredSelectionLoaded(Option<String>),
    StoredCancellationsLoaded(Option<String>),
    StoreWriteCompleted { key: String, result: SecureStoreResult },

    // Authentication
    LoginSubmitted { username: String, password: SecretString },
    LoginResponse(Box<ApiResult>),
    LogoutRequested,

    // Shop directory
    ShopsRefreshRequested,
    ShopsResponse(Box<ApiResult>),
    ShopSelected { ship_to: String },
    ShopSearchTermChanged { term: String },

    // Orders, returns and history
    OrdersRequested { kind: CacheKind, force: bool },
    OrdersResponse { kind: CacheKind, generation: u64, result: Box<ApiResult> },
    HistorySearchSubmitted { params: OrderHistorySearchParams },
    SearchTermChanged { kind: CacheKind, term: String },
    CancelGroupRequested { location_number: String, shipper_number: String },
    CancelItemRequested {
        location_number: String,
        shipper_number: String,
        item_uid_number: i64,
        part_description: String,
    },
    CancelResponse { record: CancelledItemRecord, result: Box<ApiResult> },

    // Part-search vehicle context
    VehicleMmyChanged { mmy: MakeModelYear },
    VehicleVinChanged { vin: String },
    VehicleContextCleared,

    // Account security
    SecurityProfileRequested,
    SecurityProfileResponse(Box<ApiResult>),
    AllQuestionsRequested,
    AllQuestionsResponse(Box<ApiResult>),
    PasswordUpdateSubmitted { password: SecretString },
    PasswordUpdateResponse(Box<ApiResult>),
    EmailUpdateSubmitted { email: String },
    EmailUpdateResponse(Box<ApiResult>),
    QuestionsUpdateSubmitted { answers: Vec<SecurityQuestion> },
    QuestionsUpdateResponse(Box<ApiResult>),

    // Transient UI state
    ErrorDismissed,
    ToastDismissed,
}

impl Event {
    /// Stable name for log lines.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::StoredTokenLoaded(_) => "stored_token_loaded",
            Self::StoredExpiryLoaded { .. } => "stored_expiry_loaded",
            Self::StoredShopsLoaded(_) => "stored_shops_loaded",
            Self::StoredSelectionLoaded(_) => "stored_selection_loaded",
            Self::StoredCancellationsLoaded(_) => "stored_cancellations_loaded",
            Self::StoreWriteCompleted { .. } => "store_write_completed",
            Self::LoginSubmitted { .. } => "login_submitted",
            Self::LoginResponse(_) => "login_response",
            Self::LogoutRequested => "logout_requested",
            Self::ShopsRefreshRequested => "shops_refresh_requested",
            Self::ShopsResponse(_) => "shops_response",
            Self::ShopSelected { .. } => "shop_selected",
            Self::ShopSearchTermChanged { .. } => "shop_search_term_changed",
            Self::OrdersRequested { .. } => "orders_requested",
            Self::OrdersResponse { .. } => "orders_response",
            Self::HistorySearchSubmitted { .. } => "history_search_submitted",
            Self::SearchTermChanged { .. } => "search_term_changed",
            Self::CancelGroupRequested { .. } => "cancel_group_requested",
            Self::CancelItemRequested { .. } => "cancel_item_requested",
            Self::CancelResponse { .. } => "cancel_response",
            Self::VehicleMmyChanged { .. } => "vehicle_mmy_changed",
            Self::VehicleVinChanged { .. } => "vehicle_vin_changed",
            Self::VehicleContextCleared => "vehicle_context_cleared",
            Self::SecurityProfileRequested => "security_profile_requested",
            Self::SecurityProfileResponse(_) => "security_profile_response",
            Self::AllQuestionsRequested => "all_questions_requested",
            Self::AllQuestionsResponse(_) => "all_questions_response",
            Self::PasswordUpdateSubmitted { .. } => "password_update_submitted",
            Self::PasswordUpdateResponse(_) => "password_update_response",
            Self::EmailUpdateSubmitted { .. } => "email_update_submitted",
            Self::EmailUpdateResponse(_) => "email_update_response",
            Self::QuestionsUpdateSubmitted { .. } => "questions_update_submitted",
            Self::QuestionsUpdateResponse(_) => "questions_update_response",
            Self::ErrorDismissed => "error_dismissed",
            Self::ToastDismissed => "toast_dismissed",
        }
    }
}
