use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use crux_core::testing::AppTester;
use secrecy::SecretString;

use buysite_core::api::ApiResponse;
use buysite_core::capabilities::SecureStoreOperation;
use buysite_core::session::storage_keys;
use buysite_core::shops::Shop;
use buysite_core::{App, AppState, Effect, Event, Model};

fn token_for(username: &str, exp_secs: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{username}","exp":{exp_secs}}}"#).as_bytes());
    format!("{header}.{payload}.signature")
}

fn deleted_keys(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::SecureStore(req) => match &req.operation {
                SecureStoreOperation::Delete { key } => Some(key.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn stored_keys(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::SecureStore(req) => match &req.operation {
                SecureStoreOperation::Set { key, .. } => Some(key.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[test]
fn startup_resumes_a_persisted_session() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    // 1. Cold start reads the stored token and holds at the loading gate.
    let update = app.update(Event::AppStarted, &mut model);
    assert_eq!(model.state, AppState::Loading);
    assert!(update.effects.iter().any(|e| matches!(
        e,
        Effect::SecureStore(req)
            if matches!(&req.operation, SecureStoreOperation::Get { key } if key == storage_keys::JWT_TOKEN)
    )));

    // 2. Token found; the expiry read follows.
    let token = token_for("glassguy", 2_000_000_000);
    let update = app.update(Event::StoredTokenLoaded(Some(token.clone())), &mut model);
    assert!(update.effects.iter().any(|e| matches!(
        e,
        Effect::SecureStore(req)
            if matches!(&req.operation, SecureStoreOperation::Get { key } if key == storage_keys::JWT_EXPIRY)
    )));

    // 3. A future expiry restores the session and continues the chain.
    app.update(
        Event::StoredExpiryLoaded { token, expiry: Some("99999999999999".into()) },
        &mut model,
    );
    assert!(model.is_authenticated());
    assert_eq!(model.session.as_ref().map(|s| s.username.as_str()), Some("glassguy"));

    // 4. Stored shop list and selection come back.
    let shops_json = r#"[{"shipto":"1001","name":"City Auto Glass","address":"200 Oak Ave"},
                         {"shipto":"1002","name":"Metro Glass","address":"9 Elm Rd"}]"#;
    app.update(Event::StoredShopsLoaded(Some(shops_json.into())), &mut model);
    assert_eq!(model.shops.len(), 2);

    app.update(
        Event::StoredSelectionLoaded(Some(r#"{"shipto":"1002","name":"Metro Glass","address":"9 Elm Rd"}"#.into())),
        &mut model,
    );
    assert_eq!(model.selected_ship_to(), Some("1002"));

    // 5. Cancellation log read closes the gate.
    let update = app.update(Event::StoredCancellationsLoaded(None), &mut model);
    assert_eq!(model.state, AppState::Ready);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
}

#[test]
fn expired_stored_session_is_discarded() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let token = token_for("glassguy", 1);
    let update = app.update(
        Event::StoredExpiryLoaded { token, expiry: Some("1000".into()) },
        &mut model,
    );

    assert!(!model.is_authenticated());
    assert_eq!(model.state, AppState::Unauthenticated);

    let deleted = deleted_keys(&update.effects);
    assert!(deleted.contains(&storage_keys::JWT_TOKEN.to_string()));
    assert!(deleted.contains(&storage_keys::JWT_EXPIRY.to_string()));
    assert!(deleted.contains(&storage_keys::SHOPS.to_string()));
    assert!(deleted.contains(&storage_keys::SELECTED_SHOP.to_string()));
}

#[test]
fn stored_selection_outside_the_shop_list_is_dropped() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    model.shops = vec![Shop {
        ship_to: "1001".into(),
        name: "City Auto Glass".into(),
        address: "200 Oak Ave".into(),
        cached_cart_items: Vec::new(),
    }];

    app.update(
        Event::StoredSelectionLoaded(Some(r#"{"shipto":"9999","name":"Closed","address":""}"#.into())),
        &mut model,
    );

    assert!(model.selected_shop.is_none());
}

#[test]
fn login_requires_both_credentials() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    model.state = AppState::Unauthenticated;

    app.update(
        Event::LoginSubmitted { username: "  ".into(), password: SecretString::new("x".into()) },
        &mut model,
    );

    assert_eq!(model.state, AppState::Unauthenticated);
    let view = app.view(&model);
    assert_eq!(
        view.error.map(|e| e.message),
        Some("Username and password are required".to_string())
    );
}

#[test]
fn successful_login_persists_the_session_and_loads_shops() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    model.state = AppState::Unauthenticated;

    // 1. Submit goes to the wire.
    let update = app.update(
        Event::LoginSubmitted {
            username: "glassguy".into(),
            password: SecretString::new("Gl4ss!pass".into()),
        },
        &mut model,
    );
    assert_eq!(model.state, AppState::Authenticating);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Http(_))));

    // 2. The issued token becomes the session.
    let token = token_for("glassguy", 2_000_000_000);
    let body = format!(r#"{{"token":"{token}"}}"#);
    let update = app.update(
        Event::LoginResponse(Box::new(Ok(ApiResponse::ok(body)))),
        &mut model,
    );

    assert_eq!(model.state, AppState::Ready);
    assert_eq!(model.session.as_ref().map(|s| s.username.as_str()), Some("glassguy"));
    assert_eq!(
        model.session.as_ref().map(|s| s.expiry_epoch_ms),
        Some(2_000_000_000_000)
    );
    // A 30-day history window is primed at sign-in.
    assert!(model.history_search.has_criteria());

    let stored = stored_keys(&update.effects);
    assert!(stored.contains(&storage_keys::JWT_TOKEN.to_string()));
    assert!(stored.contains(&storage_keys::JWT_EXPIRY.to_string()));
    // The shop directory fetch goes out alongside the cancellation-log read.
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
}

#[test]
fn failed_login_reports_bad_credentials() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    model.state = AppState::Authenticating;

    app.update(
        Event::LoginResponse(Box::new(Ok(ApiResponse {
            status: 401,
            body: r#"{"error":"user row locked"}"#.into(),
        }))),
        &mut model,
    );

    assert_eq!(model.state, AppState::Unauthenticated);
    assert!(!model.is_authenticated());
    let view = app.view(&model);
    assert_eq!(
        view.error.map(|e| e.message),
        Some("Please check your credentials and try again.".to_string())
    );
}

#[test]
fn shops_response_is_cached_for_offline_start() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::ShopsResponse(Box::new(Ok(ApiResponse::ok(
            r#"{"shops":[{"shipto":"1001","name":"City Auto Glass","address":"200 Oak Ave"}]}"#,
        )))),
        &mut model,
    );

    assert_eq!(model.shops.len(), 1);
    assert!(stored_keys(&update.effects).contains(&storage_keys::SHOPS.to_string()));
}

#[test]
fn logout_clears_the_session_but_keeps_the_cancellation_log() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    model.state = AppState::Ready;
    model.session = Some(buysite_core::session::Session {
        username: "glassguy".into(),
        token: "t".into(),
        expiry_epoch_ms: u64::MAX,
    });
    model.cancellations.add(
        "1001",
        buysite_core::cancellations::CancelledItemRecord {
            location_number: "100".into(),
            shipper_number: "A".into(),
            item_uid_number: 42,
            part_description: "FW02995".into(),
            cancelled_at_ms: 0,
        },
    );

    let update = app.update(Event::LogoutRequested, &mut model);

    assert_eq!(model.state, AppState::Unauthenticated);
    assert!(model.session.is_none());
    assert!(model.shops.is_empty());
    assert!(!model.cancellations.is_empty());

    let deleted = deleted_keys(&update.effects);
    assert!(deleted.contains(&storage_keys::JWT_TOKEN.to_string()));
    assert!(!deleted.contains(&storage_keys::CANCELLED_ORDERS.to_string()));
}
