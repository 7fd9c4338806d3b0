mod secure_store;

pub use self::secure_store::{
    SecureStore, SecureStoreError, SecureStoreOperation, SecureStoreOutput, SecureStoreResult,
};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;
pub type AppSecureStore = SecureStore<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub secure_store: SecureStore<Event>,
}
