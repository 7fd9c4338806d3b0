//! Capability for the device's secure item store (Keychain on iOS, Keystore
//! on Android). Values are opaque strings keyed by name; the shell owns the
//! actual storage and its encryption.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "data")]
pub enum SecureStoreOperation {
    Get { key: String },
    Set { key: String, value: String },
    Delete { key: String },
}

impl SecureStoreOperation {
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Get { key } | Self::Set { key, .. } | Self::Delete { key } => key,
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum SecureStoreError {
    #[error("secure storage is not available on this device")]
    Unavailable,

    #[error("read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("delete failed for key {key}: {reason}")]
    DeleteFailed { key: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum SecureStoreOutput {
    /// Result of a `Get`; `None` when the key has never been written.
    Value(Option<String>),
    /// Acknowledges a `Set` or `Delete`.
    Done,
}

pub type SecureStoreResult = Result<SecureStoreOutput, SecureStoreError>;

impl Operation for SecureStoreOperation {
    type Output = SecureStoreResult;
}

#[derive(Clone)]
pub struct SecureStore<E> {
    context: CapabilityContext<SecureStoreOperation, E>,
}

impl<Ev> Capability<Ev> for SecureStore<Ev> {
    type Operation = SecureStoreOperation;
    type MappedSelf<MappedEv> = SecureStore<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        SecureStore::new(self.context.map_event(f))
    }
}

impl<E> SecureStore<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<SecureStoreOperation, E>) -> Self {
        Self { context }
    }

    /// Reads a value. Read failures collapse to `None`: a key we cannot read
    /// is treated the same as one that was never written, which is what the
    /// startup gate wants.
    pub fn get<F>(&self, key: impl Into<String>, make_event: F)
    where
        F: FnOnce(Option<String>) -> E + Send + 'static,
    {
        let context = self.context.clone();
        let key = key.into();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(SecureStoreOperation::Get { key })
                .await;
            let value = match result {
                Ok(SecureStoreOutput::Value(value)) => value,
                Ok(SecureStoreOutput::Done) | Err(_) => None,
            };
            context.update_app(make_event(value));
        });
    }

    pub fn set<F>(&self, key: impl Into<String>, value: impl Into<String>, make_event: F)
    where
        F: FnOnce(SecureStoreResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        let key = key.into();
        let value = value.into();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(SecureStoreOperation::Set { key, value })
                .await;
            context.update_app(make_event(result));
        });
    }

    pub fn delete<F>(&self, key: impl Into<String>, make_event: F)
    where
        F: FnOnce(SecureStoreResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        let key = key.into();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(SecureStoreOperation::Delete { key })
                .await;
            context.update_app(make_event(result));
        });
    }
}
