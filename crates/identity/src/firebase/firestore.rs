//! Firestore REST client implementing [`ProfileStore`] over the `users`
//! collection.
//!
//! Documents use Firestore's typed-value encoding (`stringValue`,
//! `timestampValue`, ...). Merge writes send an `updateMask` so only the
//! present fields change. There is no streaming listener over REST, so
//! watches poll the document and emit only when the snapshot changes.

use std::sync::Arc;

use async_trait::async_trait;
use mentorhub_core::profile::{ProfileWrite, UserProfile};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{FirebaseAuthProvider, FirebaseConfig};
use crate::provider::{ProfileSnapshot, ProfileStore, StoreError, StoreErrorCode, WriteMode};
use crate::subscription::Subscription;

const USERS_COLLECTION: &str = "users";

/// Fields stored as Firestore timestamps rather than strings.
const TIMESTAMP_FIELDS: &[&str] = &["createdAt", "updatedAt"];

#[derive(Clone)]
pub struct FirestoreProfileStore {
    client: reqwest::Client,
    config: FirebaseConfig,
    auth: Option<Arc<FirebaseAuthProvider>>,
}

impl FirestoreProfileStore {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            auth: None,
        }
    }

    /// Authenticate requests with the ID token of `auth`'s signed-in user.
    pub fn with_auth(mut self, auth: Arc<FirebaseAuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    fn document_url(&self, uid: &str) -> String {
        format!("{}/{USERS_COLLECTION}/{uid}", self.config.documents_url())
    }

    /// Attach the signed-in user's ID token, refreshing it when near expiry.
    async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        let Some(auth) = &self.auth else {
            return Ok(request);
        };
        match auth.fresh_id_token().await {
            Ok(Some(token)) => Ok(request.bearer_auth(token)),
            Ok(None) => Ok(request),
            Err(e) if e.code == "auth/network-request-failed" => {
                Err(StoreError::unavailable(e.message))
            }
            Err(e) => Err(StoreError::new(StoreErrorCode::PermissionDenied, e.message)),
        }
    }

    async fn fetch(&self, uid: &str) -> ProfileSnapshot {
        let response = self
            .authorize(self.client.get(self.document_url(uid)))
            .await?
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let document: Value = response.json().await.map_err(request_error)?;
        decode_profile(uid, &document).map(Some)
    }
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

fn request_error(err: reqwest::Error) -> StoreError {
    if err.is_connect() || err.is_timeout() {
        StoreError::unavailable(err.to_string())
    } else {
        StoreError::new(StoreErrorCode::Internal, err.to_string())
    }
}

/// Classify a non-2xx response from its HTTP status and the gRPC status
/// name in the error body.
fn status_error(status: StatusCode, body: &str) -> StoreError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let grpc = parsed
        .as_ref()
        .and_then(|v| v["error"]["status"].as_str())
        .unwrap_or_default();
    let message = parsed
        .as_ref()
        .and_then(|v| v["error"]["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());

    let code = match (grpc, status.as_u16()) {
        ("UNAVAILABLE", _) | (_, 503) => StoreErrorCode::Unavailable,
        ("PERMISSION_DENIED" | "UNAUTHENTICATED", _) | (_, 401 | 403) => {
            StoreErrorCode::PermissionDenied
        }
        ("NOT_FOUND", _) | (_, 404) => StoreErrorCode::NotFound,
        ("INVALID_ARGUMENT", _) | (_, 400) => StoreErrorCode::InvalidArgument,
        _ => StoreErrorCode::Internal,
    };
    StoreError::new(code, message)
}

// ---------------------------------------------------------------------------
// Typed-value encoding
// ---------------------------------------------------------------------------

fn encode_value(field: &str, value: Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_i64() => json!({ "integerValue": n.to_string() }),
        Value::Number(n) => json!({ "doubleValue": n }),
        Value::String(s) if TIMESTAMP_FIELDS.contains(&field) => json!({ "timestampValue": s }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.into_iter().map(|v| encode_value("", v)).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn encode_fields(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(k, v)| {
            let encoded = encode_value(&k, v);
            (k, encoded)
        })
        .collect()
}

/// Encode a write as a Firestore document body. Returns the body and the
/// field paths it sets.
fn encode_write(uid: &str, write: &ProfileWrite, mode: WriteMode) -> (Value, Vec<&'static str>) {
    let mut map = match serde_json::to_value(write) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let mut paths = write.field_paths();
    if mode == WriteMode::Create {
        map.insert("uid".to_string(), Value::String(uid.to_string()));
        paths.push("uid");
    }
    (json!({ "fields": encode_fields(map) }), paths)
}

fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "stringValue" | "timestampValue" | "booleanValue" | "doubleValue" | "referenceValue" => {
            inner.clone()
        }
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or(Value::Null),
        "arrayValue" => Value::Array(
            inner["values"]
                .as_array()
                .map(|items| items.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(decode_fields(&inner["fields"])),
        _ => Value::Null,
    }
}

fn decode_fields(fields: &Value) -> Map<String, Value> {
    fields
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .map(|(k, v)| (k.clone(), decode_value(v)))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_profile(uid: &str, document: &Value) -> Result<UserProfile, StoreError> {
    let mut map = decode_fields(&document["fields"]);
    map.entry("uid")
        .or_insert_with(|| Value::String(uid.to_string()));
    for key in ["displayName", "email"] {
        map.entry(key).or_insert_with(|| Value::String(String::new()));
    }
    // Optional fields written as explicit nulls.
    map.retain(|_, v| !v.is_null());
    serde_json::from_value(Value::Object(map)).map_err(|e| {
        StoreError::new(
            StoreErrorCode::Internal,
            format!("Malformed profile document for {uid}: {e}"),
        )
    })
}

// ---------------------------------------------------------------------------
// ProfileStore
// ---------------------------------------------------------------------------

#[async_trait]
impl ProfileStore for FirestoreProfileStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        self.fetch(uid).await
    }

    async fn write_profile(
        &self,
        uid: &str,
        write: ProfileWrite,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let (body, paths) = encode_write(uid, &write, mode);
        let mut request = self.client.patch(self.document_url(uid)).json(&body);
        if mode == WriteMode::Merge {
            let mask: Vec<(&str, &str)> = paths.iter().map(|p| ("updateMask.fieldPaths", *p)).collect();
            request = request.query(&mask);
        }

        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }
        tracing::debug!(uid, ?mode, fields = paths.len(), "Profile document written");
        Ok(())
    }

    fn watch_profile(&self, uid: &str) -> Subscription<ProfileSnapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let store = self.clone();
        let uid = uid.to_string();
        let token = cancel.clone();

        tokio::spawn(async move {
            let mut last: Option<ProfileSnapshot> = None;
            loop {
                let snapshot = store.fetch(&uid).await;
                if last.as_ref() != Some(&snapshot) {
                    if tx.send(snapshot.clone()).is_err() {
                        break;
                    }
                    last = Some(snapshot);
                }
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(store.config.poll_interval) => {}
                }
            }
            tracing::debug!(uid = %uid, "Profile watch stopped");
        });

        Subscription::new(rx, move || cancel.cancel())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
