//! JSON-RPC operations that have no REST counterpart on Server/Data Center.
//!
//! Space labels and space permissions are only exposed through the legacy
//! remote API. The JSON-RPC endpoint accepts the same basic authentication as
//! REST and takes positional parameters without the login token.

use serde_json::{Value, json};
use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;

impl ConfluenceClient {
    /// Add a label (e.g. `team:docs`) to a space, which files the space under
    /// that category.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the call fails or the server reports an error.
    pub fn add_space_label(&self, label: &str, space_key: &str) -> Result<(), ConfluenceError> {
        info!("Adding label {} to space {}", label, space_key);
        self.rpc_call("addLabelByNameToSpace", &json!([label, space_key]))
            .map(drop)
    }

    /// Grant one space permission to a user or group.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the call fails or the server reports an error.
    pub fn add_space_permission(
        &self,
        permission: &str,
        entity: &str,
        space_key: &str,
    ) -> Result<(), ConfluenceError> {
        info!(
            "Granting {} on space {} to {}",
            permission, space_key, entity
        );
        self.rpc_call("addPermissionToSpace", &json!([permission, entity, space_key]))
            .map(drop)
    }

    fn rpc_call(&self, method: &str, params: &Value) -> Result<Value, ConfluenceError> {
        let url = format!(
            "{}/rpc/json-rpc/confluenceservice-v2/{}",
            self.base_url, method
        );
        let answer: Value = self.post_json(&url, params)?;
        rpc_result(method, answer)
    }
}

/// Unwrap a JSON-RPC answer.
///
/// The endpoint answers `200 OK` with an `error` object on failure, and with
/// either a bare value or a `{"result": ...}` envelope on success.
fn rpc_result(method: &str, answer: Value) -> Result<Value, ConfluenceError> {
    if let Some(error) = answer.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), ToOwned::to_owned);
        return Err(ConfluenceError::Rpc {
            method: method.to_owned(),
            message,
        });
    }
    match answer {
        Value::Object(mut map) if map.contains_key("result") => {
            Ok(map.remove("result").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}
