//! Contracts with the remote datastore.
//!
//! Connection lifecycle is owned by the embedder. The mirror only needs two
//! things from it: a request/response call that returns a wire value, and a
//! topic subscription that pushes change notifications.

use crate::error::TransportError;
use mirra_core::DynamicValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote method names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Table-shaped result
    #[default]
    Query,
    /// Table-shaped result
    Select,
    /// Table-shaped result
    List,
    /// Record-shaped result
    Read,
    /// Writes an existing record
    Update,
    /// Writes a new record
    Create,
}

impl Method {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Query => "query",
            Method::Select => "select",
            Method::List => "list",
            Method::Read => "read",
            Method::Update => "update",
            Method::Create => "create",
        }
    }

    /// Returns true if the method answers with a table.
    pub fn returns_table(&self) -> bool {
        matches!(self, Method::Query | Method::Select | Method::List)
    }

    /// Returns true if the method writes a record.
    pub fn is_write(&self) -> bool {
        matches!(self, Method::Update | Method::Create)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request/response access to the datastore.
pub trait RpcClient {
    /// Calls `method` on `path`.
    fn call(
        &self,
        path: &str,
        method: Method,
        params: Option<DynamicValue>,
    ) -> Result<DynamicValue, TransportError>;
}

impl<T: RpcClient + ?Sized> RpcClient for &T {
    fn call(
        &self,
        path: &str,
        method: Method,
        params: Option<DynamicValue>,
    ) -> Result<DynamicValue, TransportError> {
        (**self).call(path, method, params)
    }
}

/// Receives `(path, signal, param)` for every notification on a subscription.
pub type SignalHandler = Box<dyn FnMut(&str, &str, &DynamicValue)>;

/// Identifies one subscription on a [`ChangeFeed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedHandle(pub u64);

/// Push notifications from the datastore.
pub trait ChangeFeed {
    /// Subscribes `handler` to `signal` on `path` within `topic`.
    fn subscribe(
        &mut self,
        topic: &str,
        path: &str,
        signal: &str,
        handler: SignalHandler,
    ) -> Result<FeedHandle, TransportError>;

    /// Cancels a subscription. Returns true if it existed.
    fn unsubscribe(&mut self, handle: FeedHandle) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Query.to_string(), "query");
        assert_eq!(Method::Create.as_str(), "create");
        assert!(Method::List.returns_table());
        assert!(!Method::Read.returns_table());
        assert!(Method::Update.is_write());
    }

    #[test]
    fn test_method_serde() {
        let method: Method = serde_json::from_str("\"select\"").unwrap();
        assert_eq!(method, Method::Select);
        assert_eq!(serde_json::to_string(&Method::Read).unwrap(), "\"read\"");
    }
}
