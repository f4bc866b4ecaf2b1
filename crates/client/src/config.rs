//! Mirror configuration.
//!
//! ```json
//! {
//!   "path": "db",
//!   "topic": "event-42",
//!   "signal": "changed",
//!   "query_method": "select",
//!   "query_params": {"sql": "SELECT ... FROM runs JOIN competitors ..."},
//!   "primary": {"name": "runs", "aliases": {"id": "run_id"}},
//!   "secondary": {"name": "competitors", "aliases": {"id": "competitor_id"}},
//!   "naming": "camel_case",
//!   "issuer": "desk-1",
//!   "reload_on_insert": true
//! }
//! ```

use crate::transport::Method;
use mirra_core::FieldNaming;
use mirra_sync::{JoinSpec, ReconcileError, SourceTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One source table of the mirrored join.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub name: String,
    /// Wire column -> composite column, before naming
    pub aliases: BTreeMap<String, String>,
}

impl TableConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: BTreeMap::new(),
        }
    }

    pub fn with_alias(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(column.into(), alias.into());
        self
    }

    fn to_source(&self) -> SourceTable {
        self.aliases
            .iter()
            .fold(SourceTable::new(self.name.clone()), |table, (column, alias)| {
                table.with_alias(column.clone(), alias.clone())
            })
    }
}

/// Everything a [`Mirror`](crate::Mirror) needs to load and follow a join.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Remote path for calls and subscriptions
    pub path: String,
    /// Subscription topic
    pub topic: String,
    /// Signal name carrying change records
    pub signal: String,
    /// Method of the bulk load
    pub query_method: Method,
    /// Parameters of the bulk load, as JSON
    pub query_params: Option<serde_json::Value>,
    pub primary: TableConfig,
    pub secondary: TableConfig,
    pub naming: FieldNaming,
    /// This client's identity, stamped on writes
    pub issuer: String,
    /// Flag a reload when an insert arrives for a tracked table
    pub reload_on_insert: bool,
    /// Drop change records whose issuer is this client
    pub suppress_own_echo: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            topic: String::new(),
            signal: "changed".into(),
            query_method: Method::Query,
            query_params: None,
            primary: TableConfig::default(),
            secondary: TableConfig::default(),
            naming: FieldNaming::Verbatim,
            issuer: String::new(),
            reload_on_insert: false,
            suppress_own_echo: false,
        }
    }
}

impl MirrorConfig {
    /// Creates a configuration for a join of `primary` and `secondary`.
    pub fn new(primary: TableConfig, secondary: TableConfig) -> Self {
        Self {
            primary,
            secondary,
            ..Self::default()
        }
    }

    /// Parses a JSON configuration; absent keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_signal(mut self, signal: impl Into<String>) -> Self {
        self.signal = signal.into();
        self
    }

    pub fn with_query(mut self, method: Method, params: Option<serde_json::Value>) -> Self {
        self.query_method = method;
        self.query_params = params;
        self
    }

    pub fn with_naming(mut self, naming: FieldNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn reload_on_insert(mut self, enabled: bool) -> Self {
        self.reload_on_insert = enabled;
        self
    }

    pub fn suppress_own_echo(mut self, enabled: bool) -> Self {
        self.suppress_own_echo = enabled;
        self
    }

    /// Builds the join the reconciler matches against.
    pub fn join(&self) -> Result<JoinSpec, ReconcileError> {
        JoinSpec::new(self.primary.to_source(), self.secondary.to_source())
    }

    /// Returns true if a change from `issuer` is this client's own echo and
    /// should be dropped.
    pub fn is_own_echo(&self, issuer: &str) -> bool {
        self.suppress_own_echo && !self.issuer.is_empty() && issuer == self.issuer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirra_sync::Side;

    #[test]
    fn test_defaults() {
        let config = MirrorConfig::default();
        assert_eq!(config.signal, "changed");
        assert_eq!(config.query_method, Method::Query);
        assert!(!config.reload_on_insert);
        assert!(!config.suppress_own_echo);
    }

    #[test]
    fn test_from_json() {
        let config = MirrorConfig::from_json(
            r#"{
                "path": "db",
                "topic": "event-42",
                "query_method": "select",
                "query_params": {"sql": "SELECT 1"},
                "primary": {"name": "runs", "aliases": {"id": "run_id"}},
                "secondary": {"name": "competitors"},
                "naming": "camel_case",
                "suppress_own_echo": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.path, "db");
        assert_eq!(config.signal, "changed");
        assert_eq!(config.query_method, Method::Select);
        assert_eq!(config.naming, FieldNaming::CamelCase);
        assert!(config.suppress_own_echo);

        let join = config.join().unwrap();
        assert_eq!(join.source(Side::Primary).alias("id"), Some("run_id"));
        assert_eq!(join.side_of("competitors"), Some(Side::Secondary));
    }

    #[test]
    fn test_from_json_rejects_unknown_method() {
        assert!(MirrorConfig::from_json(r#"{"query_method": "drop"}"#).is_err());
    }

    #[test]
    fn test_builders() {
        let config = MirrorConfig::new(TableConfig::new("runs"), TableConfig::new("competitors"))
            .with_path("db")
            .with_topic("t")
            .with_signal("runs-changed")
            .with_naming(FieldNaming::CamelCase)
            .with_issuer("desk-1")
            .reload_on_insert(true);

        assert_eq!(config.signal, "runs-changed");
        assert!(config.reload_on_insert);
        assert!(config.join().is_ok());
    }

    #[test]
    fn test_own_echo() {
        let config = MirrorConfig::default().with_issuer("desk-1");
        assert!(!config.is_own_echo("desk-1"));

        let config = config.suppress_own_echo(true);
        assert!(config.is_own_echo("desk-1"));
        assert!(!config.is_own_echo("desk-2"));
        assert!(!config.is_own_echo(""));
    }

    #[test]
    fn test_same_table_join_is_rejected() {
        let config = MirrorConfig::new(TableConfig::new("runs"), TableConfig::new("runs"));
        assert!(config.join().is_err());
    }
}
