//! Mirra client - keeps a local join of two remote tables current.
//!
//! The client loads the join once over an [`RpcClient`], then follows the
//! server's change feed and reconciles each change record into an observable
//! collection. Transport is left to the embedder: implement [`RpcClient`] for
//! request/response calls and feed decoded notifications to a
//! [`SignalRouter`] (or any other [`ChangeFeed`]).
//!
//! # Core Components
//!
//! - `MirrorConfig`: what to load, which signal to follow, how to name fields
//! - `Mirror`: the mirrored collection and its signal handling
//! - `SignalRouter`: in-process fan-out of notifications
//! - `Run`: a typed composite for start lists
//!
//! # Example
//!
//! ```
//! use mirra_client::{
//!     json, Method, Mirror, MirrorConfig, RpcClient, Run, SignalRouter, TableConfig,
//!     TransportError,
//! };
//! use mirra_core::DynamicValue;
//! use mirra_sync::ChangeRecord;
//!
//! struct Server;
//!
//! impl RpcClient for Server {
//!     fn call(
//!         &self,
//!         _path: &str,
//!         _method: Method,
//!         _params: Option<DynamicValue>,
//!     ) -> Result<DynamicValue, TransportError> {
//!         Ok(json::parse(
//!             r#"{"fields": [{"name": "run_id"}, {"name": "competitor_id"}, {"name": "first_name"}],
//!                 "rows": [[1, 7, "Jane"], [2, 7, "Jane"]]}"#,
//!         )
//!         .unwrap())
//!     }
//! }
//!
//! let config = MirrorConfig::new(TableConfig::new("runs"), TableConfig::new("competitors"))
//!     .with_path("db")
//!     .with_topic("event-42");
//! let mirror = Mirror::new(config, Run::from_record).unwrap();
//! mirror.reload(&Server).unwrap();
//!
//! let mut router = SignalRouter::new();
//! mirror.subscribe(&mut router).unwrap();
//!
//! let change = ChangeRecord::update("competitors", 7).with_field("first_name", "Janet");
//! router.deliver("event-42", "db", "changed", &change.to_value());
//!
//! assert!(mirror.collection().with(|runs| runs.iter().all(|r| r.first_name == "Janet")));
//! ```

pub mod config;
pub mod error;
pub mod json;
pub mod loader;
pub mod mirror;
pub mod router;
pub mod run;
pub mod transport;

pub use config::{MirrorConfig, TableConfig};
pub use error::{LoadError, SignalError, TransportError};
pub use loader::{load_record, load_table, write_record};
pub use mirror::{Builder, Mirror, SignalOutcome};
pub use router::SignalRouter;
pub use run::Run;
pub use transport::{ChangeFeed, FeedHandle, Method, RpcClient, SignalHandler};
