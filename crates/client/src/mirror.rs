//! A locally held join, kept current from change notifications.
//!
//! `Mirror` ties the pieces together: a bulk load fills an
//! [`ObservableCollection`] once, then every change record delivered on the
//! subscription is parsed and handed to the [`Reconciler`]. Application code
//! reads and watches the collection; it never sees the wire.
//!
//! A notification that arrives while the collection is being observed (for
//! example from inside a subscriber) is queued by the collection and applied
//! once that observation ends.

use crate::config::MirrorConfig;
use crate::error::{LoadError, SignalError, TransportError};
use crate::json;
use crate::loader;
use crate::transport::{ChangeFeed, FeedHandle, RpcClient};
use mirra_core::{DynamicValue, Record, TableAccessor};
use mirra_reactive::{ChangeSet, ObservableCollection, UpdateStatus};
use mirra_sync::{
    parse_change, ChangeRecord, Composite, FieldError, Outcome, ReconcileError, Reconciler,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Turns one loaded record into a composite.
pub type Builder<C> = Rc<dyn Fn(&Record) -> Result<C, FieldError>>;

/// What happened to a change notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The change was applied now.
    Applied(Outcome),
    /// The collection was being observed; the change runs when that ends.
    Deferred,
    /// The change came from this client and was dropped.
    Echo,
}

#[derive(Default)]
struct MirrorState {
    closed: Cell<bool>,
    reload_pending: Cell<bool>,
    feed: Cell<Option<FeedHandle>>,
}

/// A mirrored, observable collection of composites.
///
/// Cloning yields another handle to the same mirror.
pub struct Mirror<C: Composite + 'static> {
    config: Rc<MirrorConfig>,
    reconciler: Rc<Reconciler>,
    collection: ObservableCollection<C>,
    build: Builder<C>,
    state: Rc<MirrorState>,
}

impl<C: Composite + 'static> Clone for Mirror<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            reconciler: self.reconciler.clone(),
            collection: self.collection.clone(),
            build: self.build.clone(),
            state: self.state.clone(),
        }
    }
}

impl<C: Composite + 'static> Mirror<C> {
    /// Creates an empty mirror.
    pub fn new<F>(config: MirrorConfig, build: F) -> Result<Self, ReconcileError>
    where
        F: Fn(&Record) -> Result<C, FieldError> + 'static,
    {
        let reconciler = Reconciler::new(config.join()?, config.naming);
        Ok(Self {
            config: Rc::new(config),
            reconciler: Rc::new(reconciler),
            collection: ObservableCollection::default(),
            build: Rc::new(build),
            state: Rc::new(MirrorState::default()),
        })
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Returns the mirrored collection.
    #[inline]
    pub fn collection(&self) -> &ObservableCollection<C> {
        &self.collection
    }

    /// Returns true if an insert arrived since the last load and
    /// `reload_on_insert` is set.
    #[inline]
    pub fn reload_pending(&self) -> bool {
        self.state.reload_pending.get()
    }

    /// Returns true once the mirror has been torn down.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state.closed.get()
    }

    /// Loads the join from scratch and replaces the collection.
    ///
    /// On error the collection keeps its previous contents. Returns the
    /// number of composites loaded. Inside an observation cycle the new
    /// contents are queued and land when the cycle ends; see
    /// [`ObservableCollection::pending_updates`].
    pub fn reload(&self, client: &dyn RpcClient) -> Result<usize, LoadError> {
        let config = &self.config;
        let params = config.query_params.as_ref().map(json::to_dynamic);
        let table = loader::load_table(client, &config.path, config.query_method, params)?;
        let accessor = TableAccessor::with_naming(table, config.naming);

        let mut items = Vec::with_capacity(accessor.row_count());
        for (row, record) in accessor.records().enumerate() {
            let item = (self.build)(&record).map_err(|source| {
                tracing::warn!(path = %config.path, row, error = %source, "row rejected by builder");
                LoadError::Build { row, source }
            })?;
            items.push(item);
        }

        let count = items.len();
        self.state.reload_pending.set(false);
        match self.collection.replace(items) {
            UpdateStatus::Applied => {
                tracing::debug!(path = %config.path, rows = count, "mirror loaded");
            }
            UpdateStatus::Deferred => {
                tracing::debug!(path = %config.path, rows = count, "mirror load queued until observation ends");
            }
        }
        Ok(count)
    }

    /// Handles one notification parameter.
    ///
    /// Malformed records are rejected without affecting the collection or
    /// the subscription.
    pub fn handle_signal(&self, param: &DynamicValue) -> Result<SignalOutcome, SignalError> {
        if self.is_closed() {
            tracing::debug!(path = %self.config.path, "signal after teardown refused");
            return Err(SignalError::Closed);
        }
        let change = parse_change(param).inspect_err(|err| {
            tracing::warn!(path = %self.config.path, error = %err, "malformed change record");
        })?;
        self.handle_change(change)
    }

    /// Applies an already parsed change.
    pub fn handle_change(&self, change: ChangeRecord) -> Result<SignalOutcome, SignalError> {
        if self.is_closed() {
            return Err(SignalError::Closed);
        }
        if self.config.is_own_echo(&change.issuer) {
            tracing::trace!(table = %change.table, id = change.id, "own echo dropped");
            return Ok(SignalOutcome::Echo);
        }

        let slot: Rc<RefCell<Option<Result<Outcome, ReconcileError>>>> = Rc::default();
        let reconciler = self.reconciler.clone();
        let state = self.state.clone();
        let reload_on_insert = self.config.reload_on_insert;
        let result = slot.clone();
        let status = self.collection.update(move |items: &mut Vec<C>| {
            match reconciler.apply(items, &change) {
                Ok(applied) => {
                    if applied.outcome == Outcome::InsertDeferred && reload_on_insert {
                        state.reload_pending.set(true);
                    }
                    *result.borrow_mut() = Some(Ok(applied.outcome));
                    applied.into_changes()
                }
                Err(err) => {
                    tracing::warn!(table = %change.table, id = change.id, error = %err, "change rejected");
                    *result.borrow_mut() = Some(Err(err));
                    ChangeSet::new()
                }
            }
        });

        match status {
            UpdateStatus::Deferred => Ok(SignalOutcome::Deferred),
            UpdateStatus::Applied => match slot.borrow_mut().take() {
                Some(Ok(outcome)) => Ok(SignalOutcome::Applied(outcome)),
                Some(Err(err)) => Err(err.into()),
                None => Ok(SignalOutcome::Deferred),
            },
        }
    }

    /// Subscribes the mirror to its configured topic, path and signal.
    pub fn subscribe(&self, feed: &mut dyn ChangeFeed) -> Result<FeedHandle, TransportError> {
        let mirror = self.clone();
        let handle = feed.subscribe(
            &self.config.topic,
            &self.config.path,
            &self.config.signal,
            Box::new(move |_path: &str, _signal: &str, param: &DynamicValue| {
                // Errors are logged where they occur; the subscription stays up.
                let _ = mirror.handle_signal(param);
            }),
        )?;
        self.state.feed.set(Some(handle));
        self.state.closed.set(false);
        Ok(handle)
    }

    /// Stops following changes. Later signals are refused with
    /// [`SignalError::Closed`].
    pub fn teardown(&self, feed: &mut dyn ChangeFeed) {
        self.state.closed.set(true);
        if let Some(handle) = self.state.feed.take() {
            feed.unsubscribe(handle);
        }
        tracing::info!(topic = %self.config.topic, path = %self.config.path, "mirror closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::router::SignalRouter;
    use crate::run::Run;
    use mirra_core::{Cell as DataCell, FieldNaming};
    use serde_json::json;

    struct Fixed(DynamicValue);

    impl RpcClient for Fixed {
        fn call(
            &self,
            _path: &str,
            _method: crate::transport::Method,
            _params: Option<DynamicValue>,
        ) -> Result<DynamicValue, TransportError> {
            Ok(self.0.clone())
        }
    }

    fn config() -> MirrorConfig {
        MirrorConfig::new(
            TableConfig::new("runs").with_alias("id", "run_id"),
            TableConfig::new("competitors").with_alias("id", "competitor_id"),
        )
        .with_path("db")
        .with_topic("event")
        .with_naming(FieldNaming::CamelCase)
        .with_issuer("desk-1")
    }

    fn server() -> Fixed {
        Fixed(json::to_dynamic(&json!({
            "fields": [
                {"name": "run_id"}, {"name": "competitor_id"},
                {"name": "first_name"}, {"name": "start_time"}
            ],
            "rows": [[1, 7, "Jane", null], [2, 8, "Joe", null], [3, 7, "Jane", null]],
        })))
    }

    fn loaded(config: MirrorConfig) -> Mirror<Run> {
        let mirror = Mirror::new(config, Run::from_record).unwrap();
        assert_eq!(mirror.reload(&server()).unwrap(), 3);
        mirror
    }

    #[test]
    fn test_reload_builds_collection() {
        let mirror = loaded(config());
        let runs = mirror.collection().snapshot();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].first_name, "Joe");
        assert_eq!(runs[2].competitor_id, 7);
    }

    #[test]
    fn test_reload_while_observed_is_queued() {
        let mirror = Mirror::new(config(), Run::from_record).unwrap();
        let handle = mirror.clone();

        let seen = mirror.collection().with(|runs| {
            assert_eq!(handle.reload(&server()).unwrap(), 3);
            assert_eq!(handle.collection().pending_updates(), 1);
            runs.len()
        });

        assert_eq!(seen, 0);
        assert_eq!(mirror.collection().pending_updates(), 0);
        assert_eq!(mirror.collection().len(), 3);
    }

    #[test]
    fn test_reload_error_keeps_collection() {
        let mirror = loaded(config());
        let bad = Fixed(DynamicValue::named_map([("rows", DynamicValue::List(Vec::new()))]));
        assert!(matches!(mirror.reload(&bad), Err(LoadError::Validation(_))));
        assert_eq!(mirror.collection().len(), 3);
    }

    #[test]
    fn test_reload_build_error_names_row() {
        let mirror = Mirror::new(config(), Run::from_record).unwrap();
        let server = Fixed(json::to_dynamic(&json!({
            "fields": [{"name": "run_id"}, {"name": "competitor_id"}],
            "rows": [[1, 7], [2, "x"]],
        })));
        let err = mirror.reload(&server).unwrap_err();
        assert!(matches!(err, LoadError::Build { row: 1, .. }));
        assert!(mirror.collection().is_empty());
    }

    #[test]
    fn test_handle_signal_updates_secondary() {
        let mirror = loaded(config());
        let change = ChangeRecord::update("competitors", 7).with_field("first_name", "Janet");

        let outcome = mirror.handle_signal(&change.to_value()).unwrap();

        assert_eq!(outcome, SignalOutcome::Applied(Outcome::Updated(2)));
        let names: Vec<String> = mirror
            .collection()
            .snapshot()
            .into_iter()
            .map(|r| r.first_name)
            .collect();
        assert_eq!(names, ["Janet", "Joe", "Janet"]);
    }

    #[test]
    fn test_handle_signal_rejects_malformed() {
        let mirror = loaded(config());
        let err = mirror
            .handle_signal(&DynamicValue::named_map([("table", "runs")]))
            .unwrap_err();
        assert!(matches!(err, SignalError::Protocol(_)));
        assert_eq!(mirror.collection().len(), 3);
    }

    #[test]
    fn test_handle_signal_rejected_field_is_atomic() {
        let mirror = loaded(config());
        let before = mirror.collection().snapshot();
        let change = ChangeRecord::update("competitors", 7).with_field("start_time", "soon");

        let err = mirror.handle_signal(&change.to_value()).unwrap_err();

        assert!(matches!(err, SignalError::Reconcile(ReconcileError::Field(_))));
        assert_eq!(mirror.collection().snapshot(), before);
    }

    #[test]
    fn test_insert_flags_reload() {
        let mirror = loaded(config().reload_on_insert(true));
        let outcome = mirror
            .handle_change(ChangeRecord::insert("runs", 4))
            .unwrap();
        assert_eq!(outcome, SignalOutcome::Applied(Outcome::InsertDeferred));
        assert!(mirror.reload_pending());

        mirror.reload(&server()).unwrap();
        assert!(!mirror.reload_pending());
    }

    #[test]
    fn test_own_echo_suppression_is_opt_in() {
        let change = ChangeRecord::delete("runs", 1).with_issuer("desk-1");

        let mirror = loaded(config());
        assert_eq!(
            mirror.handle_change(change.clone()).unwrap(),
            SignalOutcome::Applied(Outcome::Removed(1))
        );

        let mirror = loaded(config().suppress_own_echo(true));
        assert_eq!(mirror.handle_change(change).unwrap(), SignalOutcome::Echo);
        assert_eq!(mirror.collection().len(), 3);
    }

    #[test]
    fn test_signal_from_observer_is_deferred() {
        let mirror = loaded(config());
        let handle = mirror.clone();
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let outcomes_clone = outcomes.clone();

        // A subscriber reacting to the first change issues a second one.
        mirror.collection().subscribe(move |changes: &ChangeSet<Run>| {
            if changes.removed.iter().any(|r| r.run_id == 2) {
                let outcome = handle
                    .handle_change(ChangeRecord::update("runs", 1).with_field("start_time", DataCell::Timestamp(9)))
                    .unwrap();
                outcomes_clone.borrow_mut().push(outcome);
            }
        });

        let outcome = mirror.handle_change(ChangeRecord::delete("runs", 2)).unwrap();

        assert_eq!(outcome, SignalOutcome::Applied(Outcome::Removed(1)));
        assert_eq!(*outcomes.borrow(), vec![SignalOutcome::Deferred]);
        let runs = mirror.collection().snapshot();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].start_time, Some(9));
    }

    #[test]
    fn test_subscribe_and_teardown() {
        let mirror = loaded(config());
        let mut router = SignalRouter::new();
        mirror.subscribe(&mut router).unwrap();

        let change = ChangeRecord::delete("runs", 3).to_value();
        assert_eq!(router.deliver("event", "db", "changed", &change), 1);
        assert_eq!(mirror.collection().len(), 2);

        // Malformed payloads do not end the subscription.
        router.deliver("event", "db", "changed", &DynamicValue::Null);
        let change = ChangeRecord::delete("runs", 2).to_value();
        router.deliver("event", "db", "changed", &change);
        assert_eq!(mirror.collection().len(), 1);

        mirror.teardown(&mut router);
        assert!(router.is_empty());
        assert_eq!(
            mirror.handle_signal(&ChangeRecord::delete("runs", 1).to_value()),
            Err(SignalError::Closed)
        );
        assert_eq!(mirror.collection().len(), 1);
    }
}
