//! Property-based tests for reconciliation.
//!
//! Collections are runs joined with competitors: run ids are unique,
//! competitor ids repeat, so a competitor change fans out to several runs.

use mirra_core::{Cell, FieldNaming, Record};
use mirra_sync::{
    ChangeRecord, Composite, CompositeRecord, JoinSpec, Outcome, Reconciler, Side, SourceTable,
};
use proptest::prelude::*;

const RUNS: &str = "runs";
const COMPETITORS: &str = "competitors";

fn reconciler() -> Reconciler {
    let join = JoinSpec::new(
        SourceTable::new(RUNS).with_alias("id", "run_id"),
        SourceTable::new(COMPETITORS).with_alias("id", "competitor_id"),
    )
    .unwrap();
    Reconciler::new(join, FieldNaming::CamelCase)
}

/// Strategy for a collection with unique run ids and competitor ids in 0..8.
fn collection_strategy(max_len: usize) -> impl Strategy<Value = Vec<CompositeRecord>> {
    prop::collection::vec((0i64..8, 0i64..100), 0..max_len).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (competitor, bib))| {
                let run = i as i64;
                let fields: Record = [
                    ("runId", Cell::from(run)),
                    ("competitorId", Cell::from(competitor)),
                    ("bib", Cell::from(bib)),
                    ("club", Cell::Null),
                ]
                .into_iter()
                .collect();
                CompositeRecord::new(run, competitor, fields)
            })
            .collect()
    })
}

/// Strategy for a source table name and the side it maps to.
fn table_strategy() -> impl Strategy<Value = (&'static str, Side)> {
    prop_oneof![Just((RUNS, Side::Primary)), Just((COMPETITORS, Side::Secondary))]
}

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Null),
        any::<i64>().prop_map(Cell::from),
        "[a-z]{0,8}".prop_map(Cell::Text),
    ]
}

proptest! {
    /// Property: an update touches exactly the composites whose identity on
    /// the change's side equals the id, in place.
    #[test]
    fn update_hits_exactly_matching(
        items in collection_strategy(30),
        (table, side) in table_strategy(),
        id in 0i64..10,
        value in cell_strategy(),
    ) {
        let mut updated = items.clone();
        let change = ChangeRecord::update(table, id).with_field("club", value.clone());
        let applied = reconciler().apply(&mut updated, &change).unwrap();

        let expected = items.iter().filter(|c| c.identity(side) == id).count();
        if expected == 0 {
            prop_assert_eq!(applied.outcome, Outcome::Unmatched);
        } else {
            prop_assert_eq!(applied.outcome, Outcome::Updated(expected));
        }
        prop_assert_eq!(updated.len(), items.len());
        for (before, after) in items.iter().zip(&updated) {
            prop_assert_eq!(before.primary_id(), after.primary_id());
            if before.identity(side) == id {
                prop_assert_eq!(after.get("club"), Some(&value));
            } else {
                prop_assert_eq!(before, after);
            }
        }
    }

    /// Property: a delete removes exactly the matching composites and keeps
    /// the order of the rest.
    #[test]
    fn delete_removes_exactly_matching(
        items in collection_strategy(30),
        (table, side) in table_strategy(),
        id in 0i64..10,
    ) {
        let mut remaining = items.clone();
        let applied = reconciler()
            .apply(&mut remaining, &ChangeRecord::delete(table, id))
            .unwrap();

        let kept: Vec<_> = items.iter().filter(|c| c.identity(side) != id).cloned().collect();
        let removed: Vec<_> = items.iter().filter(|c| c.identity(side) == id).cloned().collect();
        prop_assert_eq!(&remaining, &kept);
        prop_assert_eq!(&applied.changes.removed, &removed);
    }

    /// Property: a change for an id no composite carries is a no-op.
    #[test]
    fn unmatched_change_is_noop(
        items in collection_strategy(30),
        (table, _side) in table_strategy(),
        delete in any::<bool>(),
    ) {
        let mut after = items.clone();
        let change = if delete {
            ChangeRecord::delete(table, 1_000)
        } else {
            ChangeRecord::update(table, 1_000).with_field("bib", 1i64)
        };
        let applied = reconciler().apply(&mut after, &change).unwrap();

        prop_assert_eq!(applied.outcome, Outcome::Unmatched);
        prop_assert!(applied.changes.is_empty());
        prop_assert_eq!(after, items);
    }

    /// Property: applying the same update twice equals applying it once.
    #[test]
    fn duplicate_update_is_idempotent(
        items in collection_strategy(30),
        (table, _side) in table_strategy(),
        id in 0i64..10,
        value in cell_strategy(),
    ) {
        let reconciler = reconciler();
        let change = ChangeRecord::update(table, id).with_field("club", value);

        let mut once = items.clone();
        reconciler.apply(&mut once, &change).unwrap();
        let mut twice = once.clone();
        let applied = reconciler.apply(&mut twice, &change).unwrap();

        prop_assert_eq!(&twice, &once);
        for (old, new) in &applied.changes.modified {
            prop_assert_eq!(old, new);
        }
    }

    /// Property: updates writing disjoint fields commute.
    #[test]
    fn disjoint_updates_commute(
        items in collection_strategy(30),
        (table_a, _a) in table_strategy(),
        (table_b, _b) in table_strategy(),
        id_a in 0i64..10,
        id_b in 0i64..10,
        value_a in cell_strategy(),
        value_b in cell_strategy(),
    ) {
        let reconciler = reconciler();
        let a = ChangeRecord::update(table_a, id_a).with_field("club", value_a);
        let b = ChangeRecord::update(table_b, id_b).with_field("bib", value_b);

        let mut ab = items.clone();
        reconciler.apply(&mut ab, &a).unwrap();
        reconciler.apply(&mut ab, &b).unwrap();

        let mut ba = items;
        reconciler.apply(&mut ba, &b).unwrap();
        reconciler.apply(&mut ba, &a).unwrap();

        prop_assert_eq!(ab, ba);
    }

    /// Property: updates to different rows of the same table commute even
    /// when they write the same field.
    #[test]
    fn updates_to_distinct_rows_commute(
        items in collection_strategy(30),
        (table, _side) in table_strategy(),
        ids in (0i64..10, 0i64..10).prop_filter("distinct ids", |(a, b)| a != b),
        value_a in cell_strategy(),
        value_b in cell_strategy(),
    ) {
        let reconciler = reconciler();
        let a = ChangeRecord::update(table, ids.0).with_field("club", value_a);
        let b = ChangeRecord::update(table, ids.1).with_field("club", value_b);

        let mut ab = items.clone();
        reconciler.apply(&mut ab, &a).unwrap();
        reconciler.apply(&mut ab, &b).unwrap();

        let mut ba = items;
        reconciler.apply(&mut ba, &b).unwrap();
        reconciler.apply(&mut ba, &a).unwrap();

        prop_assert_eq!(ab, ba);
    }
}

#[test]
fn documented_join_scenario() {
    // Two runs by competitor 7, one by competitor 8.
    let fields = |run: i64, competitor: i64, name: &str| -> Record {
        [
            ("runId", Cell::from(run)),
            ("competitorId", Cell::from(competitor)),
            ("firstName", Cell::from(name)),
        ]
        .into_iter()
        .collect()
    };
    let mut items = vec![
        CompositeRecord::new(1, 7, fields(1, 7, "Jane")),
        CompositeRecord::new(2, 8, fields(2, 8, "Joe")),
        CompositeRecord::new(3, 7, fields(3, 7, "Jane")),
    ];
    let reconciler = reconciler();

    let rename = ChangeRecord::update(COMPETITORS, 7).with_field("first_name", "Janet");
    let applied = reconciler.apply(&mut items, &rename).unwrap();
    assert_eq!(applied.outcome, Outcome::Updated(2));

    let drop_run = ChangeRecord::delete(RUNS, 2);
    reconciler.apply(&mut items, &drop_run).unwrap();

    let names: Vec<_> = items
        .iter()
        .map(|c| c.get("firstName").and_then(Cell::as_str).unwrap_or_default())
        .collect();
    assert_eq!(names, ["Janet", "Janet"]);
}

#[test]
fn update_via_each_id_space() {
    let fields: Record = [
        ("runId", Cell::from(7i64)),
        ("competitorId", Cell::from(42i64)),
        ("siId", Cell::Null),
        ("firstName", Cell::from("")),
        ("lastName", Cell::from("Doe")),
    ]
    .into_iter()
    .collect();
    let original = CompositeRecord::new(7, 42, fields);
    let mut items = vec![original.clone()];
    let reconciler = reconciler();

    let by_run = ChangeRecord::update(RUNS, 7).with_field("siId", 99i64);
    assert_eq!(reconciler.apply(&mut items, &by_run).unwrap().outcome, Outcome::Updated(1));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].get("siId"), Some(&Cell::from(99i64)));
    for name in ["runId", "competitorId", "firstName", "lastName"] {
        assert_eq!(items[0].get(name), original.get(name));
    }

    let by_competitor = ChangeRecord::update(COMPETITORS, 42).with_field("firstName", "Jane");
    assert_eq!(
        reconciler.apply(&mut items, &by_competitor).unwrap().outcome,
        Outcome::Updated(1)
    );
    assert_eq!(items[0].get("firstName"), Some(&Cell::from("Jane")));
    assert_eq!(items[0].get("siId"), Some(&Cell::from(99i64)));
    assert_eq!(items[0].get("lastName"), Some(&Cell::from("Doe")));
}

#[test]
fn update_with_unheld_column_keeps_shape() {
    let fields: Record = [
        ("runId", Cell::from(1i64)),
        ("competitorId", Cell::from(7i64)),
        ("firstName", Cell::from("Jane")),
    ]
    .into_iter()
    .collect();
    let mut items = vec![CompositeRecord::new(1, 7, fields)];

    let change = ChangeRecord::update(COMPETITORS, 7)
        .with_field("first_name", "Janet")
        .with_field("club", "OK Linne");
    reconciler().apply(&mut items, &change).unwrap();

    assert_eq!(items[0].fields().len(), 3);
    assert_eq!(items[0].get("club"), None);
    assert_eq!(items[0].get("firstName"), Some(&Cell::from("Janet")));
}
