//! Matching identity between source tables and composite records.
//!
//! A composite record is assembled from one row of a primary table and one
//! row of a secondary table (a run and its competitor). A change names the
//! source table it came from; that name alone decides which of the two ids a
//! composite is matched on.

use crate::composite::Composite;
use crate::error::ReconcileError;
use alloc::borrow::Cow;
use alloc::string::String;
use hashbrown::HashMap;
use mirra_core::FieldNaming;

/// Which source table of a join a composite id comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Primary,
    Secondary,
}

/// A source table taking part in a join.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceTable {
    name: String,
    /// Wire column name -> name it has in the composite, before naming
    aliases: HashMap<String, String>,
}

impl SourceTable {
    /// Creates a source table without aliases.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: HashMap::new(),
        }
    }

    /// Renames a wire column before the naming convention is applied.
    ///
    /// The bulk query of a join usually selects `competitors.id AS
    /// competitor_id`; the alias lets a change to `competitors.id` land on the
    /// same composite field.
    pub fn with_alias(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(column.into(), alias.into());
        self
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the alias of a wire column, if any.
    pub fn alias(&self, column: &str) -> Option<&str> {
        self.aliases.get(column).map(String::as_str)
    }

    /// Maps a wire column of this table to its composite field name.
    pub fn field_name<'a>(&'a self, column: &'a str, naming: FieldNaming) -> Cow<'a, str> {
        let column = self.alias(column).unwrap_or(column);
        naming.rename(column)
    }
}

/// The two source tables behind a composite collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinSpec {
    primary: SourceTable,
    secondary: SourceTable,
}

impl JoinSpec {
    /// Creates a join of two distinct source tables.
    pub fn new(primary: SourceTable, secondary: SourceTable) -> Result<Self, ReconcileError> {
        if primary.name == secondary.name {
            return Err(ReconcileError::AmbiguousJoin {
                table: primary.name,
            });
        }
        Ok(Self { primary, secondary })
    }

    /// Returns the source table on `side`.
    pub fn source(&self, side: Side) -> &SourceTable {
        match side {
            Side::Primary => &self.primary,
            Side::Secondary => &self.secondary,
        }
    }

    /// Returns which side `table` is, if it takes part in the join.
    pub fn side_of(&self, table: &str) -> Option<Side> {
        if table == self.primary.name {
            Some(Side::Primary)
        } else if table == self.secondary.name {
            Some(Side::Secondary)
        } else {
            None
        }
    }

    /// Returns the predicate selecting the composites a change to row `id`
    /// of `table` affects, or `None` when the table is not part of the join.
    pub fn match_predicate(&self, table: &str, id: i64) -> Option<MatchPredicate> {
        self.side_of(table).map(|side| MatchPredicate { side, id })
    }
}

/// Selects composites whose identity on one side equals an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchPredicate {
    pub side: Side,
    pub id: i64,
}

impl MatchPredicate {
    /// Returns true if `composite` is affected.
    #[inline]
    pub fn matches<C: Composite>(&self, composite: &C) -> bool {
        composite.identity(self.side) == self.id
    }
}
