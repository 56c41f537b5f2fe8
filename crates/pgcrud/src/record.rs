//! Column mapping between record types and table rows.
//!
//! Each persisted type registers an ordered list of [`ColumnDef`]s, one per
//! struct field in declaration order, usually through
//! `#[derive(Record)]` / `#[derive(Payload)]`. That single declaration drives
//! every CRUD operation:
//!
//! - outbound (INSERT / UPDATE): [`Payload::values`] yields one [`FieldValue`]
//!   per writable column;
//! - inbound (row decoding): [`Record::from_row`] reads column `i` into
//!   field `i`.
//!
//! # Positional decoding
//!
//! Decoding is by position, not by name. The field order of a record type
//! must match the column order the query returns (`SELECT *` order, or the
//! custom projection of a join). A row of a different width fails with
//! [`CrudError::Decode`]; a same-width row in a different order decodes the
//! wrong columns or fails on a type mismatch.

use crate::error::{CrudError, CrudResult};
use crate::options::SqlArg;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, OnceLock, RwLock};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

/// Columns that are assigned by the database and never written.
pub const RESERVED_COLUMNS: &[&str] = &["id", "createdAt"];

/// Whether `column` is one of [`RESERVED_COLUMNS`].
pub fn is_reserved_column(column: &str) -> bool {
    RESERVED_COLUMNS.contains(&column)
}

/// Mapping of one struct field to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Rust field name.
    pub field: &'static str,
    /// Column name in SQL.
    pub column: &'static str,
    /// Whether the field takes part in INSERT and UPDATE.
    pub writable: bool,
}

/// The outbound value of one writable field.
#[derive(Debug, Clone)]
pub struct FieldValue {
    pub value: SqlArg,
    /// `true` for `None` and for empty strings; such fields are left out of
    /// UPDATE SET clauses. Always `false` for numbers, booleans, timestamps.
    pub absent: bool,
}

impl FieldValue {
    pub fn new<T>(value: T, absent: bool) -> Self
    where
        T: ToSql + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(value),
            absent,
        }
    }
}

/// Write side of the column mapping.
///
/// Implement with `#[derive(Payload)]` (or `#[derive(Record)]`, which
/// implements both traits).
pub trait Payload: Send + Sync + 'static {
    /// Every field, in declaration order.
    fn columns() -> &'static [ColumnDef];

    /// One value per column with `writable == true`, in declaration order.
    fn values(&self) -> Vec<FieldValue>;
}

/// Read side of the column mapping.
pub trait Record: Payload + Sized {
    /// Decode a row positionally: column `i` into field `i`.
    fn from_row(row: &Row) -> CrudResult<Self>;
}

/// Per-type mapping metadata derived from [`Payload::columns`].
///
/// Built once per type and memoized for the life of the process; see
/// [`ColumnMap::of`].
#[derive(Debug)]
pub struct ColumnMap {
    columns: &'static [ColumnDef],
    /// `(index into Payload::values(), column)` for every column that is
    /// actually written.
    slots: Vec<(usize, &'static str)>,
    /// Number of values `Payload::values` must return.
    value_count: usize,
}

type ColumnMapCache = RwLock<HashMap<TypeId, Arc<ColumnMap>>>;

static COLUMN_MAPS: OnceLock<ColumnMapCache> = OnceLock::new();

impl ColumnMap {
    /// Derive the mapping from a column list.
    ///
    /// Reserved columns are dropped from the write set even when a
    /// hand-written descriptor marks them writable.
    pub fn build(columns: &'static [ColumnDef]) -> Self {
        let slots: Vec<(usize, &'static str)> = columns
            .iter()
            .filter(|def| def.writable)
            .enumerate()
            .filter(|(_, def)| !is_reserved_column(def.column))
            .map(|(i, def)| (i, def.column))
            .collect();
        let value_count = columns.iter().filter(|def| def.writable).count();

        Self {
            columns,
            slots,
            value_count,
        }
    }

    /// The memoized mapping of `P`, built on first use.
    pub fn of<P: Payload>() -> Arc<ColumnMap> {
        let cache = COLUMN_MAPS.get_or_init(|| RwLock::new(HashMap::new()));
        let key = TypeId::of::<P>();

        if let Some(map) = cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return Arc::clone(map);
        }

        let built = Arc::new(ColumnMap::build(P::columns()));
        let mut maps = cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(maps.entry(key).or_insert(built))
    }

    /// All columns, in declaration order.
    pub fn columns(&self) -> &'static [ColumnDef] {
        self.columns
    }

    /// Number of fields, i.e. the row width a record type decodes.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Columns written by INSERT/UPDATE, in declaration order.
    pub fn writable_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|(_, column)| *column)
    }

    /// Pair each written column with its value from `Payload::values`.
    pub fn pair_values(
        &self,
        values: Vec<FieldValue>,
    ) -> CrudResult<Vec<(&'static str, FieldValue)>> {
        if values.len() != self.value_count {
            return Err(CrudError::validation(format!(
                "payload produced {} values for {} writable columns",
                values.len(),
                self.value_count
            )));
        }
        let mut values: Vec<Option<FieldValue>> = values.into_iter().map(Some).collect();
        Ok(self
            .slots
            .iter()
            .filter_map(|&(i, column)| values[i].take().map(|value| (column, value)))
            .collect())
    }
}

/// Fail unless `row` has exactly `expected` columns, the field count of `R`.
///
/// Derived `from_row` impls pass the field count as a constant.
pub fn check_width<R: Record>(row: &Row, expected: usize) -> CrudResult<()> {
    if row.len() != expected {
        return Err(CrudError::decode(
            "*",
            format!(
                "row has {} columns but {} declares {} fields",
                row.len(),
                std::any::type_name::<R>(),
                expected
            ),
        ));
    }
    Ok(())
}

/// Decode column `idx` of `row` directly into the field type.
pub fn decode<T>(row: &Row, idx: usize, column: &str) -> CrudResult<T>
where
    T: for<'a> FromSql<'a>,
{
    row.try_get(idx)
        .map_err(|e| CrudError::decode(column, e.to_string()))
}

/// Decode column `idx` into a temporary `V`, then convert it into the field
/// type once the value has been read.
pub fn decode_via<V, T>(row: &Row, idx: usize, column: &str) -> CrudResult<T>
where
    V: for<'a> FromSql<'a>,
    T: TryFrom<V>,
    <T as TryFrom<V>>::Error: Display,
{
    let holder: V = decode(row, idx, column)?;
    T::try_from(holder).map_err(|e| CrudError::decode(column, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_COLUMNS: &[ColumnDef] = &[
        ColumnDef { field: "id", column: "id", writable: false },
        ColumnDef { field: "first_name", column: "firstName", writable: true },
        ColumnDef { field: "email", column: "email", writable: true },
        ColumnDef { field: "password", column: "password", writable: false },
        ColumnDef { field: "created_at", column: "createdAt", writable: false },
    ];

    #[test]
    fn build_keeps_declaration_order_of_writable_columns() {
        let map = ColumnMap::build(USER_COLUMNS);
        assert_eq!(map.width(), 5);
        assert_eq!(
            map.writable_columns().collect::<Vec<_>>(),
            vec!["firstName", "email"]
        );
    }

    #[test]
    fn build_drops_reserved_columns_marked_writable() {
        const SLOPPY: &[ColumnDef] = &[
            ColumnDef { field: "id", column: "id", writable: true },
            ColumnDef { field: "name", column: "name", writable: true },
            ColumnDef { field: "created", column: "createdAt", writable: true },
        ];
        let map = ColumnMap::build(SLOPPY);
        assert_eq!(map.writable_columns().collect::<Vec<_>>(), vec!["name"]);

        let paired = map
            .pair_values(vec![
                FieldValue::new(7_i64, false),
                FieldValue::new("widget".to_string(), false),
                FieldValue::new(0_i64, false),
            ])
            .unwrap();
        assert_eq!(paired.len(), 1);
        assert_eq!(paired[0].0, "name");
    }

    #[test]
    fn pair_values_rejects_wrong_value_count() {
        let map = ColumnMap::build(USER_COLUMNS);
        let err = map
            .pair_values(vec![FieldValue::new("x".to_string(), false)])
            .unwrap_err();
        assert!(matches!(err, CrudError::Validation(_)));
    }

    struct Account;

    impl Payload for Account {
        fn columns() -> &'static [ColumnDef] {
            USER_COLUMNS
        }

        fn values(&self) -> Vec<FieldValue> {
            Vec::new()
        }
    }

    #[test]
    fn of_memoizes_per_type() {
        let a = ColumnMap::of::<Account>();
        let b = ColumnMap::of::<Account>();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.value_count, 2);
    }

    #[test]
    fn reserved_columns_are_id_and_created_at() {
        assert!(is_reserved_column("id"));
        assert!(is_reserved_column("createdAt"));
        assert!(!is_reserved_column("created_at"));
        assert!(!is_reserved_column("email"));
    }
}
