//! Derive macros for pgcrud
//!
//! Provides `#[derive(Record)]` and `#[derive(Payload)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;
mod syn_types;

/// Derive both `Record` (row decoding) and `Payload` (column values) for a
/// struct.
///
/// # Example
///
/// ```ignore
/// use pgcrud::Record;
///
/// #[derive(Record)]
/// struct User {
///     id: i64,
///     #[crud(column = "firstName")]
///     first_name: String,
///     email: String,
///     nickname: Option<String>,
///     #[crud(column = "createdAt")]
///     created_at: chrono::NaiveDateTime,
/// }
/// ```
///
/// Fields decode positionally: field `i` reads column `i` of the row, so the
/// field order must match the table's (or the projection's) column order.
///
/// # Attributes
///
/// - `#[crud(column = "name")]` - Map field to a different column name
/// - `#[crud(skip)]` - Read the field but never write it
/// - `#[crud(via = "Type")]` - Decode into `Type`, then convert with
///   `TryFrom<Type>`; write `Type::from(field)`
///
/// Columns named `id` and `createdAt` are never written.
#[proc_macro_derive(Record, attributes(crud))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand_record(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `Payload` only, for insert/update input types that are never read
/// back from a row.
///
/// Accepts the same `#[crud(..)]` field attributes as `Record`.
#[proc_macro_derive(Payload, attributes(crud))]
pub fn derive_payload(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand_payload(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
