//! Record / Payload derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

use crate::attrs::field_attrs;
use crate::syn_types::{Absence, absence};

/// Columns the database assigns; never part of INSERT/UPDATE.
const RESERVED_COLUMNS: &[&str] = &["id", "createdAt"];

struct FieldInfo {
    ident: syn::Ident,
    ty: syn::Type,
    column: String,
    writable: bool,
    via: Option<syn::Type>,
}

fn collect_fields(input: &DeriveInput, derive: &str) -> Result<Vec<FieldInfo>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    format!("{derive} can only be derived for structs with named fields"),
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs"),
            ));
        }
    };

    fields
        .iter()
        .map(|field| {
            let attrs = field_attrs(field)?;
            let ident = field
                .ident
                .clone()
                .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
            let column = attrs.column.unwrap_or_else(|| ident.to_string());
            let writable = !attrs.skip && !RESERVED_COLUMNS.contains(&column.as_str());
            Ok(FieldInfo {
                ident,
                ty: field.ty.clone(),
                column,
                writable,
                via: attrs.via,
            })
        })
        .collect()
}

fn payload_impl(input: &DeriveInput, fields: &[FieldInfo]) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let column_defs = fields.iter().map(|f| {
        let field = f.ident.to_string();
        let column = &f.column;
        let writable = f.writable;
        quote! {
            ::pgcrud::ColumnDef { field: #field, column: #column, writable: #writable }
        }
    });

    let values = fields.iter().filter(|f| f.writable).map(|f| {
        let ident = &f.ident;
        let ty = &f.ty;
        match &f.via {
            Some(via) => quote! {
                ::pgcrud::FieldValue::new(
                    <#via as ::std::convert::From<#ty>>::from(::std::clone::Clone::clone(&self.#ident)),
                    false,
                )
            },
            None => {
                let absent = match absence(ty) {
                    Absence::None => quote! { self.#ident.is_none() },
                    Absence::Empty => quote! { self.#ident.is_empty() },
                    Absence::Never => quote! { false },
                };
                quote! {
                    ::pgcrud::FieldValue::new(::std::clone::Clone::clone(&self.#ident), #absent)
                }
            }
        }
    });

    quote! {
        #[automatically_derived]
        impl #impl_generics ::pgcrud::Payload for #name #ty_generics #where_clause {
            fn columns() -> &'static [::pgcrud::ColumnDef] {
                const COLUMNS: &[::pgcrud::ColumnDef] = &[#(#column_defs),*];
                COLUMNS
            }

            fn values(&self) -> ::std::vec::Vec<::pgcrud::FieldValue> {
                ::std::vec![#(#values),*]
            }
        }
    }
}

fn record_impl(input: &DeriveInput, fields: &[FieldInfo]) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let width = fields.len();
    let decodes = fields.iter().enumerate().map(|(idx, f)| {
        let ident = &f.ident;
        let ty = &f.ty;
        let column = &f.column;
        match &f.via {
            Some(via) => quote! {
                #ident: ::pgcrud::record::decode_via::<#via, #ty>(row, #idx, #column)?
            },
            None => quote! {
                #ident: ::pgcrud::record::decode::<#ty>(row, #idx, #column)?
            },
        }
    });

    quote! {
        #[automatically_derived]
        impl #impl_generics ::pgcrud::Record for #name #ty_generics #where_clause {
            fn from_row(row: &::pgcrud::__private::Row) -> ::pgcrud::CrudResult<Self> {
                ::pgcrud::record::check_width::<Self>(row, #width)?;
                ::std::result::Result::Ok(Self {
                    #(#decodes),*
                })
            }
        }
    }
}

pub(crate) fn expand_record(input: DeriveInput) -> Result<TokenStream> {
    let fields = collect_fields(&input, "Record")?;
    let payload = payload_impl(&input, &fields);
    let record = record_impl(&input, &fields);
    Ok(quote! {
        #payload
        #record
    })
}

pub(crate) fn expand_payload(input: DeriveInput) -> Result<TokenStream> {
    let fields = collect_fields(&input, "Payload")?;
    Ok(payload_impl(&input, &fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive_input(tokens: TokenStream) -> DeriveInput {
        syn::parse2(tokens).unwrap()
    }

    #[test]
    fn reserved_and_skipped_columns_are_not_writable() {
        let input = derive_input(quote! {
            struct User {
                id: i64,
                #[crud(column = "firstName")]
                first_name: String,
                #[crud(skip)]
                password: String,
                #[crud(column = "createdAt")]
                created_at: i64,
            }
        });
        let fields = collect_fields(&input, "Record").unwrap();
        let summary: Vec<(&str, bool)> = fields
            .iter()
            .map(|f| (f.column.as_str(), f.writable))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("id", false),
                ("firstName", true),
                ("password", false),
                ("createdAt", false),
            ]
        );
    }

    #[test]
    fn rejects_tuple_structs_and_enums() {
        let tuple = derive_input(quote! { struct Pair(i32, i32); });
        assert!(expand_record(tuple).is_err());
        let en = derive_input(quote! { enum E { A } });
        assert!(expand_payload(en).is_err());
    }

    #[test]
    fn record_expansion_decodes_every_field_by_position() {
        let input = derive_input(quote! {
            struct Item {
                id: i64,
                #[crud(via = "i64")]
                qty: u32,
            }
        });
        let out: String = expand_record(input)
            .unwrap()
            .to_string()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        assert!(out.contains("check_width::<Self>(row,2usize)?"));
        assert!(!out.contains("ColumnMap"));
        assert!(out.contains(r#"decode::<i64>(row,0usize,"id")"#));
        assert!(out.contains(r#"decode_via::<i64,u32>(row,1usize,"qty")"#));
        assert!(out.contains("::pgcrud::PayloadforItem"));
    }
}
