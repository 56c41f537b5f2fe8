//! `#[crud(..)]` field attribute parsing.

use syn::Result;

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) column: Option<String>,
    pub(crate) skip: bool,
    pub(crate) via: Option<syn::Type>,
}

impl syn::parse::Parse for FieldAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = FieldAttrs::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "skip" => attrs.skip = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    if value.value().is_empty() {
                        return Err(syn::Error::new_spanned(value, "column name cannot be empty"));
                    }
                    attrs.column = Some(value.value());
                }
                "via" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attrs.via = Some(value.parse()?);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        &ident,
                        format!("unknown crud attribute `{other}`"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attrs)
    }
}

/// Merge every `#[crud(..)]` on a field.
pub(crate) fn field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut merged = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("crud") {
            continue;
        }
        let parsed: FieldAttrs = attr.parse_args()?;
        merged.skip |= parsed.skip;
        if parsed.column.is_some() {
            merged.column = parsed.column;
        }
        if parsed.via.is_some() {
            merged.via = parsed.via;
        }
    }
    Ok(merged)
}
