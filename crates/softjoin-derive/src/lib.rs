//! Derive macro for entity metadata.
//!
//! This crate provides `#[derive(Model)]`, which implements
//! `softjoin_orm::Model` from attributes on the struct. Soft-delete support is
//! declared here, once, instead of being discovered at join time.

use heck::ToSnakeCase;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Ident, Lit};

/// Derives `softjoin_orm::Model` for a struct.
///
/// # Attributes
///
/// - `#[model(table = "table_name")]` - SQL table name (optional, defaults to
///   the pluralized snake_case of the struct name)
/// - `#[model(name = "Name")]` - Entity name used by the naming convention
///   (optional, defaults to the struct name)
/// - `#[model(namespace = "billing")]` - Relation namespace the entity is
///   registered under
/// - `#[model(soft_deletes)]` - The entity is soft-deletable
/// - `#[model(deleted_at = "column")]` - Deleted-at column (requires
///   `soft_deletes`, defaults to `deleted_at`)
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_model_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_model_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    if !matches!(input.data, Data::Struct(_)) {
        return Err(syn::Error::new_spanned(
            &input,
            "Model derive only supports structs",
        ));
    }

    let ident = &input.ident;
    let attrs = parse_model_attrs(&input.attrs, ident)?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let name = attrs.name.unwrap_or_else(|| ident.to_string());
    let table = attrs
        .table
        .unwrap_or_else(|| pluralize(&ident.to_string().to_snake_case()));
    let namespace = match attrs.namespace {
        Some(ns) => quote! { Some(#ns) },
        None => quote! { None },
    };
    let soft_deletes = attrs.soft_deletes;
    let deleted_at = attrs
        .deleted_at
        .unwrap_or_else(|| String::from("deleted_at"));

    Ok(quote! {
        impl #impl_generics ::softjoin_orm::Model for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
            const TABLE: &'static str = #table;
            const NAMESPACE: Option<&'static str> = #namespace;
            const SOFT_DELETES: bool = #soft_deletes;
            const DELETED_AT: &'static str = #deleted_at;
        }
    })
}

#[derive(Default)]
struct ModelAttrs {
    name: Option<String>,
    table: Option<String>,
    namespace: Option<String>,
    soft_deletes: bool,
    deleted_at: Option<String>,
}

fn parse_model_attrs(attrs: &[Attribute], ident: &Ident) -> syn::Result<ModelAttrs> {
    let mut result = ModelAttrs::default();
    let mut deleted_at_attr = None;

    for attr in attrs {
        if !attr.path().is_ident("model") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("soft_deletes") {
                result.soft_deletes = true;
                return Ok(());
            }
            let slot = if meta.path.is_ident("name") {
                &mut result.name
            } else if meta.path.is_ident("table") {
                &mut result.table
            } else if meta.path.is_ident("namespace") {
                &mut result.namespace
            } else if meta.path.is_ident("deleted_at") {
                deleted_at_attr = Some(attr.clone());
                &mut result.deleted_at
            } else {
                return Err(meta.error("unknown model attribute"));
            };
            let value: Expr = meta.value()?.parse()?;
            match value {
                Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) => {
                    *slot = Some(s.value());
                    Ok(())
                }
                other => Err(syn::Error::new_spanned(other, "expected a string literal")),
            }
        })?;
    }

    if let Some(attr) = deleted_at_attr {
        if !result.soft_deletes {
            return Err(syn::Error::new_spanned(
                attr,
                format!("`deleted_at` on `{ident}` requires `soft_deletes`"),
            ));
        }
    }

    Ok(result)
}

/// English plural of a snake_case word, for the default table name.
fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    if word.ends_with(['s', 'x', 'z']) || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{word}es");
    }
    format!("{word}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("order"), "orders");
        assert_eq!(pluralize("line_item"), "line_items");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("survey"), "surveys");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("batch"), "batches");
    }

    #[test]
    fn test_default_attrs() {
        let input: DeriveInput = syn::parse_quote! {
            struct LineItem { id: i64 }
        };
        let tokens = derive_model_impl(input).unwrap().to_string();
        assert!(tokens.contains("\"line_items\""));
        assert!(tokens.contains("\"LineItem\""));
        assert!(tokens.contains("const SOFT_DELETES : bool = false"));
    }

    #[test]
    fn test_deleted_at_requires_soft_deletes() {
        let input: DeriveInput = syn::parse_quote! {
            #[model(deleted_at = "removed_at")]
            struct Order { id: i64 }
        };
        let err = derive_model_impl(input).unwrap_err();
        assert!(err.to_string().contains("requires `soft_deletes`"));
    }

    #[test]
    fn test_unknown_attribute() {
        let input: DeriveInput = syn::parse_quote! {
            #[model(tabel = "orders")]
            struct Order { id: i64 }
        };
        assert!(derive_model_impl(input).is_err());
    }
}
