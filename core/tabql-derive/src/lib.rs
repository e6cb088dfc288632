//! tabql Derive: procedural macros for the tabql query engine.
//!
//! Provides `#[derive(FromRow)]` for decoding result rows into structs.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derive macro for decoding a `tabql_core::Row` into a struct.
///
/// # Example
///
/// ```ignore
/// #[derive(FromRow)]
/// #[tabql(table_name = "users")]
/// pub struct DeptCount {
///     pub dept: String,
///     #[tabql(rename = "COUNT(*)")]
///     pub total: i64,
///     pub note: Option<String>,
/// }
/// ```
///
/// Generates:
/// - `TABLE_NAME` constant (defaults to the lower-cased struct name)
/// - `COLUMNS` constant, the column read for each field
/// - `FromRow` trait implementation
#[proc_macro_derive(FromRow, attributes(tabql))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let table_name =
        extract_str_attr(&input.attrs, "table_name")?.unwrap_or_else(|| name.to_string().to_lowercase());

    // Extract fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "FromRow can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "FromRow can only be derived for structs",
            ));
        }
    };

    let mut columns = Vec::with_capacity(fields.len());
    let mut from_row_fields = Vec::with_capacity(fields.len());
    for f in fields {
        let Some(field_name) = &f.ident else {
            return Err(syn::Error::new_spanned(f, "expected a named field"));
        };
        let field_type = &f.ty;
        let column = extract_str_attr(&f.attrs, "rename")?.unwrap_or_else(|| field_name.to_string());

        from_row_fields.push(quote! {
            #field_name: <#field_type as tabql_core::api::FromValue>::from_value(row.lookup(#column)?, #column)?
        });
        columns.push(column);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            pub const TABLE_NAME: &'static str = #table_name;

            pub const COLUMNS: &'static [&'static str] = &[#(#columns),*];
        }

        impl #impl_generics tabql_core::api::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &tabql_core::Row) -> tabql_core::TabqlResult<Self> {
                Ok(Self {
                    #(#from_row_fields),*
                })
            }
        }
    })
}

/// Read `#[tabql(key = "value")]` from an attribute list.
fn extract_str_attr(attrs: &[syn::Attribute], key: &str) -> syn::Result<Option<String>> {
    for attr in attrs {
        if !attr.path().is_ident("tabql") {
            continue;
        }
        let meta = attr.parse_args::<syn::Meta>()?;
        if let syn::Meta::NameValue(nv) = &meta
            && nv.path.is_ident(key)
        {
            if let syn::Expr::Lit(lit) = &nv.value
                && let syn::Lit::Str(s) = &lit.lit
            {
                return Ok(Some(s.value()));
            }
            return Err(syn::Error::new_spanned(
                &nv.value,
                format!("`{key}` expects a string literal"),
            ));
        }
    }
    Ok(None)
}
