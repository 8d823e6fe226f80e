//! Code generation for `#[derive(Record)]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_record_attrs, FieldKind};

const FIELDS_CONST: &str = "RECORD_FIELDS";

pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut names: Vec<String> = Vec::new();
    let mut const_names: Vec<String> = Vec::new();
    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_record_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(kind) = attrs.kind else {
            continue;
        };

        let exposed = attrs.rename.unwrap_or_else(|| field_name.to_string());
        if names.contains(&exposed) {
            return Err(Error::new(
                attrs.span,
                format!("duplicate record field name '{exposed}'"),
            ));
        }

        let constant = to_screaming_snake_case(&exposed);
        if constant == FIELDS_CONST {
            return Err(Error::new(
                attrs.span,
                format!(
                    "'{exposed}' would generate the reserved constant {FIELDS_CONST}; use rename"
                ),
            ));
        }
        if const_names.contains(&constant) {
            return Err(Error::new(
                attrs.span,
                format!(
                    "record field '{exposed}' generates the constant {constant} a second time; \
                     use rename"
                ),
            ));
        }

        let const_name = format_ident!("{}", constant);
        const_names.push(constant);
        field_constants.push(quote! {
            pub const #const_name: &'static str = #exposed;
        });

        let value_expr = if attrs.optional {
            let present = value_of(kind, quote! { value });
            quote! {
                match &self.#field_name {
                    ::core::option::Option::Some(value) => #present,
                    ::core::option::Option::None => ::sift::Value::None,
                }
            }
        } else {
            value_of(kind, quote! { &self.#field_name })
        };

        field_matches.push(quote! {
            #exposed => #value_expr,
        });
        names.push(exposed);
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*

            /// Every field name exposed to queries, in declaration order.
            pub const RECORD_FIELDS: &'static [&'static str] = &[#(#names),*];
        }

        impl #impl_generics ::sift::Record for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::sift::Value<'_> {
                match field {
                    #(#field_matches)*
                    _ => ::sift::Value::None,
                }
            }

            fn field_names(&self) -> ::std::vec::Vec<&str> {
                Self::RECORD_FIELDS.to_vec()
            }
        }
    };

    Ok(expanded)
}

// `place` is an expression of type `&T` for the field's value type.
fn value_of(kind: FieldKind, place: TokenStream) -> TokenStream {
    match kind {
        FieldKind::String => quote! {
            ::sift::Value::String(::core::convert::AsRef::<str>::as_ref(#place))
        },
        FieldKind::Number => quote! {
            ::sift::Value::Number(::sift::Number::from(*#place))
        },
        FieldKind::Timestamp => quote! {
            ::sift::Value::Timestamp(::sift::AsTimestamp::as_timestamp(#place))
        },
        FieldKind::Bool => quote! {
            ::sift::Value::Bool(*#place)
        },
    }
}

fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c.is_alphanumeric() {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = !c.is_ascii_digit() || prev_was_lower;
        } else {
            result.push('_');
            prev_was_lower = false;
        }
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}
