//! Parsing of `#[record(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, Meta, Result, Token,
};

const EXPECTED: &str =
    "expected one of: string, number, timestamp, bool, optional, skip, rename = \"...\"";

/// The kind of value a field exposes to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Timestamp,
    Bool,
}

impl FieldKind {
    fn from_ident(ident: &Ident) -> Option<Self> {
        match ident.to_string().as_str() {
            "string" | "String" | "text" => Some(FieldKind::String),
            "number" | "Number" => Some(FieldKind::Number),
            "timestamp" | "Timestamp" | "date" => Some(FieldKind::Timestamp),
            "bool" | "Bool" | "boolean" => Some(FieldKind::Bool),
            _ => None,
        }
    }
}

/// Everything one `#[record(...)]` attribute can say about a field.
#[derive(Debug, Clone)]
pub struct RecordAttr {
    pub kind: Option<FieldKind>,
    /// The field is `Option<T>`; `None` reads as missing.
    pub optional: bool,
    pub skip: bool,
    /// Exposed name (default: the Rust field name).
    pub rename: Option<String>,
    pub span: Span,
}

impl Default for RecordAttr {
    fn default() -> Self {
        RecordAttr {
            kind: None,
            optional: false,
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr::default();
        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::Path(p) if p.is_ident("optional") => attr.optional = true,
                Meta::Path(p) => {
                    let ident = p
                        .get_ident()
                        .ok_or_else(|| Error::new(p.span(), EXPECTED))?;
                    let kind = FieldKind::from_ident(ident).ok_or_else(|| {
                        Error::new(ident.span(), format!("unknown field kind '{ident}'; {EXPECTED}"))
                    })?;
                    if attr.kind.is_some_and(|k| k != kind) {
                        return Err(Error::new(ident.span(), "field kind given twice"));
                    }
                    attr.kind = Some(kind);
                    attr.span = ident.span();
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => match &nv.value {
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) if !s.value().is_empty() => attr.rename = Some(s.value()),
                    other => {
                        return Err(Error::new(
                            other.span(),
                            "rename must be a non-empty string literal",
                        ))
                    }
                },
                _ => return Err(Error::new(meta.span(), EXPECTED)),
            }
        }

        if (attr.optional || attr.rename.is_some()) && attr.kind.is_none() && !attr.skip {
            return Err(Error::new(
                input.span(),
                "a field kind (string, number, timestamp or bool) is required",
            ));
        }

        Ok(attr)
    }
}

/// Reads the `#[record(...)]` attribute of a field, if any.
pub fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    match attrs.iter().find(|a| a.path().is_ident("record")) {
        Some(attr) => attr.parse_args::<RecordAttr>(),
        None => Ok(RecordAttr::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &str) -> Result<RecordAttr> {
        syn::parse_str::<RecordAttr>(tokens)
    }

    #[test]
    fn test_kinds() {
        assert_eq!(parse("string").unwrap().kind, Some(FieldKind::String));
        assert_eq!(parse("Number").unwrap().kind, Some(FieldKind::Number));
        assert_eq!(parse("timestamp").unwrap().kind, Some(FieldKind::Timestamp));
        assert_eq!(parse("date").unwrap().kind, Some(FieldKind::Timestamp));
        assert_eq!(parse("bool").unwrap().kind, Some(FieldKind::Bool));
        assert_eq!(parse("boolean").unwrap().kind, Some(FieldKind::Bool));
    }

    #[test]
    fn test_skip() {
        let attr = parse("skip").unwrap();
        assert!(attr.skip);
        assert_eq!(attr.kind, None);
    }

    #[test]
    fn test_optional_with_rename() {
        let attr = parse(r#"timestamp, optional, rename = "archived""#).unwrap();
        assert_eq!(attr.kind, Some(FieldKind::Timestamp));
        assert!(attr.optional);
        assert_eq!(attr.rename.as_deref(), Some("archived"));
    }

    #[test]
    fn test_optional_needs_a_kind() {
        let err = parse("optional").unwrap_err();
        assert!(err.to_string().contains("field kind"));
    }

    #[test]
    fn test_conflicting_kinds() {
        assert!(parse("string, number").is_err());
        assert!(parse("string, string").is_ok());
    }

    #[test]
    fn test_invalid() {
        let err = parse("enum_like").unwrap_err();
        assert!(err.to_string().contains("unknown field kind"));
        assert!(parse(r#"rename = """#).is_err());
        assert!(parse(r#"ty = "string""#).is_err());
    }
}
