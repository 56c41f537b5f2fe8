//! Validated SQL identifiers for the structured predicate builder.
//!
//! Raw fragments (`where_raw`, `order_by`, join conditions) are trusted as-is.
//! [`Condition`](crate::Condition) leaves instead take their column through
//! [`Ident`], so a column name coming from a request can never smuggle SQL.
//!
//! Accepted forms, dot separated:
//! - unquoted segments matching `[A-Za-z_][A-Za-z0-9_$]*`
//! - quoted segments (`"CamelCase"`) with `""` as the escaped quote

use crate::error::{CrudError, CrudResult};
use std::fmt;

/// A validated column (or `table.column`) reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Bare(String),
    Quoted(String),
}

impl Ident {
    /// Parse `users.email`, `"createdAt"`, `public."User".id`, ...
    pub fn parse(input: &str) -> CrudResult<Self> {
        if input.is_empty() {
            return Err(CrudError::validation("identifier cannot be empty"));
        }
        if input.contains('\0') {
            return Err(CrudError::validation(
                "identifier cannot contain NUL character",
            ));
        }

        let mut segments = Vec::new();
        let mut rest = input;
        loop {
            let (segment, tail) = if let Some(quoted) = rest.strip_prefix('"') {
                parse_quoted(quoted, input)?
            } else {
                parse_bare(rest, input)?
            };
            segments.push(segment);

            match tail.strip_prefix('.') {
                Some("") => {
                    return Err(CrudError::validation(format!(
                        "trailing '.' in identifier '{input}'"
                    )));
                }
                Some(next) => rest = next,
                None if tail.is_empty() => break,
                None => {
                    return Err(CrudError::validation(format!(
                        "unexpected characters after segment in identifier '{input}'"
                    )));
                }
            }
        }

        Ok(Self { segments })
    }

    /// A single quoted identifier, kept verbatim (case included).
    pub fn quoted(name: &str) -> CrudResult<Self> {
        if name.is_empty() || name.contains('\0') {
            return Err(CrudError::validation(format!(
                "invalid quoted identifier '{name}'"
            )));
        }
        Ok(Self {
            segments: vec![Segment::Quoted(name.to_string())],
        })
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Bare(name) => f.write_str(name)?,
                Segment::Quoted(name) => write!(f, "\"{}\"", name.replace('"', "\"\""))?,
            }
        }
        Ok(())
    }
}

fn parse_bare<'a>(s: &'a str, whole: &str) -> CrudResult<(Segment, &'a str)> {
    let end = s.find('.').unwrap_or(s.len());
    let name = &s[..end];
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
        }
        _ => false,
    };
    if !valid {
        return Err(CrudError::validation(format!(
            "invalid identifier segment '{name}' in '{whole}'"
        )));
    }
    Ok((Segment::Bare(name.to_string()), &s[end..]))
}

/// `s` starts right after the opening quote.
fn parse_quoted<'a>(s: &'a str, whole: &str) -> CrudResult<(Segment, &'a str)> {
    let mut name = String::new();
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '"' {
            name.push(c);
            continue;
        }
        if matches!(chars.peek(), Some((_, '"'))) {
            chars.next();
            name.push('"');
            continue;
        }
        if name.is_empty() {
            return Err(CrudError::validation(format!(
                "empty quoted identifier in '{whole}'"
            )));
        }
        return Ok((Segment::Quoted(name), &s[i + 1..]));
    }
    Err(CrudError::validation(format!(
        "unclosed quoted identifier in '{whole}'"
    )))
}

/// Convert an input into an [`Ident`].
pub trait IntoIdent {
    fn into_ident(self) -> CrudResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> CrudResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> CrudResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> CrudResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> CrudResult<Ident> {
        Ident::parse(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_dotted_names() {
        assert_eq!(Ident::parse("email").unwrap().to_sql(), "email");
        assert_eq!(Ident::parse("users.email").unwrap().to_sql(), "users.email");
        assert_eq!(Ident::parse("tmp$1").unwrap().to_sql(), "tmp$1");
    }

    #[test]
    fn keeps_quoted_segments_verbatim() {
        assert_eq!(
            Ident::parse(r#"users."createdAt""#).unwrap().to_sql(),
            r#"users."createdAt""#
        );
        assert_eq!(
            Ident::parse(r#""say ""hi""""#).unwrap().to_sql(),
            r#""say ""hi""""#
        );
        assert_eq!(Ident::quoted("firstName").unwrap().to_sql(), r#""firstName""#);
    }

    #[test]
    fn rejects_injection_attempts() {
        assert!(Ident::parse("email; DROP TABLE users").is_err());
        assert!(Ident::parse("1=1 OR email").is_err());
        assert!(Ident::parse("email--").is_err());
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::parse("users.").is_err());
        assert!(Ident::parse("users..email").is_err());
        assert!(Ident::parse(r#""unclosed"#).is_err());
        assert!(Ident::parse(r#""""#).is_err());
        assert!(Ident::parse(r#""a"b"#).is_err());
    }
}
