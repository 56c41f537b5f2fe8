//! Positional placeholder handling.
//!
//! Every statement the builder produces uses `?` markers bound by argument
//! order. PostgreSQL wants `$1, $2, ...`, so statements pass through
//! [`to_numbered`] right before execution.
//!
//! A `?` is only a placeholder outside of:
//! - single-quoted string literals (`'it''s ?'`)
//! - double-quoted identifiers (`"what?"`)
//! - dollar-quoted bodies (`$$ ? $$`, `$tag$ ? $tag$`)
//! - `--` line comments and `/* */` block comments
//!
//! `??` renders a single literal `?`, which keeps the JSONB `?` operator
//! reachable from raw fragments.

use std::borrow::Cow;

/// Rewrite `?` placeholders into `$1, $2, ...`.
///
/// Returns the input unchanged (borrowed) when it contains no `?` at all.
pub fn to_numbered(sql: &str) -> Cow<'_, str> {
    if !sql.contains('?') {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut idx: usize = 0;
    scan(sql, |event| match event {
        Token::Text(s) => out.push_str(s),
        Token::Placeholder => {
            idx += 1;
            out.push('$');
            out.push_str(&idx.to_string());
        }
        Token::Escaped => out.push('?'),
    });
    Cow::Owned(out)
}

/// Count the placeholders [`to_numbered`] would rewrite.
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    scan(sql, |event| {
        if let Token::Placeholder = event {
            count += 1;
        }
    });
    count
}

enum Token<'a> {
    Text(&'a str),
    Placeholder,
    Escaped,
}

fn scan<'a>(sql: &'a str, mut emit: impl FnMut(Token<'a>)) {
    let bytes = sql.as_bytes();
    let mut i = 0;
    let mut start = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'?' => {
                emit(Token::Text(&sql[start..i]));
                if bytes.get(i + 1) == Some(&b'?') {
                    emit(Token::Escaped);
                    i += 2;
                } else {
                    emit(Token::Placeholder);
                    i += 1;
                }
                start = i;
            }
            b'\'' => i = skip_quoted(bytes, i, b'\''),
            b'"' => i = skip_quoted(bytes, i, b'"'),
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = match sql[i..].find('\n') {
                    Some(pos) => i + pos + 1,
                    None => bytes.len(),
                };
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = match sql[i + 2..].find("*/") {
                    Some(pos) => i + 2 + pos + 2,
                    None => bytes.len(),
                };
            }
            // Inside an identifier (`col$1`) a dollar never opens a quote.
            b'$' if i == 0 || !is_ident_byte(bytes[i - 1]) => i = skip_dollar_quoted(sql, i),
            _ => i += 1,
        }
    }

    emit(Token::Text(&sql[start..]));
}

fn is_ident_byte(b: u8) -> bool {
    b == b'_' || b == b'$' || b.is_ascii_alphanumeric()
}

/// Skip a quoted run starting at `open`; a doubled quote is an escape.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Skip `$tag$ ... $tag$` if `start` opens one; otherwise step past the `$`.
fn skip_dollar_quoted(sql: &str, start: usize) -> usize {
    let rest = &sql[start + 1..];
    let Some(close) = rest.find('$') else {
        return start + 1;
    };
    let tag = &rest[..close];
    // `$1` style parameters and stray dollars are not quote openers.
    let valid_tag = tag
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if !valid_tag {
        return start + 1;
    }

    let delimiter = &sql[start..start + close + 2];
    let body_start = start + delimiter.len();
    match sql[body_start..].find(delimiter) {
        Some(pos) => body_start + pos + delimiter.len(),
        None => sql.len(),
    }
}
