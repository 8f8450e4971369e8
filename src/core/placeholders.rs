// finds :name placeholders in sql text and rewrites them for a dialect
// not a parser - just enough lexing to skip strings, quoted names and comments

use std::ops::Range;

use super::db::Dialect;
use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub name: &'a str,
    pub span: Range<usize>,
}

/// Every `:name` occurrence in `sql`, in source order, duplicates included.
pub fn scan(sql: &str, dialect: Dialect) -> Result<Vec<Placeholder<'_>>, Error> {
    let bytes = sql.as_bytes();
    let escapes = dialect == Dialect::Mysql;
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_quoted(sql, i, b'\'', escapes, "string literal")?,
            b'"' => i = skip_quoted(sql, i, b'"', escapes, "quoted identifier")?,
            b'`' => i = skip_quoted(sql, i, b'`', false, "quoted identifier")?,
            b'[' if dialect == Dialect::Sqlite => {
                i = skip_quoted(sql, i, b']', false, "bracketed identifier")?
            }
            b'$' if dialect == Dialect::Postgres => match dollar_tag(bytes, i) {
                Some(body) => {
                    let tag = &sql[i..body];
                    i = sql[body..]
                        .find(tag)
                        .map(|n| body + n + tag.len())
                        .ok_or_else(|| unterminated("dollar-quoted body", i))?;
                }
                None => i += 1,
            },
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = sql[i..].find('\n').map_or(bytes.len(), |n| i + n + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..]
                    .find("*/")
                    .map(|n| i + 2 + n + 2)
                    .ok_or_else(|| unterminated("block comment", i))?;
            }
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' => {
                let start = i + 1;
                let end = start + bytes[start..].iter().take_while(|b| is_word(**b)).count();
                if end > start {
                    found.push(Placeholder {
                        name: &sql[start..end],
                        span: i..end,
                    });
                }
                i = end.max(i + 1);
            }
            _ => i += 1,
        }
    }

    Ok(found)
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

// returns the index just past the closing quote
// mysql lets a backslash escape the next byte, quotes included
fn skip_quoted(
    sql: &str,
    open: usize,
    close: u8,
    backslash_escapes: bool,
    what: &str,
) -> Result<usize, Error> {
    let bytes = sql.as_bytes();
    let mut j = open + 1;

    while j < bytes.len() {
        match bytes[j] {
            b'\\' if backslash_escapes => j += 2,
            b if b == close => return Ok(j + 1),
            _ => j += 1,
        }
    }

    Err(unterminated(what, open))
}

// `$$` or `$tag$` opening a postgres dollar-quoted body; returns where the body starts.
// `$1` and identifiers containing `$` are not tags.
fn dollar_tag(bytes: &[u8], start: usize) -> Option<usize> {
    if start > 0 && is_word(bytes[start - 1]) {
        return None;
    }
    if bytes.get(start + 1).is_some_and(|b| b.is_ascii_digit()) {
        return None;
    }
    let end = start + 1 + bytes[start + 1..].iter().take_while(|b| is_word(**b)).count();
    (bytes.get(end) == Some(&b'$')).then_some(end + 1)
}

fn unterminated(what: &str, at: usize) -> Error {
    Error::InvalidStatement(format!("unterminated {what} starting at offset {at}"))
}

/// Distinct placeholder names, ordered by first occurrence.
pub fn names(sql: &str, dialect: Dialect) -> Result<Vec<String>, Error> {
    let mut names: Vec<String> = Vec::new();
    for p in scan(sql, dialect)? {
        if !names.iter().any(|n| n == p.name) {
            names.push(p.name.to_string());
        }
    }
    Ok(names)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub sql: String,
    /// Parameter name for each positional bind, in bind order.
    pub binds: Vec<String>,
}

impl Rewritten {
    /// Distinct bind names, ordered by first occurrence.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in &self.binds {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Rewrite `:name` placeholders into the bind syntax `dialect` understands.
///
/// - sqlite: `?1`, `?2`, ... one per distinct name
/// - postgres: `$1`, `$2`, ... one per distinct name
/// - mysql: `?` for every occurrence, so a repeated name binds twice
pub fn rewrite(sql: &str, dialect: Dialect) -> Result<Rewritten, Error> {
    let found = scan(sql, dialect)?;

    let mut out = String::with_capacity(sql.len());
    let mut binds: Vec<String> = Vec::new();
    let mut last = 0;

    for p in found {
        out.push_str(&sql[last..p.span.start]);
        match dialect {
            Dialect::Mysql => {
                binds.push(p.name.to_string());
                out.push('?');
            }
            Dialect::Sqlite | Dialect::Postgres => {
                let index = match binds.iter().position(|n| n == p.name) {
                    Some(i) => i + 1,
                    None => {
                        binds.push(p.name.to_string());
                        binds.len()
                    }
                };
                let prefix = if dialect == Dialect::Sqlite { '?' } else { '$' };
                out.push(prefix);
                out.push_str(&index.to_string());
            }
        }
        last = p.span.end;
    }
    out.push_str(&sql[last..]);

    Ok(Rewritten { sql: out, binds })
}
