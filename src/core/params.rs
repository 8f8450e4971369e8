// named parameters - what a form needs to ask for before running the sql

use serde::Serialize;

use super::db::Dialect;
use super::placeholders;
use crate::Error;

const TEXTAREA_SUFFIX: &str = "_textarea";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Text,
    Textarea,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub kind: ParameterKind,
    pub label: String,
}

impl ParameterDescriptor {
    /// `bio_textarea` becomes a textarea labelled `bio`, anything else a text input.
    pub fn from_name(name: &str) -> Self {
        match name.strip_suffix(TEXTAREA_SUFFIX) {
            Some(label) => Self {
                name: name.to_string(),
                kind: ParameterKind::Textarea,
                label: label.to_string(),
            },
            None => Self {
                name: name.to_string(),
                kind: ParameterKind::Text,
                label: name.to_string(),
            },
        }
    }
}

/// Anything that can list the `:name` placeholders a statement uses.
///
/// Implementations return names in order of first occurrence without
/// duplicates, or `Error::InvalidStatement` when the sql can't be read far
/// enough to tell.
pub trait PlaceholderSource {
    fn placeholders(&self, sql: &str) -> impl Future<Output = Result<Vec<String>, Error>> + Send;
}

/// Lexical scan only, no database involved.
#[derive(Debug, Clone, Copy)]
pub struct TextScan {
    pub dialect: Dialect,
}

impl Default for TextScan {
    fn default() -> Self {
        Self {
            dialect: Dialect::Sqlite,
        }
    }
}

impl PlaceholderSource for TextScan {
    async fn placeholders(&self, sql: &str) -> Result<Vec<String>, Error> {
        placeholders::names(sql, self.dialect)
    }
}

pub async fn derive_parameters<S: PlaceholderSource>(
    source: &S,
    sql: &str,
) -> Result<Vec<ParameterDescriptor>, Error> {
    let names = source.placeholders(sql).await?;

    // sources promise uniqueness, don't rely on it
    let mut params: Vec<ParameterDescriptor> = Vec::with_capacity(names.len());
    for name in names {
        if !params.iter().any(|p| p.name == name) {
            params.push(ParameterDescriptor::from_name(&name));
        }
    }

    Ok(params)
}

// what a form should show: nothing if the statement can't be read yet,
// the database will say what's wrong when it runs
pub async fn derive_parameters_or_empty<S: PlaceholderSource>(
    source: &S,
    sql: &str,
) -> Result<Vec<ParameterDescriptor>, Error> {
    match derive_parameters(source, sql).await {
        Err(Error::InvalidStatement(reason)) => {
            tracing::debug!("no parameters derived: {reason}");
            Ok(Vec::new())
        }
        other => other,
    }
}
