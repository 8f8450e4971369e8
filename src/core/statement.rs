// statement classifier - spots create/alter/drop of a table or view
// heuristic on purpose: only used to word the message after a write worked

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Create,
    Drop,
    Alter,
}

impl Verb {
    fn keyword(self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Drop => "drop",
            Verb::Alter => "alter",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Verb::Create => "Created",
            Verb::Drop => "Dropped",
            Verb::Alter => "Altered",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Table,
    View,
}

impl ObjectType {
    fn keyword(self) -> &'static str {
        match self {
            ObjectType::Table => "table",
            ObjectType::View => "view",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub name: String,
    pub verb: Verb,
    pub object_type: ObjectType,
}

impl Classification {
    /// Human readable confirmation, e.g. `Created table: dogs`.
    pub fn message(&self) -> String {
        format!(
            "{} {}: {}",
            self.verb.past_tense(),
            self.object_type,
            self.name
        )
    }
}

struct PatternEntry {
    object_type: ObjectType,
    verb: Verb,
    pattern: Regex,
}

// [name], "name", 'name', bare - tried in this order
const NAME_STYLES: [&str; 4] = [
    r"\[([^\]]+)\]",
    r#""([^"]+)""#,
    r"'([^']+)'",
    r"([a-zA-Z_][a-zA-Z0-9_]*)",
];

static PATTERNS: LazyLock<Vec<PatternEntry>> = LazyLock::new(build_patterns);

fn build_patterns() -> Vec<PatternEntry> {
    let mut entries = Vec::new();

    for object_type in [ObjectType::Table, ObjectType::View] {
        for style in NAME_STYLES {
            for verb in [Verb::Create, Verb::Drop] {
                entries.push(entry(object_type, verb, style));
            }
            // there is no alter view
            if object_type == ObjectType::Table {
                entries.push(entry(object_type, Verb::Alter, style));
            }
        }
    }

    entries
}

fn entry(object_type: ObjectType, verb: Verb, style: &str) -> PatternEntry {
    let source = format!(
        r"(?i)^\s*{}\s+{}\s+{}",
        verb.keyword(),
        object_type.keyword(),
        style
    );
    PatternEntry {
        object_type,
        verb,
        // built from constant fragments only
        pattern: Regex::new(&source).expect("statement pattern must compile"),
    }
}

/// Classify `sql` as a create/drop/alter of a table or view.
///
/// Only the head of the statement is looked at, anything after the name is
/// ignored. Returns `None` for everything else (selects, inserts, ...).
pub fn classify(sql: &str) -> Option<Classification> {
    PATTERNS.iter().find_map(|entry| {
        entry.pattern.captures(sql).map(|caps| Classification {
            name: caps[1].to_string(),
            verb: entry.verb,
            object_type: entry.object_type,
        })
    })
}

static ROW_MODIFYING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(insert|update|delete|replace)\b")
        .expect("keyword pattern must compile")
});

// `with x as (...) insert into ...` and friends
static CTE_WRITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*with\b.*\b(insert\s+into|update\s+\w|delete\s+from)\b")
        .expect("cte pattern must compile")
});

// insert/update/delete report a meaningful row count, ddl does not
pub fn is_row_modifying(sql: &str) -> bool {
    ROW_MODIFYING.is_match(sql) || CTE_WRITE.is_match(sql)
}
