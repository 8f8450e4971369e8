// turning a finished (or failed) write into the message a user sees

use serde::Serialize;

use super::statement::{self, Classification};
use crate::Error;

#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub rows_affected: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    pub row_modifying: bool,
}

impl WriteOutcome {
    pub fn new(sql: &str, rows_affected: u64) -> Self {
        Self {
            rows_affected,
            classification: statement::classify(sql),
            row_modifying: statement::is_row_modifying(sql),
        }
    }

    pub fn message(&self) -> String {
        if let Some(c) = &self.classification {
            return c.message();
        }
        if !self.row_modifying {
            return "Query executed".to_string();
        }
        let n = self.rows_affected;
        format!("{n} row{} affected", if n == 1 { "" } else { "s" })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn from_result(result: &Result<WriteOutcome, Error>) -> Self {
        match result {
            Ok(outcome) => Self {
                level: Level::Info,
                text: outcome.message(),
            },
            Err(e) => Self {
                level: Level::Error,
                text: error_text(e),
            },
        }
    }
}

// the database's own wording, without sqlx's "error returned from database" wrapper
fn error_text(e: &Error) -> String {
    match e {
        Error::Database(sqlx::Error::Database(db)) => db.message().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_counts() {
        let message = |sql, n| WriteOutcome::new(sql, n).message();

        assert_eq!(message("update one set count = 5", 2), "2 rows affected");
        assert_eq!(message("delete from one where id = 1", 1), "1 row affected");
        assert_eq!(message("INSERT into one values (3, 1)", 0), "0 rows affected");
    }

    #[test]
    fn ddl_uses_classification() {
        let outcome = WriteOutcome::new("create table newtable (id integer)", 0);
        assert_eq!(outcome.message(), "Created table: newtable");

        let outcome = WriteOutcome::new("create view blah as select 1 + 1", 0);
        assert_eq!(outcome.message(), "Created view: blah");
    }

    #[test]
    fn other_statements_just_ran() {
        let message = |sql| WriteOutcome::new(sql, 0).message();

        assert_eq!(message("create index idx on one (count)"), "Query executed");
        assert_eq!(message("vacuum"), "Query executed");
    }

    #[test]
    fn cte_writes_report_rows() {
        let message = |sql, n| WriteOutcome::new(sql, n).message();

        assert_eq!(
            message("with x as (select 7 as v) insert into one (count) select v from x", 1),
            "1 row affected"
        );
        assert_eq!(
            message("WITH old AS (SELECT id FROM one)\nDELETE FROM one WHERE id IN old", 2),
            "2 rows affected"
        );
        assert_eq!(message("with x as (select 1) select * from x", 0), "Query executed");
    }

    #[test]
    fn errors_become_error_messages() {
        let result: Result<WriteOutcome, Error> = Err(Error::InvalidStatement("bad".into()));
        let message = Message::from_result(&result);
        assert_eq!(message.level, Level::Error);
        assert_eq!(message.text, "Invalid statement: bad");
    }
}
