// tests for create/alter/drop classification

use sqlwrite::{Classification, ObjectType, Verb, classify};

fn expect(sql: &str, name: &str, verb: Verb, object_type: ObjectType) {
    assert_eq!(
        classify(sql),
        Some(Classification {
            name: name.to_string(),
            verb,
            object_type,
        }),
        "sql: {sql:?}"
    );
}

#[test]
fn test_every_quoting_style_verb_and_type() {
    let styles = ["[x]", "\"x\"", "'x'", "x"];

    for (verb, verb_kw) in [(Verb::Create, "create"), (Verb::Drop, "drop")] {
        for (object_type, type_kw) in [(ObjectType::Table, "table"), (ObjectType::View, "view")] {
            for style in styles {
                let sql = format!("{verb_kw} {type_kw} {style} (id integer)");
                expect(&sql, "x", verb, object_type);
            }
        }
    }
}

#[test]
fn test_alter_table() {
    expect(
        "alter table [hello] add column foo text",
        "hello",
        Verb::Alter,
        ObjectType::Table,
    );
    expect(
        "ALTER TABLE dogs RENAME TO cats",
        "dogs",
        Verb::Alter,
        ObjectType::Table,
    );
}

#[test]
fn test_no_alter_view() {
    assert_eq!(classify("alter view [hello] as select 1"), None);
}

#[test]
fn test_other_statements() {
    assert_eq!(classify("select 1 + 1"), None);
    assert_eq!(classify("insert into one (id) values (3)"), None);
    assert_eq!(classify("update one set count = 5"), None);
    assert_eq!(classify("delete from one"), None);
    assert_eq!(classify(""), None);
    assert_eq!(classify("create index idx on one (count)"), None);
}

#[test]
fn test_keywords_case_insensitive_name_keeps_case() {
    expect("CREATE TABLE Foo (...", "Foo", Verb::Create, ObjectType::Table);
    expect("Drop View MyView", "MyView", Verb::Drop, ObjectType::View);
}

#[test]
fn test_whitespace_variations() {
    expect("create table hello (...", "hello", Verb::Create, ObjectType::Table);
    expect("  create view hello2 as (...", "hello2", Verb::Create, ObjectType::View);
    expect("  create   \n table \"hello\" (", "hello", Verb::Create, ObjectType::Table);
    expect("  create   \n view \"hello\" (", "hello", Verb::Create, ObjectType::View);
    expect("\t\ndrop\ttable\n\nhello", "hello", Verb::Drop, ObjectType::Table);
}

#[test]
fn test_quoted_names_keep_spaces() {
    expect("create table \"my dogs\" (id)", "my dogs", Verb::Create, ObjectType::Table);
    expect("drop view [old view]", "old view", Verb::Drop, ObjectType::View);
}

#[test]
fn test_malformed_tail_still_matches() {
    // missing closing paren, the database decides if it's valid
    expect("create table hello (id integer", "hello", Verb::Create, ObjectType::Table);
}

#[test]
fn test_only_first_statement_counts() {
    assert_eq!(classify("select 1; drop table dogs"), None);
    expect(
        "create table a (id); drop table b",
        "a",
        Verb::Create,
        ObjectType::Table,
    );
}

#[test]
fn test_keyword_must_lead() {
    assert_eq!(classify("-- note\ncreate table dogs (id)"), None);
    assert_eq!(classify("createtable dogs"), None);
}

#[test]
fn test_idempotent() {
    let sql = "create view [hello] as select 1";
    assert_eq!(classify(sql), classify(sql));
}
