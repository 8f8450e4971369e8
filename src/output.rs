// output formatting - aligned text for humans or raw json

use serde::Serialize;

use crate::core::{Classification, Level, Message, ParameterDescriptor, ParameterKind};

pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn classification(&self, sql: &str, c: Option<&Classification>) {
        if self.json {
            return raw(&serde_json::json!({ "sql": sql, "classification": c }));
        }
        match c {
            Some(c) => {
                println!("verb:   {}", c.verb);
                println!("type:   {}", c.object_type);
                println!("name:   {}", c.name);
            }
            None => println!("not a create, alter or drop of a table or view"),
        }
    }

    pub fn parameters(&self, params: &[ParameterDescriptor]) {
        if self.json {
            return raw(&serde_json::json!({ "parameters": params }));
        }
        if params.is_empty() {
            println!("no parameters");
            return;
        }

        // pad names so kinds and labels line up
        let width = params.iter().map(|p| p.name.len()).max().unwrap_or(0);
        for p in params {
            let kind = match p.kind {
                ParameterKind::Text => "text",
                ParameterKind::Textarea => "textarea",
            };
            println!("{:width$}  {kind:8}  {}", p.name, p.label, width = width);
        }
    }

    pub fn message(&self, database: &str, message: &Message) {
        if self.json {
            return raw(&serde_json::json!({
                "database": database,
                "level": message.level,
                "message": message.text,
            }));
        }
        match message.level {
            Level::Info => println!("{database}: {}", message.text),
            Level::Error => eprintln!("{database}: error: {}", message.text),
        }
    }

    pub fn tables(&self, database: &str, tables: &[String]) {
        if self.json {
            return raw(&serde_json::json!({ "database": database, "tables": tables }));
        }
        println!("{database} ({} tables)", tables.len());
        for t in tables {
            println!("  {t}");
        }
    }
}

// raw json for scripts
fn raw<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string(value).unwrap_or_default());
}
