// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Word count over a small in-memory corpus.
//!
//! One chain: split every document into lowercase words, sort by word,
//! then count each group. Run with `cargo run --example word_count`.

use std::io::Cursor;

use anyhow::Result;

use rowflow::engine::{Graph, RunArgs};
use rowflow::errors::CallableError;
use rowflow::model::{Row, Value};
use rowflow::operators::{Map, Reduce, Sort};

const CORPUS: &str = r#"{"doc_id": "first_text", "text": "simple text is written here"}
{"doc_id": "second_text", "text": "text may be simple or not"}
{"doc_id": "third_text", "text": "silence is written in many words"}
"#;

fn split_text(row: &Row) -> Result<Vec<Row>, CallableError> {
    let Some(Value::Str(text)) = row.get("text") else {
        return Err("row has no 'text' field".into());
    };
    let doc_id = row.get("doc_id").cloned().unwrap_or(Value::Null);
    Ok(text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            Row::from([
                ("doc_id", doc_id.clone()),
                ("word", Value::from(word.to_lowercase())),
            ])
        })
        .collect())
}

fn word_counter(rows: &[Row]) -> Result<Vec<Row>, CallableError> {
    Ok(vec![Row::from([
        ("word", rows[0].get("word").cloned().unwrap_or(Value::Null)),
        ("number", Value::from(rows.len() as i64)),
    ])])
}

fn main() -> Result<()> {
    let graph = Graph::from_input("main_input");
    graph.set_name("count_words_graph");
    graph.add_operation(Map::new(split_text));
    graph.add_operation(Sort::new(["word"])?);
    graph.add_operation(Reduce::new(word_counter, ["word"])?);

    graph.run(
        RunArgs::new(std::io::stdout())
            .input("main_input", Cursor::new(CORPUS.to_string())),
    )?;
    Ok(())
}
