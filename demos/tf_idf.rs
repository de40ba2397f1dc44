// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! tf-idf over a small in-memory corpus, exercising a multi-chain graph.
//!
//! Four chains: one folds the corpus into a document count, one splits
//! documents into words, one computes per-word idf by joining the count
//! in, and the final one joins idf back onto per-document frequencies to
//! emit the top three documents per word. Run with
//! `cargo run --example tf_idf`.

use std::io::Cursor;

use anyhow::Result;

use rowflow::engine::{Graph, RunArgs};
use rowflow::errors::CallableError;
use rowflow::model::{Row, Value};
use rowflow::operators::{Fold, Join, JoinKey, JoinStrategy, Map, Reduce, Sort};

const CORPUS: &str = r#"{"doc_id": "first_text", "text": "a rare word hides in plain text"}
{"doc_id": "second_text", "text": "plain text is plain text"}
{"doc_id": "third_text", "text": "word counts make text statistics"}
"#;

fn count_documents(mut state: Row, _row: &Row) -> Result<Row, CallableError> {
    let count = match state.get("docs_count") {
        Some(Value::Int(n)) => *n,
        _ => 0,
    };
    state.insert("docs_count", count + 1);
    Ok(state)
}

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

fn unique(rows: &[Row]) -> Result<Vec<Row>, CallableError> {
    Ok(vec![rows[0].clone()])
}

fn int_field(row: &Row, key: &str) -> Result<i64, CallableError> {
    match row.get(key) {
        Some(Value::Int(n)) => Ok(*n),
        _ => Err(format!("row has no integer '{key}' field").into()),
    }
}

fn docs_with_word_counter(rows: &[Row]) -> Result<Vec<Row>, CallableError> {
    Ok(vec![Row::from([
        ("word", rows[0].get("word").cloned().unwrap_or(Value::Null)),
        (
            "docs_where_word_is_present",
            Value::from(rows.len() as i64),
        ),
        (
            "docs_count",
            rows[0].get("docs_count").cloned().unwrap_or(Value::Null),
        ),
    ])])
}

fn calc_idf(row: &Row) -> Result<Vec<Row>, CallableError> {
    let docs_count = int_field(row, "docs_count")? as f64;
    let docs_with_word = int_field(row, "docs_where_word_is_present")? as f64;
    Ok(vec![Row::from([
        ("word", row.get("word").cloned().unwrap_or(Value::Null)),
        ("idf", Value::from((docs_count / docs_with_word).ln())),
    ])])
}

fn word_frequency_in_doc(rows: &[Row]) -> Result<Vec<Row>, CallableError> {
    Ok(vec![Row::from([
        ("doc_id", rows[0].get("doc_id").cloned().unwrap_or(Value::Null)),
        ("word", rows[0].get("word").cloned().unwrap_or(Value::Null)),
        ("frequency", Value::from(rows.len() as i64)),
    ])])
}

fn top_three_documents(rows: &[Row]) -> Result<Vec<Row>, CallableError> {
    let mut scored: Vec<(Value, f64)> = Vec::with_capacity(rows.len());
    for row in rows {
        let frequency = int_field(row, "frequency")? as f64;
        let idf = match row.get("idf") {
            Some(Value::Float(idf)) => *idf,
            _ => return Err("row has no 'idf' field".into()),
        };
        scored.push((
            row.get("doc_id").cloned().unwrap_or(Value::Null),
            frequency * idf,
        ));
    }
    scored.sort_by(|(_, left), (_, right)| right.total_cmp(left));

    let index: Vec<Value> = scored
        .into_iter()
        .take(3)
        .map(|(doc_id, tf_idf)| Value::List(vec![doc_id, Value::from(tf_idf)]))
        .collect();
    Ok(vec![Row::from([
        ("word", rows[0].get("word").cloned().unwrap_or(Value::Null)),
        ("index", Value::from(index)),
    ])])
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let count_docs = Graph::from_input("main_input");
    count_docs.set_name("count_documents_graph");
    count_docs.add_operation(Fold::new(
        count_documents,
        Row::from([("docs_count", Value::from(0))]),
    ));

    let split_words = Graph::from_input("main_input");
    split_words.set_name("split_words_graph");
    split_words.add_operation(Map::new(split_text));

    let count_idf = Graph::from_graph(&split_words);
    count_idf.set_name("count_idf_graph");
    count_idf.add_operation(Sort::new(["doc_id", "word"])?);
    count_idf.add_operation(Reduce::new(unique, ["doc_id", "word"])?);
    count_idf.add_operation(Join::new(
        &count_docs,
        JoinStrategy::Outer,
        JoinKey::pair("word", "docs_count"),
    )?);
    count_idf.add_operation(Sort::new(["word"])?);
    count_idf.add_operation(Reduce::new(docs_with_word_counter, ["word"])?);
    count_idf.add_operation(Map::new(calc_idf));

    let calc_index = Graph::from_graph(&split_words);
    calc_index.set_name("calc_index_graph");
    calc_index.add_operation(Sort::new(["doc_id", "word"])?);
    calc_index.add_operation(Reduce::new(word_frequency_in_doc, ["doc_id", "word"])?);
    calc_index.add_operation(Join::new(
        &count_idf,
        JoinStrategy::Left,
        JoinKey::from("word"),
    )?);
    calc_index.add_operation(Sort::new(["word"])?);
    calc_index.add_operation(Reduce::new(top_three_documents, ["word"])?);

    calc_index.run(
        RunArgs::new(std::io::stdout())
            .input("main_input", Cursor::new(CORPUS.to_string()))
            .verbose(true),
    )?;
    Ok(())
}
