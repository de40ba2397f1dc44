// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use rowflow::engine::{Graph, RunArgs};
use rowflow::errors::CallableError;
use rowflow::model::{Row, Value};
use rowflow::operators::{Map, Reduce, Sort};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let verbose = args.iter().any(|arg| arg == "--verbose");
    let paths: Vec<&String> = args[1..].iter().filter(|arg| *arg != "--verbose").collect();

    if paths.len() != 2 {
        eprintln!("Usage: {} <corpus.txt> <output.txt> [--verbose]", args[0]);
        eprintln!("Counts word occurrences across a corpus of one JSON record per line,");
        eprintln!("each with a 'doc_id' and a 'text' field.");
        process::exit(1);
    }

    if let Err(error) = run_word_count(paths[0], paths[1], verbose) {
        eprintln!("word count failed: {error:#}");
        process::exit(1);
    }
}

fn run_word_count(corpus_path: &str, output_path: &str, verbose: bool) -> Result<()> {
    let corpus = BufReader::new(
        File::open(corpus_path).with_context(|| format!("opening corpus '{corpus_path}'"))?,
    );
    let output = BufWriter::new(
        File::create(output_path).with_context(|| format!("creating output '{output_path}'"))?,
    );

    let graph = Graph::from_input("main_input");
    graph.set_name("count_words_graph");
    graph.add_operation(Map::new(split_text));
    graph.add_operation(Sort::new(["word"])?);
    graph.add_operation(Reduce::new(word_counter, ["word"])?);

    graph.run(
        RunArgs::new(output)
            .input("main_input", corpus)
            .verbose(verbose),
    )?;
    Ok(())
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

fn word_counter(rows: &[Row]) -> Result<Vec<Row>, CallableError> {
    Ok(vec![Row::from([
        ("word", rows[0].get("word").cloned().unwrap_or(Value::Null)),
        ("number", Value::from(rows.len() as i64)),
    ])])
}
