// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{CallableError, ExecutionError};
use crate::model::Row;
use crate::operators::{MapperFn, RowStream};

/// Apply a user mapper to every upstream row.
///
/// The mapper may emit zero or more rows per input. Both the order of
/// upstream rows and the order of rows within one mapper call are
/// preserved. The mapper is stateless across rows; any error it returns
/// aborts the chain.
pub struct Map {
    mapper: MapperFn,
}

impl Map {
    pub fn new<F>(mapper: F) -> Self
    where
        F: Fn(&Row) -> Result<Vec<Row>, CallableError> + 'static,
    {
        Self {
            mapper: Box::new(mapper),
        }
    }

    pub(crate) fn stream<'a>(&'a self, upstream: RowStream<'a>) -> RowStream<'a> {
        Box::new(MapStream {
            mapper: &self.mapper,
            upstream,
            emitted: Vec::new().into_iter(),
            failed: false,
        })
    }
}

struct MapStream<'a> {
    mapper: &'a MapperFn,
    upstream: RowStream<'a>,
    emitted: std::vec::IntoIter<Row>,
    failed: bool,
}

impl Iterator for MapStream<'_> {
    type Item = Result<Row, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(row) = self.emitted.next() {
                return Some(Ok(row));
            }
            match self.upstream.next()? {
                Ok(row) => match (self.mapper)(&row) {
                    Ok(rows) => self.emitted = rows.into_iter(),
                    Err(source) => {
                        self.failed = true;
                        return Some(Err(ExecutionError::Callable {
                            operator: "Map",
                            source,
                        }));
                    }
                },
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::operators::testing::{drain, upstream};

    fn split_words(row: &Row) -> Result<Vec<Row>, CallableError> {
        let Some(Value::Str(text)) = row.get("text") else {
            return Err("row has no 'text' field".into());
        };
        let doc_id = row.get("doc_id").cloned().unwrap_or(Value::Null);
        Ok(text
            .split_whitespace()
            .map(|word| {
                Row::from([
                    ("doc_id", doc_id.clone()),
                    ("word", Value::from(word.to_lowercase())),
                ])
            })
            .collect())
    }

    #[test]
    fn test_mapper_output_preserves_order() {
        let map = Map::new(split_words);
        let rows = drain(map.stream(upstream(vec![Row::from([
            ("doc_id", Value::from("first_text")),
            ("text", Value::from("simple text is written here")),
        ])])));

        let words: Vec<_> = rows
            .iter()
            .map(|row| row.get("word").cloned().unwrap())
            .collect();
        assert_eq!(
            words,
            vec![
                Value::from("simple"),
                Value::from("text"),
                Value::from("is"),
                Value::from("written"),
                Value::from("here"),
            ]
        );
        assert!(rows
            .iter()
            .all(|row| row.get("doc_id") == Some(&Value::from("first_text"))));
    }

    #[test]
    fn test_output_count_is_sum_of_emitted_rows() {
        let map = Map::new(split_words);
        let rows = drain(map.stream(upstream(vec![
            Row::from([("doc_id", Value::from("a")), ("text", Value::from("one two"))]),
            Row::from([("doc_id", Value::from("b")), ("text", Value::from(""))]),
            Row::from([("doc_id", Value::from("c")), ("text", Value::from("three"))]),
        ])));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_mapper_error_aborts_the_stream() {
        let map = Map::new(split_words);
        let mut stream = map.stream(upstream(vec![
            Row::from([("doc_id", Value::from("a"))]),
            Row::from([("doc_id", Value::from("b")), ("text", Value::from("never reached"))]),
        ]));

        match stream.next() {
            Some(Err(ExecutionError::Callable { operator, .. })) => assert_eq!(operator, "Map"),
            other => panic!("expected a Map callable error, got {other:?}"),
        }
        assert!(stream.next().is_none());
    }
}
