// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;

use crate::errors::{ConfigError, ExecutionError};
use crate::model::{Row, Value};
use crate::operators::RowStream;

/// Materialize the upstream and emit it stably sorted, ascending, by the
/// tuple of named key values.
///
/// Every row must carry every key, and each key column must hold values of
/// a single kind; a cross-variant comparison fails the chain. Sorting
/// happens once per compiled operator instance. Join reuses [`sort_rows`]
/// for the internal sorts of its two inputs.
#[derive(Debug)]
pub struct Sort {
    keys: Vec<String>,
}

impl Sort {
    pub fn new<I, S>(keys: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(ConfigError::EmptySortKeys);
        }
        Ok(Self { keys })
    }

    pub(crate) fn stream<'a>(&'a self, upstream: RowStream<'a>) -> RowStream<'a> {
        Box::new(SortStream {
            keys: &self.keys,
            upstream: Some(upstream),
            sorted: Vec::new().into_iter(),
            failed: false,
        })
    }
}

struct SortStream<'a> {
    keys: &'a [String],
    upstream: Option<RowStream<'a>>,
    sorted: std::vec::IntoIter<Row>,
    failed: bool,
}

impl Iterator for SortStream<'_> {
    type Item = Result<Row, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some(upstream) = self.upstream.take() {
            let rows = match upstream.collect::<Result<Vec<_>, _>>() {
                Ok(rows) => rows,
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            };
            match sort_rows(rows, self.keys, "Sort") {
                Ok(sorted) => self.sorted = sorted.into_iter(),
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
        self.sorted.next().map(Ok)
    }
}

/// Stable sort of `rows` ascending by the values under `keys`.
///
/// Missing keys and cross-variant comparisons surface as errors named
/// after `operator`, the caller's diagnostic label.
pub(crate) fn sort_rows<S: AsRef<str>>(
    rows: Vec<Row>,
    keys: &[S],
    operator: &'static str,
) -> Result<Vec<Row>, ExecutionError> {
    let mut decorated = rows
        .into_iter()
        .map(|row| {
            let tuple = extract_key(&row, keys, operator)?;
            Ok((tuple, row))
        })
        .collect::<Result<Vec<_>, ExecutionError>>()?;

    // sort_by cannot fail, so a comparison error is parked and every
    // remaining comparison degrades to Equal, which keeps the sort stable
    // until the error is rethrown below.
    let mut comparison_error = None;
    decorated.sort_by(|(left, _), (right, _)| {
        if comparison_error.is_some() {
            return Ordering::Equal;
        }
        match compare_tuples(left, right) {
            Ok(ordering) => ordering,
            Err(error) => {
                comparison_error = Some(error);
                Ordering::Equal
            }
        }
    });
    if let Some(error) = comparison_error {
        return Err(error);
    }

    Ok(decorated.into_iter().map(|(_, row)| row).collect())
}

/// The tuple of values under `keys`, in key order.
fn extract_key<S: AsRef<str>>(
    row: &Row,
    keys: &[S],
    operator: &'static str,
) -> Result<Vec<Value>, ExecutionError> {
    keys.iter()
        .map(|key| {
            row.get(key.as_ref())
                .cloned()
                .ok_or_else(|| ExecutionError::MissingField {
                    operator,
                    field: key.as_ref().to_string(),
                })
        })
        .collect()
}

fn compare_tuples(left: &[Value], right: &[Value]) -> Result<Ordering, ExecutionError> {
    for (l, r) in left.iter().zip(right.iter()) {
        match l.try_cmp(r)? {
            Ordering::Equal => continue,
            decided => return Ok(decided),
        }
    }
    Ok(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::testing::{drain, upstream};

    fn doc(text: &str, doc_id: &str) -> Row {
        Row::from([("doc_id", Value::from(doc_id)), ("text", Value::from(text))])
    }

    #[test]
    fn test_sorts_by_single_key() {
        let sort = Sort::new(["text"]).unwrap();
        let rows = drain(sort.stream(upstream(vec![
            doc("b", "first_text"),
            doc("c", "second_text"),
            doc("a", "third_text"),
        ])));
        assert_eq!(
            rows,
            vec![
                doc("a", "third_text"),
                doc("b", "first_text"),
                doc("c", "second_text"),
            ]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let sort = Sort::new(["word"]).unwrap();
        let rows = drain(sort.stream(upstream(vec![
            Row::from([("word", Value::from("x")), ("position", Value::from(0))]),
            Row::from([("word", Value::from("a")), ("position", Value::from(1))]),
            Row::from([("word", Value::from("x")), ("position", Value::from(2))]),
        ])));
        assert_eq!(rows[0].get("position"), Some(&Value::from(1)));
        assert_eq!(rows[1].get("position"), Some(&Value::from(0)));
        assert_eq!(rows[2].get("position"), Some(&Value::from(2)));
    }

    #[test]
    fn test_sorts_by_key_tuple_in_order() {
        let sort = Sort::new(["doc_id", "word"]).unwrap();
        let rows = drain(sort.stream(upstream(vec![
            Row::from([("doc_id", Value::from("b")), ("word", Value::from("a"))]),
            Row::from([("doc_id", Value::from("a")), ("word", Value::from("z"))]),
            Row::from([("doc_id", Value::from("a")), ("word", Value::from("b"))]),
        ])));
        assert_eq!(rows[0].get("doc_id"), Some(&Value::from("a")));
        assert_eq!(rows[0].get("word"), Some(&Value::from("b")));
        assert_eq!(rows[1].get("word"), Some(&Value::from("z")));
        assert_eq!(rows[2].get("doc_id"), Some(&Value::from("b")));
    }

    #[test]
    fn test_missing_key_fails() {
        let sort = Sort::new(["word"]).unwrap();
        let mut stream = sort.stream(upstream(vec![Row::from([("doc_id", Value::from("a"))])]));
        match stream.next() {
            Some(Err(ExecutionError::MissingField { operator, field })) => {
                assert_eq!(operator, "Sort");
                assert_eq!(field, "word");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_mixed_kind_key_column_fails() {
        let sort = Sort::new(["key"]).unwrap();
        let mut stream = sort.stream(upstream(vec![
            Row::from([("key", Value::from("a"))]),
            Row::from([("key", Value::from(1))]),
        ]));
        assert!(matches!(
            stream.next(),
            Some(Err(ExecutionError::IncomparableValues { .. }))
        ));
    }

    #[test]
    fn test_empty_key_list_is_rejected() {
        let error = Sort::new(Vec::<String>::new()).unwrap_err();
        assert_eq!(error, ConfigError::EmptySortKeys);
    }
}
