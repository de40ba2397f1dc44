// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{CallableError, ConfigError, ExecutionError};
use crate::model::Row;
use crate::operators::{ReducerFn, RowStream};

/// Feed maximal runs of consecutive rows agreeing on the grouping keys
/// through a user reducer.
///
/// The upstream must already be grouped on the keys, typically by a
/// preceding Sort on a prefix of them. No check is performed; an unsorted
/// upstream silently produces one fragment per run of equal keys. Group
/// order matches the upstream order of each key tuple's first occurrence,
/// and the reducer always receives a non-empty group.
pub struct Reduce {
    reducer: ReducerFn,
    keys: Vec<String>,
}

impl std::fmt::Debug for Reduce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reduce").field("keys", &self.keys).finish()
    }
}

impl Reduce {
    pub fn new<F, I, S>(reducer: F, keys: I) -> Result<Self, ConfigError>
    where
        F: Fn(&[Row]) -> Result<Vec<Row>, CallableError> + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(ConfigError::EmptyReduceKeys);
        }
        Ok(Self {
            reducer: Box::new(reducer),
            keys,
        })
    }

    pub(crate) fn stream<'a>(&'a self, upstream: RowStream<'a>) -> RowStream<'a> {
        Box::new(ReduceStream {
            reducer: &self.reducer,
            keys: &self.keys,
            upstream,
            buffer: Vec::new(),
            emitted: Vec::new().into_iter(),
            done: false,
            failed: false,
        })
    }
}

struct ReduceStream<'a> {
    reducer: &'a ReducerFn,
    keys: &'a [String],
    upstream: RowStream<'a>,
    /// Rows of the group currently being accumulated.
    buffer: Vec<Row>,
    /// Reducer output still to be yielded downstream.
    emitted: std::vec::IntoIter<Row>,
    done: bool,
    failed: bool,
}

impl ReduceStream<'_> {
    fn same_group(&self, previous: &Row, row: &Row) -> Result<bool, ExecutionError> {
        for key in self.keys {
            let left = previous
                .get(key)
                .ok_or_else(|| ExecutionError::MissingField {
                    operator: "Reduce",
                    field: key.clone(),
                })?;
            let right = row.get(key).ok_or_else(|| ExecutionError::MissingField {
                operator: "Reduce",
                field: key.clone(),
            })?;
            if left != right {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn flush(&mut self) -> Result<(), ExecutionError> {
        let group = std::mem::take(&mut self.buffer);
        let rows = (self.reducer)(&group).map_err(|source| ExecutionError::Callable {
            operator: "Reduce",
            source,
        })?;
        self.emitted = rows.into_iter();
        Ok(())
    }
}

impl Iterator for ReduceStream<'_> {
    type Item = Result<Row, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(row) = self.emitted.next() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            match self.upstream.next() {
                Some(Ok(row)) => {
                    let boundary = match self.buffer.last() {
                        Some(previous) => match self.same_group(previous, &row) {
                            Ok(same) => !same,
                            Err(error) => {
                                self.failed = true;
                                return Some(Err(error));
                            }
                        },
                        None => false,
                    };
                    if boundary {
                        if let Err(error) = self.flush() {
                            self.failed = true;
                            return Some(Err(error));
                        }
                    }
                    self.buffer.push(row);
                }
                Some(Err(error)) => {
                    self.failed = true;
                    return Some(Err(error));
                }
                None => {
                    self.done = true;
                    if !self.buffer.is_empty() {
                        if let Err(error) = self.flush() {
                            self.failed = true;
                            return Some(Err(error));
                        }
                    }
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

    fn word(word: &str, doc_id: &str) -> Row {
        Row::from([("doc_id", Value::from(doc_id)), ("word", Value::from(word))])
    }

    fn first_of_group(rows: &[Row]) -> Result<Vec<Row>, CallableError> {
        Ok(vec![rows[0].clone()])
    }

    fn count_group(rows: &[Row]) -> Result<Vec<Row>, CallableError> {
        Ok(vec![Row::from([
            ("word", rows[0].get("word").cloned().unwrap_or(Value::Null)),
            ("number", Value::from(rows.len() as i64)),
        ])])
    }

    #[test]
    fn test_emits_first_row_of_each_group() {
        let reduce = Reduce::new(first_of_group, ["word"]).unwrap();
        let rows = drain(reduce.stream(upstream(vec![
            word("x", "a"),
            word("x", "b"),
            word("y", "a"),
            word("y", "b"),
        ])));
        assert_eq!(rows, vec![word("x", "a"), word("y", "a")]);
    }

    #[test]
    fn test_group_order_matches_first_occurrence() {
        let reduce = Reduce::new(count_group, ["word"]).unwrap();
        let rows = drain(reduce.stream(upstream(vec![
            word("the", "a"),
            word("the", "a"),
            word("and", "a"),
        ])));
        assert_eq!(
            rows,
            vec![
                Row::from([("word", Value::from("the")), ("number", Value::from(2))]),
                Row::from([("word", Value::from("and")), ("number", Value::from(1))]),
            ]
        );
    }

    #[test]
    fn test_unsorted_upstream_fragments_groups() {
        // Reduce trusts its upstream ordering: an interleaved column makes
        // one group per consecutive run, not one per distinct value.
        let reduce = Reduce::new(count_group, ["word"]).unwrap();
        let rows = drain(reduce.stream(upstream(vec![
            word("x", "a"),
            word("y", "a"),
            word("x", "b"),
        ])));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_empty_upstream_emits_nothing() {
        let reduce = Reduce::new(first_of_group, ["word"]).unwrap();
        let mut stream = reduce.stream(upstream(vec![]));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_grouping_on_key_tuple() {
        let reduce = Reduce::new(first_of_group, ["doc_id", "word"]).unwrap();
        let rows = drain(reduce.stream(upstream(vec![
            word("x", "a"),
            word("x", "a"),
            word("x", "b"),
        ])));
        assert_eq!(rows, vec![word("x", "a"), word("x", "b")]);
    }

    #[test]
    fn test_missing_grouping_key_fails() {
        let reduce = Reduce::new(first_of_group, ["word"]).unwrap();
        let mut stream = reduce.stream(upstream(vec![
            word("x", "a"),
            Row::from([("doc_id", Value::from("b"))]),
        ]));
        assert!(matches!(
            stream.next(),
            Some(Err(ExecutionError::MissingField { operator: "Reduce", .. }))
        ));
    }

    #[test]
    fn test_empty_key_list_is_rejected() {
        let error = Reduce::new(first_of_group, Vec::<String>::new()).unwrap_err();
        assert_eq!(error, ConfigError::EmptyReduceKeys);
    }
}
