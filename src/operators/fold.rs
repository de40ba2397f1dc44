// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{CallableError, ExecutionError};
use crate::model::Row;
use crate::operators::{FolderFn, RowStream};

/// Fold the whole upstream into a single row.
///
/// The folder is applied strictly left to right in arrival order;
/// associativity is not required. Exactly one row, the final accumulator,
/// is emitted, which is the initial accumulator itself when the upstream
/// is empty.
pub struct Fold {
    folder: FolderFn,
    initial: Row,
}

impl Fold {
    pub fn new<F>(folder: F, initial: Row) -> Self
    where
        F: Fn(Row, &Row) -> Result<Row, CallableError> + 'static,
    {
        Self {
            folder: Box::new(folder),
            initial,
        }
    }

    pub(crate) fn stream<'a>(&'a self, upstream: RowStream<'a>) -> RowStream<'a> {
        Box::new(FoldStream {
            folder: &self.folder,
            accumulator: Some(self.initial.clone()),
            upstream,
        })
    }
}

struct FoldStream<'a> {
    folder: &'a FolderFn,
    accumulator: Option<Row>,
    upstream: RowStream<'a>,
}

impl Iterator for FoldStream<'_> {
    type Item = Result<Row, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut accumulator = self.accumulator.take()?;
        for row in self.upstream.by_ref() {
            let row = match row {
                Ok(row) => row,
                Err(error) => return Some(Err(error)),
            };
            accumulator = match (self.folder)(accumulator, &row) {
                Ok(next) => next,
                Err(source) => {
                    return Some(Err(ExecutionError::Callable {
                        operator: "Fold",
                        source,
                    }))
                }
            };
        }
        Some(Ok(accumulator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::operators::testing::{drain, upstream};

    fn count_documents(mut state: Row, _row: &Row) -> Result<Row, CallableError> {
        let count = match state.get("docs_count") {
            Some(Value::Int(n)) => *n,
            _ => 0,
        };
        state.insert("docs_count", count + 1);
        Ok(state)
    }

    #[test]
    fn test_folds_to_one_row() {
        let fold = Fold::new(count_documents, Row::from([("docs_count", Value::from(0))]));
        let rows = drain(fold.stream(upstream(vec![Row::new(), Row::new(), Row::new()])));
        assert_eq!(rows, vec![Row::from([("docs_count", Value::from(3))])]);
    }

    #[test]
    fn test_empty_upstream_yields_initial_accumulator_once() {
        let fold = Fold::new(count_documents, Row::from([("docs_count", Value::from(0))]));
        let mut stream = fold.stream(upstream(vec![]));
        assert_eq!(
            stream.next().unwrap().unwrap(),
            Row::from([("docs_count", Value::from(0))])
        );
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_application_is_left_to_right() {
        let fold = Fold::new(
            |mut state: Row, row: &Row| {
                let seen = match state.get("seen") {
                    Some(Value::Str(s)) => s.clone(),
                    _ => String::new(),
                };
                let Some(Value::Str(id)) = row.get("id") else {
                    return Err("row has no 'id' field".into());
                };
                state.insert("seen", format!("{seen}{id}"));
                Ok(state)
            },
            Row::from([("seen", Value::from(""))]),
        );
        let rows = drain(fold.stream(upstream(vec![
            Row::from([("id", Value::from("a"))]),
            Row::from([("id", Value::from("b"))]),
            Row::from([("id", Value::from("c"))]),
        ])));
        assert_eq!(rows[0].get("seen"), Some(&Value::from("abc")));
    }

    #[test]
    fn test_folder_error_surfaces() {
        let fold = Fold::new(
            |_state, _row: &Row| Err("folder refused the row".into()),
            Row::new(),
        );
        let mut stream = fold.stream(upstream(vec![Row::new()]));
        match stream.next() {
            Some(Err(ExecutionError::Callable { operator, .. })) => assert_eq!(operator, "Fold"),
            other => panic!("expected a Fold callable error, got {other:?}"),
        }
    }
}
