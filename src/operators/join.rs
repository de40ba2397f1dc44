// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::engine::Graph;
use crate::errors::{ConfigError, ExecutionError};
use crate::model::{Row, Value};
use crate::operators::sort::sort_rows;
use crate::operators::RowStream;

/// How the two inputs of a [`Join`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Cartesian cross of the two inputs; the only strategy that may run
    /// without a key.
    Outer,
    /// Equi-join driven by left-side groups. Left groups whose key has no
    /// match on the right emit nothing (historical behavior, kept; this is
    /// not SQL LEFT OUTER JOIN).
    Left,
    /// [`JoinStrategy::Left`] with the two sides swapped.
    Right,
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinStrategy::Outer => "outer",
            JoinStrategy::Left => "left",
            JoinStrategy::Right => "right",
        };
        write!(f, "{name}")
    }
}

impl FromStr for JoinStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outer" => Ok(JoinStrategy::Outer),
            "left" => Ok(JoinStrategy::Left),
            "right" => Ok(JoinStrategy::Right),
            other => Err(ConfigError::UnknownJoinStrategy {
                strategy: other.to_string(),
            }),
        }
    }
}

/// The key a [`Join`] matches rows on: one name used on both sides, or a
/// distinct name per side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKey {
    Single(String),
    Pair(String, String),
}

impl JoinKey {
    pub fn pair(left: impl Into<String>, right: impl Into<String>) -> Self {
        JoinKey::Pair(left.into(), right.into())
    }

    /// Key name on the upstream (left) side.
    pub fn left(&self) -> &str {
        match self {
            JoinKey::Single(key) => key,
            JoinKey::Pair(left, _) => left,
        }
    }

    /// Key name on the joined graph's (right) side.
    pub fn right(&self) -> &str {
        match self {
            JoinKey::Single(key) => key,
            JoinKey::Pair(_, right) => right,
        }
    }
}

impl From<&str> for JoinKey {
    fn from(key: &str) -> Self {
        JoinKey::Single(key.to_string())
    }
}

impl From<String> for JoinKey {
    fn from(key: String) -> Self {
        JoinKey::Single(key)
    }
}

impl TryFrom<Vec<String>> for JoinKey {
    type Error = ConfigError;

    fn try_from(keys: Vec<String>) -> Result<Self, Self::Error> {
        match <[String; 2]>::try_from(keys) {
            Ok([left, right]) => Ok(JoinKey::Pair(left, right)),
            Err(keys) => Err(ConfigError::JoinKeyArity { got: keys.len() }),
        }
    }
}

/// Join the upstream with the materialized result of another graph.
///
/// Adding a Join to a graph records the right-hand graph as a dependency,
/// so the scheduler has its result ready before this chain runs. When a
/// key is present both inputs are stably sorted by their respective key
/// names before joining; matched rows merge by right-overlay (the right
/// row's fields win on collisions).
pub struct Join {
    on: Graph,
    strategy: JoinStrategy,
    key: Option<JoinKey>,
}

impl fmt::Debug for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Join")
            .field("on", &self.on)
            .field("strategy", &self.strategy)
            .field("key", &self.key)
            .finish()
    }
}

impl Join {
    pub fn new(
        on: &Graph,
        strategy: JoinStrategy,
        key: impl Into<Option<JoinKey>>,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_none() && strategy != JoinStrategy::Outer {
            return Err(ConfigError::JoinKeyRequired {
                strategy: strategy.to_string(),
            });
        }
        Ok(Self {
            on: on.clone(),
            strategy,
            key,
        })
    }

    pub(crate) fn on(&self) -> &Graph {
        &self.on
    }

    pub(crate) fn stream<'a>(&'a self, upstream: RowStream<'a>, right: Rc<Vec<Row>>) -> RowStream<'a> {
        Box::new(JoinStream {
            join: self,
            upstream: Some((upstream, right)),
            cursor: PairCursor::default(),
            failed: false,
        })
    }

    /// Materialize both inputs and pair up the groups to cross.
    fn pair_groups(&self, left: Vec<Row>, right: Vec<Row>) -> Result<PairCursor, ExecutionError> {
        let pairs = match &self.key {
            None => vec![(left, right)],
            Some(key) => {
                let left = sort_rows(left, &[key.left()], "Join")?;
                let right = sort_rows(right, &[key.right()], "Join")?;
                match self.strategy {
                    JoinStrategy::Outer => vec![(left, right)],
                    JoinStrategy::Left => matched_groups(left, key.left(), right, key.right())?,
                    JoinStrategy::Right => matched_groups(right, key.right(), left, key.left())?,
                }
            }
        };
        Ok(PairCursor::new(pairs))
    }
}

/// Group both sides by their key and keep, in driving-side order, each
/// driving group paired with the matching group from the other side.
fn matched_groups(
    driving: Vec<Row>,
    driving_key: &str,
    other: Vec<Row>,
    other_key: &str,
) -> Result<Vec<(Vec<Row>, Vec<Row>)>, ExecutionError> {
    let driving_groups = group_by_key(driving, driving_key)?;
    let other_groups = group_by_key(other, other_key)?;

    let mut pairs = Vec::new();
    for (key_value, rows) in driving_groups {
        let matching = other_groups
            .iter()
            .find(|(other_value, _)| *other_value == key_value);
        if let Some((_, other_rows)) = matching {
            pairs.push((rows, other_rows.clone()));
        }
    }
    Ok(pairs)
}

/// Split sorted rows into runs of equal values under `key`.
fn group_by_key(rows: Vec<Row>, key: &str) -> Result<Vec<(Value, Vec<Row>)>, ExecutionError> {
    let mut groups: Vec<(Value, Vec<Row>)> = Vec::new();
    for row in rows {
        let value = row
            .get(key)
            .cloned()
            .ok_or_else(|| ExecutionError::MissingField {
                operator: "Join",
                field: key.to_string(),
            })?;
        match groups.last_mut() {
            Some((current, rows)) if *current == value => rows.push(row),
            _ => groups.push((value, vec![row])),
        }
    }
    Ok(groups)
}

struct JoinStream<'a> {
    join: &'a Join,
    /// Consumed on the first pull, when both inputs materialize.
    upstream: Option<(RowStream<'a>, Rc<Vec<Row>>)>,
    cursor: PairCursor,
    failed: bool,
}

impl Iterator for JoinStream<'_> {
    type Item = Result<Row, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some((upstream, right)) = self.upstream.take() {
            let left = match upstream.collect::<Result<Vec<_>, _>>() {
                Ok(rows) => rows,
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            };
            match self.join.pair_groups(left, (*right).clone()) {
                Ok(cursor) => self.cursor = cursor,
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
        self.cursor.next_row().map(Ok)
    }
}

/// Lazily crosses each (base, overlay) group pair: for every base row, one
/// merged row per overlay row, base fields overlaid by overlay fields.
#[derive(Default)]
struct PairCursor {
    pairs: Vec<(Vec<Row>, Vec<Row>)>,
    pair: usize,
    base: usize,
    overlay: usize,
}

impl PairCursor {
    fn new(pairs: Vec<(Vec<Row>, Vec<Row>)>) -> Self {
        Self {
            pairs,
            pair: 0,
            base: 0,
            overlay: 0,
        }
    }

    fn next_row(&mut self) -> Option<Row> {
        while self.pair < self.pairs.len() {
            let (base_rows, overlay_rows) = &self.pairs[self.pair];
            if self.base < base_rows.len() {
                if self.overlay < overlay_rows.len() {
                    let row = base_rows[self.base].overlaid_with(&overlay_rows[self.overlay]);
                    self.overlay += 1;
                    return Some(row);
                }
                self.base += 1;
                self.overlay = 0;
                continue;
            }
            self.pair += 1;
            self.base = 0;
            self.overlay = 0;
        }
        None
    }
}
