// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod engine;     // graph wiring, scheduling and chain execution
pub mod errors;     // error handling
pub mod io;         // line-delimited record reader/writer
pub mod model;      // schemaless rows and values
pub mod observability;
pub mod operators;  // streaming operators (Map, Fold, Sort, Reduce, Join)
