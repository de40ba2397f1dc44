// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod row;
mod value;

pub use row::Row;
pub use value::Value;
