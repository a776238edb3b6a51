//! # API Route Modules
//!
//! - `submissions`: submit, recover a partial commit, look up a record.
//! - `groups`: read-only view of published groups.

pub mod groups;
pub mod submissions;
