//! API surface exposed to callers of the backend.

pub mod search;
