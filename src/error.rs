//! Error types returned by `ProbingMap` and `MinPQueue`

use std::fmt::{self, Display};

/// Returned by [`ProbingMap`](crate::ProbingMap) lookups and removals when the key has no live
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyNotFound;

impl Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key not found in ProbingMap")
    }
}

impl std::error::Error for KeyNotFound {}

/// Returned by [`MinPQueue`](crate::MinPQueue) when the minimum is requested from an empty queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmptyQueue;

impl Display for EmptyQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MinPQueue is empty")
    }
}

impl std::error::Error for EmptyQueue {}
