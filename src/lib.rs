//! # Probing Priority Queue
//!
//! An updatable min-priority queue over distinct elements, backed by a hash map with linear
//! probing.
//!
//! This crate provides two data structures:
//!
//! - `ProbingMap`: an open-addressing hash map with linear probing and tombstone deletion
//! - `MinPQueue`: a binary min-heap whose elements can have their priority lowered or raised in
//!   O(log N), using a `ProbingMap` to track each element's position in the heap
//!
//! Neither structure is thread-safe.
//!
//! ## Priority Queue Usage
//!
//! ```rust
//! use probing_pqueue::{EmptyQueue, MinPQueue};
//!
//! let mut queue = MinPQueue::new();
//!
//! // Queue elements with priorities
//! queue.add_or_update("A", 10.0);
//! queue.add_or_update("B", 5.0);
//! queue.add_or_update("C", 7.0);
//! assert_eq!(queue.peek(), Ok(&"B"));
//!
//! // Lower the priority of an element already in the queue
//! queue.add_or_update("A", 1.0);
//! assert_eq!(queue.min_priority(), Ok(1.0));
//!
//! // Remove elements in priority order
//! assert_eq!(queue.remove(), Ok("A"));
//! assert_eq!(queue.remove(), Ok("B"));
//! assert_eq!(queue.remove(), Ok("C"));
//! assert_eq!(queue.remove(), Err(EmptyQueue));
//! ```
//!
//! ## Map Usage
//!
//! ```rust
//! use probing_pqueue::{KeyNotFound, ProbingMap};
//!
//! let mut map = ProbingMap::new();
//!
//! // Insert values
//! map.put("apple".to_string(), 1);
//! map.put("banana".to_string(), 2);
//! assert_eq!(map.get("apple"), Ok(&1));
//!
//! // Update values
//! map.put("apple".to_string(), 10);
//! assert_eq!(map.get("apple"), Ok(&10));
//!
//! // Remove values
//! assert_eq!(map.remove("apple"), Ok(10));
//! assert_eq!(map.get("apple"), Err(KeyNotFound));
//! ```

/// Error types shared by both structures
mod error;
/// Module implementing the heap-backed priority queue
mod min_pqueue;
/// Module implementing the linear-probing hash map
mod probing_map;

pub use error::{EmptyQueue, KeyNotFound};
pub use min_pqueue::MinPQueue;
pub use probing_map::{INITIAL_CAPACITY, Iter, Keys, MAX_LOAD_FACTOR, ProbingMap};
