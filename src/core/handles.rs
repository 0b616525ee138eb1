//! Handle type traits for subdivision payloads.
//!
//! This module contains the trait bound for the opaque payloads an
//! application attaches to points, directed edges, and faces.

use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, hash::Hash};

/// Trait alias for payloads that can be attached to points, edges, and faces.
///
/// The engine never interprets handles; it only stores, copies, and returns
/// them. Handles must implement `Copy` so they can be duplicated freely when
/// edges are split or faces retriangulated.
///
/// # Usage
///
/// ```rust
/// use subdivision::core::handles::HandleType;
///
/// fn tag_face<F: HandleType>(handle: F) {
///     // F has all the necessary bounds for use as a face payload
/// }
///
/// // Examples of types that implement HandleType:
/// // - i32, u64, char (primitive Copy types)
/// // - Option<T> where T: HandleType
/// // - () (unit type for no payload)
/// // - Custom Copy enums with serde support
/// ```
pub trait HandleType:
    Copy + Eq + Hash + Ord + PartialEq + PartialOrd + Debug + Serialize + DeserializeOwned
{
}

// Blanket implementation for all types that satisfy the bounds
impl<T> HandleType for T where
    T: Copy + Eq + Hash + Ord + PartialEq + PartialOrd + Debug + Serialize + DeserializeOwned
{
}
