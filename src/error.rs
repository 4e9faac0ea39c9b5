use thiserror::Error;

/// The error returned by strict lookups, such as [`AvlMap::at`], when the key is not present.
///
/// Mutations never fail this way: inserting an existing key overwrites it, and removing a missing
/// key does nothing.
///
/// [`AvlMap::at`]: crate::AvlMap::at
#[derive(Error, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[error("key not found")]
pub struct KeyError;
