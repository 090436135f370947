//! core::attrib
//!
//! Positional attribute values.
//!
//! # Overview
//!
//! An attribute on a project or package carries an ordered list of values.
//! Every value has a 1-based [`Position`] that is unique within its owning
//! attribute. A value created without an explicit position takes the first
//! free slot among its siblings.
//!
//! # Defaults
//!
//! A value created without explicit content is filled from the attribute
//! type's default-value table, looked up by position. The lookup happens once,
//! in [`AttribValue::new`]; later edits to the table never reach values that
//! already exist. A value with no owning attribute resolves to `""`.
//!
//! The table is passed in by the caller through the [`DefaultValues`] trait
//! instead of being reached through the owner, so the same logic serves
//! persisted and transient values alike.
//!
//! # Example
//!
//! ```
//! use tiercheck::core::attrib::{
//!     AttribId, AttribValueList, DefaultValueTable, NewAttribValue, Position,
//! };
//!
//! let defaults = DefaultValueTable::new().with(Position::FIRST, "unstable");
//! let mut list = AttribValueList::new(AttribId(7));
//!
//! let first = list.push(NewAttribValue::default(), Some(&defaults));
//! assert_eq!(first.position(), Position::FIRST);
//! assert_eq!(first.value(), "unstable");
//!
//! let second = list.push(NewAttribValue::default(), Some(&defaults));
//! assert_eq!(second.position().get(), 2);
//! assert_eq!(second.value(), "");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from attribute value operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttribError {
    #[error("invalid position {0}: positions start at 1")]
    InvalidPosition(u32),

    #[error("position {0} is already taken")]
    PositionTaken(u32),

    #[error("no value at position {0}")]
    NoSuchPosition(u32),
}

/// A 1-based position within an attribute's value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Position(u32);

impl Position {
    /// The first position of every list.
    pub const FIRST: Position = Position(1);

    /// Create a validated position.
    ///
    /// # Errors
    ///
    /// Returns `AttribError::InvalidPosition` for zero.
    pub fn new(position: u32) -> Result<Self, AttribError> {
        if position == 0 {
            return Err(AttribError::InvalidPosition(position));
        }
        Ok(Self(position))
    }

    /// Get the numeric position.
    pub fn get(self) -> u32 {
        self.0
    }

    fn successor(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<u32> for Position {
    type Error = AttribError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Position> for u32 {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the attribute that owns a value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttribId(pub u64);

/// Type-level default values, keyed by position.
pub trait DefaultValues {
    /// The default for `position`, if the attribute type defines one.
    fn find_by_position(&self, position: Position) -> Option<&str>;
}

/// An in-memory default-value table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultValueTable {
    values: BTreeMap<Position, String>,
}

impl DefaultValueTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, position: Position, value: impl Into<String>) -> Self {
        self.values.insert(position, value.into());
        self
    }

    /// Set the default for `position`, returning the previous one.
    pub fn insert(&mut self, position: Position, value: impl Into<String>) -> Option<String> {
        self.values.insert(position, value.into())
    }

    /// Remove the default for `position`.
    pub fn remove(&mut self, position: Position) -> Option<String> {
        self.values.remove(&position)
    }
}

impl DefaultValues for DefaultValueTable {
    fn find_by_position(&self, position: Position) -> Option<&str> {
        self.values.get(&position).map(String::as_str)
    }
}

/// Resolve the default value for `position`.
///
/// Returns the table's value when present, `""` otherwise. A missing table
/// (no owning attribute) also yields `""`.
pub fn resolve_default(position: Position, defaults: Option<&dyn DefaultValues>) -> String {
    defaults
        .and_then(|table| table.find_by_position(position))
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Choose the position for a new value given its siblings' positions.
///
/// `existing` is in insertion order. A requested position is honored when it
/// is free. Otherwise the value takes the lowest position not already used,
/// which is `1` for an empty list and the next slot after the tail for a
/// densely packed one.
pub fn assign_position(existing: &[Position], requested: Option<Position>) -> Position {
    if let Some(requested) = requested {
        if !existing.contains(&requested) {
            return requested;
        }
    }

    let mut candidate = Position::FIRST;
    while existing.contains(&candidate) {
        candidate = candidate.successor();
    }
    candidate
}

/// Fields supplied when a value is created. Unset fields are computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAttribValue {
    /// Explicit content, or `None` to take the positional default
    pub value: Option<String>,
    /// Explicit position, or `None` to take the next free slot
    pub position: Option<Position>,
}

impl NewAttribValue {
    /// A value with explicit content at the next free position.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            position: None,
        }
    }

    /// A value at an explicit position with defaulted content.
    pub fn at(position: Position) -> Self {
        Self {
            value: None,
            position: Some(position),
        }
    }
}

/// A single value inside an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttribValue {
    value: String,
    position: Position,
    attrib: Option<AttribId>,
}

impl AttribValue {
    /// Construct a value, resolving position and content exactly once.
    ///
    /// `siblings` are the positions already used by the owning attribute, in
    /// insertion order. Content defaults only apply when `attrib` is set.
    pub fn new(
        fields: NewAttribValue,
        attrib: Option<AttribId>,
        siblings: &[Position],
        defaults: Option<&dyn DefaultValues>,
    ) -> Self {
        let position = assign_position(siblings, fields.position);
        let value = match fields.value {
            Some(value) => value,
            None if attrib.is_some() => resolve_default(position, defaults),
            None => String::new(),
        };
        Self {
            value,
            position,
            attrib,
        }
    }

    /// A value with no owning attribute.
    pub fn detached(fields: NewAttribValue) -> Self {
        Self::new(fields, None, &[], None)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn attrib(&self) -> Option<AttribId> {
        self.attrib
    }

    /// Replace the content.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

impl std::fmt::Display for AttribValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// The values of one attribute, scoped by the owning attribute.
///
/// Positions are unique within the list. Dropping the list drops every
/// value in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttribValueList {
    attrib: AttribId,
    values: Vec<AttribValue>,
}

impl AttribValueList {
    /// Create an empty list for `attrib`.
    pub fn new(attrib: AttribId) -> Self {
        Self {
            attrib,
            values: Vec::new(),
        }
    }

    pub fn attrib(&self) -> AttribId {
        self.attrib
    }

    /// Positions in insertion order.
    pub fn positions(&self) -> Vec<Position> {
        self.values.iter().map(AttribValue::position).collect()
    }

    /// Add a value, assigning its position against the current siblings.
    pub fn push(
        &mut self,
        fields: NewAttribValue,
        defaults: Option<&dyn DefaultValues>,
    ) -> &AttribValue {
        let siblings = self.positions();
        let value = AttribValue::new(fields, Some(self.attrib), &siblings, defaults);
        let index = self.values.len();
        self.values.push(value);
        &self.values[index]
    }

    /// The value at `position`.
    pub fn get(&self, position: Position) -> Option<&AttribValue> {
        self.values.iter().find(|v| v.position == position)
    }

    /// Values sorted by position.
    pub fn ordered(&self) -> Vec<&AttribValue> {
        let mut ordered: Vec<&AttribValue> = self.values.iter().collect();
        // Stable: insertion order breaks ties.
        ordered.sort_by_key(|v| v.position);
        ordered
    }

    /// Update the content at `position`.
    ///
    /// # Errors
    ///
    /// Returns `AttribError::NoSuchPosition` if no value sits there.
    pub fn set_value(
        &mut self,
        position: Position,
        value: impl Into<String>,
    ) -> Result<(), AttribError> {
        let entry = self
            .values
            .iter_mut()
            .find(|v| v.position == position)
            .ok_or(AttribError::NoSuchPosition(position.get()))?;
        entry.set_value(value);
        Ok(())
    }

    /// Move the value at `from` to the free position `to`.
    ///
    /// # Errors
    ///
    /// - `NoSuchPosition` if nothing sits at `from`
    /// - `PositionTaken` if another value already holds `to`
    pub fn move_to(&mut self, from: Position, to: Position) -> Result<(), AttribError> {
        if from == to {
            return self
                .get(from)
                .map(|_| ())
                .ok_or(AttribError::NoSuchPosition(from.get()));
        }
        if self.get(to).is_some() {
            return Err(AttribError::PositionTaken(to.get()));
        }
        let entry = self
            .values
            .iter_mut()
            .find(|v| v.position == from)
            .ok_or(AttribError::NoSuchPosition(from.get()))?;
        entry.position = to;
        Ok(())
    }

    /// Remove and return the value at `position`.
    pub fn remove(&mut self, position: Position) -> Option<AttribValue> {
        let index = self.values.iter().position(|v| v.position == position)?;
        Some(self.values.remove(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
