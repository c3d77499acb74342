//! Record fields that distinguish "missing" from an explicit `null`.
//!
//! Exports print a field the way a template string would: a missing key
//! renders `undefined`, a JSON `null` renders `null`. Pair the field with
//! `#[serde(default, skip_serializing_if = "WireValue::is_absent")]` so a
//! missing key decodes as [`WireValue::Absent`] and is omitted again on
//! output.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// Text written for a missing field.
pub const ABSENT_TEXT: &str = "undefined";

/// Text written for an explicit `null`.
pub const NULL_TEXT: &str = "null";

/// A record field as it arrived on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireValue<T> {
    /// The key was not in the payload.
    Absent,
    /// The key was present with a `null` value.
    Null,
    /// The key carried a value.
    Present(T),
}

impl<T> WireValue<T> {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The value, if one was sent.
    #[must_use]
    pub const fn present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Render with `render` when present, otherwise `undefined` / `null`.
    pub fn text_with(&self, render: impl FnOnce(&T) -> String) -> String {
        match self {
            Self::Absent => ABSENT_TEXT.to_owned(),
            Self::Null => NULL_TEXT.to_owned(),
            Self::Present(value) => render(value),
        }
    }
}

impl<T: Deref> WireValue<T> {
    /// Borrow the dereferenced value, if one was sent.
    #[must_use]
    pub fn as_deref(&self) -> Option<&T::Target> {
        self.present().map(Deref::deref)
    }
}

impl<T> Default for WireValue<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<T> for WireValue<T> {
    fn from(value: T) -> Self {
        Self::Present(value)
    }
}

impl From<&str> for WireValue<Box<str>> {
    fn from(value: &str) -> Self {
        Self::Present(Box::from(value))
    }
}

impl<T: fmt::Display> fmt::Display for WireValue<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => formatter.write_str(ABSENT_TEXT),
            Self::Null => formatter.write_str(NULL_TEXT),
            Self::Present(value) => value.fmt(formatter),
        }
    }
}

impl<T: Serialize> Serialize for WireValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => serializer.serialize_some(value),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for WireValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Self::Null, Self::Present))
    }
}
