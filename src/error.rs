//! Fatal errors: conditions under which no usable document model exists.
//!
//! Semantic deviations from the Swagger specification are *not* fatal; those
//! are collected as [`crate::ValidationError`] and the model is still
//! populated best-effort. This module covers the out-of-band failures only:
//! input the scanner cannot tokenize, structurally impossible operations on
//! the node tree, factory lookups that indicate a model-author bug, and I/O.

use std::fmt;

use saphyr_parser::ScanError;

use crate::location::Location;

/// Fatal error returned out-of-band from unmarshal/marshal/sync.
#[derive(Debug)]
pub enum Error {
    /// Free-form error with optional source location.
    Message { msg: String, location: Location },
    /// Malformed input the underlying scanner could not tokenize.
    Scan { msg: String, location: Location },
    /// Unexpected end of input.
    Eof { location: Location },
    /// A nil node was passed where one is structurally required.
    NilNode { context: &'static str },
    /// Alias references an anchor that was never defined.
    UnknownAnchor { name: String, location: Location },
    /// Alias replay limits exceeded (alias-bomb hardening).
    AliasLimit { msg: String, location: Location },
    /// A type-factory lookup missed: the model never registered the type.
    /// This is a model-author bug, not a user input error.
    FactoryMiss { type_name: &'static str },
    /// Unexpected I/O error from the caller's reader or writer.
    Io { cause: std::io::Error },
}

impl Error {
    /// Construct a `Message` error with no known location.
    ///
    /// Arguments:
    /// - `s`: human-readable message.
    ///
    /// Called by:
    /// - The composer and emitter for structural failures.
    pub(crate) fn msg<S: Into<String>>(s: S) -> Self {
        Error::Message {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct an unexpected end-of-input error with unknown location.
    pub(crate) fn eof() -> Self {
        Error::Eof {
            location: Location::UNKNOWN,
        }
    }

    /// Construct a `NilNode` error naming the operation that required a node.
    pub(crate) fn nil_node(context: &'static str) -> Self {
        Error::NilNode { context }
    }

    /// Attach/override a concrete location to this error and return it.
    ///
    /// Called by:
    /// - Most error paths once the event position becomes known.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Message { location, .. }
            | Error::Scan { location, .. }
            | Error::Eof { location }
            | Error::UnknownAnchor { location, .. }
            | Error::AliasLimit { location, .. } => {
                *location = set_location;
            }
            // These carry no source position.
            Error::NilNode { .. } | Error::FactoryMiss { .. } | Error::Io { .. } => {}
        }
        self
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Message { location, .. }
            | Error::Scan { location, .. }
            | Error::Eof { location }
            | Error::UnknownAnchor { location, .. }
            | Error::AliasLimit { location, .. } => {
                if location.is_known() {
                    Some(*location)
                } else {
                    None
                }
            }
            Error::NilNode { .. } | Error::FactoryMiss { .. } | Error::Io { .. } => None,
        }
    }

    /// Map a `saphyr_parser::ScanError` into our error type with location.
    ///
    /// Called by:
    /// - The node composer when the underlying parser fails.
    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let mark = err.marker();
        let location = Location::new(mark.line(), mark.col() + 1);
        Error::Scan {
            msg: err.info().to_owned(),
            location,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message { msg, location } => fmt_with_location(f, msg, location),
            Error::Scan { msg, location } => fmt_with_location(f, msg, location),
            Error::Eof { location } => fmt_with_location(f, "unexpected end of input", location),
            Error::NilNode { context } => {
                write!(f, "nil node where one is required: {context}")
            }
            Error::UnknownAnchor { name, location } => {
                fmt_with_location(f, &format!("alias references unknown anchor &{name}"), location)
            }
            Error::AliasLimit { msg, location } => fmt_with_location(f, msg, location),
            Error::FactoryMiss { type_name } => {
                write!(f, "no factory registered for type {type_name}")
            }
            Error::Io { cause } => write!(f, "IO error: {cause}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::Io { cause }
    }
}

impl From<std::fmt::Error> for Error {
    fn from(e: std::fmt::Error) -> Self {
        Error::msg(e.to_string())
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location.is_known() {
        write!(f, "{msg} at line {}, column {}", location.line, location.column)
    } else {
        write!(f, "{msg}")
    }
}
