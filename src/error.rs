// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Error types for `rxreport`.
//!
//! Failures fall into three groups:
//! - input problems ([`ErrorKind::InvalidData`][]) such as a table row with the wrong number of
//!   cells,
//! - asset problems ([`AssetError`][]) that are reported to the caller as warnings and never
//!   abort a report,
//! - layout problems ([`ErrorKind::LayoutOverflow`][]) where a section cannot fit on an empty
//!   page.  These abort the report, no partial document is returned.
//!
//! [`AssetError`]: struct.AssetError.html
//! [`ErrorKind::InvalidData`]: enum.ErrorKind.html#variant.InvalidData
//! [`ErrorKind::LayoutOverflow`]: enum.ErrorKind.html#variant.LayoutOverflow

use std::error;
use std::fmt;
use std::io;

/// Helper trait for creating [`Error`][] instances.
///
/// This trait is inspired by [`anyhow::Context`][].
///
/// [`Error`]: struct.Error.html
/// [`anyhow::Context`]: https://docs.rs/anyhow/latest/anyhow/trait.Context.html
pub trait Context<T> {
    /// Maps the error to an [`Error`][] instance with the given message.
    ///
    /// [`Error`]: struct.Error.html
    fn context(self, msg: impl Into<String>) -> Result<T, Error>;

    /// Maps the error to an [`Error`][] instance message produced by the given callback.
    ///
    /// [`Error`]: struct.Error.html
    fn with_context<F, S>(self, cb: F) -> Result<T, Error>
    where
        F: Fn() -> S,
        S: Into<String>;
}

impl<T, E: Into<ErrorKind>> Context<T> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T, Error> {
        self.map_err(|err| Error::new(msg, err))
    }

    fn with_context<F, S>(self, cb: F) -> Result<T, Error>
    where
        F: Fn() -> S,
        S: Into<String>,
    {
        self.map_err(move |err| Error::new(cb(), err))
    }
}

/// An error that occured in a `rxreport` function.
///
/// The error consists of an error message (provided by the `Display` implementation) and an error
/// kind, see [`kind`](#method.kind).
#[derive(Debug)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
}

impl Error {
    /// Creates a new error.
    pub fn new(msg: impl Into<String>, kind: impl Into<ErrorKind>) -> Error {
        Error {
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Returns the error kind for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns `true` if this error aborted the layout because a section can never fit on a page.
    pub fn is_layout_overflow(&self) -> bool {
        matches!(self.kind, ErrorKind::LayoutOverflow)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Internal => None,
            ErrorKind::InvalidData => None,
            ErrorKind::InvalidFont => None,
            ErrorKind::LayoutOverflow => None,
            ErrorKind::UnsupportedEncoding => None,
            ErrorKind::Asset(err) => Some(err),
            ErrorKind::IoError(err) => Some(err),
            ErrorKind::PdfError(err) => Some(err),
            ErrorKind::PdfIndexError(err) => Some(err),
            ErrorKind::RusttypeError(err) => Some(err),
            ErrorKind::ImageError(err) => Some(err),
            ErrorKind::JsonError(err) => Some(err),
        }
    }
}

/// The kind of an [`Error`](struct.Error.html).
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An internal error.
    Internal,
    /// An error caused by invalid or malformed input data.
    InvalidData,
    /// An error caused by an invalid font.
    InvalidFont,
    /// A section requested more space than an empty page can provide.
    LayoutOverflow,
    /// A string with unsupported characters was used with a built-in font.
    UnsupportedEncoding,
    /// A decorative asset could not be loaded.
    Asset(AssetError),
    /// An IO error.
    IoError(io::Error),
    /// An error caused by invalid data in `printpdf`.
    PdfError(printpdf::PdfError),
    /// An error caused by an invalid index in `printpdf`.
    PdfIndexError(printpdf::IndexError),
    /// An error caused by `rusttype`.
    RusttypeError(rusttype::Error),
    /// An error caused by `image`.
    ImageError(image::ImageError),
    /// An error caused by `serde_json`.
    JsonError(serde_json::Error),
}

impl From<io::Error> for ErrorKind {
    fn from(error: io::Error) -> ErrorKind {
        ErrorKind::IoError(error)
    }
}

impl From<printpdf::Error> for ErrorKind {
    fn from(error: printpdf::Error) -> ErrorKind {
        match error {
            printpdf::Error::Io(err) => err.into(),
            printpdf::Error::Rusttype(err) => err.into(),
            printpdf::Error::Pdf(err) => err.into(),
            printpdf::Error::Index(err) => err.into(),
        }
    }
}

impl From<printpdf::IndexError> for ErrorKind {
    fn from(error: printpdf::IndexError) -> ErrorKind {
        ErrorKind::PdfIndexError(error)
    }
}

impl From<printpdf::PdfError> for ErrorKind {
    fn from(error: printpdf::PdfError) -> ErrorKind {
        ErrorKind::PdfError(error)
    }
}

impl From<rusttype::Error> for ErrorKind {
    fn from(error: rusttype::Error) -> ErrorKind {
        ErrorKind::RusttypeError(error)
    }
}

impl From<image::ImageError> for ErrorKind {
    fn from(error: image::ImageError) -> ErrorKind {
        ErrorKind::ImageError(error)
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(error: serde_json::Error) -> ErrorKind {
        ErrorKind::JsonError(error)
    }
}

impl From<AssetError> for ErrorKind {
    fn from(error: AssetError) -> ErrorKind {
        ErrorKind::Asset(error)
    }
}

/// A decorative image or logo that could not be loaded.
///
/// Asset failures never abort a report.  The report builder collects them and hands them back to
/// the caller together with the finished document.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetError {
    asset: String,
    reason: String,
}

impl AssetError {
    /// Creates a new asset error for the asset with the given name.
    pub fn new(asset: impl Into<String>, reason: impl fmt::Display) -> AssetError {
        AssetError {
            asset: asset.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the name of the asset that failed to load.
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Returns a description of the failure.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to load asset {}: {}", self.asset, self.reason)
    }
}

impl error::Error for AssetError {}
