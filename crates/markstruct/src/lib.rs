//! In-place Markdown to HTML conversion of struct fields.
//!
//! `markstruct` walks a mutable record, finds string-bearing fields and
//! replaces their contents with the output of a render adapter, by default
//! CommonMark rendered to HTML with `pulldown-cmark`.
//!
//! Fields opt in with `#[markdown = "on"]` (also `yes`, `1`, `y`, `enable`,
//! case-insensitive). Nested records are always descended into; their own
//! fields decide for themselves.
//!
//! # Example
//!
//! ```
//! use markstruct::Record;
//!
//! #[derive(Record)]
//! struct Document {
//!     title: String,
//!     #[markdown = "on"]
//!     body: String,
//! }
//!
//! let mut doc = Document {
//!     title: "Doc *1*".to_owned(),
//!     body: "This is _emphasis_.".to_owned(),
//! };
//!
//! let changed = markstruct::convert_fields(&mut doc).unwrap();
//! assert!(changed);
//! assert_eq!(doc.title, "Doc *1*");
//! assert_eq!(doc.body, "<p>This is <em>emphasis</em>.</p>\n");
//! ```
//!
//! # Supported shapes
//!
//! | Field type | Handling |
//! |---|---|
//! | `String` | rendered in place |
//! | `Option<String>` | rendered when `Some` |
//! | `Vec<T>`, `VecDeque<T>`, `[T; N]` | each element visited in order |
//! | `HashMap<K, String>`, `BTreeMap<K, String>` | values rendered, keys untouched |
//! | `#[derive(Record)]` structs, `Box`, `Option` of them | always descended into |
//! | `&T`, `Rc<T>`, `Arc<T>` | read-only, skipped |
//! | anything else | ignored |
//!
//! # Operations
//!
//! | Operation | Fields | Writes back |
//! |---|---|---|
//! | [`convert_fields`] | annotated | yes |
//! | [`convert_all_fields`] | all | yes |
//! | [`validate_fields`] | annotated | no |
//! | [`validate_all_fields`] | all | no |
//!
//! The free functions use a shared plain-CommonMark [`Converter`]. Build a
//! [`Converter`] around a configured [`MarkdownRenderer`] or any other
//! [`Render`] implementation for custom behavior.

extern crate self as markstruct;

mod config;
mod converter;
mod error;
mod markdown;
mod record;
mod render;
mod visit;
mod walker;

use std::sync::LazyLock;

pub use config::{Config, ConfigError, MarkdownConfig, TraversalConfig};
pub use converter::Converter;
pub use error::{BoxError, Error};
pub use markdown::MarkdownRenderer;
pub use markstruct_derive::Record;
pub use pulldown_cmark::Options as MarkdownOptions;
pub use record::{FieldDescriptor, Record, RecordDescriptor, is_annotation_enabled};
pub use render::Render;
pub use visit::{Elements, Shape, Target, Visit};
pub use walker::{Policy, Walker};

static DEFAULT_CONVERTER: LazyLock<Converter<MarkdownRenderer>> =
    LazyLock::new(|| Converter::new(MarkdownRenderer::new()));

/// Shared converter used by the free functions: plain CommonMark, no depth limit.
pub fn default_converter() -> &'static Converter<MarkdownRenderer> {
    &DEFAULT_CONVERTER
}

/// Render fields annotated with `#[markdown = "on"]` from Markdown to HTML in
/// place.
///
/// Returns whether anything changed. `None` at the root is `Ok(false)`; a
/// root that is not a mutable record is [`Error::InvalidType`].
pub fn convert_fields<T: Visit + ?Sized>(value: &mut T) -> Result<bool, Error> {
    default_converter().convert_fields(value, &MarkdownOptions::empty())
}

/// Like [`convert_fields`], but renders every eligible field regardless of
/// annotation.
pub fn convert_all_fields<T: Visit + ?Sized>(value: &mut T) -> Result<bool, Error> {
    default_converter().convert_all_fields(value, &MarkdownOptions::empty())
}

/// Like [`convert_fields`], but leaves the value untouched and only reports
/// whether it would change.
pub fn validate_fields<T: Visit + ?Sized>(value: &mut T) -> Result<bool, Error> {
    default_converter().validate_fields(value, &MarkdownOptions::empty())
}

/// Like [`convert_all_fields`], but leaves the value untouched and only
/// reports whether it would change.
pub fn validate_all_fields<T: Visit + ?Sized>(value: &mut T) -> Result<bool, Error> {
    default_converter().validate_all_fields(value, &MarkdownOptions::empty())
}
