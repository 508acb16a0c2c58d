//! Converter: a render adapter bound to the four public operations.

use std::num::NonZeroUsize;

use crate::error::Error;
use crate::render::Render;
use crate::visit::{Target, Visit};
use crate::walker::{Policy, Walker};

/// Converts annotated string fields of a record in place.
///
/// Holds a single [`Render`] adapter. Per-call options are forwarded to every
/// render invocation of that call, so rendering behavior can change per call
/// without rebuilding the converter.
///
/// The root handed to any operation must resolve to a mutable record:
/// - `None` at the root returns `Ok(false)`;
/// - text, sequences, mappings and read-only records (`&R`, `Rc<R>`,
///   `Arc<R>`) return [`Error::InvalidType`].
///
/// On error the change flag is not reported, even though fields visited
/// before the failure keep their new values.
#[derive(Clone, Debug, Default)]
pub struct Converter<R> {
    renderer: R,
    max_depth: Option<NonZeroUsize>,
}

impl<R: Render> Converter<R> {
    /// Bind a render adapter.
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            max_depth: None,
        }
    }

    /// Fail with [`Error::DepthExceeded`] when records nest deeper than `depth`.
    ///
    /// Unbounded by default. The root record is depth 1.
    #[must_use]
    pub fn with_max_depth(mut self, depth: NonZeroUsize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// The bound render adapter.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Configured depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth.map(NonZeroUsize::get)
    }

    /// Render annotated fields and write the results back.
    ///
    /// Returns whether any field changed.
    pub fn convert_fields<T: Visit + ?Sized>(
        &self,
        value: &mut T,
        options: &R::Options,
    ) -> Result<bool, Error> {
        self.traverse(value, Policy::CONVERT_FIELDS, options)
    }

    /// Render every eligible field, annotated or not, and write the results back.
    pub fn convert_all_fields<T: Visit + ?Sized>(
        &self,
        value: &mut T,
        options: &R::Options,
    ) -> Result<bool, Error> {
        self.traverse(value, Policy::CONVERT_ALL_FIELDS, options)
    }

    /// Report whether [`convert_fields`](Self::convert_fields) would change
    /// anything, without modifying the value.
    pub fn validate_fields<T: Visit + ?Sized>(
        &self,
        value: &mut T,
        options: &R::Options,
    ) -> Result<bool, Error> {
        self.traverse(value, Policy::VALIDATE_FIELDS, options)
    }

    /// Report whether [`convert_all_fields`](Self::convert_all_fields) would
    /// change anything, without modifying the value.
    pub fn validate_all_fields<T: Visit + ?Sized>(
        &self,
        value: &mut T,
        options: &R::Options,
    ) -> Result<bool, Error> {
        self.traverse(value, Policy::VALIDATE_ALL_FIELDS, options)
    }

    /// Walk `value` under an explicit policy.
    pub fn traverse<T: Visit + ?Sized>(
        &self,
        value: &mut T,
        policy: Policy,
        options: &R::Options,
    ) -> Result<bool, Error> {
        let record = match value.target() {
            Target::Absent => return Ok(false),
            Target::Record(record) => record,
            Target::Frozen(_) => {
                return Err(Error::InvalidType(
                    "expect mutable reference to record, got read-only value",
                ));
            }
            target => {
                tracing::debug!(kind = target.kind(), "Rejected non-record root");
                return Err(Error::InvalidType("expect mutable reference to record"));
            }
        };

        let record_name = record.descriptor().name();
        tracing::debug!(
            record = record_name,
            all_fields = policy.all_fields,
            validate_only = policy.validate_only,
            "Starting field traversal"
        );

        let mut walker =
            Walker::new(&self.renderer, options, policy).with_max_depth(self.max_depth);
        let changed = walker.visit_record(record)?;

        tracing::debug!(record = record_name, changed, "Field traversal completed");
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{MarkdownRenderer, Record};
    use pretty_assertions::assert_eq;
    use pulldown_cmark::Options;

    #[derive(Debug, thiserror::Error)]
    #[error("BOOM")]
    struct Boom;

    /// Fails on any text containing `fail`, uppercases everything else.
    struct Picky;

    impl Render for Picky {
        type Options = ();
        type Error = Boom;

        fn render(&self, source: &str, _options: &()) -> Result<String, Boom> {
            if source.contains("fail") {
                Err(Boom)
            } else {
                Ok(source.to_uppercase())
            }
        }
    }

    #[derive(Debug, Default, PartialEq, Record)]
    struct Note {
        #[markdown = "on"]
        first: String,
        #[markdown = "on"]
        second: String,
        #[markdown = "on"]
        third: String,
    }

    #[derive(Debug, Default, PartialEq, Record)]
    struct Page {
        title: String,
        #[markdown = "on"]
        body: String,
        meta: HashMap<String, String>,
    }

    #[test]
    fn test_traverse_absent_root() {
        let converter = Converter::new(Picky);
        let mut root: Option<Note> = None;
        assert!(!converter.convert_fields(&mut root, &()).unwrap());
        assert!(!converter.validate_all_fields(&mut root, &()).unwrap());
    }

    #[test]
    fn test_traverse_rejects_non_records() {
        let converter = Converter::new(Picky);

        let mut text = "hello".to_owned();
        let err = converter.convert_fields(&mut text, &()).unwrap_err();
        assert!(err.is_invalid_type());
        assert_eq!(text, "hello");

        let mut list = vec!["hello".to_owned()];
        let err = converter.convert_all_fields(&mut list, &()).unwrap_err();
        assert!(err.is_invalid_type());
        assert_eq!(list, vec!["hello".to_owned()]);

        let mut number = 7_i32;
        let err = converter.convert_fields(&mut number, &()).unwrap_err();
        assert!(err.is_invalid_type());
    }

    #[test]
    fn test_traverse_rejects_read_only_record() {
        let converter = Converter::new(Picky);
        let note = Note {
            first: "a".to_owned(),
            ..Note::default()
        };
        let mut shared = &note;

        let err = converter.convert_fields(&mut shared, &()).unwrap_err();
        assert!(err.is_invalid_type());
        assert_eq!(note.first, "a");
    }

    #[test]
    fn test_error_stops_traversal_and_keeps_earlier_mutations() {
        let converter = Converter::new(Picky);
        let mut note = Note {
            first: "ok".to_owned(),
            second: "fail here".to_owned(),
            third: "later".to_owned(),
        };

        let err = converter.convert_fields(&mut note, &()).unwrap_err();

        assert_eq!(err.path(), Some("second"));
        assert_eq!(note.first, "OK");
        assert_eq!(note.second, "fail here");
        assert_eq!(note.third, "later");
    }

    #[test]
    fn test_untagged_fields_ignored_unless_all_fields() {
        let converter = Converter::new(Picky);
        let mut page = Page {
            title: "title".to_owned(),
            body: "body".to_owned(),
            meta: HashMap::from([("k".to_owned(), "value".to_owned())]),
        };

        assert!(converter.convert_fields(&mut page, &()).unwrap());
        assert_eq!(page.title, "title");
        assert_eq!(page.body, "BODY");
        assert_eq!(page.meta["k"], "value");

        assert!(converter.convert_all_fields(&mut page, &()).unwrap());
        assert_eq!(page.title, "TITLE");
        assert_eq!(page.meta["k"], "VALUE");

        assert!(!converter.convert_all_fields(&mut page, &()).unwrap());
    }

    #[test]
    fn test_validate_matches_convert() {
        let converter = Converter::new(MarkdownRenderer::new());
        let original = Page {
            title: "*t*".to_owned(),
            body: "_b_".to_owned(),
            meta: HashMap::new(),
        };

        let mut validated = Page {
            title: original.title.clone(),
            body: original.body.clone(),
            meta: HashMap::new(),
        };
        let mut converted = Page {
            title: original.title.clone(),
            body: original.body.clone(),
            meta: HashMap::new(),
        };

        let would_change = converter
            .validate_fields(&mut validated, &Options::empty())
            .unwrap();
        let changed = converter
            .convert_fields(&mut converted, &Options::empty())
            .unwrap();

        assert_eq!(would_change, changed);
        assert_eq!(validated, original);
        assert_eq!(converted.body, "<p><em>b</em></p>\n");
    }

    #[test]
    fn test_per_call_options() {
        let converter = Converter::new(MarkdownRenderer::new());
        let mut plain = Note {
            first: "~~x~~".to_owned(),
            ..Note::default()
        };
        let mut struck = Note {
            first: "~~x~~".to_owned(),
            ..Note::default()
        };

        converter.convert_fields(&mut plain, &Options::empty()).unwrap();
        converter
            .convert_fields(&mut struck, &Options::ENABLE_STRIKETHROUGH)
            .unwrap();

        assert_eq!(plain.first, "<p>~~x~~</p>\n");
        assert_eq!(struck.first, "<p><del>x</del></p>\n");
    }

    #[test]
    fn test_renderer_accessors() {
        let converter = Converter::new(MarkdownRenderer::new().with_gfm(true))
            .with_max_depth(NonZeroUsize::new(8).unwrap());
        let options = converter.renderer().options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert_eq!(converter.max_depth(), Some(8));
        assert_eq!(Converter::new(Picky).max_depth(), None);
    }

    #[test]
    fn test_smallest_depth_limit_accepts_flat_record() {
        let converter = Converter::new(Picky).with_max_depth(NonZeroUsize::MIN);
        let mut note = Note {
            first: "a".to_owned(),
            ..Note::default()
        };

        assert!(converter.convert_fields(&mut note, &()).unwrap());
        assert_eq!(note.first, "A");
    }
}
