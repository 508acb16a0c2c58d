//! Recursive field walker.
//!
//! The walker resolves each value to a [`Target`] and matches on it: text is
//! rendered and written back, sequences and mappings are iterated, records
//! are walked field by field. Mismatched shapes met while nested are silent
//! no-ops; only the direct shape operations raise [`Error::InvalidType`].

use std::fmt;
use std::num::NonZeroUsize;

use crate::error::Error;
use crate::record::Record;
use crate::render::Render;
use crate::visit::{Shape, Target, Visit};

/// Traversal policy for one call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Policy {
    /// Render every eligible field, ignoring annotations.
    pub all_fields: bool,
    /// Compute the change flag without writing anything back.
    pub validate_only: bool,
}

impl Policy {
    /// Tagged fields, written back.
    pub const CONVERT_FIELDS: Self = Self {
        all_fields: false,
        validate_only: false,
    };
    /// All fields, written back.
    pub const CONVERT_ALL_FIELDS: Self = Self {
        all_fields: true,
        validate_only: false,
    };
    /// Tagged fields, dry run.
    pub const VALIDATE_FIELDS: Self = Self {
        all_fields: false,
        validate_only: true,
    };
    /// All fields, dry run.
    pub const VALIDATE_ALL_FIELDS: Self = Self {
        all_fields: true,
        validate_only: true,
    };
}

#[derive(Clone, Copy, Debug)]
enum Segment {
    Field(&'static str),
    Index(usize),
    Value,
}

/// Location of the value being visited, relative to the root.
#[derive(Clone, Debug, Default)]
pub(crate) struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Value => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

/// Depth-first walker bound to one renderer, one option set and one policy.
///
/// [`Converter`](crate::Converter) drives a walker from a record root. The
/// shape-specific operations here accept other roots directly and raise
/// [`Error::InvalidType`] when the value has a different shape.
///
/// ```
/// use markstruct::{MarkdownOptions, MarkdownRenderer, Policy, Walker};
///
/// let renderer = MarkdownRenderer::new();
/// let options = MarkdownOptions::empty();
/// let mut items = vec!["*a*".to_owned()];
///
/// let mut walker = Walker::new(&renderer, &options, Policy::CONVERT_FIELDS);
/// assert!(walker.visit_sequence(&mut items).unwrap());
/// assert_eq!(items[0], "<p><em>a</em></p>\n");
///
/// let mut text = "*a*".to_owned();
/// assert!(walker.visit_sequence(&mut text).unwrap_err().is_invalid_type());
/// ```
pub struct Walker<'r, R: Render + ?Sized> {
    renderer: &'r R,
    options: &'r R::Options,
    policy: Policy,
    max_depth: Option<usize>,
    depth: usize,
    path: FieldPath,
}

impl<'r, R: Render + ?Sized> Walker<'r, R> {
    #[must_use]
    pub fn new(renderer: &'r R, options: &'r R::Options, policy: Policy) -> Self {
        Self {
            renderer,
            options,
            policy,
            max_depth: None,
            depth: 0,
            path: FieldPath::default(),
        }
    }

    /// Fail once records nest deeper than `limit` (`None` for unbounded).
    #[must_use]
    pub fn with_max_depth(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.max_depth = limit.map(NonZeroUsize::get);
        self
    }

    /// Visit any value, dispatching on its shape.
    pub fn visit(&mut self, value: &mut dyn Visit) -> Result<bool, Error> {
        self.visit_target(value.target())
    }

    fn visit_target(&mut self, target: Target<'_>) -> Result<bool, Error> {
        match target {
            Target::Text(text) => self.visit_text(text),
            Target::Sequence(elements) => {
                let mut changed = false;
                for (index, element) in elements.enumerate() {
                    self.path.push(Segment::Index(index));
                    let result = self.visit(element);
                    self.path.pop();
                    changed |= result?;
                }
                Ok(changed)
            }
            Target::Mapping { values, entries } => {
                if values != Shape::Text {
                    return Ok(false);
                }
                let mut changed = false;
                for entry in entries {
                    if let Target::Text(text) = entry.target() {
                        self.path.push(Segment::Value);
                        let result = self.visit_text(text);
                        self.path.pop();
                        changed |= result?;
                    }
                }
                Ok(changed)
            }
            Target::Record(record) => self.visit_record(record),
            Target::Absent | Target::Frozen(_) | Target::Other => Ok(false),
        }
    }

    /// Visit a value that must be a sequence.
    pub fn visit_sequence(&mut self, value: &mut dyn Visit) -> Result<bool, Error> {
        match value.target() {
            target @ Target::Sequence(_) => self.visit_target(target),
            Target::Frozen(Shape::TextSequence) => Ok(false),
            _ => Err(Error::InvalidType("expect sequence")),
        }
    }

    /// Visit a value that must be a mapping.
    ///
    /// A read-only mapping is a no-op rather than an error.
    pub fn visit_mapping(&mut self, value: &mut dyn Visit) -> Result<bool, Error> {
        match value.target() {
            target @ Target::Mapping { .. } => self.visit_target(target),
            Target::Frozen(Shape::TextMapping) => Ok(false),
            _ => Err(Error::InvalidType("expect mapping")),
        }
    }

    /// Visit a value that must be a record.
    pub fn visit_record_value(&mut self, value: &mut dyn Visit) -> Result<bool, Error> {
        match value.target() {
            Target::Record(record) => self.visit_record(record),
            _ => Err(Error::InvalidType("expect record")),
        }
    }

    /// Visit the fields of a record.
    pub fn visit_record(&mut self, record: &mut dyn Record) -> Result<bool, Error> {
        self.depth += 1;
        let result = self.visit_fields(record);
        self.depth -= 1;
        result
    }

    fn visit_fields(&mut self, record: &mut dyn Record) -> Result<bool, Error> {
        if let Some(limit) = self.max_depth
            && self.depth > limit
        {
            let path = self.path.to_string();
            tracing::debug!(limit, path = %path, "Record nesting exceeds depth limit");
            return Err(Error::DepthExceeded { limit, path });
        }

        let descriptor = record.descriptor();
        let mut changed = false;

        for (index, field) in descriptor.fields().iter().enumerate() {
            if !field.shape().is_record() && !self.policy.all_fields && !field.is_enabled() {
                continue;
            }
            let Some(value) = record.field_mut(index) else {
                continue;
            };

            self.path.push(Segment::Field(field.name()));
            let result = self.visit(value);
            self.path.pop();
            changed |= result?;
        }

        Ok(changed)
    }

    fn visit_text(&mut self, text: &mut String) -> Result<bool, Error> {
        let rendered = match self.renderer.render(text, self.options) {
            Ok(rendered) => rendered,
            Err(e) => {
                let path = self.path.to_string();
                tracing::debug!(path = %path, error = %e, "Failed to render field");
                return Err(Error::Render {
                    path,
                    source: Box::new(e),
                });
            }
        };

        let changed = *text != rendered;
        tracing::trace!(path = %self.path, changed, "Rendered field");
        if changed && !self.policy.validate_only {
            *text = rendered;
        }
        Ok(changed)
    }
}
