//! Record descriptors and per-field annotations.

use crate::visit::{Shape, Visit};

/// Annotation values that enable a field, compared case-insensitively.
const ENABLED_VALUES: [&str; 5] = ["on", "yes", "1", "y", "enable"];

/// Whether an annotation value enables conversion of its field.
///
/// # Examples
///
/// ```
/// use markstruct::is_annotation_enabled;
///
/// assert!(is_annotation_enabled("on"));
/// assert!(is_annotation_enabled("YES"));
/// assert!(!is_annotation_enabled("off"));
/// assert!(!is_annotation_enabled(""));
/// ```
#[must_use]
pub fn is_annotation_enabled(value: &str) -> bool {
    ENABLED_VALUES
        .iter()
        .any(|enabled| enabled.eq_ignore_ascii_case(value))
}

/// Static description of one record field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    shape: Shape,
    annotation: Option<&'static str>,
    enabled: bool,
}

impl FieldDescriptor {
    /// Describe a field. The annotation is resolved here, once.
    #[must_use]
    pub fn new(name: &'static str, shape: Shape, annotation: Option<&'static str>) -> Self {
        Self {
            name,
            shape,
            annotation,
            enabled: annotation.is_some_and(is_annotation_enabled),
        }
    }

    /// Field name as declared (tuple fields use their index).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Raw annotation value, if the field carries one.
    #[must_use]
    pub fn annotation(&self) -> Option<&'static str> {
        self.annotation
    }

    /// Whether the annotation enables conversion.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Field table of a record type, built once per type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDescriptor {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    #[must_use]
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self { name, fields }
    }

    /// Type name of the record.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order. Index `i` here matches
    /// [`Record::field_mut`]`(i)`.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// A typed aggregate of named fields.
///
/// Usually derived with `#[derive(Record)]`. Manual implementations must keep
/// `field_mut(i)` in step with `descriptor().fields()[i]`.
///
/// ```
/// use std::sync::LazyLock;
/// use markstruct::{FieldDescriptor, Record, RecordDescriptor, Shape, Target, Visit};
///
/// struct Note {
///     body: String,
/// }
///
/// impl Record for Note {
///     fn descriptor(&self) -> &'static RecordDescriptor {
///         static DESCRIPTOR: LazyLock<RecordDescriptor> = LazyLock::new(|| {
///             RecordDescriptor::new(
///                 "Note",
///                 vec![FieldDescriptor::new("body", Shape::Text, Some("on"))],
///             )
///         });
///         &DESCRIPTOR
///     }
///
///     fn field_mut(&mut self, index: usize) -> Option<&mut dyn Visit> {
///         match index {
///             0 => Some(&mut self.body),
///             _ => None,
///         }
///     }
/// }
///
/// impl Visit for Note {
///     fn shape() -> Shape {
///         Shape::Record
///     }
///
///     fn target(&mut self) -> Target<'_> {
///         Target::Record(self)
///     }
/// }
///
/// let mut note = Note { body: "*hi*".to_owned() };
/// assert!(markstruct::convert_fields(&mut note).unwrap());
/// assert_eq!(note.body, "<p><em>hi</em></p>\n");
/// ```
pub trait Record {
    /// Field table for this record's type.
    fn descriptor(&self) -> &'static RecordDescriptor;

    /// Mutable access to the field at `index` in the descriptor.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Visit>;
}
