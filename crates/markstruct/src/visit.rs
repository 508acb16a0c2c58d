//! Shape classification and the [`Visit`] trait.
//!
//! Every value the walker can meet implements [`Visit`]. The trait reports a
//! static [`Shape`] for the type and hands out a [`Target`], a closed union
//! over the storage the walker may touch. Dispatch is a `match` on that union;
//! nothing is discovered by runtime type inspection.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use crate::record::Record;

/// Declared shape of a field, known statically per type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Scalar string.
    Text,
    /// `Option` around a scalar string.
    OptionalText,
    /// Ordered sequence; elements are dispatched individually.
    TextSequence,
    /// Key-value mapping; only string values are rendered.
    TextMapping,
    /// Nested record.
    Record,
    /// `Option` around a nested record.
    OptionalRecord,
    /// Anything else. Never rendered.
    Other,
}

impl Shape {
    /// Whether fields of this shape are descended into regardless of annotation.
    #[must_use]
    pub fn is_record(self) -> bool {
        matches!(self, Shape::Record | Shape::OptionalRecord)
    }

    /// Shape of `Option<T>` given the shape of `T`.
    #[must_use]
    pub fn optional(self) -> Self {
        match self {
            Shape::Text => Shape::OptionalText,
            Shape::Record => Shape::OptionalRecord,
            other => other,
        }
    }
}

/// Iterator over mutable elements handed to the walker.
pub type Elements<'a> = Box<dyn Iterator<Item = &'a mut dyn Visit> + 'a>;

/// Exclusive view of a value's storage, resolved through one level of
/// optional or pointer indirection.
pub enum Target<'a> {
    /// `None` at this level.
    Absent,
    /// Storage that cannot be written through (`&T`, `Rc<T>`, `Arc<T>`).
    /// Carries the shape of the pointee.
    Frozen(Shape),
    /// A string that may be replaced in place.
    Text(&'a mut String),
    /// Elements of an ordered collection, in order.
    Sequence(Elements<'a>),
    /// Values of a mapping. `values` is the static shape of the value type;
    /// the walker only renders when it is [`Shape::Text`].
    Mapping {
        values: Shape,
        entries: Elements<'a>,
    },
    /// A nested record.
    Record(&'a mut dyn Record),
    /// A value with no text content.
    Other,
}

impl Target<'_> {
    /// Short name of the variant, used in error messages and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Absent => "absent",
            Target::Frozen(_) => "read-only",
            Target::Text(_) => "text",
            Target::Sequence(_) => "sequence",
            Target::Mapping { .. } => "mapping",
            Target::Record(_) => "record",
            Target::Other => "other",
        }
    }
}

/// A value the walker can classify and, where mutable, rewrite.
///
/// Implemented for strings, collections, mappings, smart pointers and
/// primitives here, and for user structs by `#[derive(Record)]`.
pub trait Visit {
    /// Static shape of this type.
    fn shape() -> Shape
    where
        Self: Sized;

    /// Borrow this value's storage for traversal.
    fn target(&mut self) -> Target<'_>;
}

impl Visit for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn target(&mut self) -> Target<'_> {
        Target::Text(self)
    }
}

impl<T: Visit> Visit for Option<T> {
    fn shape() -> Shape {
        T::shape().optional()
    }

    fn target(&mut self) -> Target<'_> {
        match self {
            Some(value) => value.target(),
            None => Target::Absent,
        }
    }
}

impl<T: Visit> Visit for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn target(&mut self) -> Target<'_> {
        self.as_mut().target()
    }
}

impl<T: Visit> Visit for &mut T {
    fn shape() -> Shape {
        T::shape()
    }

    fn target(&mut self) -> Target<'_> {
        (**self).target()
    }
}

macro_rules! impl_frozen {
    ($($ptr:ty),* $(,)?) => {
        $(
            impl<T: Visit> Visit for $ptr {
                fn shape() -> Shape {
                    T::shape()
                }

                fn target(&mut self) -> Target<'_> {
                    Target::Frozen(T::shape())
                }
            }
        )*
    };
}

impl_frozen!(&T, Rc<T>, Arc<T>);

fn elements<'a, T: Visit + 'a>(items: impl Iterator<Item = &'a mut T> + 'a) -> Elements<'a> {
    Box::new(items.map(|item| item as &mut dyn Visit))
}

impl<T: Visit> Visit for Vec<T> {
    fn shape() -> Shape {
        Shape::TextSequence
    }

    fn target(&mut self) -> Target<'_> {
        Target::Sequence(elements(self.iter_mut()))
    }
}

impl<T: Visit> Visit for VecDeque<T> {
    fn shape() -> Shape {
        Shape::TextSequence
    }

    fn target(&mut self) -> Target<'_> {
        Target::Sequence(elements(self.iter_mut()))
    }
}

impl<T: Visit, const N: usize> Visit for [T; N] {
    fn shape() -> Shape {
        Shape::TextSequence
    }

    fn target(&mut self) -> Target<'_> {
        Target::Sequence(elements(self.iter_mut()))
    }
}

impl<K, V: Visit, S> Visit for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::TextMapping
    }

    fn target(&mut self) -> Target<'_> {
        Target::Mapping {
            values: V::shape(),
            entries: elements(self.values_mut()),
        }
    }
}

impl<K, V: Visit> Visit for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::TextMapping
    }

    fn target(&mut self) -> Target<'_> {
        Target::Mapping {
            values: V::shape(),
            entries: elements(self.values_mut()),
        }
    }
}

macro_rules! impl_other {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Visit for $ty {
                fn shape() -> Shape {
                    Shape::Other
                }

                fn target(&mut self) -> Target<'_> {
                    Target::Other
                }
            }
        )*
    };
}

impl_other!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    &str,
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_static_shapes() {
        assert_eq!(String::shape(), Shape::Text);
        assert_eq!(Option::<String>::shape(), Shape::OptionalText);
        assert_eq!(Option::<Box<String>>::shape(), Shape::OptionalText);
        assert_eq!(Vec::<String>::shape(), Shape::TextSequence);
        assert_eq!(Option::<Vec<String>>::shape(), Shape::TextSequence);
        assert_eq!(<[String; 2]>::shape(), Shape::TextSequence);
        assert_eq!(HashMap::<i32, String>::shape(), Shape::TextMapping);
        assert_eq!(BTreeMap::<String, i32>::shape(), Shape::TextMapping);
        assert_eq!(i32::shape(), Shape::Other);
        assert_eq!(<&str>::shape(), Shape::Other);
        assert_eq!(Rc::<String>::shape(), Shape::Text);
    }

    #[test]
    fn test_optional_shape_mapping() {
        assert_eq!(Shape::Text.optional(), Shape::OptionalText);
        assert_eq!(Shape::Record.optional(), Shape::OptionalRecord);
        assert_eq!(Shape::TextMapping.optional(), Shape::TextMapping);
        assert_eq!(Shape::Other.optional(), Shape::Other);
    }

    #[test]
    fn test_is_record() {
        assert!(Shape::Record.is_record());
        assert!(Shape::OptionalRecord.is_record());
        assert!(!Shape::Text.is_record());
        assert!(!Shape::TextSequence.is_record());
    }

    #[test]
    fn test_none_is_absent() {
        let mut value: Option<String> = None;
        assert_eq!(value.target().kind(), "absent");

        let mut nested: Option<Box<Option<String>>> = Some(Box::new(None));
        assert_eq!(nested.target().kind(), "absent");
    }

    #[test]
    fn test_some_resolves_to_inner() {
        let mut value = Some(String::from("x"));
        let Target::Text(text) = value.target() else {
            panic!("expected text target");
        };
        text.push('y');
        assert_eq!(value.as_deref(), Some("xy"));
    }

    #[test]
    fn test_shared_pointers_are_frozen() {
        let mut rc = Rc::new(String::from("a"));
        assert!(matches!(rc.target(), Target::Frozen(Shape::Text)));

        let mut arc = Arc::new(vec![String::new()]);
        assert!(matches!(arc.target(), Target::Frozen(Shape::TextSequence)));

        let owned = String::from("b");
        let mut shared = &owned;
        assert!(matches!(shared.target(), Target::Frozen(Shape::Text)));
    }

    #[test]
    fn test_sequence_elements_in_order() {
        let mut items = vec![String::from("a"), String::from("b")];
        let Target::Sequence(elements) = items.target() else {
            panic!("expected sequence target");
        };
        let kinds: Vec<_> = elements.map(|e| e.target().kind()).collect();
        assert_eq!(kinds, vec!["text", "text"]);
    }

    #[test]
    fn test_mapping_reports_value_shape() {
        let mut codes: HashMap<i32, i32> = HashMap::new();
        codes.insert(1, 2);
        let Target::Mapping { values, .. } = codes.target() else {
            panic!("expected mapping target");
        };
        assert_eq!(values, Shape::Other);
    }
}
