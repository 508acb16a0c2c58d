//! Render adapter trait.

/// Text transformation applied to every eligible string.
///
/// The walker treats implementations as opaque: it hands over the original
/// text plus the per-call options and either writes the returned string back
/// or, on error, leaves the field untouched and stops.
///
/// # Example
///
/// ```
/// use markstruct::{Converter, Render};
///
/// struct Shout;
///
/// impl Render for Shout {
///     type Options = ();
///     type Error = std::convert::Infallible;
///
///     fn render(&self, source: &str, _options: &()) -> Result<String, Self::Error> {
///         Ok(source.to_uppercase())
///     }
/// }
///
/// #[derive(markstruct::Record)]
/// struct Greeting {
///     #[markdown = "on"]
///     text: String,
/// }
///
/// let converter = Converter::new(Shout);
/// let mut greeting = Greeting { text: "hello".to_owned() };
/// assert!(converter.convert_fields(&mut greeting, &()).unwrap());
/// assert_eq!(greeting.text, "HELLO");
/// ```
pub trait Render {
    /// Configuration passed unchanged from the entry point to every call.
    type Options: ?Sized;

    /// Error raised for a single piece of text.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Transform `source`.
    fn render(&self, source: &str, options: &Self::Options) -> Result<String, Self::Error>;
}

impl<R: Render + ?Sized> Render for &R {
    type Options = R::Options;
    type Error = R::Error;

    fn render(&self, source: &str, options: &Self::Options) -> Result<String, Self::Error> {
        (**self).render(source, options)
    }
}

impl<R: Render + ?Sized> Render for Box<R> {
    type Options = R::Options;
    type Error = R::Error;

    fn render(&self, source: &str, options: &Self::Options) -> Result<String, Self::Error> {
        (**self).render(source, options)
    }
}
