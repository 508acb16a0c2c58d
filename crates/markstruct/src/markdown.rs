//! Markdown to HTML render adapter backed by `pulldown-cmark`.

use pulldown_cmark::{Options, Parser, html};

use crate::render::Render;

/// Renders CommonMark to HTML.
///
/// Plain CommonMark by default. Parser extensions come from the renderer's
/// configured options, OR-ed with the options passed to each call.
///
/// # Example
///
/// ```
/// use markstruct::{MarkdownOptions as Options, MarkdownRenderer, Render};
///
/// let renderer = MarkdownRenderer::new();
/// assert_eq!(
///     renderer.render("~~strike~~", &Options::empty()).unwrap(),
///     "<p>~~strike~~</p>\n"
/// );
/// assert_eq!(
///     renderer.render("~~strike~~", &Options::ENABLE_STRIKETHROUGH).unwrap(),
///     "<p><del>strike</del></p>\n"
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    /// Create a plain CommonMark renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::empty(),
        }
    }

    /// Replace the configured parser options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - GFM blockquote alerts
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        let gfm = gfm_options();
        if enabled {
            self.options |= gfm;
        } else {
            self.options &= !gfm;
        }
        self
    }

    /// Configured parser options.
    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    /// Create a parser for `markdown` with the configured and extra options.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str, extra: Options) -> Parser<'a> {
        Parser::new_ext(markdown, self.options | extra)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn gfm_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

impl Render for MarkdownRenderer {
    type Options = Options;
    type Error = std::fmt::Error;

    fn render(&self, source: &str, options: &Options) -> Result<String, Self::Error> {
        let mut output = String::with_capacity(source.len() * 3 / 2 + 16);
        html::write_html_fmt(&mut output, self.create_parser(source, *options))?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> String {
        MarkdownRenderer::new()
            .render(markdown, &Options::empty())
            .unwrap()
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(render("_mine_"), "<p><em>mine</em></p>\n");
    }

    #[test]
    fn test_strong() {
        assert_eq!(render("**OK**"), "<p><strong>OK</strong></p>\n");
    }

    #[test]
    fn test_plain_text_is_wrapped() {
        assert_eq!(render("nothing"), "<p>nothing</p>\n");
    }

    #[test]
    fn test_empty_input_renders_empty() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_strikethrough_off_by_default() {
        assert_eq!(render("~~strike~~"), "<p>~~strike~~</p>\n");
    }

    #[test]
    fn test_configured_options() {
        let renderer = MarkdownRenderer::new().with_options(Options::ENABLE_STRIKETHROUGH);
        assert_eq!(
            renderer.render("~~strike~~", &Options::empty()).unwrap(),
            "<p><del>strike</del></p>\n"
        );
    }

    #[test]
    fn test_call_options_are_merged() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("~~strike~~", &Options::ENABLE_STRIKETHROUGH)
            .unwrap();
        assert_eq!(html, "<p><del>strike</del></p>\n");
        assert_eq!(renderer.options(), Options::empty());
    }

    #[test]
    fn test_gfm_enabled() {
        let renderer = MarkdownRenderer::new().with_gfm(true);
        let options = renderer.options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_STRIKETHROUGH));
        assert!(options.contains(Options::ENABLE_TASKLISTS));
        assert!(options.contains(Options::ENABLE_GFM));

        let html = renderer
            .render("| A | B |\n|---|---|\n| 1 | 2 |", &Options::empty())
            .unwrap();
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_gfm_disabled_keeps_other_options() {
        let renderer = MarkdownRenderer::new()
            .with_options(Options::ENABLE_FOOTNOTES | Options::ENABLE_TABLES)
            .with_gfm(false);
        assert_eq!(renderer.options(), Options::ENABLE_FOOTNOTES);
    }

    #[test]
    fn test_create_parser() {
        let renderer = MarkdownRenderer::new();
        let events: Vec<_> = renderer.create_parser("# Hello", Options::empty()).collect();
        assert!(!events.is_empty());
    }
}
