use comrak::plugins::syntect::SyntectAdapter;
use comrak::{ComrakOptions, ComrakPlugins, markdown_to_html_with_plugins};
use once_cell::sync::Lazy;

static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
    options
});

const CODE_THEME: &str = "base16-ocean.dark";

/// Renders a model reply to HTML. Raw HTML in the source is escaped.
pub fn markdown_to_html(reply: &str) -> String {
    let highlighter = SyntectAdapter::new(Some(CODE_THEME));
    let mut plugins = ComrakPlugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&highlighter);
    markdown_to_html_with_plugins(reply, &MARKDOWN_OPTIONS, &plugins)
}
