// src/infrastructure/inline_html.rs
use crate::application::InlineRenderer;
use crate::domain::RichText;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Renders rich text runs as HTML, one nested tag per annotation
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlInlineRenderer;

impl HtmlInlineRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl InlineRenderer for HtmlInlineRenderer {
    fn render(&self, runs: &[RichText]) -> String {
        runs.iter().map(render_run).collect()
    }
}

fn render_run(run: &RichText) -> String {
    if let Some(eq) = &run.equation {
        return format!(r"\({}\)", encode_text(&eq.expression));
    }

    let mut html = encode_text(&run.plain_text).into_owned();
    let a = &run.annotations;
    if a.code {
        html = format!("<code>{}</code>", html);
    }
    if a.bold {
        html = format!("<strong>{}</strong>", html);
    }
    if a.italic {
        html = format!("<em>{}</em>", html);
    }
    if a.strikethrough {
        html = format!("<del>{}</del>", html);
    }
    if a.underline {
        html = format!("<u>{}</u>", html);
    }
    if let Some(href) = &run.href {
        html = format!(
            r#"<a href="{}">{}</a>"#,
            encode_double_quoted_attribute(href),
            html
        );
    }
    html
}
