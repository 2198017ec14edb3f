// src/infrastructure/cloze_converter.rs
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref ANKI_CLOZE_REGEX: Regex = Regex::new(r"\{\{c(\d+)::[\s\S]*?\}\}")
        .expect("Failed to compile Anki cloze regex");

    static ref INLINE_CODE_REGEX: Regex = Regex::new(r"<code>([\s\S]*?)</code>")
        .expect("Failed to compile inline code regex");

    static ref CODE_BLOCK_REGEX: Regex =
        Regex::new(r#"<pre><code(?: class="[^"]*")?>([\s\S]*?)</code></pre>"#)
            .expect("Failed to compile code block regex");
}

pub fn is_anki_cloze(text: &str) -> bool {
    ANKI_CLOZE_REGEX.is_match(text)
}

/// Highest cloze index already present, 0 when there is none
fn max_cloze_index(text: &str) -> u32 {
    ANKI_CLOZE_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .max()
        .unwrap_or(0)
}

/// Numbers new deletions after the highest explicit index in the input
#[derive(Debug)]
pub struct ClozeCounter {
    next: u32,
}

impl ClozeCounter {
    pub fn after(text: &str) -> Self {
        Self {
            next: max_cloze_index(text) + 1,
        }
    }

    /// Wrap content as a deletion; content that already is one stays verbatim
    pub fn wrap(&mut self, content: &str) -> String {
        if is_anki_cloze(content) {
            return content.to_string();
        }
        let wrapped = format!("{{{{c{}::{}}}}}", self.next, content);
        self.next += 1;
        wrapped
    }
}

/// Turn each inline code span into a cloze deletion.
///
/// Returns `None` when the text has no inline code, i.e. is not a cloze.
pub fn convert_inline_code(html: &str, counter: &mut ClozeCounter) -> Option<String> {
    if !INLINE_CODE_REGEX.is_match(html) {
        return None;
    }
    let converted = INLINE_CODE_REGEX.replace_all(html, |caps: &Captures| counter.wrap(&caps[1]));
    Some(converted.into_owned())
}

/// Remove code blocks from `html`, returning what is left and their contents
pub fn take_code_blocks(html: &str) -> (String, Vec<String>) {
    let blocks = CODE_BLOCK_REGEX
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect();
    let rest = CODE_BLOCK_REGEX.replace_all(html, "").into_owned();
    (rest, blocks)
}
