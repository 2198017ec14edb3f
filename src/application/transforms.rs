// src/application/transforms.rs
use crate::application::InlineRenderer;
use crate::constants::{AVOCADO_MARKER, CHERRY_MARKER, NOTION_BASE_URL};
use crate::domain::{Note, RichText, Settings};
use crate::infrastructure::cloze_converter::{convert_inline_code, take_code_blocks, ClozeCounter};
use crate::util::text::{compact_id, title_slug, to_plain_text};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

lazy_static! {
    static ref MP3_LINK_REGEX: Regex =
        Regex::new(r#"<a\s[^>]*href="[^"]*\.mp3(?:\?[^"]*)?"[^>]*>[\s\S]*?</a>"#)
            .expect("Failed to compile mp3 link regex");
}

/// A trigger block rendered but not yet shaped into notes
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub block_id: String,
    pub front: String,
    /// Inline runs behind `front`, absent for fronts built from whole blocks
    pub front_runs: Option<Vec<RichText>>,
    pub back: String,
    /// Unstyled text of front and back, searched for the marker emojis
    pub raw_text: String,
    pub tags: BTreeSet<String>,
    pub media: Vec<String>,
}

/// Render runs as inline markup, honoring the newline option
pub fn render_inline(renderer: &dyn InlineRenderer, runs: &[RichText], settings: &Settings) -> String {
    let html = renderer.render(runs);
    if settings.preserve_newlines {
        html.replace('\n', "<br />")
    } else {
        html
    }
}

/// Applies the card options to drafts
pub struct NoteTransformer<'a> {
    settings: &'a Settings,
    renderer: &'a dyn InlineRenderer,
    page_title: &'a str,
}

impl<'a> NoteTransformer<'a> {
    pub fn new(settings: &'a Settings, renderer: &'a dyn InlineRenderer, page_title: &'a str) -> Self {
        Self {
            settings,
            renderer,
            page_title,
        }
    }

    /// Whether the markers let this draft through
    pub fn admits(&self, draft: &NoteDraft) -> bool {
        if self.settings.cherry && !draft.raw_text.contains(CHERRY_MARKER) {
            return false;
        }
        !self.excludes(draft)
    }

    /// Whether the exclude marker drops this draft along with its nested triggers
    pub fn excludes(&self, draft: &NoteDraft) -> bool {
        self.settings.avocado && draft.raw_text.contains(AVOCADO_MARKER)
    }

    /// Shape one draft into zero, one or two notes
    pub fn finalize(&self, draft: NoteDraft) -> Vec<Note> {
        if !self.admits(&draft) {
            debug!(block_id = %draft.block_id, "Skipped by marker");
            return Vec::new();
        }

        let mut note = Note::new(draft.front.clone(), draft.back.clone());
        note.tags = draft.tags.clone();
        note.media = draft.media.clone();

        if !self.apply_input(&mut note, &draft) && self.settings.cloze {
            self.apply_cloze(&mut note);
        }
        if self.settings.paragraph {
            note.back = to_plain_text(&note.back);
        }
        if self.settings.remove_mp3_links {
            note.back = MP3_LINK_REGEX.replace_all(&note.back, "").into_owned();
        }

        if !note.cloze && !note.enable_input && note.back.trim().is_empty() {
            debug!(block_id = %draft.block_id, "Skipped card with empty back");
            return Vec::new();
        }

        if self.settings.use_notion_id {
            note.notion_id = Some(draft.block_id.clone());
        }
        if self.settings.add_notion_link {
            note.notion_link = self.notion_link(&draft.block_id);
        }

        self.reverse(note)
    }

    /// Bold runs in the front become the typed answer
    fn apply_input(&self, note: &mut Note, draft: &NoteDraft) -> bool {
        if !self.settings.enable_input {
            return false;
        }
        let Some(runs) = &draft.front_runs else {
            return false;
        };
        let (bold, rest): (Vec<RichText>, Vec<RichText>) =
            runs.iter().cloned().partition(|r| r.annotations.bold);
        if bold.is_empty() {
            return false;
        }

        note.answer = bold
            .iter()
            .map(|r| r.plain_text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        note.name = render_inline(self.renderer, &rest, self.settings);
        note.enable_input = true;
        true
    }

    /// Inline code in the front and code blocks in the back become deletions
    fn apply_cloze(&self, note: &mut Note) {
        let (back, blocks) = take_code_blocks(&note.back);
        let mut counter = ClozeCounter::after(&format!("{}{}", note.name, blocks.concat()));
        let mut text = match convert_inline_code(&note.name, &mut counter) {
            Some(text) => text,
            None if !blocks.is_empty() => note.name.clone(),
            None => return,
        };

        for block in blocks {
            text.push_str("<br />");
            text.push_str(&counter.wrap(&block));
        }
        note.name = text;
        note.back = back;
        note.cloze = true;
    }

    fn notion_link(&self, block_id: &str) -> Option<String> {
        let parent = self.settings.parent_block_id.as_deref()?;
        Some(format!(
            "{}/{}-{}#{}",
            NOTION_BASE_URL,
            title_slug(self.page_title),
            compact_id(parent),
            compact_id(block_id)
        ))
    }

    fn reverse(&self, note: Note) -> Vec<Note> {
        if note.cloze {
            return vec![note];
        }
        if self.settings.basic_reversed {
            let swapped = note.swapped();
            vec![note, swapped]
        } else if self.settings.reversed {
            vec![note.swapped()]
        } else {
            vec![note]
        }
    }
}
