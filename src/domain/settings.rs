// src/domain/settings.rs
use crate::domain::error::DomainError;
use serde::Serialize;

/// Flag keys accepted by [`Settings::from_options`]
pub const OPTION_KEYS: &[&str] = &[
    "add-notion-link",
    "use-notion-id",
    "all",
    "paragraph",
    "cherry",
    "avocado",
    "tags",
    "cloze",
    "enable-input",
    "basic-reversed",
    "reversed",
    "no-underline",
    "max-one-toggle-per-card",
    "remove-mp3-links",
    "perserve-newlines",
    "deck-description",
];

const PARENT_BLOCK_ID_KEYS: &[&str] = &["parentBlockId", "parent-block-id"];

/// Card options for one conversion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub add_notion_link: bool,
    pub use_notion_id: bool,
    pub all: bool,
    pub paragraph: bool,
    pub cherry: bool,
    pub avocado: bool,
    pub tags: bool,
    pub cloze: bool,
    pub enable_input: bool,
    pub basic_reversed: bool,
    pub reversed: bool,
    pub no_underline: bool,
    pub max_one_toggle_per_card: bool,
    pub remove_mp3_links: bool,
    pub preserve_newlines: bool,
    pub deck_description: bool,
    pub parent_block_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            add_notion_link: false,
            use_notion_id: false,
            all: false,
            paragraph: false,
            cherry: false,
            avocado: false,
            tags: true,
            cloze: true,
            enable_input: false,
            basic_reversed: false,
            reversed: false,
            no_underline: false,
            max_one_toggle_per_card: false,
            remove_mp3_links: false,
            preserve_newlines: false,
            deck_description: false,
            parent_block_id: None,
        }
    }
}

impl Settings {
    /// Build settings from a flat option map, starting from the defaults.
    ///
    /// Unknown keys, non-boolean flag values and mutually exclusive marker
    /// modes are rejected.
    pub fn from_options<I, K, V>(options: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        for (key, value) in options {
            let (key, value) = (key.as_ref(), value.as_ref());
            if PARENT_BLOCK_ID_KEYS.contains(&key) {
                let value = value.trim();
                settings.parent_block_id = (!value.is_empty()).then(|| value.to_string());
                continue;
            }
            let flag = settings
                .flag_mut(key)
                .ok_or_else(|| DomainError::UnknownOption(key.to_string()))?;
            *flag = parse_flag(key, value)?;
        }

        if settings.cherry && settings.avocado {
            return Err(DomainError::ConflictingOptions("cherry", "avocado"));
        }
        Ok(settings)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        let value = match key {
            "add-notion-link" => self.add_notion_link,
            "use-notion-id" => self.use_notion_id,
            "all" => self.all,
            "paragraph" => self.paragraph,
            "cherry" => self.cherry,
            "avocado" => self.avocado,
            "tags" => self.tags,
            "cloze" => self.cloze,
            "enable-input" => self.enable_input,
            "basic-reversed" => self.basic_reversed,
            "reversed" => self.reversed,
            "no-underline" => self.no_underline,
            "max-one-toggle-per-card" => self.max_one_toggle_per_card,
            "remove-mp3-links" => self.remove_mp3_links,
            "perserve-newlines" => self.preserve_newlines,
            "deck-description" => self.deck_description,
            _ => return None,
        };
        Some(value)
    }

    fn flag_mut(&mut self, key: &str) -> Option<&mut bool> {
        let field = match key {
            "add-notion-link" => &mut self.add_notion_link,
            "use-notion-id" => &mut self.use_notion_id,
            "all" => &mut self.all,
            "paragraph" => &mut self.paragraph,
            "cherry" => &mut self.cherry,
            "avocado" => &mut self.avocado,
            "tags" => &mut self.tags,
            "cloze" => &mut self.cloze,
            "enable-input" => &mut self.enable_input,
            "basic-reversed" => &mut self.basic_reversed,
            "reversed" => &mut self.reversed,
            "no-underline" => &mut self.no_underline,
            "max-one-toggle-per-card" => &mut self.max_one_toggle_per_card,
            "remove-mp3-links" => &mut self.remove_mp3_links,
            "perserve-newlines" => &mut self.preserve_newlines,
            "deck-description" => &mut self.deck_description,
            _ => return None,
        };
        Some(field)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, DomainError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DomainError::InvalidOptionValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
