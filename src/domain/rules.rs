// src/domain/rules.rs
use crate::domain::block::BlockType;
use crate::domain::error::DomainError;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Which inline markup marks a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagSource {
    #[default]
    Strikethrough,
    Heading,
}

impl FromStr for TagSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "strikethrough" => Ok(TagSource::Strikethrough),
            "heading" => Ok(TagSource::Heading),
            other => Err(DomainError::UnknownTagSource(other.to_string())),
        }
    }
}

/// Which block types become cards and which spawn sub-decks.
///
/// A type present in both sets is treated as a sub-deck trigger only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserRules {
    pub flashcard_triggers: BTreeSet<BlockType>,
    pub sub_deck_triggers: BTreeSet<BlockType>,
    pub tags_from: TagSource,
}

impl Default for ParserRules {
    fn default() -> Self {
        Self {
            flashcard_triggers: BTreeSet::from([BlockType::Toggle]),
            sub_deck_triggers: BTreeSet::from([BlockType::ChildPage]),
            tags_from: TagSource::default(),
        }
    }
}

impl ParserRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated list of type names; `heading` means all levels
    pub fn parse_types(list: &str) -> Result<BTreeSet<BlockType>, DomainError> {
        let mut types = BTreeSet::new();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if name == "heading" {
                types.extend([BlockType::Heading1, BlockType::Heading2, BlockType::Heading3]);
            } else {
                types.insert(name.parse()?);
            }
        }
        Ok(types)
    }

    pub fn with_flashcard_types(mut self, list: &str) -> Result<Self, DomainError> {
        self.flashcard_triggers = Self::parse_types(list)?;
        Ok(self)
    }

    pub fn with_sub_deck_types(mut self, list: &str) -> Result<Self, DomainError> {
        self.sub_deck_triggers = Self::parse_types(list)?;
        Ok(self)
    }

    pub fn with_tags_from(mut self, tags_from: TagSource) -> Self {
        self.tags_from = tags_from;
        self
    }

    pub fn is_sub_deck(&self, block_type: BlockType) -> bool {
        self.sub_deck_triggers.contains(&block_type)
    }

    pub fn is_flashcard(&self, block_type: BlockType) -> bool {
        self.flashcard_triggers.contains(&block_type) && !self.is_sub_deck(block_type)
    }

    /// Types configured as both trigger kinds
    pub fn conflicts(&self) -> Vec<BlockType> {
        self.flashcard_triggers
            .intersection(&self.sub_deck_triggers)
            .copied()
            .collect()
    }
}
