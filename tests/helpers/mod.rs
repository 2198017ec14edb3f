use anyhow::Result;
use notiondeck::application::{BlockSource, FlashcardFinder, ParentKind};
use notiondeck::domain::{Block, BlockType, Deck, ParserRules, RichText, Settings};
use notiondeck::infrastructure::{HtmlInlineRenderer, JsonBlockSource};
use std::path::PathBuf;

/// Ids of the blocks in `tests/fixtures/notion_test_page.json`
#[allow(dead_code)]
pub mod test_page {
    pub const ROOT: &str = "3ce6b147-ac8a-425f-836b-51cc21825b85";
    pub const TITLE: &str = "Notion API Test Page";
    pub const BASIC_CARD: &str = "e5201f35-c722-40d3-8e3a-5d218e5d80a5";
    pub const SUB_PAGE: &str = "6ea07029-a1d2-4d5a-9e5f-b1cd7e5c4f76";
}

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[allow(dead_code)]
pub fn load_test_page() -> Result<JsonBlockSource> {
    JsonBlockSource::load(fixture_path("notion_test_page.json"))
}

/// Build settings from literal option pairs
#[allow(dead_code)]
pub fn settings(options: &[(&str, &str)]) -> Settings {
    Settings::from_options(options.iter().copied()).expect("valid test options")
}

/// Convert the tree under `root_id` with the default renderer
#[allow(dead_code)]
pub async fn convert<S: BlockSource>(
    source: &S,
    root_id: &str,
    settings: &Settings,
    rules: &ParserRules,
) -> Result<Vec<Deck>> {
    let decks = FlashcardFinder::new(source, &HtmlInlineRenderer, settings)
        .find_flashcards(root_id, ParentKind::Page, None, rules)
        .await?;
    Ok(decks)
}

#[allow(dead_code)]
pub fn toggle_with_runs(id: &str, runs: Vec<RichText>) -> Block {
    Block::with_runs(id, BlockType::Toggle, runs)
}

#[allow(dead_code)]
pub fn bulleted(id: &str, text: &str) -> Block {
    Block::with_runs(id, BlockType::BulletedListItem, vec![RichText::plain(text)])
}
