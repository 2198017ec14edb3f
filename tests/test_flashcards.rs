mod helpers;

use anyhow::Result;
use helpers::{bulleted, convert, settings, toggle_with_runs};
use notiondeck::application::{FlashcardFinder, ParentKind};
use notiondeck::domain::{Block, BlockType, ParserRules, RichText, Settings, TraversalError};
use notiondeck::infrastructure::{FetchPolicy, HtmlInlineRenderer};
use notiondeck::util::testing::{Failure, MockBlockSource};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn single_toggle_page() -> MockBlockSource {
    MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Q: 2+2")])
        .with_children("t1", vec![Block::paragraph("p1", "4")])
        .build()
}

fn fast_policy() -> FetchPolicy {
    FetchPolicy {
        timeout: Duration::from_millis(200),
        retry_backoff: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn given_toggle_with_paragraph_when_converting_then_produces_one_basic_note() -> Result<()> {
    // Arrange
    let source = single_toggle_page();

    // Act
    let decks = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks.len(), 1);
    assert_eq!(decks[0].cards.len(), 1);
    assert_eq!(decks[0].cards[0].name, "1 - Q: 2+2");
    assert_eq!(decks[0].cards[0].back, "<p>4</p>");
    assert!(!decks[0].cards[0].cloze);
    Ok(())
}

#[tokio::test]
async fn given_code_fragment_with_cloze_syntax_when_converting_then_produces_cloze_note() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children(
            "root",
            vec![toggle_with_runs("t1", vec![RichText::plain("2+2={{c1::4}}").code()])],
        )
        .build();

    // Act
    let decks = convert(&source, "root", &settings(&[("cloze", "true")]), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks[0].cards.len(), 1);
    let card = &decks[0].cards[0];
    assert!(card.cloze);
    assert_eq!(card.name, "1 - 2+2={{c1::4}}");
    Ok(())
}

#[tokio::test]
async fn given_code_block_in_back_when_converting_with_cloze_then_lifts_it_into_cloze_note() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Q: 2+2")])
        .with_children("t1", vec![Block::code("c1", "Plain Text", "2+2={{c1::4}}")])
        .build();

    // Act
    let decks = convert(&source, "root", &settings(&[("cloze", "true")]), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks[0].cards.len(), 1);
    let card = &decks[0].cards[0];
    assert!(card.cloze);
    assert_eq!(card.name, "1 - Q: 2+2<br />2+2={{c1::4}}");
    assert_eq!(card.back, "");
    Ok(())
}

#[tokio::test]
async fn given_exclude_marker_when_converting_with_avocado_then_drops_that_toggle() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children(
            "root",
            vec![Block::toggle("t1", "Keep"), Block::toggle("t2", "Skip 🥑")],
        )
        .with_children("t1", vec![Block::paragraph("p1", "kept")])
        .with_children("t2", vec![Block::paragraph("p2", "dropped")])
        .build();

    // Act
    let decks = convert(&source, "root", &settings(&[("avocado", "true")]), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks[0].cards.len(), 1);
    assert_eq!(decks[0].cards[0].name, "1 - Keep");
    assert!(decks
        .iter()
        .flat_map(|d| &d.cards)
        .all(|c| !c.back.contains("dropped")));
    Ok(())
}

#[tokio::test]
async fn given_child_page_when_converting_then_returns_root_and_sub_deck() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::child_page("c1", "Child")])
        .with_children("c1", vec![Block::toggle("t1", "Q")])
        .with_children("t1", vec![Block::paragraph("p1", "A")])
        .build();

    // Act
    let decks = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks.len(), 2);
    assert_eq!(decks[0].name, "Root");
    assert!(decks[0].is_empty());
    assert_eq!(decks[1].name, "Root::Child");
    assert_eq!(decks[1].parent_name.as_deref(), Some("Root"));
    assert_eq!(decks[1].block_id, "c1");
    assert_eq!(decks[1].cards[0].name, "1 - Q");
    Ok(())
}

#[tokio::test]
async fn given_basic_reversed_when_converting_then_second_note_is_swapped() -> Result<()> {
    // Arrange
    let source = single_toggle_page();

    // Act
    let decks = convert(&source, "root", &settings(&[("basic-reversed", "true")]), &ParserRules::default()).await?;

    // Assert
    let cards = &decks[0].cards;
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].name, "1 - Q: 2+2");
    assert_eq!(cards[0].back, "<p>4</p>");
    assert_eq!(cards[1].name, "2 - <p>4</p>");
    assert_eq!(cards[1].back, "Q: 2+2");
    assert!(cards[1].reversed);
    assert_ne!(cards[0].guid, cards[1].guid);
    Ok(())
}

#[tokio::test]
async fn given_same_tree_when_converting_twice_then_output_is_identical() -> Result<()> {
    // Arrange
    let source = helpers::load_test_page()?;
    let options = settings(&[("basic-reversed", "true")]);

    // Act
    let first = convert(&source, helpers::test_page::ROOT, &options, &ParserRules::default()).await?;
    let second = convert(&source, helpers::test_page::ROOT, &options, &ParserRules::default()).await?;

    // Assert
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn given_cards_around_sub_deck_when_converting_then_numbering_is_per_deck() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children(
            "root",
            vec![
                Block::toggle("t1", "R1"),
                Block::child_page("c1", "Child"),
                Block::toggle("t2", "R2"),
            ],
        )
        .with_children("t1", vec![Block::paragraph("a1", "a")])
        .with_children("t2", vec![Block::paragraph("a2", "b")])
        .with_children("c1", vec![Block::toggle("t3", "C1"), Block::toggle("t4", "C2")])
        .with_children("t3", vec![Block::paragraph("a3", "c")])
        .with_children("t4", vec![Block::paragraph("a4", "d")])
        .build();

    // Act
    let decks = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;

    // Assert
    let names = |i: usize| decks[i].cards.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(0), vec!["1 - R1", "2 - R2"]);
    assert_eq!(names(1), vec!["1 - C1", "2 - C2"]);
    Ok(())
}

#[tokio::test]
async fn given_nested_sub_decks_when_converting_then_orders_decks_depth_first() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children(
            "root",
            vec![Block::child_page("a", "A"), Block::child_page("b", "B")],
        )
        .with_children("a", vec![Block::child_page("a1", "A1")])
        .build();

    // Act
    let decks = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;

    // Assert
    let names: Vec<_> = decks.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Root", "Root::A", "Root::A::A1", "Root::B"]);
    Ok(())
}

#[tokio::test]
async fn given_type_in_both_rule_sets_when_converting_then_sub_deck_wins() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::child_page("c1", "Child")])
        .with_children("c1", vec![Block::paragraph("p1", "inside")])
        .build();
    let rules = ParserRules::new().with_flashcard_types("toggle,child_page")?;

    // Act
    let decks = convert(&source, "root", &Settings::default(), &rules).await?;

    // Assert
    assert_eq!(decks.len(), 2);
    assert!(decks.iter().all(|d| d.is_empty()));
    Ok(())
}

#[tokio::test]
async fn given_no_cherry_marker_when_converting_with_cherry_then_produces_no_notes() -> Result<()> {
    // Arrange
    let source = single_toggle_page();

    // Act
    let decks = convert(&source, "root", &settings(&[("cherry", "true")]), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks.len(), 1);
    assert!(decks[0].is_empty());
    Ok(())
}

#[tokio::test]
async fn given_strikethrough_runs_when_converting_then_splits_global_and_local_tags() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children(
            "root",
            vec![
                Block::with_runs(
                    "p0",
                    BlockType::Paragraph,
                    vec![RichText::plain("deck tags ").strikethrough()],
                ),
                toggle_with_runs(
                    "t1",
                    vec![RichText::plain("Q1 "), RichText::plain("mine").strikethrough()],
                ),
                Block::toggle("t2", "Q2"),
                Block::child_page("c1", "Child"),
            ],
        )
        .with_children("t1", vec![Block::paragraph("a1", "A1")])
        .with_children("t2", vec![Block::paragraph("a2", "A2")])
        .with_children("c1", vec![Block::toggle("t3", "Q3")])
        .with_children("t3", vec![Block::paragraph("a3", "A3")])
        .build();

    // Act
    let decks = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;

    // Assert
    let root = &decks[0];
    assert_eq!(root.cards[0].name, "1 - Q1 ");
    assert!(root.cards[0].tags.contains("mine"));
    assert!(root.cards[0].tags.contains("deck-tags"));
    assert!(root.cards[1].tags.contains("deck-tags"));
    assert!(!root.cards[1].tags.contains("mine"));
    assert!(decks[1].cards[0].tags.is_empty());
    Ok(())
}

#[tokio::test]
async fn given_tags_disabled_when_converting_then_strikethrough_stays_in_front() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children(
            "root",
            vec![toggle_with_runs(
                "t1",
                vec![RichText::plain("Q "), RichText::plain("old").strikethrough()],
            )],
        )
        .with_children("t1", vec![Block::paragraph("a1", "A")])
        .build();

    // Act
    let decks = convert(&source, "root", &settings(&[("tags", "false")]), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks[0].cards[0].name, "1 - Q <del>old</del>");
    assert!(decks[0].cards[0].tags.is_empty());
    Ok(())
}

#[tokio::test]
async fn given_underlined_runs_when_converting_with_no_underline_then_drops_the_markup() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children(
            "root",
            vec![toggle_with_runs("t1", vec![RichText::plain("Q "), RichText::plain("key").underline()])],
        )
        .with_children(
            "t1",
            vec![Block::with_runs("p1", BlockType::Paragraph, vec![RichText::plain("A").underline()])],
        )
        .build();

    // Act
    let styled = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;
    let plain = convert(&source, "root", &settings(&[("no-underline", "true")]), &ParserRules::default()).await?;

    // Assert
    assert_eq!(styled[0].cards[0].name, "1 - Q <u>key</u>");
    assert_eq!(styled[0].cards[0].back, "<p><u>A</u></p>");
    assert_eq!(plain[0].cards[0].name, "1 - Q key");
    assert_eq!(plain[0].cards[0].back, "<p>A</p>");
    Ok(())
}

#[tokio::test]
async fn given_bold_text_when_converting_with_input_then_blanks_answer() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children(
            "root",
            vec![toggle_with_runs(
                "t1",
                vec![RichText::plain("21 + 21 is "), RichText::plain("42").bold()],
            )],
        )
        .build();

    // Act
    let decks = convert(
        &source,
        "root",
        &settings(&[("enable-input", "true"), ("cloze", "false")]),
        &ParserRules::default(),
    )
    .await?;

    // Assert
    let card = &decks[0].cards[0];
    assert_eq!(card.name, "1 - 21 + 21 is ");
    assert_eq!(card.answer, "42");
    assert!(card.enable_input);
    Ok(())
}

#[tokio::test]
async fn given_column_list_trigger_when_converting_then_first_column_is_front() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::container("cl", BlockType::ColumnList)])
        .with_children(
            "cl",
            vec![
                Block::container("col1", BlockType::Column),
                Block::container("col2", BlockType::Column),
                Block::container("col3", BlockType::Column),
            ],
        )
        .with_children("col1", vec![Block::paragraph("f", "Front")])
        .with_children("col2", vec![Block::paragraph("b1", "Back one")])
        .with_children("col3", vec![Block::paragraph("b2", "Back two")])
        .build();
    let rules = ParserRules::new().with_flashcard_types("column_list")?;

    // Act
    let decks = convert(&source, "root", &Settings::default(), &rules).await?;

    // Assert
    assert_eq!(decks[0].cards.len(), 1);
    assert_eq!(decks[0].cards[0].name, "1 - <p>Front</p>");
    assert_eq!(decks[0].cards[0].back, "<p>Back one</p><p>Back two</p>");
    Ok(())
}

fn nested_toggles() -> MockBlockSource {
    MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Outer")])
        .with_children("t1", vec![Block::paragraph("a1", "A"), Block::toggle("t2", "Inner")])
        .with_children("t2", vec![Block::paragraph("a2", "B")])
        .build()
}

#[tokio::test]
async fn given_nested_toggle_when_converting_then_renders_it_inside_the_back() -> Result<()> {
    // Arrange
    let source = nested_toggles();

    // Act
    let decks = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks[0].cards.len(), 1);
    assert_eq!(
        decks[0].cards[0].back,
        "<p>A</p><details><summary>Inner</summary><p>B</p></details>"
    );
    Ok(())
}

#[tokio::test]
async fn given_max_one_toggle_without_all_when_converting_then_omits_nested_toggle() -> Result<()> {
    // Arrange
    let source = nested_toggles();

    // Act
    let decks = convert(
        &source,
        "root",
        &settings(&[("max-one-toggle-per-card", "true")]),
        &ParserRules::default(),
    )
    .await?;

    // Assert
    assert_eq!(decks[0].cards.len(), 1);
    assert_eq!(decks[0].cards[0].back, "<p>A</p>");
    Ok(())
}

#[tokio::test]
async fn given_max_one_toggle_with_all_when_converting_then_nested_toggle_follows_as_own_card() -> Result<()> {
    // Arrange
    let source = nested_toggles();

    // Act
    let decks = convert(
        &source,
        "root",
        &settings(&[("max-one-toggle-per-card", "true"), ("all", "true")]),
        &ParserRules::default(),
    )
    .await?;

    // Assert
    let cards = &decks[0].cards;
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].name, "1 - Outer");
    assert_eq!(cards[0].back, "<p>A</p>");
    assert_eq!(cards[1].name, "2 - Inner");
    assert_eq!(cards[1].back, "<p>B</p>");
    Ok(())
}

#[tokio::test]
async fn given_excluded_outer_toggle_when_converting_with_all_then_nested_toggle_is_dropped_too() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Outer 🥑"), Block::toggle("t3", "Keep")])
        .with_children("t1", vec![Block::paragraph("a1", "A"), Block::toggle("t2", "Inner")])
        .with_children("t2", vec![Block::paragraph("a2", "B")])
        .with_children("t3", vec![Block::paragraph("a3", "C")])
        .build();

    // Act
    let decks = convert(
        &source,
        "root",
        &settings(&[("avocado", "true"), ("max-one-toggle-per-card", "true"), ("all", "true")]),
        &ParserRules::default(),
    )
    .await?;

    // Assert
    let names: Vec<_> = decks[0].cards.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["1 - Keep"]);
    Ok(())
}

#[tokio::test]
async fn given_unmarked_outer_toggle_when_cherry_picking_with_all_then_marked_nested_toggle_stays() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Outer")])
        .with_children("t1", vec![Block::paragraph("a1", "A"), Block::toggle("t2", "Inner 🍒")])
        .with_children("t2", vec![Block::paragraph("a2", "B")])
        .build();

    // Act
    let decks = convert(
        &source,
        "root",
        &settings(&[("cherry", "true"), ("max-one-toggle-per-card", "true"), ("all", "true")]),
        &ParserRules::default(),
    )
    .await?;

    // Assert
    let names: Vec<_> = decks[0].cards.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["1 - Inner 🍒"]);
    Ok(())
}

#[tokio::test]
async fn given_toggle_inside_list_item_when_converting_then_all_finds_it() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![bulleted("li", "notes")])
        .with_children("li", vec![Block::toggle("t1", "Hidden Q")])
        .with_children("t1", vec![Block::paragraph("a1", "A")])
        .build();

    // Act
    let top_level = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;
    let everywhere = convert(&source, "root", &settings(&[("all", "true")]), &ParserRules::default()).await?;

    // Assert
    assert!(top_level[0].is_empty());
    assert_eq!(everywhere[0].cards.len(), 1);
    assert_eq!(everywhere[0].cards[0].name, "1 - Hidden Q");
    Ok(())
}

#[tokio::test]
async fn given_duplicate_block_in_listing_when_converting_then_emits_it_once() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Q"), Block::toggle("t1", "Q")])
        .with_children("t1", vec![Block::paragraph("a1", "A")])
        .build();

    // Act
    let decks = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks[0].cards.len(), 1);
    Ok(())
}

#[tokio::test]
async fn given_malformed_and_unknown_blocks_when_converting_then_back_shows_diagnostics() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Q")])
        .with_children(
            "t1",
            vec![
                Block::from_json(json!({ "id": "m1", "type": "paragraph" }), "t1-0"),
                Block::from_json(
                    json!({ "id": "u1", "type": "synced_block", "synced_block": {} }),
                    "t1-1",
                ),
            ],
        )
        .build();

    // Act
    let decks = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;

    // Assert
    let back = &decks[0].cards[0].back;
    assert!(back.contains("unsupported: paragraph<hr />"));
    assert!(back.contains("unsupported: synced_block<hr />"));
    Ok(())
}

#[tokio::test]
async fn given_options_when_converting_then_annotates_ids_and_links() -> Result<()> {
    // Arrange
    let source = single_toggle_page();
    let options = settings(&[
        ("use-notion-id", "true"),
        ("add-notion-link", "true"),
        ("parent-block-id", "aa-bb"),
    ]);

    // Act
    let decks = convert(&source, "root", &options, &ParserRules::default()).await?;

    // Assert
    let card = &decks[0].cards[0];
    assert_eq!(card.notion_id.as_deref(), Some("t1"));
    assert_eq!(card.guid, "t1");
    assert_eq!(
        card.notion_link.as_deref(),
        Some("https://www.notion.so/Root-aabb#t1")
    );
    Ok(())
}

#[tokio::test]
async fn given_parent_name_when_converting_then_prefixes_root_deck() -> Result<()> {
    // Arrange
    let source = single_toggle_page();

    // Act
    let decks = FlashcardFinder::new(&source, &HtmlInlineRenderer, &Settings::default())
        .find_flashcards("root", ParentKind::Database, Some("Parent"), &ParserRules::default())
        .await?;

    // Assert
    assert_eq!(decks[0].name, "Parent::Root");
    assert_eq!(decks[0].parent_name.as_deref(), Some("Parent"));
    Ok(())
}

#[tokio::test]
async fn given_page_without_triggers_when_converting_then_returns_one_empty_deck() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "")
        .with_children("root", vec![Block::paragraph("p1", "just text")])
        .build();

    // Act
    let decks = convert(&source, "root", &Settings::default(), &ParserRules::default()).await?;

    // Assert
    assert_eq!(decks.len(), 1);
    assert_eq!(decks[0].name, "Untitled");
    assert!(decks[0].is_empty());
    Ok(())
}

#[tokio::test]
async fn given_transient_failure_on_child_fetch_when_converting_then_retries_once() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Q")])
        .with_children("t1", vec![Block::paragraph("p1", "A")])
        .with_failure("t1", Failure::Transient(1))
        .build();

    // Act
    let decks = FlashcardFinder::new(&source, &HtmlInlineRenderer, &Settings::default())
        .with_policy(fast_policy())
        .find_flashcards("root", ParentKind::Page, None, &ParserRules::default())
        .await?;

    // Assert
    assert_eq!(decks[0].cards[0].back, "<p>A</p>");
    assert_eq!(source.fetch_count("t1"), 2);
    Ok(())
}

#[tokio::test]
async fn given_failure_on_nested_fetch_when_converting_then_names_the_block() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Q").with_children(true)])
        .with_failure("t1", Failure::Transient(2))
        .build();

    // Act
    let result = FlashcardFinder::new(&source, &HtmlInlineRenderer, &Settings::default())
        .with_policy(fast_policy())
        .find_flashcards("root", ParentKind::Page, None, &ParserRules::default())
        .await;

    // Assert
    match result {
        Err(TraversalError::FetchFailed {
            block_id, attempts, ..
        }) => {
            assert_eq!(block_id, "t1");
            assert_eq!(attempts, 2);
        }
        other => panic!("Expected FetchFailed, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn given_unavailable_root_when_converting_then_returns_root_unavailable() -> Result<()> {
    // Arrange
    let missing_title = MockBlockSource::builder().build();
    let failing_children = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_failure("root", Failure::Permanent)
        .build();

    // Act
    let first = convert(&missing_title, "root", &Settings::default(), &ParserRules::default()).await;
    let second = FlashcardFinder::new(&failing_children, &HtmlInlineRenderer, &Settings::default())
        .find_flashcards("root", ParentKind::Page, None, &ParserRules::default())
        .await;

    // Assert
    let first = first.unwrap_err();
    assert!(matches!(
        first.downcast_ref::<TraversalError>(),
        Some(TraversalError::RootUnavailable { .. })
    ));
    match second {
        Err(error @ TraversalError::RootUnavailable { .. }) => assert_eq!(error.block_id(), "root"),
        other => panic!("Expected RootUnavailable, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn given_cancellation_during_fetch_when_converting_then_returns_cancelled() -> Result<()> {
    // Arrange
    let source = MockBlockSource::builder()
        .with_page("root", "Root")
        .with_children("root", vec![Block::toggle("t1", "Q").with_children(true)])
        .with_failure("t1", Failure::Hang)
        .build();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    // Act
    let result = FlashcardFinder::new(&source, &HtmlInlineRenderer, &Settings::default())
        .with_cancellation(cancel)
        .find_flashcards("root", ParentKind::Page, None, &ParserRules::default())
        .await;

    // Assert
    assert_eq!(
        result,
        Err(TraversalError::Cancelled {
            block_id: "t1".to_string()
        })
    );
    Ok(())
}
