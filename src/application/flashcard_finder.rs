// src/application/flashcard_finder.rs
use crate::application::context::TraversalContext;
use crate::application::deck_builder::DeckBuilder;
use crate::application::transforms::{render_inline, NoteDraft, NoteTransformer};
use crate::application::{BlockSource, InlineRenderer};
use crate::constants::UNTITLED;
use crate::domain::{
    Block, BlockContent, BlockType, Deck, ParserRules, RichText, Settings, TagSource,
    TraversalError,
};
use crate::infrastructure::block_hooks::{bulleted_item, media_url, render_block, toggle};
use crate::infrastructure::fetcher::{ChildFetcher, FetchPolicy};
use crate::util::text::to_plain_text;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What the root block of a conversion is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentKind {
    #[default]
    Page,
    Database,
}

/// Walks a block tree and collects its flashcards into decks
pub struct FlashcardFinder<'a, S: BlockSource + ?Sized, R: InlineRenderer> {
    source: &'a S,
    renderer: &'a R,
    settings: &'a Settings,
    policy: FetchPolicy,
    cancel: CancellationToken,
}

impl<'a, S: BlockSource + ?Sized, R: InlineRenderer> FlashcardFinder<'a, S, R> {
    pub fn new(source: &'a S, renderer: &'a R, settings: &'a Settings) -> Self {
        Self {
            source,
            renderer,
            settings,
            policy: FetchPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Convert the tree under `root_id` into decks, root deck first.
    ///
    /// Sub-decks follow in depth-first pre-order. A tree without triggers
    /// yields a single empty root deck.
    #[instrument(skip(self, rules))]
    pub async fn find_flashcards(
        &self,
        root_id: &str,
        parent_kind: ParentKind,
        parent_name: Option<&str>,
        rules: &ParserRules,
    ) -> Result<Vec<Deck>, TraversalError> {
        let fetcher = ChildFetcher::new(self.source, self.policy, self.cancel.clone());

        let title = fetcher
            .page_title(root_id)
            .await
            .map_err(TraversalError::at_root)?;
        let title = non_empty_title(&title);
        let deck_name = match parent_name {
            Some(parent) => Deck::child_name(parent, &title),
            None => title.clone(),
        };
        info!(root_id, deck = %deck_name, "Starting traversal");

        let children = fetcher
            .all_children(root_id)
            .await
            .map_err(TraversalError::at_root)?;

        let walk = Walk {
            settings: self.settings,
            renderer: self.renderer,
            rules,
            fetcher,
            transformer: NoteTransformer::new(self.settings, self.renderer, &title),
        };
        let mut ctx = TraversalContext::new();
        let mut decks = Vec::new();
        walk.deck(
            deck_name,
            root_id.to_string(),
            parent_name.map(str::to_string),
            children,
            &mut ctx,
            &mut decks,
        )
        .await?;

        info!(
            decks = decks.len(),
            cards = decks.iter().map(Deck::len).sum::<usize>(),
            consumed = ctx.consumed_count(),
            "Traversal finished"
        );
        Ok(decks)
    }
}

fn non_empty_title(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

fn sub_deck_title(block: &Block) -> String {
    match &block.content {
        BlockContent::ChildPage { title } => non_empty_title(title),
        _ => non_empty_title(&block.plain_text()),
    }
}

/// One traversal: the collaborators shared by every recursive step
struct Walk<'w, S: BlockSource + ?Sized> {
    settings: &'w Settings,
    renderer: &'w dyn InlineRenderer,
    rules: &'w ParserRules,
    fetcher: ChildFetcher<'w, S>,
    transformer: NoteTransformer<'w>,
}

impl<'w, S: BlockSource + ?Sized> Walk<'w, S> {
    fn collects_heading_tags(&self, block: &Block) -> bool {
        self.settings.tags && self.rules.tags_from == TagSource::Heading && block.block_type.is_heading()
    }

    /// Drop tag runs into the tag buffer and apply run level options
    fn prepare_runs(&self, runs: &[RichText], ctx: &mut TraversalContext) -> Vec<RichText> {
        let strikethrough_tags =
            self.settings.tags && self.rules.tags_from == TagSource::Strikethrough;
        runs.iter()
            .filter_map(|run| {
                if strikethrough_tags && run.annotations.strikethrough {
                    ctx.add_tags(&run.plain_text);
                    return None;
                }
                let mut run = run.clone();
                if self.settings.no_underline {
                    run.annotations.underline = false;
                }
                Some(run)
            })
            .collect()
    }

    /// Rendered inline content of a block, code excepted
    fn inline(&self, block: &Block, ctx: &mut TraversalContext) -> (String, Option<Vec<RichText>>) {
        match (&block.content, block.rich_text()) {
            (BlockContent::Code { .. }, _) | (_, None) => (String::new(), None),
            (_, Some(runs)) => {
                let runs = self.prepare_runs(runs, ctx);
                (render_inline(self.renderer, &runs, self.settings), Some(runs))
            }
        }
    }

    async fn children_of(&self, block: &Block) -> Result<Vec<Block>, TraversalError> {
        if block.has_children {
            self.fetcher.all_children(&block.id).await
        } else {
            Ok(Vec::new())
        }
    }

    /// Walk one deck level; the deck keeps its slot ahead of its sub-decks
    fn deck<'b>(
        &'b self,
        name: String,
        block_id: String,
        parent_name: Option<String>,
        children: Vec<Block>,
        ctx: &'b mut TraversalContext,
        decks: &'b mut Vec<Deck>,
    ) -> BoxFuture<'b, Result<(), TraversalError>> {
        Box::pin(async move {
            debug!(deck = %name, children = children.len(), "Walking deck");
            let slot = decks.len();
            decks.push(Deck::new(name.clone(), block_id.clone(), parent_name.clone()));

            let mut builder = DeckBuilder::new(name, block_id, parent_name);
            self.scan(&children, &mut builder, ctx, decks).await?;
            decks[slot] = builder.finish();
            Ok(())
        })
    }

    fn scan<'b>(
        &'b self,
        blocks: &'b [Block],
        builder: &'b mut DeckBuilder,
        ctx: &'b mut TraversalContext,
        decks: &'b mut Vec<Deck>,
    ) -> BoxFuture<'b, Result<(), TraversalError>> {
        Box::pin(async move {
            let mut ordinal = 0;
            for block in blocks {
                ordinal = next_ordinal(ordinal, block);
                if ctx.is_consumed(&block.id) {
                    debug!(block_id = %block.id, "Skipping consumed block");
                    continue;
                }

                if self.rules.is_sub_deck(block.block_type) {
                    ctx.consume(&block.id);
                    let title = sub_deck_title(block);
                    let children = self.children_of(block).await?;
                    debug!(block_id = %block.id, %title, "Found sub-deck");
                    self.deck(
                        Deck::child_name(builder.name(), &title),
                        block.id.clone(),
                        Some(builder.name().to_string()),
                        children,
                        ctx,
                        decks,
                    )
                    .await?;
                } else if self.rules.is_flashcard(block.block_type) {
                    self.card(block.clone(), builder, ctx).await?;
                } else {
                    self.stray(block, ordinal, builder, ctx, decks).await?;
                }
            }
            Ok(())
        })
    }

    /// Turn a trigger into notes, then any triggers deferred out of it
    fn card<'b>(
        &'b self,
        block: Block,
        builder: &'b mut DeckBuilder,
        ctx: &'b mut TraversalContext,
    ) -> BoxFuture<'b, Result<(), TraversalError>> {
        Box::pin(async move {
            ctx.consume(&block.id);
            let draft = self.draft(&block, ctx).await?;
            if self.transformer.excludes(&draft) {
                let deferred = ctx.take_deferred();
                for nested in &deferred {
                    ctx.consume(&nested.id);
                }
                debug!(block_id = %block.id, nested = deferred.len(), "Excluded by marker");
                return Ok(());
            }
            let notes = self.transformer.finalize(draft);
            debug!(block_id = %block.id, notes = notes.len(), "Built flashcard");
            for note in notes {
                builder.push(note);
            }

            let deferred = ctx.take_deferred();
            if !self.settings.all {
                if !deferred.is_empty() {
                    debug!(block_id = %block.id, count = deferred.len(), "Dropped nested triggers");
                }
                return Ok(());
            }
            for nested in deferred {
                if !ctx.is_consumed(&nested.id) {
                    self.card(nested, builder, ctx).await?;
                }
            }
            Ok(())
        })
    }

    async fn draft(&self, block: &Block, ctx: &mut TraversalContext) -> Result<NoteDraft, TraversalError> {
        let (front, front_runs, back) = if block.block_type == BlockType::ColumnList {
            let mut columns = self.children_of(block).await?.into_iter();
            let front = match columns.next() {
                Some(first) => {
                    ctx.consume(&first.id);
                    self.render_children(&first, ctx).await?
                }
                None => String::new(),
            };
            let mut back = String::new();
            for column in columns {
                ctx.consume(&column.id);
                back.push_str(&self.render_children(&column, ctx).await?);
            }
            (front, None, back)
        } else {
            let (front, runs) = self.inline(block, ctx);
            let back = self.render_children(block, ctx).await?;
            (front, runs, back)
        };

        let raw_front = match front_runs {
            Some(_) => block.plain_text(),
            None => to_plain_text(&front),
        };
        Ok(NoteDraft {
            block_id: block.id.clone(),
            raw_text: format!("{}\n{}", raw_front, to_plain_text(&back)),
            front,
            front_runs,
            back,
            tags: ctx.take_tags(),
            media: ctx.take_media(),
        })
    }

    /// Non-trigger content at deck level: global tags, description, and
    /// with `all` a further scan of its children
    fn stray<'b>(
        &'b self,
        block: &'b Block,
        ordinal: usize,
        builder: &'b mut DeckBuilder,
        ctx: &'b mut TraversalContext,
        decks: &'b mut Vec<Deck>,
    ) -> BoxFuture<'b, Result<(), TraversalError>> {
        Box::pin(async move {
            if self.collects_heading_tags(block) {
                ctx.add_tags(&block.plain_text());
            } else {
                let (inline, _) = self.inline(block, ctx);
                if self.settings.deck_description {
                    builder.append_description(&render_block(block, &inline, ordinal));
                }
            }
            builder.add_global_tags(ctx.take_tags());
            ctx.take_media();

            if self.settings.all && block.has_children {
                let children = self.children_of(block).await?;
                self.scan(&children, builder, ctx, decks).await?;
            }
            Ok(())
        })
    }

    fn render_children<'b>(
        &'b self,
        parent: &'b Block,
        ctx: &'b mut TraversalContext,
    ) -> BoxFuture<'b, Result<String, TraversalError>> {
        Box::pin(async move {
            let children = self.children_of(parent).await?;
            self.render_blocks(&children, ctx).await
        })
    }

    /// Render a card's descendants, consuming every block rendered
    fn render_blocks<'b>(
        &'b self,
        blocks: &'b [Block],
        ctx: &'b mut TraversalContext,
    ) -> BoxFuture<'b, Result<String, TraversalError>> {
        Box::pin(async move {
            let mut html = String::new();
            let mut ordinal = 0;
            for block in blocks {
                ordinal = next_ordinal(ordinal, block);
                if ctx.is_consumed(&block.id) {
                    continue;
                }
                if self.settings.max_one_toggle_per_card && self.rules.is_flashcard(block.block_type) {
                    debug!(block_id = %block.id, "Deferring nested trigger");
                    ctx.defer(block.clone());
                    continue;
                }
                ctx.consume(&block.id);
                html.push_str(&self.render_one(block, ordinal, ctx).await?);
            }
            Ok(html)
        })
    }

    async fn render_one(
        &self,
        block: &Block,
        ordinal: usize,
        ctx: &mut TraversalContext,
    ) -> Result<String, TraversalError> {
        if self.collects_heading_tags(block) {
            ctx.add_tags(&block.plain_text());
            return self.render_children(block, ctx).await;
        }

        let (inline, _) = self.inline(block, ctx);
        if let Some(url) = media_url(block) {
            ctx.add_media(url);
        }
        let children = self.render_children(block, ctx).await?;

        let html = match block.block_type {
            BlockType::Toggle => toggle(&inline, &children),
            BlockType::BulletedListItem => bulleted_item(&inline, &children),
            _ => render_block(block, &inline, ordinal) + &children,
        };
        Ok(html)
    }
}

/// Position among consecutive numbered list items, 0 for anything else
fn next_ordinal(previous: usize, block: &Block) -> usize {
    if block.block_type == BlockType::NumberedListItem {
        previous + 1
    } else {
        0
    }
}
