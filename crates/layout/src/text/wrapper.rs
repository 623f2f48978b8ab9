//! Greedy line breaking for paragraphs.
//!
//! Runs are first cut into tokens at break opportunities (spaces, tabs,
//! explicit breaks, atomic runs); a word may span several runs. Tokens are
//! then packed into lines first-fit. A word wider than an empty line is
//! broken between characters.

use super::tabs::{PendingTab, next_tab_stop};
use super::{Line, MarkerMeasure, MeasureContext, ParagraphMeasure, TabSegment, fit_image};
use crate::cache::FontMetrics;
use crate::error::{LayoutError, check_dimension};
use crate::flow::{ParagraphAttrs, ParagraphBlock, Run};
use crate::measure::FontSignature;
use folio_style::{Justification, LevelSuffix, TabAlignment};

const EPSILON: f32 = 0.01;

/// A measured slice of one run: chars `start..end` (`0..1` for atomic runs).
#[derive(Debug, Clone)]
struct Item<'a> {
    run: usize,
    start: usize,
    end: usize,
    text: &'a str,
    font: &'a FontSignature,
    letter_spacing: f32,
    width: f32,
    metrics: FontMetrics,
}

#[derive(Debug)]
enum Token<'a> {
    Word(Vec<Item<'a>>),
    Space(Item<'a>),
    Tab(Item<'a>),
    Break(Item<'a>),
    Atomic(Item<'a>),
}

fn flush_word<'a>(tokens: &mut Vec<Token<'a>>, word: &mut Vec<Item<'a>>) {
    if !word.is_empty() {
        tokens.push(Token::Word(std::mem::take(word)));
    }
}

fn tokenize<'a>(
    block: &'a ParagraphBlock,
    paragraph_font: &'a FontSignature,
    content_width: f32,
    ctx: &MeasureContext<'_>,
) -> Result<Vec<Token<'a>>, LayoutError> {
    let mut tokens = Vec::new();
    let mut word: Vec<Item<'a>> = Vec::new();

    for (run_idx, run) in block.runs.iter().enumerate() {
        match run {
            Run::Text(text_run) => {
                let font = text_run.font.as_ref().unwrap_or(paragraph_font);
                font.validate()?;
                let metrics = ctx.font_metrics(font);
                let letter_spacing = text_run.letter_spacing;
                let text = text_run.text.as_str();

                let make_item = |start: usize, end: usize, byte_start: usize, byte_end: usize| {
                    let slice = &text[byte_start..byte_end];
                    Item {
                        run: run_idx,
                        start,
                        end,
                        text: slice,
                        font,
                        letter_spacing,
                        width: ctx.text_width(slice, font, letter_spacing),
                        metrics,
                    }
                };

                // (char index, byte index) where the current word piece began.
                let mut piece_start: Option<(usize, usize)> = None;
                let mut char_count = 0;
                for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
                    char_count = char_idx + 1;
                    if !matches!(ch, ' ' | '\t' | '\n') {
                        piece_start.get_or_insert((char_idx, byte_idx));
                        continue;
                    }
                    if let Some((start, byte_start)) = piece_start.take() {
                        word.push(make_item(start, char_idx, byte_start, byte_idx));
                    }
                    flush_word(&mut tokens, &mut word);

                    let byte_end = byte_idx + ch.len_utf8();
                    let mut item = make_item(char_idx, char_idx + 1, byte_idx, byte_end);
                    match ch {
                        ' ' => tokens.push(Token::Space(item)),
                        '\t' => {
                            item.width = 0.0;
                            tokens.push(Token::Tab(item));
                        }
                        _ => {
                            item.width = 0.0;
                            tokens.push(Token::Break(item));
                        }
                    }
                }
                if let Some((start, byte_start)) = piece_start {
                    word.push(make_item(start, char_count, byte_start, text.len()));
                }
            }
            Run::Image(image) => {
                flush_word(&mut tokens, &mut word);
                let width = check_dimension("imageWidth", image.width)?;
                let height = check_dimension("imageHeight", image.height)?;
                let fitted = fit_image(width, height, content_width);
                tokens.push(Token::Atomic(Item {
                    run: run_idx,
                    start: 0,
                    end: 1,
                    text: "",
                    font: paragraph_font,
                    letter_spacing: 0.0,
                    width: fitted.width,
                    metrics: FontMetrics {
                        ascent: fitted.height,
                        descent: 0.0,
                    },
                }));
            }
            Run::LineBreak(_) | Run::Tab(_) => {
                flush_word(&mut tokens, &mut word);
                let item = Item {
                    run: run_idx,
                    start: 0,
                    end: 1,
                    text: "",
                    font: paragraph_font,
                    letter_spacing: 0.0,
                    width: 0.0,
                    metrics: ctx.font_metrics(paragraph_font),
                };
                tokens.push(if matches!(run, Run::Tab(_)) {
                    Token::Tab(item)
                } else {
                    Token::Break(item)
                });
            }
            Run::FieldAnnotation(field) => {
                flush_word(&mut tokens, &mut word);
                let font = field.font.as_ref().unwrap_or(paragraph_font);
                font.validate()?;
                tokens.push(Token::Atomic(Item {
                    run: run_idx,
                    start: 0,
                    end: 1,
                    text: field.label.as_str(),
                    font,
                    letter_spacing: 0.0,
                    width: ctx.text_width(&field.label, font, 0.0),
                    metrics: ctx.font_metrics(font),
                }));
            }
        }
    }
    flush_word(&mut tokens, &mut word);
    Ok(tokens)
}

struct LineBuilder {
    start_x: f32,
    available: f32,
    from: Option<(usize, usize)>,
    to: (usize, usize),
    width: f32,
    trailing_space: f32,
    ascent: f32,
    descent: f32,
    has_items: bool,
    segments: Vec<TabSegment>,
    pending: Option<PendingTab>,
}

impl LineBuilder {
    fn new(start_x: f32, available: f32, position: (usize, usize)) -> Self {
        Self {
            start_x,
            available,
            from: None,
            to: position,
            width: 0.0,
            trailing_space: 0.0,
            ascent: 0.0,
            descent: 0.0,
            has_items: false,
            segments: Vec::new(),
            pending: None,
        }
    }

    fn fits(&self, width: f32) -> bool {
        self.width + width <= self.available + EPSILON
    }

    fn push(&mut self, item: &Item<'_>, is_space: bool) {
        self.from.get_or_insert((item.run, item.start));
        self.to = (item.run, item.end);
        self.width += item.width;
        self.trailing_space = if is_space {
            self.trailing_space + item.width
        } else {
            0.0
        };
        self.ascent = self.ascent.max(item.metrics.ascent);
        self.descent = self.descent.max(item.metrics.descent);
        self.has_items = true;
        if let Some(pending) = self.pending.as_mut() {
            pending.following_width += item.width;
        }
    }

    fn resolve_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            let gap = pending.resolve();
            if let Some(segment) = self.segments.get_mut(pending.segment) {
                segment.width = gap;
            }
            self.width += gap;
        }
    }

    fn finish(mut self, attrs: &ParagraphAttrs, fallback: FontMetrics) -> Line {
        self.resolve_pending();
        let (ascent, descent) = if self.has_items && self.ascent + self.descent > 0.0 {
            (self.ascent, self.descent)
        } else {
            (fallback.ascent, fallback.descent)
        };
        let width = (self.width - self.trailing_space).max(0.0);
        let free = (self.available - width).max(0.0);
        let align_offset = match attrs.alignment {
            Justification::Center => free / 2.0,
            Justification::End => free,
            Justification::Start | Justification::Both | Justification::Distribute => 0.0,
        };
        let (from_run, from_char) = self.from.unwrap_or(self.to);

        Line {
            from_run,
            from_char,
            to_run: self.to.0,
            to_char: self.to.1,
            width,
            x_offset: self.start_x + align_offset,
            available_width: self.available,
            ascent,
            descent,
            line_height: attrs.spacing.line.line_height(ascent + descent),
            segments: self.segments,
        }
    }
}

/// Per-paragraph constants of the packing loop.
struct Frame<'p> {
    attrs: &'p ParagraphAttrs,
    fallback: FontMetrics,
    first_start: f32,
    rest_start: f32,
    right_edge: f32,
}

impl Frame<'_> {
    fn line(&self, is_first: bool, position: (usize, usize)) -> LineBuilder {
        let start = if is_first { self.first_start } else { self.rest_start };
        LineBuilder::new(start, (self.right_edge - start).max(0.0), position)
    }
}

struct Packer<'p> {
    frame: Frame<'p>,
    lines: Vec<Line>,
    current: LineBuilder,
}

impl Packer<'_> {
    fn break_line(&mut self) {
        let position = self.current.to;
        let next = self.frame.line(false, position);
        let done = std::mem::replace(&mut self.current, next);
        self.lines.push(done.finish(self.frame.attrs, self.frame.fallback));
    }

    fn place_word(&mut self, pieces: Vec<Item<'_>>, ctx: &MeasureContext<'_>) {
        let total: f32 = pieces.iter().map(|p| p.width).sum();
        if self.current.fits(total) {
            self.push_all(&pieces, ctx);
            return;
        }
        if self.current.has_items {
            self.break_line();
            if self.current.fits(total) {
                self.push_all(&pieces, ctx);
                return;
            }
        }

        // Wider than a whole line: break between characters.
        for piece in &pieces {
            for (offset, (byte_idx, ch)) in piece.text.char_indices().enumerate() {
                let slice = &piece.text[byte_idx..byte_idx + ch.len_utf8()];
                let width = ctx.text_width(slice, piece.font, 0.0) + piece.letter_spacing;
                if self.current.has_items && !self.current.fits(width) {
                    self.break_line();
                }
                let single = Item {
                    start: piece.start + offset,
                    end: piece.start + offset + 1,
                    text: slice,
                    width,
                    ..piece.clone()
                };
                self.note_decimal(&single, ctx);
                self.current.push(&single, false);
            }
        }
    }

    fn push_all(&mut self, pieces: &[Item<'_>], ctx: &MeasureContext<'_>) {
        for piece in pieces {
            self.note_decimal(piece, ctx);
            self.current.push(piece, false);
        }
    }

    /// Records where the decimal separator falls for a pending decimal tab.
    fn note_decimal(&mut self, item: &Item<'_>, ctx: &MeasureContext<'_>) {
        let Some(pending) = self.current.pending.as_mut() else {
            return;
        };
        if pending.alignment != TabAlignment::Decimal || pending.decimal_width.is_some() {
            return;
        }
        if let Some(byte_idx) = item.text.find(ctx.config.decimal_separator) {
            let prefix = ctx.text_width(&item.text[..byte_idx], item.font, item.letter_spacing);
            pending.decimal_width = Some(pending.following_width + prefix);
        }
    }

    fn place_tab(&mut self, mut item: Item<'_>, ctx: &MeasureContext<'_>) {
        self.current.resolve_pending();
        loop {
            let line_x = self.current.start_x + self.current.width;
            let stop = next_tab_stop(
                &self.frame.attrs.tabs,
                line_x,
                self.frame.attrs.indent.left,
                ctx.config.default_tab_interval,
            );
            let stop_x = stop.position - self.current.start_x;
            let start_width = if stop.alignment == TabAlignment::Start {
                (stop_x - self.current.width).max(0.0)
            } else {
                0.0
            };
            if self.current.has_items && !self.current.fits(start_width) {
                self.break_line();
                continue;
            }

            let segment = self.current.segments.len();
            self.current.segments.push(TabSegment {
                run_index: item.run,
                x: self.current.width,
                width: start_width,
                alignment: stop.alignment,
                leader: stop.leader,
                stop: stop.position,
            });
            item.width = start_width;
            let start_x = self.current.width;
            self.current.push(&item, false);
            if stop.alignment != TabAlignment::Start {
                self.current.pending = Some(PendingTab {
                    segment,
                    start_x,
                    stop_x,
                    alignment: stop.alignment,
                    following_width: 0.0,
                    decimal_width: None,
                });
            }
            return;
        }
    }
}

fn paragraph_font<'a>(block: &'a ParagraphBlock, ctx: &'a MeasureContext<'_>) -> &'a FontSignature {
    block.attrs.font.as_ref().unwrap_or(&ctx.config.default_font)
}

/// Breaks a paragraph into lines at `content_width`.
pub fn measure_paragraph(
    block: &ParagraphBlock,
    content_width: f32,
    ctx: &MeasureContext<'_>,
) -> Result<ParagraphMeasure, LayoutError> {
    let content_width = check_dimension("contentWidth", content_width)?;
    let attrs = &block.attrs;
    let font = paragraph_font(block, ctx);
    font.validate()?;
    let fallback = ctx.font_metrics(font);

    let indent = &attrs.indent;
    let mut first_start = (indent.left + indent.first_line_offset()).max(0.0);
    let rest_start = indent.left.max(0.0);
    let right_edge = (content_width - indent.right.max(0.0)).max(0.0);

    let marker = match &attrs.marker {
        Some(marker) => {
            let marker_font = marker.font.as_ref().unwrap_or(font);
            let width = ctx.text_width(&marker.text, marker_font, 0.0);
            let x = first_start;
            let marker_end = x + width;
            first_start = match marker.suffix {
                LevelSuffix::Tab => {
                    next_tab_stop(&attrs.tabs, marker_end, indent.left, ctx.config.default_tab_interval)
                        .position
                }
                LevelSuffix::Space => marker_end + ctx.text_width(" ", marker_font, 0.0),
                LevelSuffix::Nothing => marker_end,
            };
            Some(MarkerMeasure {
                text: marker.text.clone(),
                x,
                width,
            })
        }
        None => None,
    };

    let tokens = tokenize(block, font, content_width, ctx)?;
    let frame = Frame {
        attrs,
        fallback,
        first_start,
        rest_start,
        right_edge,
    };
    let first_line = frame.line(true, (0, 0));
    let mut packer = Packer {
        frame,
        lines: Vec::new(),
        current: first_line,
    };

    let mut ended_with_break = false;
    for token in tokens {
        ended_with_break = false;
        match token {
            Token::Word(pieces) => packer.place_word(pieces, ctx),
            Token::Space(item) => packer.current.push(&item, true),
            Token::Tab(item) => packer.place_tab(item, ctx),
            Token::Atomic(item) => {
                if packer.current.has_items && !packer.current.fits(item.width) {
                    packer.break_line();
                }
                packer.current.push(&item, false);
            }
            Token::Break(item) => {
                packer.current.push(&item, false);
                packer.break_line();
                ended_with_break = true;
            }
        }
    }

    let Packer {
        frame,
        mut lines,
        current,
    } = packer;
    if current.has_items || lines.is_empty() || ended_with_break {
        lines.push(current.finish(frame.attrs, frame.fallback));
    }

    let top_inset = attrs.spacing.before.max(0.0) + attrs.borders.top_extent();
    let bottom_inset = attrs.borders.bottom_extent() + attrs.spacing.after.max(0.0);
    let total_height = top_inset + lines.iter().map(|l| l.line_height).sum::<f32>() + bottom_inset;

    log::trace!(
        "Measured paragraph '{}' into {} line(s), height {:.2}",
        block.id,
        lines.len(),
        total_height
    );

    Ok(ParagraphMeasure {
        lines,
        top_inset,
        bottom_inset,
        total_height,
        marker,
    })
}
