//! Markdown → PDF export for optimized resumes.
//!
//! Two views of the same fixed resume style:
//! - `render_html` produces a standalone HTML page with `RESUME_CSS` embedded.
//! - `render_pdf` lays the Markdown block structure out on US-letter pages with
//!   the built-in Helvetica faces, using `RESUME_STYLESHEET`.
//!
//! Rendering is pure and independent of the optimizer. A render failure must
//! never block returning the optimized text. PDF layout is CPU-bound: async
//! callers go through `spawn_render_pdf`.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag};

use crate::errors::AppError;

const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

/// Stylesheet embedded in the HTML rendering.
pub const RESUME_CSS: &str = "\
body { font-family: Helvetica, Arial, sans-serif; font-size: 11pt; line-height: 1.35; \
color: #222; max-width: 7.5in; margin: 0.75in auto; }
h1 { font-size: 20pt; margin: 0 0 4pt 0; }
h2 { font-size: 14pt; margin: 12pt 0 4pt 0; border-bottom: 1px solid #999; }
h3 { font-size: 12pt; margin: 8pt 0 2pt 0; }
ul { margin: 2pt 0 6pt 0; padding-left: 14pt; }
li { margin: 0 0 2pt 0; }
p { margin: 0 0 6pt 0; }
hr { border: none; border-top: 1px solid #bbb; }
";

/// Page geometry and type scale for the PDF rendering.
#[derive(Debug, Clone, Copy)]
pub struct Stylesheet {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub h1_pt: f32,
    pub h2_pt: f32,
    pub h3_pt: f32,
    pub body_pt: f32,
    pub line_spacing: f32,
    pub block_gap_mm: f32,
    pub list_indent_mm: f32,
}

pub const RESUME_STYLESHEET: Stylesheet = Stylesheet {
    page_width_mm: 215.9,
    page_height_mm: 279.4,
    margin_mm: 19.05,
    h1_pt: 20.0,
    h2_pt: 14.0,
    h3_pt: 12.0,
    body_pt: 11.0,
    line_spacing: 1.35,
    block_gap_mm: 2.0,
    list_indent_mm: 5.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem,
    Rule,
}

/// One laid-out unit of the document: a heading, paragraph, list item or rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

impl Block {
    fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }
}

/// Renders Markdown into a standalone HTML page carrying the resume stylesheet.
pub fn render_html(markdown: &str) -> String {
    let mut body = String::new();
    html::push_html(&mut body, Parser::new_ext(markdown, markdown_options()));

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Tailored Resume</title>\n<style>\n{RESUME_CSS}</style>\n</head>\n\
         <body>\n{body}</body>\n</html>\n"
    )
}

/// Renders Markdown to PDF bytes with the fixed resume stylesheet.
pub fn render_pdf(markdown: &str) -> Result<Vec<u8>, AppError> {
    render_pdf_with(markdown, &RESUME_STYLESHEET)
}

/// Runs `render_pdf` on the blocking pool.
pub async fn spawn_render_pdf(markdown: String) -> Result<Vec<u8>, AppError> {
    tokio::task::spawn_blocking(move || render_pdf(&markdown))
        .await
        .map_err(|e| AppError::Render(format!("renderer aborted: {e}")))?
}

pub fn render_pdf_with(markdown: &str, style: &Stylesheet) -> Result<Vec<u8>, AppError> {
    let blocks = markdown_blocks(markdown);

    let (doc, page, layer) = PdfDocument::new(
        "Tailored Resume",
        Mm(style.page_width_mm),
        Mm(style.page_height_mm),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Render(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Render(e.to_string()))?;

    {
        let mut layer = doc.get_page(page).get_layer(layer);
        let mut y = style.page_height_mm - style.margin_mm;
        let text_width = style.page_width_mm - 2.0 * style.margin_mm;

        for block in &blocks {
            if block.kind == BlockKind::Rule {
                y -= style.block_gap_mm * 2.0;
                continue;
            }

            let (size, font, indent, bullet): (f32, &IndirectFontRef, f32, &str) = match block.kind
            {
                BlockKind::Heading(1) => (style.h1_pt, &bold, 0.0, ""),
                BlockKind::Heading(2) => (style.h2_pt, &bold, 0.0, ""),
                BlockKind::Heading(_) => (style.h3_pt, &bold, 0.0, ""),
                BlockKind::ListItem => (style.body_pt, &regular, style.list_indent_mm, "- "),
                _ => (style.body_pt, &regular, 0.0, ""),
            };

            let line_height = size * style.line_spacing * PT_TO_MM;
            let max_chars = chars_per_line(size, text_width - indent);
            let text = format!("{bullet}{}", to_winansi(&block.text));

            for line in wrap_words(&text, max_chars) {
                if y - line_height < style.margin_mm {
                    let (next_page, next_layer) = doc.add_page(
                        Mm(style.page_width_mm),
                        Mm(style.page_height_mm),
                        "Layer 1",
                    );
                    layer = doc.get_page(next_page).get_layer(next_layer);
                    y = style.page_height_mm - style.margin_mm;
                }
                y -= line_height;
                write_line(&layer, line, size, style.margin_mm + indent, y, font);
            }

            y -= style.block_gap_mm;
        }
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::Render(e.to_string()))
}

fn write_line(
    layer: &PdfLayerReference,
    line: String,
    size: f32,
    x_mm: f32,
    y_mm: f32,
    font: &IndirectFontRef,
) {
    layer.use_text(line, size, Mm(x_mm), Mm(y_mm), font);
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Flattens Markdown into headings, paragraphs, list items and rules.
/// Inline styling is dropped; the text of links and code spans is kept.
pub fn markdown_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Start(Tag::Heading(level, ..)) => {
                flush(&mut blocks, &mut current);
                current = Some(Block::new(BlockKind::Heading(heading_rank(level))));
            }
            Event::Start(Tag::Item) => {
                flush(&mut blocks, &mut current);
                current = Some(Block::new(BlockKind::ListItem));
            }
            Event::Start(Tag::Paragraph) => {
                if current.is_none() {
                    current = Some(Block::new(BlockKind::Paragraph));
                }
            }
            Event::End(Tag::Heading(..))
            | Event::End(Tag::Paragraph)
            | Event::End(Tag::Item)
            | Event::End(Tag::TableRow)
            | Event::End(Tag::TableHead) => flush(&mut blocks, &mut current),
            Event::End(Tag::TableCell) => {
                if let Some(block) = current.as_mut() {
                    block.text.push_str("  ");
                }
            }
            Event::Text(text) | Event::Code(text) => current
                .get_or_insert_with(|| Block::new(BlockKind::Paragraph))
                .text
                .push_str(&text),
            Event::SoftBreak | Event::HardBreak => {
                if let Some(block) = current.as_mut() {
                    block.text.push(' ');
                }
            }
            Event::Rule => {
                flush(&mut blocks, &mut current);
                blocks.push(Block::new(BlockKind::Rule));
            }
            _ => {}
        }
    }

    flush(&mut blocks, &mut current);
    blocks
}

fn flush(blocks: &mut Vec<Block>, current: &mut Option<Block>) {
    if let Some(mut block) = current.take() {
        let trimmed = block.text.trim();
        if !trimmed.is_empty() {
            block.text = trimmed.to_string();
            blocks.push(block);
        }
    }
}

fn heading_rank(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn chars_per_line(font_pt: f32, width_mm: f32) -> usize {
    let width_pt = width_mm / PT_TO_MM;
    ((width_pt / (font_pt * AVG_GLYPH_EM)) as usize).max(10)
}

/// Greedy word wrap. Words longer than a line are split.
fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let line_len = line.chars().count();
        if !line.is_empty() && line_len + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// The built-in PDF fonts use WinAnsi, a single-byte encoding covering ASCII
/// and Latin-1. Typographic punctuation is mapped to ASCII; characters outside
/// the encoding become `?`.
fn to_winansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            '\u{00A0}' => ' ',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            '\u{00A1}'..='\u{00FF}' => c,
            c if c.is_whitespace() => ' ',
            _ => '?',
        })
        .collect()
}
