use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};
use tracing::debug;

use crate::format::{DocumentModel, REVIEWED_LABEL};

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 50.0;
const FOOTER_Y: f32 = 28.0;

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;
const LEADING: f32 = 1.35;

const LABEL_X: f32 = MARGIN;
const NESTED_INDENT: f32 = 18.0;
const VALUE_X: f32 = 390.0;
const ROW_GAP: f32 = 5.0;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn name(self) -> Name<'static> {
        match self {
            Face::Regular => REGULAR,
            Face::Bold => BOLD,
        }
    }
}

#[derive(Debug, Clone)]
struct Glyphs {
    x: f32,
    y: f32,
    face: Face,
    size: f32,
    text: String,
}

#[derive(Debug, Default)]
struct Page {
    glyphs: Vec<Glyphs>,
    rules: Vec<(f32, f32)>,
}

/// Lays pages out top to bottom. A row that would cross the bottom margin
/// moves to a new page; rows longer than a page break between lines.
struct Layout {
    pages: Vec<Page>,
    cursor: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    /// Moves to a fresh page unless `height` fits below the cursor. Blocks
    /// taller than a whole page are started where they are.
    fn reserve(&mut self, height: f32) {
        let at_top = self.cursor >= PAGE_HEIGHT - MARGIN;
        let fits_on_page = height <= PAGE_HEIGHT - 2.0 * MARGIN;
        if self.cursor - height < MARGIN && !at_top && fits_on_page {
            self.new_page();
        }
    }

    fn page(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text(&mut self, x: f32, y: f32, face: Face, size: f32, text: String) {
        self.page().glyphs.push(Glyphs {
            x,
            y,
            face,
            size,
            text,
        });
    }

    fn heading(&mut self, text: &str) {
        let height = TITLE_SIZE * LEADING;
        self.reserve(height);
        self.cursor -= TITLE_SIZE;
        let y = self.cursor;
        self.text(LABEL_X, y, Face::Bold, TITLE_SIZE, text.to_string());
        self.cursor -= height - TITLE_SIZE + ROW_GAP * 2.0;
    }

    /// Two-column block: wrapped label on the left, wrapped value on the right.
    fn row(&mut self, label: &str, value: &str, label_face: Face, value_face: Face, indent: f32) {
        let label_x = LABEL_X + indent;
        let label_lines = wrap(label, VALUE_X - label_x - 12.0, BODY_SIZE);
        let value_lines = wrap(value, PAGE_WIDTH - MARGIN - VALUE_X, BODY_SIZE);
        let line_height = BODY_SIZE * LEADING;
        let count = label_lines.len().max(value_lines.len()).max(1);
        let height = count as f32 * line_height + ROW_GAP;
        self.reserve(height);

        let mut labels = label_lines.into_iter();
        let mut values = value_lines.into_iter();
        for _ in 0..count {
            if self.cursor - line_height < MARGIN {
                self.new_page();
            }
            let y = self.cursor - BODY_SIZE;
            if let Some(line) = labels.next() {
                self.text(label_x, y, label_face, BODY_SIZE, line);
            }
            if let Some(line) = values.next() {
                self.text(VALUE_X, y, value_face, BODY_SIZE, line);
            }
            self.cursor -= line_height;
        }
        self.cursor -= ROW_GAP;
        let rule_y = self.cursor + ROW_GAP / 2.0;
        self.page().rules.push((rule_y, label_x));
    }

    fn gap(&mut self, height: f32) {
        self.cursor -= height;
    }
}

/// Renders the document model as a paginated A4 PDF.
pub fn render_pdf(model: &DocumentModel) -> Vec<u8> {
    let mut layout = Layout::new();
    layout.heading(model.title);
    for fact in &model.facts {
        layout.row(fact.label, or_dash(&fact.value), Face::Bold, Face::Regular, 0.0);
    }
    layout.gap(ROW_GAP * 2.0);
    for line in &model.lines {
        let (indent, value_face) = if line.nested {
            (NESTED_INDENT, Face::Regular)
        } else {
            (0.0, Face::Bold)
        };
        layout.row(&line.label, or_dash(&line.value), Face::Regular, value_face, indent);
    }
    if model.reviewed {
        layout.gap(ROW_GAP * 2.0);
        layout.row(REVIEWED_LABEL, "", Face::Bold, Face::Regular, 0.0);
    }

    let bytes = write_pdf(model.title, &layout.pages);
    debug!(pages = layout.pages.len(), bytes = bytes.len(), "pdf rendered");
    bytes
}

fn write_pdf(title: &str, pages: &[Page]) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();
    let regular_id = alloc();
    let bold_id = alloc();
    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = pages.iter().map(|_| alloc()).collect();

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(pages.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr("report-document"));
    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let total = pages.len();
    for (idx, page) in pages.iter().enumerate() {
        let mut content = Content::new();
        if !page.rules.is_empty() {
            content.set_line_width(0.4);
            content.set_stroke_gray(0.8);
            for (y, x) in &page.rules {
                content.move_to(*x, *y);
                content.line_to(PAGE_WIDTH - MARGIN, *y);
            }
            content.stroke();
        }
        for glyphs in &page.glyphs {
            let encoded = encode_win_ansi(&glyphs.text);
            content
                .begin_text()
                .set_font(glyphs.face.name(), glyphs.size)
                .next_line(glyphs.x, glyphs.y)
                .show(Str(&encoded))
                .end_text();
        }
        let footer = encode_win_ansi(&format!("Strana {} / {}", idx + 1, total));
        let footer_x = PAGE_WIDTH / 2.0 - text_width(&footer, FOOTER_SIZE) / 2.0;
        content
            .begin_text()
            .set_font(REGULAR, FOOTER_SIZE)
            .next_line(footer_x, FOOTER_Y)
            .show(Str(&footer))
            .end_text();

        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[idx], &compressed)
            .filter(Filter::FlateDecode);

        let mut pdf_page = pdf.page(page_ids[idx]);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[idx]);
        let mut resources = pdf_page.resources();
        let mut fonts = resources.fonts();
        fonts.pair(REGULAR, regular_id);
        fonts.pair(BOLD, bold_id);
    }

    pdf.finish()
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

/// Maps text onto the WinAnsi code page. Serbian letters the code page
/// lacks are transliterated; anything else unrepresentable becomes `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{20}'..='\u{7e}' => out.push(ch as u8),
            'č' | 'ć' => out.push(b'c'),
            'Č' | 'Ć' => out.push(b'C'),
            'đ' => out.extend_from_slice(b"dj"),
            'Đ' => out.extend_from_slice(b"Dj"),
            'š' => out.push(0x9a),
            'Š' => out.push(0x8a),
            'ž' => out.push(0x9e),
            'Ž' => out.push(0x8e),
            '\u{2013}' => out.push(0x96),
            '\u{2014}' => out.push(0x97),
            '\u{201e}' => out.push(0x84),
            '\u{201c}' => out.push(0x93),
            '\u{201d}' => out.push(0x94),
            '\t' | '\n' | '\r' => out.push(b' '),
            '\u{a0}'..='\u{ff}' => out.push(ch as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

/// Approximate Helvetica advance width; wide enough to keep wrapped text
/// inside its column.
fn char_width(byte: u8) -> f32 {
    match byte {
        b'i' | b'j' | b'l' | b'.' | b',' | b':' | b';' | b'\'' | b'!' | b'|' => 0.28,
        b' ' | b'f' | b't' | b'r' | b'I' | b'(' | b')' | b'-' | b'/' => 0.34,
        b'm' | b'w' | b'M' | b'W' | b'@' => 0.86,
        b'A'..=b'Z' => 0.70,
        _ => 0.56,
    }
}

fn text_width(encoded: &[u8], size: f32) -> f32 {
    encoded.iter().map(|byte| char_width(*byte)).sum::<f32>() * size
}

fn str_width(text: &str, size: f32) -> f32 {
    text_width(&encode_win_ansi(text), size)
}

/// Greedy word wrap; words wider than the column are broken by character.
fn wrap(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if str_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if str_width(word, size) <= max_width {
                current = word.to_string();
                continue;
            }
            for ch in word.chars() {
                current.push(ch);
                if str_width(&current, size) > max_width {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn serbian_letters_fit_win_ansi() {
        assert_eq!(encode_win_ansi("Đorđe"), b"Djordje".to_vec());
        assert_eq!(encode_win_ansi("ćevap"), b"cevap".to_vec());
        assert_eq!(encode_win_ansi("Šž"), vec![0x8a, 0x9e]);
        assert_eq!(encode_win_ansi("日"), b"?".to_vec());
    }

    #[test]
    fn long_word_is_split() {
        let lines = wrap(&"x".repeat(200), 100.0, BODY_SIZE);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|line| str_width(line, BODY_SIZE) <= 100.0));
        assert_eq!(lines.concat(), "x".repeat(200));
    }

    #[test]
    fn empty_text_keeps_one_line() {
        assert_eq!(wrap("", 100.0, BODY_SIZE), vec![String::new()]);
    }

    proptest! {
        #[test]
        fn wrapped_lines_stay_in_column(text in "[a-zA-ZčćđšžČĆĐŠŽ ]{0,300}") {
            let width = 150.0;
            let lines = wrap(&text, width, BODY_SIZE);
            for line in &lines {
                prop_assert!(str_width(line, BODY_SIZE) <= width);
            }
            let squeeze = |s: &str| s.split_whitespace().collect::<String>();
            prop_assert_eq!(squeeze(&lines.concat()), squeeze(&text));
        }
    }
}
