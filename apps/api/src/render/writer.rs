//! Incremental PDF writer with an explicit layout cursor.
//!
//! The writer owns the only mutable layout state of a render pass: the cursor
//! position, the text column, the size used by `move_down`, and the font/colour
//! currently selected in the page's content stream. Pages are serialized to the
//! sink as soon as they are complete, so memory use is bounded by one page.
//!
//! Coordinates passed in and out are top-down (y grows towards the bottom of the
//! page) like the layout code thinks about them; conversion to PDF user space
//! happens only when operators are emitted.
//!
//! Object numbering:
//! ```text
//! 1 = catalog   2 = page tree   3 = Helvetica   4 = Helvetica-Bold
//! 5.. = (content stream, page) pairs in page order
//! ```

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::xref::{Xref, XrefEntry, XrefType};
use lopdf::{dictionary, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::render::font_metrics::{ascent, line_height, Font};
use crate::render::style::{Color, TextRun};
use crate::render::RenderError;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 72.0;

const CATALOG_ID: ObjectId = (1, 0);
const PAGES_ID: ObjectId = (2, 0);
const FONT_REGULAR_ID: ObjectId = (3, 0);
const FONT_BOLD_ID: ObjectId = (4, 0);
const FIRST_FREE_ID: u32 = 5;

const DEFAULT_FONT_SIZE: f32 = 12.0;

// ────────────────────────────────────────────────────────────────────────────
// Page buffer
// ────────────────────────────────────────────────────────────────────────────

/// Content stream of the page being laid out, plus the graphics state already
/// established in it.
struct PageBuffer {
    content: Content,
    font: Option<(Font, f32)>,
    fill: Option<Color>,
}

impl Default for PageBuffer {
    fn default() -> Self {
        Self {
            content: Content { operations: vec![] },
            font: None,
            fill: None,
        }
    }
}

impl PageBuffer {
    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content
            .operations
            .push(Operation::new(operator, operands));
    }

    fn set_font(&mut self, font: Font, size: f32) {
        if self.font != Some((font, size)) {
            self.push(
                "Tf",
                vec![Object::Name(font.resource_name().into()), num(size)],
            );
            self.font = Some((font, size));
        }
    }

    fn set_fill(&mut self, color: Color) {
        if self.fill != Some(color) {
            let [r, g, b] = color.components();
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.fill = Some(color);
        }
    }

    fn push_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.set_fill(color);
        self.push(
            "re",
            vec![
                num(x),
                num(PAGE_HEIGHT - y - height),
                num(width),
                num(height),
            ],
        );
        self.push("f", vec![]);
    }

    fn push_text(&mut self, x: f32, baseline: f32, run: &TextRun) {
        self.set_font(run.font, run.size);
        self.set_fill(run.color);
        self.push("BT", vec![]);
        self.push("Td", vec![num(x), num(PAGE_HEIGHT - baseline)]);
        self.push(
            "Tj",
            vec![Object::String(
                win_ansi_bytes(&run.text),
                StringFormat::Literal,
            )],
        );
        self.push("ET", vec![]);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Writer
// ────────────────────────────────────────────────────────────────────────────

/// A streaming PDF document writer.
pub struct PdfWriter<W: Write> {
    sink: W,
    offset: usize,
    xref: Xref,
    next_id: u32,
    page_ids: Vec<ObjectId>,
    page: PageBuffer,
    x: f32,
    y: f32,
    current_size: f32,
    finished: bool,
}

impl<W: Write> PdfWriter<W> {
    /// Writes the file header and font objects, then opens the first page.
    pub fn new(sink: W) -> Result<Self, RenderError> {
        let mut writer = Self {
            sink,
            offset: 0,
            xref: Xref::new(0, XrefType::CrossReferenceTable),
            next_id: FIRST_FREE_ID,
            page_ids: Vec::new(),
            page: PageBuffer::default(),
            x: MARGIN,
            y: MARGIN,
            current_size: DEFAULT_FONT_SIZE,
            finished: false,
        };
        writer.write_bytes(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;
        writer.write_object(FONT_REGULAR_ID, &font_object(Font::Helvetica))?;
        writer.write_object(FONT_BOLD_ID, &font_object(Font::HelveticaBold))?;
        writer.sink.flush()?;
        Ok(writer)
    }

    /// Current cursor position, top-down.
    #[cfg(test)]
    pub fn cursor(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Number of pages emitted so far, counting the open one.
    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(!self.finished)
    }

    /// Width available to a paragraph starting at the current column.
    fn column_width(&self) -> f32 {
        (PAGE_WIDTH - self.x - MARGIN).max(0.0)
    }

    /// Lays out a paragraph of runs in the current column, wrapping at spaces
    /// and starting new pages as needed. An empty paragraph still consumes one
    /// line.
    pub fn text(&mut self, runs: &[TextRun]) -> Result<(), RenderError> {
        self.ensure_open()?;
        if let Some(last) = runs.last() {
            self.current_size = last.size;
        }
        let lines = wrap_runs(runs, self.column_width());
        for line in lines {
            let height = if line.is_empty() {
                self.current_size
            } else {
                line.iter().map(|run| run.size).fold(0.0_f32, f32::max)
            };
            if self.y + line_height(height) > PAGE_HEIGHT - MARGIN && self.y > MARGIN {
                self.new_page()?;
            }
            let baseline = self.y + ascent(height);
            let mut x = self.x;
            for run in &line {
                if !run.text.is_empty() {
                    self.page.push_text(x, baseline, run);
                }
                let width = run.width();
                if run.underline && width > 0.0 {
                    let thickness = (run.size / 10.0).floor().max(0.5);
                    self.page.push_rect(
                        x,
                        baseline + run.size * 0.1,
                        width,
                        thickness,
                        run.color,
                    );
                }
                x += width;
            }
            self.y += line_height(height);
        }
        Ok(())
    }

    /// Moves the cursor (and the text column) to an absolute position, then lays
    /// out a single run there.
    pub fn text_at(&mut self, x: f32, y: f32, run: &TextRun) -> Result<(), RenderError> {
        self.ensure_open()?;
        self.x = x;
        self.y = y;
        self.text(std::slice::from_ref(run))
    }

    /// Advances the cursor by `lines` line heights of the most recent text size.
    pub fn move_down(&mut self, lines: f32) -> Result<(), RenderError> {
        self.ensure_open()?;
        self.y += line_height(self.current_size) * lines;
        Ok(())
    }

    /// Fills a rectangle given in top-down coordinates. The cursor does not move.
    pub fn fill_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    ) -> Result<(), RenderError> {
        self.ensure_open()?;
        self.page.push_rect(x, y, width, height, color);
        Ok(())
    }

    /// Emits the open page and the document trailer. Returns total bytes written.
    pub fn finish(&mut self) -> Result<usize, RenderError> {
        self.ensure_open()?;
        self.emit_page()?;
        self.finished = true;

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => self.page_ids.len() as i64,
        };
        self.write_object(PAGES_ID, &pages.into())?;
        let catalog = dictionary! { "Type" => "Catalog", "Pages" => PAGES_ID };
        self.write_object(CATALOG_ID, &catalog.into())?;

        let xref_start = self.offset;
        self.xref.size = self.next_id;
        let trailer = dictionary! {
            "Size" => i64::from(self.xref.size),
            "Root" => CATALOG_ID,
        };
        let mut tail = Vec::new();
        serialize::write_xref(&mut tail, &self.xref)?;
        tail.extend_from_slice(b"trailer\n");
        serialize::write_dictionary(&mut tail, &trailer)?;
        write!(tail, "\nstartxref\n{xref_start}\n%%EOF\n")?;
        self.write_bytes(&tail)?;
        self.sink.flush()?;

        debug!(
            pages = self.page_ids.len(),
            bytes = self.offset,
            "PDF document finished"
        );
        Ok(self.offset)
    }

    /// Releases the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn ensure_open(&self) -> Result<(), RenderError> {
        if self.finished {
            return Err(RenderError::Finished);
        }
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), RenderError> {
        self.emit_page()?;
        self.y = MARGIN;
        Ok(())
    }

    /// Writes the buffered content stream and its page object, then resets the
    /// page graphics state.
    fn emit_page(&mut self) -> Result<(), RenderError> {
        let page = std::mem::take(&mut self.page);
        let content_id = self.alloc_id();
        let page_id = self.alloc_id();

        let stream = Stream::new(dictionary! {}, page.content.encode()?);
        self.write_object(content_id, &Object::Stream(stream))?;

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => PAGES_ID,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                num(PAGE_WIDTH),
                num(PAGE_HEIGHT),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    Font::Helvetica.resource_name() => FONT_REGULAR_ID,
                    Font::HelveticaBold.resource_name() => FONT_BOLD_ID,
                },
            },
            "Contents" => content_id,
        };
        self.write_object(page_id, &page_dict.into())?;
        self.page_ids.push(page_id);
        self.sink.flush()?;
        Ok(())
    }

    fn alloc_id(&mut self) -> ObjectId {
        let id = (self.next_id, 0);
        self.next_id += 1;
        id
    }

    /// Records the object's offset in the xref table and writes it out.
    fn write_object(&mut self, id: ObjectId, object: &Object) -> Result<(), RenderError> {
        self.xref.insert(
            id.0,
            XrefEntry::Normal {
                offset: self.offset as u32,
                generation: id.1,
            },
        );
        let mut buf = Vec::new();
        writeln!(buf, "{} {} obj", id.0, id.1)?;
        serialize::write_object(&mut buf, object)?;
        buf.extend_from_slice(b"\nendobj\n");
        self.write_bytes(&buf)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), RenderError> {
        self.sink.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }
}

fn font_object(font: Font) -> Object {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_name(),
        "Encoding" => "WinAnsiEncoding",
    }
    .into()
}

/// A coordinate rounded to two decimals, written as an integer when whole.
fn num(value: f32) -> Object {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        Object::Integer(rounded as i64)
    } else {
        rounded.into()
    }
}

/// Maps text to WinAnsiEncoding bytes, `?` for chars it cannot represent.
pub(crate) fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        '\u{0000}'..='\u{007F}' | '\u{00A0}'..='\u{00FF}' => ch as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => b'?',
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Object serialization
// ────────────────────────────────────────────────────────────────────────────

/// Writes lopdf objects in PDF syntax. The sink is not `Seek`, so offsets are
/// tracked by the writer rather than taken from the stream position.
mod serialize {
    use std::io::{self, Write};

    use lopdf::xref::{Xref, XrefEntry};
    use lopdf::{Dictionary, Object, StringFormat};

    pub fn write_object(out: &mut Vec<u8>, object: &Object) -> io::Result<()> {
        match object {
            Object::Null => out.write_all(b"null"),
            Object::Boolean(b) => out.write_all(if *b { b"true" } else { b"false" }),
            Object::Integer(i) => write!(out, "{i}"),
            Object::Real(r) => write!(out, "{r}"),
            Object::Name(name) => {
                out.write_all(b"/")?;
                out.write_all(name)
            }
            Object::String(bytes, StringFormat::Literal) => {
                out.write_all(b"(")?;
                for &byte in bytes {
                    if matches!(byte, b'(' | b')' | b'\\') {
                        out.write_all(b"\\")?;
                    }
                    out.write_all(&[byte])?;
                }
                out.write_all(b")")
            }
            Object::String(bytes, StringFormat::Hexadecimal) => {
                out.write_all(b"<")?;
                for byte in bytes {
                    write!(out, "{byte:02X}")?;
                }
                out.write_all(b">")
            }
            Object::Array(items) => {
                out.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.write_all(b" ")?;
                    }
                    write_object(out, item)?;
                }
                out.write_all(b"]")
            }
            Object::Dictionary(dict) => write_dictionary(out, dict),
            Object::Stream(stream) => {
                let mut dict = stream.dict.clone();
                dict.set("Length", stream.content.len() as i64);
                write_dictionary(out, &dict)?;
                out.write_all(b"\nstream\n")?;
                out.write_all(&stream.content)?;
                out.write_all(b"\nendstream")
            }
            Object::Reference(id) => write!(out, "{} {} R", id.0, id.1),
        }
    }

    pub fn write_dictionary(out: &mut Vec<u8>, dict: &Dictionary) -> io::Result<()> {
        out.write_all(b"<<")?;
        for (key, value) in dict.iter() {
            out.write_all(b"/")?;
            out.write_all(key)?;
            out.write_all(b" ")?;
            write_object(out, value)?;
            out.write_all(b" ")?;
        }
        out.write_all(b">>")
    }

    /// One contiguous section covering ids `0..size`.
    pub fn write_xref(out: &mut Vec<u8>, xref: &Xref) -> io::Result<()> {
        writeln!(out, "xref\n0 {}", xref.size)?;
        writeln!(out, "0000000000 65535 f ")?;
        for id in 1..xref.size {
            match xref.entries.get(&id) {
                Some(XrefEntry::Normal { offset, generation }) => {
                    writeln!(out, "{offset:010} {generation:05} n ")?
                }
                _ => writeln!(out, "0000000000 65535 f ")?,
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Word wrapping
// ────────────────────────────────────────────────────────────────────────────

/// Breaks a paragraph of runs into lines no wider than `max_width`.
///
/// Break opportunities are whitespace and explicit newlines; whitespace at a
/// break is dropped. A word wider than the whole column is split between
/// characters. Adjacent pieces of the same run on one line are merged back
/// into a single run. Always returns at least one line.
pub(crate) fn wrap_runs(runs: &[TextRun], max_width: f32) -> Vec<Vec<TextRun>> {
    let mut lines: Vec<Vec<TextRun>> = Vec::new();
    let mut line: Vec<TextRun> = Vec::new();
    let mut line_width = 0.0_f32;
    // Whitespace seen since the last word, held back until the next word lands.
    let mut pending_space: Vec<TextRun> = Vec::new();
    // Pieces of the word currently being assembled (may span runs).
    let mut word: Vec<TextRun> = Vec::new();

    fn flush_word(
        word: &mut Vec<TextRun>,
        pending_space: &mut Vec<TextRun>,
        line: &mut Vec<TextRun>,
        line_width: &mut f32,
        lines: &mut Vec<Vec<TextRun>>,
        max_width: f32,
    ) {
        if word.is_empty() {
            return;
        }
        let space_width: f32 = pending_space.iter().map(TextRun::width).sum();
        let word_width: f32 = word.iter().map(TextRun::width).sum();

        if !line.is_empty() && *line_width + space_width + word_width > max_width {
            lines.push(std::mem::take(line));
            *line_width = 0.0;
            pending_space.clear();
        } else {
            *line_width += space_width;
            line.append(pending_space);
        }

        for piece in word.drain(..) {
            let width = piece.width();
            if *line_width + width <= max_width || (width <= max_width && line.is_empty()) {
                *line_width += width;
                line.push(piece);
                continue;
            }
            // Oversized word: fill the line character by character.
            let mut chunk = String::new();
            for ch in piece.text.chars() {
                let mut candidate = chunk.clone();
                candidate.push(ch);
                let candidate_width = piece.with_text(candidate.as_str()).width();
                let overflows = *line_width + candidate_width > max_width;
                if overflows && !(line.is_empty() && chunk.is_empty()) {
                    if !chunk.is_empty() {
                        line.push(piece.with_text(std::mem::take(&mut chunk)));
                    }
                    lines.push(std::mem::take(line));
                    *line_width = 0.0;
                    chunk.push(ch);
                } else {
                    chunk = candidate;
                }
            }
            if !chunk.is_empty() {
                let tail = piece.with_text(chunk);
                *line_width += tail.width();
                line.push(tail);
            }
        }
    }

    for run in runs {
        let mut piece = String::new();
        let mut piece_is_space = false;
        for ch in run.text.chars() {
            if ch == '\n' {
                if !piece.is_empty() {
                    if piece_is_space {
                        pending_space.push(run.with_text(std::mem::take(&mut piece)));
                    } else {
                        word.push(run.with_text(std::mem::take(&mut piece)));
                    }
                }
                flush_word(
                    &mut word,
                    &mut pending_space,
                    &mut line,
                    &mut line_width,
                    &mut lines,
                    max_width,
                );
                pending_space.clear();
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
                continue;
            }
            let is_space = ch.is_whitespace();
            if !piece.is_empty() && is_space != piece_is_space {
                if piece_is_space {
                    pending_space.push(run.with_text(std::mem::take(&mut piece)));
                } else {
                    word.push(run.with_text(std::mem::take(&mut piece)));
                }
            }
            if is_space && !word.is_empty() {
                flush_word(
                    &mut word,
                    &mut pending_space,
                    &mut line,
                    &mut line_width,
                    &mut lines,
                    max_width,
                );
            }
            piece_is_space = is_space;
            piece.push(ch);
        }
        if !piece.is_empty() {
            if piece_is_space {
                if !word.is_empty() {
                    flush_word(
                        &mut word,
                        &mut pending_space,
                        &mut line,
                        &mut line_width,
                        &mut lines,
                        max_width,
                    );
                }
                pending_space.push(run.with_text(piece));
            } else {
                word.push(run.with_text(piece));
            }
        }
    }
    flush_word(
        &mut word,
        &mut pending_space,
        &mut line,
        &mut line_width,
        &mut lines,
        max_width,
    );
    lines.push(line);

    lines.into_iter().map(merge_adjacent).collect()
}

/// Joins neighbouring pieces that share a style.
fn merge_adjacent(line: Vec<TextRun>) -> Vec<TextRun> {
    let mut merged: Vec<TextRun> = Vec::with_capacity(line.len());
    for piece in line {
        match merged.last_mut() {
            Some(prev)
                if prev.font == piece.font
                    && prev.size == piece.size
                    && prev.color == piece.color
                    && prev.underline == piece.underline =>
            {
                prev.text.push_str(&piece.text);
            }
            _ => merged.push(piece),
        }
    }
    merged
}


// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
