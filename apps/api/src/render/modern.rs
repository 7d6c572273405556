//! Modern template: brand-coloured header band, coloured underlined headings,
//! bold lead-ins on education and experience lines.

use std::io::Write;

use crate::models::resume::ResumeRecord;
use crate::render::style::{Color, TextRun};
use crate::render::writer::{PdfWriter, PAGE_WIDTH};
use crate::render::{text_or_empty, RenderError, ResumeLayout};

/// Indigo `#4F46E5`.
pub const BRAND_COLOR: Color = Color::rgb(0x4F, 0x46, 0xE5);

const BAND_HEIGHT: f32 = 80.0;
const HEADER_X: f32 = 40.0;
const NAME_Y: f32 = 30.0;
const CONTACT_Y: f32 = 55.0;

const NAME_SIZE: f32 = 24.0;
const HEADING_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

pub struct ModernLayout;

fn heading<W: Write>(doc: &mut PdfWriter<W>, title: &str) -> Result<(), RenderError> {
    doc.text(&[TextRun::plain(title, HEADING_SIZE)
        .color(BRAND_COLOR)
        .underlined()])
}

fn body<W: Write>(doc: &mut PdfWriter<W>, text: impl Into<String>) -> Result<(), RenderError> {
    doc.text(&[TextRun::plain(text, BODY_SIZE)])
}

/// A bold lead-in followed on the same line by regular text.
fn lead_in<W: Write>(
    doc: &mut PdfWriter<W>,
    lead: &str,
    rest: String,
) -> Result<(), RenderError> {
    doc.text(&[
        TextRun::plain(lead, BODY_SIZE).bold(),
        TextRun::plain(rest, BODY_SIZE),
    ])
}

impl ResumeLayout for ModernLayout {
    fn header<W: Write>(
        &self,
        doc: &mut PdfWriter<W>,
        record: &ResumeRecord,
    ) -> Result<(), RenderError> {
        doc.fill_rect(0.0, 0.0, PAGE_WIDTH, BAND_HEIGHT, BRAND_COLOR)?;
        doc.text_at(
            HEADER_X,
            NAME_Y,
            &TextRun::plain(record.name.as_str(), NAME_SIZE)
                .bold()
                .color(Color::WHITE),
        )?;
        let contact = format!(
            "Email: {} | Phone: {}",
            text_or_empty(&record.email),
            text_or_empty(&record.phone)
        );
        doc.text_at(
            HEADER_X,
            CONTACT_Y,
            &TextRun::plain(contact, BODY_SIZE).color(Color::WHITE),
        )?;
        doc.move_down(2.0)?;
        doc.move_down(1.0)
    }

    fn summary<W: Write>(
        &self,
        doc: &mut PdfWriter<W>,
        record: &ResumeRecord,
    ) -> Result<(), RenderError> {
        heading(doc, "Summary")?;
        body(doc, text_or_empty(&record.summary))?;
        doc.move_down(1.0)
    }

    fn education<W: Write>(
        &self,
        doc: &mut PdfWriter<W>,
        record: &ResumeRecord,
    ) -> Result<(), RenderError> {
        heading(doc, "Education")?;
        for edu in &record.education {
            lead_in(
                doc,
                text_or_empty(&edu.degree),
                format!(
                    " at {} ({})",
                    text_or_empty(&edu.school),
                    text_or_empty(&edu.year)
                ),
            )?;
        }
        doc.move_down(1.0)
    }

    fn experience<W: Write>(
        &self,
        doc: &mut PdfWriter<W>,
        record: &ResumeRecord,
    ) -> Result<(), RenderError> {
        heading(doc, "Experience")?;
        for exp in &record.experience {
            lead_in(
                doc,
                text_or_empty(&exp.role),
                format!(
                    " at {} ({})",
                    text_or_empty(&exp.company),
                    text_or_empty(&exp.duration)
                ),
            )?;
            body(doc, text_or_empty(&exp.description))?;
            doc.move_down(1.0)?;
        }
        Ok(())
    }

    fn skills<W: Write>(
        &self,
        doc: &mut PdfWriter<W>,
        record: &ResumeRecord,
    ) -> Result<(), RenderError> {
        heading(doc, "Skills")?;
        body(doc, record.skills.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::font_metrics::line_height;
    use crate::render::tests::{is_op, jane_doe, operations, text_index};

    #[test]
    fn test_header_moves_column_into_band_inset() {
        let mut doc = PdfWriter::new(Vec::new()).unwrap();
        ModernLayout.header(&mut doc, &jane_doe()).unwrap();
        let (x, y) = doc.cursor();
        assert_eq!(x, HEADER_X);
        let expected = CONTACT_Y + 4.0 * line_height(BODY_SIZE);
        assert!((y - expected).abs() < 1e-3, "cursor at {y}, expected {expected}");
        assert!(y > BAND_HEIGHT, "body must start below the band");
    }

    #[test]
    fn test_header_text_is_white() {
        let mut doc = PdfWriter::new(Vec::new()).unwrap();
        ModernLayout.header(&mut doc, &jane_doe()).unwrap();
        doc.finish().unwrap();
        let ops = operations(&doc.into_inner());
        let white = ops
            .iter()
            .position(|op| is_op(op, "rg", &Color::WHITE.components()))
            .unwrap();
        let name = text_index(&ops, "Jane Doe").unwrap();
        assert!(white < name);
    }

    #[test]
    fn test_body_returns_to_black_after_heading() {
        let mut doc = PdfWriter::new(Vec::new()).unwrap();
        ModernLayout.summary(&mut doc, &jane_doe()).unwrap();
        ModernLayout.skills(&mut doc, &jane_doe()).unwrap();
        doc.finish().unwrap();
        let ops = operations(&doc.into_inner());
        let heading = text_index(&ops, "Skills").unwrap();
        let skills = text_index(&ops, "Go").unwrap();
        let black = ops[heading..]
            .iter()
            .position(|op| is_op(op, "rg", &Color::BLACK.components()))
            .unwrap()
            + heading;
        assert!(black < skills);
    }
}
