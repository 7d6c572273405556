//! Classic template: plain single-colour layout, headings by size only.

use std::io::Write;

use crate::models::resume::ResumeRecord;
use crate::render::style::TextRun;
use crate::render::writer::PdfWriter;
use crate::render::{text_or_empty, RenderError, ResumeLayout};

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

pub struct ClassicLayout;

fn heading<W: Write>(doc: &mut PdfWriter<W>, title: &str) -> Result<(), RenderError> {
    doc.text(&[TextRun::plain(title, HEADING_SIZE)])
}

fn body<W: Write>(doc: &mut PdfWriter<W>, text: impl Into<String>) -> Result<(), RenderError> {
    doc.text(&[TextRun::plain(text, BODY_SIZE)])
}

impl ResumeLayout for ClassicLayout {
    fn header<W: Write>(
        &self,
        doc: &mut PdfWriter<W>,
        record: &ResumeRecord,
    ) -> Result<(), RenderError> {
        doc.text(&[TextRun::plain(record.name.as_str(), TITLE_SIZE).underlined()])?;
        doc.move_down(1.0)?;
        body(doc, format!("Email: {}", text_or_empty(&record.email)))?;
        body(doc, format!("Phone: {}", text_or_empty(&record.phone)))?;
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
            body(
                doc,
                format!(
                    "{} at {} ({})",
                    text_or_empty(&edu.degree),
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
            body(
                doc,
                format!(
                    "{} at {} ({})",
                    text_or_empty(&exp.role),
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
