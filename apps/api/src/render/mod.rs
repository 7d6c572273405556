//! Document renderer: turns a resume record into a paginated PDF.
//!
//! A render pass is a single top-to-bottom traversal
//! `Header → Summary → Education → Experience → Skills`, driven here and
//! delegated section by section to a `ResumeLayout` implementation. The pass
//! owns its own `PdfWriter`, so renders share no state and may run in parallel.

pub mod classic;
pub mod font_metrics;
pub mod modern;
pub mod style;
pub mod writer;

use std::io::Write;

use thiserror::Error;
use tracing::debug;

use crate::models::resume::ResumeRecord;
use crate::render::classic::ClassicLayout;
use crate::render::modern::ModernLayout;
use crate::render::writer::PdfWriter;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("output sink failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("content stream encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("document writer used after finish")]
    Finished,
}

/// The two fixed visual layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    #[default]
    Classic,
    Modern,
}

impl Template {
    /// Exactly `"modern"` selects Modern. Every other value, including
    /// `"Modern"`, an empty string, or no value at all, selects Classic.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("modern") => Template::Modern,
            _ => Template::Classic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Modern => "modern",
        }
    }
}

/// One template's rendering of each resume section.
///
/// Implementations draw through the writer's cursor only; the driver decides
/// section order and finalizes the document.
pub trait ResumeLayout {
    fn header<W: Write>(&self, doc: &mut PdfWriter<W>, record: &ResumeRecord)
        -> Result<(), RenderError>;

    fn summary<W: Write>(
        &self,
        doc: &mut PdfWriter<W>,
        record: &ResumeRecord,
    ) -> Result<(), RenderError>;

    fn education<W: Write>(
        &self,
        doc: &mut PdfWriter<W>,
        record: &ResumeRecord,
    ) -> Result<(), RenderError>;

    fn experience<W: Write>(
        &self,
        doc: &mut PdfWriter<W>,
        record: &ResumeRecord,
    ) -> Result<(), RenderError>;

    fn skills<W: Write>(&self, doc: &mut PdfWriter<W>, record: &ResumeRecord)
        -> Result<(), RenderError>;
}

/// Renders `record` with `template` into `sink`, returning the sink once the
/// document is complete. Pages reach the sink as soon as they are laid out.
pub fn render<W: Write>(
    record: &ResumeRecord,
    template: Template,
    sink: W,
) -> Result<W, RenderError> {
    let mut doc = PdfWriter::new(sink)?;
    match template {
        Template::Classic => run_pass(&ClassicLayout, &mut doc, record)?,
        Template::Modern => run_pass(&ModernLayout, &mut doc, record)?,
    }
    let pages = doc.page_count();
    let bytes = doc.finish()?;
    debug!(
        resume_id = %record.id,
        template = template.as_str(),
        pages,
        bytes,
        "resume rendered"
    );
    Ok(doc.into_inner())
}

/// Convenience wrapper collecting the whole document in memory.
pub fn render_to_vec(record: &ResumeRecord, template: Template) -> Result<Vec<u8>, RenderError> {
    render(record, template, Vec::new())
}

fn run_pass<L: ResumeLayout, W: Write>(
    layout: &L,
    doc: &mut PdfWriter<W>,
    record: &ResumeRecord,
) -> Result<(), RenderError> {
    layout.header(doc, record)?;
    layout.summary(doc, record)?;
    layout.education(doc, record)?;
    layout.experience(doc, record)?;
    layout.skills(doc, record)
}

/// Missing optional text renders as the empty string.
pub(crate) fn text_or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
