//! Static font-metric tables for the two built-in PDF fonts.
//!
//! Widths are the Adobe AFM advance widths in thousandths of an em, so a string
//! set at `size` points measures `sum(widths) * size / 1000`. The fonts are never
//! embedded: every conforming PDF reader ships Helvetica, so these tables only
//! drive word wrapping and underline length.
//!
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font enum
// ────────────────────────────────────────────────────────────────────────────

/// The standard-14 fonts used by the resume templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// PostScript base font name written into the font dictionary.
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used by `Tf` inside content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Vertical metrics
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica ascender in font units. Both weights share it.
pub const ASCENDER: f32 = 718.0;
/// Helvetica descender in font units (negative, below the baseline).
pub const DESCENDER: f32 = -207.0;
/// Gap between the font bounding box height and ascender-descender.
pub const LINE_GAP: f32 = 231.0;

/// Distance between consecutive baselines for text set at `size` points.
pub fn line_height(size: f32) -> f32 {
    (ASCENDER - DESCENDER + LINE_GAP) / 1000.0 * size
}

/// Distance from the top of a line box to its baseline.
pub fn ascent(size: f32) -> f32 {
    ASCENDER / 1000.0 * size
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one font.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in 1/1000 em.
pub struct FontMetricTable {
    widths: [u16; 95],
    /// Fallback width for characters outside printable ASCII.
    pub average_char_width: u16,
}

impl FontMetricTable {
    /// Measures a string in points at the given font size.
    pub fn measure_str(&self, s: &str, size: f32) -> f32 {
        let units: u32 = s
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    u32::from(self.widths[code - 32])
                } else {
                    u32::from(self.average_char_width)
                }
            })
            .sum();
        units as f32 * size / 1000.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0   1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :   ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N   O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [   \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {   |    }    ~
        334, 260, 334, 584,
    ],
    average_char_width: 556,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0   1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :   ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N   O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [   \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {   |    }    ~
        389, 280, 389, 584,
    ],
    average_char_width: 611,
};

/// Returns the static metric table for a font.
pub fn get_metrics(font: Font) -> &'static FontMetricTable {
    match font {
        Font::Helvetica => &HELVETICA_TABLE,
        Font::HelveticaBold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
