//! Fixed sheet layout

use mailsheet_domain::Field;

/// Worksheet name
pub const SHEET_NAME: &str = "SES案件一覧";

/// Header fill colour (light yellow)
pub const HEADER_FILL: u32 = 0xFFFACD;

/// Header row height in points
pub const HEADER_ROW_HEIGHT: f64 = 20.0;

/// Data row height in points
pub const DATA_ROW_HEIGHT: f64 = 60.0;

/// Added to the longest cell length when sizing a column
pub const WIDTH_PADDING: usize = 5;

/// Narrowest column width
pub const MIN_COLUMN_WIDTH: usize = 14;

/// Widest column width
pub const MAX_COLUMN_WIDTH: usize = 40;

/// Header labels in column order
pub fn headers() -> [&'static str; 7] {
    Field::ALL.map(|f| f.label())
}

/// Column widths for a header row plus data rows
///
/// Each width is the longest cell's character count plus padding, clamped
/// to `[MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH]`.
pub fn column_widths<S: AsRef<str>>(rows: &[[S; 7]]) -> [usize; 7] {
    let mut widths = headers().map(|h| h.chars().count());

    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.as_ref().chars().count());
        }
    }

    widths.map(|w| (w + WIDTH_PADDING).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH))
}

/// Longest string an xlsx cell accepts, in characters
pub const MAX_CELL_CHARS: usize = 32_767;

/// Cell text cut to [`MAX_CELL_CHARS`] on a character boundary
pub fn cell_text(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}
