//! xlsx rendering of project records

use crate::config::SheetConfig;
use crate::error::SheetError;
use crate::layout::{
    cell_text, column_widths, headers, DATA_ROW_HEIGHT, HEADER_FILL, HEADER_ROW_HEIGHT,
    SHEET_NAME,
};
use mailsheet_domain::ProjectRecord;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A rendered workbook
///
/// `bytes` is the exact content written to `path`. Delivery uses the bytes,
/// so a later render to the same path cannot change what an earlier event
/// sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSheet {
    /// Where the file was written
    pub path: PathBuf,
    /// Number of data rows (header excluded)
    pub rows: usize,
    /// Workbook content
    pub bytes: Vec<u8>,
}

impl RenderedSheet {
    /// File name component of the path, used as the upload name
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output.xlsx".to_string())
    }
}

/// Renders records into the fixed one-sheet layout
#[derive(Debug, Clone, Default)]
pub struct SheetRenderer {
    config: SheetConfig,
}

impl SheetRenderer {
    /// Create a renderer
    pub fn new(config: SheetConfig) -> Self {
        Self { config }
    }

    /// Render to the configured output path, replacing it
    pub fn render(&self, records: &[ProjectRecord]) -> Result<RenderedSheet, SheetError> {
        self.render_to(records, &self.config.output_path)
    }

    /// Render to an explicit path, replacing it
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// readers never observe a partly written workbook.
    pub fn render_to(
        &self,
        records: &[ProjectRecord],
        path: &Path,
    ) -> Result<RenderedSheet, SheetError> {
        let bytes = self.render_to_buffer(records)?;
        replace_file(path, &bytes)?;

        info!("Wrote {} rows to {}", records.len(), path.display());
        Ok(RenderedSheet {
            path: path.to_path_buf(),
            rows: records.len(),
            bytes,
        })
    }

    /// Render to an in-memory xlsx file
    pub fn render_to_buffer(&self, records: &[ProjectRecord]) -> Result<Vec<u8>, SheetError> {
        let mut workbook = build_workbook(records)?;
        Ok(workbook.save_to_buffer()?)
    }
}

fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), SheetError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn build_workbook(records: &[ProjectRecord]) -> Result<Workbook, SheetError> {
    let rows: Vec<[&str; 7]> = records
        .iter()
        .map(|r| r.display_values().map(cell_text))
        .collect();
    let widths = column_widths(&rows);

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let cell_format = Format::new().set_text_wrap().set_align(FormatAlign::Top);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    sheet.set_row_height(0, HEADER_ROW_HEIGHT)?;

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            sheet.write_string_with_format(row_num, col as u16, *value, &cell_format)?;
        }
        sheet.set_row_height(row_num, DATA_ROW_HEIGHT)?;
    }

    sheet.autofilter(0, 0, rows.len() as u32, headers().len() as u16 - 1)?;
    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, *width as f64)?;
    }

    debug!("Built sheet '{}' with widths {:?}", SHEET_NAME, widths);
    Ok(workbook)
}
