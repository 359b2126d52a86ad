//! services/api/src/adapters/xlsx_export.rs
//!
//! Styled spreadsheet export. Implements the `TestCaseExporter` port with
//! `rust_xlsxwriter`: one "Test Cases" sheet, a shaded bold header, thin
//! borders on every populated cell, and a color-coded priority column.

use crate::adapters::csv_export::{export_row, EXPORT_HEADERS};
use qa_testgen_core::{
    domain::{PriorityLevel, TestCase},
    ports::{PortError, PortResult, TestCaseExporter},
};
use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, XlsxError,
};

const SHEET_NAME: &str = "Test Cases";
const COLUMN_WIDTHS: [f64; 6] = [15.0, 40.0, 50.0, 40.0, 12.0, 12.0];
const PRIORITY_COLUMN: u16 = 4;
const HEADER_FILL: u32 = 0xE0E0E0;

/// Fill and font colors (RGB) of a priority cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityPalette {
    pub fill: u32,
    pub font: u32,
}

pub fn priority_palette(priority: &str) -> PriorityPalette {
    match PriorityLevel::classify(priority) {
        PriorityLevel::High => PriorityPalette {
            fill: 0xFF0000,
            font: 0xFFFFFF,
        },
        PriorityLevel::Medium => PriorityPalette {
            fill: 0xFFFF00,
            font: 0x000000,
        },
        PriorityLevel::Low => PriorityPalette {
            fill: 0x00FF00,
            font: 0x000000,
        },
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxExporter;

impl XlsxExporter {
    pub fn new() -> Self {
        Self
    }

    fn build_workbook(test_cases: &[TestCase]) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        // A pinned creation time keeps the output byte-for-byte reproducible.
        let created = ExcelDateTime::from_ymd(2024, 1, 1)?;
        workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

        let header_format = Format::new()
            .set_bold()
            .set_font_size(12)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);
        let cell_format = Format::new()
            .set_text_wrap()
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin);

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }
        for (col, header) in EXPORT_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (index, tc) in test_cases.iter().enumerate() {
            let row = index as u32 + 1;
            for (col, value) in export_row(tc).iter().enumerate() {
                let col = col as u16;
                if col == PRIORITY_COLUMN {
                    let palette = priority_palette(value);
                    let priority_format = Format::new()
                        .set_bold()
                        .set_font_color(Color::RGB(palette.font))
                        .set_background_color(Color::RGB(palette.fill))
                        .set_align(FormatAlign::Center)
                        .set_align(FormatAlign::VerticalCenter)
                        .set_border(FormatBorder::Thin);
                    worksheet.write_string_with_format(row, col, *value, &priority_format)?;
                } else {
                    worksheet.write_string_with_format(row, col, *value, &cell_format)?;
                }
            }
        }

        workbook.save_to_buffer()
    }
}

impl TestCaseExporter for XlsxExporter {
    fn file_name(&self) -> &'static str {
        "test_cases.xlsx"
    }

    fn content_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn encode(&self, test_cases: &[TestCase]) -> PortResult<Vec<u8>> {
        Self::build_workbook(test_cases)
            .map_err(|e| PortError::Unexpected(format!("Failed to build spreadsheet: {}", e)))
    }
}
