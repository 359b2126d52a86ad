//! services/api/src/adapters/csv_export.rs
//!
//! Delimited-text export. Implements the `TestCaseExporter` port with the `csv`
//! crate: RFC 4180 quoting, CRLF line endings, a fixed header row.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use qa_testgen_core::{
    domain::TestCase,
    ports::{PortError, PortResult, TestCaseExporter},
};

/// Column order shared by every export format.
pub const EXPORT_HEADERS: [&str; 6] = [
    "Test Case ID",
    "Description",
    "Steps",
    "Expected Result",
    "Priority",
    "Status",
];

/// The visible columns of a test case, in `EXPORT_HEADERS` order.
pub fn export_row(tc: &TestCase) -> [&str; 6] {
    [
        tc.test_case_id.as_str(),
        tc.description.as_str(),
        tc.steps.as_str(),
        tc.expected_result.as_str(),
        tc.priority.as_str(),
        tc.status.as_str(),
    ]
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }
}

impl TestCaseExporter for CsvExporter {
    fn file_name(&self) -> &'static str {
        "test_cases.csv"
    }

    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn encode(&self, test_cases: &[TestCase]) -> PortResult<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .from_writer(Vec::new());

        writer
            .write_record(EXPORT_HEADERS)
            .map_err(|e| PortError::Unexpected(format!("Failed to write CSV header: {}", e)))?;
        for (index, tc) in test_cases.iter().enumerate() {
            writer.write_record(export_row(tc)).map_err(|e| {
                PortError::Unexpected(format!("Failed to write CSV row {}: {}", index + 1, e))
            })?;
        }

        writer
            .into_inner()
            .map_err(|e| PortError::Unexpected(format!("Failed to flush CSV output: {}", e)))
    }
}
