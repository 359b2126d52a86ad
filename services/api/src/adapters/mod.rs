pub mod completion_llm;
pub mod csv_export;
pub mod xlsx_export;

pub use completion_llm::OpenAiCompletionAdapter;
pub use csv_export::CsvExporter;
pub use xlsx_export::XlsxExporter;
