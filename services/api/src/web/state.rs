//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::{CsvExporter, XlsxExporter};
use crate::config::Config;
use qa_testgen_core::ports::{CompletionService, TestCaseExporter};
use qa_testgen_core::workflow::TestCaseWorkflow;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
/// Everything in it is immutable; requests never share mutable data.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub workflow: Arc<TestCaseWorkflow>,
    pub csv_exporter: Arc<dyn TestCaseExporter>,
    pub xlsx_exporter: Arc<dyn TestCaseExporter>,
}

impl AppState {
    /// Wires the workflow around the given completion service.
    pub fn new(config: Arc<Config>, completion: Arc<dyn CompletionService>) -> Self {
        let workflow = Arc::new(TestCaseWorkflow::new(
            completion,
            config.completion_settings(),
        ));
        Self {
            config,
            workflow,
            csv_exporter: Arc::new(CsvExporter::new()),
            xlsx_exporter: Arc::new(XlsxExporter::new()),
        }
    }
}
