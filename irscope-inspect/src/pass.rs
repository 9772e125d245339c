//! The inspector as a module pass

use irscope_ir::Module;
use log::info;
use std::io::{self, Write};

use crate::plugin::{ModulePass, PreservedAnalyses};
use crate::report::report_module;

/// Output form of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable banners and rails
    #[default]
    Text,
    /// Pretty-printed JSON of the same report
    Json,
}

/// Options for one inspector pass
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub format: ReportFormat,
}

/// Read-only pass that writes a report of the module to the diagnostic stream
#[derive(Debug, Clone, Default)]
pub struct InspectorPass {
    options: ReportOptions,
}

impl InspectorPass {
    pub const NAME: &'static str = "inspect";

    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }
}

impl ModulePass for InspectorPass {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&mut self, module: &Module, diagnostics: &mut dyn Write) -> io::Result<PreservedAnalyses> {
        let report = report_module(module);
        match self.options.format {
            ReportFormat::Text => write!(diagnostics, "{report}")?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *diagnostics, &report)?;
                writeln!(diagnostics)?;
            }
        }
        diagnostics.flush()?;
        info!("Inspector reported {} functions of '{}'", report.functions.len(), module.name);

        // Nothing was transformed
        Ok(PreservedAnalyses::All)
    }
}
