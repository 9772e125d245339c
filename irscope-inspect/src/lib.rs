//! IR Inspector - Module Traversal and Instruction Classification
//! 
//! This crate walks a [`Module`] in program order (functions, then
//! blocks, then instructions), classifies every instruction into one
//! structural category and produces a [`ModuleReport`] that renders as a
//! human-readable text report or as JSON.
//! 
//! The walk is strictly read-only: nothing in the module is changed and
//! the pass always reports [`PreservedAnalyses::All`].
//! 
//! ## Architecture
//! 
//! - `classify` - Instruction categories and per-category fact extraction
//! - `report` - Module, function and block reporters
//! - `render` - Text report formatting
//! - `pass` - The inspector as a module pass
//! - `plugin` - Plugin descriptor and the pass pipeline it registers into

pub mod classify;
pub mod report;
pub mod render;
pub mod pass;
pub mod plugin;

pub use classify::{AllocationSize, Category, Classifier, ComparisonKind, InstructionFacts, ReturnValue};
pub use report::{
    BlockReport, FunctionKind, FunctionReport, InstructionReport, ModuleReport, ParamFact,
};
pub use pass::{InspectorPass, ReportFormat, ReportOptions};
pub use plugin::{
    plugin_info, ModulePass, ModulePassManager, OptimizationLevel, PassBuilder,
    PluginInfo, PreservedAnalyses,
};

use irscope_ir::Module;

/// Inspect a module and return its report
pub fn inspect_module(module: &Module) -> ModuleReport {
    report::report_module(module)
}

/// Inspect a module and render the text report
pub fn render_text(module: &Module) -> String {
    inspect_module(module).to_string()
}

/// Inspect a module and render the report as pretty-printed JSON
pub fn render_json(module: &Module) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&inspect_module(module))
}
