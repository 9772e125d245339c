//! Pass Plugin Adapter
//!
//! The inspector is installed into a pass pipeline the way an optimizer
//! plugin would be: a [`PluginInfo`] descriptor carries a name, a version
//! and a registration callback, and the callback asks the
//! [`PassBuilder`] to insert the pass at the start of every module
//! pipeline it builds.

use irscope_common::IrError;
use irscope_ir::Module;
use log::debug;
use std::fmt;
use std::io::{self, Write};

use crate::pass::{InspectorPass, ReportOptions};

pub const PLUGIN_API_VERSION: u32 = 1;
pub const PLUGIN_NAME: &str = "IR Inspector Pass";
pub const PLUGIN_VERSION: &str = "v2.0";

/// Which analyses survive a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreservedAnalyses {
    All,
    None,
}

impl PreservedAnalyses {
    /// Analyses preserved by running both passes
    pub fn intersect(self, other: PreservedAnalyses) -> PreservedAnalyses {
        match (self, other) {
            (PreservedAnalyses::All, PreservedAnalyses::All) => PreservedAnalyses::All,
            _ => PreservedAnalyses::None,
        }
    }

    pub fn are_all_preserved(&self) -> bool {
        *self == PreservedAnalyses::All
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptimizationLevel {
    #[default]
    O0,
    O1,
    O2,
    O3,
    Os,
    Oz,
}

/// A pass over a whole module. Passes write diagnostics to the stream
/// they are given; only failures of that stream are errors.
pub trait ModulePass {
    fn name(&self) -> &'static str;

    fn run(&mut self, module: &Module, diagnostics: &mut dyn Write) -> io::Result<PreservedAnalyses>;
}

/// Ordered list of module passes
#[derive(Default)]
pub struct ModulePassManager {
    passes: Vec<Box<dyn ModulePass>>,
}

impl ModulePassManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pass<P: ModulePass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Run every pass in order
    pub fn run(&mut self, module: &Module, diagnostics: &mut dyn Write) -> io::Result<PreservedAnalyses> {
        let mut preserved = PreservedAnalyses::All;
        for pass in &mut self.passes {
            debug!("Running pass '{}' on module '{}'", pass.name(), module.name);
            preserved = preserved.intersect(pass.run(module, diagnostics)?);
        }
        Ok(preserved)
    }
}

type PipelineStartCallback = Box<dyn Fn(&mut ModulePassManager, OptimizationLevel)>;

/// Builds module pipelines and holds the extension point callbacks
/// registered by plugins
#[derive(Default)]
pub struct PassBuilder {
    pipeline_start: Vec<PipelineStartCallback>,
}

impl PassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` at the start of every module pipeline
    pub fn register_pipeline_start_callback(
        &mut self,
        callback: impl Fn(&mut ModulePassManager, OptimizationLevel) + 'static,
    ) {
        self.pipeline_start.push(Box::new(callback));
    }

    /// Install a plugin, checking it was built against this API version
    pub fn load_plugin(&mut self, plugin: &PluginInfo, options: &ReportOptions) -> Result<(), IrError> {
        if plugin.api_version != PLUGIN_API_VERSION {
            return Err(IrError::Plugin {
                message: format!(
                    "'{}' targets plugin API {}, expected {}",
                    plugin.name, plugin.api_version, PLUGIN_API_VERSION
                ),
            });
        }
        debug!("Loading plugin '{}' {}", plugin.name, plugin.version);
        (plugin.register)(self, options);
        Ok(())
    }

    pub fn build_module_pipeline(&self, level: OptimizationLevel) -> ModulePassManager {
        let mut manager = ModulePassManager::new();
        for callback in &self.pipeline_start {
            callback(&mut manager, level);
        }
        manager
    }
}

/// Plugin descriptor handed to the host
#[derive(Clone, Copy)]
pub struct PluginInfo {
    pub api_version: u32,
    pub name: &'static str,
    pub version: &'static str,
    pub register: fn(&mut PassBuilder, &ReportOptions),
}

impl fmt::Debug for PluginInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInfo")
            .field("api_version", &self.api_version)
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PluginInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (plugin API {})", self.name, self.version, self.api_version)
    }
}

/// Descriptor of the inspector plugin
pub fn plugin_info() -> PluginInfo {
    PluginInfo {
        api_version: PLUGIN_API_VERSION,
        name: PLUGIN_NAME,
        version: PLUGIN_VERSION,
        register: register_inspector,
    }
}

fn register_inspector(builder: &mut PassBuilder, options: &ReportOptions) {
    let options = options.clone();
    builder.register_pipeline_start_callback(move |manager, _level| {
        manager.add_pass(InspectorPass::new(options.clone()));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    impl ModulePass for Marker {
        fn name(&self) -> &'static str {
            "marker"
        }

        fn run(&mut self, _module: &Module, _diagnostics: &mut dyn Write) -> io::Result<PreservedAnalyses> {
            Ok(PreservedAnalyses::None)
        }
    }

    #[test]
    fn test_preserved_intersection() {
        assert_eq!(PreservedAnalyses::All.intersect(PreservedAnalyses::All), PreservedAnalyses::All);
        assert_eq!(PreservedAnalyses::All.intersect(PreservedAnalyses::None), PreservedAnalyses::None);
        assert!(!PreservedAnalyses::None.are_all_preserved());
    }

    #[test]
    fn test_plugin_inserts_one_pass_per_pipeline() {
        let mut builder = PassBuilder::new();
        builder.load_plugin(&plugin_info(), &ReportOptions::default()).unwrap();

        for level in [OptimizationLevel::O0, OptimizationLevel::O2, OptimizationLevel::Oz] {
            let manager = builder.build_module_pipeline(level);
            assert_eq!(manager.pass_names(), vec![InspectorPass::NAME]);
        }
    }

    #[test]
    fn test_plugin_api_mismatch_is_rejected() {
        let mut info = plugin_info();
        info.api_version = 99;
        let err = PassBuilder::new().load_plugin(&info, &ReportOptions::default()).unwrap_err();
        assert!(matches!(err, IrError::Plugin { .. }));
    }

    #[test]
    fn test_manager_intersects_results() {
        let mut manager = ModulePassManager::new();
        manager.add_pass(InspectorPass::default());
        manager.add_pass(Marker);
        let module = Module::new("m".to_string());
        let mut sink = Vec::new();
        let preserved = manager.run(&module, &mut sink).unwrap();
        assert_eq!(preserved, PreservedAnalyses::None);
        assert!(String::from_utf8(sink).unwrap().contains("📁 Module: m"));
    }

    #[test]
    fn test_descriptor_display() {
        assert_eq!(plugin_info().to_string(), "IR Inspector Pass v2.0 (plugin API 1)");
    }
}
