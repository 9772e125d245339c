use anyhow::{Context, Result};
use irscope_inspect::{
    plugin_info, OptimizationLevel, PassBuilder, PreservedAnalyses, ReportFormat, ReportOptions,
};
use irscope_ir::{DataLayout, Module};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::cli::{Cli, Command};
use crate::demos;

/// Execute a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Inspect { input, format, output, data_layout, opt_level } => {
            let mut module = load_module(&input)?;
            if let Some(spec) = data_layout {
                module.data_layout = DataLayout::parse(&spec).context("Invalid --data-layout")?;
            }
            inspect(&module, format.to_format(), opt_level.to_level(), output.as_deref())
        }

        Command::Demo { name, format, output } => {
            let module = demos::build(&name)?;
            inspect(&module, format.to_format(), OptimizationLevel::O0, output.as_deref())
        }

        Command::Dump { name } => {
            let module = demos::build(&name)?;
            println!("{}", module.to_json()?);
            Ok(())
        }

        Command::Print { input } => {
            let module = load_module(&input)?;
            print!("{module}");
            Ok(())
        }

        Command::Plugin => {
            let info = plugin_info();
            println!("Plugin:      {}", info.name);
            println!("Version:     {}", info.version);
            println!("API version: {}", info.api_version);
            println!("Inserted at: pipeline start (every optimization level)");
            Ok(())
        }
    }
}

/// Read a module from its JSON form
pub fn load_module(path: &Path) -> Result<Module> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let module = Module::from_json(&json)
        .with_context(|| format!("Failed to parse module {}", path.display()))?;
    debug!("Loaded module '{}' with {} functions", module.name, module.functions.len());
    Ok(module)
}

/// Build a pipeline with the inspector plugin loaded and run it over the
/// module, writing the report to `sink`
pub fn inspect_to(
    module: &Module,
    format: ReportFormat,
    level: OptimizationLevel,
    sink: &mut dyn Write,
) -> Result<PreservedAnalyses> {
    let mut builder = PassBuilder::new();
    builder.load_plugin(&plugin_info(), &ReportOptions { format })?;
    let mut pipeline = builder.build_module_pipeline(level);
    debug!("Pipeline at {:?}: {:?}", level, pipeline.pass_names());

    pipeline.run(module, sink).context("Failed to write report")
}

fn inspect(module: &Module, format: ReportFormat, level: OptimizationLevel, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            inspect_to(module, format, level, &mut writer)?;
            info!("Report written to {}", path.display());
        }
        None => {
            let stderr = io::stderr();
            let mut lock = stderr.lock();
            inspect_to(module, format, level, &mut lock)?;
        }
    }
    Ok(())
}
