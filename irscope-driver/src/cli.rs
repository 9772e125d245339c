use clap::{Parser, Subcommand, ValueEnum};
use irscope_inspect::{OptimizationLevel, ReportFormat};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "irscope",
    about = "Diagnostic inspector for IR modules",
    long_about = "irscope - IR module inspector\n\nWalks every function, basic block and instruction of a module, classifies each instruction and writes a structural report.",
    version
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect a module stored as JSON
    Inspect {
        /// Module file
        #[arg(value_name = "MODULE.json")]
        input: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: FormatArg,

        /// Write the report to a file instead of stderr
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the module's data layout string
        #[arg(long, value_name = "STR")]
        data_layout: Option<String>,

        /// Optimization level of the pipeline the inspector is inserted into
        #[arg(short = 'O', long = "opt-level", value_enum, default_value = "0")]
        opt_level: OptLevelArg,
    },

    /// Inspect one of the built-in modules
    Demo {
        /// Built-in module name
        #[arg(default_value = "scenario")]
        name: String,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: FormatArg,

        /// Write the report to a file instead of stderr
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a built-in module as JSON
    Dump {
        name: String,
    },

    /// Print a module in textual IR form
    Print {
        #[arg(value_name = "MODULE.json")]
        input: PathBuf,
    },

    /// Show the plugin descriptor
    Plugin,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl FormatArg {
    pub fn to_format(&self) -> ReportFormat {
        match self {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OptLevelArg {
    #[value(name = "0")]
    O0,
    #[value(name = "1")]
    O1,
    #[value(name = "2")]
    O2,
    #[value(name = "3")]
    O3,
    #[value(name = "s")]
    Os,
    #[value(name = "z")]
    Oz,
}

impl OptLevelArg {
    pub fn to_level(&self) -> OptimizationLevel {
        match self {
            OptLevelArg::O0 => OptimizationLevel::O0,
            OptLevelArg::O1 => OptimizationLevel::O1,
            OptLevelArg::O2 => OptimizationLevel::O2,
            OptLevelArg::O3 => OptimizationLevel::O3,
            OptLevelArg::Os => OptimizationLevel::Os,
            OptLevelArg::Oz => OptimizationLevel::Oz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_inspect() {
        let cli = Cli::parse_from([
            "irscope", "inspect", "m.json", "--format", "json", "-O", "2", "--data-layout", "e-p:32:32",
        ]);
        match cli.command {
            Command::Inspect { input, format, output, data_layout, opt_level } => {
                assert_eq!(input, PathBuf::from("m.json"));
                assert_eq!(format.to_format(), ReportFormat::Json);
                assert!(output.is_none());
                assert_eq!(data_layout.as_deref(), Some("e-p:32:32"));
                assert_eq!(opt_level.to_level(), OptimizationLevel::O2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_demo_defaults() {
        let cli = Cli::parse_from(["irscope", "-v", "demo"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Demo { ref name, .. } if name == "scenario"));
    }
}
