//! CLI logic for the ZFL event-flow tool.
//!
//! Reads one `.zfl` file, runs the pipeline and writes the selected stage as
//! JSON. Source problems are reported after the output has been written.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Emit};
pub use config::{ConfigError, ConfigSource};

use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::Path,
};

use log::{info, warn};
use thiserror::Error;

use zfl::{FlowBuilder, ZflError, diagnostic::Diagnostic, write_json};

/// Errors returned by [`run`].
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Zfl(#[from] ZflError),

    #[error("{file}: {} error(s) found", count_errors(.diagnostics))]
    Diagnostics {
        file: String,
        src: String,
        diagnostics: Vec<Diagnostic>,
    },
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Zfl(ZflError::Io(err))
    }
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity().is_error())
        .count()
}

/// Run the ZFL CLI application
///
/// Processes the input file through the pipeline and writes the stage
/// selected by [`Args::emit`] to the output file, or to standard output.
///
/// # Errors
///
/// Returns [`CliError`] for:
/// - File I/O errors
/// - Configuration loading errors
/// - JSON serialization errors
/// - Error diagnostics in the source, after the output was written
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output.as_deref().unwrap_or("<stdout>"),
        emit:? = args.emit;
        "Processing flow"
    );

    let app_config = config::load(args.config.as_deref().map(Path::new), &args.input)?;
    let file_name = app_config.parse().file_name().to_string();

    let source = fs::read_to_string(&args.input)?;

    let builder = FlowBuilder::new(app_config);
    let raw = builder.parse(&source);
    let model = builder.analyze(&raw);

    match args.emit {
        Emit::Raw => write_output(args, &raw)?,
        Emit::Semantic => write_output(args, &model)?,
        Emit::Ir => write_output(args, &builder.transform(&model))?,
        Emit::View => write_output(args, &builder.layout(&builder.transform(&model)))?,
    }

    let diagnostics = model.diagnostics().to_vec();
    if model.has_errors() {
        return Err(CliError::Diagnostics {
            file: file_name,
            src: source,
            diagnostics,
        });
    }

    for diagnostic in &diagnostics {
        warn!("{}", error_adapter::render(diagnostic, &source));
    }

    info!(emit:? = args.emit; "Output written successfully");
    Ok(())
}

fn write_output<T: serde::Serialize>(args: &Args, value: &T) -> Result<(), ZflError> {
    match &args.output {
        Some(path) => write_json(value, BufWriter::new(File::create(path)?), args.pretty),
        None => write_json(value, io::stdout().lock(), args.pretty),
    }
}
