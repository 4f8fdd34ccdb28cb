//! Translate command implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;
use nuqasm::{TranslationUnit, Translator};

use super::common::{SourceArgs, unit_name, write_output};

#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Input files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Reject unknown statements instead of recording them
    #[arg(short = 'u', long = "unknown")]
    pub strict_unknown: bool,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Keep every file's raw lines in the unit
    #[arg(long)]
    pub retain_source: bool,

    /// Keep each element's normalized text
    #[arg(long)]
    pub retain_element_source: bool,

    /// Keep each gate definition's normalized text
    #[arg(long)]
    pub retain_gate_source: bool,

    /// Record a placeholder element where each gate definition starts
    #[arg(long = "show-gate-decls")]
    pub show_gate_decls: bool,

    /// Unit name (defaults to the file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}

/// Execute the translate command.
pub fn execute(args: &TranslateArgs) -> Result<()> {
    let base = args.source.options()?;
    let mut units = Vec::with_capacity(args.files.len());

    for file in &args.files {
        eprintln!(
            "{} Translating {}",
            style("→").cyan().bold(),
            style(file.display()).green()
        );

        let mut options = base
            .clone()
            .with_name(args.name.clone().unwrap_or_else(|| unit_name(file)));
        // Flags only switch behaviour on; the config file may already have.
        options.strict_unknown |= args.strict_unknown;
        options.retain_program_source |= args.retain_source;
        options.retain_element_source |= args.retain_element_source;
        options.retain_gate_source |= args.retain_gate_source;
        options.show_gate_declarations |= args.show_gate_decls;

        let unit = Translator::new(options).translate_file(file)?;
        eprintln!(
            "  {} elements, {} gates, {} file(s)",
            unit.code.len(),
            unit.gates.len(),
            unit.metadata.files.len()
        );
        units.push(unit);
    }

    let json = render(&units, args.compact)?;
    write_output(args.output.as_deref(), &json)?;
    eprintln!("{} Translation complete", style("✓").green().bold());
    Ok(())
}

/// One unit as an object, several as an array.
fn render(units: &[TranslationUnit], compact: bool) -> Result<String> {
    let json = match (units, compact) {
        ([unit], true) => unit.to_json()?,
        ([unit], false) => unit.to_json_pretty()?,
        (units, true) => serde_json::to_string(units)?,
        (units, false) => serde_json::to_string_pretty(units)?,
    };
    Ok(json)
}
