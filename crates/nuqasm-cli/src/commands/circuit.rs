//! Circuit command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use nuqasm::{TranslationUnit, Translator, emit_qasm2, materialize};
use nuqasm_ir::Circuit;
use serde_json::json;

use super::common::{SourceArgs, unit_name, write_output};

/// Execute the circuit command.
pub fn execute(input: &Path, source: &SourceArgs, output: Option<&Path>, summary: bool) -> Result<()> {
    eprintln!(
        "{} Building circuit from {}",
        style("→").cyan().bold(),
        style(input.display()).green()
    );

    let unit = load_unit(input, source)?;
    let mut circuit = Circuit::new(unit.name());
    let counts = materialize(&unit, &mut circuit)?;
    eprintln!(
        "  {} registers, {} ops ({} gate calls expanded)",
        counts.registers, counts.ops, counts.gate_calls
    );

    let content = if summary {
        serde_json::to_string_pretty(&describe(&circuit))?
    } else {
        emit_qasm2(&circuit)
    };
    write_output(output, &content)?;
    eprintln!("{} Circuit complete", style("✓").green().bold());
    Ok(())
}

/// A saved unit for `.json` input, otherwise a fresh translation.
fn load_unit(input: &Path, source: &SourceArgs) -> Result<TranslationUnit> {
    let is_json = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let text = fs::read_to_string(input)
            .with_context(|| format!("Failed to read file: {}", input.display()))?;
        return Ok(TranslationUnit::from_json(&text)?);
    }

    let options = source.options()?.with_name(unit_name(input));
    Ok(Translator::new(options).translate_file(input)?)
}

fn describe(circuit: &Circuit) -> serde_json::Value {
    let registers: Vec<_> = circuit
        .registers()
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "kind": r.kind,
                "size": r.size,
            })
        })
        .collect();

    json!({
        "name": circuit.name(),
        "num_qubits": circuit.num_qubits(),
        "num_clbits": circuit.num_clbits(),
        "num_ops": circuit.num_ops(),
        "registers": registers,
        "counts": circuit.count_ops(),
    })
}
