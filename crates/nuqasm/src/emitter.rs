//! OpenQASM 2.0 emitter for materialized circuits.

use std::fmt::Write as _;

use nuqasm_ir::{Circuit, Instruction, InstructionKind};

/// Emit a circuit as OpenQASM 2.0 source.
///
/// Gates are written with their qelib1 names, so the output includes
/// `qelib1.inc`. Register-wide operands are written as the bare register name.
pub fn emit_qasm2(circuit: &Circuit) -> String {
    let mut out = String::new();
    out.push_str("OPENQASM 2.0;\n");
    out.push_str("include \"qelib1.inc\";\n");

    for register in circuit.registers() {
        let _ = writeln!(
            out,
            "{} {}[{}];",
            register.kind.keyword(),
            register.name,
            register.size
        );
    }

    for instruction in circuit.instructions() {
        out.push_str(&emit_instruction(circuit, instruction));
        out.push('\n');
    }
    out
}

fn emit_instruction(circuit: &Circuit, instruction: &Instruction) -> String {
    let operands: Vec<String> = instruction
        .operands
        .iter()
        .map(|o| circuit.describe(o))
        .collect();

    let body = match &instruction.kind {
        InstructionKind::Gate(gate) => {
            let params = gate.parameters();
            if params.is_empty() {
                format!("{} {};", gate.name(), operands.join(","))
            } else {
                let params: Vec<String> = params.into_iter().map(format_param).collect();
                format!("{}({}) {};", gate.name(), params.join(","), operands.join(","))
            }
        }
        InstructionKind::Measure => format!("measure {};", operands.join(" -> ")),
        InstructionKind::Reset => format!("reset {};", operands.join(",")),
        InstructionKind::Barrier => format!("barrier {};", operands.join(",")),
    };

    match &instruction.condition {
        Some(condition) => format!("if({condition}) {body}"),
        None => body,
    }
}

/// Spell common multiples of pi symbolically.
fn format_param(value: f64) -> String {
    let pi = std::f64::consts::PI;
    for (ratio, text) in [
        (1.0, "pi"),
        (0.5, "pi/2"),
        (0.25, "pi/4"),
        (0.125, "pi/8"),
        (2.0, "2*pi"),
    ] {
        if (value - pi * ratio).abs() < 1e-10 {
            return text.to_string();
        }
        if (value + pi * ratio).abs() < 1e-10 {
            return format!("-{text}");
        }
    }
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuqasm_ir::{ClassicalCondition, Comparator, Operand, QubitId, RegisterId};
    use std::f64::consts::PI;

    #[test]
    fn test_emit_bell() {
        let mut circuit = Circuit::new("bell");
        let q = circuit.add_qreg("q", 2).unwrap();
        let c = circuit.add_creg("c", 2).unwrap();
        circuit
            .apply_gate("h", &[], &[Operand::Qubit(QubitId(0))], None)
            .unwrap();
        circuit
            .apply_gate(
                "cx",
                &[],
                &[Operand::Qubit(QubitId(0)), Operand::Qubit(QubitId(1))],
                None,
            )
            .unwrap();
        circuit
            .measure(Operand::Register(q), Operand::Register(c))
            .unwrap();

        let qasm = emit_qasm2(&circuit);
        assert_eq!(
            qasm,
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0],q[1];\nmeasure q -> c;\n"
        );
    }

    #[test]
    fn test_emit_params_and_conditions() {
        let mut circuit = Circuit::new("p");
        circuit.add_qreg("q", 1).unwrap();
        circuit.add_creg("c", 1).unwrap();
        circuit
            .apply_gate("rz", &[PI / 2.0], &[Operand::Qubit(QubitId(0))], None)
            .unwrap();
        circuit
            .apply_gate("rx", &[0.3], &[Operand::Qubit(QubitId(0))], None)
            .unwrap();
        let cond = ClassicalCondition::new("c", Comparator::Eq, "1");
        circuit
            .apply_gate("x", &[], &[Operand::Qubit(QubitId(0))], Some(cond))
            .unwrap();
        circuit.reset(Operand::Register(RegisterId(0)), None).unwrap();

        let qasm = emit_qasm2(&circuit);
        assert!(qasm.contains("rz(pi/2) q[0];"));
        assert!(qasm.contains("rx(0.3) q[0];"));
        assert!(qasm.contains("if(c==1) x q[0];"));
        assert!(qasm.contains("reset q;"));
    }

    #[test]
    fn test_format_param() {
        assert_eq!(format_param(PI), "pi");
        assert_eq!(format_param(-PI / 4.0), "-pi/4");
        assert_eq!(format_param(0.0), "0");
        assert_eq!(format_param(1.5), "1.5");
    }
}
