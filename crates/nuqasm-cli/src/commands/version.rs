//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - OpenQASM 2 translator and gate-macro expander",
        style("nuqasm").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  nuqasm-ir   Circuit registers, primitives and operations");
    println!("  nuqasm      Translation, gate expansion and materialization");
    println!("  nuqasm-cli  Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
