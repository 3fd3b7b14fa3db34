//! List rules command implementation.

use contract_lint::rules::all_rules;
use contract_lint::TransformKind;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<10} {:<22} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for rule in all_rules() {
        println!(
            "{:<10} {:<22} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }
    println!("{:<10} {:<22} {}", "CL000", "parse-error", "File could not be parsed");

    println!("\nPresets:");
    println!("  recommended  - CL001-CL006 (default)");
    println!("  strict       - All rules, including vague-naming");
    println!("  minimal      - CL001 without literal defaults, CL002, CL005");

    println!("\nTransformation kinds:");
    for kind in TransformKind::ALL {
        println!("  {kind}");
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  contract-lint scan --rules forbidden-import,missing-marker");
    println!("  contract-lint scan --rules CL001,CL002");
}
