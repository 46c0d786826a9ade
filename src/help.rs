//! Help text generation from argument definitions.

use crate::definition::ArgumentDefinition;

/// Usage line: program name followed by each metalabel, optional ones in
/// `[...]` and required ones in `<...>`, in declaration order.
pub fn generate_usage(name: &str, definitions: &[ArgumentDefinition]) -> String {
    let mut usage = format!("Usage:\n\t{name}");
    for def in definitions {
        usage.push(' ');
        if def.is_optional() {
            usage.push_str(&format!("[{}]", def.metalabel()));
        } else {
            usage.push_str(&format!("<{}>", def.metalabel()));
        }
    }
    usage.push('\n');
    usage
}

/// Full help text: usage line, description, then one line per argument.
///
/// Metalabels must already be resolved.
pub fn generate_help(name: &str, description: &str, definitions: &[ArgumentDefinition]) -> String {
    let mut help = generate_usage(name, definitions);

    if !description.is_empty() {
        help.push('\n');
        help.push_str(description);
        help.push('\n');
    }

    if definitions.is_empty() {
        return help;
    }

    let width = definitions
        .iter()
        .map(|d| d.metalabel().chars().count())
        .max()
        .unwrap_or(0);

    help.push_str("\nArguments:\n");
    for def in definitions {
        let line = format!("  {:<width$}  {}", def.metalabel(), def.description());
        help.push_str(line.trim_end());
        help.push('\n');
    }

    help
}
