//! Sourceable shell files describing a parse outcome.

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use crate::result::{ParseResult, ParsedValue};

/// Heredoc delimiter for help output.
const HELP_DELIMITER: &str = "ARGSMITH_HELP";

/// Quote a value so the shell reads it back unchanged.
///
/// Plain values use double quotes with `$`, `` ` ``, `\` and `"` escaped.
/// Values holding ASCII control characters use `$'...'` quoting, where those
/// characters can be written as escapes.
fn shell_quote(value: &str) -> String {
    if value.chars().any(|c| c.is_ascii_control()) {
        return ansi_c_quote(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '$' | '`' | '\\' | '"' => {
                quoted.push('\\');
                quoted.push(c);
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn ansi_c_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 3);
    quoted.push_str("$'");
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_ascii_control() => quoted.push_str(&format!("\\x{:02x}", c as u32)),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Convert a label to a valid shell variable name.
///
/// Uppercases ASCII letters and replaces anything that is not alphanumeric
/// with an underscore. Leading underscores from aliases like `--count` are dropped.
fn to_shell_var_name(label: &str) -> String {
    let name: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    name.trim_start_matches('_').to_string()
}

fn quoted(value: &ParsedValue) -> String {
    let text = value.value().map(ToString::to_string).unwrap_or_default();
    shell_quote(&text)
}

/// Shell statements for a successful parse, in commit order.
///
/// Labelled arguments use their label as the variable name. Unlabelled
/// positional arguments are named `ARG<N>` after their positional index.
/// A single value is exported, several values become an array, an argument
/// given without values is exported as `true`, and absent arguments are skipped.
///
/// Fails when two arguments map to the same variable name, whether or not
/// they were supplied.
pub fn generate_output_string(result: &ParseResult, prefix: &str) -> Result<String> {
    let mut output = String::new();
    let mut sources: HashMap<String, String> = HashMap::new();

    for (position, (label, argument)) in result.arguments().enumerate() {
        let source = match label {
            Some(label) => label.to_string(),
            None => format!("arg{position}"),
        };
        let var_name = format!("{}{}", prefix, to_shell_var_name(&source));
        if let Some(previous) = sources.insert(var_name.clone(), source.clone()) {
            bail!(
                "arguments \"{}\" and \"{}\" both map to shell variable {}",
                previous,
                source,
                var_name
            );
        }

        if !argument.is_present() {
            continue;
        }

        match argument.values() {
            [] => output.push_str(&format!("export {}=\"true\"\n", var_name)),
            [value] => output.push_str(&format!("export {}={}\n", var_name, quoted(value))),
            values => {
                // Arrays cannot be exported.
                let items: Vec<String> = values.iter().map(quoted).collect();
                output.push_str(&format!("{}=({})\n", var_name, items.join(" ")));
            }
        }
    }

    Ok(output)
}

/// Render whatever the parse outcome calls for: help, an error, or values.
pub fn generate_result_string(result: &ParseResult, prefix: &str) -> Result<String> {
    if !result.should_exit() {
        generate_output_string(result, prefix)
    } else if result.error() {
        Ok(generate_error_string(result.message()))
    } else {
        Ok(generate_help_output_string(result.message()))
    }
}

/// Write the rendered outcome to a temporary file and return its path.
///
/// The file persists until it is deleted manually.
pub fn generate_output(result: &ParseResult, prefix: &str) -> Result<PathBuf> {
    write_temp_file(&generate_result_string(result, prefix)?)
}

/// Generate an error output as a string.
///
/// When sourced, it prints the message to stderr and exits 1.
pub fn generate_error_string(message: &str) -> String {
    let text = shell_quote(&format!("argsmith: {}", message));
    format!("echo {} >&2\nexit 1\n", text)
}

/// Generate a help output as a string.
///
/// When sourced, it prints the help text and exits 0.
pub fn generate_help_output_string(help_text: &str) -> String {
    let mut text = help_text.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    format!(
        "cat <<'{delimiter}'\n{text}{delimiter}\nexit 0\n",
        delimiter = HELP_DELIMITER,
        text = text
    )
}

/// Write content to a temporary file and return its path.
fn write_temp_file(content: &str) -> Result<PathBuf> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    let path = file.into_temp_path().keep()?;
    Ok(path)
}
