//! JSON description of a parser and conversion into an [`ArgumentParser`].

use serde::Deserialize;
use thiserror::Error;

use crate::definition::{DefinitionError, MultiValueMode};
use crate::parser::ArgumentParser;

/// Prefix used for exported variables when none is configured.
pub const DEFAULT_PREFIX: &str = "ARGSMITH_";

/// Errors that can occur while loading a parser description.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("invalid argument declaration: {0}")]
    Definition(#[from] DefinitionError),
}

/// Configuration for a single argument.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgConfig {
    /// Identifier used to look up the parsed value
    #[serde(default)]
    pub label: String,
    /// Aliases; any dashed alias makes the argument named
    #[serde(default)]
    pub names: Vec<String>,
    /// Help text for this argument
    pub description: Option<String>,
    /// Display name override for help text
    pub metalabel: Option<String>,
    /// Whether a positional argument may be omitted
    #[serde(default)]
    pub optional: bool,
    /// Number of values taken per match (default: exactly one)
    pub nargs: Option<MultiValueMode>,
}

/// Top-level parser description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Program name shown in help (optional if provided via CLI --name)
    pub name: Option<String>,
    /// Description of the program
    pub description: Option<String>,
    /// Variable prefix for shell output (default: "ARGSMITH_")
    pub prefix: Option<String>,
    /// Argument declarations, in order
    #[serde(default)]
    pub args: Vec<ArgConfig>,
}

impl Config {
    /// Parse a JSON string into a Config.
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Get the effective prefix, using the default if none is set.
    pub fn effective_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }

    /// Build a parser from this description.
    ///
    /// `effective_name` is the program name to use (from CLI --name or config name).
    /// Only name-level mistakes are caught here; ordering and collision checks
    /// run when the parser is validated or used.
    pub fn build_parser(&self, effective_name: &str) -> Result<ArgumentParser, ConfigError> {
        let mut parser = ArgumentParser::with_description(
            effective_name,
            self.description.clone().unwrap_or_default(),
        );

        for arg in &self.args {
            let mut handle = parser.add_argument(arg.label.clone());

            for name in &arg.names {
                handle.add_name(name.clone())?;
            }
            if let Some(ref description) = arg.description {
                handle.set_description(description.clone());
            }
            if let Some(ref metalabel) = arg.metalabel {
                handle.set_metalabel(metalabel.clone());
            }
            if arg.optional {
                handle.set_optional(true);
            }
            if let Some(mode) = arg.nargs {
                handle.set_multi_value_mode(mode);
            }
        }

        Ok(parser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "name": "myscript",
            "description": "My awesome script",
            "prefix": "MYAPP_",
            "args": [
                {"label": "input", "description": "Input file"},
                {"label": "extra", "optional": true, "nargs": {"variable": 3}},
                {"label": "count", "names": ["-c", "--count"], "nargs": {"fixed": 1}},
                {"label": "files", "names": ["--files"], "nargs": "one_or_more", "metalabel": "FILES"}
            ]
        }"#;

        let config = Config::from_json(json).unwrap();
        assert_eq!(config.name, Some("myscript".to_string()));
        assert_eq!(config.description, Some("My awesome script".to_string()));
        assert_eq!(config.effective_prefix(), "MYAPP_");
        assert_eq!(config.args.len(), 4);
        assert_eq!(config.args[1].nargs, Some(MultiValueMode::Variable(3)));
        assert_eq!(config.args[2].nargs, Some(MultiValueMode::Fixed(1)));
        assert_eq!(config.args[3].nargs, Some(MultiValueMode::OneOrMore));
        assert_eq!(config.args[3].metalabel.as_deref(), Some("FILES"));

        let mut parser = config.build_parser("myscript").unwrap();
        parser.validate().unwrap();

        // help + 4 declared
        let defs = parser.definitions();
        assert_eq!(defs.len(), 5);
        assert!(defs[1].is_positional());
        assert!(defs[2].is_optional());
        assert!(!defs[3].is_positional());
        assert_eq!(defs[4].metalabel(), "FILES");
        assert_eq!(parser.description(), "My awesome script");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_json(r#"{"name": "minimal"}"#).unwrap();
        assert!(config.description.is_none());
        assert!(config.args.is_empty());
        assert_eq!(config.effective_prefix(), DEFAULT_PREFIX);

        let parser = config.build_parser("minimal").unwrap();
        assert_eq!(parser.definitions().len(), 1);
        assert_eq!(parser.name(), "minimal");
    }

    #[test]
    fn test_invalid_json() {
        let result = Config::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = Config::from_json(r#"{"args": [{"label": "x", "type": "flag"}]}"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_option_name_reported() {
        let config =
            Config::from_json(r#"{"args": [{"label": "verbose", "names": ["-verbose"]}]}"#)
                .unwrap();
        let err = config.build_parser("test").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Definition(DefinitionError::InvalidOptionName { .. })
        ));
        assert!(err.to_string().contains("-verbose"));
    }

    #[test]
    fn test_mixed_names_reported() {
        let config =
            Config::from_json(r#"{"args": [{"label": "out", "names": ["--out", "out"]}]}"#)
                .unwrap();
        assert!(matches!(
            config.build_parser("test"),
            Err(ConfigError::Definition(DefinitionError::BareNameOnNamed { .. }))
        ));
    }

    #[test]
    fn test_help_label_replaces_default() {
        let config = Config::from_json(
            r#"{"args": [{"label": "help", "names": ["--help"], "nargs": {"fixed": 0}, "description": "Show help"}]}"#,
        )
        .unwrap();
        let parser = config.build_parser("test").unwrap();
        assert_eq!(parser.definitions().len(), 1);
        assert_eq!(parser.definitions()[0].names(), ["--help"]);
        assert_eq!(parser.definitions()[0].description(), "Show help");
    }

    #[test]
    fn test_ordering_error_found_on_validate() {
        let config = Config::from_json(
            r#"{"args": [{"label": "a", "optional": true}, {"label": "b"}]}"#,
        )
        .unwrap();
        let mut parser = config.build_parser("test").unwrap();
        assert!(matches!(
            parser.validate(),
            Err(DefinitionError::PositionalOrder { .. })
        ));
    }
}
