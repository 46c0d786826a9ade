//! argsmith - Declarative command-line argument parsing.
//!
//! Arguments are declared on an [`ArgumentParser`] through builder handles,
//! then raw tokens are matched against them in a single pass. Mistakes in the
//! declaration are returned as [`DefinitionError`]s; mistakes in the tokens are
//! reported inside the [`ParseResult`].

pub mod config;
pub mod definition;
pub mod exe;
pub mod help;
pub mod output;
pub mod parser;
pub mod registry;
pub mod result;

pub use config::{ArgConfig, Config, ConfigError};
pub use definition::{
    check_option_name, is_option_name, ArgumentDefinition, ArgumentHandle, DefinitionError,
    MultiValueMode, NameProblem,
};
pub use exe::{CurrentExecutable, ExecutableLocator};
pub use help::{generate_help, generate_usage};
pub use output::{generate_output, generate_output_string, generate_result_string};
pub use parser::{ArgumentParser, ParseError};
pub use registry::NameRegistry;
pub use result::{CommitError, LookupError, ParseResult, ParsedArgument, ParsedValue, Value};
