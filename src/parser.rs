//! The argument parser: definition store, token matching and result assembly.

use std::borrow::Cow;
use std::collections::HashSet;
use std::ffi::OsString;

use thiserror::Error;

use crate::definition::{
    is_option_name, ArgumentDefinition, ArgumentHandle, DefinitionError, MultiValueMode,
};
use crate::exe::{strip_executable, CurrentExecutable, ExecutableLocator};
use crate::help::generate_help;
use crate::registry::{resolve_metalabels, NameRegistry};
use crate::result::{ParseResult, ParsedValue};

/// Label of the auto-registered help argument.
pub const HELP_LABEL: &str = "help";

/// Mistakes in the user-supplied tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Found unrecognized option \"{0}\"")]
    UnknownOption(String),

    #[error("Got too many positional arguments \"{token}\", expected at most {expected}")]
    TooManyPositional { token: String, expected: usize },

    #[error("Argument \"{name}\" expects {expected} values but only {received} were provided")]
    NotEnoughValues {
        name: String,
        expected: u8,
        received: usize,
    },

    #[error("Argument \"{0}\" expects at least one value but none were provided")]
    MissingValue(String),

    #[error("Missing required positional argument \"{0}\"")]
    MissingPositional(String),

    #[error("Argument \"{0}\" was provided more than once")]
    Repeated(String),
}

/// Declares arguments and parses command-line tokens against them.
#[derive(Debug, Clone)]
pub struct ArgumentParser {
    name: String,
    description: String,
    definitions: Vec<ArgumentDefinition>,
    default_help: Option<usize>,
}

impl ArgumentParser {
    /// Create a parser with the `-h`/`--help` argument already registered.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_description(name, "")
    }

    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut parser = Self {
            name: name.into(),
            description: description.into(),
            definitions: Vec::new(),
            default_help: None,
        };
        parser.define_default_arguments();
        parser
    }

    fn define_default_arguments(&mut self) {
        let mut help = ArgumentDefinition::new(HELP_LABEL);
        help.description = "Displays the help message".to_string();
        help.names = vec!["-h".to_string(), "--help".to_string()];
        help.is_optional = true;
        help.is_positional = false;
        help.mode = MultiValueMode::Fixed(0);

        self.definitions.push(help);
        self.default_help = Some(self.definitions.len() - 1);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn definitions(&self) -> &[ArgumentDefinition] {
        &self.definitions
    }

    /// Declare a new argument and return a handle for configuring it.
    ///
    /// Declaring the label `"help"` replaces the auto-registered help argument.
    pub fn add_argument(&mut self, label: impl Into<String>) -> ArgumentHandle<'_> {
        let label = label.into();

        let index = match self.default_help {
            Some(index) if label == HELP_LABEL => {
                self.default_help = None;
                self.definitions[index] = ArgumentDefinition::new(label);
                index
            }
            _ => {
                self.definitions.push(ArgumentDefinition::new(label));
                self.definitions.len() - 1
            }
        };

        ArgumentHandle::new(&mut self.definitions, index)
    }

    /// Run the pre-parse pass without parsing anything.
    pub fn validate(&mut self) -> Result<(), DefinitionError> {
        self.prepare().map(|_| ())
    }

    fn prepare(&mut self) -> Result<NameRegistry, DefinitionError> {
        resolve_metalabels(&mut self.definitions);
        NameRegistry::build(&self.definitions)
    }

    /// Help text for this parser.
    pub fn help_text(&mut self) -> String {
        resolve_metalabels(&mut self.definitions);
        generate_help(&self.name, &self.description, &self.definitions)
    }

    /// Parse tokens that do not include the executable path.
    ///
    /// `Err` is only returned for mistakes in the parser declaration; problems
    /// with the tokens themselves are reported through the [`ParseResult`].
    pub fn parse_args_no_executable<S: AsRef<str>>(
        &mut self,
        args: &[S],
    ) -> Result<ParseResult, DefinitionError> {
        let registry = self.prepare()?;
        let tokens: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        tracing::debug!(parser = %self.name, tokens = tokens.len(), "parsing arguments");

        if let Some(help) = registry.help() {
            let names = &self.definitions[help].names;
            if tokens.iter().any(|t| names.iter().any(|n| n == t)) {
                tracing::debug!("help requested");
                return Ok(ParseResult::help(generate_help(
                    &self.name,
                    &self.description,
                    &self.definitions,
                )));
            }
        }

        let matches = match TokenMatcher::new(&self.definitions, &registry).run(&tokens) {
            Ok(matches) => matches,
            Err(err) => {
                tracing::debug!(error = %err, "parse failed");
                return Ok(ParseResult::failure(err));
            }
        };

        assemble(&self.definitions, &registry, matches)
    }

    /// Parse tokens whose first entry may be the path of the running executable.
    pub fn parse_args<S: AsRef<str>>(
        &mut self,
        args: &[S],
    ) -> Result<ParseResult, DefinitionError> {
        self.parse_args_with_locator(args, &CurrentExecutable)
    }

    /// Like [`parse_args`](Self::parse_args) with a custom executable path source.
    pub fn parse_args_with_locator<S: AsRef<str>>(
        &mut self,
        args: &[S],
        locator: &dyn ExecutableLocator,
    ) -> Result<ParseResult, DefinitionError> {
        let args = strip_executable(args, locator);
        self.parse_args_no_executable(args)
    }

    /// Parse the arguments of the current process.
    pub fn parse_env(&mut self) -> Result<ParseResult, DefinitionError> {
        let args: Vec<String> = std::env::args_os()
            .map(|a: OsString| a.to_string_lossy().into_owned())
            .collect();
        self.parse_args(&args)
    }
}

/// Values collected for one argument match.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawMatch {
    definition: usize,
    /// Alias used to invoke it, or the metalabel for positional matches.
    name: String,
    values: Vec<String>,
}

#[derive(Debug)]
enum MatchState {
    Idle,
    Accumulating(RawMatch),
}

/// Single pass over the tokens producing raw per-argument matches.
struct TokenMatcher<'a> {
    definitions: &'a [ArgumentDefinition],
    registry: &'a NameRegistry,
    state: MatchState,
    finished: Vec<RawMatch>,
    positional_index: usize,
}

impl<'a> TokenMatcher<'a> {
    fn new(definitions: &'a [ArgumentDefinition], registry: &'a NameRegistry) -> Self {
        Self {
            definitions,
            registry,
            state: MatchState::Idle,
            finished: Vec::new(),
            positional_index: 0,
        }
    }

    fn run(mut self, tokens: &[&str]) -> Result<Vec<RawMatch>, ParseError> {
        let mut cursor = 0;

        while let Some(&token) = tokens.get(cursor) {
            if self.step(token)? {
                cursor += 1;
            }
        }

        if let MatchState::Accumulating(current) =
            std::mem::replace(&mut self.state, MatchState::Idle)
        {
            self.finish(current)?;
        }

        Ok(self.finished)
    }

    /// Feed one token. Returns whether the token was consumed.
    fn step(&mut self, token: &str) -> Result<bool, ParseError> {
        match std::mem::replace(&mut self.state, MatchState::Idle) {
            MatchState::Idle => self.start(token),
            MatchState::Accumulating(mut current) => {
                let mode = self.definitions[current.definition].mode;

                if mode.is_full(current.values.len()) {
                    tracing::trace!(argument = %current.name, "match full");
                    self.finished.push(current);
                    Ok(false)
                } else if is_option_name(token) {
                    self.finish(current)?;
                    Ok(false)
                } else {
                    current.values.push(token.to_string());
                    self.state = MatchState::Accumulating(current);
                    Ok(true)
                }
            }
        }
    }

    /// Begin a new match at `token`.
    ///
    /// Option names are consumed; positional tokens are left in place so they
    /// become the first value of their slot.
    fn start(&mut self, token: &str) -> Result<bool, ParseError> {
        if is_option_name(token) {
            let definition = self
                .registry
                .lookup(token)
                .ok_or_else(|| ParseError::UnknownOption(token.to_string()))?;
            tracing::trace!(option = token, "start named match");
            self.state = MatchState::Accumulating(RawMatch {
                definition,
                name: token.to_string(),
                values: Vec::new(),
            });
            return Ok(true);
        }

        let positionals = self.registry.positionals();
        let definition = *positionals.get(self.positional_index).ok_or_else(|| {
            ParseError::TooManyPositional {
                token: token.to_string(),
                expected: positionals.len(),
            }
        })?;
        self.positional_index += 1;

        let name = self.definitions[definition].metalabel.clone();
        tracing::trace!(argument = %name, "start positional match");
        self.state = MatchState::Accumulating(RawMatch {
            definition,
            name,
            values: Vec::new(),
        });
        Ok(false)
    }

    fn finish(&mut self, current: RawMatch) -> Result<(), ParseError> {
        let count = current.values.len();
        match self.definitions[current.definition].mode {
            MultiValueMode::Fixed(expected) if count < usize::from(expected) => {
                return Err(ParseError::NotEnoughValues {
                    name: current.name,
                    expected,
                    received: count,
                });
            }
            MultiValueMode::OneOrMore if count == 0 => {
                return Err(ParseError::MissingValue(current.name));
            }
            _ => {}
        }
        self.finished.push(current);
        Ok(())
    }
}

/// Key a named argument is stored under. Named definitions always have one;
/// an empty key is rejected by the commit.
fn named_key(def: &ArgumentDefinition) -> Cow<'_, str> {
    def.result_key().unwrap_or_default()
}

fn to_values(values: Vec<String>) -> Vec<ParsedValue> {
    values.into_iter().map(ParsedValue::from).collect()
}

/// Commit raw matches into a result: positional arguments in declaration order,
/// then named arguments in match order, then unsupplied named arguments.
fn assemble(
    definitions: &[ArgumentDefinition],
    registry: &NameRegistry,
    matches: Vec<RawMatch>,
) -> Result<ParseResult, DefinitionError> {
    let (positional, named): (Vec<RawMatch>, Vec<RawMatch>) = matches
        .into_iter()
        .partition(|m| definitions[m.definition].is_positional);

    let mut result = ParseResult::success();
    let mut positional = positional.into_iter().peekable();

    for &index in registry.positionals() {
        let def = &definitions[index];
        let label = Some(def.label.as_str());

        match positional.next_if(|m| m.definition == index) {
            Some(m) => result.commit_positional(to_values(m.values), label, true)?,
            None if def.is_optional => result.commit_positional(Vec::new(), label, false)?,
            None => {
                return Ok(ParseResult::failure(ParseError::MissingPositional(
                    def.metalabel.clone(),
                )));
            }
        }
    }

    let mut seen = HashSet::new();
    for m in named {
        if !seen.insert(m.definition) {
            return Ok(ParseResult::failure(ParseError::Repeated(m.name)));
        }
        let def = &definitions[m.definition];
        result.commit_named(to_values(m.values), &named_key(def), true)?;
    }

    for &index in registry.named() {
        if !seen.contains(&index) {
            result.commit_named(Vec::new(), &named_key(&definitions[index]), false)?;
        }
    }

    tracing::debug!(arguments = definitions.len(), "parse succeeded");
    Ok(result)
}
