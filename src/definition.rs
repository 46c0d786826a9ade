//! Argument definitions and the builder handle used to configure them.

use std::borrow::Cow;

use serde::Deserialize;
use thiserror::Error;

use crate::result::CommitError;

/// Why a string is not a valid option name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameProblem {
    MissingDash,
    NoText,
    TooManyDashes,
    ShortTooLong,
}

impl std::fmt::Display for NameProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            NameProblem::MissingDash => "must start with '-' or '--'",
            NameProblem::NoText => "must contain text after '-' or '--'",
            NameProblem::TooManyDashes => "initial characters must only be '-' or '--'",
            NameProblem::ShortTooLong => {
                "options starting with '-' must be followed by only a single character"
            }
        };
        f.write_str(text)
    }
}

/// Mistakes in how a parser was declared.
///
/// These can never be caused by end-user input. Callers are expected to report
/// them and stop rather than attempt recovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("invalid option name \"{name}\": {problem}")]
    InvalidOptionName { name: String, problem: NameProblem },

    #[error("cannot add option name \"{name}\": existing name \"{existing}\" isn't valid - {problem}")]
    ExistingNameInvalid {
        name: String,
        existing: String,
        problem: NameProblem,
    },

    #[error("cannot add name \"{name}\" to named argument \"{argument}\": {problem}")]
    BareNameOnNamed {
        name: String,
        argument: String,
        problem: NameProblem,
    },

    #[error("named argument \"{0}\" must be optional")]
    NamedNotOptional(String),

    #[error(
        "positional argument \"{positional}\" must be optional as it follows an optional positional argument \"{after}\""
    )]
    PositionalOrder { positional: String, after: String },

    #[error("multiple arguments with the name \"{0}\"")]
    DuplicateName(String),

    #[error("multiple arguments with the label \"{0}\"")]
    DuplicateLabel(String),

    #[error("multiple help arguments defined: \"{first}\" and \"{second}\"")]
    MultipleHelp { first: String, second: String },

    #[error("failed to store parsed argument: {0}")]
    Commit(#[from] CommitError),
}

/// Check a string against the option-name grammar.
///
/// Valid names start with one or two dashes followed by text. A single dash
/// must be followed by exactly one character (`-h`), a double dash by any
/// amount of text (`--help`).
pub fn check_option_name(name: &str) -> Result<(), NameProblem> {
    if !name.starts_with('-') {
        return Err(NameProblem::MissingDash);
    }

    let text = name.trim_start_matches('-');
    let dashes = name.len() - text.len();

    if text.is_empty() {
        return Err(NameProblem::NoText);
    }
    if dashes > 2 {
        return Err(NameProblem::TooManyDashes);
    }
    if dashes == 1 && text.chars().count() > 1 {
        return Err(NameProblem::ShortTooLong);
    }

    Ok(())
}

/// Whether `token` is syntactically an option name.
pub fn is_option_name(token: &str) -> bool {
    check_option_name(token).is_ok()
}

/// How many value tokens a single match of an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiValueMode {
    /// Exactly `n` values every time the argument is matched.
    Fixed(u8),
    /// Between zero and `max` values, taken greedily up to the next option.
    Variable(u8),
    /// At least one value, otherwise unbounded.
    OneOrMore,
}

impl Default for MultiValueMode {
    fn default() -> Self {
        MultiValueMode::Fixed(1)
    }
}

impl MultiValueMode {
    /// Whether `count` collected values satisfy this mode when the match ends.
    pub fn is_enough(&self, count: usize) -> bool {
        match *self {
            MultiValueMode::Fixed(n) => count >= usize::from(n),
            MultiValueMode::Variable(_) => true,
            MultiValueMode::OneOrMore => count >= 1,
        }
    }

    /// Whether a match holding `count` values can take no more.
    pub fn is_full(&self, count: usize) -> bool {
        match *self {
            MultiValueMode::Fixed(n) | MultiValueMode::Variable(n) => count >= usize::from(n),
            MultiValueMode::OneOrMore => false,
        }
    }
}

/// A declared argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDefinition {
    pub(crate) label: String,
    pub(crate) names: Vec<String>,
    pub(crate) explicit_metalabel: Option<String>,
    pub(crate) metalabel: String,
    pub(crate) description: String,
    pub(crate) is_optional: bool,
    pub(crate) is_positional: bool,
    pub(crate) mode: MultiValueMode,
}

impl ArgumentDefinition {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            names: Vec::new(),
            explicit_metalabel: None,
            metalabel: String::new(),
            description: String::new(),
            is_optional: false,
            is_positional: true,
            mode: MultiValueMode::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Display name used in help text.
    ///
    /// Empty until the parser has resolved its metalabels.
    pub fn metalabel(&self) -> &str {
        &self.metalabel
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    pub fn is_positional(&self) -> bool {
        self.is_positional
    }

    pub fn multi_value_mode(&self) -> MultiValueMode {
        self.mode
    }

    /// Whether this is the built-in help argument (`-h` or `--help` among its names).
    pub fn is_help(&self) -> bool {
        self.names.iter().any(|n| n == "-h" || n == "--help")
    }

    /// Name shown in error messages before metalabels are resolved.
    fn display_name(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else {
            self.names.first().map(String::as_str).unwrap_or("")
        }
    }

    /// Key the parsed values are stored under in a [`ParseResult`](crate::ParseResult).
    ///
    /// The label when set. Unlabelled named arguments fall back to their
    /// `|`-joined aliases, which unlike the metalabel cannot be overridden.
    /// Unlabelled positional arguments have no key and are reachable by index only.
    pub fn result_key(&self) -> Option<Cow<'_, str>> {
        if !self.label.is_empty() {
            Some(Cow::Borrowed(&self.label))
        } else if !self.is_positional {
            Some(Cow::Owned(self.names.join("|")))
        } else {
            None
        }
    }

    fn invalidate_metalabel(&mut self) {
        self.metalabel.clear();
    }
}

/// Fluent view over one definition owned by an [`ArgumentParser`](crate::ArgumentParser).
///
/// The handle mutably borrows the parser, so it cannot outlive it or be kept
/// around while the parser is used for anything else.
#[derive(Debug)]
pub struct ArgumentHandle<'p> {
    definitions: &'p mut [ArgumentDefinition],
    index: usize,
}

impl<'p> ArgumentHandle<'p> {
    pub(crate) fn new(definitions: &'p mut [ArgumentDefinition], index: usize) -> Self {
        Self { definitions, index }
    }

    fn definition(&mut self) -> &mut ArgumentDefinition {
        &mut self.definitions[self.index]
    }

    /// Position of the definition in the parser's definition list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        let def = self.definition();
        def.label = label.into();
        def.invalidate_metalabel();
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.definition().description = description.into();
        self
    }

    /// Override the help-text display name.
    pub fn set_metalabel(&mut self, metalabel: impl Into<String>) -> &mut Self {
        let def = self.definition();
        def.explicit_metalabel = Some(metalabel.into());
        def.invalidate_metalabel();
        self
    }

    /// Mark a positional argument as optional (or required).
    ///
    /// Named arguments are always optional; making one required is reported
    /// when parsing starts.
    pub fn set_optional(&mut self, optional: bool) -> &mut Self {
        self.definition().is_optional = optional;
        self
    }

    pub fn set_multi_value_mode(&mut self, mode: MultiValueMode) -> &mut Self {
        self.definition().mode = mode;
        self
    }

    /// Add an alias to the argument.
    ///
    /// A dashed name turns a positional definition into a named, optional one.
    /// Every name on a named definition must satisfy the option-name grammar.
    pub fn add_name(&mut self, name: impl Into<String>) -> Result<&mut Self, DefinitionError> {
        let name = name.into();
        let def = self.definition();

        if name.starts_with('-') {
            check_option_name(&name).map_err(|problem| DefinitionError::InvalidOptionName {
                name: name.clone(),
                problem,
            })?;

            if def.is_positional {
                for existing in &def.names {
                    check_option_name(existing).map_err(|problem| {
                        DefinitionError::ExistingNameInvalid {
                            name: name.clone(),
                            existing: existing.clone(),
                            problem,
                        }
                    })?;
                }
                def.is_optional = true;
                def.is_positional = false;
            }
        } else if !def.is_positional {
            // Always fails: the name has no leading dash.
            if let Err(problem) = check_option_name(&name) {
                return Err(DefinitionError::BareNameOnNamed {
                    name,
                    argument: def.display_name().to_string(),
                    problem,
                });
            }
        }

        def.names.push(name);
        def.invalidate_metalabel();
        Ok(self)
    }
}
