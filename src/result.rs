//! Parsed values and the result returned from a parse.

use indexmap::IndexMap;
use thiserror::Error;

use crate::parser::ParseError;

/// Rejected attempts to store a matched argument in a [`ParseResult`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("positional argument committed after a named argument")]
    PositionalAfterNamed,

    #[error("named argument committed without a label")]
    EmptyLabel,

    #[error("label \"{0}\" committed more than once")]
    DuplicateLabel(String),
}

/// Failed lookups on a [`ParseResult`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no argument with the label \"{0}\"")]
    UnknownLabel(String),
}

/// A single typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A possibly-absent parsed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedValue(Option<Value>);

impl ParsedValue {
    /// An absent value, as produced for optional arguments that were not supplied.
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn has_value(&self) -> bool {
        self.0.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.0 {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.0 {
            Some(Value::Int(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.0 {
            Some(Value::UInt(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.0 {
            Some(Value::Float(n)) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.0 {
            Some(Value::Bool(b)) => Some(b),
            _ => None,
        }
    }
}

impl From<Value> for ParsedValue {
    fn from(value: Value) -> Self {
        Self(Some(value))
    }
}

impl From<String> for ParsedValue {
    fn from(value: String) -> Self {
        Self(Some(Value::Text(value)))
    }
}

impl From<&str> for ParsedValue {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<i64> for ParsedValue {
    fn from(value: i64) -> Self {
        Self(Some(Value::Int(value)))
    }
}

impl From<u64> for ParsedValue {
    fn from(value: u64) -> Self {
        Self(Some(Value::UInt(value)))
    }
}

impl From<f64> for ParsedValue {
    fn from(value: f64) -> Self {
        Self(Some(Value::Float(value)))
    }
}

impl From<bool> for ParsedValue {
    fn from(value: bool) -> Self {
        Self(Some(Value::Bool(value)))
    }
}

/// Read-only view over the values parsed for one argument.
#[derive(Debug, Clone, Copy)]
pub struct ParsedArgument<'r> {
    values: &'r [ParsedValue],
    present: bool,
}

impl<'r> ParsedArgument<'r> {
    /// Whether the argument appeared in the input, even with zero values.
    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn has_value(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// The first value, if any.
    pub fn value(&self) -> Option<&'r ParsedValue> {
        self.values.first()
    }

    /// The first value as text, if any.
    pub fn as_str(&self) -> Option<&'r str> {
        self.values.first().and_then(ParsedValue::as_str)
    }

    pub fn values(&self) -> &'r [ParsedValue] {
        self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'r, ParsedValue> {
        self.values.iter()
    }
}

impl<'r> IntoIterator for ParsedArgument<'r> {
    type Item = &'r ParsedValue;
    type IntoIter = std::slice::Iter<'r, ParsedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArgumentSlot {
    offset: usize,
    count: usize,
    present: bool,
}

/// Outcome of a parse.
///
/// Check [`should_exit`](Self::should_exit) first: when set, [`message`](Self::message)
/// holds either help text or, if [`error`](Self::error) is also set, a diagnostic
/// for the user. Otherwise values can be looked up by label.
#[derive(Debug, Default)]
pub struct ParseResult {
    values: Vec<ParsedValue>,
    slots: Vec<ArgumentSlot>,
    labels: IndexMap<String, usize>,
    num_positional: usize,
    should_exit: bool,
    error_occurred: bool,
    message: String,
    parse_error: Option<ParseError>,
}

impl ParseResult {
    pub(crate) fn success() -> Self {
        Self::default()
    }

    pub(crate) fn help(text: String) -> Self {
        Self {
            should_exit: true,
            message: text,
            ..Self::default()
        }
    }

    pub(crate) fn failure(error: ParseError) -> Self {
        Self {
            should_exit: true,
            error_occurred: true,
            message: error.to_string(),
            parse_error: Some(error),
            ..Self::default()
        }
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn error(&self) -> bool {
        self.error_occurred
    }

    /// Help text or error text, empty after a successful parse.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        self.parse_error.as_ref()
    }

    /// Conventional process exit code: `Some(0)` after help, `Some(2)` after a
    /// parse error, `None` when the program should carry on.
    pub fn exit_code(&self) -> Option<i32> {
        match (self.should_exit, self.error_occurred) {
            (false, _) => None,
            (true, false) => Some(0),
            (true, true) => Some(2),
        }
    }

    /// Look up an argument by label.
    ///
    /// Optional arguments that were not supplied yield an empty view.
    pub fn get(&self, label: &str) -> Result<ParsedArgument<'_>, LookupError> {
        let position = self
            .labels
            .get(label)
            .copied()
            .ok_or_else(|| LookupError::UnknownLabel(label.to_string()))?;
        Ok(self.view(position))
    }

    /// Look up the `index`-th positional argument.
    pub fn positional(&self, index: usize) -> Option<ParsedArgument<'_>> {
        (index < self.num_positional).then(|| self.view(index))
    }

    /// Committed labels, positional first, then named in match order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Every committed argument in commit order, with its label.
    ///
    /// Unlabelled positional arguments are yielded with `None`; their position
    /// in the iteration is their positional index.
    pub fn arguments(&self) -> impl Iterator<Item = (Option<&str>, ParsedArgument<'_>)> {
        let mut keys = vec![None; self.slots.len()];
        for (label, &position) in &self.labels {
            keys[position] = Some(label.as_str());
        }
        keys.into_iter()
            .enumerate()
            .map(move |(position, key)| (key, self.view(position)))
    }

    fn view(&self, position: usize) -> ParsedArgument<'_> {
        let slot = self.slots[position];
        ParsedArgument {
            values: &self.values[slot.offset..slot.offset + slot.count],
            present: slot.present,
        }
    }

    /// Store the next positional argument. All positional arguments must be
    /// committed before any named one.
    pub(crate) fn commit_positional(
        &mut self,
        values: Vec<ParsedValue>,
        label: Option<&str>,
        present: bool,
    ) -> Result<(), CommitError> {
        if self.num_positional != self.slots.len() {
            return Err(CommitError::PositionalAfterNamed);
        }
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            self.register_label(label)?;
        }
        self.push_slot(values, present);
        self.num_positional += 1;
        Ok(())
    }

    /// Store a named argument under a non-empty label.
    pub(crate) fn commit_named(
        &mut self,
        values: Vec<ParsedValue>,
        label: &str,
        present: bool,
    ) -> Result<(), CommitError> {
        if label.is_empty() {
            return Err(CommitError::EmptyLabel);
        }
        self.register_label(label)?;
        self.push_slot(values, present);
        Ok(())
    }

    fn register_label(&mut self, label: &str) -> Result<(), CommitError> {
        if self.labels.contains_key(label) {
            return Err(CommitError::DuplicateLabel(label.to_string()));
        }
        self.labels.insert(label.to_string(), self.slots.len());
        Ok(())
    }

    fn push_slot(&mut self, values: Vec<ParsedValue>, present: bool) {
        let slot = ArgumentSlot {
            offset: self.values.len(),
            count: values.len(),
            present,
        };
        self.values.extend(values);
        self.slots.push(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> Vec<ParsedValue> {
        values.iter().map(|v| ParsedValue::from(*v)).collect()
    }

    #[test]
    fn test_commit_and_lookup() {
        let mut result = ParseResult::success();
        result
            .commit_positional(text(&["a.txt"]), Some("input"), true)
            .unwrap();
        result
            .commit_positional(text(&["b.txt"]), None, true)
            .unwrap();
        result
            .commit_named(text(&["1", "2"]), "count", true)
            .unwrap();

        let input = result.get("input").unwrap();
        assert_eq!(input.as_str(), Some("a.txt"));
        assert_eq!(input.value_count(), 1);

        let count = result.get("count").unwrap();
        let values: Vec<_> = count.iter().filter_map(ParsedValue::as_str).collect();
        assert_eq!(values, ["1", "2"]);

        assert_eq!(result.positional(1).unwrap().as_str(), Some("b.txt"));
        assert!(result.positional(2).is_none());
        assert_eq!(result.labels().collect::<Vec<_>>(), ["input", "count"]);
    }

    #[test]
    fn test_arguments_in_commit_order() {
        let mut result = ParseResult::success();
        result
            .commit_positional(text(&["a.txt"]), Some("input"), true)
            .unwrap();
        result.commit_positional(Vec::new(), None, false).unwrap();
        result.commit_named(text(&["3"]), "count", true).unwrap();

        let arguments: Vec<_> = result
            .arguments()
            .map(|(label, argument)| (label, argument.as_str(), argument.is_present()))
            .collect();
        assert_eq!(
            arguments,
            [
                (Some("input"), Some("a.txt"), true),
                (None, None, false),
                (Some("count"), Some("3"), true),
            ]
        );
    }

    #[test]
    fn test_positional_after_named_rejected() {
        let mut result = ParseResult::success();
        result.commit_named(text(&["x"]), "name", true).unwrap();
        assert_eq!(
            result.commit_positional(text(&["y"]), None, true),
            Err(CommitError::PositionalAfterNamed)
        );
    }

    #[test]
    fn test_named_requires_label() {
        let mut result = ParseResult::success();
        assert_eq!(
            result.commit_named(Vec::new(), "", true),
            Err(CommitError::EmptyLabel)
        );
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let mut result = ParseResult::success();
        result
            .commit_positional(text(&["x"]), Some("dup"), true)
            .unwrap();
        assert_eq!(
            result.commit_named(text(&["y"]), "dup", true),
            Err(CommitError::DuplicateLabel("dup".to_string()))
        );
    }

    #[test]
    fn test_unknown_label() {
        let result = ParseResult::success();
        assert_eq!(
            result.get("missing").unwrap_err(),
            LookupError::UnknownLabel("missing".to_string())
        );
    }

    #[test]
    fn test_absent_argument_is_empty_view() {
        let mut result = ParseResult::success();
        result.commit_named(Vec::new(), "verbose", false).unwrap();
        let verbose = result.get("verbose").unwrap();
        assert!(!verbose.is_present());
        assert!(!verbose.has_value());
        assert!(verbose.value().is_none());
    }

    #[test]
    fn test_typed_values() {
        assert_eq!(ParsedValue::from(5i64).as_i64(), Some(5));
        assert_eq!(ParsedValue::from(5u64).as_u64(), Some(5));
        assert_eq!(ParsedValue::from(true).as_bool(), Some(true));
        assert_eq!(ParsedValue::from(1.5).as_f64(), Some(1.5));
        assert_eq!(ParsedValue::from("5").as_i64(), None);
        assert!(!ParsedValue::empty().has_value());
        assert_eq!(Value::Int(-3).to_string(), "-3");
    }

    #[test]
    fn test_outcome_flags() {
        let help = ParseResult::help("Usage".to_string());
        assert!(help.should_exit());
        assert!(!help.error());
        assert_eq!(help.exit_code(), Some(0));

        let failed = ParseResult::failure(ParseError::UnknownOption("--bogus".to_string()));
        assert!(failed.should_exit());
        assert!(failed.error());
        assert!(failed.message().contains("--bogus"));
        assert_eq!(failed.exit_code(), Some(2));

        assert_eq!(ParseResult::success().exit_code(), None);
    }
}
