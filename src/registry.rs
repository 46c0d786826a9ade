//! Metalabel resolution and the name registry built before each parse.

use std::collections::{HashMap, HashSet};

use crate::definition::{ArgumentDefinition, DefinitionError};

/// Fill in the display name of every definition that does not have one yet.
///
/// Order of preference: explicit override, `|`-joined names, label, then
/// `arg<N>` where `N` is the 0-based position among positional definitions.
/// Already resolved metalabels are left untouched.
pub fn resolve_metalabels(definitions: &mut [ArgumentDefinition]) {
    let mut positional_index = 0usize;

    for def in definitions.iter_mut() {
        if def.metalabel.is_empty() {
            def.metalabel = if let Some(explicit) = &def.explicit_metalabel {
                explicit.clone()
            } else if !def.names.is_empty() {
                def.names.join("|")
            } else if !def.label.is_empty() {
                def.label.clone()
            } else {
                format!("arg{positional_index}")
            };
        }

        if def.is_positional {
            positional_index += 1;
        }
    }
}

/// Lookup structures derived from a parser's definitions.
///
/// Holds indices into the definition list it was built from.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    positionals: Vec<usize>,
    required_positionals: usize,
    names: HashMap<String, usize>,
    named: Vec<usize>,
    help: Option<usize>,
}

impl NameRegistry {
    /// Validate the definitions and index them.
    ///
    /// Metalabels must already be resolved so errors can name the arguments.
    pub fn build(definitions: &[ArgumentDefinition]) -> Result<Self, DefinitionError> {
        let mut registry = NameRegistry::default();
        let mut labels = HashSet::new();
        let mut first_optional_positional: Option<&ArgumentDefinition> = None;

        for (index, def) in definitions.iter().enumerate() {
            if let Some(key) = def.result_key() {
                if labels.contains(&key) {
                    return Err(DefinitionError::DuplicateLabel(key.into_owned()));
                }
                labels.insert(key);
            }

            if def.is_positional {
                match first_optional_positional {
                    Some(optional) if !def.is_optional => {
                        return Err(DefinitionError::PositionalOrder {
                            positional: def.metalabel.clone(),
                            after: optional.metalabel.clone(),
                        });
                    }
                    None if def.is_optional => first_optional_positional = Some(def),
                    _ => {}
                }
                if !def.is_optional {
                    registry.required_positionals += 1;
                }
                registry.positionals.push(index);
                continue;
            }

            if !def.is_optional {
                return Err(DefinitionError::NamedNotOptional(def.metalabel.clone()));
            }

            for name in &def.names {
                if registry.names.insert(name.clone(), index).is_some() {
                    return Err(DefinitionError::DuplicateName(name.clone()));
                }
            }

            if def.is_help() {
                if let Some(first) = registry.help {
                    return Err(DefinitionError::MultipleHelp {
                        first: definitions[first].metalabel.clone(),
                        second: def.metalabel.clone(),
                    });
                }
                registry.help = Some(index);
            }
            registry.named.push(index);
        }

        Ok(registry)
    }

    /// Definition owning the alias `name`.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Positional definitions in declaration order.
    pub fn positionals(&self) -> &[usize] {
        &self.positionals
    }

    pub fn required_positionals(&self) -> usize {
        self.required_positionals
    }

    /// Named definitions in declaration order.
    pub fn named(&self) -> &[usize] {
        &self.named
    }

    pub fn help(&self) -> Option<usize> {
        self.help
    }
}
