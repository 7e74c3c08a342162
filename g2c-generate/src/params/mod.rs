/*!
Enumerates the parameter space of a grammar in a configurator dialect.

The walker drives a single [`ParameterGenerator`]; everything a dialect
disagrees about is behind the [`DialectFormat`] capability set: how a rule
name renders, how a conditional predicate renders, how a parameter line is
assembled, whether conditionals accumulate into a trailing block, and
whether numeric ranges are written as bounds or enumerated value lists.

Categorical parameters get a domain of `0..n` integer codes. Recursive
rules are emitted as one categorical per recursion frame, and the deepest
frame's domain excludes the recursive alternative. A second occurrence of
a canonical parameter name is a fatal error: the rename pass resolves
sequential repetition, but pathological grammars can still collide (an
`A221` may be depth-2 of `A2` or choice 1 of `A22`), and those must be
renamed by the grammar author.

*/

use crate::GenerateToWriter;
use g2c_core::error::{duplicate_parameter, invalid_range_attribute, unknown_dialect, Error};
use g2c_core::model::paths;
use g2c_core::model::walk::{walk_grammar, GrammarWalker};
use g2c_core::model::{Grammar, NodeId};
use g2c_core::syntax::{
    ATTR_DEFAULT, ATTR_LOG_SCALE, ATTR_MAX, ATTR_MIN, ATTR_STEP_IF_ENUMERATED, ATTR_TYPE,
    TYPE_INT, TYPE_REAL,
};
use std::collections::HashSet;
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;
use tracing::error;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// The configurator dialects a parameter space can be rendered in.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    Irace,
    Paramils,
    Smac,
    Crace,
    Emili,
}

///
/// The kind of a parameter, as derived from its grammar node.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Categorical,
    Integer,
    Real,
    /// A categorical standing for one frame of a recursive rule.
    Recursive,
}

///
/// One entry of the parameter space, with name and condition already
/// rendered by the dialect.
///
#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub values: Vec<String>,
    pub default_value: String,
    pub log_scale: bool,
    pub condition: String,
}

///
/// Walks the grammar up to a recursion depth and accumulates one rendered
/// line per independent choice point.
///
#[derive(Debug)]
pub struct ParameterGenerator {
    dialect: Dialect,
    max_depth: usize,
    parameters: Vec<String>,
    conditionals: Vec<String>,
    names: HashSet<String>,
}

// ------------------------------------------------------------------------------------------------
// Private Types
// ------------------------------------------------------------------------------------------------

///
/// The dialect capability set: three render operations plus the flags that
/// select a trailing conditional block and enumerated ranges.
///
pub(crate) trait DialectFormat {
    fn rule_name(&self, path: &str) -> String;

    fn rule_cond(&self, path: &str, node_name: &str, rec_index: Option<usize>) -> String;

    fn parameter_line(&self, parameter: &Parameter) -> String;

    fn trailing_conditional(&self, _parameter: &Parameter) -> Option<String> {
        None
    }

    fn has_trailing_block(&self) -> bool {
        false
    }

    fn enumerates_ranges(&self) -> bool {
        false
    }
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Dialect {
    pub(crate) fn format(&self) -> &'static dyn DialectFormat {
        match self {
            Self::Irace => &irace::Irace,
            Self::Paramils => &paramils::Paramils,
            Self::Smac => &smac::Smac,
            Self::Crace => &crace::Crace,
            Self::Emili => &emili::Emili,
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Irace => "irace",
                Self::Paramils => "paramils",
                Self::Smac => "smac",
                Self::Crace => "crace",
                Self::Emili => "emili",
            }
        )
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "irace" => Ok(Self::Irace),
            "paramils" => Ok(Self::Paramils),
            "smac" => Ok(Self::Smac),
            "crace" => Ok(Self::Crace),
            "emili" => Ok(Self::Emili),
            _ => Err(unknown_dialect(s)),
        }
    }
}

// ------------------------------------------------------------------------------------------------

impl ParameterGenerator {
    pub fn new(dialect: Dialect, max_depth: usize) -> Self {
        Self {
            dialect,
            max_depth,
            parameters: Vec::new(),
            conditionals: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Record the canonical name for a path; a second occurrence is fatal.
    /// The rename pass cannot resolve every clash: the canonical form
    /// erases the path separators, so distinct paths can still collide.
    fn register(&mut self, path: &str) -> Result<(), Error> {
        let (name, _) = paths::rule_name(path);
        if !self.names.insert(name.clone()) {
            // dump what was emitted so far so the clash can be located
            for line in &self.parameters {
                error!("{line}");
            }
            return Err(duplicate_parameter(name));
        }
        Ok(())
    }

    fn push(&mut self, parameter: Parameter) {
        let format = self.dialect.format();
        if let Some(conditional) = format.trailing_conditional(&parameter) {
            self.conditionals.push(conditional);
        }
        self.parameters.push(format.parameter_line(&parameter));
    }

    fn enumerated_range(
        &mut self,
        grammar: &Grammar,
        node: NodeId,
        path: &str,
    ) -> Result<(), Error> {
        let format = self.dialect.format();
        let name = format.rule_name(path);
        let condition = format.rule_cond(path, grammar.name(node), None);
        let default_value = range_default(grammar, node);
        let log_scale = range_log_scale(grammar, node);
        match grammar.attribute(node, ATTR_TYPE) {
            Some(TYPE_INT) => {
                let min: i64 = parse_bound(grammar, node, ATTR_MIN)?;
                let max: i64 = parse_bound(grammar, node, ATTR_MAX)?;
                let step: i64 = parse_bound(grammar, node, ATTR_STEP_IF_ENUMERATED)?;
                if step <= 0 {
                    return Err(invalid_range_attribute(
                        ATTR_STEP_IF_ENUMERATED,
                        step.to_string(),
                    ));
                }
                let mut values = Vec::new();
                let mut value = min;
                while value <= max {
                    values.push(value.to_string());
                    value += step;
                }
                self.push(Parameter {
                    name,
                    kind: ParameterKind::Integer,
                    values,
                    default_value,
                    log_scale,
                    condition,
                });
            }
            Some(TYPE_REAL) => {
                let min: f64 = parse_bound(grammar, node, ATTR_MIN)?;
                let max: f64 = parse_bound(grammar, node, ATTR_MAX)?;
                let step: f64 = parse_bound(grammar, node, ATTR_STEP_IF_ENUMERATED)?;
                if step <= 0.0 {
                    return Err(invalid_range_attribute(
                        ATTR_STEP_IF_ENUMERATED,
                        step.to_string(),
                    ));
                }
                let mut values = Vec::new();
                let mut value = min;
                while value <= max {
                    values.push(value.to_string());
                    value += step;
                }
                self.push(Parameter {
                    name,
                    kind: ParameterKind::Real,
                    values,
                    default_value,
                    log_scale,
                    condition,
                });
            }
            _ => {}
        }
        Ok(())
    }
}

impl GenerateToWriter for ParameterGenerator {
    fn write<W>(&mut self, grammar: &Grammar, writer: &mut W) -> Result<(), Error>
    where
        W: Write + Sized,
    {
        self.parameters.clear();
        self.conditionals.clear();
        self.names.clear();
        let max_depth = self.max_depth;
        walk_grammar(grammar, max_depth, self)?;

        for parameter in &self.parameters {
            writeln!(writer, "{parameter}")?;
        }
        if self.dialect.format().has_trailing_block() {
            writeln!(writer)?;
            writeln!(writer, "Conditionals:")?;
            for conditional in &self.conditionals {
                if !conditional.is_empty() {
                    writeln!(writer, "{conditional}")?;
                }
            }
        }
        Ok(())
    }
}

impl GrammarWalker for ParameterGenerator {
    fn categorical(
        &mut self,
        grammar: &Grammar,
        node: NodeId,
        path: &str,
        _depth: usize,
    ) -> Result<Option<usize>, Error> {
        self.register(path)?;
        let format = self.dialect.format();
        let name = format.rule_name(path);
        let condition = format.rule_cond(path, grammar.name(node), None);
        let values = (0..=grammar.or_count(node)).map(|i| i.to_string()).collect();
        self.push(Parameter {
            name,
            kind: ParameterKind::Categorical,
            values,
            default_value: String::new(),
            log_scale: false,
            condition,
        });
        Ok(None)
    }

    fn recursive(
        &mut self,
        grammar: &Grammar,
        node: NodeId,
        path: &str,
        depth: usize,
    ) -> Result<Option<usize>, Error> {
        self.register(path)?;
        let format = self.dialect.format();
        let name = format.rule_name(path);
        let rule_name = grammar.name(node).to_string();
        let mut values = Vec::new();
        let mut recursive_index = None;
        for (index, alternative) in grammar.alternatives(node).into_iter().enumerate() {
            let is_recursive = alternative
                .iter()
                .any(|&child| grammar.name(child) == rule_name);
            if is_recursive {
                // past the depth ceiling the recursive alternative cannot
                // be chosen and is left out of the domain
                if depth + 1 < self.max_depth {
                    values.push(index.to_string());
                }
                recursive_index = Some(index);
            } else {
                values.push(index.to_string());
            }
        }
        let condition = format.rule_cond(path, &rule_name, recursive_index);
        self.push(Parameter {
            name,
            kind: ParameterKind::Recursive,
            values,
            default_value: String::new(),
            log_scale: false,
            condition,
        });
        Ok(None)
    }

    fn range(
        &mut self,
        grammar: &Grammar,
        node: NodeId,
        path: &str,
        _depth: usize,
    ) -> Result<(), Error> {
        if self.dialect.format().enumerates_ranges() {
            return self.enumerated_range(grammar, node, path);
        }
        self.register(path)?;
        let format = self.dialect.format();
        let name = format.rule_name(path);
        let condition = format.rule_cond(path, grammar.name(node), None);
        let kind = match grammar.attribute(node, ATTR_TYPE) {
            Some(TYPE_INT) => ParameterKind::Integer,
            Some(TYPE_REAL) => ParameterKind::Real,
            // other range types carry no parameter
            _ => return Ok(()),
        };
        let min = grammar.attribute(node, ATTR_MIN).unwrap_or("").to_string();
        let max = grammar.attribute(node, ATTR_MAX).unwrap_or("").to_string();
        let default_value = range_default(grammar, node);
        let log_scale = range_log_scale(grammar, node);
        self.push(Parameter {
            name,
            kind,
            values: vec![min, max],
            default_value,
            log_scale,
            condition,
        });
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

fn range_default(grammar: &Grammar, node: NodeId) -> String {
    grammar
        .attribute(node, ATTR_DEFAULT)
        .filter(|value| !value.is_empty())
        .or_else(|| grammar.attribute(node, ATTR_MIN))
        .unwrap_or("")
        .to_string()
}

fn range_log_scale(grammar: &Grammar, node: NodeId) -> bool {
    grammar
        .attribute(node, ATTR_LOG_SCALE)
        .map(|value| value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

fn parse_bound<T>(grammar: &Grammar, node: NodeId, attribute: &str) -> Result<T, Error>
where
    T: FromStr,
{
    let value = grammar.attribute(node, attribute).unwrap_or("");
    value
        .parse()
        .map_err(|_| invalid_range_attribute(attribute, value))
}

// ------------------------------------------------------------------------------------------------
// Modules
// ------------------------------------------------------------------------------------------------

mod crace;

mod emili;

mod irace;

mod paramils;

mod smac;
