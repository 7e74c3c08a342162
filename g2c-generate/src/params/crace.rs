/*!
The crace parameter file dialect.

Same line shape as irace, but conditions use a plain equality operator.

*/

use super::{DialectFormat, Parameter, ParameterKind};
use g2c_core::model::paths;

// ------------------------------------------------------------------------------------------------
// Private Types
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct Crace;

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl DialectFormat for Crace {
    fn rule_name(&self, path: &str) -> String {
        let (canonical, command_line) = paths::rule_name(path);
        format!("{canonical}\t\"--{command_line}=\"\t")
    }

    fn rule_cond(&self, path: &str, node_name: &str, rec_index: Option<usize>) -> String {
        let (condition, value) = paths::rule_cond(path, node_name, rec_index);
        if condition.is_empty() || value.is_empty() {
            String::new()
        } else {
            let (canonical, _) = paths::rule_name(&condition);
            format!("\t| {canonical} == {value}")
        }
    }

    fn parameter_line(&self, parameter: &Parameter) -> String {
        let kind = match parameter.kind {
            ParameterKind::Integer => "i",
            ParameterKind::Real => "r",
            ParameterKind::Categorical | ParameterKind::Recursive => "c",
        };
        format!(
            "{} {} ({}){}",
            parameter.name,
            kind,
            parameter.values.join(", "),
            parameter.condition
        )
    }
}
