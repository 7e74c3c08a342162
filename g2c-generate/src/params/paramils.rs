/*!
The ParamILS parameter file dialect.

ParamILS only understands discrete domains, so numeric ranges are
enumerated from `min` to `max` in `stepIfEnumerated` increments. Every
parameter renders as a braced value list with a bracketed default, and
conditions accumulate into a trailing block as in SMAC.

*/

use super::{DialectFormat, Parameter};
use g2c_core::model::paths;

// ------------------------------------------------------------------------------------------------
// Private Types
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct Paramils;

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl DialectFormat for Paramils {
    fn rule_name(&self, path: &str) -> String {
        let (_, command_line) = paths::rule_name(path);
        command_line
    }

    fn rule_cond(&self, path: &str, node_name: &str, rec_index: Option<usize>) -> String {
        let (condition, value) = paths::rule_cond(path, node_name, rec_index);
        if condition.is_empty() || value.is_empty() {
            String::new()
        } else {
            let (_, parameter_name) = paths::rule_name(path);
            let (_, condition_name) = paths::rule_name(&condition);
            format!("{parameter_name} | {condition_name} in {{{value}}}")
        }
    }

    fn parameter_line(&self, parameter: &Parameter) -> String {
        format!(
            "{} {{{}}}[{}]",
            parameter.name,
            parameter.values.join(", "),
            parameter.default_value
        )
    }

    fn trailing_conditional(&self, parameter: &Parameter) -> Option<String> {
        Some(parameter.condition.clone())
    }

    fn has_trailing_block(&self) -> bool {
        true
    }

    fn enumerates_ranges(&self) -> bool {
        true
    }
}
