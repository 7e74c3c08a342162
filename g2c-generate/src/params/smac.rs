/*!
The SMAC parameter file dialect.

Ranges render as bracketed bounds with a default and `i`/`l` markers;
categoricals render as a braced domain defaulting to its first value.
Conditions are not inlined but gathered into a trailing block:

```text
start%A {0, 1}[0]
steps [1, 100][10]il

Conditionals:
start%A%1%B | start%A in {1}
```

*/

use super::{DialectFormat, Parameter, ParameterKind};
use g2c_core::model::paths;

// ------------------------------------------------------------------------------------------------
// Private Types
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct Smac;

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl DialectFormat for Smac {
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
        match parameter.kind {
            ParameterKind::Integer | ParameterKind::Real => {
                let integer = if parameter.kind == ParameterKind::Integer {
                    "i"
                } else {
                    ""
                };
                let log = if parameter.log_scale { "l" } else { "" };
                format!(
                    "{} [{}, {}][{}]{}{}",
                    parameter.name,
                    parameter.values.first().map(String::as_str).unwrap_or(""),
                    parameter.values.get(1).map(String::as_str).unwrap_or(""),
                    parameter.default_value,
                    integer,
                    log
                )
            }
            ParameterKind::Categorical | ParameterKind::Recursive => format!(
                "{} {{{}}}[{}]",
                parameter.name,
                parameter.values.join(", "),
                parameter.values.first().map(String::as_str).unwrap_or("")
            ),
        }
    }

    fn trailing_conditional(&self, parameter: &Parameter) -> Option<String> {
        match parameter.kind {
            ParameterKind::Categorical | ParameterKind::Recursive => {
                Some(parameter.condition.clone())
            }
            ParameterKind::Integer | ParameterKind::Real => None,
        }
    }

    fn has_trailing_block(&self) -> bool {
        true
    }
}
