/*!
The irace parameter file dialect.

One line per parameter: the canonical name, the quoted command-line switch,
a one-letter type, the parenthesized domain, and an optional inline
`%in%`-style condition.

```text
startA	"--start%A="	c (0, 1)
startA1B	"--start%A%1%B="	c (0, 1)	| startA %in% c(1)
```

*/

use super::{DialectFormat, Parameter, ParameterKind};
use g2c_core::model::paths;

// ------------------------------------------------------------------------------------------------
// Private Types
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct Irace;

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl DialectFormat for Irace {
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
            format!("\t| {canonical} %in% c({value})")
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
