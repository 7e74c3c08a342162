/*!
Materializes source code from a grammar and a concrete parameter
assignment.

The generator first executes the grammar's copy directives, then drives
the walker with unlimited depth: the assignment decides every choice, so
recursion is bounded by the parameters themselves. Entering a node with an
`output` attribute rotates the output buffer to a new file; text blocks
and range values append to the buffer; flushing re-indents unless
suppressed. Assignment entries are consumed as they are encountered, so a
repeated key cannot satisfy two choice points and anything left over at
the end was never reachable under the chosen path and is reported as a
warning.

*/

use g2c_core::error::{
    create_directory_error, invalid_parameter_value, missing_parameter, write_file_error, Error,
};
use g2c_core::model::walk::{walk_grammar, GrammarWalker};
use g2c_core::model::{Grammar, NodeId};
use g2c_core::syntax::ATTR_OUTPUT;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// Translates a parameter assignment into the source tree it selects.
///
#[derive(Debug)]
pub struct CodeGenerator {
    assignment: HashMap<String, String>,
    target_dir: PathBuf,
    reindent_output: bool,
    code: Vec<String>,
    current_output: Option<(PathBuf, File)>,
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

///
/// Strip the common leading whitespace of a buffered block of code.
///
/// Lines are split on `\n` (a trailing `\r` is dropped), trailing blank
/// lines are removed, and the minimum leading-whitespace width across the
/// non-blank lines is stripped from every line; blank lines stay blank.
/// With `enabled` false the indentation width is taken as zero. The
/// operation is idempotent.
///
pub fn reindent(code: &str, enabled: bool) -> String {
    let mut lines: Vec<&str> = code
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while matches!(lines.last(), Some(line) if line.trim().is_empty()) {
        lines.pop();
    }
    let width = if enabled {
        lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
            .min()
            .unwrap_or(0)
    } else {
        0
    };
    let mut out = String::new();
    for line in lines {
        if !line.trim().is_empty() {
            out.push_str(line.get(width..).unwrap_or(""));
        }
        out.push('\n');
    }
    out
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl CodeGenerator {
    pub fn new<P>(assignment: HashMap<String, String>, target_dir: P, reindent_output: bool) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            assignment,
            target_dir: target_dir.into(),
            reindent_output,
            code: Vec::new(),
            current_output: None,
        }
    }

    ///
    /// Run the copy directives, walk the grammar, and write every declared
    /// output file. Unused assignment entries are reported afterwards.
    ///
    pub fn generate(&mut self, grammar: &Grammar) -> Result<(), Error> {
        copy::copy_single_files(grammar, &self.target_dir)?;
        copy::copy_filtered_directories(grammar, &self.target_dir)?;

        // even on a failed walk whatever was buffered for the currently
        // open output file still reaches the disk
        let walked = walk_grammar(grammar, usize::MAX, self);
        self.flush_current_output()?;
        walked?;

        let mut unused: Vec<(&String, &String)> = self.assignment.iter().collect();
        unused.sort();
        for (name, value) in unused {
            warn!("parameter \"{name} : {value}\" was not used during code generation");
        }
        Ok(())
    }

    /// Consume the assignment entry for a walker path, `:` mapped to `-`
    /// as in the emitted parameter names.
    fn take_parameter(&mut self, path: &str) -> Option<(String, String)> {
        let key = path.replace(':', "-");
        let value = self.assignment.remove(&key)?;
        Some((key, value))
    }

    fn take_choice(&mut self, path: &str) -> Result<usize, Error> {
        let (key, value) = self
            .take_parameter(path)
            .ok_or_else(|| missing_parameter(path.replace(':', "-")))?;
        value
            .trim()
            .parse()
            .map_err(|_| invalid_parameter_value(key, value))
    }

    fn enter_output_node(&mut self, grammar: &Grammar, node: NodeId) -> Result<(), Error> {
        if let Some(output) = grammar.attribute(node, ATTR_OUTPUT) {
            if !output.is_empty() {
                self.open_output(output)?;
            }
        }
        Ok(())
    }

    fn open_output(&mut self, relative: &str) -> Result<(), Error> {
        self.flush_current_output()?;
        let path = self.target_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| create_directory_error(parent, e))?;
        }
        info!("Output file {}", path.display());
        let file = File::create(&path).map_err(|e| write_file_error(&path, e))?;
        self.current_output = Some((path, file));
        Ok(())
    }

    fn flush_current_output(&mut self) -> Result<(), Error> {
        if let Some((path, mut file)) = self.current_output.take() {
            if !self.code.is_empty() {
                let text = reindent(&self.code.join(""), self.reindent_output);
                file.write_all(text.as_bytes())
                    .map_err(|e| write_file_error(&path, e))?;
                self.code.clear();
            }
        } else if !self.code.is_empty() {
            warn!("discarding buffered text that precedes any output declaration");
            self.code.clear();
        }
        Ok(())
    }
}

impl GrammarWalker for CodeGenerator {
    fn categorical(
        &mut self,
        grammar: &Grammar,
        node: NodeId,
        path: &str,
        _depth: usize,
    ) -> Result<Option<usize>, Error> {
        self.enter_output_node(grammar, node)?;
        Ok(Some(self.take_choice(path)?))
    }

    fn recursive(
        &mut self,
        grammar: &Grammar,
        node: NodeId,
        path: &str,
        _depth: usize,
    ) -> Result<Option<usize>, Error> {
        self.enter_output_node(grammar, node)?;
        Ok(Some(self.take_choice(path)?))
    }

    fn range(
        &mut self,
        _grammar: &Grammar,
        _node: NodeId,
        path: &str,
        _depth: usize,
    ) -> Result<(), Error> {
        let (_, value) = self
            .take_parameter(path)
            .ok_or_else(|| missing_parameter(path.replace(':', "-")))?;
        self.code.push(value);
        Ok(())
    }

    fn cdata(
        &mut self,
        grammar: &Grammar,
        node: NodeId,
        _path: &str,
        _depth: usize,
    ) -> Result<(), Error> {
        self.code.push(grammar.text(node).unwrap_or("").to_string());
        Ok(())
    }

    fn plain(
        &mut self,
        grammar: &Grammar,
        node: NodeId,
        _path: &str,
        _depth: usize,
    ) -> Result<(), Error> {
        self.enter_output_node(grammar, node)
    }
}

// ------------------------------------------------------------------------------------------------
// Modules
// ------------------------------------------------------------------------------------------------

mod copy;

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------
