use clap::{ArgGroup, Parser, ValueEnum};
use g2c_core::error::{missing_assignment, unparseable_parameter, Error};
use g2c_core::load::{load_document, load_grammar};
use g2c_core::model::normalize::normalize;
use g2c_core::model::Grammar;
use g2c_generate::code::CodeGenerator;
use g2c_generate::params::{Dialect, ParameterGenerator};
use g2c_generate::GenerateToWriter;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter as TracingLevelFilter};
use tracing_subscriber::FmtSubscriber;

// ------------------------------------------------------------------------------------------------
// Command-Line Arguments
// ------------------------------------------------------------------------------------------------

/// Command-Line Interface (CLI) for grammar-driven generation: enumerate
/// the parameter space of a grammar for an algorithm configurator, or
/// materialize the source code a concrete parameter assignment selects.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true)))]
#[command(after_help = "\
The two modes are mutually exclusive.

Examples:
  g2c grammar.xml [-o test.xml] [-d 5] [-f irace] -p parameters.txt
  g2c grammar.xml [-o test.xml] -t src_code [-x] --parameter1=value1 [--parameter2=value2 ...]")]
struct Cli {
    /// Level of logging to enable
    #[arg(long)]
    #[arg(value_enum)]
    #[arg(default_value_t = LogFilter::Information)]
    log_filter: LogFilter,

    /// Grammar document to generate from
    grammar: PathBuf,

    /// Optional document with derivations that overwrite parts of the
    /// grammar
    #[arg(short, long)]
    overwrite: Option<PathBuf>,

    /// Maximum recursion depth when generating parameters
    #[arg(short, long)]
    #[arg(default_value_t = 3)]
    depth: usize,

    /// Configurator format for the generated parameters
    #[arg(short = 'f', long)]
    #[arg(value_enum)]
    #[arg(default_value_t = ParameterFormat::Irace)]
    params_format: ParameterFormat,

    /// Save generated parameters to this file
    #[arg(short, long, group = "mode")]
    parameters: Option<PathBuf>,

    /// Target directory for the generated code
    #[arg(short, long, group = "mode")]
    target_dir: Option<PathBuf>,

    /// Do not re-indent the generated code
    #[arg(short = 'x', long)]
    do_not_reindent: bool,

    /// Parameter assignment for code generation, as `--name=value` tokens
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    assignment: Vec<String>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum LogFilter {
    /// Turn off all logging
    None,
    /// Enable error logging only
    Errors,
    /// Enable warnings and above
    Warnings,
    /// Enable information and above
    Information,
    /// Enable debugging and above
    Debugging,
    /// Enable tracing (ALL) and above
    Tracing,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum ParameterFormat {
    /// irace parameter file
    Irace,
    /// ParamILS parameter file with enumerated ranges
    Paramils,
    /// SMAC parameter file
    Smac,
    /// crace parameter file
    Crace,
    /// emili parameter file
    Emili,
}

// ------------------------------------------------------------------------------------------------
// Main
// ------------------------------------------------------------------------------------------------

fn main() -> ExitCode {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_filter) {
        eprintln!("Error ({}): {}", executable_name(), e);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error ({}): {}", executable_name(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let grammar = load_normalized_grammar(cli)?;

    if let Some(parameters) = &cli.parameters {
        let dialect: Dialect = cli.params_format.into();
        info!("generating {dialect} parameters into {}", parameters.display());
        let mut generator = ParameterGenerator::new(dialect, cli.depth);
        generator.write_to_file(&grammar, parameters)?;
    }

    if let Some(target_dir) = &cli.target_dir {
        if cli.assignment.is_empty() {
            return Err(missing_assignment());
        }
        let assignment = parse_assignment(&cli.assignment)?;
        info!("generating code into {}", target_dir.display());
        let mut generator = CodeGenerator::new(assignment, target_dir, !cli.do_not_reindent);
        generator.generate(&grammar)?;
    }

    Ok(())
}

fn load_normalized_grammar(cli: &Cli) -> Result<Grammar, Error> {
    let mut grammar = load_grammar(&cli.grammar)?;
    let overwrite = cli
        .overwrite
        .as_deref()
        .map(load_document)
        .transpose()?;
    normalize(&mut grammar, overwrite.as_ref())?;
    debug!("cleaned up grammar:\n{grammar}");
    Ok(grammar)
}

// ------------------------------------------------------------------------------------------------
// Main ❱ Logging
// ------------------------------------------------------------------------------------------------

fn init_logging(log_filter: LogFilter) -> Result<(), Error> {
    let log_level_filter = match log_filter {
        LogFilter::None => TracingLevelFilter::OFF,
        LogFilter::Errors => TracingLevelFilter::ERROR,
        LogFilter::Warnings => TracingLevelFilter::WARN,
        LogFilter::Information => TracingLevelFilter::INFO,
        LogFilter::Debugging => TracingLevelFilter::DEBUG,
        LogFilter::Tracing => TracingLevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(log_level_filter.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(Error::from)?;

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// Assignment Parsing
// ------------------------------------------------------------------------------------------------

/// Parse the trailing `--name=value` (or `-name value`) tokens into the
/// parameter assignment. Whitespace around `=` is tolerated, so
/// `--parameter= 1` still parses; anything else is fatal.
fn parse_assignment(tokens: &[String]) -> Result<HashMap<String, String>, Error> {
    let joined = tokens.join(" ").replace(" =", "=").replace("= ", "=");
    let mut assignment = HashMap::new();
    let mut words = joined.split_whitespace();
    while let Some(token) = words.next() {
        if let Some(rest) = token.strip_prefix("--") {
            let (name, value) = rest
                .split_once('=')
                .ok_or_else(|| unparseable_parameter(token))?;
            debug!("{name} : {value}");
            assignment.insert(name.to_string(), value.to_string());
        } else if let Some(name) = token.strip_prefix('-') {
            let value = words.next().ok_or_else(|| unparseable_parameter(token))?;
            debug!("{name} : {value}");
            assignment.insert(name.to_string(), value.to_string());
        } else {
            return Err(unparseable_parameter(token));
        }
    }
    Ok(assignment)
}

fn executable_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .map(ToString::to_string)
        .unwrap_or_else(|| "g2c".to_string())
}

// ------------------------------------------------------------------------------------------------
// Formats
// ------------------------------------------------------------------------------------------------

impl From<ParameterFormat> for Dialect {
    fn from(value: ParameterFormat) -> Self {
        match value {
            ParameterFormat::Irace => Dialect::Irace,
            ParameterFormat::Paramils => Dialect::Paramils,
            ParameterFormat::Smac => Dialect::Smac,
            ParameterFormat::Crace => Dialect::Crace,
            ParameterFormat::Emili => Dialect::Emili,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------
