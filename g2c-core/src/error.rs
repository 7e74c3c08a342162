/*!
Provides the crate's Error and Result types as well as helper functions.
 */

use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};
use tracing::error;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// The Error type for this crate.
///
#[derive(Debug)]
pub enum Error {
    /// An error was signaled by the standard library I/O functions.
    IoError {
        source: std::io::Error,
    },
    /// An error was signaled by the standard string conversion functions.
    Utf8Error {
        source: core::str::Utf8Error,
    },
    TracingFilterError {
        source: tracing_subscriber::filter::ParseError,
    },
    TracingSubscriberError {
        source: tracing::subscriber::SetGlobalDefaultError,
    },
    /// A grammar document could not be read from the file system.
    GrammarRead {
        file: PathBuf,
        source: std::io::Error,
    },
    /// A grammar document is not well-formed XML.
    GrammarParse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    /// The document root has no derivations list.
    MissingDerivationsList {
        file: PathBuf,
    },
    /// An element requires an attribute it does not carry.
    MissingAttribute {
        element: String,
        attribute: String,
    },
    /// A call references a derivation that does not exist.
    MissingDerivation {
        name: String,
    },
    /// An overwrite grammar names a derivation absent from the main grammar.
    MissingOverwriteTarget {
        name: String,
    },
    /// An `append="disjunction"` rule has no same-named rule to extend.
    MissingAppendTarget {
        name: String,
    },
    /// A range attribute could not be parsed as a number.
    InvalidRangeAttribute {
        attribute: String,
        value: String,
    },
    /// Two walker paths produced the same canonical parameter name.
    DuplicateParameter {
        name: String,
    },
    /// No entry in the parameter assignment matches a walker path.
    MissingParameter {
        path: String,
    },
    /// An assignment entry exists but is not a valid alternative index.
    InvalidParameterValue {
        name: String,
        value: String,
    },
    /// A command-line parameter token is not `--name=value` or `-name value`.
    UnparseableParameter {
        token: String,
    },
    /// Code generation was requested without any parameter assignment.
    MissingAssignment,
    /// The requested parameter dialect is not one of the known five.
    UnknownDialect {
        name: String,
    },
    /// A copy directive carries an invalid `regex_filter` expression.
    InvalidRegexFilter {
        pattern: String,
    },
    /// A directory on an output path could not be created.
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// An output file could not be created or written.
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A copy directive failed.
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

///
/// A Result type that specifically uses this crate's Error.
///
pub type Result<T> = std::result::Result<T, Error>;

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

macro_rules! report_and_return {
    ($err: expr) => {
        let err = $err;
        error!("{}", err);
        return err;
    };
}

/// Construct an Error from the provided source.
#[inline]
pub fn io_error(source: std::io::Error) -> Error {
    report_and_return!(Error::IoError { source });
}

/// Construct an Error from the provided source.
#[inline]
pub fn utf8_error(source: core::str::Utf8Error) -> Error {
    report_and_return!(Error::Utf8Error { source });
}

/// Construct an Error from the provided source.
#[inline]
pub fn tracing_filter_error(source: tracing_subscriber::filter::ParseError) -> Error {
    report_and_return!(Error::TracingFilterError { source });
}

/// Construct an Error from the provided source.
#[inline]
pub fn tracing_subscriber_error(source: tracing::subscriber::SetGlobalDefaultError) -> Error {
    report_and_return!(Error::TracingSubscriberError { source });
}

/// Construct an Error from the provided file and source.
#[inline]
pub fn grammar_read_error<P>(file: P, source: std::io::Error) -> Error
where
    P: AsRef<Path>,
{
    report_and_return!(Error::GrammarRead {
        file: file.as_ref().to_path_buf(),
        source,
    });
}

/// Construct an Error from the provided file, position, and description.
#[inline]
pub fn grammar_parse_error<P, S>(file: P, line: usize, column: usize, message: S) -> Error
where
    P: AsRef<Path>,
    S: Into<String>,
{
    report_and_return!(Error::GrammarParse {
        file: file.as_ref().to_path_buf(),
        line,
        column,
        message: message.into(),
    });
}

/// Construct an Error from the provided file.
#[inline]
pub fn missing_derivations_list<P>(file: P) -> Error
where
    P: AsRef<Path>,
{
    report_and_return!(Error::MissingDerivationsList {
        file: file.as_ref().to_path_buf(),
    });
}

/// Construct an Error from the provided element and attribute names.
#[inline]
pub fn missing_attribute<S1, S2>(element: S1, attribute: S2) -> Error
where
    S1: Into<String>,
    S2: Into<String>,
{
    report_and_return!(Error::MissingAttribute {
        element: element.into(),
        attribute: attribute.into(),
    });
}

/// Construct an Error from the provided derivation name.
#[inline]
pub fn missing_derivation<S>(name: S) -> Error
where
    S: Into<String>,
{
    report_and_return!(Error::MissingDerivation { name: name.into() });
}

/// Construct an Error from the provided derivation name.
#[inline]
pub fn missing_overwrite_target<S>(name: S) -> Error
where
    S: Into<String>,
{
    report_and_return!(Error::MissingOverwriteTarget { name: name.into() });
}

/// Construct an Error from the provided derivation name.
#[inline]
pub fn missing_append_target<S>(name: S) -> Error
where
    S: Into<String>,
{
    report_and_return!(Error::MissingAppendTarget { name: name.into() });
}

/// Construct an Error from the provided attribute name and value.
#[inline]
pub fn invalid_range_attribute<S1, S2>(attribute: S1, value: S2) -> Error
where
    S1: Into<String>,
    S2: Into<String>,
{
    report_and_return!(Error::InvalidRangeAttribute {
        attribute: attribute.into(),
        value: value.into(),
    });
}

/// Construct an Error from the provided parameter name.
#[inline]
pub fn duplicate_parameter<S>(name: S) -> Error
where
    S: Into<String>,
{
    report_and_return!(Error::DuplicateParameter { name: name.into() });
}

/// Construct an Error from the provided walker path.
#[inline]
pub fn missing_parameter<S>(path: S) -> Error
where
    S: Into<String>,
{
    report_and_return!(Error::MissingParameter { path: path.into() });
}

/// Construct an Error from the provided parameter name and value.
#[inline]
pub fn invalid_parameter_value<S1, S2>(name: S1, value: S2) -> Error
where
    S1: Into<String>,
    S2: Into<String>,
{
    report_and_return!(Error::InvalidParameterValue {
        name: name.into(),
        value: value.into(),
    });
}

/// Construct an Error from the provided command-line token.
#[inline]
pub fn unparseable_parameter<S>(token: S) -> Error
where
    S: Into<String>,
{
    report_and_return!(Error::UnparseableParameter {
        token: token.into(),
    });
}

/// Construct an Error for a code-generation run without parameters.
#[inline]
pub fn missing_assignment() -> Error {
    report_and_return!(Error::MissingAssignment);
}

/// Construct an Error from the provided dialect name.
#[inline]
pub fn unknown_dialect<S>(name: S) -> Error
where
    S: Into<String>,
{
    report_and_return!(Error::UnknownDialect { name: name.into() });
}

/// Construct an Error from the provided filter expression.
#[inline]
pub fn invalid_regex_filter<S>(pattern: S) -> Error
where
    S: Into<String>,
{
    report_and_return!(Error::InvalidRegexFilter {
        pattern: pattern.into(),
    });
}

/// Construct an Error from the provided path and source.
#[inline]
pub fn create_directory_error<P>(path: P, source: std::io::Error) -> Error
where
    P: AsRef<Path>,
{
    report_and_return!(Error::CreateDirectory {
        path: path.as_ref().to_path_buf(),
        source,
    });
}

/// Construct an Error from the provided path and source.
#[inline]
pub fn write_file_error<P>(path: P, source: std::io::Error) -> Error
where
    P: AsRef<Path>,
{
    report_and_return!(Error::WriteFile {
        path: path.as_ref().to_path_buf(),
        source,
    });
}

/// Construct an Error from the provided paths and source.
#[inline]
pub fn copy_file_error<P1, P2>(from: P1, to: P2, source: std::io::Error) -> Error
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    report_and_return!(Error::CopyFile {
        from: from.as_ref().to_path_buf(),
        to: to.as_ref().to_path_buf(),
        source,
    });
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::IoError { source } => format!("An I/O error occurred; source: {}", source),
                Self::Utf8Error { source } =>
                    format!("A UTF-8 conversion error occurred; source: {}", source),
                Self::TracingFilterError { source } =>
                    format!("An error occurred parsing a tracing filter; source: {}", source),
                Self::TracingSubscriberError { source } =>
                    format!("An error occurred setting the tracing subscriber; source: {}", source),
                Self::GrammarRead { file, source } =>
                    format!("Unable to open {}; source: {}", file.display(), source),
                Self::GrammarParse {
                    file,
                    line,
                    column,
                    message,
                } => format!(
                    "Error parsing {}:{}:{}; {}",
                    file.display(),
                    line,
                    column,
                    message
                ),
                Self::MissingDerivationsList { file } =>
                    format!("No derivations list in {}", file.display()),
                Self::MissingAttribute { element, attribute } =>
                    format!("Element `{}` is missing attribute `{}`", element, attribute),
                Self::MissingDerivation { name } => format!("No definition for {}", name),
                Self::MissingOverwriteTarget { name } =>
                    format!("No derivation {} to replace", name),
                Self::MissingAppendTarget { name } => format!("No derivation {} to extend", name),
                Self::InvalidRangeAttribute { attribute, value } =>
                    format!("Range attribute `{}` has invalid value `{}`", attribute, value),
                Self::DuplicateParameter { name } => format!("Duplicate parameter name {}", name),
                Self::MissingParameter { path } =>
                    format!("No parameter to translate '{}'", path),
                Self::InvalidParameterValue { name, value } =>
                    format!("Parameter {} has invalid value `{}`", name, value),
                Self::UnparseableParameter { token } =>
                    format!("Cannot parse parameter {}", token),
                Self::MissingAssignment =>
                    "No parameters found for generating the code from the grammar".to_string(),
                Self::UnknownDialect { name } => format!("Unrecognized file format {}", name),
                Self::InvalidRegexFilter { pattern } =>
                    format!("Invalid regex_filter expression `{}`", pattern),
                Self::CreateDirectory { path, source } =>
                    format!("Could not create {}; source: {}", path.display(), source),
                Self::WriteFile { path, source } =>
                    format!("Could not write {}; source: {}", path.display(), source),
                Self::CopyFile { from, to, source } => format!(
                    "Could not copy {} to {}; source: {}",
                    from.display(),
                    to.display(),
                    source
                ),
            }
        )
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError { source } => Some(source),
            Error::Utf8Error { source } => Some(source),
            Error::TracingFilterError { source } => Some(source),
            Error::TracingSubscriberError { source } => Some(source),
            Error::GrammarRead { source, .. } => Some(source),
            Error::CreateDirectory { source, .. } => Some(source),
            Error::WriteFile { source, .. } => Some(source),
            Error::CopyFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        io_error(source)
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(source: core::str::Utf8Error) -> Self {
        utf8_error(source)
    }
}

impl From<tracing_subscriber::filter::ParseError> for Error {
    fn from(source: tracing_subscriber::filter::ParseError) -> Self {
        tracing_filter_error(source)
    }
}

impl From<tracing::subscriber::SetGlobalDefaultError> for Error {
    fn from(source: tracing::subscriber::SetGlobalDefaultError) -> Self {
        tracing_subscriber_error(source)
    }
}
