/*!
Contains only string constants for the grammar document vocabulary.
 */

// ------------------------------------------------------------------------------------------------
// Element Names
// ------------------------------------------------------------------------------------------------

/// Constant for the document root element `gr:grammar`.
pub const NAME_GRAMMAR: &str = "gr:grammar";

/// Constant for the derivations list element `gr:derivations`.
pub const NAME_DERIVATIONS: &str = "gr:derivations";

/// Constant for the include element `gr:include`.
pub const NAME_INCLUDE: &str = "gr:include";

/// Constant for the copy directive element `gr:copy`.
pub const NAME_COPY: &str = "gr:copy";

/// Constant for the choice separator element `or`.
pub const NAME_OR: &str = "or";

// ------------------------------------------------------------------------------------------------
// Attribute Names
// ------------------------------------------------------------------------------------------------

/// Attribute declaring a rule as the root of a generated file.
pub const ATTR_OUTPUT: &str = "output";

/// Attribute marking a rule as extending a same-named rule.
pub const ATTR_APPEND: &str = "append";

/// The only recognized value of [`ATTR_APPEND`].
pub const VALUE_DISJUNCTION: &str = "disjunction";

/// Attribute naming the source of an include or single-file copy.
pub const ATTR_SOURCE: &str = "source";

/// Attribute naming the target of a single-file copy.
pub const ATTR_DESTINATION: &str = "destination";

/// Attribute naming the source of a filtered directory copy.
pub const ATTR_SOURCE_DIR: &str = "source_dir";

/// Attribute naming the target of a filtered directory copy.
pub const ATTR_DESTINATION_DIR: &str = "destination_dir";

/// Attribute holding the file-name filter of a directory copy.
pub const ATTR_REGEX_FILTER: &str = "regex_filter";

/// Attribute distinguishing integer and real ranges.
pub const ATTR_TYPE: &str = "type";

/// Attribute holding the lower bound of a range.
pub const ATTR_MIN: &str = "min";

/// Attribute holding the upper bound of a range.
pub const ATTR_MAX: &str = "max";

/// Attribute holding the default value of a range.
pub const ATTR_DEFAULT: &str = "default";

/// Attribute holding the step used when a range is enumerated.
pub const ATTR_STEP_IF_ENUMERATED: &str = "stepIfEnumerated";

/// Attribute requesting log-scale sampling of a range.
pub const ATTR_LOG_SCALE: &str = "log-scale";

/// Range type value for integer-valued ranges.
pub const TYPE_INT: &str = "int";

/// Range type value for real-valued ranges.
pub const TYPE_REAL: &str = "real";

// ------------------------------------------------------------------------------------------------
// Path Alphabet
// ------------------------------------------------------------------------------------------------

/// Separator between choice positions and element names in a walker path.
pub const PATH_CHOICE_SEPARATOR: char = '%';

/// Marker introducing a recursion frame in a walker path.
pub const PATH_DEPTH_SEPARATOR: char = '@';
