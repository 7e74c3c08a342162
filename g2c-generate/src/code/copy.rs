/*!
The copy directives of a grammar, executed before code generation.

Sources resolve against the grammar's own directory, destinations against
the target directory; parent directories are created and existing files
overwritten. Directory copies take only the regular files whose name
matches the directive's `regex_filter` (an unanchored search).

*/

use g2c_core::error::{
    copy_file_error, create_directory_error, invalid_regex_filter, io_error, Error,
};
use g2c_core::model::Grammar;
use g2c_core::syntax::{
    ATTR_DESTINATION, ATTR_DESTINATION_DIR, ATTR_REGEX_FILTER, ATTR_SOURCE, ATTR_SOURCE_DIR,
};
use regex::Regex;
use std::path::Path;
use tracing::info;

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

/// Copy every `source`/`destination` directive verbatim.
pub(crate) fn copy_single_files(grammar: &Grammar, target_dir: &Path) -> Result<(), Error> {
    for derivation in grammar.derivations() {
        let (Some(source), Some(destination)) = (
            grammar.attribute(derivation, ATTR_SOURCE),
            grammar.attribute(derivation, ATTR_DESTINATION),
        ) else {
            continue;
        };
        let from = grammar.base_path().join(source);
        let to = target_dir.join(destination);
        ensure_parent(&to)?;
        info!("Copying {} to {}", from.display(), to.display());
        std::fs::copy(&from, &to).map_err(|e| copy_file_error(&from, &to, e))?;
    }
    Ok(())
}

/// Copy the matching regular files of every `source_dir`/`destination_dir`
/// directive.
pub(crate) fn copy_filtered_directories(grammar: &Grammar, target_dir: &Path) -> Result<(), Error> {
    for derivation in grammar.derivations() {
        let (Some(source), Some(destination), Some(filter)) = (
            grammar.attribute(derivation, ATTR_SOURCE_DIR),
            grammar.attribute(derivation, ATTR_DESTINATION_DIR),
            grammar.attribute(derivation, ATTR_REGEX_FILTER),
        ) else {
            continue;
        };
        let filter = Regex::new(filter).map_err(|_| invalid_regex_filter(filter))?;
        let from_dir = grammar.base_path().join(source);
        let to_dir = target_dir.join(destination);
        ensure_parent(&to_dir)?;
        std::fs::create_dir_all(&to_dir).map_err(|e| create_directory_error(&to_dir, e))?;

        for entry in std::fs::read_dir(&from_dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            if !entry.file_type().map_err(io_error)?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if filter.is_match(name) {
                let from = from_dir.join(name);
                let to = to_dir.join(name);
                info!("Copying {} to {}", from.display(), to.display());
                std::fs::copy(&from, &to).map_err(|e| copy_file_error(&from, &to, e))?;
            }
        }
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| create_directory_error(parent, e))?;
    }
    Ok(())
}
