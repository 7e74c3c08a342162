/*!
Provides the traits used to define *generators*, types that convert a
normalized grammar into other artifacts: configurator parameter files in
one of five dialects, or the generated source tree a concrete parameter
assignment selects.

*/

#![warn(
    unknown_lints,
    // ---------- Stylistic
    absolute_paths_not_starting_with_crate,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    macro_use_extern_crate,
    nonstandard_style, /* group */
    noop_method_call,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    // ---------- Future
    future_incompatible, /* group */
    rust_2021_compatibility, /* group */
    // ---------- Public
    missing_debug_implementations,
    // missing_docs,
    unreachable_pub,
    // ---------- Unsafe
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    // ---------- Unused
    unused, /* group */
)]
#![deny(
    // ---------- Public
    exported_private_dependencies,
    // ---------- Deprecated
    anonymous_parameters,
    bare_trait_objects,
    ellipsis_inclusive_range_patterns,
    // ---------- Unsafe
    deref_nullptr,
    drop_bounds,
    dyn_drop,
)]

use g2c_core::error::{write_file_error, Error};
use g2c_core::model::Grammar;
use std::fmt::Debug;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// This trait denotes a generator that writes to an implementation of
/// [Write].
///
pub trait GenerateToWriter: Debug {
    ///
    /// Generate from the given grammar into the provided writer.
    ///
    fn write<W>(&mut self, grammar: &Grammar, writer: &mut W) -> Result<(), Error>
    where
        W: Write + Sized;

    ///
    /// Generate from the given grammar into a string.
    ///
    fn write_to_string(&mut self, grammar: &Grammar) -> Result<String, Error> {
        let mut buffer = Cursor::new(Vec::new());
        self.write(grammar, &mut buffer)?;
        Ok(String::from_utf8(buffer.into_inner())
            .map_err(|e| g2c_core::error::utf8_error(e.utf8_error()))?)
    }

    ///
    /// Generate from the given grammar into the provided file path.
    ///
    fn write_to_file(&mut self, grammar: &Grammar, path: &Path) -> Result<(), Error> {
        let mut file = File::create(path).map_err(|e| write_file_error(path, e))?;
        self.write(grammar, &mut file)?;
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Modules
// ------------------------------------------------------------------------------------------------

pub mod code;

pub mod params;
