use g2c_core::error::Error;
use g2c_generate::code::CodeGenerator;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::fs;

mod common;
use common::{grammar, grammar_with_base};

fn assignment(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

const LINEAR: &str = r#"<g><gr:derivations>
  <start output="f.txt"><a/></start>
  <a><![CDATA[x]]><or/><![CDATA[y]]></a>
</gr:derivations></g>"#;

const CONDITIONAL: &str = r#"<g><gr:derivations>
  <start output="f.txt"><a/></start>
  <a><![CDATA[p]]><or/><b/><![CDATA[!]]></a>
  <b><![CDATA[r]]><or/><![CDATA[s]]></b>
</gr:derivations></g>"#;

// ------------------------------------------------------------------------------------------------
// Selection
// ------------------------------------------------------------------------------------------------

#[test]
fn test_chosen_alternative_is_written() {
    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(assignment(&[("start", "1")]), target.path(), true);
    generator.generate(&grammar(LINEAR)).unwrap();
    assert_eq!(fs::read_to_string(target.path().join("f.txt")).unwrap(), "y\n");
}

#[test]
fn test_pruned_walk_consumes_only_selected_path() {
    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(
        assignment(&[("start", "1"), ("start%1%b", "0")]),
        target.path(),
        true,
    );
    generator.generate(&grammar(CONDITIONAL)).unwrap();
    assert_eq!(
        fs::read_to_string(target.path().join("f.txt")).unwrap(),
        "r!\n"
    );
}

#[test]
fn test_unselected_branch_parameter_is_merely_unused() {
    let target = tempfile::tempdir().unwrap();
    // choice 0 never reaches b, its entry is reported and ignored
    let mut generator = CodeGenerator::new(
        assignment(&[("start", "0"), ("start%1%b", "0")]),
        target.path(),
        true,
    );
    generator.generate(&grammar(CONDITIONAL)).unwrap();
    assert_eq!(
        fs::read_to_string(target.path().join("f.txt")).unwrap(),
        "p\n"
    );
}

#[test]
fn test_missing_parameter_is_fatal() {
    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(HashMap::new(), target.path(), true);
    let result = generator.generate(&grammar(LINEAR));
    assert!(matches!(result, Err(Error::MissingParameter { .. })));
}

#[test]
fn test_non_numeric_choice_is_fatal() {
    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(assignment(&[("start", "left")]), target.path(), true);
    let result = generator.generate(&grammar(LINEAR));
    assert!(matches!(result, Err(Error::InvalidParameterValue { .. })));
}

#[test]
fn test_range_value_is_substituted() {
    let source = r#"<g><gr:derivations>
      <start output="f.txt"><![CDATA[steps = ]]><n type="int" min="1" max="99"/></start>
    </gr:derivations></g>"#;
    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(assignment(&[("start", "42")]), target.path(), true);
    generator.generate(&grammar(source)).unwrap();
    assert_eq!(
        fs::read_to_string(target.path().join("f.txt")).unwrap(),
        "steps = 42\n"
    );
}

#[test]
fn test_recursive_assignment_unrolls_to_requested_depth() {
    let source = r#"<g><gr:derivations>
      <start output="f.txt"><l/></start>
      <l><![CDATA[.]]><or/><![CDATA[.]]><l/></l>
    </gr:derivations></g>"#;
    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(
        assignment(&[("start%l@0", "1"), ("start%l@1", "0")]),
        target.path(),
        true,
    );
    generator.generate(&grammar(source)).unwrap();
    // the prepended stop, one unrolled frame, then the placeholder
    assert_eq!(
        fs::read_to_string(target.path().join("f.txt")).unwrap(),
        ".. \n"
    );
}

// ------------------------------------------------------------------------------------------------
// Re-indentation
// ------------------------------------------------------------------------------------------------

const INDENTED: &str = "<g><gr:derivations><start output=\"f.txt\"><![CDATA[    line1\n      line2\n    line3\n]]></start></gr:derivations></g>";

#[test]
fn test_output_is_reindented() {
    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(HashMap::new(), target.path(), true);
    generator.generate(&grammar(INDENTED)).unwrap();
    assert_eq!(
        fs::read_to_string(target.path().join("f.txt")).unwrap(),
        "line1\n  line2\n  line3\n"
    );
}

#[test]
fn test_reindentation_can_be_suppressed() {
    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(HashMap::new(), target.path(), false);
    generator.generate(&grammar(INDENTED)).unwrap();
    assert_eq!(
        fs::read_to_string(target.path().join("f.txt")).unwrap(),
        "    line1\n      line2\n    line3\n"
    );
}

// ------------------------------------------------------------------------------------------------
// Output Files
// ------------------------------------------------------------------------------------------------

#[test]
fn test_each_output_rule_writes_its_own_file() {
    let source = r#"<g><gr:derivations>
      <one output="sub/one.txt"><![CDATA[1]]></one>
      <two output="two.txt"><![CDATA[2]]></two>
    </gr:derivations></g>"#;
    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(HashMap::new(), target.path(), true);
    generator.generate(&grammar(source)).unwrap();
    assert_eq!(
        fs::read_to_string(target.path().join("sub/one.txt")).unwrap(),
        "1\n"
    );
    assert_eq!(
        fs::read_to_string(target.path().join("two.txt")).unwrap(),
        "2\n"
    );
}

// ------------------------------------------------------------------------------------------------
// Copy Directives
// ------------------------------------------------------------------------------------------------

#[test]
fn test_copy_directives_resolve_against_grammar_directory() {
    let source_dir = tempfile::tempdir().unwrap();
    fs::write(source_dir.path().join("data.txt"), "payload").unwrap();
    fs::create_dir(source_dir.path().join("lib")).unwrap();
    fs::write(source_dir.path().join("lib/api.h"), "header").unwrap();
    fs::write(source_dir.path().join("lib/api.c"), "impl").unwrap();

    let source = r#"<g><gr:derivations>
      <start output="f.txt"><![CDATA[x]]></start>
      <files source="data.txt" destination="out/data.txt"/>
      <headers source_dir="lib" destination_dir="lib" regex_filter="\.h$"/>
    </gr:derivations></g>"#;

    let target = tempfile::tempdir().unwrap();
    let mut generator = CodeGenerator::new(HashMap::new(), target.path(), true);
    generator
        .generate(&grammar_with_base(source, source_dir.path()))
        .unwrap();

    assert_eq!(
        fs::read_to_string(target.path().join("out/data.txt")).unwrap(),
        "payload"
    );
    assert_eq!(
        fs::read_to_string(target.path().join("lib/api.h")).unwrap(),
        "header"
    );
    assert!(!target.path().join("lib/api.c").exists());
}
