use g2c_core::load::{load_document, load_grammar};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn test_includes_are_merged_into_main_grammar() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("main.xml"),
        r#"<gr:grammar xmlns:gr="g2c"><gr:derivations>
             <start output="f.txt"><extra/></start>
             <gr:include source="extra.xml"/>
           </gr:derivations></gr:grammar>"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("extra.xml"),
        r#"<gr:grammar xmlns:gr="g2c"><gr:derivations>
             <extra><![CDATA[x]]><or/><![CDATA[y]]></extra>
           </gr:derivations></gr:grammar>"#,
    )
    .unwrap();

    let grammar = load_grammar(dir.path().join("main.xml")).unwrap();
    assert_eq!(grammar.derivations().len(), 2);
    assert_eq!(grammar.derivations_named("extra").len(), 1);
    assert!(grammar
        .derivations()
        .iter()
        .all(|&id| grammar.name(id) != "gr:include"));
    assert_eq!(grammar.base_path(), dir.path());
}

#[test]
fn test_load_document_ignores_includes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("overwrite.xml"),
        r#"<gr:grammar xmlns:gr="g2c"><gr:derivations>
             <a><![CDATA[z]]></a>
             <gr:include source="missing.xml"/>
           </gr:derivations></gr:grammar>"#,
    )
    .unwrap();

    let grammar = load_document(dir.path().join("overwrite.xml")).unwrap();
    assert_eq!(grammar.derivations().len(), 2);
}

#[test]
fn test_missing_grammar_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_grammar(dir.path().join("absent.xml")).is_err());
}
