use g2c_core::error::Error;
use g2c_core::load::parse_grammar;
use g2c_core::model::normalize::normalize;
use g2c_core::model::{Grammar, NodeKind};
use pretty_assertions::assert_eq;

fn normalized(source: &str) -> Grammar {
    let mut grammar = parse_grammar(source, ".", "test.xml").unwrap();
    normalize(&mut grammar, None).unwrap();
    grammar
}

// ------------------------------------------------------------------------------------------------
// Append Disjunctions
// ------------------------------------------------------------------------------------------------

#[test]
fn test_append_disjunction_extends_target() {
    // the trailing text block keeps the call site from being merged away,
    // so the appended rule itself stays observable
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><a/><![CDATA[#]]></start>
             <a><![CDATA[a]]></a>
             <a append="disjunction"><![CDATA[b]]></a>
           </gr:derivations></g>"#,
    );
    let rules = grammar.derivations_named("a");
    assert_eq!(rules.len(), 1);
    let a = rules[0];
    assert_eq!(grammar.kind(a), NodeKind::Categorical);
    let alternatives = grammar.alternatives(a);
    assert_eq!(alternatives.len(), 2);
    assert_eq!(grammar.text(alternatives[0][0]), Some("a"));
    assert_eq!(grammar.text(alternatives[1][0]), Some("b"));
}

#[test]
fn test_append_disjunction_without_target_fails() {
    let mut grammar = parse_grammar(
        r#"<g><gr:derivations>
             <start output="f.txt"><a/></start>
             <a append="disjunction"><![CDATA[b]]></a>
           </gr:derivations></g>"#,
        ".",
        "test.xml",
    )
    .unwrap();
    let result = normalize(&mut grammar, None);
    assert!(matches!(result, Err(Error::MissingAppendTarget { .. })));
}

// ------------------------------------------------------------------------------------------------
// Overwrite
// ------------------------------------------------------------------------------------------------

#[test]
fn test_overwrite_replaces_derivation_in_place() {
    let mut grammar = parse_grammar(
        r#"<g><gr:derivations>
             <start output="f.txt"><a/><![CDATA[#]]></start>
             <a><![CDATA[old]]></a>
           </gr:derivations></g>"#,
        ".",
        "main.xml",
    )
    .unwrap();
    let overwrite = parse_grammar(
        r#"<g><gr:derivations>
             <a><![CDATA[new]]></a>
           </gr:derivations></g>"#,
        ".",
        "overwrite.xml",
    )
    .unwrap();
    normalize(&mut grammar, Some(&overwrite)).unwrap();
    // the replacement is a non-choice and gets inlined at the call site
    let start = grammar.derivations_named("start")[0];
    assert_eq!(grammar.text(grammar.children(start)[0]), Some("new#"));
}

#[test]
fn test_overwrite_without_target_fails() {
    let mut grammar = parse_grammar(
        r#"<g><gr:derivations>
             <start output="f.txt"><![CDATA[x]]></start>
           </gr:derivations></g>"#,
        ".",
        "main.xml",
    )
    .unwrap();
    let overwrite = parse_grammar(
        r#"<g><gr:derivations><ghost><![CDATA[y]]></ghost></gr:derivations></g>"#,
        ".",
        "overwrite.xml",
    )
    .unwrap();
    let result = normalize(&mut grammar, Some(&overwrite));
    assert!(matches!(result, Err(Error::MissingOverwriteTarget { .. })));
}

// ------------------------------------------------------------------------------------------------
// Pruning
// ------------------------------------------------------------------------------------------------

#[test]
fn test_empty_derivation_removed_with_its_calls() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><![CDATA[k]]><dead/></start>
             <dead></dead>
           </gr:derivations></g>"#,
    );
    assert_eq!(grammar.derivations().len(), 1);
    let start = grammar.derivations()[0];
    assert_eq!(grammar.children(start).len(), 1);
    assert_eq!(grammar.text(grammar.children(start)[0]), Some("k"));
}

#[test]
fn test_useless_ors_are_removed() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><a/></start>
             <a><or/><![CDATA[x]]><or/><or/><![CDATA[y]]><or/></a>
           </gr:derivations></g>"#,
    );
    // after cleanup `a` is a plain two-way choice and merges into `start`
    let start = grammar.derivations()[0];
    let children = grammar.children(start).to_vec();
    assert_eq!(children.len(), 3);
    assert_eq!(grammar.text(children[0]), Some("x"));
    assert_eq!(grammar.name(children[1]), "or");
    assert_eq!(grammar.text(children[2]), Some("y"));
}

#[test]
fn test_no_container_begins_or_ends_with_or() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><a/><![CDATA[#]]></start>
             <a><or/><or/><![CDATA[x]]><or/><![CDATA[y]]><or/><or/></a>
           </gr:derivations></g>"#,
    );
    for node in grammar.all_nodes() {
        if !grammar.is_element(node) || !grammar.has_children(node) {
            continue;
        }
        let children = grammar.children(node);
        assert_ne!(grammar.name(children[0]), "or");
        assert_ne!(grammar.name(*children.last().unwrap()), "or");
        for pair in children.windows(2) {
            assert!(!(grammar.name(pair[0]) == "or" && grammar.name(pair[1]) == "or"));
        }
    }
}

#[test]
fn test_unused_rule_is_removed() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><![CDATA[k]]></start>
             <lonely><![CDATA[x]]><or/><![CDATA[y]]></lonely>
           </gr:derivations></g>"#,
    );
    assert!(grammar.derivations_named("lonely").is_empty());
}

#[test]
fn test_duplicate_rule_with_differing_attributes_is_dropped() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><![CDATA[k]]></start>
             <b output="x.txt"><![CDATA[1]]></b>
             <b output="y.txt"><![CDATA[2]]></b>
           </gr:derivations></g>"#,
    );
    let rules = grammar.derivations_named("b");
    assert_eq!(rules.len(), 1);
    assert_eq!(grammar.attribute(rules[0], "output"), Some("x.txt"));
}

// ------------------------------------------------------------------------------------------------
// Inlining
// ------------------------------------------------------------------------------------------------

#[test]
fn test_non_choice_is_inlined_and_adjacent_text_merged() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><word/><word/></start>
             <word><![CDATA[w]]></word>
           </gr:derivations></g>"#,
    );
    assert_eq!(grammar.derivations().len(), 1);
    let start = grammar.derivations()[0];
    let children = grammar.children(start).to_vec();
    assert_eq!(children.len(), 1);
    assert_eq!(grammar.text(children[0]), Some("ww"));
}

#[test]
fn test_disjunction_is_merged_into_caller() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><a/></start>
             <a><![CDATA[x]]><or/><![CDATA[y]]></a>
           </gr:derivations></g>"#,
    );
    assert_eq!(grammar.derivations().len(), 1);
    let start = grammar.derivations()[0];
    assert_eq!(grammar.kind(start), NodeKind::Categorical);
    assert_eq!(grammar.alternatives(start).len(), 2);
}

#[test]
fn test_disjunction_with_blocking_neighbor_is_kept() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><a/><![CDATA[#]]></start>
             <a><![CDATA[x]]><or/><![CDATA[y]]></a>
           </gr:derivations></g>"#,
    );
    assert_eq!(grammar.derivations_named("a").len(), 1);
    let start = grammar.derivations_named("start")[0];
    assert_eq!(grammar.name(grammar.children(start)[0]), "a");
}

// ------------------------------------------------------------------------------------------------
// Recursion Simplification
// ------------------------------------------------------------------------------------------------

#[test]
fn test_simple_recursion_is_simplified() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><l/></start>
             <l><![CDATA[.]]><or/><![CDATA[.]]><l/></l>
           </gr:derivations></g>"#,
    );
    // the call site received a prepended stop element
    let start = grammar.derivations_named("start")[0];
    let children = grammar.children(start).to_vec();
    assert_eq!(children.len(), 2);
    assert_eq!(grammar.text(children[0]), Some("."));
    assert_eq!(grammar.name(children[1]), "l");
    // the stopping alternative became the single-space placeholder
    let l = grammar.derivations_named("l")[0];
    let alternatives = grammar.alternatives(l);
    assert_eq!(alternatives[0].len(), 1);
    assert_eq!(grammar.text(alternatives[0][0]), Some(" "));
    assert_eq!(alternatives[1].len(), 2);
}

#[test]
fn test_mirrored_recursion_shape_is_simplified() {
    // A ::= BA | B with a childless call as B
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><l/><![CDATA[#]]></start>
             <l><b/><l/><or/><b/></l>
             <b><![CDATA[x]]><or/><![CDATA[y]]></b>
           </gr:derivations></g>"#,
    );
    let start = grammar.derivations_named("start")[0];
    let children = grammar.children(start).to_vec();
    assert_eq!(grammar.name(children[0]), "b");
    assert_eq!(grammar.name(children[1]), "l");
    let l = grammar.derivations_named("l")[0];
    let alternatives = grammar.alternatives(l);
    assert_eq!(alternatives[0].len(), 2);
    assert_eq!(grammar.text(alternatives[1][0]), Some(" "));
}

#[test]
fn test_complex_recursion_is_left_alone() {
    // A ::= C | DA does not match any of the four simplifiable shapes;
    // the later merge pass still splices C into the alternative list
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><l/><![CDATA[#]]></start>
             <l><c/><or/><d/><l/></l>
             <c><![CDATA[1]]><or/><![CDATA[2]]></c>
             <d><![CDATA[3]]><or/><![CDATA[4]]></d>
           </gr:derivations></g>"#,
    );
    // no stop prefix was inserted before the call site
    let start = grammar.derivations_named("start")[0];
    assert_eq!(grammar.name(grammar.children(start)[0]), "l");
    let l = grammar.derivations_named("l")[0];
    let alternatives = grammar.alternatives(l);
    assert_eq!(alternatives.len(), 3);
    let recursive = alternatives.last().unwrap();
    assert_eq!(grammar.name(recursive[0]), "d");
    assert_eq!(grammar.name(recursive[1]), "l");
}

// ------------------------------------------------------------------------------------------------
// Call Renaming
// ------------------------------------------------------------------------------------------------

#[test]
fn test_repeated_calls_in_one_alternative_are_renamed() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><a/><![CDATA[-]]><a/></start>
             <a><![CDATA[0]]><or/><![CDATA[1]]></a>
           </gr:derivations></g>"#,
    );
    let start = grammar.derivations_named("start")[0];
    let children = grammar.children(start).to_vec();
    assert_eq!(grammar.name(children[0]), "a");
    assert_eq!(grammar.name(children[2]), "a2");
    // the derivation was duplicated under the new name
    let a2 = grammar.derivations_named("a2");
    assert_eq!(a2.len(), 1);
    assert_eq!(grammar.alternatives(a2[0]).len(), 2);
}

#[test]
fn test_calls_in_different_alternatives_are_not_renamed() {
    let grammar = normalized(
        r#"<g><gr:derivations>
             <start output="f.txt"><c/><![CDATA[#]]></start>
             <c><a/><or/><a/><![CDATA[!]]></c>
             <a><![CDATA[0]]><or/><![CDATA[1]]></a>
           </gr:derivations></g>"#,
    );
    assert!(grammar.derivations_named("a2").is_empty());
}
