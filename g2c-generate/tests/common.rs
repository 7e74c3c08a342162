use g2c_core::load::parse_grammar;
use g2c_core::model::normalize::normalize;
use g2c_core::model::Grammar;
use std::path::Path;

#[allow(dead_code)]
pub fn grammar(source: &str) -> Grammar {
    grammar_with_base(source, Path::new("."))
}

#[allow(dead_code)]
pub fn grammar_with_base(source: &str, base: &Path) -> Grammar {
    let mut grammar = parse_grammar(source, base, "test.xml").unwrap();
    normalize(&mut grammar, None).unwrap();
    grammar
}
