/*!
Reads grammar documents from XML files into the [`Grammar`] model.

The document root (conventionally `gr:grammar`) is a wrapper; its first
element child is the derivations list and becomes the model root. CDATA
sections become text blocks verbatim; ordinary character data becomes a
text block only when it contains something other than whitespace. Parse
failures are fatal and carry the file together with the line and column
computed from the reader's byte offset.

Only the main grammar's `gr:include` elements are honored: each one is
resolved relative to the main grammar's directory, loaded, and its
top-level derivations appended to the main derivations list.

*/

use crate::error::{
    grammar_parse_error, grammar_read_error, missing_attribute, missing_derivations_list, Result,
};
use crate::model::{Grammar, NodeId};
use crate::syntax::{ATTR_SOURCE, NAME_INCLUDE};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::read_to_string;
use std::path::Path;
use tracing::debug;

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

///
/// Load the main grammar document, merging every included file's top-level
/// derivations into its derivations list.
///
pub fn load_grammar<P>(path: P) -> Result<Grammar>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let base_path = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    let mut grammar = load_document(path)?;

    let includes: Vec<(NodeId, String)> = {
        let mut includes = Vec::new();
        for derivation in grammar.derivations() {
            if grammar.name(derivation) == NAME_INCLUDE {
                let source = grammar
                    .attribute(derivation, ATTR_SOURCE)
                    .ok_or_else(|| missing_attribute(NAME_INCLUDE, ATTR_SOURCE))?;
                includes.push((derivation, source.to_string()));
            }
        }
        includes
    };

    for (node, source) in includes {
        grammar.remove(node);
        let include_path = base_path.join(&source);
        debug!("including grammar {}", include_path.display());
        let included = load_document(&include_path)?;
        for derivation in included.derivations() {
            let copy = grammar.import_from(&included, derivation);
            grammar.append_child(grammar.root(), copy);
        }
    }

    Ok(grammar)
}

///
/// Load a grammar document without processing includes; used for overwrite
/// grammars, whose includes are ignored.
///
pub fn load_document<P>(path: P) -> Result<Grammar>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let source = read_to_string(path).map_err(|e| grammar_read_error(path, e))?;
    let base_path = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    parse_grammar(&source, &base_path, path)
}

///
/// Parse a grammar document from a string. `base_path` is the directory
/// copy directives resolve against; `file` is only used in error messages.
///
pub fn parse_grammar<P1, P2>(source: &str, base_path: P1, file: P2) -> Result<Grammar>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let file = file.as_ref();
    let mut grammar = Grammar::new(base_path);
    let mut reader = Reader::from_str(source);

    // The stack mirrors open elements: `None` stands for the document root
    // wrapper, which has no node in the model.
    let mut stack: Vec<Option<NodeId>> = Vec::new();
    let mut derivations: Option<NodeId> = None;

    loop {
        let position = usize::try_from(reader.buffer_position()).unwrap_or(0);
        match reader.read_event() {
            Err(e) => {
                let at = usize::try_from(reader.error_position()).unwrap_or(position);
                let (line, column) = line_and_column(source, at);
                return Err(grammar_parse_error(file, line, column, e.to_string()));
            }
            Ok(Event::Start(element)) => {
                let node = open_element(&mut grammar, &element, &stack, &mut derivations)
                    .map_err(|message| {
                        let (line, column) = line_and_column(source, position);
                        grammar_parse_error(file, line, column, message)
                    })?;
                stack.push(node);
            }
            Ok(Event::Empty(element)) => {
                open_element(&mut grammar, &element, &stack, &mut derivations).map_err(
                    |message| {
                        let (line, column) = line_and_column(source, position);
                        grammar_parse_error(file, line, column, message)
                    },
                )?;
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(text)) => {
                if let Some(Some(parent)) = stack.last() {
                    let content = text.unescape().map_err(|e| {
                        let (line, column) = line_and_column(source, position);
                        grammar_parse_error(file, line, column, e.to_string())
                    })?;
                    if !content.trim().is_empty() {
                        let node = grammar.new_text(content.into_owned());
                        grammar.append_child(*parent, node);
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(Some(parent)) = stack.last() {
                    let content = std::str::from_utf8(&data.into_inner())?.to_string();
                    let node = grammar.new_text(content);
                    grammar.append_child(*parent, node);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
        }
    }

    match derivations {
        Some(_) => Ok(grammar),
        None => Err(missing_derivations_list(file)),
    }
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

/// Create the model node for an opened element and attach it. Returns
/// `None` for the document root wrapper, which is not modelled.
fn open_element(
    grammar: &mut Grammar,
    element: &BytesStart<'_>,
    stack: &[Option<NodeId>],
    derivations: &mut Option<NodeId>,
) -> std::result::Result<Option<NodeId>, String> {
    let name = std::str::from_utf8(element.name().as_ref())
        .map_err(|e| e.to_string())?
        .to_string();

    let node = match stack.last() {
        // The outermost element is the document root wrapper.
        None => return Ok(None),
        // The first element child of the wrapper is the derivations list.
        Some(None) if derivations.is_none() => {
            let root = grammar.root();
            *derivations = Some(root);
            root
        }
        // Any later sibling of the derivations list is outside the model.
        Some(None) => grammar.new_element(name),
        Some(Some(parent)) => {
            let parent = *parent;
            let node = grammar.new_element(name);
            grammar.append_child(parent, node);
            node
        }
    };

    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| e.to_string())?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| e.to_string())?
            .into_owned();
        grammar.set_attribute(node, key, value);
    }

    Ok(Some(node))
}

/// One-based line and column of a byte offset into the source.
fn line_and_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = before
        .rfind('\n')
        .map(|at| offset - at)
        .unwrap_or(offset + 1);
    (line, column)
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::NodeKind;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Grammar {
        parse_grammar(source, ".", "test.xml").unwrap()
    }

    #[test]
    fn test_parse_minimal() {
        let grammar = parse(
            r#"<gr:grammar xmlns:gr="g2c"><gr:derivations>
                 <start output="f.txt"><a/></start>
                 <a><![CDATA[x]]><or/><![CDATA[y]]></a>
               </gr:derivations></gr:grammar>"#,
        );
        let derivations = grammar.derivations();
        assert_eq!(derivations.len(), 2);
        assert_eq!(grammar.name(derivations[0]), "start");
        assert_eq!(grammar.attribute(derivations[0], "output"), Some("f.txt"));
        assert_eq!(grammar.kind(derivations[1]), NodeKind::Categorical);
    }

    #[test]
    fn test_whitespace_text_is_skipped() {
        let grammar = parse(
            "<gr:grammar><gr:derivations>\n  <a>\n    <b/>\n  </a>\n</gr:derivations></gr:grammar>",
        );
        let a = grammar.derivations()[0];
        assert_eq!(grammar.children(a).len(), 1);
    }

    #[test]
    fn test_cdata_whitespace_is_kept() {
        let grammar = parse("<g><gr:derivations><a><![CDATA[ ]]></a></gr:derivations></g>");
        let a = grammar.derivations()[0];
        assert_eq!(grammar.text(grammar.children(a)[0]), Some(" "));
    }

    #[test]
    fn test_parse_failure_has_position() {
        let result = parse_grammar("<g>\n<a></b></g>", ".", "bad.xml");
        match result {
            Err(Error::GrammarParse { line, .. }) => assert!(line >= 1),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_derivations_list() {
        let result = parse_grammar("<g></g>", ".", "empty.xml");
        assert!(matches!(result, Err(Error::MissingDerivationsList { .. })));
    }
}
