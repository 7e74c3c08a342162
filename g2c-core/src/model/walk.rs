/*!
Depth-first traversal of a normalized grammar.

The walk starts from every top-level derivation carrying an `output`
attribute and threads two pieces of state through the recursion: the
current *path* (the `%`/`@` encoding that parameter identity is derived
from) and the current recursion depth. Each visited node is classified and
dispatched to one of the seven callbacks of a [`GrammarWalker`].

The categorical and recursive callbacks return the choice taken: `None`
visits all alternatives (parameter enumeration), `Some(i)` prunes the
traversal to alternative `i` (code generation). Pruning is what lets code
generation warn about assignment entries the chosen path never touches.

Descent along the recursive branch of a recursive rule only happens while
`depth + 1 < max_depth`; the callback is still invoked at the boundary so
an emitter can exclude the recursive alternative from the domain.

*/

use crate::error::{missing_derivation, Error};
use crate::model::paths::erase_last;
use crate::model::{Grammar, NodeId, NodeKind};
use crate::syntax::{ATTR_OUTPUT, NAME_OR};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

pub trait GrammarWalker {
    fn call(
        &mut self,
        _grammar: &Grammar,
        _node: NodeId,
        _path: &str,
        _depth: usize,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn categorical(
        &mut self,
        _grammar: &Grammar,
        _node: NodeId,
        _path: &str,
        _depth: usize,
    ) -> Result<Option<usize>, Error> {
        Ok(None)
    }

    fn recursive(
        &mut self,
        _grammar: &Grammar,
        _node: NodeId,
        _path: &str,
        _depth: usize,
    ) -> Result<Option<usize>, Error> {
        Ok(None)
    }

    fn range(
        &mut self,
        _grammar: &Grammar,
        _node: NodeId,
        _path: &str,
        _depth: usize,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn copy(
        &mut self,
        _grammar: &Grammar,
        _node: NodeId,
        _path: &str,
        _depth: usize,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn cdata(
        &mut self,
        _grammar: &Grammar,
        _node: NodeId,
        _path: &str,
        _depth: usize,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn plain(
        &mut self,
        _grammar: &Grammar,
        _node: NodeId,
        _path: &str,
        _depth: usize,
    ) -> Result<(), Error> {
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

///
/// Walk every output-carrying top-level derivation, in document order.
///
pub fn walk_grammar(
    grammar: &Grammar,
    max_depth: usize,
    walker: &mut impl GrammarWalker,
) -> Result<(), Error> {
    for derivation in grammar.derivations() {
        if grammar.attribute(derivation, ATTR_OUTPUT).is_some() {
            walk_node(grammar, max_depth, walker, derivation, String::new(), 0)?;
        }
    }
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// Private Functions
// ------------------------------------------------------------------------------------------------

fn walk_node(
    grammar: &Grammar,
    max_depth: usize,
    walker: &mut impl GrammarWalker,
    node: NodeId,
    parent: String,
    depth: usize,
) -> Result<(), Error> {
    match grammar.kind(node) {
        NodeKind::Call => {
            walker.call(grammar, node, &parent, depth)?;
            let name = grammar.name(node);
            let path = format!("{parent}%{name}");
            let targets = grammar.derivations_named(name);
            if targets.is_empty() {
                return Err(missing_derivation(name));
            }
            for target in targets {
                walk_node(grammar, max_depth, walker, target, path.clone(), depth)?;
            }
        }
        NodeKind::Categorical => {
            // a rule at the root of a walk (output attribute) has no path
            // yet and seeds it with its own name
            let parent = if parent.is_empty() {
                grammar.name(node).to_string()
            } else {
                parent
            };
            let chosen = walker.categorical(grammar, node, &parent, depth)?;
            for (index, alternative) in grammar.alternatives(node).into_iter().enumerate() {
                if chosen.is_some_and(|choice| choice != index) {
                    continue;
                }
                let path = format!("{parent}%{index}");
                for child in alternative {
                    walk_node(grammar, max_depth, walker, child, path.clone(), depth)?;
                }
            }
        }
        NodeKind::Recursive => {
            let parent = if parent.is_empty() {
                grammar.name(node).to_string()
            } else {
                parent
            };
            let name = grammar.name(node).to_string();
            let chosen = walker.recursive(grammar, node, &format!("{parent}@{depth}"), depth)?;
            for (index, alternative) in grammar.alternatives(node).into_iter().enumerate() {
                if chosen.is_some_and(|choice| choice != index) {
                    continue;
                }
                let is_recursive = alternative
                    .iter()
                    .any(|&child| grammar.name(child) == name);
                if is_recursive {
                    if depth + 1 < max_depth {
                        for child in alternative {
                            if grammar.name(child) == name {
                                // the recursive call re-enters the same
                                // rule: its frame is already on the path
                                let mut path = parent.clone();
                                erase_last(&mut path, &format!("%{name}"));
                                walk_node(grammar, max_depth, walker, child, path, depth + 1)?;
                            } else {
                                let path = format!("{parent}@{depth}%{index}");
                                walk_node(grammar, max_depth, walker, child, path, depth + 1)?;
                            }
                        }
                    }
                } else {
                    for child in alternative {
                        let path = format!("{parent}@{depth}%{index}");
                        walk_node(grammar, max_depth, walker, child, path, depth + 1)?;
                    }
                }
            }
        }
        NodeKind::Range => {
            walker.range(grammar, node, &parent, depth)?;
        }
        NodeKind::Copy => {
            walker.copy(grammar, node, &parent, depth)?;
        }
        NodeKind::Cdata => {
            walker.cdata(grammar, node, &parent, depth)?;
        }
        NodeKind::Plain => {
            walker.plain(grammar, node, &parent, depth)?;
            for &child in grammar.children(node) {
                if grammar.name(child) == NAME_OR {
                    continue;
                }
                let path = if parent.is_empty() {
                    grammar.name(node).to_string()
                } else {
                    format!("{parent}%")
                };
                walk_node(grammar, max_depth, walker, child, path, depth)?;
            }
        }
    }
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::parse_grammar;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default)]
    struct Tracer {
        visits: Vec<(String, String)>,
    }

    impl GrammarWalker for Tracer {
        fn categorical(
            &mut self,
            _: &Grammar,
            _: NodeId,
            path: &str,
            _: usize,
        ) -> Result<Option<usize>, Error> {
            self.visits.push(("categorical".into(), path.into()));
            Ok(None)
        }

        fn recursive(
            &mut self,
            _: &Grammar,
            _: NodeId,
            path: &str,
            _: usize,
        ) -> Result<Option<usize>, Error> {
            self.visits.push(("recursive".into(), path.into()));
            Ok(None)
        }

        fn cdata(&mut self, _: &Grammar, _: NodeId, path: &str, _: usize) -> Result<(), Error> {
            self.visits.push(("cdata".into(), path.into()));
            Ok(())
        }
    }

    fn trace(source: &str, max_depth: usize) -> Vec<(String, String)> {
        let grammar = parse_grammar(source, ".", "test.xml").unwrap();
        let mut tracer = Tracer::default();
        walk_grammar(&grammar, max_depth, &mut tracer).unwrap();
        tracer.visits
    }

    #[test]
    fn test_walk_call_and_choice_paths() {
        let visits = trace(
            r#"<g><gr:derivations>
                 <start output="f.txt"><a/></start>
                 <a><![CDATA[x]]><or/><![CDATA[y]]></a>
               </gr:derivations></g>"#,
            3,
        );
        assert_eq!(
            visits,
            vec![
                ("categorical".to_string(), "start%a".to_string()),
                ("cdata".to_string(), "start%a%0".to_string()),
                ("cdata".to_string(), "start%a%1".to_string()),
            ]
        );
    }

    #[test]
    fn test_walk_recursion_is_depth_capped() {
        let visits = trace(
            r#"<g><gr:derivations>
                 <start output="f.txt"><l/></start>
                 <l><![CDATA[.]]><or/><![CDATA[.]]><l/></l>
               </gr:derivations></g>"#,
            2,
        );
        let recursive: Vec<&str> = visits
            .iter()
            .filter(|(kind, _)| kind == "recursive")
            .map(|(_, path)| path.as_str())
            .collect();
        assert_eq!(recursive, vec!["start%l@0", "start%l@1"]);
    }

    #[test]
    fn test_walk_prunes_on_choice() {
        struct Chooser(Vec<String>);
        impl GrammarWalker for Chooser {
            fn categorical(
                &mut self,
                _: &Grammar,
                _: NodeId,
                _: &str,
                _: usize,
            ) -> Result<Option<usize>, Error> {
                Ok(Some(1))
            }
            fn cdata(&mut self, g: &Grammar, n: NodeId, _: &str, _: usize) -> Result<(), Error> {
                self.0.push(g.text(n).unwrap().to_string());
                Ok(())
            }
        }
        let grammar = parse_grammar(
            r#"<g><gr:derivations>
                 <start output="f.txt"><a/></start>
                 <a><![CDATA[x]]><or/><![CDATA[y]]></a>
               </gr:derivations></g>"#,
            ".",
            "test.xml",
        )
        .unwrap();
        let mut chooser = Chooser(Vec::new());
        walk_grammar(&grammar, usize::MAX, &mut chooser).unwrap();
        assert_eq!(chooser.0, vec!["y".to_string()]);
    }

    #[test]
    fn test_walk_missing_derivation_is_fatal() {
        let grammar = parse_grammar(
            r#"<g><gr:derivations>
                 <start output="f.txt"><ghost/></start>
               </gr:derivations></g>"#,
            ".",
            "test.xml",
        )
        .unwrap();
        let mut tracer = Tracer::default();
        let result = walk_grammar(&grammar, 3, &mut tracer);
        assert!(matches!(result, Err(Error::MissingDerivation { .. })));
    }
}
