/*!
The rewrite pipeline that brings a loaded grammar into canonical form.

The pipeline order is load-bearing: every pass assumes the invariants
established by the passes before it. Recursion simplification in
particular must run before non-choice removal, which could otherwise make
a simple recursive rule undetectable.

Passes report their actions through `tracing`; none of them fails on an
odd-but-legal grammar, only on broken references (a missing overwrite or
append target).

*/

use crate::error::{missing_append_target, missing_overwrite_target, Result};
use crate::model::{Grammar, NodeId, NodeValue};
use crate::syntax::{
    ATTR_APPEND, ATTR_DESTINATION, ATTR_DESTINATION_DIR, ATTR_OUTPUT, NAME_OR, VALUE_DISJUNCTION,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

///
/// Apply the full normalization pipeline to `grammar`. When an overwrite
/// grammar is supplied its derivations replace the same-named derivations
/// of the main grammar first.
///
pub fn normalize(grammar: &mut Grammar, overwrite: Option<&Grammar>) -> Result<()> {
    if let Some(overwrite) = overwrite {
        overwrite_derivations(grammar, overwrite)?;
    }
    append_disjunctions(grammar)?;
    remove_empty_text_blocks(grammar);
    remove_empty_derivations(grammar);
    remove_useless_ors(grammar);
    simplify_recursions(grammar);
    remove_non_choices(grammar);
    merge_disjunctions(grammar);
    remove_duplicates(grammar);
    remove_unused_rules(grammar);
    merge_text_blocks(grammar);
    warn_for_duplicate_derivations(grammar);
    rename_calls(grammar);
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// Private Functions ❱ Merging Grammars
// ------------------------------------------------------------------------------------------------

/// Replace each derivation of the main grammar that the overwrite grammar
/// redefines, in place.
fn overwrite_derivations(grammar: &mut Grammar, overwrite: &Grammar) -> Result<()> {
    for derivation in overwrite.derivations() {
        let name = overwrite.name(derivation).to_string();
        let target = grammar
            .derivations_named(&name)
            .first()
            .copied()
            .ok_or_else(|| missing_overwrite_target(&name))?;
        info!("overwriting derivation {name}");
        let replacement = grammar.import_from(overwrite, derivation);
        grammar.insert_after(target, replacement);
        grammar.remove(target);
    }
    Ok(())
}

/// `append="disjunction"` extends the same-named derivation with an `or`
/// and the appender's children, then the appender is deleted.
fn append_disjunctions(grammar: &mut Grammar) -> Result<()> {
    let appenders: Vec<NodeId> = grammar
        .derivations()
        .into_iter()
        .filter(|&id| grammar.attribute(id, ATTR_APPEND) == Some(VALUE_DISJUNCTION))
        .collect();
    for appender in appenders {
        let name = grammar.name(appender).to_string();
        let target = grammar
            .derivations_named(&name)
            .into_iter()
            .find(|&id| grammar.attribute(id, ATTR_APPEND).is_none())
            .ok_or_else(|| missing_append_target(&name))?;
        info!("appending disjunction to derivation {name}");
        let separator = grammar.new_element(NAME_OR);
        grammar.append_child(target, separator);
        for child in grammar.children(appender).to_vec() {
            let copy = grammar.deep_copy(child);
            grammar.append_child(target, copy);
        }
        grammar.remove(appender);
    }
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// Private Functions ❱ Pruning
// ------------------------------------------------------------------------------------------------

/// Empty text blocks can be left over from merging; drop them.
fn remove_empty_text_blocks(grammar: &mut Grammar) {
    for derivation in grammar.derivations() {
        for child in grammar.children(derivation).to_vec() {
            if grammar.text(child) == Some("") {
                grammar.remove(child);
            }
        }
    }
}

/// A derivation with no attributes, no children, and no text is deleted
/// together with every occurrence of its name in the tree.
fn remove_empty_derivations(grammar: &mut Grammar) {
    let empty: Vec<String> = grammar
        .derivations()
        .into_iter()
        .filter(|&id| !grammar.has_children(id) && !grammar.has_attributes(id))
        .map(|id| grammar.name(id).to_string())
        .collect();
    for name in empty {
        info!("Removing all occurrences of empty rule {name}.");
        for node in grammar.elements_named(&name) {
            if grammar.is_alive(node) {
                grammar.remove(node);
            }
        }
    }
}

/// Drop leading, trailing, and consecutive `or` separators in every
/// container.
fn remove_useless_ors(grammar: &mut Grammar) {
    for container in grammar.all_nodes() {
        if !grammar.is_element(container) || grammar.or_count(container) == 0 {
            continue;
        }
        let children = grammar.children(container).to_vec();
        let mut was_or = true;
        let mut to_remove = Vec::new();
        let mut kept_trailing_or = None;
        for child in children {
            if grammar.name(child) == NAME_OR {
                if was_or {
                    to_remove.push(child);
                } else {
                    kept_trailing_or = Some(child);
                }
                was_or = true;
            } else {
                was_or = false;
                kept_trailing_or = None;
            }
        }
        if let Some(trailing) = kept_trailing_or {
            to_remove.push(trailing);
        }
        for child in to_remove {
            debug!(
                "removing useless or separator in {}",
                grammar.name(container)
            );
            grammar.remove(child);
        }
    }
}

/// A derivation without `output`, `destination`, or `destination_dir` that
/// no remaining call references is deleted.
fn remove_unused_rules(grammar: &mut Grammar) {
    for derivation in grammar.derivations() {
        if !grammar.is_alive(derivation) || has_keep_attribute(grammar, derivation) {
            continue;
        }
        let name = grammar.name(derivation).to_string();
        let used = grammar
            .call_sites(&name)
            .into_iter()
            .any(|site| site != derivation);
        if !used {
            info!("Removing unused rule {name}.");
            grammar.remove(derivation);
        }
    }
}

/// Among same-named derivations, a later one whose attribute values all
/// differ from the first's is a stale duplicate and is dropped.
fn remove_duplicates(grammar: &mut Grammar) {
    let derivations = grammar.derivations();
    for &first in &derivations {
        for &second in &derivations {
            if first == second
                || !grammar.is_alive(first)
                || !grammar.is_alive(second)
                || grammar.name(first) != grammar.name(second)
            {
                continue;
            }
            let same = grammar.attributes(first).iter().all(|(key, value)| {
                grammar.attribute(second, key).unwrap_or("") != value.as_str()
            });
            if same {
                info!("Removing duplicate rule {}.", grammar.name(second));
                grammar.remove(second);
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Private Functions ❱ Inlining
// ------------------------------------------------------------------------------------------------

/// A derivation with no `or` and no attributes represents no choice; its
/// content is copied to every call site and the derivation deleted.
fn remove_non_choices(grammar: &mut Grammar) {
    let candidates: Vec<NodeId> = grammar
        .derivations()
        .into_iter()
        .filter(|&id| {
            grammar.is_element(id)
                && grammar.or_count(id) == 0
                && !grammar.has_attributes(id)
        })
        .collect();
    for derivation in candidates {
        if !grammar.is_alive(derivation) {
            continue;
        }
        let name = grammar.name(derivation).to_string();
        for site in grammar.call_sites(&name) {
            if site == derivation || !grammar.is_alive(site) {
                continue;
            }
            debug!("inlining non-choice rule {name}");
            inline_children_at(grammar, derivation, site);
            grammar.remove(site);
        }
        grammar.remove(derivation);
    }
}

/// A non-recursive derivation with no attributes can be spliced into a
/// caller's alternative list wherever both neighbors are absent or `or`;
/// it is deleted only if every call site accepted the splice.
fn merge_disjunctions(grammar: &mut Grammar) {
    let candidates: Vec<NodeId> = grammar
        .derivations()
        .into_iter()
        .filter(|&id| grammar.is_element(id) && !grammar.has_attributes(id))
        .collect();
    for derivation in candidates {
        if !grammar.is_alive(derivation) {
            continue;
        }
        let name = grammar.name(derivation).to_string();
        let recursive = grammar
            .children(derivation)
            .iter()
            .any(|&child| grammar.name(child) == name);
        if recursive {
            continue;
        }
        let mut substitution_done = false;
        let mut do_not_delete = false;
        for site in grammar.call_sites(&name) {
            if site == derivation || !grammar.is_alive(site) {
                continue;
            }
            let left_ok = grammar
                .previous_sibling(site)
                .map(|left| grammar.name(left) == NAME_OR)
                .unwrap_or(true);
            let right_ok = grammar
                .next_sibling(site)
                .map(|right| grammar.name(right) == NAME_OR)
                .unwrap_or(true);
            if !left_ok || !right_ok {
                do_not_delete = true;
                continue;
            }
            info!("merging disjunctions of {name} into a call site");
            inline_children_at(grammar, derivation, site);
            grammar.remove(site);
            substitution_done = true;
        }
        if substitution_done && !do_not_delete {
            info!("deleting merged derivation {name}");
            grammar.remove(derivation);
        }
    }
}

/// Copy every child of `derivation` in order, inserting the copies after
/// `site`.
fn inline_children_at(grammar: &mut Grammar, derivation: NodeId, site: NodeId) {
    let mut anchor = site;
    for child in grammar.children(derivation).to_vec() {
        let copy = grammar.deep_copy(child);
        grammar.insert_after(anchor, copy);
        anchor = copy;
    }
}

// ------------------------------------------------------------------------------------------------
// Private Functions ❱ Recursion Simplification
// ------------------------------------------------------------------------------------------------

/// Rewrite `A ::= B | BA` (and the mirrored shapes) into `A ::= ε | BA`,
/// prepending a `B` to every other call of `A`. The recursion itself then
/// contributes one parameter per frame instead of duplicating `B`'s whole
/// subtree on both sides of the choice.
fn simplify_recursions(grammar: &mut Grammar) {
    let candidates: Vec<NodeId> = grammar
        .derivations()
        .into_iter()
        .filter(|&id| grammar.is_element(id) && !has_keep_attribute(grammar, id))
        .collect();
    for derivation in candidates {
        if !grammar.is_alive(derivation) {
            continue;
        }
        simplify_recursion(grammar, derivation);
    }
}

fn simplify_recursion(grammar: &mut Grammar, derivation: NodeId) {
    let name = grammar.name(derivation).to_string();
    let recursive = grammar
        .children(derivation)
        .iter()
        .any(|&child| grammar.is_element(child) && grammar.name(child) == name);
    if !recursive || grammar.or_count(derivation) != 1 {
        return;
    }

    // split the children around the single or
    let alternatives = grammar.alternatives(derivation);
    let (left, right) = (alternatives[0].clone(), alternatives[1].clone());
    let (stop, cont) = match (left.len(), right.len()) {
        (1, 2) => (left, right),
        (2, 1) => (right, left),
        _ => return,
    };

    // the stopping side must be a single childless call or a text block
    let stop_node = stop[0];
    if grammar.is_element(stop_node) {
        if grammar.has_children(stop_node) || grammar.name(stop_node) == name {
            return;
        }
    }

    // one of the continuing pair is the recursion, the other must equal
    // the stopping side
    let to_check = if grammar.name(cont[0]) == name {
        cont[1]
    } else if grammar.name(cont[1]) == name {
        cont[0]
    } else {
        return;
    };
    match (grammar.is_element(stop_node), grammar.is_element(to_check)) {
        (true, true) => {
            if grammar.has_children(to_check) || grammar.name(to_check) != grammar.name(stop_node)
            {
                return;
            }
        }
        (false, false) => {
            if grammar.text(to_check) != grammar.text(stop_node) {
                return;
            }
        }
        _ => return,
    }

    // prepend B to every call of A outside A's own body
    let prefix = match grammar.is_element(stop_node) {
        true => NodeValue::Element(grammar.name(stop_node).to_string()),
        false => NodeValue::Text(grammar.text(stop_node).unwrap_or("").to_string()),
    };
    for site in grammar.call_sites(&name) {
        if site == derivation || is_inside(grammar, site, derivation) {
            continue;
        }
        let copy = match &prefix {
            NodeValue::Element(element) => grammar.new_element(element.clone()),
            NodeValue::Text(text) => grammar.new_text(text.clone()),
        };
        grammar.insert_before(site, copy);
    }

    let old_rule = grammar.node_to_string(derivation);

    // the stopping side becomes the empty alternative
    let placeholder = grammar.new_text(" ");
    grammar.insert_after(stop_node, placeholder);
    grammar.remove(stop_node);

    let new_rule = grammar.node_to_string(derivation);
    info!(
        "To reduce the number of parameters to generate, the recursive rule:\n{old_rule}\nhas been simplified to:\n{new_rule}."
    );
    match &prefix {
        NodeValue::Element(element) => info!(
            "All occurrences of <{name}/> in the grammar have also been replaced by <{element}/><{name}/>."
        ),
        NodeValue::Text(text) => info!(
            "All occurrences of <{name}/> in the grammar have also been prefixed with the text block {text:?}."
        ),
    }
}

fn is_inside(grammar: &Grammar, node: NodeId, ancestor: NodeId) -> bool {
    let mut current = grammar.parent(node);
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        current = grammar.parent(parent);
    }
    false
}

fn has_keep_attribute(grammar: &Grammar, node: NodeId) -> bool {
    grammar.attribute(node, ATTR_OUTPUT).is_some()
        || grammar.attribute(node, ATTR_DESTINATION).is_some()
        || grammar.attribute(node, ATTR_DESTINATION_DIR).is_some()
}

// ------------------------------------------------------------------------------------------------
// Private Functions ❱ Polishing
// ------------------------------------------------------------------------------------------------

/// Adjacent text blocks in any container are concatenated.
fn merge_text_blocks(grammar: &mut Grammar) {
    for container in grammar.all_nodes() {
        if !grammar.is_element(container) || !grammar.is_alive(container) {
            continue;
        }
        let children = grammar.children(container).to_vec();
        let mut run_head: Option<NodeId> = None;
        for child in children {
            if grammar.is_text(child) {
                if let Some(head) = run_head {
                    let merged = format!(
                        "{}{}",
                        grammar.text(head).unwrap_or(""),
                        grammar.text(child).unwrap_or("")
                    );
                    grammar.set_text(head, merged);
                    grammar.remove(child);
                } else {
                    run_head = Some(child);
                }
            } else {
                run_head = None;
            }
        }
    }
}

/// Advisory check: two distinct-named rules whose immediate children form
/// the same multiset of element names and text contents are likely
/// duplicates. Nested structure is not compared.
fn warn_for_duplicate_derivations(grammar: &Grammar) {
    let signatures: Vec<(NodeId, Vec<String>)> = grammar
        .derivations()
        .into_iter()
        .filter(|&id| grammar.has_children(id))
        .map(|id| {
            let mut signature: Vec<String> = grammar
                .children(id)
                .iter()
                .map(|&child| match grammar.text(child) {
                    Some(text) => text.to_string(),
                    None => grammar.name(child).to_string(),
                })
                .collect();
            signature.sort();
            (id, signature)
        })
        .collect();
    for (first, first_signature) in &signatures {
        for (second, second_signature) in &signatures {
            if grammar.name(*first) != grammar.name(*second)
                && first_signature == second_signature
            {
                warn!(
                    "{} could be a duplicate of {}",
                    grammar.name(*first),
                    grammar.name(*second)
                );
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Private Functions ❱ Call Renaming
// ------------------------------------------------------------------------------------------------

/// Within one alternative, repeated calls to the same rule are distinct
/// instantiations; the k-th repeat is renamed `name{k}` and the derivation
/// duplicated under the new name when absent. Disjunctions need no rename
/// because the choice index already distinguishes their paths.
fn rename_calls(grammar: &mut Grammar) {
    for derivation in grammar.derivations() {
        let mut block: Vec<NodeId> = Vec::new();
        for child in grammar.children(derivation).to_vec() {
            if !grammar.is_element(child) {
                continue;
            }
            if grammar.name(child) == NAME_OR {
                rename_calls_inside_block(grammar, &block);
                block.clear();
            } else if !grammar.has_children(child) {
                block.push(child);
            }
        }
        rename_calls_inside_block(grammar, &block);
    }
}

fn rename_calls_inside_block(grammar: &mut Grammar, block: &[NodeId]) {
    if block.len() <= 1 {
        return;
    }
    let mut seen: HashMap<String, usize> = HashMap::new();
    for &node in block {
        let name = grammar.name(node).to_string();
        match seen.get(&name).copied() {
            None => {
                seen.insert(name, 1);
            }
            Some(count) => {
                let next = count + 1;
                seen.insert(name.clone(), next);
                let new_name = format!("{name}{next}");
                info!("renaming repeated call {name} to {new_name}");
                grammar.set_name(node, new_name.clone());
                if grammar.derivations_named(&new_name).is_empty() {
                    let to_duplicate = if count == 1 {
                        name.clone()
                    } else {
                        format!("{name}{count}")
                    };
                    if let Some(&source) = grammar.derivations_named(&to_duplicate).first() {
                        let copy = grammar.deep_copy(source);
                        grammar.set_name(copy, new_name);
                        grammar.insert_after(source, copy);
                    }
                }
            }
        }
    }
}
