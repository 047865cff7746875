use crate::constant::*;
use crate::grammar::graph::*;
use crate::grammar::Grammar;

/// The text of the invocation headed by `head`, for example `prog [-a] <file>...`.
pub(crate) fn invocation_text(grammar: &Grammar, head: NodeId) -> String {
    let chain = chain_text(grammar, grammar.graph.node(head).next, false);

    if chain.is_empty() {
        grammar.program.clone()
    } else {
        format!("{} {chain}", grammar.program)
    }
}

/// Every invocation under a `Usage:` header, wrapped so continuation lines line up after the program name.
pub(crate) fn usage_text(grammar: &Grammar) -> String {
    let indent = " ".repeat(grammar.program.chars().count() + 3);
    let mut lines = vec!["Usage:".to_string()];

    for head in grammar.invocations() {
        let mut line = " ".to_string();

        for word in invocation_text(grammar, head).split(' ') {
            let width = line.chars().count() + 1 + word.chars().count();

            if !line.trim().is_empty() && width > USAGE_WIDTH {
                lines.push(line);
                line = format!("{indent}{word}");
            } else {
                line.push(' ');
                line.push_str(word);
            }
        }

        lines.push(line);
    }

    lines.join("\n")
}

// `square` is set inside an optional group, whose brackets already cover its optional members.
fn chain_text(grammar: &Grammar, start: Option<NodeId>, square: bool) -> String {
    grammar
        .graph
        .east(start)
        .filter_map(|node| position_text(grammar, node, square))
        .collect::<Vec<String>>()
        .join(" ")
}

fn position_text(grammar: &Grammar, node: NodeId, square: bool) -> Option<String> {
    let members: Vec<(NodeId, String)> = grammar
        .graph
        .south(node)
        .filter_map(|member| member_text(grammar, member).map(|text| (member, text)))
        .collect();

    match members.as_slice() {
        [] => None,
        [(member, text)] => {
            let node = grammar.graph.node(*member);

            if node.optional && !square && !matches!(node.entry, Entry::Group(_)) {
                Some(repeated(format!("[{text}]"), node.repeat))
            } else {
                Some(repeated(text.clone(), node.repeat))
            }
        }
        _ => {
            let optional = members
                .iter()
                .any(|(member, _)| grammar.graph.node(*member).optional);
            // A repeated alternation marks every member.
            let all_repeat = members
                .iter()
                .all(|(member, _)| grammar.graph.node(*member).repeat);
            let joined = members
                .iter()
                .map(|(member, text)| {
                    let repeat = grammar.graph.node(*member).repeat && !all_repeat;
                    repeated(text.clone(), repeat)
                })
                .collect::<Vec<String>>()
                .join(" | ");
            let bracketed = if optional {
                format!("[{joined}]")
            } else {
                format!("({joined})")
            };

            Some(repeated(bracketed, all_repeat))
        }
    }
}

// The member without its repeat mark; `None` for hidden options.
fn member_text(grammar: &Grammar, member: NodeId) -> Option<String> {
    let node = grammar.graph.node(member);

    match node.entry {
        Entry::Operand(id) => Some(grammar.operand(id).text()),
        Entry::Option(id) => grammar.option(id).spec_text(),
        Entry::Group(group) => {
            let inner = chain_text(grammar, grammar.graph.home(group), node.optional);

            if node.optional {
                Some(format!("[{inner}]"))
            } else {
                Some(format!("({inner})"))
            }
        }
    }
}

fn repeated(text: String, repeat: bool) -> String {
    if repeat {
        format!("{text}...")
    } else {
        text
    }
}
