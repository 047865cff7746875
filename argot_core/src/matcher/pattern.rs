use std::ops::Range;

use crate::grammar::graph::{Entry, NodeId, OperandId};
use crate::grammar::Grammar;
use crate::matcher::ValueStore;
use crate::model::OperandKind;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The operands bound by a successful pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Matched {
    pub(crate) pattern: String,
    pub(crate) leftover: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Member(NodeId),
    Elided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    operand: OperandId,
    kind: OperandKind,
    repeat: bool,
    // The number of choice points walked before this slot.
    points: usize,
}

/// One concrete arrangement of an invocation's operands.
///
/// Every choice point (a position with more than one alternative) takes the alternative selected by `choices`;
/// points beyond `choices` take their first alternative.
#[derive(Debug, Default)]
struct Pattern {
    slots: Vec<Slot>,
    arity: Vec<usize>,
    // Per choice point, the most slots any arrangement sharing the choices up to it can have.
    // `None` when a repeat is reachable.
    reach: Vec<Option<usize>>,
    // `L` literal, `V` variable, `B` choice point, `G` group, `E` elided.
    #[cfg_attr(not(feature = "tracing_debug"), allow(dead_code))]
    code: String,
}

impl Pattern {
    fn build(grammar: &Grammar, start: Option<NodeId>, choices: &[usize]) -> Self {
        let mut pattern = Pattern::default();
        pattern.chain(grammar, start, choices, Some(0));
        pattern
    }

    // `rest` bounds the slots that may follow this chain.
    fn chain(
        &mut self,
        grammar: &Grammar,
        start: Option<NodeId>,
        choices: &[usize],
        rest: Option<usize>,
    ) {
        let positions: Vec<NodeId> = grammar.graph.east(start).collect();
        let mut rests = vec![rest; positions.len()];

        for i in (1..positions.len()).rev() {
            rests[i - 1] = add(rests[i], capacity(grammar, positions[i]));
        }

        for (node, rest) in positions.into_iter().zip(rests) {
            self.position(grammar, node, choices, rest);
        }
    }

    fn position(
        &mut self,
        grammar: &Grammar,
        node: NodeId,
        choices: &[usize],
        rest: Option<usize>,
    ) {
        let alternatives = alternatives(grammar, node);
        let choice = match alternatives.len() {
            0 => return,
            1 => alternatives[0],
            arity => {
                let point = self.arity.len();
                self.arity.push(arity);
                self.code.push('B');
                let selected = choices.get(point).copied().unwrap_or_default();
                let choice = alternatives[selected.min(arity - 1)];
                let reach = add(Some(self.slots.len()), choice_capacity(grammar, choice));
                self.reach.push(add(reach, rest));
                choice
            }
        };

        let member = match choice {
            Choice::Member(member) => member,
            Choice::Elided => {
                self.code.push('E');
                return;
            }
        };
        let node = grammar.graph.node(member);

        match node.entry {
            Entry::Operand(operand) => {
                let kind = grammar.operand(operand).kind();
                self.code.push(match kind {
                    OperandKind::Literal => 'L',
                    OperandKind::Variable => 'V',
                });
                self.slots.push(Slot {
                    operand,
                    kind,
                    repeat: node.repeat,
                    points: self.arity.len(),
                });
            }
            Entry::Group(group) => {
                self.code.push('G');
                let before = self.slots.len();
                let rest = if node.repeat { None } else { rest };
                self.chain(grammar, grammar.graph.home(group), choices, rest);

                if node.repeat && self.slots.len() > before {
                    if let Some(last) = self.slots.last_mut() {
                        last.repeat = true;
                    }
                }
            }
            Entry::Option(_) => unreachable!("internal error - options are never operand choices"),
        }
    }

    fn min(&self) -> usize {
        self.slots.len()
    }

    fn max(&self) -> Option<usize> {
        if self.slots.iter().any(|slot| slot.repeat) {
            None
        } else {
            Some(self.min())
        }
    }

    /// Distribute `tokens` over the slots, the first repeated slot taking every token the others do not need.
    ///
    /// On failure, returns the choice point to advance, or `None` when no choice could help.
    /// Every arrangement keeping the choices up to that point fails as well.
    fn align(
        &self,
        grammar: &Grammar,
        tokens: &[String],
    ) -> Result<Vec<Range<usize>>, Option<usize>> {
        let last_point = self.arity.len().checked_sub(1);
        let repeat_at = self.slots.iter().position(|slot| slot.repeat);

        // The slot the tokens run out at exists for every arrangement choosing the same up to it.
        if tokens.len() < self.min() {
            return Err(self.slots[tokens.len()].points.checked_sub(1));
        }

        if self.max().map_or(false, |max| tokens.len() > max) {
            let short = self
                .reach
                .iter()
                .position(|reach| reach.map_or(false, |reach| reach < tokens.len()));
            return Err(short.or(last_point));
        }

        let extra = tokens.len() - self.min();
        let mut ranges = Vec::default();
        let mut index = 0;

        for (i, slot) in self.slots.iter().enumerate() {
            let take = if repeat_at == Some(i) { 1 + extra } else { 1 };
            let range = index..index + take;
            index += take;

            if slot.kind == OperandKind::Literal {
                let literal = grammar.operand(slot.operand).name();

                if tokens[range.clone()]
                    .iter()
                    .any(|token| !token.eq_ignore_ascii_case(literal))
                {
                    // Once a repeated slot has absorbed tokens, every later position depends on the other choices.
                    return match repeat_at {
                        Some(repeat) if repeat <= i => Err(last_point),
                        _ => Err(slot.points.checked_sub(1)),
                    };
                }
            }

            ranges.push(range);
        }

        Ok(ranges)
    }

    fn text(&self, grammar: &Grammar) -> String {
        self.slots
            .iter()
            .map(|slot| {
                let text = grammar.operand(slot.operand).text();

                if slot.repeat {
                    format!("{text}...")
                } else {
                    text
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

// The ways to fill one position, in order of preference; the elided choice comes last.
fn alternatives(grammar: &Grammar, node: NodeId) -> Vec<Choice> {
    let mut alternatives = Vec::default();
    let mut elidable = false;

    for member in grammar.graph.south(node) {
        let node = grammar.graph.node(member);
        elidable |= node.optional;

        match node.entry {
            Entry::Operand(operand) if Some(operand) != grammar.placeholder => {
                alternatives.push(Choice::Member(member))
            }
            Entry::Group(_) => alternatives.push(Choice::Member(member)),
            // Options and the `[options]` placeholder take no operand.
            _ => elidable = true,
        }
    }

    if elidable && !alternatives.is_empty() {
        alternatives.push(Choice::Elided);
    }

    alternatives
}

fn add(left: Option<usize>, right: Option<usize>) -> Option<usize> {
    Some(left? + right?)
}

// The most slots a position can produce, or `None` when unbounded.
fn capacity(grammar: &Grammar, node: NodeId) -> Option<usize> {
    alternatives(grammar, node)
        .into_iter()
        .try_fold(0, |most, choice| {
            choice_capacity(grammar, choice).map(|slots| most.max(slots))
        })
}

fn choice_capacity(grammar: &Grammar, choice: Choice) -> Option<usize> {
    let member = match choice {
        Choice::Member(member) => grammar.graph.node(member),
        Choice::Elided => return Some(0),
    };
    let slots = match member.entry {
        Entry::Group(group) => grammar
            .graph
            .east(grammar.graph.home(group))
            .try_fold(0, |total, node| Some(total + capacity(grammar, node)?)),
        _ => Some(1),
    };

    match slots {
        Some(0) => Some(0),
        _ if member.repeat => None,
        slots => slots,
    }
}

// Advance the odometer at `point`, carrying into earlier points; later points restart from their first alternative.
fn advance(choices: &mut Vec<usize>, arity: &[usize], point: usize) -> bool {
    choices.resize(point + 1, 0);
    let mut point = point;

    loop {
        choices[point] += 1;

        if choices[point] < arity[point] {
            return true;
        }

        if point == 0 {
            return false;
        }

        choices.truncate(point);
        point -= 1;
    }
}

/// Try the arrangements of the invocation headed by `head` until one fits `tokens`, binding its operands into `store`.
pub(crate) fn match_operands(
    grammar: &Grammar,
    head: NodeId,
    tokens: Vec<String>,
    store: &mut ValueStore,
) -> Option<Matched> {
    let start = grammar.graph.node(head).next;
    let mut choices = Vec::default();

    loop {
        let pattern = Pattern::build(grammar, start, &choices);

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Trying pattern '{}' ({}-{:?}) against {} operands: {}",
                pattern.code,
                pattern.min(),
                pattern.max(),
                tokens.len(),
                pattern.text(grammar)
            );
        }

        match pattern.align(grammar, &tokens) {
            Ok(ranges) => {
                let mut consumed = 0;

                for (slot, range) in pattern.slots.iter().zip(ranges) {
                    consumed = range.end;

                    for token in &tokens[range] {
                        store.bind(slot.operand, token.clone());
                    }
                }

                return Some(Matched {
                    pattern: pattern.text(grammar),
                    leftover: tokens[consumed..].to_vec(),
                });
            }
            Err(anchor) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Pattern failed, anchored at choice point {anchor:?}.");
                }

                match anchor {
                    Some(point) if advance(&mut choices, &pattern.arity, point) => {}
                    _ => return None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn attempt(usage: &str, tokens: &[&str]) -> (Grammar, ValueStore, Option<Matched>) {
        let grammar = Grammar::compile(usage).unwrap();
        let head = grammar.invocations().next().unwrap();
        let mut store = ValueStore::new(grammar.options().len(), grammar.operands.len());
        let matched = match_operands(
            &grammar,
            head,
            tokens.iter().map(|t| t.to_string()).collect(),
            &mut store,
        );
        (grammar, store, matched)
    }

    fn values(grammar: &Grammar, store: &ValueStore, name: &str) -> Vec<String> {
        let id = grammar
            .variables
            .iter()
            .chain(grammar.literals.iter())
            .find(|id| grammar.operand(**id).name() == name)
            .unwrap();
        store.operand(*id).values.clone()
    }

    #[test]
    fn code() {
        // Setup
        let grammar = Grammar::compile("prog [-v] find (<a> | <b>) [options] <d>...").unwrap();
        let head = grammar.invocations().next().unwrap();

        // Execute
        let pattern = Pattern::build(&grammar, grammar.graph.node(head).next, &[]);

        // Verify
        assert_eq!(pattern.code, "LBVV");
        assert_eq!(pattern.arity, vec![2]);
        assert_eq!(pattern.min(), 3);
        assert_eq!(pattern.max(), None);
        assert_eq!(pattern.text(&grammar), "find <a> <d>...");
    }

    #[test]
    fn code_second_choice() {
        // Setup
        let grammar = Grammar::compile("prog find (<a> | [<b> <c>]) <d>").unwrap();
        let head = grammar.invocations().next().unwrap();

        // Execute
        let pattern = Pattern::build(&grammar, grammar.graph.node(head).next, &[1]);

        // Verify
        // The optional group makes the position elidable as a whole.
        assert_eq!(pattern.code, "LBGBVBVV");
        assert_eq!(pattern.arity, vec![3, 2, 2]);
        assert_eq!(pattern.text(&grammar), "find <b> <c> <d>");
    }

    #[test]
    fn round_trip() {
        // Execute
        let (grammar, store, matched) =
            attempt("prog find <pattern> <file>...", &["find", "foo", "a.txt", "b.txt"]);

        // Verify
        let matched = matched.unwrap();
        assert_eq!(matched.pattern, "find <pattern> <file>...");
        assert!(matched.leftover.is_empty());
        assert_eq!(values(&grammar, &store, "find"), vec!["find".to_string()]);
        assert_eq!(values(&grammar, &store, "pattern"), vec!["foo".to_string()]);
        assert_eq!(
            values(&grammar, &store, "file"),
            vec!["a.txt".to_string(), "b.txt".to_string()]
        );
    }

    #[rstest]
    #[case(vec!["X"], vec!["X"], vec![])]
    #[case(vec!["X", "Y"], vec!["X"], vec!["Y"])]
    fn optional_elision(
        #[case] tokens: Vec<&str>,
        #[case] one: Vec<&str>,
        #[case] two: Vec<&str>,
    ) {
        // Execute
        let (grammar, store, matched) = attempt("prog <one> [<two>]", &tokens);

        // Verify
        assert!(matched.is_some());
        assert_eq!(values(&grammar, &store, "one"), one);
        assert_eq!(values(&grammar, &store, "two"), two);
    }

    #[rstest]
    #[case(vec!["1", "2"], vec!["1"], vec!["2"])]
    #[case(vec!["1", "2", "3", "4"], vec!["1"], vec!["2", "3", "4"])]
    fn repeat_distribution(
        #[case] tokens: Vec<&str>,
        #[case] a: Vec<&str>,
        #[case] b: Vec<&str>,
    ) {
        // Execute
        let (grammar, store, matched) = attempt("prog <a> <b>...", &tokens);

        // Verify
        assert_eq!(matched.unwrap().pattern, "<a> <b>...");
        assert_eq!(values(&grammar, &store, "a"), a);
        assert_eq!(values(&grammar, &store, "b"), b);
    }

    #[test]
    fn repeat_before_literal() {
        // Execute
        let (grammar, store, matched) = attempt("prog <src>... to <dst>", &["a", "b", "TO", "c"]);

        // Verify
        assert!(matched.is_some());
        assert_eq!(values(&grammar, &store, "src"), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(values(&grammar, &store, "to"), vec!["TO".to_string()]);
        assert_eq!(values(&grammar, &store, "dst"), vec!["c".to_string()]);
    }

    #[rstest]
    #[case(vec!["start", "x"], "start <name>")]
    #[case(vec!["stop", "x"], "stop <name>")]
    #[case(vec!["stop"], "stop")]
    #[case(vec!["status"], "status")]
    fn alternatives_in_order(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Execute
        let (_, _, matched) = attempt("prog (start | stop | status) [<name>]", &tokens);

        // Verify
        let pattern = matched.unwrap().pattern;
        assert_eq!(pattern, expected);
    }

    #[rstest]
    #[case(vec!["a", "b"], "(<x> <y>)...", "<x> <y>...")]
    #[case(vec!["a", "b", "c"], "(<x> <y>)...", "<x> <y>...")]
    #[case(vec!["go", "go", "go"], "go...", "go...")]
    #[case(vec![], "[<x>]", "")]
    #[case(vec!["a"], "[<x> [<y>]]", "<x>")]
    #[case(vec!["a", "b"], "[<x> [<y>]]", "<x> <y>")]
    #[case(vec!["a", "a", "a"], "[a | b]...", "a...")]
    #[case(vec!["b", "b"], "[a | b]...", "b...")]
    #[case(vec![], "[a | b]...", "")]
    fn patterns(#[case] tokens: Vec<&str>, #[case] usage: &str, #[case] expected: &str) {
        // Execute
        let (_, _, matched) = attempt(&format!("prog {usage}"), &tokens);

        // Verify
        assert_eq!(matched.unwrap().pattern, expected);
    }

    #[rstest]
    #[case("prog <x>", vec![])]
    #[case("prog <x>", vec!["a", "b"])]
    #[case("prog find <x>", vec!["seek", "a"])]
    #[case("prog go...", vec!["go", "stop"])]
    #[case("prog (a | b) (c | d)", vec!["a", "e"])]
    #[case("prog [-v]", vec!["a"])]
    fn no_pattern(#[case] usage: &str, #[case] tokens: Vec<&str>) {
        // Execute
        let (grammar, store, matched) = attempt(usage, &tokens);

        // Verify
        assert_eq!(matched, None);
        assert_eq!(
            store,
            ValueStore::new(grammar.options().len(), grammar.operands.len())
        );
    }

    // Runs the arrangement search, counting the patterns tried.
    fn attempts(grammar: &Grammar, tokens: &[String]) -> (bool, usize) {
        let head = grammar.invocations().next().unwrap();
        let start = grammar.graph.node(head).next;
        let mut choices = Vec::default();
        let mut tried = 0;

        loop {
            let pattern = Pattern::build(grammar, start, &choices);
            tried += 1;

            match pattern.align(grammar, tokens) {
                Ok(_) => return (true, tried),
                Err(Some(point)) if advance(&mut choices, &pattern.arity, point) => {}
                Err(_) => return (false, tried),
            }
        }
    }

    #[rstest]
    #[case(0, true)]
    #[case(3, true)]
    #[case(19, true)]
    #[case(20, true)]
    #[case(21, false)]
    fn many_optional_operands(#[case] count: usize, #[case] expected: bool) {
        // Setup
        let operands: Vec<String> = (0..20).map(|i| format!("[<a{i}>]")).collect();
        let grammar = Grammar::compile(&format!("prog {}", operands.join(" "))).unwrap();
        let tokens: Vec<String> = (0..count).map(|i| i.to_string()).collect();

        // Execute
        let (matched, tried) = attempts(&grammar, &tokens);

        // Verify
        assert_eq!(matched, expected);
        assert!(tried <= 21, "tried {tried} arrangements");
    }

    #[test]
    fn many_optional_operands_bind_in_order() {
        // Setup
        let operands: Vec<String> = (0..20).map(|i| format!("[<a{i}>]")).collect();
        let usage = format!("prog {}", operands.join(" "));

        // Execute
        let (grammar, store, matched) = attempt(&usage, &["x", "y"]);

        // Verify
        assert_eq!(matched.unwrap().pattern, "<a0> <a1>");
        assert_eq!(values(&grammar, &store, "a0"), vec!["x".to_string()]);
        assert_eq!(values(&grammar, &store, "a1"), vec!["y".to_string()]);
        assert!(values(&grammar, &store, "a2").is_empty());
    }

    #[rstest]
    #[case("prog [<x>] [<y>] (a | b) [<z>]", vec!["a"], true)]
    #[case("prog [<x>] [<y>] (a | b) [<z>]", vec!["1", "2", "b", "3"], true)]
    #[case("prog [<x>] [<y>] (a | b) [<z>]", vec!["1", "2", "c", "3"], false)]
    #[case("prog [<x> <y>] [<z>...]", vec!["1", "2", "3", "4", "5"], true)]
    #[case("prog [(<x> <y>)...] <z>", vec!["1", "2", "3"], true)]
    fn search_outcome(#[case] usage: &str, #[case] tokens: Vec<&str>, #[case] expected: bool) {
        // Setup
        let grammar = Grammar::compile(usage).unwrap();
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        // Execute
        let (matched, _) = attempts(&grammar, &tokens);

        // Verify
        assert_eq!(matched, expected);
    }

    #[rstest]
    #[case(vec![2, 3], vec![0], 0, true, vec![1])]
    #[case(vec![2, 3], vec![0, 2], 1, true, vec![1])]
    #[case(vec![2, 3], vec![1, 2], 1, false, vec![])]
    #[case(vec![2, 3], vec![1, 2], 0, false, vec![])]
    #[case(vec![2, 2], vec![0, 1], 1, true, vec![1])]
    fn odometer(
        #[case] arity: Vec<usize>,
        #[case] choices: Vec<usize>,
        #[case] point: usize,
        #[case] expected: bool,
        #[case] after: Vec<usize>,
    ) {
        // Setup
        let mut choices = choices;

        // Execute
        let advanced = advance(&mut choices, &arity, point);

        // Verify
        assert_eq!(advanced, expected);

        if advanced {
            assert_eq!(choices, after);
        }
    }
}
