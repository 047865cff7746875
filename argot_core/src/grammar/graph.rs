#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SequenceId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct OptionId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct OperandId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    Operand(OperandId),
    Option(OptionId),
    Group(SequenceId),
}

/// A unit of the grammar.
///
/// `next` is sequential composition, `alt` is an alternative occupying the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) entry: Entry,
    pub(crate) next: Option<NodeId>,
    pub(crate) alt: Option<NodeId>,
    pub(crate) optional: bool,
    pub(crate) repeat: bool,
}

impl Node {
    fn new(entry: Entry, optional: bool) -> Self {
        Self {
            entry,
            next: None,
            alt: None,
            optional,
            repeat: false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Sequence {
    pub(crate) home: Option<NodeId>,
    current: Option<NodeId>,
}

/// Arena holding every node and sequence of a compiled grammar.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Graph {
    nodes: Vec<Node>,
    sequences: Vec<Sequence>,
}

impl Graph {
    pub(crate) fn new_sequence(&mut self) -> SequenceId {
        self.sequences.push(Sequence::default());
        SequenceId(self.sequences.len() - 1)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn home(&self, sequence: SequenceId) -> Option<NodeId> {
        self.sequences[sequence.0].home
    }

    pub(crate) fn current(&self, sequence: SequenceId) -> Option<NodeId> {
        self.sequences[sequence.0].current
    }

    pub(crate) fn set_current(&mut self, sequence: SequenceId, node: NodeId) {
        self.sequences[sequence.0].current = Some(node);
    }

    fn allocate(&mut self, entry: Entry, optional: bool) -> NodeId {
        self.nodes.push(Node::new(entry, optional));
        NodeId(self.nodes.len() - 1)
    }

    // Starts the sequence when it is empty, otherwise hands the cursor node to `link`.
    fn attach(
        &mut self,
        sequence: SequenceId,
        node: NodeId,
        link: impl FnOnce(&mut Self, NodeId),
    ) -> NodeId {
        let Sequence { home, current } = self.sequences[sequence.0].clone();

        match (home, current) {
            (None, _) => self.sequences[sequence.0].home = Some(node),
            (Some(_), Some(current)) => link(self, current),
            (Some(_), None) => unreachable!("internal error - sequence cursor must be set"),
        }

        node
    }

    /// Add `entry` after the cursor and move the cursor onto it.
    pub(crate) fn add_east(
        &mut self,
        sequence: SequenceId,
        entry: Entry,
        optional: bool,
    ) -> NodeId {
        let node = self.allocate(entry, optional);
        self.attach(sequence, node, |graph, current| {
            graph.nodes[current.0].next = Some(node);
        });
        self.set_current(sequence, node);
        node
    }

    /// Add `entry` between the cursor and its successor, and move the cursor onto it.
    #[cfg(test)]
    pub(crate) fn insert_east(
        &mut self,
        sequence: SequenceId,
        entry: Entry,
        optional: bool,
    ) -> NodeId {
        let node = self.allocate(entry, optional);
        self.attach(sequence, node, |graph, current| {
            graph.nodes[node.0].next = graph.nodes[current.0].next;
            graph.nodes[current.0].next = Some(node);
        });
        self.set_current(sequence, node);
        node
    }

    /// Add `entry` as the alternative of the cursor and move the cursor onto it.
    pub(crate) fn add_south(
        &mut self,
        sequence: SequenceId,
        entry: Entry,
        optional: bool,
    ) -> NodeId {
        let node = self.allocate(entry, optional);
        self.attach(sequence, node, |graph, current| {
            graph.nodes[current.0].alt = Some(node);
        });
        self.set_current(sequence, node);
        node
    }

    /// Add `entry` at the end of the cursor's alternatives, leaving the cursor where it was.
    pub(crate) fn append_south(
        &mut self,
        sequence: SequenceId,
        entry: Entry,
        optional: bool,
    ) -> NodeId {
        match self.current(sequence) {
            None => self.add_south(sequence, entry, optional),
            Some(save) => {
                self.end_south(sequence);
                let node = self.add_south(sequence, entry, optional);
                self.set_current(sequence, save);
                node
            }
        }
    }

    /// Splice a new node after `at`, outside of any cursor.
    pub(crate) fn insert_after(&mut self, at: NodeId, entry: Entry, optional: bool) -> NodeId {
        let node = self.allocate(entry, optional);
        self.nodes[node.0].next = self.nodes[at.0].next;
        self.nodes[at.0].next = Some(node);
        node
    }

    pub(crate) fn go_home(&mut self, sequence: SequenceId) -> Option<NodeId> {
        let home = self.home(sequence);
        self.sequences[sequence.0].current = home;
        home
    }

    pub(crate) fn end_east(&mut self, sequence: SequenceId) -> Option<NodeId> {
        let end = self.current(sequence).and_then(|current| self.east(current).last());

        if let Some(end) = end {
            self.set_current(sequence, end);
        }

        end
    }

    pub(crate) fn end_south(&mut self, sequence: SequenceId) -> Option<NodeId> {
        let end = self.current(sequence).and_then(|current| self.south(current).last());

        if let Some(end) = end {
            self.set_current(sequence, end);
        }

        end
    }

    /// The number of non-option nodes along the base (`next`) chain of the sequence.
    pub(crate) fn base_count(&self, sequence: SequenceId) -> usize {
        self.east(self.home(sequence))
            .filter(|id| !matches!(self.node(*id).entry, Entry::Option(_)))
            .count()
    }

    /// Inline the group sequence onto the node `at` which references it.
    ///
    /// The group's home node state and links are copied onto `at`.
    /// Its alternatives inherit the optionality of the group.
    pub(crate) fn transfer(&mut self, at: NodeId, group: SequenceId) {
        let home = match self.home(group) {
            Some(home) => self.nodes[home.0].clone(),
            None => unreachable!("internal error - cannot transfer an empty group"),
        };
        let optional = self.nodes[at.0].optional || home.optional;
        let target = &mut self.nodes[at.0];
        target.entry = home.entry;
        target.next = home.next;
        target.alt = home.alt;
        target.repeat = home.repeat;
        target.optional = optional;

        let alternatives: Vec<NodeId> = self.south(home.alt).collect();

        for alternative in alternatives {
            self.nodes[alternative.0].optional |= optional;
        }
    }

    /// Iterate `start` and its successors.
    pub(crate) fn east(&self, start: impl Into<Option<NodeId>>) -> Links<'_> {
        Links {
            graph: self,
            cursor: start.into(),
            south: false,
        }
    }

    /// Iterate `start` and its alternatives.
    pub(crate) fn south(&self, start: impl Into<Option<NodeId>>) -> Links<'_> {
        Links {
            graph: self,
            cursor: start.into(),
            south: true,
        }
    }

    /// Find an option within the chain from `start`, including alternatives and nested groups.
    pub(crate) fn find_option(
        &self,
        start: Option<NodeId>,
        predicate: &impl Fn(OptionId) -> bool,
    ) -> Option<OptionId> {
        for node in self.east(start) {
            for member in self.south(node) {
                match self.node(member).entry {
                    Entry::Option(option) if predicate(option) => return Some(option),
                    Entry::Group(group) => {
                        if let Some(option) = self.find_option(self.home(group), predicate) {
                            return Some(option);
                        }
                    }
                    _ => {}
                }
            }
        }

        None
    }

    /// Collect the options mutually exclusive with `target` within the chain from `start`.
    ///
    /// Every alternative chain enclosing `target`, at any nesting depth, contributes the options of its other members.
    /// Returns whether `target` was found.
    pub(crate) fn exclusions(
        &self,
        start: Option<NodeId>,
        target: OptionId,
        out: &mut Vec<OptionId>,
    ) -> bool {
        for node in self.east(start) {
            let members: Vec<NodeId> = self.south(node).collect();
            let hit = members.iter().position(|member| match self.node(*member).entry {
                Entry::Option(option) => option == target,
                Entry::Group(group) => self.exclusions(self.home(group), target, out),
                Entry::Operand(_) => false,
            });

            if let Some(index) = hit {
                for (other, member) in members.iter().enumerate() {
                    if other != index {
                        self.collect_options(*member, out);
                    }
                }

                return true;
            }
        }

        false
    }

    fn collect_options(&self, member: NodeId, out: &mut Vec<OptionId>) {
        match self.node(member).entry {
            Entry::Option(option) => out.push(option),
            Entry::Group(group) => {
                for node in self.east(self.home(group)) {
                    for inner in self.south(node) {
                        self.collect_options(inner, out);
                    }
                }
            }
            Entry::Operand(_) => {}
        }
    }
}

pub(crate) struct Links<'g> {
    graph: &'g Graph,
    cursor: Option<NodeId>,
    south: bool,
}

impl<'g> Iterator for Links<'g> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        let node = self.graph.node(current);
        self.cursor = if self.south { node.alt } else { node.next };
        Some(current)
    }
}
