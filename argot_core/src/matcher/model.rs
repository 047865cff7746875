use crate::grammar::graph::{OperandId, OptionId};

/// What one option or operand collected during a match attempt.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) count: usize,
    pub(crate) values: Vec<String>,
}

impl Tally {
    pub(crate) fn has(&self) -> bool {
        self.count > 0
    }
}

/// The runtime state of every option and operand, indexed like the grammar's tables.
///
/// Each attempt at an invocation starts from a fresh store, so nothing leaks from a failed attempt into the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValueStore {
    options: Vec<Tally>,
    operands: Vec<Tally>,
}

impl ValueStore {
    pub(crate) fn new(options: usize, operands: usize) -> Self {
        Self {
            options: vec![Tally::default(); options],
            operands: vec![Tally::default(); operands],
        }
    }

    pub(crate) fn option(&self, id: OptionId) -> &Tally {
        &self.options[id.0]
    }

    pub(crate) fn operand(&self, id: OperandId) -> &Tally {
        &self.operands[id.0]
    }

    pub(crate) fn accept(&mut self, id: OptionId) {
        self.options[id.0].count += 1;
    }

    pub(crate) fn any_accepted(&self) -> bool {
        self.options.iter().any(Tally::has)
    }

    pub(crate) fn add_argument(&mut self, id: OptionId, value: String) {
        self.options[id.0].values.push(value);
    }

    pub(crate) fn replace_argument(&mut self, id: OptionId, value: String) {
        self.options[id.0].values = vec![value];
    }

    pub(crate) fn bind(&mut self, id: OperandId, value: String) {
        let tally = &mut self.operands[id.0];
        tally.count += 1;
        tally.values.push(value);
    }

    pub(crate) fn options(&self) -> impl Iterator<Item = (OptionId, &Tally)> + '_ {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, tally)| tally.has())
            .map(|(index, tally)| (OptionId(index), tally))
    }
}
