use runt_shared::Sequence;

/// The newest batch sequence a receiver has applied
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcceptedSequence {
    last: Option<Sequence>,
}

impl AcceptedSequence {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn last(&self) -> Option<Sequence> {
        self.last
    }

    /// Records `sequence` if it is newer than anything accepted so far.
    /// Returns false for duplicates and for batches overtaken in transit.
    pub fn accept(&mut self, sequence: Sequence) -> bool {
        if self.last.is_some_and(|last| sequence <= last) {
            return false;
        }
        self.last = Some(sequence);
        true
    }
}
