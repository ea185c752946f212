use std::collections::VecDeque;

use crate::Sequence;

/// History of items produced at known sequences, kept until every consumer
/// has acknowledged them.
///
/// `None` as a consumer position means "has received nothing yet".
pub struct RetentionBuffer<T> {
    entries: VecDeque<(Sequence, T)>,
    oldest_retained: Option<Sequence>,
}

impl<T: Clone> RetentionBuffer<T> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            oldest_retained: None,
        }
    }

    /// Appends an item. Nothing is ever dropped here, even when `sequence` is
    /// already below the floor.
    pub fn record(&mut self, item: T, sequence: Sequence) {
        // entries stay sorted so trimming only ever looks at the front
        let index = self
            .entries
            .iter()
            .rposition(|(old_sequence, _)| *old_sequence <= sequence)
            .map_or(0, |index| index + 1);
        self.entries.insert(index, (sequence, item));
    }

    /// Raises the floor and discards entries below it. A floor lower than the
    /// current one, or `None`, changes nothing.
    pub fn set_oldest_retained_sequence(&mut self, oldest: Option<Sequence>) {
        let Some(oldest) = oldest else {
            return;
        };
        if self.oldest_retained.is_some_and(|current| oldest <= current) {
            return;
        }

        self.oldest_retained = Some(oldest);
        while self
            .entries
            .front()
            .is_some_and(|(sequence, _)| *sequence < oldest)
        {
            self.entries.pop_front();
        }
    }

    /// Everything a consumer at `consumer` still needs, oldest first.
    ///
    /// A consumer that has received nothing, or that has fallen behind the
    /// floor, gets everything still retained.
    pub fn messages_since(&self, consumer: Option<Sequence>) -> Vec<T> {
        let mut output = Vec::new();
        self.append_messages_since(consumer, &mut output);
        output
    }

    pub fn append_messages_since(&self, consumer: Option<Sequence>, output: &mut Vec<T>) {
        let after = match (consumer, self.oldest_retained) {
            (None, _) => None,
            (Some(consumer), Some(floor)) if consumer < floor => None,
            (Some(consumer), _) => Some(consumer),
        };

        // entries recorded below the floor are never handed out
        let floor_start = self.oldest_retained.map_or(0, |floor| {
            self.entries
                .partition_point(|(sequence, _)| *sequence < floor)
        });
        let after_start = after.map_or(0, |after| {
            self.entries
                .partition_point(|(sequence, _)| *sequence <= after)
        });
        let start = floor_start.max(after_start);

        output.extend(self.entries.range(start..).map(|(_, item)| item.clone()));
    }

    pub fn oldest_retained_sequence(&self) -> Option<Sequence> {
        self.oldest_retained
    }

    /// Entries held, including any recorded below the floor since the last trim
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for RetentionBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
