use std::collections::HashMap;

use crate::event::GroupId;

/// Assigns small stable integers to device groups in order of first
/// appearance, starting at 1.
#[derive(Debug)]
pub struct GroupLabels {
    labels: HashMap<GroupId, u32>,
    next: u32,
}

impl Default for GroupLabels {
    fn default() -> Self {
        Self {
            labels: HashMap::new(),
            next: 1,
        }
    }
}

impl GroupLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label for `group`, allocating the next free one on first sight.
    pub fn label(&mut self, group: GroupId) -> u32 {
        let next = &mut self.next;
        *self.labels.entry(group).or_insert_with(|| {
            let label = *next;
            *next += 1;
            label
        })
    }
}
