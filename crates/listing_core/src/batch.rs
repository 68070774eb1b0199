use std::collections::BTreeMap;

use crate::{PromptType, RequestId};

/// Counted-completion tracker for one card's batch run.
///
/// Each field started by the batch is recorded with the request carrying it;
/// the run is finished once every recorded request has reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRun {
    outstanding: BTreeMap<PromptType, RequestId>,
    started: usize,
}

impl BatchRun {
    pub(crate) fn new(started: BTreeMap<PromptType, RequestId>) -> Self {
        let count = started.len();
        Self {
            outstanding: started,
            started: count,
        }
    }

    /// Records a completion. Returns true when it was the last outstanding one.
    pub(crate) fn complete(&mut self, field: PromptType, request: RequestId) -> bool {
        if self.outstanding.get(&field) == Some(&request) {
            self.outstanding.remove(&field);
        }
        self.outstanding.is_empty()
    }

    pub fn started(&self) -> usize {
        self.started
    }

    pub fn remaining(&self) -> usize {
        self.outstanding.len()
    }
}
