use std::collections::HashMap;

use crate::platform::MemberId;

/// Points per member for backing the winning option. Only ever grows.
#[derive(Debug, Default, Clone)]
pub struct KarmaLedger {
    points: HashMap<MemberId, u64>,
}

impl KarmaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add exactly one point, starting unseen members from zero.
    pub fn award(&mut self, member: &MemberId) -> u64 {
        let entry = self.points.entry(member.clone()).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn get(&self, member: &MemberId) -> u64 {
        self.points.get(member).copied().unwrap_or(0)
    }
}
