use serde::Serialize;

use crate::reconcile::Outcome;

/// Per-command outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub created: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub errors: u32,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Error => self.errors += 1,
        }
    }

    /// Count a failure that happened before any upsert was attempted.
    pub fn error(&mut self) {
        self.errors += 1;
    }

    pub fn total(&self) -> u32 {
        self.created + self.updated + self.unchanged + self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_outcome() {
        let mut t = Tally::default();
        for o in [Outcome::Created, Outcome::Unchanged, Outcome::Unchanged, Outcome::Error] {
            t.record(o);
        }
        t.error();
        assert_eq!(t.created, 1);
        assert_eq!(t.unchanged, 2);
        assert_eq!(t.errors, 2);
        assert_eq!(t.total(), 5);
    }
}
