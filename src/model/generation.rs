use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one rebuild cycle. Strictly increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-owned source of generations
#[derive(Debug, Default)]
pub struct GenerationCounter {
    last: u64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next generation
    pub fn advance(&mut self) -> Generation {
        self.last += 1;
        Generation(self.last)
    }

    /// The most recently issued generation, if any
    pub fn latest(&self) -> Option<Generation> {
        (self.last > 0).then_some(Generation(self.last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_strictly_increase() {
        let mut counter = GenerationCounter::new();
        assert_eq!(counter.latest(), None);
        let first = counter.advance();
        let second = counter.advance();
        assert!(second > first);
        assert_eq!(counter.latest(), Some(second));
        assert_eq!(second.to_string(), "#2");
    }
}
