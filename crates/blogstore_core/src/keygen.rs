//! Record identifier generation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Generates values for the `oId` key of new records.
pub trait KeyGenerator: Send + Sync + fmt::Debug {
    /// Returns a fresh identifier.
    fn generate(&self) -> String;
}

/// Millisecond timestamp ids, strictly increasing within a process.
///
/// When two ids are requested in the same millisecond the second one is
/// bumped past the first, so ids stay unique and sort by creation order.
#[derive(Debug, Default)]
pub struct TimeMillisKeyGenerator {
    last: AtomicI64,
}

impl TimeMillisKeyGenerator {
    /// Creates a generator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyGenerator for TimeMillisKeyGenerator {
    fn generate(&self) -> String {
        let mut prev = self.last.load(Ordering::SeqCst);
        loop {
            let now = chrono::Utc::now().timestamp_millis();
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Random UUID v4 ids in simple (hyphenless) form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeyGenerator;

impl KeyGenerator for UuidKeyGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Configurable choice of key generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyGeneratorKind {
    /// [`TimeMillisKeyGenerator`].
    #[default]
    TimeMillis,
    /// [`UuidKeyGenerator`].
    Uuid,
}

impl KeyGeneratorKind {
    /// Constructs the generator.
    pub fn create(self) -> Arc<dyn KeyGenerator> {
        match self {
            Self::TimeMillis => Arc::new(TimeMillisKeyGenerator::new()),
            Self::Uuid => Arc::new(UuidKeyGenerator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn time_millis_ids_strictly_increase() {
        let keygen = TimeMillisKeyGenerator::new();
        let ids: Vec<i64> = (0..1000)
            .map(|_| keygen.generate().parse().unwrap())
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn time_millis_ids_unique_across_threads() {
        let keygen = Arc::new(TimeMillisKeyGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let keygen = Arc::clone(&keygen);
                std::thread::spawn(move || (0..250).map(|_| keygen.generate()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn uuid_ids_are_simple() {
        let id = UuidKeyGenerator.generate();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }

    #[test]
    fn kind_deserializes() {
        let kind: KeyGeneratorKind = serde_json::from_str("\"uuid\"").unwrap();
        assert_eq!(kind, KeyGeneratorKind::Uuid);
        assert_eq!(KeyGeneratorKind::default(), KeyGeneratorKind::TimeMillis);
    }
}
