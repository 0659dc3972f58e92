use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub const TRUST_SCORE_SEED: u64 = 84;

/// Demo-only reputation counter. Process-wide, reset on restart, bumped at
/// most once per verified transaction hash.
pub struct TrustScore {
    score: AtomicU64,
    verified: Mutex<HashSet<String>>,
}

impl TrustScore {
    pub fn new(seed: u64) -> Self {
        Self {
            score: AtomicU64::new(seed),
            verified: Mutex::new(HashSet::new()),
        }
    }

    pub fn current(&self) -> u64 {
        self.score.load(Ordering::SeqCst)
    }

    /// Returns the score after recording; repeat hashes do not bump it again.
    pub fn record_verified(&self, tx: &str) -> u64 {
        let mut verified = self.verified.lock().expect("visited set lock poisoned");
        if verified.insert(tx.to_lowercase()) {
            self.score.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.score.load(Ordering::SeqCst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_seed() {
        assert_eq!(TrustScore::new(TRUST_SCORE_SEED).current(), 84);
    }

    #[test]
    fn bumps_once_per_unique_hash() {
        let trust = TrustScore::new(TRUST_SCORE_SEED);
        assert_eq!(trust.record_verified("0xabc"), 85);
        assert_eq!(trust.record_verified("0xabc"), 85);
        assert_eq!(trust.record_verified("0xABC"), 85);
        assert_eq!(trust.record_verified("0xdef"), 86);
        assert_eq!(trust.current(), 86);
    }
}
