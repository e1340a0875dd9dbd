//! Identity generation for funds and fund members.
//!
//! Ids are positive `i64`s, globally unique and never reused. A generator
//! returns `None` when it cannot hand out an id right now; the engine turns
//! that into [`EngineError::SystemBusy`](crate::EngineError::SystemBusy).

use std::sync::{
    Mutex,
    atomic::{AtomicI64, Ordering},
};

use chrono::Utc;

/// What an id is generated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    Fund,
    FundMember,
}

impl IdKind {
    const fn bits(self) -> i64 {
        match self {
            Self::Fund => 1,
            Self::FundMember => 2,
        }
    }
}

pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    /// Next id for `kind`, or `None` if the generator is exhausted.
    fn generate(&self, kind: IdKind) -> Option<i64>;
}

const SEQUENCE_BITS: u32 = 12;
const NODE_BITS: u32 = 6;
const KIND_BITS: u32 = 4;
const MAX_SEQUENCE: i64 = (1 << SEQUENCE_BITS) - 1;
const MAX_NODE: u8 = (1 << NODE_BITS) - 1;

/// Time-ordered ids: 41 bits of milliseconds since `EPOCH_MS`, 4 bits of
/// kind, 6 bits of node, 12 bits of per-millisecond sequence.
#[derive(Debug)]
pub struct SnowflakeIds {
    node: i64,
    state: Mutex<SnowflakeState>,
}

#[derive(Debug, Default)]
struct SnowflakeState {
    last_ms: i64,
    sequence: i64,
}

/// 2024-01-01T00:00:00Z
const EPOCH_MS: i64 = 1_704_067_200_000;

impl SnowflakeIds {
    /// `node` must fit in 6 bits; larger values are masked.
    pub fn new(node: u8) -> Self {
        Self {
            node: i64::from(node & MAX_NODE),
            state: Mutex::new(SnowflakeState::default()),
        }
    }

    fn next_at(&self, kind: IdKind, now_ms: i64) -> Option<i64> {
        let mut state = self.state.lock().ok()?;
        let elapsed = now_ms - EPOCH_MS;
        if elapsed < state.last_ms || elapsed < 0 {
            // Clock went backwards.
            return None;
        }
        if elapsed == state.last_ms {
            if state.sequence >= MAX_SEQUENCE {
                return None;
            }
            state.sequence += 1;
        } else {
            state.last_ms = elapsed;
            state.sequence = 0;
        }

        let id = (elapsed << (KIND_BITS + NODE_BITS + SEQUENCE_BITS))
            | (kind.bits() << (NODE_BITS + SEQUENCE_BITS))
            | (self.node << SEQUENCE_BITS)
            | state.sequence;
        (id > 0).then_some(id)
    }
}

impl IdGenerator for SnowflakeIds {
    fn generate(&self, kind: IdKind) -> Option<i64> {
        self.next_at(kind, Utc::now().timestamp_millis())
    }
}

/// Counter-based ids, shared by every kind.
///
/// With a ceiling the generator runs dry after `ceiling` ids, which is how
/// exhaustion is exercised in tests.
#[derive(Debug)]
pub struct SequenceIds {
    next: AtomicI64,
    ceiling: Option<i64>,
}

impl SequenceIds {
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first.max(1)),
            ceiling: None,
        }
    }

    /// Hands out at most `count` ids starting at `first`.
    pub fn limited(first: i64, count: i64) -> Self {
        let first = first.max(1);
        Self {
            next: AtomicI64::new(first),
            ceiling: Some(first + count.max(0)),
        }
    }
}

impl IdGenerator for SequenceIds {
    fn generate(&self, _kind: IdKind) -> Option<i64> {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        match self.ceiling {
            Some(ceiling) if id >= ceiling => None,
            _ => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_ids_increase_and_encode_kind() {
        let ids = SnowflakeIds::new(3);
        let now = EPOCH_MS + 10_000;
        let a = ids.next_at(IdKind::Fund, now).unwrap();
        let b = ids.next_at(IdKind::FundMember, now).unwrap();
        let c = ids.next_at(IdKind::Fund, now + 1).unwrap();
        assert!(a > 0 && a < c);
        assert_eq!((a >> (NODE_BITS + SEQUENCE_BITS)) & 0xF, 1);
        assert_eq!((b >> (NODE_BITS + SEQUENCE_BITS)) & 0xF, 2);
        assert_eq!((a >> SEQUENCE_BITS) & i64::from(MAX_NODE), 3);
    }

    #[test]
    fn snowflake_exhausts_within_one_millisecond() {
        let ids = SnowflakeIds::new(0);
        let now = EPOCH_MS + 5;
        for _ in 0..=MAX_SEQUENCE {
            assert!(ids.next_at(IdKind::Fund, now).is_some());
        }
        assert_eq!(ids.next_at(IdKind::Fund, now), None);
        assert!(ids.next_at(IdKind::Fund, now + 1).is_some());
    }

    #[test]
    fn snowflake_rejects_clock_going_backwards() {
        let ids = SnowflakeIds::new(0);
        assert!(ids.next_at(IdKind::Fund, EPOCH_MS + 100).is_some());
        assert_eq!(ids.next_at(IdKind::Fund, EPOCH_MS + 99), None);
    }

    #[test]
    fn limited_sequence_runs_dry() {
        let ids = SequenceIds::limited(10, 2);
        assert_eq!(ids.generate(IdKind::Fund), Some(10));
        assert_eq!(ids.generate(IdKind::FundMember), Some(11));
        assert_eq!(ids.generate(IdKind::Fund), None);
        assert_eq!(ids.generate(IdKind::Fund), None);
    }
}
