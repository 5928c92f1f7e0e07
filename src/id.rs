//! Snowflake-style unique ID generation.
//!
//! Layout: 41 bits of milliseconds since the service epoch, 10 bits of
//! worker id, 12 bits of per-millisecond sequence. IDs are time-ordered
//! and monotonically non-decreasing within a process.

use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Service epoch: 2024-01-01T00:00:00Z.
const EPOCH_MS: i64 = 1_704_067_200_000;

const WORKER_ID_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const MAX_WORKER_ID: u16 = (1 << WORKER_ID_BITS) - 1;
const SEQUENCE_MASK: u16 = (1 << SEQUENCE_BITS) - 1;

pub struct SnowflakeGenerator {
    worker_id: u16,
    state: Mutex<GeneratorState>,
}

struct GeneratorState {
    last_ms: i64,
    sequence: u16,
}

impl SnowflakeGenerator {
    pub fn new(worker_id: u16) -> anyhow::Result<Self> {
        if worker_id > MAX_WORKER_ID {
            anyhow::bail!("worker_id must be <= {MAX_WORKER_ID}, got {worker_id}");
        }
        Ok(Self {
            worker_id,
            state: Mutex::new(GeneratorState {
                last_ms: 0,
                sequence: 0,
            }),
        })
    }

    /// Returns the next unique ID. Spins to the next millisecond if the
    /// per-millisecond sequence space is exhausted.
    pub fn generate(&self) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let mut now = Self::now_ms();
        // Never move backwards, even if the wall clock does.
        if now < state.last_ms {
            now = state.last_ms;
        }

        if now == state.last_ms {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence space exhausted for this tick.
                loop {
                    let tick = Self::now_ms();
                    if tick > state.last_ms {
                        now = tick;
                        break;
                    }
                    std::hint::spin_loop();
                }
            }
        } else {
            state.sequence = 0;
        }

        state.last_ms = now;

        (now << (WORKER_ID_BITS + SEQUENCE_BITS))
            | (i64::from(self.worker_id) << SEQUENCE_BITS)
            | i64::from(state.sequence)
    }

    fn now_ms() -> i64 {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        i64::try_from(since_epoch.as_millis()).unwrap_or(i64::MAX) - EPOCH_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonically_increasing() {
        let generator = SnowflakeGenerator::new(1).unwrap();
        let mut previous = 0;
        for _ in 0..10_000 {
            let id = generator.generate();
            assert!(id > previous, "expected {id} > {previous}");
            previous = id;
        }
    }

    #[test]
    fn worker_id_is_embedded() {
        let generator = SnowflakeGenerator::new(42).unwrap();
        let id = generator.generate();
        let worker = (id >> SEQUENCE_BITS) & i64::from(MAX_WORKER_ID);
        assert_eq!(worker, 42);
    }

    #[test]
    fn rejects_out_of_range_worker_id() {
        assert!(SnowflakeGenerator::new(1024).is_err());
        assert!(SnowflakeGenerator::new(1023).is_ok());
    }
}
