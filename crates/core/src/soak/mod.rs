//! Seeded randomized soak test for [`RingBuffer`].
//!
//! Every step applies one random operation to a `RingBuffer<u32>` and to a
//! `VecDeque<u32>` model, then checks that results, error kinds and contents
//! agree. The same [`SoakConfig`] always replays the same sequence.

mod op;

use crate::buffer::RingBuffer;
use crate::config::SoakConfig;
use crate::error::BufferError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub use op::Op;

const LOG_TARGET: &str = "ringfifo::soak";
const PROGRESS_EVERY: u64 = 10_000;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SoakError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("step {step} ({op}): {detail}")]
    Divergence {
        step: u64,
        op: &'static str,
        detail: String,
    },
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpStats {
    pub attempted: u64,
    /// Calls the buffer refused with an error, all of which the model expected.
    pub rejected: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoakReport {
    pub config: SoakConfig,
    pub ops: BTreeMap<String, OpStats>,
    pub peak_len: usize,
    pub final_len: usize,
}

/// Outcome of one step that matched the model.
enum Verdict {
    Accepted,
    Rejected,
}

type Step = std::result::Result<Verdict, String>;

struct Harness {
    buffer: RingBuffer<u32>,
    model: VecDeque<u32>,
    capacity: usize,
}

impl Harness {
    fn new(capacity: usize) -> Result<Self, SoakError> {
        Ok(Self {
            buffer: RingBuffer::new(capacity)?,
            model: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    fn apply(&mut self, op: &Op) -> Step {
        match op {
            Op::Put(v) => self.put(*v),
            Op::PutAll(items) => self.put_all(items),
            Op::Get => self.get(),
            Op::GetMany(n) => self.get_many(*n),
            Op::GetInto(n) => self.get_into(*n),
            Op::Skip(n) => self.skip(*n),
            Op::SetAt(i, v) => self.set_at(*i, *v),
            Op::Remove(v) => self.remove(*v),
            Op::Find(v) => self.find(*v),
            Op::Clear => {
                self.buffer.clear();
                self.model.clear();
                Ok(Verdict::Accepted)
            }
        }
    }

    fn put(&mut self, v: u32) -> Step {
        let got = self.buffer.put(v);
        if self.model.len() == self.capacity {
            expect_err(got, |e| {
                *e == BufferError::CapacityExceeded {
                    capacity: self.capacity,
                }
            })
        } else {
            self.model.push_back(v);
            expect_ok(got, ())
        }
    }

    fn put_all(&mut self, items: &[u32]) -> Step {
        let room = self.capacity - self.model.len();
        let got = self.buffer.put_all(items.iter().copied());
        self.model.extend(items.iter().take(room));
        if items.len() <= room {
            expect_ok(got, items.len())
        } else {
            expect_err(got, |e| {
                matches!(e, BufferError::PartialPut { inserted, .. } if *inserted == room)
                    && matches!(e.root_cause(), BufferError::CapacityExceeded { .. })
            })
        }
    }

    fn get(&mut self) -> Step {
        let got = self.buffer.get();
        match self.model.pop_front() {
            Some(want) => expect_ok(got, want),
            None => expect_err(got, |e| *e == BufferError::EmptyBuffer),
        }
    }

    fn get_many(&mut self, n: usize) -> Step {
        let got = self.buffer.get_many(n);
        let take = n.min(self.model.len());
        let want: Vec<u32> = self.model.drain(..take).collect();
        expect_ok(Ok(got), want)
    }

    fn get_into(&mut self, n: usize) -> Step {
        let mut dst = vec![u32::MAX; n];
        let moved = self.buffer.get_into(&mut dst);
        let take = n.min(self.model.len());
        let mut want = vec![u32::MAX; n];
        for (slot, v) in want.iter_mut().zip(self.model.drain(..take)) {
            *slot = v;
        }
        expect_ok(Ok((moved, dst)), (take, want))
    }

    fn skip(&mut self, n: usize) -> Step {
        let got = self.buffer.skip(n);
        if n > self.model.len() {
            expect_err(got, |e| matches!(e, BufferError::InvalidArgument(_)))
        } else {
            self.model.drain(..n);
            expect_ok(got, ())
        }
    }

    fn set_at(&mut self, i: usize, v: u32) -> Step {
        let len = self.model.len();
        let got = self.buffer.set_at(i, v);
        match self.model.get_mut(i) {
            Some(slot) => {
                let old = std::mem::replace(slot, v);
                expect_ok(got, old)
            }
            None => expect_err(got, |e| {
                *e == BufferError::IndexOutOfRange { index: i, len }
            }),
        }
    }

    fn remove(&mut self, v: u32) -> Step {
        let got = self.buffer.remove(&v);
        let want = match self.model.iter().position(|x| *x == v) {
            Some(i) => self.model.remove(i).is_some(),
            None => false,
        };
        expect_ok(Ok(got), want)
    }

    fn find(&self, v: u32) -> Step {
        let want = self
            .model
            .iter()
            .position(|x| *x == v)
            .unwrap_or(self.model.len());
        expect_ok(Ok(self.buffer.find(&v)), want)?;
        expect_ok(Ok(self.buffer.contains(&v)), want < self.model.len())
    }

    fn check_contents(&self) -> std::result::Result<(), String> {
        if self.buffer.len() != self.model.len() {
            return Err(format!(
                "len {} but model has {}",
                self.buffer.len(),
                self.model.len()
            ));
        }
        if !self.buffer.iter().eq(self.model.iter()) {
            return Err(format!(
                "contents {:?} but model has {:?}",
                self.buffer, self.model
            ));
        }
        if let Some(oldest) = self.model.front() {
            if self.buffer.peek() != Some(oldest) {
                return Err(format!("peek {:?}, expected {oldest}", self.buffer.peek()));
            }
        }
        Ok(())
    }
}

fn expect_ok<T, U>(got: Result<T, BufferError>, want: U) -> Step
where
    T: PartialEq<U> + std::fmt::Debug,
    U: std::fmt::Debug,
{
    match got {
        Ok(v) if v == want => Ok(Verdict::Accepted),
        Ok(v) => Err(format!("returned {v:?}, expected {want:?}")),
        Err(e) => Err(format!("failed with `{e}`, expected {want:?}")),
    }
}

fn expect_err<T: std::fmt::Debug>(
    got: Result<T, BufferError>,
    is_expected: impl FnOnce(&BufferError) -> bool,
) -> Step {
    match got {
        Err(e) if is_expected(&e) => Ok(Verdict::Rejected),
        Err(e) => Err(format!("failed with unexpected error `{e}`")),
        Ok(v) => Err(format!("returned {v:?}, expected an error")),
    }
}

/// Runs `config.ops` random steps and reports per-operation counts.
///
/// Stops at the first step where the buffer and the model disagree.
pub fn run(config: &SoakConfig) -> Result<SoakReport, SoakError> {
    let capacity = config.capacity.get();
    let mut harness = Harness::new(capacity)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut ops: BTreeMap<String, OpStats> = BTreeMap::new();
    let mut peak_len = 0;

    tracing::info!(
        target: LOG_TARGET,
        capacity,
        ops = config.ops.get(),
        seed = config.seed,
        "soak run started"
    );

    for step in 0..config.ops.get() {
        let op = Op::random(&mut rng, harness.model.len(), capacity);
        tracing::trace!(target: LOG_TARGET, step, ?op, "apply");

        let divergence = |detail: String| {
            tracing::error!(target: LOG_TARGET, step, op = op.name(), %detail, "buffer diverged from model");
            SoakError::Divergence {
                step,
                op: op.name(),
                detail,
            }
        };

        let verdict = harness.apply(&op).map_err(divergence)?;
        harness.check_contents().map_err(divergence)?;

        let stats = ops.entry(op.name().to_owned()).or_default();
        stats.attempted += 1;
        if let Verdict::Rejected = verdict {
            stats.rejected += 1;
        }
        peak_len = peak_len.max(harness.buffer.len());

        if (step + 1) % PROGRESS_EVERY == 0 {
            tracing::debug!(target: LOG_TARGET, done = step + 1, len = harness.buffer.len(), "progress");
        }
    }

    let report = SoakReport {
        config: *config,
        ops,
        peak_len,
        final_len: harness.buffer.len(),
    };
    tracing::info!(target: LOG_TARGET, peak_len, final_len = report.final_len, "soak run finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Capacity, OpCount};

    fn config(capacity: usize, ops: u64, seed: u64) -> SoakConfig {
        SoakConfig {
            capacity: Capacity::new(capacity).expect("nonzero"),
            ops: OpCount::new(ops).expect("nonzero"),
            seed,
        }
    }

    #[test]
    fn agrees_with_model_across_seeds_and_capacities() {
        for capacity in [1, 2, 3, 7, 16] {
            for seed in [0, 1, 0xdead_beef, 2024] {
                let report = run(&config(capacity, 3_000, seed)).expect("no divergence");
                let total: u64 = report.ops.values().map(|s| s.attempted).sum();
                assert_eq!(total, 3_000);
                assert!(report.peak_len <= capacity);
            }
        }
    }

    #[test]
    fn exercises_full_and_empty_boundaries() {
        let report = run(&config(4, 5_000, 7)).expect("no divergence");
        assert_eq!(report.peak_len, 4);
        let rejected = |name: &str| report.ops.get(name).map(|s| s.rejected).unwrap_or(0);
        assert!(rejected("put") > 0, "full buffer never hit");
        assert!(rejected("get") > 0, "empty buffer never hit");
    }

    #[test]
    fn same_seed_replays_identically() {
        let a = run(&config(5, 2_000, 99)).expect("no divergence");
        let b = run(&config(5, 2_000, 99)).expect("no divergence");
        assert_eq!(a, b);
    }

    #[test]
    fn report_serializes_with_config() {
        let report = run(&config(2, 50, 3)).expect("no divergence");
        let json = serde_json::to_value(&report).expect("serializable");
        assert_eq!(json["config"]["capacity"], 2);
        assert_eq!(json["config"]["seed"], 3);
        assert!(json["ops"].is_object());
    }
}
