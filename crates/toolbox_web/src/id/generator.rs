use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::clock::{Clock, SystemClock};
use super::{COUNTER_MASK, Id, ID_LEN, machine};

/// Produces [`Id`]s.
///
/// Owns the per-process counter, so one generator should be shared (behind an
/// `Arc`) by everything in the process that mints identifiers. Concurrent
/// calls to [`generate`](Self::generate) never hand out the same counter
/// value until the 24-bit counter wraps.
pub struct IdGenerator {
    clock: Arc<dyn Clock>,
    machine: [u8; 3],
    pid: u16,
    counter: AtomicU32,
}

impl IdGenerator {
    /// Generator seeded from the wall clock, the host identity, the OS process
    /// id and a random counter start.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> IdGeneratorBuilder {
        IdGeneratorBuilder::default()
    }

    pub fn generate(&self) -> Id {
        let secs = self.clock.now().timestamp();
        // seconds wrap modulo 2^32 past 2106
        let ts = secs as u32;
        let count = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; ID_LEN];
        bytes[0..4].copy_from_slice(&ts.to_be_bytes());
        bytes[4..7].copy_from_slice(&self.machine);
        bytes[7..9].copy_from_slice(&self.pid.to_be_bytes());
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..]);
        Id::from(bytes)
    }

    pub fn machine(&self) -> [u8; 3] {
        self.machine
    }

    pub fn pid(&self) -> u16 {
        self.pid
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("machine", &self.machine)
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

/// Builder for [`IdGenerator`]. Unset fields take the live defaults.
#[derive(Default)]
pub struct IdGeneratorBuilder {
    clock: Option<Arc<dyn Clock>>,
    machine: Option<[u8; 3]>,
    pid: Option<u16>,
    counter_seed: Option<u32>,
}

impl IdGeneratorBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn machine(mut self, machine: [u8; 3]) -> Self {
        self.machine = Some(machine);
        self
    }

    pub fn pid(mut self, pid: u16) -> Self {
        self.pid = Some(pid);
        self
    }

    /// First counter value handed out. Only the low 24 bits are used.
    pub fn counter_seed(mut self, seed: u32) -> Self {
        self.counter_seed = Some(seed);
        self
    }

    pub fn build(self) -> IdGenerator {
        let generator = IdGenerator {
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            machine: self.machine.unwrap_or_else(machine::machine_tag),
            pid: self.pid.unwrap_or_else(machine::process_id),
            counter: AtomicU32::new(self.counter_seed.unwrap_or_else(rand::random)),
        };
        tracing::debug!(
            machine = ?generator.machine,
            pid = generator.pid,
            "id generator ready"
        );
        generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::clock::FixedClock;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE;
    use std::collections::HashSet;

    fn fixed(seed: u32) -> IdGenerator {
        IdGenerator::builder()
            .clock(Arc::new(FixedClock::from_unix(1_700_000_000)))
            .machine([0xaa, 0xbb, 0xcc])
            .pid(0x1234)
            .counter_seed(seed)
            .build()
    }

    #[test]
    fn deterministic_layout() {
        let id = fixed(0x010203).generate();
        assert_eq!(
            id.as_bytes(),
            &[0x65, 0x53, 0xf1, 0x00, 0xaa, 0xbb, 0xcc, 0x12, 0x34, 0x01, 0x02, 0x03]
        );
    }

    #[test]
    fn counter_increases_within_same_second() {
        let generator = fixed(10);
        let a = generator.generate();
        let b = generator.generate();
        assert_eq!(a.timestamp(), b.timestamp());
        assert_eq!(b.counter(), a.counter() + 1);
        assert!(b.to_string() > a.to_string());
    }

    #[test]
    fn counter_wraps_at_24_bits() {
        let generator = fixed(0x00ff_ffff);
        assert_eq!(generator.generate().counter(), 0x00ff_ffff);
        assert_eq!(generator.generate().counter(), 0);
        assert_eq!(generator.generate().counter(), 1);
    }

    #[test]
    fn seed_above_24_bits_is_truncated() {
        let generator = fixed(0xff00_0005);
        assert_eq!(generator.generate().counter(), 5);
    }

    #[test]
    fn machine_and_pid_stable_across_calls() {
        let generator = IdGenerator::new();
        let first = generator.generate().decode();
        for _ in 0..16 {
            let next = generator.generate().decode();
            assert_eq!(next.machine, first.machine);
            assert_eq!(next.pid, first.pid);
        }
        assert_eq!(first.pid, machine::process_id());
        assert_eq!(first.pid, generator.pid());
        assert_eq!(first.machine, URL_SAFE.encode(generator.machine()));
    }

    #[test]
    fn timestamp_wraps_past_u32_seconds() {
        let generator = IdGenerator::builder()
            .clock(Arc::new(FixedClock::from_unix((1_i64 << 32) + 5)))
            .build();
        assert_eq!(generator.generate().timestamp(), 5);
    }

    #[test]
    fn concurrent_generation_is_unique() {
        let generator = Arc::new(fixed(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || {
                    (0..1000).map(|_| generator.generate()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8000);
    }

    #[test]
    fn live_generator_uses_current_time() {
        let before = chrono::Utc::now().timestamp();
        let id = IdGenerator::new().generate();
        let after = chrono::Utc::now().timestamp();
        let ts = i64::from(id.timestamp());
        assert!(ts >= before && ts <= after);
    }
}
