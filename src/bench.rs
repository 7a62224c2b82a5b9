use std::time::{Duration, Instant};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;

use crate::instruction::Opcode;
use crate::processor::execute_one;
use crate::register::{Register, RegisterBank, Snapshot};

/// Configuration for a throughput run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of independent processors, each with its own register bank.
    pub processors: usize,
    /// Instructions replayed on each processor.
    pub program_len: usize,
    /// Probability that a generated line is malformed (0.0 to disable).
    pub error_rate: f64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            processors: 64,
            program_len: 1 << 14, // 16384
            error_rate: 0.01,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchReport {
    pub instructions: u64,
    pub failures: u64,
    pub elapsed: Duration,
    /// Final registers of every processor, in processor order.
    pub snapshots: Vec<Snapshot>,
}

impl BenchReport {
    pub fn instructions_per_sec(&self) -> f64 {
        self.instructions as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }
}

fn random_register(rng: &mut SmallRng) -> Register {
    Register::ALL[rng.gen_range(0..Register::ALL.len())]
}

/// One well-formed instruction line, chosen uniformly over the opcodes.
fn random_instruction(rng: &mut SmallRng) -> String {
    let op = Opcode::ALL[rng.gen_range(0..Opcode::ALL.len())];
    let r = random_register(rng);
    match op {
        Opcode::Set | Opcode::Add => format!("{op} {r} {}", rng.gen_range(-1000i32..=1000)),
        Opcode::Adr | Opcode::Mov => format!("{op} {r} {}", random_register(rng)),
        Opcode::Inr | Opcode::Dcr => format!("{op} {r}"),
        Opcode::Rst => op.to_string(),
    }
}

/// One line that fails to decode or execute.
fn random_malformed(rng: &mut SmallRng) -> String {
    match rng.gen_range(0..4) {
        0 => "XXX A 1".to_string(),
        1 => "SET A".to_string(),
        2 => format!("INR {}", ["E", "X", "AB"][rng.gen_range(0..3)]),
        _ => "ADD B not_a_number".to_string(),
    }
}

/// Generate a reproducible instruction stream.
pub fn random_program(len: usize, error_rate: f64, seed: u64) -> Vec<String> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if error_rate > 0.0 && rng.gen_bool(error_rate.min(1.0)) {
                random_malformed(&mut rng)
            } else {
                random_instruction(&mut rng)
            }
        })
        .collect()
}

/// Replay `program` on `bank` line by line. Failing lines are skipped, not fatal.
///
/// Returns the number of lines that failed.
pub fn replay(bank: &mut RegisterBank, program: &[String]) -> u64 {
    program
        .iter()
        .filter(|line| execute_one(bank, line).is_err())
        .count() as u64
}

/// Generate one program per processor (seeded from `seed` and the processor index) and
/// replay them all in parallel.
pub fn run(config: &BenchConfig, seed: u64) -> BenchReport {
    let programs: Vec<Vec<String>> = (0..config.processors)
        .map(|i| random_program(config.program_len, config.error_rate, seed.wrapping_add(i as u64)))
        .collect();

    let start = Instant::now();
    let results: Vec<(Snapshot, u64)> = programs
        .par_iter()
        .map(|program| {
            let mut bank = RegisterBank::new();
            let failures = replay(&mut bank, program);
            (bank.snapshot(), failures)
        })
        .collect();
    let elapsed = start.elapsed();

    let failures: u64 = results.iter().map(|(_, f)| f).sum();
    crate::info!(
        "replayed {} processors x {} instructions in {elapsed:.2?}",
        config.processors,
        config.program_len
    );
    BenchReport {
        instructions: config.processors as u64 * config.program_len as u64,
        failures,
        elapsed,
        snapshots: results.into_iter().map(|(s, _)| s).collect(),
    }
}
