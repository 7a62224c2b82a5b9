use crate::decode::decode;
use crate::error::{BatchFailure, Error, Result};
use crate::register::{RegisterBank, Snapshot};

/// Decode `line` and apply it to `bank`. Errors are returned unchanged.
pub fn execute_one(bank: &mut RegisterBank, line: &str) -> Result<()> {
    let instr = decode(line)?;
    instr.execute(bank)?;
    crate::debug!("{instr} -> {}", bank.snapshot());
    Ok(())
}

/// Run `lines` in order against `bank` and return the final register values.
///
/// The batch is a sequential replay, not a transaction: when line `i` fails, lines
/// `0..i` stay applied and the error reports `i` together with the failing text.
/// An empty batch is rejected before anything runs.
pub fn execute_batch<S: AsRef<str>>(bank: &mut RegisterBank, lines: &[S]) -> Result<Snapshot> {
    if lines.is_empty() {
        return Err(Error::EmptyBatch);
    }
    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if let Err(source) = execute_one(bank, line) {
            let failure = BatchFailure::new(index, line, source);
            crate::warn!("{failure}");
            return Err(failure.into());
        }
    }
    Ok(bank.snapshot())
}

/// A simulated processor: one register bank plus the operations callers use on it.
///
/// Each `Processor` owns its bank, so independent processors never share state.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    bank: RegisterBank,
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a single instruction and return the updated registers.
    pub fn execute(&mut self, line: &str) -> Result<Snapshot> {
        execute_one(&mut self.bank, line)?;
        Ok(self.bank.snapshot())
    }

    /// Execute a batch. See [`execute_batch`].
    pub fn execute_batch<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<Snapshot> {
        execute_batch(&mut self.bank, lines)
    }

    /// Value of one register, by case-insensitive name.
    pub fn register(&self, name: &str) -> Result<i32> {
        self.bank.get(name)
    }

    pub fn registers(&self) -> Snapshot {
        self.bank.snapshot()
    }

    /// Zero every register by running `RST`.
    pub fn reset(&mut self) -> Result<Snapshot> {
        self.execute("RST")
    }

    pub fn bank(&self) -> &RegisterBank {
        &self.bank
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn line() -> impl Strategy<Value = String> {
        let reg = prop::sample::select(vec!["A", "B", "C", "D", "E"]);
        prop_oneof![
            (reg.clone(), any::<i16>()).prop_map(|(r, n)| format!("SET {r} {n}")),
            (reg.clone(), any::<i16>()).prop_map(|(r, n)| format!("ADD {r} {n}")),
            (reg.clone(), reg.clone()).prop_map(|(r, s)| format!("ADR {r} {s}")),
            (reg.clone(), reg.clone()).prop_map(|(r, s)| format!("MOV {r} {s}")),
            reg.clone().prop_map(|r| format!("INR {r}")),
            reg.prop_map(|r| format!("DCR {r}")),
            Just("RST".to_string()),
            "[A-Z]{3} [A-Z]",
        ]
    }

    proptest! {
        #[test]
        fn batch_equals_prefix_replay(lines in prop::collection::vec(line(), 1..20)) {
            let mut batched = RegisterBank::new();
            let result = execute_batch(&mut batched, &lines);

            // Replaying one line at a time up to the first error must land on the same state.
            let mut stepped = RegisterBank::new();
            let mut failed_at = None;
            for (i, l) in lines.iter().enumerate() {
                if execute_one(&mut stepped, l).is_err() {
                    failed_at = Some(i);
                    break;
                }
            }
            prop_assert_eq!(&batched, &stepped);
            match (result, failed_at) {
                (Ok(snap), None) => {
                    prop_assert_eq!(snap, stepped.snapshot());
                }
                (Err(Error::Batch(f)), Some(i)) => {
                    prop_assert_eq!(f.index, i);
                    prop_assert_eq!(&f.line, &lines[i]);
                }
                (other, expected) => {
                    prop_assert!(false, "{:?} vs {:?}", other, expected);
                }
            }
        }
    }
}
