use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};

/// One of the four general purpose registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Register {
    A,
    B,
    C,
    D,
}

impl Register {
    /// Every register, in bank order.
    pub const ALL: [Register; 4] = [Register::A, Register::B, Register::C, Register::D];

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::A => "A",
            Register::B => "B",
            Register::C => "C",
            Register::D => "D",
        }
    }
}

impl FromStr for Register {
    type Err = Error;

    /// Case-insensitive: `a` and `A` name the same register.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Register::A),
            "B" => Ok(Register::B),
            "C" => Ok(Register::C),
            "D" => Ok(Register::D),
            _ => Err(Error::UnknownRegister(s.to_string())),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The register file of one simulated processor.
///
/// Always holds exactly four signed 32-bit values, all zero on creation. Name-based
/// accessors validate the name; typed accessors take a [`Register`] and cannot fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterBank {
    values: [i32; 4],
}

impl RegisterBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a register name against this bank.
    pub fn resolve(&self, name: &str) -> Result<Register> {
        name.parse()
    }

    /// Value of the register called `name`.
    pub fn get(&self, name: &str) -> Result<i32> {
        let reg = self.resolve(name)?;
        Ok(self.read(reg))
    }

    /// Overwrite the register called `name`.
    pub fn set(&mut self, name: &str, value: i32) -> Result<()> {
        let reg = self.resolve(name)?;
        self.write(reg, value);
        Ok(())
    }

    #[inline(always)]
    pub fn read(&self, reg: Register) -> i32 {
        self.values[reg.index()]
    }

    #[inline(always)]
    pub fn write(&mut self, reg: Register, value: i32) {
        self.values[reg.index()] = value;
    }

    /// Zero every register.
    pub fn reset(&mut self) {
        self.values = [0; 4];
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            values: self.values,
        }
    }
}

/// A point-in-time copy of all four registers.
///
/// Serializes as a map from register name to value, e.g. `{"A":30,"B":20,"C":0,"D":0}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Snapshot {
    values: [i32; 4],
}

impl Snapshot {
    pub fn get(&self, reg: Register) -> i32 {
        self.values[reg.index()]
    }

    /// Look up a register by (case-insensitive) name.
    pub fn by_name(&self, name: &str) -> Result<i32> {
        let reg: Register = name.parse()?;
        Ok(self.get(reg))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Register, i32)> + '_ {
        Register::ALL.iter().map(move |&r| (r, self.get(r)))
    }

    pub fn is_zeroed(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }
}

impl Index<Register> for Snapshot {
    type Output = i32;

    fn index(&self, reg: Register) -> &i32 {
        &self.values[reg.index()]
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (reg, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{reg}={value}")?;
        }
        Ok(())
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Register::ALL.len()))?;
        for (reg, value) in self.iter() {
            map.serialize_entry(reg.name(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_bank_reads_zero() {
        let bank = RegisterBank::new();
        for name in ["A", "B", "C", "D"] {
            assert_eq!(bank.get(name), Ok(0));
        }
    }

    #[test]
    fn test_set_then_get() {
        let mut bank = RegisterBank::new();
        bank.set("C", -42).unwrap();
        assert_eq!(bank.get("C"), Ok(-42));
        assert_eq!(bank.get("A"), Ok(0));
        assert_eq!(bank.get("B"), Ok(0));
        assert_eq!(bank.get("D"), Ok(0));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut bank = RegisterBank::new();
        bank.set("b", 7).unwrap();
        assert_eq!(bank.get("B"), Ok(7));
        assert_eq!(bank.read(Register::B), 7);
    }

    #[test]
    fn test_unknown_register() {
        let mut bank = RegisterBank::new();
        assert_eq!(bank.get("X"), Err(Error::UnknownRegister("X".into())));
        assert_eq!(bank.set("AB", 1), Err(Error::UnknownRegister("AB".into())));
        assert_eq!(bank.get(""), Err(Error::UnknownRegister("".into())));
        assert_eq!(bank, RegisterBank::new());
    }

    #[test]
    fn test_reset() {
        let mut bank = RegisterBank::new();
        for (i, reg) in Register::ALL.into_iter().enumerate() {
            bank.write(reg, i as i32 + 1);
        }
        bank.reset();
        assert!(bank.snapshot().is_zeroed());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut bank = RegisterBank::new();
        bank.set("A", 1).unwrap();
        let snap = bank.snapshot();
        bank.set("A", 2).unwrap();
        assert_eq!(snap[Register::A], 1);
        assert_eq!(bank.snapshot()[Register::A], 2);
    }

    #[test]
    fn test_snapshot_display() {
        let mut bank = RegisterBank::new();
        bank.set("A", 30).unwrap();
        bank.set("D", -1).unwrap();
        assert_eq!(bank.snapshot().to_string(), "A=30 B=0 C=0 D=-1");
    }

    #[test]
    fn test_snapshot_serializes_as_map() {
        let mut bank = RegisterBank::new();
        bank.set("B", 20).unwrap();
        let json = serde_json::to_string(&bank.snapshot()).unwrap();
        assert_eq!(json, r#"{"A":0,"B":20,"C":0,"D":0}"#);
    }

    #[test]
    fn test_snapshot_by_name() {
        let mut bank = RegisterBank::new();
        bank.set("d", 9).unwrap();
        let snap = bank.snapshot();
        assert_eq!(snap.by_name("D"), Ok(9));
        assert!(snap.by_name("E").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_register() -> impl Strategy<Value = Register> {
        prop::sample::select(Register::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn set_get_roundtrip_leaves_others(reg in any_register(), value in any::<i32>()) {
            let mut bank = RegisterBank::new();
            bank.set(reg.name(), value).unwrap();
            for other in Register::ALL {
                let expected = if other == reg { value } else { 0 };
                prop_assert_eq!(bank.get(other.name()), Ok(expected));
            }
        }

        #[test]
        fn reset_always_zeroes(values in prop::array::uniform4(any::<i32>())) {
            let mut bank = RegisterBank::new();
            for (reg, v) in Register::ALL.into_iter().zip(values) {
                bank.write(reg, v);
            }
            bank.reset();
            prop_assert!(bank.snapshot().is_zeroed());
        }

        #[test]
        fn arbitrary_names_never_panic(name in ".{0,4}") {
            let bank = RegisterBank::new();
            let valid = matches!(name.to_ascii_uppercase().as_str(), "A" | "B" | "C" | "D");
            prop_assert_eq!(bank.get(&name).is_ok(), valid);
        }
    }
}
