use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::register::{Register, RegisterBank};

/// The seven mnemonics understood by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `SET r n`: r = n
    Set,
    /// `ADD r n`: r = r + n
    Add,
    /// `ADR r s`: r = r + s
    Adr,
    /// `MOV r s`: r = s
    Mov,
    /// `INR r`: r = r + 1
    Inr,
    /// `DCR r`: r = r - 1
    Dcr,
    /// `RST`: every register = 0
    Rst,
}

impl Opcode {
    pub const ALL: [Opcode; 7] = [
        Opcode::Set,
        Opcode::Add,
        Opcode::Adr,
        Opcode::Mov,
        Opcode::Inr,
        Opcode::Dcr,
        Opcode::Rst,
    ];

    /// Number of operands that must follow the mnemonic.
    pub fn arity(self) -> usize {
        match self {
            Opcode::Set | Opcode::Add | Opcode::Adr | Opcode::Mov => 2,
            Opcode::Inr | Opcode::Dcr => 1,
            Opcode::Rst => 0,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Set => "SET",
            Opcode::Add => "ADD",
            Opcode::Adr => "ADR",
            Opcode::Mov => "MOV",
            Opcode::Inr => "INR",
            Opcode::Dcr => "DCR",
            Opcode::Rst => "RST",
        }
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownInstruction(s.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A decoded instruction.
///
/// Operands are kept verbatim. Register names are only checked against the bank when the
/// instruction runs, so `SET X 1` decodes fine and fails in [`Instruction::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    Set { target: String, literal: String },
    AddConstant { target: String, literal: String },
    AddRegister { target: String, source: String },
    Move { target: String, source: String },
    Increment { target: String },
    Decrement { target: String },
    Reset,
}

impl Instruction {
    /// Build the variant for `opcode` from its operand tokens.
    ///
    /// Fails with `InvalidSyntax` if the operand count does not match the opcode's arity.
    pub fn new<S: AsRef<str>>(opcode: Opcode, operands: &[S]) -> Result<Self> {
        if operands.len() != opcode.arity() {
            return Err(Error::InvalidSyntax(format!("Invalid {opcode} instruction syntax")));
        }
        let arg = |i: usize| operands[i].as_ref().to_string();
        let instr = match opcode {
            Opcode::Set => Instruction::Set {
                target: arg(0),
                literal: arg(1),
            },
            Opcode::Add => Instruction::AddConstant {
                target: arg(0),
                literal: arg(1),
            },
            Opcode::Adr => Instruction::AddRegister {
                target: arg(0),
                source: arg(1),
            },
            Opcode::Mov => Instruction::Move {
                target: arg(0),
                source: arg(1),
            },
            Opcode::Inr => Instruction::Increment { target: arg(0) },
            Opcode::Dcr => Instruction::Decrement { target: arg(0) },
            Opcode::Rst => Instruction::Reset,
        };
        Ok(instr)
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Set { .. } => Opcode::Set,
            Instruction::AddConstant { .. } => Opcode::Add,
            Instruction::AddRegister { .. } => Opcode::Adr,
            Instruction::Move { .. } => Opcode::Mov,
            Instruction::Increment { .. } => Opcode::Inr,
            Instruction::Decrement { .. } => Opcode::Dcr,
            Instruction::Reset => Opcode::Rst,
        }
    }

    /// Apply this instruction to `bank`.
    ///
    /// All register operands are resolved first (target, then source), then any integer
    /// literal is parsed, and only then is the bank written. On error the bank is untouched.
    /// Arithmetic wraps on overflow.
    pub fn execute(&self, bank: &mut RegisterBank) -> Result<()> {
        match self {
            Instruction::Set { target, literal } => {
                let dst = bank.resolve(target)?;
                let value = parse_literal(Opcode::Set, literal)?;
                bank.write(dst, value);
            }
            Instruction::AddConstant { target, literal } => {
                let dst = bank.resolve(target)?;
                let value = parse_literal(Opcode::Add, literal)?;
                bank.write(dst, bank.read(dst).wrapping_add(value));
            }
            Instruction::AddRegister { target, source } => {
                let (dst, src) = resolve_pair(bank, target, source)?;
                bank.write(dst, bank.read(dst).wrapping_add(bank.read(src)));
            }
            Instruction::Move { target, source } => {
                let (dst, src) = resolve_pair(bank, target, source)?;
                bank.write(dst, bank.read(src));
            }
            Instruction::Increment { target } => {
                let dst = bank.resolve(target)?;
                bank.write(dst, bank.read(dst).wrapping_add(1));
            }
            Instruction::Decrement { target } => {
                let dst = bank.resolve(target)?;
                bank.write(dst, bank.read(dst).wrapping_sub(1));
            }
            Instruction::Reset => bank.reset(),
        }
        Ok(())
    }
}

fn resolve_pair(bank: &RegisterBank, target: &str, source: &str) -> Result<(Register, Register)> {
    let dst = bank.resolve(target)?;
    let src = bank.resolve(source)?;
    Ok((dst, src))
}

fn parse_literal(opcode: Opcode, literal: &str) -> Result<i32> {
    literal
        .parse::<i32>()
        .map_err(|_| Error::InvalidSyntax(format!("Invalid value for {opcode} instruction: {literal}")))
}

impl fmt::Display for Instruction {
    /// Canonical text form: upper-case mnemonic, operands as written.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode();
        match self {
            Instruction::Set { target, literal } | Instruction::AddConstant { target, literal } => {
                write!(f, "{op} {target} {literal}")
            }
            Instruction::AddRegister { target, source } | Instruction::Move { target, source } => {
                write!(f, "{op} {target} {source}")
            }
            Instruction::Increment { target } | Instruction::Decrement { target } => {
                write!(f, "{op} {target}")
            }
            Instruction::Reset => write!(f, "{op}"),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn operand() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(vec!["A", "b", "C", "d", "X", "", "AA"]).prop_map(String::from),
            any::<i32>().prop_map(|n| n.to_string()),
            "[ -~]{0,6}",
        ]
    }

    proptest! {
        #[test]
        fn failed_execution_never_mutates(
            op in prop::sample::select(Opcode::ALL.to_vec()),
            args in prop::collection::vec(operand(), 2),
            start in prop::array::uniform4(any::<i32>()),
        ) {
            let mut bank = RegisterBank::new();
            for (reg, v) in Register::ALL.into_iter().zip(start) {
                bank.write(reg, v);
            }
            let before = bank.clone();
            let instr = Instruction::new(op, &args[..op.arity()]).unwrap();
            if instr.execute(&mut bank).is_err() {
                prop_assert_eq!(bank, before);
            }
        }

        #[test]
        fn add_matches_wrapping_arithmetic(a in any::<i32>(), b in any::<i32>()) {
            let mut bank = RegisterBank::new();
            bank.write(Register::A, a);
            Instruction::new(Opcode::Add, &["A".to_string(), b.to_string()])
                .unwrap()
                .execute(&mut bank)
                .unwrap();
            prop_assert_eq!(bank.read(Register::A), a.wrapping_add(b));
        }
    }
}
