//! A four-register microprocessor simulator.
//!
//! Instruction lines such as `SET A 10` or `ADR B A` are decoded by [`decode::decode`] into
//! an [`instruction::Instruction`] and applied to a [`register::RegisterBank`]. The
//! [`processor`] module sequences single instructions and batches.
//!
//! ```
//! use regsim::processor::Processor;
//! use regsim::register::Register;
//!
//! let mut cpu = Processor::new();
//! let regs = cpu.execute_batch(&["SET A 10", "SET B 20", "ADR A B"]).unwrap();
//! assert_eq!(regs[Register::A], 30);
//! ```

pub mod log;
pub mod error;
pub mod register;
pub mod instruction;
pub mod decode;
pub mod processor;
pub mod response;
pub mod session;
pub mod bench;

pub use error::{BatchFailure, Error, Result};
