use std::fmt;

use serde::Serialize;

use crate::error::Error;
use crate::register::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Outcome of an execute, batch or reset request.
///
/// On success `registers` holds the snapshot after execution. On failure `message` holds the
/// error text, and a failed batch also reports where it stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registers: Option<Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_instruction: Option<String>,
}

impl Response {
    pub fn success(registers: Snapshot) -> Self {
        Self {
            status: Status::Success,
            kind: None,
            message: None,
            registers: Some(registers),
            failed_index: None,
            failed_instruction: None,
        }
    }

    pub fn error(err: &Error) -> Self {
        let (failed_index, failed_instruction) = match err {
            Error::Batch(f) => (Some(f.index), Some(f.line.clone())),
            _ => (None, None),
        };
        Self {
            status: Status::Error,
            kind: Some(err.kind()),
            message: Some(err.to_string()),
            registers: None,
            failed_index,
            failed_instruction,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

impl From<crate::error::Result<Snapshot>> for Response {
    fn from(result: crate::error::Result<Snapshot>) -> Self {
        match result {
            Ok(snap) => Response::success(snap),
            Err(err) => Response::error(&err),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.registers, &self.message) {
            (Some(regs), _) => write!(f, "{regs}"),
            (None, Some(msg)) => write!(f, "error: {msg}"),
            (None, None) => write!(f, "error"),
        }
    }
}

/// Value of a single register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterValue {
    pub register: String,
    pub value: i32,
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.register, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BatchFailure;
    use crate::register::RegisterBank;

    #[test]
    fn test_success_json() {
        let mut bank = RegisterBank::new();
        bank.set("A", 30).unwrap();
        let json = serde_json::to_string(&Response::success(bank.snapshot())).unwrap();
        assert_eq!(
            json,
            r#"{"status":"success","registers":{"A":30,"B":0,"C":0,"D":0}}"#
        );
    }

    #[test]
    fn test_error_json() {
        let err = Error::UnknownRegister("X".into());
        let json = serde_json::to_string(&Response::error(&err)).unwrap();
        assert_eq!(
            json,
            r#"{"status":"error","kind":"unknown_register","message":"Invalid register: X"}"#
        );
    }

    #[test]
    fn test_batch_error_reports_position() {
        let err: Error = BatchFailure::new(1, "XXX B 20", Error::UnknownInstruction("XXX".into())).into();
        let resp = Response::error(&err);
        assert!(!resp.is_success());
        assert_eq!(resp.failed_index, Some(1));
        assert_eq!(resp.failed_instruction.as_deref(), Some("XXX B 20"));
        assert_eq!(resp.kind, Some("batch_failure"));
    }

    #[test]
    fn test_display() {
        let resp = Response::from(Ok::<_, Error>(RegisterBank::new().snapshot()));
        assert_eq!(resp.to_string(), "A=0 B=0 C=0 D=0");
        let resp = Response::from(Err::<Snapshot, _>(Error::EmptyBatch));
        assert_eq!(resp.to_string(), "error: batch must contain at least one instruction");
        let value = RegisterValue {
            register: "B".into(),
            value: -3,
        };
        assert_eq!(value.to_string(), "B=-3");
    }
}
