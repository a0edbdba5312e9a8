//! Typed positional arguments for procedure calls.

use std::fmt;

use chrono::{DateTime, Utc};

/// A single typed procedure argument.
#[derive(Debug, Clone)]
pub enum ProcArg {
    Int(i32),
    BigInt(i64),
    Text(String),
    OptText(Option<String>),
    Bytes(Vec<u8>),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

/// Ordered argument list, bound positionally as `$1..$n`.
#[derive(Debug, Clone, Default)]
pub struct ProcArgs(Vec<ProcArg>);

impl ProcArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int(mut self, value: i32) -> Self {
        self.0.push(ProcArg::Int(value));
        self
    }

    pub fn bigint(mut self, value: i64) -> Self {
        self.0.push(ProcArg::BigInt(value));
        self
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.0.push(ProcArg::Text(value.into()));
        self
    }

    pub fn opt_text(mut self, value: Option<String>) -> Self {
        self.0.push(ProcArg::OptText(value));
        self
    }

    pub fn bytes(mut self, value: Vec<u8>) -> Self {
        self.0.push(ProcArg::Bytes(value));
        self
    }

    pub fn boolean(mut self, value: bool) -> Self {
        self.0.push(ProcArg::Bool(value));
        self
    }

    pub fn timestamp(mut self, value: DateTime<Utc>) -> Self {
        self.0.push(ProcArg::Timestamp(value));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, ProcArg> {
        self.0.iter()
    }
}

impl fmt::Display for ProcArgs {
    /// Log rendering. Byte arguments carry password hashes and salts, so they
    /// render as their length only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "${}=", i + 1)?;
            match arg {
                ProcArg::Int(v) => write!(f, "{v}")?,
                ProcArg::BigInt(v) => write!(f, "{v}")?,
                ProcArg::Text(v) => write!(f, "{v:?}")?,
                ProcArg::OptText(Some(v)) => write!(f, "{v:?}")?,
                ProcArg::OptText(None) => write!(f, "NULL")?,
                ProcArg::Bytes(v) => write!(f, "bytes({})", v.len())?,
                ProcArg::Bool(v) => write!(f, "{v}")?,
                ProcArg::Timestamp(v) => write!(f, "{v}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_redacts_byte_arguments() {
        let args = ProcArgs::new()
            .int(7)
            .text("ana@example.com")
            .bytes(vec![0xca, 0xfe, 0xba, 0xbe])
            .opt_text(None);
        let rendered = args.to_string();
        assert_eq!("$1=7, $2=\"ana@example.com\", $3=bytes(4), $4=NULL", rendered);
        assert!(!rendered.contains("ca"));
    }

    #[test]
    fn len_counts_arguments() {
        assert_eq!(0, ProcArgs::new().len());
        assert!(ProcArgs::new().is_empty());
        assert_eq!(2, ProcArgs::new().int(1).boolean(true).len());
    }
}
