/// Successful command outcomes and their exit codes.
///
/// An invalid address is a normal result, not an error: it shares exit
/// code `1` with missing credentials but never writes to stderr.

/// What a command finished with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything checked out (or nothing needed checking).
    Done,
    /// At least one address came back invalid.
    Invalid,
    /// An asynchronous job was accepted; completion is not known yet.
    Submitted,
}

impl Outcome {
    /// Outcome for a single validity flag.
    #[must_use]
    pub fn from_validity(valid: bool) -> Self {
        if valid { Self::Done } else { Self::Invalid }
    }

    /// Outcome for a synchronous batch with `invalid` failing addresses.
    #[must_use]
    pub fn from_invalid_count(invalid: u64) -> Self {
        if invalid > 0 { Self::Invalid } else { Self::Done }
    }

    /// Return the process exit code for this outcome.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Done | Self::Submitted => 0,
            Self::Invalid => 1,
        }
    }
}
