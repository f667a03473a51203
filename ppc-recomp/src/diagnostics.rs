//! Non-aborting diagnostics (spec.md §7): the recoverable findings the
//! recompiler records while it keeps going. Unlike [`crate::error::Error`],
//! none of these stop a translation run — the containing function is still
//! emitted and the output directory is still written.
//!
//! Grounded on how `fuel-vm` logs recoverable conditions (`tracing::warn!`
//! at the point of discovery) rather than threading them through `Result`;
//! here they are additionally collected so a caller can inspect the full set
//! after a run (the CLI prints a summary count per kind).

use std::fmt;

/// One occurrence of a recoverable condition from spec.md §7.
#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// The disassembler produced no opcode for the word at `address`.
    UnrecognizedInstruction { address: u32, raw: u32 },
    /// A known opcode has no emission rule in the dispatch table.
    UnsupportedInstruction { address: u32, mnemonic: &'static str },
    /// A `bctr` switch case target lies outside the containing function.
    OutOfRangeSwitchLabel { bctr_address: u32, case: usize, target: u32 },
    /// A record-form (`.`) instruction's emission produced no `cr0`/`cr6` write.
    RcWithoutCompare { address: u32, mnemonic: &'static str },
    /// A mid-asm hook mixes an unconditional and a conditional return/jump.
    MidAsmHookConflict { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnrecognizedInstruction { address, raw } => {
                write!(f, "Unable to decode instruction {raw:#010X} at {address:#010X}")
            }
            Diagnostic::UnsupportedInstruction { address, mnemonic } => {
                write!(f, "Unrecognized instruction at {address:#010X}: {mnemonic}")
            }
            Diagnostic::OutOfRangeSwitchLabel { bctr_address, case, target } => {
                write!(
                    f,
                    "Switch case {case} at {bctr_address:#010X} is trying to jump outside the function: {target:#010X}"
                )
            }
            Diagnostic::RcWithoutCompare { address, mnemonic } => {
                write!(f, "record-form {mnemonic} at {address:#010X} emitted no cr write")
            }
            Diagnostic::MidAsmHookConflict { name } => {
                write!(f, "mid-asm hook {name} mixes a direct and a conditional return/jump")
            }
        }
    }
}

/// Accumulates [`Diagnostic`]s over one recompiler run, owned by the
/// `Recompiler` value for its lifetime (spec.md §5: single-threaded, no
/// aliasing of run-owned state).
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `diagnostic` and emits the matching `tracing` event.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnrecognizedInstruction { address, raw } => {
                tracing::warn!(address = %format_args!("{address:#010X}"), raw = %format_args!("{raw:#010X}"), "unable to decode instruction");
            }
            Diagnostic::UnsupportedInstruction { address, mnemonic } => {
                tracing::warn!(address = %format_args!("{address:#010X}"), mnemonic, "unrecognized instruction");
            }
            Diagnostic::OutOfRangeSwitchLabel { bctr_address, case, target } => {
                tracing::warn!(bctr_address = %format_args!("{bctr_address:#010X}"), case, target = %format_args!("{target:#010X}"), "switch case target outside function");
            }
            Diagnostic::RcWithoutCompare { address, mnemonic } => {
                tracing::warn!(address = %format_args!("{address:#010X}"), mnemonic, "record-form instruction wrote no cr");
            }
            Diagnostic::MidAsmHookConflict { name } => {
                tracing::warn!(name, "mid-asm hook conflict");
            }
        }
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn count_unsupported(&self) -> usize {
        self.entries.iter().filter(|d| matches!(d, Diagnostic::UnsupportedInstruction { .. })).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut diags = Diagnostics::new();
        diags.record(Diagnostic::UnrecognizedInstruction { address: 0x1000, raw: 0xFFFF_FFFF });
        diags.record(Diagnostic::UnsupportedInstruction { address: 0x1004, mnemonic: "vrlimi128" });
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.count_unsupported(), 1);
    }
}
