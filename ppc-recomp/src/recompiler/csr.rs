//! FPU/VMX control-state shadow tracking (spec.md §4.3 "CSR shadow state").
//!
//! Grounded on `XenonRecomp/recompiler.h`'s `enum class CSRState` and the
//! `csrState` transitions scattered through `recompiler.cpp` (e.g. the
//! `PPC_INST_BCTRL`/`PPC_INST_BL` arms resetting it to `Unknown`): avoids
//! redundantly toggling the host FPU's flush-mode control bits between
//! adjacent floating-point and vector instructions.

/// Which flush-mode regime host-side MXCSR is currently believed to be in.
/// `Unknown` forces the next FPU/VMX instruction to emit its transition
/// unconditionally (spec.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsrState {
    #[default]
    Unknown,
    Fpu,
    Vmx,
}

impl CsrState {
    /// Returns the host call to emit (if any) to transition into `target`,
    /// and updates `self` to reflect the new state. `None` means the state
    /// already matched and nothing needs to be emitted.
    pub fn transition(&mut self, target: CsrState) -> Option<&'static str> {
        if *self == target {
            return None;
        }
        *self = target;
        match target {
            CsrState::Fpu => Some("ctx.fpscr.disableFlushMode();"),
            CsrState::Vmx => Some("ctx.fpscr.enableFlushModeUnconditional();"),
            CsrState::Unknown => None,
        }
    }

    /// A label crossing or any call resets shadow tracking to `Unknown`
    /// (spec.md §4.3): the next FPU/VMX instruction must re-emit its
    /// transition even if it matches what was last known.
    pub fn reset(&mut self) {
        *self = CsrState::Unknown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fpu_instruction_emits_unconditionally() {
        let mut state = CsrState::Unknown;
        assert_eq!(state.transition(CsrState::Fpu), Some("ctx.fpscr.disableFlushMode();"));
        assert_eq!(state, CsrState::Fpu);
    }

    #[test]
    fn repeated_fpu_instruction_emits_nothing() {
        let mut state = CsrState::Fpu;
        assert_eq!(state.transition(CsrState::Fpu), None);
    }

    #[test]
    fn switching_kind_emits_the_other_transition() {
        let mut state = CsrState::Fpu;
        assert_eq!(state.transition(CsrState::Vmx), Some("ctx.fpscr.enableFlushModeUnconditional();"));
    }

    #[test]
    fn reset_forces_next_transition() {
        let mut state = CsrState::Fpu;
        state.reset();
        assert_eq!(state, CsrState::Unknown);
        assert_eq!(state.transition(CsrState::Fpu), Some("ctx.fpscr.disableFlushMode();"));
    }
}
