//! Per-opcode emission (spec.md §4.3.1): translates one decoded instruction
//! into a host-language source fragment appended to an [`Emitter`].
//!
//! Grounded directly on the giant `switch (insn.opcode->id)` in
//! `XenonRecomp/recompiler.cpp`'s `Recompiler::Recompile` — each arm below
//! is a line-for-line idiomatic translation of the matching `case` there,
//! using the same register-accessor/`println` shape but through
//! [`RecompilerLocalVariables`] instead of free functions closing over
//! `this`. Every opcode `ppc_asm::opcode::OPCODES` can decode has an arm
//! here (spec.md §4.3.1's "a complete opcode → emission table is
//! mandatory"), with two narrow, explicitly documented exceptions recorded
//! in `DESIGN.md`: `vrlimi128` (the VMX128 rotate-count field's bit mapping
//! cannot be confirmed from the retrieved ISA reference) and a handful of
//! `OpcodeId` variants (`Addme`, `Subfme`, `Subfze`, `Rlwnm`, `Mtcrf`,
//! `Mtocrf`, `Mtmsr`) that the original source this is grounded on never
//! emits either, so there is nothing to translate. Both cases still fall
//! through to the diagnosed `UnsupportedInstruction` path below rather than
//! panicking.

use ppc_asm::bits::compute_mask;
use ppc_asm::opcode::OpcodeId;
use ppc_asm::GuestInstruction;

use crate::config::Config;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::emit::Emitter;

use super::csr::CsrState;
use super::registers::RecompilerLocalVariables;

/// Constant word pattern for `eieio`, used by the MMIO-store peephole
/// (spec.md §4.3's "MMIO-store peephole").
pub const EIEIO_WORD: u32 = 0xAC06_007C;

/// Everything one dispatch call needs to know about the function it's
/// emitting into, to resolve branch targets as in-function `goto`s or
/// cross-function calls.
pub struct DispatchContext<'a> {
    pub config: &'a Config,
    pub locals: &'a mut RecompilerLocalVariables,
    pub csr: &'a mut CsrState,
    pub diagnostics: &'a mut Diagnostics,
    pub fn_base: u32,
    pub fn_end: u32,
    /// `true` when the word immediately following this instruction is
    /// `eieio` (spec.md §4.3's MMIO-store peephole).
    pub followed_by_eieio: bool,
    /// Resolves an absolute guest address to the symbol name the recompiler
    /// should call, if one is known (used for `bl`/direct calls).
    pub symbol_at: &'a dyn Fn(u32) -> Option<&'a str>,
}

impl DispatchContext<'_> {
    fn in_function(&self, target: u32) -> bool {
        target >= self.fn_base && target < self.fn_end
    }
}

/// Emits the host fragment for one instruction, recording a diagnostic and
/// a `// ERROR` comment for any opcode with no dispatch rule (spec.md §7's
/// `UnsupportedInstruction`).
pub fn recompile_instruction(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction) {
    match insn.id() {
        OpcodeId::Addi => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let simm = insn.operand(2) as i32;
            if ra != 0 {
                let ra = ctx.locals.gpr(ctx.config, ra as usize);
                out.println(&format!("\t{rt}.s64 = {ra}.s64 + {simm};"));
            } else {
                out.println(&format!("\t{rt}.s64 = {simm};"));
            }
        }

        OpcodeId::Addis => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let simm = (insn.operand(2) as i32) << 16;
            if ra != 0 {
                let ra = ctx.locals.gpr(ctx.config, ra as usize);
                out.println(&format!("\t{rt}.s64 = {ra}.s64 + {simm};"));
            } else {
                out.println(&format!("\t{rt}.s64 = {simm};"));
            }
        }

        OpcodeId::Addic | OpcodeId::AddicRc => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let simm = insn.operand(2) as i32;
            let xer = ctx.locals.xer(ctx.config);
            out.println(&format!("\t{xer}.ca = {ra}.u32 > ~uint32_t({simm});"));
            out.println(&format!("\t{rt}.s64 = {ra}.s64 + {simm};"));
            if insn.id() == OpcodeId::AddicRc {
                emit_record_form_cr0(out, ctx, insn, &rt);
            }
        }

        OpcodeId::Subfic => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let simm = insn.operand(2) as i32;
            let xer = ctx.locals.xer(ctx.config);
            out.println(&format!("\t{xer}.ca = {ra}.u32 <= uint32_t({simm});"));
            out.println(&format!("\t{rt}.s64 = {simm} - {ra}.s64;"));
        }

        OpcodeId::Add => {
            emit_binop_rc(out, ctx, insn, "u64", "+");
        }
        OpcodeId::Subf => {
            // subf RT, RA, RB computes RB - RA (spec.md's arithmetic family).
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{rt}.u64 = {rb}.u64 - {ra}.u64;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }
        OpcodeId::Subfc => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let xer = ctx.locals.xer(ctx.config);
            out.println(&format!("\t{xer}.ca = {rb}.u32 >= {ra}.u32;"));
            out.println(&format!("\t{rt}.s64 = {rb}.s64 - {ra}.s64;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }

        OpcodeId::Addc => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let xer = ctx.locals.xer(ctx.config);
            out.println(&format!("\t{rt}.u64 = {ra}.u64 + {rb}.u64;"));
            out.println(&format!("\t{xer}.ca = {rt}.u32 < {ra}.u32;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }

        OpcodeId::Adde => {
            // Two-stage carry so the carry-in itself cannot be lost
            // (spec.md §4.3.1's "Arithmetic with carry" contract).
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let xer = ctx.locals.xer(ctx.config);
            let temp = ctx.locals.temp().to_string();
            out.println(&format!(
                "\t{temp}.u8 = ({ra}.u32 + {rb}.u32 < {ra}.u32) | ({ra}.u32 + {rb}.u32 + {xer}.ca < {xer}.ca);"
            ));
            out.println(&format!("\t{rt}.u64 = {ra}.u64 + {rb}.u64 + {xer}.ca;"));
            out.println(&format!("\t{xer}.ca = {temp}.u8;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }

        OpcodeId::Subfe => {
            // Same two-stage carry as `adde`, but with RA bitwise-inverted:
            // subtraction-as-addition in two's complement (spec.md §9's
            // "two-term overflow test identical in spirit to adde" Open
            // Question — implemented, not declined; see DESIGN.md).
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let xer = ctx.locals.xer(ctx.config);
            let temp = ctx.locals.temp().to_string();
            out.println(&format!(
                "\t{temp}.u8 = (~{ra}.u32 + {rb}.u32 < ~{ra}.u32) | (~{ra}.u32 + {rb}.u32 + {xer}.ca < {xer}.ca);"
            ));
            out.println(&format!("\t{rt}.u64 = ~{ra}.u64 + {rb}.u64 + {xer}.ca;"));
            out.println(&format!("\t{xer}.ca = {temp}.u8;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }

        OpcodeId::Addze => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let xer = ctx.locals.xer(ctx.config);
            let temp = ctx.locals.temp().to_string();
            out.println(&format!("\t{temp}.s64 = {ra}.s64 + {xer}.ca;"));
            out.println(&format!("\t{xer}.ca = {temp}.u32 < {ra}.u32;"));
            out.println(&format!("\t{rt}.s64 = {temp}.s64;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }

        OpcodeId::Neg => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!("\t{rt}.s64 = -{ra}.s64;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }

        // Integer divide: the original emits a bare host `/`, whose
        // divide-by-zero behavior is undefined (spec.md §9's first Open
        // Question). Decision (recorded in DESIGN.md): match the source's
        // silent UB rather than inserting a trap or a saturating guard, so
        // the emitted function is a faithful translation; a host running
        // this output with `-ftrapv`-style guards is expected to supply its
        // own division wrapper if it needs defined behavior.
        OpcodeId::Divw => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{rt}.s32 = {ra}.s32 / {rb}.s32;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }
        OpcodeId::Divwu => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{rt}.u32 = {ra}.u32 / {rb}.u32;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }
        OpcodeId::Divd => {
            // No record-form compare: matches the original's asymmetric
            // treatment of `divd` vs. its `divdu`/`divw`/`divwu` siblings.
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{rt}.s64 = {ra}.s64 / {rb}.s64;"));
        }
        OpcodeId::Divdu => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{rt}.u64 = {ra}.u64 / {rb}.u64;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }

        OpcodeId::Mulli => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let simm = insn.operand(2) as i32;
            out.println(&format!("\t{rt}.s64 = {ra}.s64 * {simm};"));
        }
        OpcodeId::Mullw => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{rt}.s64 = int64_t({ra}.s32) * int64_t({rb}.s32);"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }
        OpcodeId::Mulld => {
            // No record-form compare in the original, mirroring `divd`.
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{rt}.s64 = {ra}.s64 * {rb}.s64;"));
        }
        OpcodeId::Mulhw => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{rt}.s64 = (int64_t({ra}.s32) * int64_t({rb}.s32)) >> 32;"));
        }
        OpcodeId::Mulhwu => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{rt}.u64 = (uint64_t({ra}.u32) * uint64_t({rb}.u32)) >> 32;"));
            emit_record_form_cr0(out, ctx, insn, &rt);
        }

        OpcodeId::And => emit_binop_rc(out, ctx, insn, "u64", "&"),
        OpcodeId::Or => emit_binop_rc(out, ctx, insn, "u64", "|"),
        OpcodeId::Xor => emit_binop_rc(out, ctx, insn, "u64", "^"),
        OpcodeId::Nand => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{ra}.u64 = ~({rs}.u64 & {rb}.u64);"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }
        OpcodeId::Nor => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{ra}.u64 = ~({rs}.u64 | {rb}.u64);"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }
        OpcodeId::Eqv => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{ra}.u64 = ~({rs}.u64 ^ {rb}.u64);"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }
        OpcodeId::Orc => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{ra}.u64 = {rs}.u64 | ~{rb}.u64;"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }
        OpcodeId::Andc => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{ra}.u64 = {rs}.u64 & ~{rb}.u64;"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }

        OpcodeId::Ori => emit_logical_imm(out, ctx, insn, "|", false),
        OpcodeId::Oris => emit_logical_imm(out, ctx, insn, "|", true),
        OpcodeId::Xori => emit_logical_imm(out, ctx, insn, "^", false),
        OpcodeId::Xoris => emit_logical_imm(out, ctx, insn, "^", true),

        OpcodeId::AndiRc | OpcodeId::AndisRc => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let uimm = insn.operand(2) as u32;
            let uimm = if insn.id() == OpcodeId::AndisRc { uimm << 16 } else { uimm };
            out.println(&format!("\t{ra}.u64 = {rs}.u64 & {uimm:#X};"));
            let xer = ctx.locals.xer(ctx.config);
            let cr0 = ctx.locals.cr(ctx.config, 0);
            out.println(&format!("\t{cr0}.compare<int32_t>({ra}.s32, 0, {xer});"));
        }

        OpcodeId::Extsb => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!("\t{ra}.s64 = {rs}.s8;"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }
        OpcodeId::Extsh => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!("\t{ra}.s64 = {rs}.s16;"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }
        OpcodeId::Cntlzw => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!("\t{ra}.u64 = {rs}.u32 == 0 ? 32 : __builtin_clz({rs}.u32);"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }

        OpcodeId::Cmpw | OpcodeId::Cmpd | OpcodeId::Cmplw | OpcodeId::Cmpld => {
            emit_compare(out, ctx, insn, insn.id() == OpcodeId::Cmpd || insn.id() == OpcodeId::Cmpld, matches!(insn.id(), OpcodeId::Cmplw | OpcodeId::Cmpld), false);
        }
        OpcodeId::Cmpwi | OpcodeId::Cmpdi | OpcodeId::Cmplwi | OpcodeId::Cmpldi => {
            emit_compare(out, ctx, insn, matches!(insn.id(), OpcodeId::Cmpdi | OpcodeId::Cmpldi), matches!(insn.id(), OpcodeId::Cmplwi | OpcodeId::Cmpldi), true);
        }

        OpcodeId::Rlwinm | OpcodeId::RlwinmRc => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let sh = insn.operand(2);
            let mb = insn.operand(3) as u32 + 32;
            let me = insn.operand(4) as u32 + 32;
            let mask = compute_mask(mb, me);
            out.println(&format!("\t{ra}.u64 = __builtin_rotateleft64({rs}.u32 | ({rs}.u64 << 32), {sh}) & {mask:#X};"));
            if insn.id() == OpcodeId::RlwinmRc {
                emit_record_form_cr0(out, ctx, insn, &ra);
            }
        }

        OpcodeId::Rlwimi => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let sh = insn.operand(2);
            let mb = insn.operand(3) as u32 + 32;
            let me = insn.operand(4) as u32 + 32;
            let mask = compute_mask(mb, me);
            out.println(&format!(
                "\t{ra}.u64 = (__builtin_rotateleft32({rs}.u32, {sh}) & {mask:#X}) | ({ra}.u64 & {:#X});",
                !mask
            ));
            if insn.record_form() {
                emit_record_form_cr0(out, ctx, insn, &ra);
            }
        }

        OpcodeId::Slw => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{ra}.u64 = {rb}.u8 & 0x20 ? 0 : ({rs}.u32 << ({rb}.u8 & 0x3F));"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }
        OpcodeId::Srw => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{ra}.u64 = {rb}.u8 & 0x20 ? 0 : ({rs}.u32 >> ({rb}.u8 & 0x3F));"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }
        OpcodeId::Sraw => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let xer = ctx.locals.xer(ctx.config);
            let temp = ctx.locals.temp().to_string();
            out.println(&format!("\t{temp}.u32 = {rb}.u32 & 0x3F;"));
            out.println(&format!("\tif ({temp}.u32 > 0x1F) {temp}.u32 = 0x1F;"));
            out.println(&format!(
                "\t{xer}.ca = ({rs}.s32 < 0) & ((({rs}.s32 >> {temp}.u32) << {temp}.u32) != {rs}.s32);"
            ));
            out.println(&format!("\t{ra}.s64 = {rs}.s32 >> {temp}.u32;"));
            emit_record_form_cr0(out, ctx, insn, &ra);
        }
        OpcodeId::Srawi => {
            let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let sh = insn.operand(2) as u32;
            let xer = ctx.locals.xer(ctx.config);
            if sh != 0 {
                let mask = compute_mask(64 - sh, 63);
                out.println(&format!("\t{xer}.ca = ({rs}.s32 < 0) & (({rs}.u32 & {mask:#X}) != 0);"));
                out.println(&format!("\t{ra}.s64 = {rs}.s32 >> {sh};"));
            } else {
                out.println(&format!("\t{xer}.ca = 0;"));
                out.println(&format!("\t{ra}.s64 = {rs}.s32;"));
            }
            emit_record_form_cr0(out, ctx, insn, &ra);
        }

        OpcodeId::B => emit_b(out, ctx, insn),
        OpcodeId::Bc => emit_bc(out, ctx, insn),
        OpcodeId::Bclr => emit_bclr_bcctr(out, ctx, insn, false),
        OpcodeId::Bcctr => emit_bclr_bcctr(out, ctx, insn, true),

        OpcodeId::Lwz => emit_load(out, ctx, insn, "PPC_LOAD_U32"),
        OpcodeId::Lwzu => emit_load_update(out, ctx, insn, "PPC_LOAD_U32", None),
        OpcodeId::Lhz => emit_load(out, ctx, insn, "PPC_LOAD_U16"),
        OpcodeId::Lhzu => emit_load_update(out, ctx, insn, "PPC_LOAD_U16", None),
        OpcodeId::Lbz => emit_load(out, ctx, insn, "PPC_LOAD_U8"),
        OpcodeId::Lbzu => emit_load_update(out, ctx, insn, "PPC_LOAD_U8", None),
        OpcodeId::Ld => emit_load(out, ctx, insn, "PPC_LOAD_U64"),
        OpcodeId::Ldu => emit_load_update(out, ctx, insn, "PPC_LOAD_U64", None),
        OpcodeId::Lha => emit_load_sext16(out, ctx, insn, false),
        OpcodeId::Lhau => {
            // No dedicated update+sign-extend helper in the original either
            // (`lhau` updates through the same `ea` local, then narrows).
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let disp = insn.operand(1) as i32;
            let ra = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let ea = ctx.locals.ea().to_string();
            out.println(&format!("\t{ea} = {disp} + {ra}.u32;"));
            out.println(&format!("\t{rt}.s64 = int16_t(PPC_LOAD_U16({ea}));"));
            out.println(&format!("\t{ra}.u32 = {ea};"));
        }

        OpcodeId::Stw => emit_store(out, ctx, insn, "u32", "PPC_STORE_U32"),
        OpcodeId::Stwu => emit_store_update(out, ctx, insn, "u32", "PPC_STORE_U32"),
        OpcodeId::Sth => emit_store(out, ctx, insn, "u16", "PPC_STORE_U16"),
        OpcodeId::Sthu => emit_store_update(out, ctx, insn, "u16", "PPC_STORE_U16"),
        OpcodeId::Stb => emit_store(out, ctx, insn, "u8", "PPC_STORE_U8"),
        OpcodeId::Stbu => emit_store_update(out, ctx, insn, "u8", "PPC_STORE_U8"),
        OpcodeId::Std => emit_store(out, ctx, insn, "u64", "PPC_STORE_U64"),
        OpcodeId::Stdu => emit_store_update(out, ctx, insn, "u64", "PPC_STORE_U64"),

        // X-form indexed loads/stores (`ra.u32 + rb.u32`, spec.md §4.3.1).
        OpcodeId::Lwzx => emit_load_x(out, ctx, insn, "PPC_LOAD_U32"),
        OpcodeId::Lwzux => emit_load_update_x(out, ctx, insn, "PPC_LOAD_U32", None),
        OpcodeId::Lhzx => emit_load_x(out, ctx, insn, "PPC_LOAD_U16"),
        OpcodeId::Lhzux => emit_load_update_x(out, ctx, insn, "PPC_LOAD_U16", None),
        OpcodeId::Lbzx => emit_load_x(out, ctx, insn, "PPC_LOAD_U8"),
        OpcodeId::Lbzux => emit_load_update_x(out, ctx, insn, "PPC_LOAD_U8", None),
        OpcodeId::Ldx => emit_load_x(out, ctx, insn, "PPC_LOAD_U64"),
        OpcodeId::Ldux => emit_load_update_x(out, ctx, insn, "PPC_LOAD_U64", None),
        OpcodeId::Lhax => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let ea = if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                format!("{ra_s}.u32 + {rb}.u32")
            } else {
                format!("{rb}.u32")
            };
            out.println(&format!("\t{rt}.s64 = int16_t(PPC_LOAD_U16({ea}));"));
        }
        OpcodeId::Lhaux => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let ea = ctx.locals.ea().to_string();
            out.println(&format!("\t{ea} = {ra}.u32 + {rb}.u32;"));
            out.println(&format!("\t{rt}.s64 = int16_t(PPC_LOAD_U16({ea}));"));
            out.println(&format!("\t{ra}.u32 = {ea};"));
        }

        OpcodeId::Stwx => emit_store_x(out, ctx, insn, "u32", "PPC_STORE_U32"),
        OpcodeId::Stwux => emit_store_update_x(out, ctx, insn, "u32", "PPC_STORE_U32"),
        OpcodeId::Sthx => emit_store_x(out, ctx, insn, "u16", "PPC_STORE_U16"),
        OpcodeId::Sthux => emit_store_update_x(out, ctx, insn, "u16", "PPC_STORE_U16"),
        OpcodeId::Stbx => emit_store_x(out, ctx, insn, "u8", "PPC_STORE_U8"),
        OpcodeId::Stbux => emit_store_update_x(out, ctx, insn, "u8", "PPC_STORE_U8"),
        OpcodeId::Stdx => emit_store_x(out, ctx, insn, "u64", "PPC_STORE_U64"),
        OpcodeId::Stdux => emit_store_update_x(out, ctx, insn, "u64", "PPC_STORE_U64"),

        OpcodeId::Lwarx => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let reserved = ctx.locals.reserved(ctx.config);
            let ea = if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                format!("{ra_s}.u32 + {rb}.u32")
            } else {
                format!("{rb}.u32")
            };
            out.println(&format!("\t{reserved}.u32 = PPC_LOAD_U32({ea});"));
            out.println(&format!("\t{rt}.u64 = __builtin_bswap32({reserved}.u32);"));
        }
        OpcodeId::Ldarx => {
            // The 64-bit sibling reads the raw 64 bits directly rather than
            // through the `PPC_LOAD_U32` macro, matching the original.
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let reserved = ctx.locals.reserved(ctx.config);
            let ea = if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                format!("{ra_s}.u32 + {rb}.u32")
            } else {
                format!("{rb}.u32")
            };
            out.println(&format!("\t{reserved}.u64 = *(uint64_t*)(base + {ea});"));
            out.println(&format!("\t{rt}.u64 = __builtin_bswap64({reserved}.u64);"));
        }

        OpcodeId::StwcxRc => {
            let rs = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let reserved = ctx.locals.reserved(ctx.config);
            let xer = ctx.locals.xer(ctx.config);
            let cr0 = ctx.locals.cr(ctx.config, 0);
            let ea = if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                format!("{ra_s}.u32 + {rb}.u32")
            } else {
                format!("{rb}.u32")
            };
            out.println(&format!(
                "\t{cr0}.lt = {cr0}.gt = 0; {cr0}.eq = PPC_STORE_CMPXCHG_U32({ea}, {reserved}.u32, __builtin_bswap32({rs}.u32)); {cr0}.so = {xer}.so;"
            ));
        }
        OpcodeId::StdcxRc => {
            let rs = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let reserved = ctx.locals.reserved(ctx.config);
            let xer = ctx.locals.xer(ctx.config);
            let cr0 = ctx.locals.cr(ctx.config, 0);
            let ea = if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                format!("{ra_s}.u32 + {rb}.u32")
            } else {
                format!("{rb}.u32")
            };
            out.println(&format!("\t{cr0}.lt = 0;"));
            out.println(&format!("\t{cr0}.gt = 0;"));
            out.println(&format!(
                "\t{cr0}.eq = __sync_bool_compare_and_swap(reinterpret_cast<uint64_t*>(base + {ea}), {reserved}.s64, __builtin_bswap64({rs}.s64));"
            ));
            out.println(&format!("\t{cr0}.so = {xer}.so;"));
        }

        OpcodeId::Mfcr => {
            let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
            for i in 0..32u32 {
                let field = ["lt", "gt", "eq", "so"][(i % 4) as usize];
                let cr = ctx.locals.cr(ctx.config, (i / 4) as usize);
                let op = if i == 0 { "=" } else { "|=" };
                let bit = 1u32 << (31 - i);
                out.println(&format!("\t{rt}.u64 {op} {cr}.{field} ? {bit:#X} : 0;"));
            }
        }

        // `mflr`/`mtlr`/`mfctr`/`mtctr` are extended mnemonics of
        // `mfspr`/`mtspr` (SPR 8 = LR, SPR 9 = CTR); there is no dedicated
        // opcode id for them.
        OpcodeId::Mfspr => {
            let spr = insn.operand(1) as u32;
            match spr {
                8 => {
                    if !ctx.config.skip_lr {
                        let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
                        out.println(&format!("\t{rt}.u64 = ctx.lr;"));
                    }
                }
                9 => {
                    let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
                    let ctr = ctx.locals.ctr(ctx.config);
                    out.println(&format!("\t{rt}.u64 = {ctr}.u64;"));
                }
                _ => {
                    out.println(&format!("\t// ERROR: unsupported mfspr {spr}"));
                    ctx.diagnostics.record(Diagnostic::UnsupportedInstruction { address: insn.address, mnemonic: insn.mnemonic() });
                }
            }
        }
        OpcodeId::Mtspr => {
            let spr = insn.operand(0) as u32;
            match spr {
                8 => {
                    if !ctx.config.skip_lr {
                        let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
                        out.println(&format!("\tctx.lr = {rs}.u64;"));
                    }
                }
                9 => {
                    let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
                    let ctr = ctx.locals.ctr(ctx.config);
                    out.println(&format!("\t{ctr}.u64 = {rs}.u64;"));
                }
                _ => {
                    out.println(&format!("\t// ERROR: unsupported mtspr {spr}"));
                    ctx.diagnostics.record(Diagnostic::UnsupportedInstruction { address: insn.address, mnemonic: insn.mnemonic() });
                }
            }
        }
        OpcodeId::Mfmsr => {
            if !ctx.config.skip_msr {
                let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
                out.println(&format!("\t{rt}.u64 = ctx.msr;"));
            }
        }
        OpcodeId::Mtmsrd => {
            if !ctx.config.skip_msr {
                let rs = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
                out.println(&format!("\tctx.msr = ({rs}.u32 & 0x8020) | (ctx.msr & ~0x8020);"));
            }
        }

        OpcodeId::Eieio | OpcodeId::Sync | OpcodeId::Isync => {
            // No-op on a host with a strong memory model (spec.md §4.3.1).
        }

        // ---- Floating point -------------------------------------------
        OpcodeId::Fadd | OpcodeId::Fsub | OpcodeId::Fmul | OpcodeId::Fdiv => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let fra = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(2) as usize);
            let op = match insn.id() {
                OpcodeId::Fadd => "+",
                OpcodeId::Fsub => "-",
                OpcodeId::Fmul => "*",
                OpcodeId::Fdiv => "/",
                _ => unreachable!(),
            };
            out.println(&format!("\t{frt}.f64 = {fra}.f64 {op} {frb}.f64;"));
        }
        OpcodeId::Fadds | OpcodeId::Fsubs | OpcodeId::Fdivs => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let fra = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(2) as usize);
            let op = match insn.id() {
                OpcodeId::Fadds => "+",
                OpcodeId::Fsubs => "-",
                OpcodeId::Fdivs => "/",
                _ => unreachable!(),
            };
            out.println(&format!("\t{frt}.f64 = double(float({fra}.f64 {op} {frb}.f64));"));
        }
        OpcodeId::Fmuls => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let fra = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            let frc = ctx.locals.fpr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{frt}.f64 = double(float({fra}.f64 * {frc}.f64));"));
        }
        OpcodeId::Fmr => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!("\t{frt}.f64 = {frb}.f64;"));
        }
        OpcodeId::Frsp => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!("\t{frt}.f64 = double(float({frb}.f64));"));
        }
        OpcodeId::Fabs => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!("\t{frt}.u64 = {frb}.u64 & ~0x8000000000000000;"));
        }
        OpcodeId::Fneg => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!("\t{frt}.u64 = {frb}.u64 ^ 0x8000000000000000;"));
        }
        OpcodeId::Fnabs => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!("\t{frt}.u64 = {frb}.u64 | 0x8000000000000000;"));
        }
        OpcodeId::Fctid => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!(
                "\t{frt}.s64 = ({frb}.f64 > double(LLONG_MAX)) ? LLONG_MAX : _mm_cvtsd_si64(_mm_load_sd(&{frb}.f64));"
            ));
        }
        OpcodeId::Fctidz => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!(
                "\t{frt}.s64 = ({frb}.f64 > double(LLONG_MAX)) ? LLONG_MAX : _mm_cvttsd_si64(_mm_load_sd(&{frb}.f64));"
            ));
        }
        OpcodeId::Fctiwz => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            out.println(&format!(
                "\t{frt}.s64 = ({frb}.f64 > double(INT_MAX)) ? INT_MAX : _mm_cvttsd_si32(_mm_load_sd(&{frb}.f64));"
            ));
        }
        OpcodeId::Fmadd | OpcodeId::Fmsub | OpcodeId::Fnmsub => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let fra = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            let frc = ctx.locals.fpr(ctx.config, insn.operand(2) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(3) as usize);
            match insn.id() {
                OpcodeId::Fmadd => out.println(&format!("\t{frt}.f64 = {fra}.f64 * {frc}.f64 + {frb}.f64;")),
                OpcodeId::Fmsub => out.println(&format!("\t{frt}.f64 = {fra}.f64 * {frc}.f64 - {frb}.f64;")),
                OpcodeId::Fnmsub => out.println(&format!("\t{frt}.f64 = -({fra}.f64 * {frc}.f64 - {frb}.f64);")),
                _ => unreachable!(),
            }
        }
        OpcodeId::Fnmadd => {
            // Record form calls `fpscr.setFlags` instead of the usual cr0
            // compare (the original's own asymmetry for this one opcode).
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let fra = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            let frc = ctx.locals.fpr(ctx.config, insn.operand(2) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(3) as usize);
            out.println(&format!("\t{frt}.f64 = -std::fma({fra}.f64, {frc}.f64, {frb}.f64);"));
            if insn.record_form() {
                out.println(&format!("\tctx.fpscr.setFlags({frt}.f64);"));
            }
        }
        OpcodeId::Fsel => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let fra = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            let frc = ctx.locals.fpr(ctx.config, insn.operand(2) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(3) as usize);
            out.println(&format!("\t{frt}.f64 = {fra}.f64 >= 0.0 ? {frc}.f64 : {frb}.f64;"));
        }
        OpcodeId::Fcmpu => {
            fpu_transition(out, ctx);
            let bf = insn.operand(0) as usize;
            let fra = ctx.locals.fpr(ctx.config, insn.operand(1) as usize);
            let frb = ctx.locals.fpr(ctx.config, insn.operand(2) as usize);
            let cr = ctx.locals.cr(ctx.config, bf);
            out.println(&format!("\t{cr}.compare({fra}.f64, {frb}.f64);"));
        }

        OpcodeId::Lfs => emit_load_f32(out, ctx, insn, false),
        OpcodeId::Lfsx => emit_load_f32(out, ctx, insn, true),
        OpcodeId::Lfd => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let disp = insn.operand(1) as i32;
            let ra = insn.operand(2);
            if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                out.println(&format!("\t{frt}.u64 = PPC_LOAD_U64({ra_s}.u32 + {disp});"));
            } else {
                out.println(&format!("\t{frt}.u64 = PPC_LOAD_U64({disp});"));
            }
        }
        OpcodeId::Lfdx => {
            fpu_transition(out, ctx);
            let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                out.println(&format!("\t{frt}.u64 = PPC_LOAD_U64({ra_s}.u32 + {rb}.u32);"));
            } else {
                out.println(&format!("\t{frt}.u64 = PPC_LOAD_U64({rb}.u32);"));
            }
        }
        OpcodeId::Stfs => emit_store_f32(out, ctx, insn, false),
        OpcodeId::Stfsx => emit_store_f32(out, ctx, insn, true),
        OpcodeId::Stfsu => {
            fpu_transition(out, ctx);
            let frs = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let disp = insn.operand(1) as i32;
            let ra = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let temp = ctx.locals.temp().to_string();
            let ea = ctx.locals.ea().to_string();
            let macro_name = if ctx.followed_by_eieio { "PPC_MM_STORE_U32" } else { "PPC_STORE_U32" };
            out.println(&format!("\t{temp}.f32 = float({frs}.f64);"));
            out.println(&format!("\t{ea} = {disp} + {ra}.u32;"));
            out.println(&format!("\t{macro_name}({ea}, {temp}.u32);"));
            out.println(&format!("\t{ra}.u32 = {ea};"));
        }
        OpcodeId::Stfd => {
            let frs = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let disp = insn.operand(1) as i32;
            let ra = insn.operand(2);
            let macro_name = if ctx.followed_by_eieio { "PPC_MM_STORE_U64" } else { "PPC_STORE_U64" };
            if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                out.println(&format!("\t{macro_name}({ra_s}.u32 + {disp}, {frs}.u64);"));
            } else {
                out.println(&format!("\t{macro_name}({disp}, {frs}.u64);"));
            }
        }
        OpcodeId::Stfdx => {
            let frs = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let macro_name = if ctx.followed_by_eieio { "PPC_MM_STORE_U64" } else { "PPC_STORE_U64" };
            if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                out.println(&format!("\t{macro_name}({ra_s}.u32 + {rb}.u32, {frs}.u64);"));
            } else {
                out.println(&format!("\t{macro_name}({rb}.u32, {frs}.u64);"));
            }
        }

        // ---- Vector (AltiVec / VMX128) ----------------------------------
        OpcodeId::Vaddfp => emit_vector_binop(out, ctx, insn, "_mm_add_ps"),
        OpcodeId::Vsubfp => emit_vector_binop(out, ctx, insn, "_mm_sub_ps"),
        OpcodeId::Vand => emit_vector_bitop(out, ctx, insn, "_mm_and_si128"),
        OpcodeId::Vandc => emit_vector_andc(out, ctx, insn),
        OpcodeId::Vor => emit_vector_bitop(out, ctx, insn, "_mm_or_si128"),
        OpcodeId::Vxor => emit_vector_bitop(out, ctx, insn, "_mm_xor_si128"),
        OpcodeId::Vnor => {
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
            let vb = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
            out.println(&format!(
                "\t_mm_store_si128((__m128i*){vd}.u8, _mm_xor_si128(_mm_or_si128(_mm_load_si128((__m128i*){va}.u8), _mm_load_si128((__m128i*){vb}.u8)), _mm_set1_epi32(-1)));"
            ));
        }
        OpcodeId::Vmaxfp => emit_vector_binop(out, ctx, insn, "_mm_max_ps"),
        OpcodeId::Vminfp => emit_vector_binop(out, ctx, insn, "_mm_min_ps"),
        OpcodeId::Vcmpeqfp => {
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
            let vb = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
            out.println(&format!("\t{vd}.f32x4 = _mm_cmpeq_ps({va}.f32x4, {vb}.f32x4);"));
        }
        OpcodeId::Vmaddfp => {
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
            let vc = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
            let vb = ctx.locals.vr(ctx.config, insn.operand(3) as usize);
            out.println(&format!("\t{vd}.f32x4 = _mm_add_ps(_mm_mul_ps({va}.f32x4, {vc}.f32x4), {vb}.f32x4);"));
        }
        OpcodeId::Vsel => {
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
            let vb = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
            let vc = ctx.locals.vr(ctx.config, insn.operand(3) as usize);
            out.println(&format!(
                "\t_mm_store_si128((__m128i*){vd}.u8, _mm_or_si128(_mm_andnot_si128(_mm_load_si128((__m128i*){vc}.u8), _mm_load_si128((__m128i*){va}.u8)), _mm_and_si128(_mm_load_si128((__m128i*){vc}.u8), _mm_load_si128((__m128i*){vb}.u8))));"
            ));
        }
        OpcodeId::Vsldoi => {
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
            let vb = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
            let shb = insn.operand(3);
            out.println(&format!(
                "\t_mm_store_si128((__m128i*){vd}.u8, _mm_or_si128(_mm_slli_si128(_mm_load_si128((__m128i*){va}.u8), {shb}), _mm_srli_si128(_mm_load_si128((__m128i*){vb}.u8), 16 - {shb})));"
            ));
        }
        OpcodeId::Vspltisw => {
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let simm = insn.operand(1) as i32;
            out.println(&format!("\t{vd}.i32x4 = _mm_set1_epi32({simm});"));
        }
        OpcodeId::Vperm => {
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
            let vb = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
            let vc = ctx.locals.vr(ctx.config, insn.operand(3) as usize);
            out.println(&format!(
                "\t// vperm: {vd} = select({va}, {vb}, {vc}) byte-wise, host-side helper supplies the permute"
            ));
            out.println(&format!("\tPPC_VPERM({vd}.u8, {va}.u8, {vb}.u8, {vc}.u8);"));
        }

        OpcodeId::Lvx | OpcodeId::Lvxl => {
            // For endian swapping, the whole vector is reversed rather than
            // individual elements; every vector instruction accounts for
            // this (e.g. `vmsum3fp128` sums yzw instead of xyz).
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let ea = if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                format!("({ra_s}.u32 + {rb}.u32)")
            } else {
                format!("{rb}.u32")
            };
            out.println(&format!(
                "\t_mm_store_si128((__m128i*){vd}.u8, _mm_shuffle_epi8(_mm_load_si128((__m128i*)(base + ({ea} & ~0xF))), _mm_load_si128((__m128i*)VectorMaskL)));"
            ));
        }
        OpcodeId::Stvx | OpcodeId::Stvxl => {
            let vs = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let ea = if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                format!("({ra_s}.u32 + {rb}.u32)")
            } else {
                format!("{rb}.u32")
            };
            out.println(&format!(
                "\t_mm_store_si128((__m128i*)(base + ({ea} & ~0xF)), _mm_shuffle_epi8(_mm_load_si128((__m128i*){vs}.u8), _mm_load_si128((__m128i*)VectorMaskL)));"
            ));
        }
        OpcodeId::Lvlx => {
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let temp = ctx.locals.temp().to_string();
            if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                out.println(&format!("\t{temp}.u32 = {ra_s}.u32 + {rb}.u32;"));
            } else {
                out.println(&format!("\t{temp}.u32 = {rb}.u32;"));
            }
            out.println(&format!(
                "\t_mm_store_si128((__m128i*){vd}.u8, _mm_shuffle_epi8(_mm_load_si128((__m128i*)(base + ({temp}.u32 & ~0xF))), _mm_load_si128((__m128i*)&VectorMaskL[({temp}.u32 & 0xF) * 16])));"
            ));
        }
        OpcodeId::Lvrx => {
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let ra = insn.operand(1);
            let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
            let temp = ctx.locals.temp().to_string();
            if ra != 0 {
                let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
                out.println(&format!("\t{temp}.u32 = {ra_s}.u32 + {rb}.u32;"));
            } else {
                out.println(&format!("\t{temp}.u32 = {rb}.u32;"));
            }
            out.println(&format!(
                "\t_mm_store_si128((__m128i*){vd}.u8, {temp}.u32 & 0xF ? _mm_shuffle_epi8(_mm_load_si128((__m128i*)(base + ({temp}.u32 & ~0xF))), _mm_load_si128((__m128i*)&VectorMaskR[({temp}.u32 & 0xF) * 16])) : _mm_setzero_si128());"
            ));
        }

        OpcodeId::Vmsum3fp128 => {
            if let Some(call) = ctx.csr.transition(CsrState::Vmx) {
                out.println(&format!("\t{call}"));
            }
            let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
            let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
            let vb = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
            // Dot-product mask is 0xEF, not the naively-expected 0xF7,
            // because of the whole-vector reversal noted above (sums yzw).
            out.println(&format!("\t_mm_store_ps({vd}.f32, _mm_dp_ps(_mm_load_ps({va}.f32), _mm_load_ps({vb}.f32), 0xEF));"));
        }

        OpcodeId::Vpkd3d128 => emit_vpkd3d128(out, ctx, insn),

        OpcodeId::Sc | OpcodeId::Tw | OpcodeId::Twi => {
            out.println("\t// trap/syscall: no host effect modeled");
        }

        _ => {
            let mnemonic = insn.mnemonic();
            out.println(&format!("\t// ERROR: unrecognized instruction {mnemonic}"));
            ctx.diagnostics.record(Diagnostic::UnsupportedInstruction { address: insn.address, mnemonic });
        }
    }
}

fn fpu_transition(out: &mut Emitter, ctx: &mut DispatchContext<'_>) {
    if let Some(call) = ctx.csr.transition(CsrState::Fpu) {
        out.println(&format!("\t{call}"));
    }
}

fn emit_binop_rc(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, width: &str, op: &str) {
    let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
    let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
    out.println(&format!("\t{rt}.{width} = {ra}.{width} {op} {rb}.{width};"));
    emit_record_form_cr0(out, ctx, insn, &rt);
}

/// `ori`/`oris`/`xori`/`xoris`: logical-immediate forms with no `Rc` bit at
/// all in the ISA (spec.md §4.3.1).
fn emit_logical_imm(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, op: &str, shifted: bool) {
    let ra = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let rs = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
    let uimm = insn.operand(2) as u32;
    let uimm = if shifted { uimm << 16 } else { uimm };
    out.println(&format!("\t{ra}.u64 = {rs}.u64 {op} {uimm};"));
}

/// Common record-form (`.`) tail: `cr0.compare<int32_t>(result.s32, 0, xer)`
/// (spec.md §4.3.1's "Record form" contract). Structurally this is the one
/// `cr0`/`cr6` write `RcWithoutCompare` (spec.md §7) checks for.
fn emit_record_form_cr0(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, result_reg: &str) {
    if !insn.record_form() {
        return;
    }
    let xer = ctx.locals.xer(ctx.config);
    let cr0 = ctx.locals.cr(ctx.config, 0);
    out.println(&format!("\t{cr0}.compare<int32_t>({result_reg}.s32, 0, {xer});"));
}

fn emit_compare(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, is64: bool, unsigned: bool, immediate: bool) {
    let bf = insn.operand(0) as usize;
    let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
    let cr = ctx.locals.cr(ctx.config, bf);
    let xer = ctx.locals.xer(ctx.config);
    let width = if is64 { "64" } else { "32" };
    let ty = if unsigned { format!("uint{width}_t") } else { format!("int{width}_t") };
    let field = if unsigned { "u" } else { "s" };
    let field = format!("{field}{width}");
    if immediate {
        let imm = insn.operand(2);
        out.println(&format!("\t{cr}.compare<{ty}>({ra}.{field}, {imm}, {xer});"));
    } else {
        let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
        out.println(&format!("\t{cr}.compare<{ty}>({ra}.{field}, {rb}.{field}, {xer});"));
    }
}

fn branch_target(insn: &GuestInstruction, operand_index: usize) -> u32 {
    insn.operand(operand_index) as u32
}

fn emit_cross_or_goto(out: &mut Emitter, ctx: &DispatchContext<'_>, target: u32) {
    if ctx.in_function(target) {
        out.println(&format!("\tgoto loc_{target:X};"));
    } else {
        emit_function_call(out, ctx, target);
        out.println("\treturn;");
    }
}

fn emit_function_call(out: &mut Emitter, ctx: &DispatchContext<'_>, target: u32) {
    match (ctx.symbol_at)(target) {
        Some(name) => out.println(&format!("\t{name}(ctx, base);")),
        None => out.println(&format!("\tPPC_FUNC_{target:X}(ctx, base);")),
    }
}

fn emit_b(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction) {
    let target = branch_target(insn, 0);
    if insn.link() {
        if !ctx.config.skip_lr {
            out.println(&format!("\tctx.lr = {:#X};", insn.address + 4));
        }
        emit_function_call(out, ctx, target);
        ctx.csr.reset();
    } else {
        emit_cross_or_goto(out, ctx, target);
    }
}

fn emit_bc(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction) {
    let bo = insn.operand(0) as u32;
    let bi = insn.operand(1) as u32;
    let target = branch_target(insn, 2);
    let cr = ctx.locals.cr(ctx.config, (bi / 4) as usize);
    let field = ["lt", "gt", "eq", "so"][(bi % 4) as usize];
    let negate = bo & 0x08 == 0;
    let cond = if negate { format!("!{cr}.{field}") } else { format!("{cr}.{field}") };

    if insn.link() {
        out.println(&format!("\tif ({cond}) {{"));
        if !ctx.config.skip_lr {
            out.println(&format!("\t\tctx.lr = {:#X};", insn.address + 4));
        }
        emit_function_call(out, ctx, target);
        out.println("\t}");
        ctx.csr.reset();
        return;
    }

    if ctx.in_function(target) {
        out.println(&format!("\tif ({cond}) goto loc_{target:X};"));
    } else {
        out.println(&format!("\tif ({cond}) {{"));
        emit_function_call(out, ctx, target);
        out.println("\t\treturn;");
        out.println("\t}");
    }
}

fn emit_bclr_bcctr(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, via_ctr: bool) {
    let bo = insn.operand(0) as u32;
    let bi = insn.operand(1) as u32;
    let always = bo & 0x14 == 0x14;
    let action = if via_ctr {
        let ctr = ctx.locals.ctr(ctx.config);
        format!("PPC_CALL_INDIRECT_FUNC({ctr}.u32);\n\treturn;")
    } else {
        "return;".to_string()
    };

    if always {
        for line in action.split('\n') {
            out.println(&format!("\t{}", line.trim_start_matches('\t')));
        }
        ctx.csr.reset();
        return;
    }

    let cr = ctx.locals.cr(ctx.config, (bi / 4) as usize);
    let field = ["lt", "gt", "eq", "so"][(bi % 4) as usize];
    let negate = bo & 0x08 == 0;
    let cond = if negate { format!("!{cr}.{field}") } else { format!("{cr}.{field}") };
    out.println(&format!("\tif ({cond}) {{"));
    for line in action.split('\n') {
        out.println(&format!("\t\t{}", line.trim_start_matches('\t')));
    }
    out.println("\t}");
    ctx.csr.reset();
}

/// Emits a `bctr` resolved through a known switch table (spec.md §4.3.1's
/// "`bctr` with known switch table"). Called from `recompiler::mod` (which
/// owns the `Config`'s switch-table lookup) rather than from the generic
/// dispatch match, since the table is keyed by address, not by opcode.
pub fn emit_switch_bctr(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, r_index: u32, labels: &[u32], default: Option<u32>) {
    let r = ctx.locals.gpr(ctx.config, r_index as usize);
    out.println(&format!("\tswitch ({r}.u64) {{"));
    for (i, &label) in labels.iter().enumerate() {
        out.println(&format!("\tcase {i}:"));
        if ctx.in_function(label) {
            out.println(&format!("\t\tgoto loc_{label:X};"));
        } else {
            out.println(&format!("\t\t// ERROR: {label:#X}"));
            ctx.diagnostics.record(Diagnostic::OutOfRangeSwitchLabel { bctr_address: insn.address, case: i, target: label });
            out.println("\t\treturn;");
        }
    }
    out.println("\tdefault:");
    if let Some(default) = default {
        out.println(&format!("\t\tgoto loc_{default:X};"));
    } else {
        out.println("\t\t__builtin_unreachable();");
    }
    out.println("\t}");
}

fn emit_load(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, macro_name: &str) {
    let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let disp = insn.operand(1) as i32;
    let ra = insn.operand(2);
    if ra != 0 {
        let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
        out.println(&format!("\t{rt}.u64 = {macro_name}({ra_s}.u32 + {disp});"));
    } else {
        out.println(&format!("\t{rt}.u64 = {macro_name}({disp});"));
    }
}

fn emit_load_sext16(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, indexed: bool) {
    let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    if indexed {
        let ra = insn.operand(1);
        let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
        let ea = if ra != 0 {
            let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
            format!("{ra_s}.u32 + {rb}.u32")
        } else {
            format!("{rb}.u32")
        };
        out.println(&format!("\t{rt}.s64 = int16_t(PPC_LOAD_U16({ea}));"));
    } else {
        let disp = insn.operand(1) as i32;
        let ra = insn.operand(2);
        if ra != 0 {
            let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
            out.println(&format!("\t{rt}.s64 = int16_t(PPC_LOAD_U16({ra_s}.u32 + {disp}));"));
        } else {
            out.println(&format!("\t{rt}.s64 = int16_t(PPC_LOAD_U16({disp}));"));
        }
    }
}

fn emit_load_update(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, macro_name: &str, _unused: Option<()>) {
    let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let disp = insn.operand(1) as i32;
    let ra = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
    let ea = ctx.locals.ea().to_string();
    out.println(&format!("\t{ea} = {disp} + {ra}.u32;"));
    out.println(&format!("\t{rt}.u64 = {macro_name}({ea});"));
    out.println(&format!("\t{ra}.u32 = {ea};"));
}

fn emit_store(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, width: &str, macro_name: &str) {
    let rs = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let disp = insn.operand(1) as i32;
    let ra = insn.operand(2);
    let macro_name = if ctx.followed_by_eieio { format!("{macro_name}_MMIO") } else { macro_name.to_string() };
    if ra != 0 {
        let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
        out.println(&format!("\t{macro_name}({ra_s}.u32 + {disp}, {rs}.{width});"));
    } else {
        out.println(&format!("\t{macro_name}({disp}, {rs}.{width});"));
    }
}

fn emit_store_update(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, width: &str, macro_name: &str) {
    let rs = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let disp = insn.operand(1) as i32;
    let ra = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
    let ea = ctx.locals.ea().to_string();
    let macro_name = if ctx.followed_by_eieio { format!("{macro_name}_MMIO") } else { macro_name.to_string() };
    out.println(&format!("\t{ea} = {disp} + {ra}.u32;"));
    out.println(&format!("\t{macro_name}({ea}, {rs}.{width});"));
    out.println(&format!("\t{ra}.u32 = {ea};"));
}

/// X-form indexed load: `ra.u32 + rb.u32` in place of a D-form displacement
/// (spec.md §4.3.1).
fn emit_load_x(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, macro_name: &str) {
    let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let ra = insn.operand(1);
    let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
    if ra != 0 {
        let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
        out.println(&format!("\t{rt}.u64 = {macro_name}({ra_s}.u32 + {rb}.u32);"));
    } else {
        out.println(&format!("\t{rt}.u64 = {macro_name}({rb}.u32);"));
    }
}

fn emit_load_update_x(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, macro_name: &str, _unused: Option<()>) {
    let rt = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
    let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
    let ea = ctx.locals.ea().to_string();
    out.println(&format!("\t{ea} = {ra}.u32 + {rb}.u32;"));
    out.println(&format!("\t{rt}.u64 = {macro_name}({ea});"));
    out.println(&format!("\t{ra}.u32 = {ea};"));
}

fn emit_store_x(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, width: &str, macro_name: &str) {
    let rs = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let ra = insn.operand(1);
    let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
    let macro_name = if ctx.followed_by_eieio { format!("{macro_name}_MMIO") } else { macro_name.to_string() };
    if ra != 0 {
        let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
        out.println(&format!("\t{macro_name}({ra_s}.u32 + {rb}.u32, {rs}.{width});"));
    } else {
        out.println(&format!("\t{macro_name}({rb}.u32, {rs}.{width});"));
    }
}

fn emit_store_update_x(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, width: &str, macro_name: &str) {
    let rs = ctx.locals.gpr(ctx.config, insn.operand(0) as usize);
    let ra = ctx.locals.gpr(ctx.config, insn.operand(1) as usize);
    let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
    let ea = ctx.locals.ea().to_string();
    let macro_name = if ctx.followed_by_eieio { format!("{macro_name}_MMIO") } else { macro_name.to_string() };
    out.println(&format!("\t{ea} = {ra}.u32 + {rb}.u32;"));
    out.println(&format!("\t{macro_name}({ea}, {rs}.{width});"));
    out.println(&format!("\t{ra}.u32 = {ea};"));
}

fn emit_load_f32(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, indexed: bool) {
    fpu_transition(out, ctx);
    let frt = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
    let temp = ctx.locals.temp().to_string();
    if indexed {
        let ra = insn.operand(1);
        let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
        if ra != 0 {
            let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
            out.println(&format!("\t{temp}.u32 = PPC_LOAD_U32({ra_s}.u32 + {rb}.u32);"));
        } else {
            out.println(&format!("\t{temp}.u32 = PPC_LOAD_U32({rb}.u32);"));
        }
    } else {
        let disp = insn.operand(1) as i32;
        let ra = insn.operand(2);
        if ra != 0 {
            let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
            out.println(&format!("\t{temp}.u32 = PPC_LOAD_U32({ra_s}.u32 + {disp});"));
        } else {
            out.println(&format!("\t{temp}.u32 = PPC_LOAD_U32({disp});"));
        }
    }
    out.println(&format!("\t{frt}.f64 = double({temp}.f32);"));
}

fn emit_store_f32(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, indexed: bool) {
    fpu_transition(out, ctx);
    let frs = ctx.locals.fpr(ctx.config, insn.operand(0) as usize);
    let temp = ctx.locals.temp().to_string();
    out.println(&format!("\t{temp}.f32 = float({frs}.f64);"));
    let macro_name = if ctx.followed_by_eieio { "PPC_MM_STORE_U32" } else { "PPC_STORE_U32" };
    if indexed {
        let ra = insn.operand(1);
        let rb = ctx.locals.gpr(ctx.config, insn.operand(2) as usize);
        if ra != 0 {
            let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
            out.println(&format!("\t{macro_name}({ra_s}.u32 + {rb}.u32, {temp}.u32);"));
        } else {
            out.println(&format!("\t{macro_name}({rb}.u32, {temp}.u32);"));
        }
    } else {
        let disp = insn.operand(1) as i32;
        let ra = insn.operand(2);
        if ra != 0 {
            let ra_s = ctx.locals.gpr(ctx.config, ra as usize);
            out.println(&format!("\t{macro_name}({ra_s}.u32 + {disp}, {temp}.u32);"));
        } else {
            out.println(&format!("\t{macro_name}({disp}, {temp}.u32);"));
        }
    }
}

fn emit_vector_binop(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, intrinsic: &str) {
    if let Some(call) = ctx.csr.transition(CsrState::Vmx) {
        out.println(&format!("\t{call}"));
    }
    let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
    let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
    let vb = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
    out.println(&format!("\t{vd}.f32x4 = {intrinsic}({va}.f32x4, {vb}.f32x4);"));
}

fn emit_vector_bitop(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction, intrinsic: &str) {
    let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
    let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
    let vb = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
    out.println(&format!(
        "\t_mm_store_si128((__m128i*){vd}.u8, {intrinsic}(_mm_load_si128((__m128i*){va}.u8), _mm_load_si128((__m128i*){vb}.u8)));"
    ));
}

fn emit_vector_andc(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction) {
    let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
    let va = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
    let vb = ctx.locals.vr(ctx.config, insn.operand(2) as usize);
    // `_mm_andnot_si128(a, b)` computes `~a & b`, so the operands are
    // swapped relative to the `va & ~vb` reading of the mnemonic.
    out.println(&format!(
        "\t_mm_store_si128((__m128i*){vd}.u8, _mm_andnot_si128(_mm_load_si128((__m128i*){vb}.u8), _mm_load_si128((__m128i*){va}.u8)));"
    ));
}

/// `vpkd3d128` (spec.md §4.3.1's "D3D-specific packs"). Only the two
/// variants the original's switch ever actually emits non-trivially are
/// implemented: 0 ("D3D color") and 5 ("float16_4"); any other value hits
/// the diagnosed default, matching the original's `__builtin_debugtrap()`
/// catch-all.
///
/// The source's fourth operand (an assertion-only sanity value, never
/// itself emitted into the recompiled function body) is folded away here;
/// see `DESIGN.md`.
fn emit_vpkd3d128(out: &mut Emitter, ctx: &mut DispatchContext<'_>, insn: &GuestInstruction) {
    if let Some(call) = ctx.csr.transition(CsrState::Vmx) {
        out.println(&format!("\t{call}"));
    }
    let vd = ctx.locals.vr(ctx.config, insn.operand(0) as usize);
    let vb = ctx.locals.vr(ctx.config, insn.operand(1) as usize);
    let variant = insn.operand(2);
    let word_index = insn.operand(3);
    let temp = ctx.locals.temp().to_string();
    let v_temp = ctx.locals.v_temp().to_string();

    match variant {
        0 => {
            const INDICES: [u32; 4] = [3, 0, 1, 2];
            for i in 0..4u32 {
                out.println(&format!("\t{v_temp}.u32[{i}] = 0x404000FF;"));
                out.println(&format!(
                    "\t{v_temp}.f32[{i}] = {vb}.f32[{i}] < 3.0f ? 3.0f : ({vb}.f32[{i}] > {v_temp}.f32[{i}] ? {v_temp}.f32[{i}] : {vb}.f32[{i}]);"
                ));
                let op = if i == 0 { "=" } else { "|=" };
                let shift = INDICES[i as usize] * 8;
                out.println(&format!("\t{temp}.u32 {op} uint32_t({v_temp}.u8[{}]) << {shift};", i * 4));
            }
            out.println(&format!("\t{vd}.u32[{word_index}] = {temp}.u32;"));
        }
        5 => {
            for i in 0..4u32 {
                out.println(&format!("\t{temp}.u32 = ({vb}.u32[{i}]&0x7FFFFFFF);"));
                out.println(&format!(
                    "\t{v_temp}.u8[0] = ({temp}.f32 != {temp}.f32) || ({temp}.f32 > 65504.0f) ? 0xFF : (({vb}.u32[{i}]&0x7f800000)>>23);"
                ));
                out.println(&format!("\t{temp}.u16 = {v_temp}.u8[0] != 0xFF ? (({vb}.u32[{i}]&0x7FE000)>>13) : 0x0;"));
                let lane = format!("{i} + (2 * {word_index})");
                out.println(&format!(
                    "\t{vd}.u16[{lane}] = {v_temp}.u8[0] != 0xFF ? ({v_temp}.u8[0] > 0x70 ? ((({v_temp}.u8[0]-0x70)<<10)+{temp}.u16) : (0x71-{v_temp}.u8[0] > 31 ? 0x0 : ((0x400+{temp}.u16)>>(0x71-{v_temp}.u8[0])))) : 0x7FFF;"
                ));
                out.println(&format!("\t{vd}.u16[{lane}] |= (({vb}.u32[{i}]&0x80000000)>>16);"));
            }
        }
        _ => {
            out.println("\t__builtin_debugtrap();");
            ctx.diagnostics.record(Diagnostic::UnsupportedInstruction { address: insn.address, mnemonic: insn.mnemonic() });
        }
    }
}
