//! Opcode identity table (`opcodes[]` in spec.md §4.1).
//!
//! The table is a flat, statically-built list of [`OpcodeEntry`] values,
//! scanned linearly within a major-opcode's range exactly as spec.md
//! describes; there is no derive-macro code generation here (unlike the
//! teacher's `fuel-asm`, which can fit its whole ISA into a `u8` primary
//! opcode), because the PowerPC primary opcode only selects a *group* and a
//! second linear scan over the group's extended-opcode field is needed to
//! land on one entry.
//!
//! The table covers every opcode the recompiler's dispatch (`ppc_recomp::
//! recompiler::dispatch`) emits code for: integer ALU, compare, rotate/shift,
//! branch, D-form and X-form load/store (plain and update forms), the
//! special-purpose register family, scalar FP (including the fused
//! multiply-add and single-precision families), the 64-bit reservation
//! pair, and the VMX128 vector family's D3D-pack and dot-product
//! instructions. A handful of decodable entries (`addme`, `subfme`,
//! `subfze`, `rlwnm`, `mtcrf`, `mtocrf`, `mtmsr`) have no dispatch arm —
//! `DESIGN.md` records that the recompiler this is grounded on never emits
//! them either, so there is nothing to translate them against.

use crate::operand::{self, OperandDesc, OperandFlags as F};

bitflags::bitflags! {
    /// Active-dialect flags, matching spec.md §4.1's "dialect flags".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Dialect: u32 {
        const PPC64    = 1 << 0;
        const CLASSIC  = 1 << 1;
        const ALTIVEC  = 1 << 2;
        const VMX128   = 1 << 3;
        const CELL     = 1 << 4;
        /// Extended-mnemonic fallback dialect, OR'd in on retry (spec.md §4.1).
        const ANY      = 1 << 5;
    }
}

impl Dialect {
    /// The dialect set active for Xenon translation: PPC64 + Classic +
    /// AltiVec + VMX128 + Cell-specific extensions (spec.md §4.1).
    pub const ACTIVE: Dialect = Dialect::from_bits_truncate(
        Dialect::PPC64.bits() | Dialect::CLASSIC.bits() | Dialect::ALTIVEC.bits()
            | Dialect::VMX128.bits() | Dialect::CELL.bits(),
    );
}

/// Stable numeric identity for a decoded opcode, independent of its position
/// in [`OPCODES`]. The recompiler's dispatch (`ppc_recomp::recompiler::dispatch`)
/// matches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[non_exhaustive]
pub enum OpcodeId {
    Add, Addc, Adde, Addi, Addic, AddicRc, Addis, Addme, Addze,
    Subf, Subfc, Subfe, Subfic, Subfme, Subfze, Neg,
    Mulli, Mullw, Mulhw, Mulhwu, Mulld, Divw, Divwu, Divd, Divdu,
    And, Andc, Or, Orc, Xor, Nand, Nor, Eqv,
    AndiRc, AndisRc, Ori, Oris, Xori, Xoris,
    Extsb, Extsh, Cntlzw,
    Cmpw, Cmpd, Cmplw, Cmpld, Cmpwi, Cmpdi, Cmplwi, Cmpldi,
    Rlwinm, RlwinmRc, Rlwimi, Rlwnm, Slw, Srw, Sraw, Srawi,
    B, Bc, Bclr, Bcctr, Sc,
    Lbz, Lbzu, Lbzx, Lbzux, Lhz, Lhzu, Lhzx, Lhzux, Lha, Lhau, Lhax, Lhaux,
    Lwz, Lwzu, Lwzx, Lwzux, Ld, Ldu, Ldx, Ldux,
    Stb, Stbu, Stbx, Stbux, Sth, Sthu, Sthx, Sthux,
    Stw, Stwu, Stwx, Stwux, Std, Stdu, Stdx, Stdux,
    Lwarx, StwcxRc, Ldarx, StdcxRc,
    Mfspr, Mtspr, Mfcr, Mfocrf, Mtcrf, Mtocrf, Mfmsr, Mtmsr, Mtmsrd,
    Eieio, Sync, Isync, Tw, Twi,
    Lfs, Lfsu, Lfsx, Lfsux, Lfd, Lfdu, Lfdx, Lfdux,
    Stfs, Stfsu, Stfsx, Stfsux, Stfd, Stfdu, Stfdx, Stfdux,
    Fadd, Fadds, Fsub, Fsubs, Fmul, Fmuls, Fdiv, Fdivs,
    Fmadd, Fmsub, Fnmsub, Fnmadd,
    Fabs, Fneg, Fnabs, Frsp, Fctid, Fctidz, Fctiwz, Fmr, Fsel, Fcmpu,
    Lvx, Lvxl, Stvx, Stvxl, Lvlx, Lvrx,
    Vaddfp, Vsubfp, Vand, Vandc, Vor, Vxor, Vnor,
    Vcmpeqfp, Vmaxfp, Vminfp, Vmaddfp, Vperm, Vsel, Vsldoi, Vspltisw,
    Vrlimi128, Vpkd3d128, Vmsum3fp128,
    /// Decode produced no matching table entry (spec.md §4.1 "unrecognized").
    Unrecognized,
}

pub struct OpcodeEntry {
    pub id: OpcodeId,
    pub mnemonic: &'static str,
    pub primary: u32,
    pub pattern: u32,
    pub mask: u32,
    pub dialect: Dialect,
    pub operands: &'static [OperandDesc],
    /// Whether bit 31 (the `Rc` bit) selects a CR0/CR6-updating record form.
    pub has_rc: bool,
    /// Whether bits 0/1 are the `LK`/`AA` link/absolute flags (branch forms).
    pub has_lk_aa: bool,
}

macro_rules! entry {
    ($id:ident, $mn:literal, $primary:expr, $pattern:expr, $mask:expr, $dialect:expr, $ops:expr) => {
        OpcodeEntry {
            id: OpcodeId::$id,
            mnemonic: $mn,
            primary: $primary,
            pattern: $pattern,
            mask: $mask,
            dialect: $dialect,
            operands: $ops,
            has_rc: false,
            has_lk_aa: false,
        }
    };
    ($id:ident, $mn:literal, $primary:expr, $pattern:expr, $mask:expr, $dialect:expr, $ops:expr, rc) => {
        OpcodeEntry { has_rc: true, ..entry!($id, $mn, $primary, $pattern, $mask, $dialect, $ops) }
    };
    ($id:ident, $mn:literal, $primary:expr, $pattern:expr, $mask:expr, $dialect:expr, $ops:expr, lk_aa) => {
        OpcodeEntry { has_lk_aa: true, ..entry!($id, $mn, $primary, $pattern, $mask, $dialect, $ops) }
    };
}

const GPR: F = F::GPR;
const GPR0: F = F::GPR.union(F::GPR_ZERO_IS_LITERAL);
const FPR: F = F::FPR;
const VR: F = F::VR;
const SIMM: F = F::SIGNED;
const CRF: F = F::CR_FIELD;

const RT: OperandDesc = OperandDesc::plain(0x1F, 21, GPR, "r");
const RA: OperandDesc = OperandDesc::plain(0x1F, 16, GPR, "r");
const RA0: OperandDesc = OperandDesc::plain(0x1F, 16, GPR0, "r");
const RB: OperandDesc = OperandDesc::plain(0x1F, 11, GPR, "r");
const RS: OperandDesc = OperandDesc::plain(0x1F, 21, GPR, "r");
const FRT: OperandDesc = OperandDesc::plain(0x1F, 21, FPR, "f");
const FRA: OperandDesc = OperandDesc::plain(0x1F, 16, FPR, "f");
const FRB: OperandDesc = OperandDesc::plain(0x1F, 11, FPR, "f");
const FRC: OperandDesc = OperandDesc::plain(0x1F, 6, FPR, "f");
const FRS: OperandDesc = OperandDesc::plain(0x1F, 21, FPR, "f");
const VD: OperandDesc = OperandDesc::plain(0x1F, 21, VR, "v");
const VA: OperandDesc = OperandDesc::plain(0x1F, 16, VR, "v");
const VB: OperandDesc = OperandDesc::plain(0x1F, 11, VR, "v");
const VC: OperandDesc = OperandDesc::plain(0x1F, 6, VR, "v");
const VS: OperandDesc = OperandDesc::plain(0x1F, 21, VR, "v");
const SIMM16: OperandDesc = OperandDesc::plain(0xFFFF, 0, SIMM, "");
const UIMM16: OperandDesc = OperandDesc::plain(0xFFFF, 0, F::empty(), "0x");
const D16: OperandDesc = OperandDesc::plain(0xFFFF, 0, SIMM.union(F::PARENS), "");
const BF: OperandDesc = OperandDesc::plain(0x7, 23, CRF, "cr");
const SH5: OperandDesc = OperandDesc::plain(0x1F, 11, F::empty(), "");
const MB5: OperandDesc = OperandDesc::plain(0x1F, 6, F::empty(), "");
const ME5: OperandDesc = OperandDesc::plain(0x1F, 1, F::empty(), "");
const UIMM5: OperandDesc = OperandDesc::plain(0x1F, 11, SIMM, "");
/// Same bit position as [`UIMM5`] but unsigned: `vpkd3d128`'s variant
/// selector is a small discriminant (0 or 5 in the variants this crate
/// implements), not a signed splat immediate, so it must not sign-extend.
const UIMM5U: OperandDesc = OperandDesc::plain(0x1F, 11, F::empty(), "");
const SHB4: OperandDesc = OperandDesc::plain(0xF, 6, F::empty(), "");
const SPR: OperandDesc = OperandDesc {
    mask: 0x3FF, shift: 11, extract: Some(operand::extract_spr), insert: None, flags: F::empty(), prefix: "",
};
const FXM: OperandDesc = OperandDesc::plain(0xFF, 12, F::empty(), "");
const FXM_SINGLE: OperandDesc = OperandDesc {
    mask: 0xFF, shift: 12, extract: Some(operand::extract_fxm_single), insert: None, flags: F::empty(), prefix: "",
};
const BO: OperandDesc = OperandDesc {
    mask: 0x1F, shift: 21, extract: Some(operand::extract_bo), insert: None, flags: F::empty(), prefix: "",
};
const BI: OperandDesc = OperandDesc::plain(0x1F, 16, F::empty(), "");
const BRANCH_ABS: OperandDesc = OperandDesc {
    mask: 0x3FF_FFFC, shift: 0, extract: Some(operand::extract_branch_abs), insert: None,
    flags: F::ABS_BRANCH, prefix: "loc_",
};
const BRANCH_COND: OperandDesc = OperandDesc {
    mask: 0xFFFC, shift: 0, extract: Some(operand::extract_branch_cond), insert: None,
    flags: F::REL_BRANCH, prefix: "loc_",
};
const VD128: OperandDesc = OperandDesc { mask: 0, shift: 0, extract: Some(operand::extract_vd128), insert: None, flags: VR, prefix: "v" };
const VA128: OperandDesc = OperandDesc { mask: 0, shift: 0, extract: Some(operand::extract_va128), insert: None, flags: VR, prefix: "v" };
const VB128: OperandDesc = OperandDesc { mask: 0, shift: 0, extract: Some(operand::extract_vb128), insert: None, flags: VR, prefix: "v" };

macro_rules! ops { ($($o:expr),* $(,)?) => { &[$($o),*] as &[OperandDesc] }; }

#[rustfmt::skip]
pub static OPCODES: &[OpcodeEntry] = &[
    // ---- D-form / A-form integer arithmetic -------------------------------
    entry!(Mulli,  "mulli",  7,  7 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, RA, SIMM16]),
    entry!(Subfic, "subfic", 8,  8 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, RA, SIMM16]),
    entry!(Cmplwi, "cmplwi", 10, 10 << 26, (0x3F << 26) | (1 << 21), Dialect::ACTIVE, ops![BF, RA, UIMM16]),
    entry!(Cmpldi, "cmpldi", 10, (10 << 26) | (1 << 21), (0x3F << 26) | (1 << 21), Dialect::PPC64, ops![BF, RA, UIMM16]),
    entry!(Cmpwi,  "cmpwi",  11, 11 << 26, (0x3F << 26) | (1 << 21), Dialect::ACTIVE, ops![BF, RA, SIMM16]),
    entry!(Cmpdi,  "cmpdi",  11, (11 << 26) | (1 << 21), (0x3F << 26) | (1 << 21), Dialect::PPC64, ops![BF, RA, SIMM16]),
    entry!(Addic,  "addic",  12, 12 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, RA, SIMM16]),
    entry!(AddicRc,"addic.", 13, 13 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, RA, SIMM16]),
    entry!(Addi,   "addi",   14, 14 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, RA0, SIMM16]),
    entry!(Addis,  "addis",  15, 15 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, RA0, SIMM16]),
    entry!(Bc,     "bc",     16, 16 << 26, 0x3F << 26, Dialect::ACTIVE, ops![BO, BI, BRANCH_COND], lk_aa),
    entry!(Sc,     "sc",     17, 17 << 26, 0x3FFF_FFFF, Dialect::ACTIVE, ops![]),
    entry!(B,      "b",      18, 18 << 26, 0x3F << 26, Dialect::ACTIVE, ops![BRANCH_ABS], lk_aa),
    entry!(Rlwimi, "rlwimi", 20, 20 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RA, RS, SH5, MB5, ME5], rc),
    entry!(Rlwinm, "rlwinm", 21, 21 << 26, (0x3F << 26) | 1, Dialect::ACTIVE, ops![RA, RS, SH5, MB5, ME5]),
    entry!(RlwinmRc,"rlwinm.",21,(21 << 26) | 1, 0x3F << 26 | 1, Dialect::ACTIVE, ops![RA, RS, SH5, MB5, ME5]),
    entry!(Rlwnm,  "rlwnm",  23, 23 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RA, RS, RB, MB5, ME5], rc),
    entry!(Ori,    "ori",    24, 24 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RA, RS, UIMM16]),
    entry!(Oris,   "oris",   25, 25 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RA, RS, UIMM16]),
    entry!(Xori,   "xori",   26, 26 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RA, RS, UIMM16]),
    entry!(Xoris,  "xoris",  27, 27 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RA, RS, UIMM16]),
    entry!(AndiRc, "andi.",  28, 28 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RA, RS, UIMM16]),
    entry!(AndisRc,"andis.", 29, 29 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RA, RS, UIMM16]),

    // ---- Loads/stores (D-form) --------------------------------------------
    entry!(Lwz,  "lwz",  32, 32 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, D16, RA0]),
    entry!(Lwzu, "lwzu", 33, 33 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, D16, RA]),
    entry!(Lbz,  "lbz",  34, 34 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, D16, RA0]),
    entry!(Lbzu, "lbzu", 35, 35 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, D16, RA]),
    entry!(Stw,  "stw",  36, 36 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RS, D16, RA0]),
    entry!(Stwu, "stwu", 37, 37 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RS, D16, RA]),
    entry!(Stb,  "stb",  38, 38 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RS, D16, RA0]),
    entry!(Stbu, "stbu", 39, 39 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RS, D16, RA]),
    entry!(Lhz,  "lhz",  40, 40 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, D16, RA0]),
    entry!(Lhzu, "lhzu", 41, 41 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, D16, RA]),
    entry!(Lha,  "lha",  42, 42 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, D16, RA0]),
    entry!(Lhau, "lhau", 43, 43 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RT, D16, RA]),
    entry!(Sth,  "sth",  44, 44 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RS, D16, RA0]),
    entry!(Sthu, "sthu", 45, 45 << 26, 0x3F << 26, Dialect::ACTIVE, ops![RS, D16, RA]),
    entry!(Lfs,  "lfs",  48, 48 << 26, 0x3F << 26, Dialect::ACTIVE, ops![FRT, D16, RA0]),
    entry!(Lfsu, "lfsu", 49, 49 << 26, 0x3F << 26, Dialect::ACTIVE, ops![FRT, D16, RA]),
    entry!(Lfd,  "lfd",  50, 50 << 26, 0x3F << 26, Dialect::ACTIVE, ops![FRT, D16, RA0]),
    entry!(Lfdu, "lfdu", 51, 51 << 26, 0x3F << 26, Dialect::ACTIVE, ops![FRT, D16, RA]),
    entry!(Stfs, "stfs", 52, 52 << 26, 0x3F << 26, Dialect::ACTIVE, ops![FRS, D16, RA0]),
    entry!(Stfsu,"stfsu",53, 53 << 26, 0x3F << 26, Dialect::ACTIVE, ops![FRS, D16, RA]),
    entry!(Stfd, "stfd", 54, 54 << 26, 0x3F << 26, Dialect::ACTIVE, ops![FRS, D16, RA0]),
    entry!(Stfdu,"stfdu",55, 55 << 26, 0x3F << 26, Dialect::ACTIVE, ops![FRS, D16, RA]),

    // DS-form (64-bit): low 2 bits select the sub-opcode, not the Rc bit.
    entry!(Ld,   "ld",   58, (58 << 26) | 0, (0x3F << 26) | 0x3, Dialect::PPC64, ops![RT, D16, RA0]),
    entry!(Ldu,  "ldu",  58, (58 << 26) | 1, (0x3F << 26) | 0x3, Dialect::PPC64, ops![RT, D16, RA]),
    entry!(Std,  "std",  62, (62 << 26) | 0, (0x3F << 26) | 0x3, Dialect::PPC64, ops![RS, D16, RA0]),
    entry!(Stdu, "stdu", 62, (62 << 26) | 1, (0x3F << 26) | 0x3, Dialect::PPC64, ops![RS, D16, RA]),

    // ---- Extended opcode group 19 (branch/condition register family) ------
    entry!(Bclr,  "bclr",  19, (19 << 26) | (16 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![BO, BI], lk_aa),
    entry!(Bcctr, "bcctr", 19, (19 << 26) | (528 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![BO, BI], lk_aa),
    entry!(Isync, "isync", 19, (19 << 26) | (150 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![]),

    // ---- Extended opcode group 31 (integer ALU / load-store-indexed) ------
    entry!(Cmpw,   "cmpw",   31, (31 << 26) | (0 << 1), (0x3F << 26) | (0x3FF << 1) | (1 << 21), Dialect::ACTIVE, ops![BF, RA, RB]),
    entry!(Cmpd,   "cmpd",   31, (31 << 26) | (0 << 1) | (1 << 21), (0x3F << 26) | (0x3FF << 1) | (1 << 21), Dialect::PPC64, ops![BF, RA, RB]),
    entry!(Add,    "add",    31, (31 << 26) | (266 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Subfc,  "subfc",  31, (31 << 26) | (8 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Addc,   "addc",   31, (31 << 26) | (10 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Mulhwu, "mulhwu", 31, (31 << 26) | (11 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Lwarx,  "lwarx",  31, (31 << 26) | (20 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA0, RB]),
    entry!(Lwzx,   "lwzx",   31, (31 << 26) | (23 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA0, RB]),
    entry!(Slw,    "slw",    31, (31 << 26) | (24 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Cntlzw, "cntlzw", 31, (31 << 26) | (26 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS], rc),
    entry!(And,    "and",    31, (31 << 26) | (28 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Cmplw,  "cmplw",  31, (31 << 26) | (32 << 1), (0x3F << 26) | (0x3FF << 1) | (1 << 21), Dialect::ACTIVE, ops![BF, RA, RB]),
    entry!(Cmpld,  "cmpld",  31, (31 << 26) | (32 << 1) | (1 << 21), (0x3F << 26) | (0x3FF << 1) | (1 << 21), Dialect::PPC64, ops![BF, RA, RB]),
    entry!(Subf,   "subf",   31, (31 << 26) | (40 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Lwzux,  "lwzux",  31, (31 << 26) | (55 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB]),
    entry!(Andc,   "andc",   31, (31 << 26) | (60 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Mulhw,  "mulhw",  31, (31 << 26) | (75 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Lbzx,   "lbzx",   31, (31 << 26) | (87 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA0, RB]),
    entry!(Neg,    "neg",    31, (31 << 26) | (104 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA], rc),
    entry!(Lbzux,  "lbzux",  31, (31 << 26) | (119 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB]),
    entry!(Nor,    "nor",    31, (31 << 26) | (124 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Subfe,  "subfe",  31, (31 << 26) | (136 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Adde,   "adde",   31, (31 << 26) | (138 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Mfcr,   "mfcr",   31, (31 << 26) | (19 << 1), (0x3F << 26) | (0x3FF << 1) | (1 << 20), Dialect::ACTIVE, ops![RT]),
    entry!(Mfocrf, "mfocrf", 31, (31 << 26) | (19 << 1) | (1 << 20), (0x3F << 26) | (0x3FF << 1) | (1 << 20), Dialect::CELL, ops![RT, FXM_SINGLE]),
    entry!(Mtcrf,  "mtcrf",  31, (31 << 26) | (144 << 1), (0x3F << 26) | (0x3FF << 1) | (1 << 20), Dialect::ACTIVE, ops![FXM, RS]),
    entry!(Mtocrf, "mtocrf", 31, (31 << 26) | (144 << 1) | (1 << 20), (0x3F << 26) | (0x3FF << 1) | (1 << 20), Dialect::CELL, ops![FXM_SINGLE, RS]),
    entry!(StwcxRc,"stwcx.", 31, (31 << 26) | (150 << 1) | 1, (0x3F << 26) | (0x3FF << 1) | 1, Dialect::ACTIVE, ops![RS, RA0, RB]),
    entry!(Stwx,   "stwx",   31, (31 << 26) | (151 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RS, RA0, RB]),
    entry!(Stwux,  "stwux",  31, (31 << 26) | (183 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RS, RA, RB]),
    entry!(Subfze, "subfze", 31, (31 << 26) | (200 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA], rc),
    entry!(Addze,  "addze",  31, (31 << 26) | (202 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA], rc),
    entry!(Stbx,   "stbx",   31, (31 << 26) | (215 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RS, RA0, RB]),
    entry!(Stbux,  "stbux",  31, (31 << 26) | (247 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RS, RA, RB]),
    entry!(Subfme, "subfme", 31, (31 << 26) | (232 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA], rc),
    entry!(Mullw,  "mullw",  31, (31 << 26) | (235 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Addme,  "addme",  31, (31 << 26) | (234 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA], rc),
    entry!(Lhzx,   "lhzx",   31, (31 << 26) | (279 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA0, RB]),
    entry!(Mfspr,  "mfspr",  31, (31 << 26) | (339 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, SPR]),
    entry!(Lhax,   "lhax",   31, (31 << 26) | (343 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA0, RB]),
    entry!(Lhaux,  "lhaux",  31, (31 << 26) | (375 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB]),
    entry!(Lhzux,  "lhzux",  31, (31 << 26) | (311 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB]),
    entry!(Sthx,   "sthx",   31, (31 << 26) | (407 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RS, RA0, RB]),
    entry!(Sthux,  "sthux",  31, (31 << 26) | (439 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RS, RA, RB]),
    entry!(Orc,    "orc",    31, (31 << 26) | (412 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Or,     "or",     31, (31 << 26) | (444 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Divwu,  "divwu",  31, (31 << 26) | (459 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Mtspr,  "mtspr",  31, (31 << 26) | (467 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![SPR, RS]),
    entry!(Nand,   "nand",   31, (31 << 26) | (476 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Divw,   "divw",   31, (31 << 26) | (491 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT, RA, RB], rc),
    entry!(Mulld,  "mulld",  31, (31 << 26) | (233 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![RT, RA, RB]),
    entry!(Divdu,  "divdu",  31, (31 << 26) | (457 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![RT, RA, RB], rc),
    entry!(Divd,   "divd",   31, (31 << 26) | (489 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![RT, RA, RB]),
    entry!(Mtmsr,  "mtmsr",  31, (31 << 26) | (146 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RS]),
    entry!(Mtmsrd, "mtmsrd", 31, (31 << 26) | (178 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![RS]),
    entry!(Mfmsr,  "mfmsr",  31, (31 << 26) | (83 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RT]),
    entry!(Ldx,    "ldx",    31, (31 << 26) | (21 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![RT, RA0, RB]),
    entry!(Ldux,   "ldux",   31, (31 << 26) | (53 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![RT, RA, RB]),
    entry!(Ldarx,  "ldarx",  31, (31 << 26) | (84 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![RT, RA0, RB]),
    entry!(Stdx,   "stdx",   31, (31 << 26) | (149 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![RS, RA0, RB]),
    entry!(Stdux,  "stdux",  31, (31 << 26) | (181 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![RS, RA, RB]),
    entry!(StdcxRc,"stdcx.", 31, (31 << 26) | (214 << 1) | 1, (0x3F << 26) | (0x3FF << 1) | 1, Dialect::PPC64, ops![RS, RA0, RB]),
    entry!(Extsh,  "extsh",  31, (31 << 26) | (922 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS], rc),
    entry!(Extsb,  "extsb",  31, (31 << 26) | (954 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS], rc),
    entry!(Sync,   "sync",   31, (31 << 26) | (598 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![]),
    entry!(Eqv,    "eqv",    31, (31 << 26) | (284 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Xor,    "xor",    31, (31 << 26) | (316 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Srw,    "srw",    31, (31 << 26) | (536 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Sraw,   "sraw",   31, (31 << 26) | (792 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, RB], rc),
    entry!(Srawi,  "srawi",  31, (31 << 26) | (824 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![RA, RS, SH5], rc),
    entry!(Tw,     "tw",     31, (31 << 26) | (4 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![BO, RA, RB]),

    entry!(Twi,    "twi",    3, 3 << 26, 0x3F << 26, Dialect::ACTIVE, ops![BO, RA, SIMM16]),

    // ---- Floating point -----------------------------------------------------
    entry!(Fcmpu,  "fcmpu",  63, (63 << 26) | (0 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![BF, FRA, FRB]),
    entry!(Frsp,   "frsp",   63, (63 << 26) | (12 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, FRB], rc),
    entry!(Fctiwz, "fctiwz", 63, (63 << 26) | (15 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, FRB], rc),
    entry!(Fdiv,   "fdiv",   63, (63 << 26) | (18 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRB], rc),
    entry!(Fsub,   "fsub",   63, (63 << 26) | (20 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRB], rc),
    entry!(Fadd,   "fadd",   63, (63 << 26) | (21 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRB], rc),
    entry!(Fmul,   "fmul",   63, (63 << 26) | (25 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRC], rc),
    entry!(Fmsub,  "fmsub",  63, (63 << 26) | (28 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRC, FRB], rc),
    entry!(Fmadd,  "fmadd",  63, (63 << 26) | (29 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRC, FRB], rc),
    entry!(Fnmsub, "fnmsub", 63, (63 << 26) | (30 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRC, FRB], rc),
    entry!(Fnmadd, "fnmadd", 63, (63 << 26) | (31 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRC, FRB], rc),
    entry!(Fneg,   "fneg",   63, (63 << 26) | (40 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, FRB], rc),
    entry!(Fmr,    "fmr",    63, (63 << 26) | (72 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, FRB], rc),
    entry!(Fnabs,  "fnabs",  63, (63 << 26) | (136 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, FRB], rc),
    entry!(Fabs,   "fabs",   63, (63 << 26) | (264 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, FRB], rc),
    entry!(Fctid,  "fctid",  63, (63 << 26) | (814 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![FRT, FRB], rc),
    entry!(Fctidz, "fctidz", 63, (63 << 26) | (815 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::PPC64, ops![FRT, FRB], rc),
    entry!(Fsel,   "fsel",   63, (63 << 26) | (23 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRC, FRB], rc),

    entry!(Fadds,  "fadds",  59, (59 << 26) | (21 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRB], rc),
    entry!(Fsubs,  "fsubs",  59, (59 << 26) | (20 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRB], rc),
    entry!(Fmuls,  "fmuls",  59, (59 << 26) | (25 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRC], rc),
    entry!(Fdivs,  "fdivs",  59, (59 << 26) | (18 << 1), (0x3F << 26) | (0x1F << 1), Dialect::ACTIVE, ops![FRT, FRA, FRB], rc),

    entry!(Lfsx,   "lfsx",   31, (31 << 26) | (535 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, RA0, RB]),
    entry!(Lfsux,  "lfsux",  31, (31 << 26) | (567 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, RA, RB]),
    entry!(Lfdx,   "lfdx",   31, (31 << 26) | (599 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, RA0, RB]),
    entry!(Lfdux,  "lfdux",  31, (31 << 26) | (631 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRT, RA, RB]),
    entry!(Stfsx,  "stfsx",  31, (31 << 26) | (663 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRS, RA0, RB]),
    entry!(Stfsux, "stfsux", 31, (31 << 26) | (695 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRS, RA, RB]),
    entry!(Stfdx,  "stfdx",  31, (31 << 26) | (727 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRS, RA0, RB]),
    entry!(Stfdux, "stfdux", 31, (31 << 26) | (759 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![FRS, RA, RB]),

    // ---- Vector (AltiVec / VMX128), opcode group 31 for scalar-indexed loads,
    // primary 4 for the classic-AltiVec-encoded vector ALU, with a subset
    // keyed by the VMX128-specific register field splits (see operand.rs).
    entry!(Lvx,    "lvx",    31, (31 << 26) | (103 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ALTIVEC, ops![VD, RA0, RB]),
    entry!(Lvxl,   "lvxl",   31, (31 << 26) | (359 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ALTIVEC, ops![VD, RA0, RB]),
    entry!(Stvx,   "stvx",   31, (31 << 26) | (231 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ALTIVEC, ops![VS, RA0, RB]),
    entry!(Stvxl,  "stvxl",  31, (31 << 26) | (487 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ALTIVEC, ops![VS, RA0, RB]),
    entry!(Lvlx,   "lvlx",   31, (31 << 26) | (519 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ALTIVEC, ops![VD, RA0, RB]),
    entry!(Lvrx,   "lvrx",   31, (31 << 26) | (551 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ALTIVEC, ops![VD, RA0, RB]),

    entry!(Vaddfp,   "vaddfp",   4, (4 << 26) | 10, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vsubfp,   "vsubfp",   4, (4 << 26) | 74, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vand,     "vand",     4, (4 << 26) | 1028, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vandc,    "vandc",    4, (4 << 26) | 1092, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vor,      "vor",      4, (4 << 26) | 1156, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vxor,     "vxor",     4, (4 << 26) | 1220, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vnor,     "vnor",     4, (4 << 26) | 1284, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vcmpeqfp, "vcmpeqfp", 4, (4 << 26) | 198, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vmaxfp,   "vmaxfp",   4, (4 << 26) | 1034, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vminfp,   "vminfp",   4, (4 << 26) | 1098, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, VA, VB]),
    entry!(Vmaddfp,  "vmaddfp",  4, (4 << 26) | 46, (0x3F << 26) | 0x3F, Dialect::ALTIVEC, ops![VD, VA, VC, VB]),
    entry!(Vperm,    "vperm",    4, (4 << 26) | 43, (0x3F << 26) | 0x3F, Dialect::ALTIVEC, ops![VD, VA, VB, VC]),
    entry!(Vsel,     "vsel",     4, (4 << 26) | 42, (0x3F << 26) | 0x3F, Dialect::ALTIVEC, ops![VD, VA, VB, VC]),
    entry!(Vsldoi,   "vsldoi",   4, (4 << 26) | 44, (0x3F << 26) | 0x3F, Dialect::ALTIVEC, ops![VD, VA, VB, SHB4]),
    entry!(Vspltisw, "vspltisw", 4, (4 << 26) | 908, (0x3F << 26) | 0x7FF, Dialect::ALTIVEC, ops![VD, UIMM5]),

    // VMX128: the Xenon-specific superset with split register fields.
    entry!(Vrlimi128,  "vrlimi128",  4, (4 << 26) | (6 << 6), (0x3F << 26) | (0x3F << 6), Dialect::VMX128, ops![VD128, VB128, UIMM5]),
    entry!(Vpkd3d128,  "vpkd3d128",  4, (4 << 26) | (12 << 6), (0x3F << 26) | (0x3F << 6), Dialect::VMX128, ops![VD128, VB128, UIMM5U, SHB4]),
    entry!(Vmsum3fp128,"vmsum3fp128",4, (4 << 26) | (17 << 6), (0x3F << 26) | (0x3F << 6), Dialect::VMX128, ops![VD128, VA128, VB128]),

    entry!(Eieio, "eieio", 31, (31 << 26) | (854 << 1), (0x3F << 26) | (0x3FF << 1), Dialect::ACTIVE, ops![]),
];

/// Finds the first entry matching `word` under the given dialect, per
/// spec.md §4.1's decode contract (including the extended-mnemonic retry
/// with `Dialect::ANY` OR'd in, performed by the caller).
pub fn lookup(word: u32, dialect: Dialect, invalid_scratch: &mut bool) -> Option<&'static OpcodeEntry> {
    let primary = word >> 26;
    OPCODES.iter().find(|e| {
        if e.primary != primary || (word & e.mask) != e.pattern {
            return false;
        }
        if !e.dialect.intersects(dialect) {
            return false;
        }
        *invalid_scratch = false;
        for op in e.operands {
            op.extract(word, 0, invalid_scratch);
            if *invalid_scratch {
                return false;
            }
        }
        true
    })
}
