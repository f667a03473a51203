//! Decoded instruction form (`GuestInstruction` in spec.md §3).

use crate::opcode::{self, Dialect, OpcodeEntry, OpcodeId, OPCODES};
use crate::operand::OperandFlags;

/// Maximum number of stored operands for any one opcode (spec.md §3: "fixed
/// size array of up to ~6 integer values").
pub const MAX_OPERANDS: usize = 6;

/// A fully decoded 32-bit PowerPC instruction.
///
/// Operand *storage* order follows each opcode's natural semantic order
/// (result/destination first, then source operands, then
/// immediate/displacement/branch-target last) rather than literal assembly
/// syntax order; `DESIGN.md` documents this as an idiomatic simplification
/// of the original `ppc_insn.operands[]` convention. `operand_str` still
/// renders in conventional assembly order.
#[derive(Clone, Copy)]
pub struct GuestInstruction {
    pub raw: u32,
    pub address: u32,
    opcode: Option<&'static OpcodeEntry>,
    pub operands: [i64; MAX_OPERANDS],
    operand_count: usize,
}

impl PartialEq for GuestInstruction {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
            && self.address == other.address
            && self.id() == other.id()
            && self.operands[..self.operand_count] == other.operands[..other.operand_count]
    }
}

impl Eq for GuestInstruction {}

impl std::fmt::Debug for GuestInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestInstruction")
            .field("raw", &format_args!("0x{:08X}", self.raw))
            .field("address", &format_args!("0x{:08X}", self.address))
            .field("id", &self.id())
            .field("operands", &&self.operands[..self.operand_count])
            .finish()
    }
}

impl GuestInstruction {
    /// Decodes one big-endian 32-bit word at `address` (spec.md §4.1).
    ///
    /// The active dialect is always `Dialect::ACTIVE`; if no entry matches,
    /// the extended-mnemonic fallback ORs in `Dialect::ANY` and retries once
    /// before declaring the instruction unrecognized.
    pub fn decode(raw: u32, address: u32) -> Self {
        let mut invalid = false;
        let found = opcode::lookup(raw, Dialect::ACTIVE, &mut invalid)
            .or_else(|| opcode::lookup(raw, Dialect::ACTIVE | Dialect::ANY, &mut invalid));

        match found {
            Some(entry) => {
                let mut operands = [0i64; MAX_OPERANDS];
                let mut count = 0usize;
                let mut skip_rest_if_zero = true;
                for desc in entry.operands {
                    if desc.flags.contains(OperandFlags::FAKE) {
                        continue;
                    }
                    let mut inv = false;
                    let value = desc.extract(raw, address, &mut inv);
                    if desc.flags.contains(OperandFlags::OPTIONAL_ZERO) && value == 0 && skip_rest_if_zero {
                        continue;
                    }
                    skip_rest_if_zero = false;
                    operands[count] = value;
                    count += 1;
                }
                GuestInstruction {
                    raw,
                    address,
                    opcode: Some(entry),
                    operands,
                    operand_count: count,
                }
            }
            None => GuestInstruction {
                raw,
                address,
                opcode: None,
                operands: [0; MAX_OPERANDS],
                operand_count: 0,
            },
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.opcode.is_some()
    }

    pub fn id(&self) -> OpcodeId {
        self.opcode.map(|e| e.id).unwrap_or(OpcodeId::Unrecognized)
    }

    pub fn mnemonic(&self) -> &'static str {
        self.opcode.map(|e| e.mnemonic).unwrap_or("<unrecognized>")
    }

    pub fn operand(&self, index: usize) -> i64 {
        debug_assert!(index < self.operand_count, "operand index out of range for {}", self.mnemonic());
        self.operands[index]
    }

    pub fn operand_count(&self) -> usize {
        self.operand_count
    }

    /// Whether bit 31 (`Rc`) requests a CR0/CR6-updating record form
    /// (spec.md §4.3.1's "Record form").
    pub fn record_form(&self) -> bool {
        self.opcode.map(|e| e.has_rc && (self.raw & 1 != 0)).unwrap_or(false)
    }

    /// The `LK` bit (bit 31) for branch-family opcodes: write `lr` with the
    /// return address.
    pub fn link(&self) -> bool {
        self.opcode.map(|e| e.has_lk_aa && (self.raw & 1 != 0)).unwrap_or(false)
    }

    /// The `AA` bit (bit 30) for branch-family opcodes: target is absolute.
    pub fn absolute(&self) -> bool {
        self.opcode.map(|e| e.has_lk_aa && (self.raw & 2 != 0)).unwrap_or(false)
    }

    /// Textual rendering of the operands, used only in emitted comments
    /// (spec.md §3's `operandStr`).
    pub fn render_operands(&self) -> String {
        let Some(entry) = self.opcode else {
            return format!("0x{:08X}", self.raw);
        };
        let parts: Vec<String> = (0..self.operand_count)
            .map(|i| {
                let desc = entry.operands.iter().filter(|d| !d.flags.contains(OperandFlags::FAKE)).nth(i);
                let value = self.operands[i];
                match desc {
                    Some(d) if d.flags.contains(OperandFlags::ABS_BRANCH) || d.flags.contains(OperandFlags::REL_BRANCH) => {
                        format!("{}{:X}", d.prefix, value)
                    }
                    Some(d) if !d.prefix.is_empty() && d.prefix.starts_with("0x") => format!("0x{:X}", value),
                    Some(d) => format!("{}{}", d.prefix, value),
                    None => format!("{value}"),
                }
            })
            .collect();
        parts.join(", ")
    }
}

impl std::fmt::Display for GuestInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.mnemonic(), self.render_operands())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn unrecognized_word_has_no_opcode() {
        let insn = GuestInstruction::decode(0xFFFF_FFFF, 0x1000);
        assert!(!insn.is_recognized());
        assert_eq!(insn.id(), OpcodeId::Unrecognized);
    }

    #[test]
    fn decode_either_matches_pattern_or_is_unrecognized() {
        // spec.md §8: decode(word, addr) either returns Unrecognized or an
        // opcode whose pattern matches `word & mask`.
        for entry in OPCODES {
            let word = entry.pattern;
            let insn = GuestInstruction::decode(word, 0);
            if let Some(found) = insn.opcode {
                assert_eq!(word & found.mask, found.pattern);
            }
        }
    }

    #[rstest]
    #[case(0x3860_0001u32, 0x1000u32, "addi")] // addi r3, r0, 1
    #[case(0x4E80_0020u32, 0x1004u32, "bclr")] // blr
    fn mnemonic_matches(#[case] word: u32, #[case] addr: u32, #[case] expected: &str) {
        let insn = GuestInstruction::decode(word, addr);
        assert_eq!(insn.mnemonic(), expected);
    }

    #[test]
    fn addi_r3_r0_1_decodes_with_literal_zero_base() {
        let insn = GuestInstruction::decode(0x3860_0001, 0x8200_0000);
        assert_eq!(insn.id(), OpcodeId::Addi);
        assert_eq!(insn.operand(0), 3); // rt
        assert_eq!(insn.operand(1), 0); // ra (literal zero)
        assert_eq!(insn.operand(2), 1); // simm
    }

    #[test]
    fn bc_sign_rule_matches_spec_example() {
        // word 0x40820008 at address 0x10000 decodes to `bc 4, 2, loc_10008`.
        let insn = GuestInstruction::decode(0x4082_0008, 0x1_0000);
        assert_eq!(insn.id(), OpcodeId::Bc);
        assert_eq!(insn.operand(0), 4); // BO
        assert_eq!(insn.operand(1), 2); // BI
        assert_eq!(insn.operand(2), 0x1_0008); // resolved absolute target
    }

    #[test]
    fn lwz_displacement_is_signed() {
        // lwz r4, 0x10(r3)
        let insn = GuestInstruction::decode(0x8083_0010, 0x8200_0000);
        assert_eq!(insn.id(), OpcodeId::Lwz);
        assert_eq!(insn.operand(0), 4); // rt
        assert_eq!(insn.operand(1), 0x10); // d
        assert_eq!(insn.operand(2), 3); // ra
    }

    #[test]
    fn rlwinm_decodes_sh_mb_me() {
        // rlwinm r3, r4, 1, 0, 30
        let insn = GuestInstruction::decode(0x5483_083C, 0x8200_0000);
        assert_eq!(insn.id(), OpcodeId::Rlwinm);
        assert_eq!(insn.operand(0), 3); // ra
        assert_eq!(insn.operand(1), 4); // rs
        assert_eq!(insn.operand(2), 1); // sh
        assert_eq!(insn.operand(3), 0); // mb
        assert_eq!(insn.operand(4), 30); // me
    }

    #[test]
    fn record_form_reads_rc_bit() {
        let add_dot = GuestInstruction::decode(0x7C63_1A15, 0); // add. r3, r3, r3
        assert!(add_dot.record_form());
        let add = GuestInstruction::decode(0x7C63_1A14, 0); // add r3, r3, r3
        assert!(!add.record_form());
    }
}
