//! Function discovery (spec.md §4.2): from an entry address and a byte
//! window, follow intra-procedural branches to find a function's basic
//! blocks and terminal extent.
//!
//! Grounded on `examples/original_source/PowerAnalyse/function.cpp`'s
//! `Function::Analyze`, translated from a raw pointer/index `blockStack`
//! worklist into a `Vec<usize>` of block indices plus a sort-and-trim pass.

use ppc_asm::opcode::OpcodeId;
use ppc_asm::GuestInstruction;

/// The big-endian word pattern of the "shifted pointer tail-call" marker
/// spec.md §4.2 calls out: when the *second* word at a function's entry
/// matches it, the function is declared to be exactly 8 bytes and analysis
/// stops immediately, without decoding further.
const TAIL_CALL_MARKER: u32 = 0x0400_0048;

/// One basic block of a [`Function`] (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Offset from the owning function's base address.
    pub base: u32,
    /// Bytes covered so far; always a multiple of 4.
    pub size: u32,
    /// Scratch "expected maximum size" used only during discovery, to
    /// truncate a fallthrough block before it would overrun a target it
    /// doesn't yet know about. `None` means unknown/unset.
    pub projected_size: Option<u32>,
}

impl Block {
    fn new(base: u32) -> Self {
        Block { base, size: 0, projected_size: None }
    }

    pub fn end(&self) -> u32 {
        self.base + self.size
    }
}

/// A discovered function: an absolute base address and the ordered,
/// contiguous set of blocks that belong to it (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub base: u32,
    pub size: u32,
    pub blocks: Vec<Block>,
}

impl Function {
    /// Returns the index of the block containing (or, for a still-empty
    /// block, exactly starting at) `address`, mirroring
    /// `Function::SearchBlock`.
    fn search_block(blocks: &[Block], address: u32) -> Option<usize> {
        blocks.iter().position(|b| {
            if b.size != 0 {
                address >= b.base && address < b.end()
            } else {
                address == b.base
            }
        })
    }

    /// Runs the discovery algorithm described in spec.md §4.2 over `code`
    /// (a byte window starting at `base`, of which at most `window_size`
    /// bytes belong to this call), producing one [`Function`].
    #[tracing::instrument(skip(code), fields(base = %format_args!("{base:#010X}")))]
    pub fn analyze(code: &[u8], window_size: u32, base: u32) -> Function {
        if window_size >= 8 {
            if let Some(second) = read_word(code, 4) {
                if second == TAIL_CALL_MARKER {
                    return Function { base, size: 8, blocks: vec![Block { base: 0, size: 8, projected_size: None }] };
                }
            }
        }

        let mut blocks = vec![Block::new(0)];
        let mut worklist: Vec<usize> = vec![0];

        while let Some(&cur) = worklist.last() {
            let addr_offset = blocks[cur].base + blocks[cur].size;
            if addr_offset + 4 > window_size {
                worklist.pop();
                continue;
            }
            if let Some(projected) = blocks[cur].projected_size {
                if blocks[cur].size >= projected {
                    worklist.pop();
                    continue;
                }
            }

            let Some(raw) = read_word(code, addr_offset) else {
                worklist.pop();
                continue;
            };
            let addr = base + addr_offset;

            // Sanity invariant from spec.md §4.2: the instruction we are
            // about to append sits exactly where the current block's cursor
            // says it should.
            debug_assert_eq!(addr, base + blocks[cur].base + blocks[cur].size);

            blocks[cur].size += 4;

            if raw == 0 {
                worklist.pop();
                continue;
            }

            let insn = GuestInstruction::decode(raw, addr);
            if !insn.is_recognized() {
                worklist.pop();
                continue;
            }

            match insn.id() {
                OpcodeId::Bc if !insn.link() => {
                    worklist.pop();
                    let fallthrough_base = (addr - base) + 4;
                    let taken_addr = insn.operand(2) as u32;
                    let taken_base = taken_addr.wrapping_sub(base);

                    if Self::search_block(&blocks, fallthrough_base).is_none() {
                        let projected = taken_base.saturating_sub(fallthrough_base);
                        blocks.push(Block { base: fallthrough_base, size: 0, projected_size: Some(projected) });
                        worklist.push(blocks.len() - 1);
                    }
                    if Self::search_block(&blocks, taken_base).is_none() {
                        blocks.push(Block::new(taken_base));
                        worklist.push(blocks.len() - 1);
                    }
                }
                OpcodeId::B if !insn.link() => {
                    worklist.pop();
                    let target = insn.operand(0) as u32;
                    if target < base {
                        // Inter-procedural tail call: do not chase it.
                        continue;
                    }
                    let branch_base = target - base;
                    if Self::search_block(&blocks, branch_base).is_none() {
                        let cur_block = blocks[cur];
                        let is_adjacent = branch_base == cur_block.end();
                        let projected = cur_block
                            .projected_size
                            .filter(|_| is_adjacent)
                            .map(|p| p.saturating_sub(cur_block.size));
                        blocks.push(Block { base: branch_base, size: 0, projected_size: projected });
                        worklist.push(blocks.len() - 1);
                    }
                }
                OpcodeId::Bclr | OpcodeId::Bcctr if !insn.link() => {
                    worklist.pop();
                    let bo = insn.operand(0) as u32;
                    let conditional_on_ctr = bo & 0x10 == 0;
                    if conditional_on_ctr {
                        let fallthrough_base = (addr - base) + 4;
                        if Self::search_block(&blocks, fallthrough_base).is_none() {
                            blocks.push(Block::new(fallthrough_base));
                            worklist.push(blocks.len() - 1);
                        }
                    }
                }
                _ => {
                    // Call-form (bl/bcl/bctrl) or any other non-terminating
                    // instruction: the +4 above already accounted for it.
                }
            }
        }

        sort_and_trim(&mut blocks);
        let size = blocks.iter().map(Block::end).max().unwrap_or(0);
        Function { base, size, blocks }
    }
}

fn read_word(code: &[u8], offset: u32) -> Option<u32> {
    let offset = offset as usize;
    let slice = code.get(offset..offset + 4)?;
    Some(u32::from_be_bytes(slice.try_into().unwrap()))
}

/// Sorts blocks by base address and drops any unreachable tail past the
/// first gap (spec.md §4.2's "sort and trim").
fn sort_and_trim(blocks: &mut Vec<Block>) {
    if blocks.len() <= 1 {
        return;
    }
    blocks.sort_by_key(|b| b.base);
    if let Some(gap_at) = blocks.windows(2).position(|w| w[0].end() < w[1].base) {
        blocks.truncate(gap_at + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    #[test]
    fn li_then_blr_is_one_eight_byte_block() {
        // li r3, 1; blr
        let code = words(&[0x3860_0001, 0x4E80_0020]);
        let f = Function::analyze(&code, code.len() as u32, 0x1000);
        assert_eq!(f.size, 8);
        assert_eq!(f.blocks.len(), 1);
        assert_eq!(f.blocks[0], Block { base: 0, size: 8, projected_size: None });
    }

    #[test]
    fn unconditional_branch_skips_dead_nop() {
        // b +8; nop; blr
        let code = words(&[0x4800_0008, 0x6000_0000, 0x4E80_0020]);
        let f = Function::analyze(&code, code.len() as u32, 0x1000);
        assert_eq!(f.size, 8);
        // The `nop` at offset 4 is not covered by any remaining block.
        assert!(!f.blocks.iter().any(|b| b.base <= 4 && 4 < b.end() && b.base != 0));
    }

    #[test]
    fn forward_conditional_branch_produces_two_contiguous_blocks() {
        // cmpwi cr0, r3, 0; beq cr0, +8; li r3, 1; blr; li r3, 2; blr
        let code = words(&[0x2C03_0000, 0x4182_0008, 0x3860_0001, 0x4E80_0020, 0x3860_0002, 0x4E80_0020]);
        let f = Function::analyze(&code, code.len() as u32, 0x1000);
        assert_eq!(f.blocks.len(), 2);
        assert_eq!(f.blocks[0].end(), f.blocks[1].base);
        assert_eq!(f.size, 24);
    }

    #[test]
    fn blocks_are_address_ordered_and_word_aligned() {
        let code = words(&[0x2C03_0000, 0x4182_0008, 0x3860_0001, 0x4E80_0020, 0x3860_0002, 0x4E80_0020]);
        let f = Function::analyze(&code, code.len() as u32, 0x1000);
        for w in f.blocks.windows(2) {
            assert!(w[0].base < w[1].base);
        }
        for b in &f.blocks {
            assert_eq!(b.size % 4, 0);
        }
        assert_eq!(f.size, f.blocks.iter().map(Block::end).max().unwrap());
    }
}
