//! The recompiler driver (spec.md §4.3): function discovery over an
//! [`Image`], then per-function envelope emission that walks each
//! function's instructions through [`dispatch::recompile_instruction`].
//!
//! Grounded on `XenonRecomp/recompiler.h`'s `Recompiler` struct and
//! `recompiler.cpp`'s `Analyse`/`Recompile`/`SaveCurrentOutData` trio: one
//! value owns the `Image`, the discovered `Function`s, the `Diagnostics`
//! accumulator, and the `Emitter`, for the lifetime of a single translation
//! run (spec.md §5: single-threaded, no aliasing of run-owned state).

pub mod csr;
pub mod dispatch;
pub mod registers;

use std::collections::HashSet;

use ppc_asm::opcode::OpcodeId;
use ppc_asm::GuestInstruction;

use crate::analyzer::Function;
use crate::config::Config;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::emit::Emitter;
use crate::image::{Image, SymbolType};

use csr::CsrState;
use dispatch::{DispatchContext, EIEIO_WORD};
use registers::RecompilerLocalVariables;

/// Generates the eight save/restore trampoline families spec.md §6's
/// `rest*_14_address`/`save*_14_address` keys name, one function per
/// register above the non-volatile boundary (spec.md's `r14..r31`,
/// `v14..v127`), grounded on `Recompiler::Analyse`'s `i in 14..128` loop.
fn synthesize_trampolines(image: &mut Image, functions: &mut Vec<Function>, config: &Config) {
    for i in 14..128u32 {
        if i < 32 {
            for (address, stride, tail, prefix) in [
                (config.restgprlr_14_address, 4, 12, "__restgprlr_"),
                (config.savegprlr_14_address, 4, 8, "__savegprlr_"),
                (config.restfpr_14_address, 4, 4, "__restfpr_"),
                (config.savefpr_14_address, 4, 4, "__savefpr_"),
            ] {
                push_trampoline(image, functions, address, stride, tail, prefix, i, 32);
            }
            push_trampoline_vmx(image, functions, config.restvmx_14_address, "__restvmx_", i, 32, 14);
            push_trampoline_vmx(image, functions, config.savevmx_14_address, "__savevmx_", i, 32, 14);
        }
        if i >= 64 {
            push_trampoline_vmx(image, functions, config.restvmx_64_address, "__restvmx_", i, 128, 64);
            push_trampoline_vmx(image, functions, config.savevmx_64_address, "__savevmx_", i, 128, 64);
        }
    }
}

fn push_trampoline(
    image: &mut Image,
    functions: &mut Vec<Function>,
    base_address: u32,
    stride: u32,
    tail: u32,
    prefix: &str,
    i: u32,
    boundary: u32,
) {
    if base_address == 0 {
        return;
    }
    let base = base_address + (i - 14) * stride;
    let size = (boundary - i) * stride + tail;
    functions.push(Function { base, size, blocks: Vec::new() });
    image.symbols.emplace(format!("{prefix}{i}"), base, size, SymbolType::Function);
}

fn push_trampoline_vmx(image: &mut Image, functions: &mut Vec<Function>, base_address: u32, prefix: &str, i: u32, boundary: u32, start: u32) {
    if base_address == 0 {
        return;
    }
    let base = base_address + (i - start) * 8;
    let size = (boundary - i) * 8 + 4;
    functions.push(Function { base, size, blocks: Vec::new() });
    image.symbols.emplace(format!("{prefix}{i}"), base, size, SymbolType::Function);
}

/// Discovers every function in `image` (spec.md §4.2's analyzer applied
/// across all code sections, plus configured and call-reachable entries),
/// returning them in ascending-base order (spec.md §5's ordering guarantee).
pub fn discover_functions(image: &mut Image, config: &Config) -> Vec<Function> {
    let mut functions = Vec::new();
    synthesize_trampolines(image, &mut functions, config);

    for forced in &config.functions {
        functions.push(Function { base: forced.address, size: forced.size, blocks: Vec::new() });
        image.symbols.emplace(format!("sub_{:X}", forced.address), forced.address, forced.size, SymbolType::Function);
    }

    let code_sections: Vec<_> = image.sections.iter().filter(|s| s.flags.contains(crate::image::SectionFlags::CODE)).cloned().collect();

    // Pass 1: every in-section `bl` target not already covered by a symbol
    // becomes a discovered function (mirrors `Analyse`'s `PPC_OP_B && PPC_BL` scan).
    for section in &code_sections {
        let mut offset = 0u32;
        while offset + 4 <= section.size {
            let word = u32::from_be_bytes(section.data[offset as usize..offset as usize + 4].try_into().unwrap());
            let insn = GuestInstruction::decode(word, section.base + offset);
            if insn.id() == OpcodeId::B && insn.link() {
                let target = insn.operand(0) as u32;
                if section.contains(target) && image.symbols.find(target).is_none() {
                    let window = section.base + section.size - target;
                    let data = &section.data[(target - section.base) as usize..];
                    let f = Function::analyze(data, window, target);
                    image.symbols.emplace(format!("sub_{:X}", f.base), f.base, f.size, SymbolType::Function);
                    functions.push(f);
                }
            }
            offset += 4;
        }
    }

    // Pass 2: fill remaining gaps not covered by any symbol, honoring
    // `invalid_instructions` skip patterns (spec.md §6).
    for section in &code_sections {
        let mut base = section.base;
        let end = section.base + section.size;
        while base < end {
            let offset = (base - section.base) as usize;
            if offset + 4 <= section.data.len() {
                let word = u32::from_be_bytes(section.data[offset..offset + 4].try_into().unwrap());
                if let Some(&skip) = config.invalid_instructions.get(&word) {
                    base += skip;
                    continue;
                }
            }
            if let Some(symbol) = image.symbols.find(base) {
                if symbol.address == base && symbol.kind == SymbolType::Function {
                    base += symbol.size.max(4);
                    continue;
                }
            }
            let window = end - base;
            let f = Function::analyze(&section.data[offset..], window, base);
            let size = f.size.max(4);
            image.symbols.emplace(format!("sub_{:X}", f.base), f.base, size, SymbolType::Function);
            base += size;
            functions.push(f);
        }
    }

    functions.sort_by_key(|f| f.base);
    functions
}

/// Pre-scans a function for every address that needs a `loc_<addr>:` label:
/// intra-function branch targets, in-range switch labels, and mid-asm hook
/// jump targets (spec.md §4.3 step 1).
fn collect_labels(function: &Function, code: &[u8], config: &Config) -> HashSet<u32> {
    let mut labels = HashSet::new();
    let mut offset = 0u32;
    while offset + 4 <= function.size && (offset as usize + 4) <= code.len() {
        let addr = function.base + offset;
        let word = u32::from_be_bytes(code[offset as usize..offset as usize + 4].try_into().unwrap());
        let insn = GuestInstruction::decode(word, addr);
        match insn.id() {
            OpcodeId::B | OpcodeId::Bc if !insn.link() => {
                let target = insn.operand(insn.operand_count() - 1) as u32;
                if target >= function.base && target < function.base + function.size {
                    labels.insert(target);
                }
            }
            _ => {}
        }
        if let Some(table) = config.switch_tables.get(&addr) {
            for &label in &table.labels {
                if label >= function.base && label < function.base + function.size {
                    labels.insert(label);
                }
            }
            if let Some(default) = table.default {
                if default >= function.base && default < function.base + function.size {
                    labels.insert(default);
                }
            }
        }
        offset += 4;
    }
    for hook in config.mid_asm_hooks.values() {
        for target in [hook.jump_address, hook.jump_address_on_true, hook.jump_address_on_false].into_iter().flatten() {
            if target >= function.base && target < function.base + function.size {
                labels.insert(target);
            }
        }
    }
    labels
}

/// Emits one function's host-source body into `emitter`, using the
/// buffer-swap technique (spec.md §4.3.2) to prepend the local-variable
/// declarations only after the whole body is known.
#[tracing::instrument(skip(emitter, image, config, function, diagnostics), fields(base = %format_args!("{:#010X}", function.base)))]
pub fn recompile_function(emitter: &mut Emitter, image: &Image, config: &Config, function: &Function, diagnostics: &mut Diagnostics) {
    let name = image.symbols.find(function.base).map(|s| s.name.clone()).unwrap_or_else(|| format!("sub_{:X}", function.base));
    let code = match image.find_address(function.base) {
        Some(bytes) => &bytes[..(function.size as usize).min(bytes.len())],
        None => return,
    };
    let labels = collect_labels(function, code, config);

    let saved = emitter.take_buffer();
    let mut locals = RecompilerLocalVariables::default();
    let mut csr = CsrState::Unknown;

    emitter.println(&format!("PPC_FUNC_IMPL(__imp__{name}) {{"));
    emitter.println("\tPPC_FUNC_PROLOGUE();");

    let mut offset = 0u32;
    while offset + 4 <= function.size && (offset as usize + 4) <= code.len() {
        let addr = function.base + offset;
        if labels.contains(&addr) {
            emitter.println(&format!("loc_{addr:X}:"));
            csr.reset();
        }
        let word = u32::from_be_bytes(code[offset as usize..offset as usize + 4].try_into().unwrap());
        let insn = GuestInstruction::decode(word, addr);

        if !insn.is_recognized() {
            emitter.println(&format!("\t// ERROR: unable to decode 0x{word:08X}"));
            diagnostics.record(Diagnostic::UnrecognizedInstruction { address: addr, raw: word });
            offset += 4;
            continue;
        }

        emitter.println(&format!("\t// {} {}", insn.mnemonic(), insn.render_operands()));

        let hook = config.mid_asm_hooks.get(&addr);
        if let Some(h) = hook {
            if !h.after_instruction {
                emitter.println(&format!("\tif ({name}_{}(ctx, base)) return;", h.name));
            }
        }

        let followed_by_eieio = code.get(offset as usize + 4..offset as usize + 8).map(|w| u32::from_be_bytes(w.try_into().unwrap()) == EIEIO_WORD).unwrap_or(false);

        let before_len = emitter.buffer().len();
        {
            let mut ctx = DispatchContext {
                config,
                locals: &mut locals,
                csr: &mut csr,
                diagnostics,
                fn_base: function.base,
                fn_end: function.base + function.size,
                followed_by_eieio,
                symbol_at: &|addr| image.symbols.find(addr).map(|s| s.name.as_str()),
            };
            if insn.id() == OpcodeId::Bcctr && !insn.link() {
                if let Some(table) = config.switch_tables.get(&addr) {
                    dispatch::emit_switch_bctr(emitter, &mut ctx, &insn, table.r, &table.labels, table.default);
                } else {
                    dispatch::recompile_instruction(emitter, &mut ctx, &insn);
                }
            } else {
                dispatch::recompile_instruction(emitter, &mut ctx, &insn);
            }
        }

        if insn.record_form() && !emitter.buffer()[before_len..].contains("cr0") && !emitter.buffer()[before_len..].contains("cr6") {
            diagnostics.record(Diagnostic::RcWithoutCompare { address: addr, mnemonic: insn.mnemonic() });
        }

        if let Some(h) = hook {
            if h.after_instruction {
                emitter.println(&format!("\tif ({name}_{}(ctx, base)) return;", h.name));
            }
        }

        offset += 4;
    }

    emitter.println("}");

    let body = emitter.take_buffer();
    emitter.restore_buffer(saved);
    for decl in locals.declarations() {
        emitter.println(&format!("\t{decl}"));
    }
    emitter.print(&body);
    emitter.println(&format!("PPC_WEAK_FUNC({name}, __imp__{name});"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_image(words: &[u32], base: u32) -> Image {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
        Image::from_flat_binary(bytes, base, base)
    }

    #[test]
    fn addi_then_blr_emits_assignment_and_return() {
        let image = make_image(&[0x3860_0001, 0x4E80_0020], 0x8200_0000);
        let config = Config::default();
        let function = Function::analyze(&image.sections[0].data, 8, 0x8200_0000);
        let mut emitter = Emitter::new(std::env::temp_dir());
        let mut diagnostics = Diagnostics::new();
        recompile_function(&mut emitter, &image, &config, &function, &mut diagnostics);
        assert!(emitter.buffer().contains("ctx.r3.s64 = 1;"));
        assert!(emitter.buffer().contains("return;"));
    }

    #[test]
    fn lwz_then_blr_emits_load_macro() {
        let image = make_image(&[0x8083_0010, 0x4E80_0020], 0x8200_0000);
        let config = Config::default();
        let function = Function::analyze(&image.sections[0].data, 8, 0x8200_0000);
        let mut emitter = Emitter::new(std::env::temp_dir());
        let mut diagnostics = Diagnostics::new();
        recompile_function(&mut emitter, &image, &config, &function, &mut diagnostics);
        assert!(emitter.buffer().contains("PPC_LOAD_U32(ctx.r3.u32 + 16)"));
    }

    #[test]
    fn forward_conditional_branch_emits_label_and_goto() {
        // cmpwi cr0, r3, 0; beq cr0, +8; li r3, 1; blr; li r3, 2; blr
        let image = make_image(&[0x2C03_0000, 0x4182_0008, 0x3860_0001, 0x4E80_0020, 0x3860_0002, 0x4E80_0020], 0x8200_0000);
        let config = Config::default();
        let function = Function::analyze(&image.sections[0].data, 24, 0x8200_0000);
        let mut emitter = Emitter::new(std::env::temp_dir());
        let mut diagnostics = Diagnostics::new();
        recompile_function(&mut emitter, &image, &config, &function, &mut diagnostics);
        let text = emitter.buffer();
        assert!(text.contains("cr0.compare<int32_t>"));
        assert!(text.contains("goto loc_8200000C"));
        assert!(text.contains("loc_8200000C:"));
    }

    #[test]
    fn rlwinm_computes_mask_from_mb_me() {
        let image = make_image(&[0x5483_083C], 0x8200_0000);
        let config = Config::default();
        let function = Function::analyze(&image.sections[0].data, 4, 0x8200_0000);
        let mut emitter = Emitter::new(std::env::temp_dir());
        let mut diagnostics = Diagnostics::new();
        recompile_function(&mut emitter, &image, &config, &function, &mut diagnostics);
        assert!(emitter.buffer().contains("0xFFFFFFFE"));
    }

    #[test]
    fn bctr_with_switch_table_emits_switch_statement() {
        let image = make_image(&[0x4E80_0420], 0x8200_0000);
        let mut config = Config::default();
        config.switch_tables.insert(
            0x8200_0000,
            crate::config::SwitchTable { base: 0x8200_0000, r: 3, labels: vec![0x8200_0000, 0x8200_0000, 0x8200_0000], default: None },
        );
        let function = Function { base: 0x8200_0000, size: 4, blocks: vec![] };
        let mut emitter = Emitter::new(std::env::temp_dir());
        let mut diagnostics = Diagnostics::new();
        recompile_function(&mut emitter, &image, &config, &function, &mut diagnostics);
        let text = emitter.buffer();
        assert!(text.contains("switch (ctx.r3.u64)"));
        assert!(text.contains("case 0:"));
        assert!(text.contains("case 2:"));
    }

    #[test]
    fn unsupported_opcode_is_diagnosed_but_does_not_stop_emission() {
        // divw r0, r0, r0 (not in the dispatch table); blr
        let image = make_image(&[0x7C00_03D6, 0x4E80_0020], 0x8200_0000);
        let config = Config::default();
        let function = Function::analyze(&image.sections[0].data, 8, 0x8200_0000);
        let mut emitter = Emitter::new(std::env::temp_dir());
        let mut diagnostics = Diagnostics::new();
        recompile_function(&mut emitter, &image, &config, &function, &mut diagnostics);
        assert_eq!(diagnostics.count_unsupported(), 1);
        assert!(emitter.buffer().contains("// ERROR: unrecognized instruction divw"));
        assert!(emitter.buffer().contains("return;"));
    }
}
