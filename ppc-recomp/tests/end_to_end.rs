//! End-to-end recompiler scenarios (spec.md §8), driven through the public
//! crate API rather than the internal unit tests colocated with
//! `recompiler::mod`, to exercise the same surface a CLI invocation does.

use ppc_recomp::config::Config;
use ppc_recomp::image::{Image, SymbolType};
use ppc_recomp::recompiler;
use ppc_recomp::{Diagnostics, Emitter, Function};

fn words(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn emit_one(image: &Image, config: &Config, function: &Function) -> (String, Diagnostics) {
    let mut emitter = Emitter::new(std::env::temp_dir());
    let mut diagnostics = Diagnostics::new();
    recompiler::recompile_function(&mut emitter, image, config, function, &mut diagnostics);
    (emitter.buffer().to_string(), diagnostics)
}

#[test]
fn scenario_1_addi_then_blr() {
    let image = Image::from_flat_binary(words(&[0x3860_0001, 0x4E80_0020]), 0x8200_0000, 0x8200_0000);
    let config = Config::default();
    let function = Function::analyze(&image.sections[0].data, 8, 0x8200_0000);
    let (text, _) = emit_one(&image, &config, &function);
    assert!(text.contains("ctx.r3.s64 = 1;"));
    assert!(text.contains("return;"));
}

#[test]
fn scenario_2_lwz_then_blr() {
    let image = Image::from_flat_binary(words(&[0x8083_0010, 0x4E80_0020]), 0x8200_0000, 0x8200_0000);
    let config = Config::default();
    let function = Function::analyze(&image.sections[0].data, 8, 0x8200_0000);
    let (text, _) = emit_one(&image, &config, &function);
    assert!(text.contains("ctx.r4.u64 = PPC_LOAD_U32(ctx.r3.u32 + 16);"));
}

#[test]
fn scenario_3_conditional_branch_produces_two_arms() {
    let image = Image::from_flat_binary(
        words(&[0x2C03_0000, 0x4182_0008, 0x3860_0001, 0x4E80_0020, 0x3860_0002, 0x4E80_0020]),
        0x8200_0000,
        0x8200_0000,
    );
    let config = Config::default();
    let function = Function::analyze(&image.sections[0].data, 24, 0x8200_0000);
    let (text, _) = emit_one(&image, &config, &function);
    assert!(text.contains("cr0.compare<int32_t>(ctx.r3.s32, 0, ctx.xer);"));
    assert!(text.contains("if (ctx.cr0.eq) goto loc_8200000C;"));
    assert_eq!(text.matches("return;").count(), 2);
    assert!(text.contains("ctx.r3.s64 = 1;"));
    assert!(text.contains("ctx.r3.s64 = 2;"));
}

#[test]
fn scenario_4_bl_to_named_symbol_resets_csr() {
    let mut image = Image::from_flat_binary(words(&[0x4BFF_FC01 /* bl -1024 */]), 0x8200_1000, 0x8200_1000);
    image.symbols.emplace("foo", 0x8200_0C00, 0x20, SymbolType::Function);
    let config = Config::default();
    let function = Function { base: 0x8200_1000, size: 4, blocks: vec![] };
    let (text, _) = emit_one(&image, &config, &function);
    assert!(text.contains("ctx.lr = 0x82001004;"));
    assert!(text.contains("foo(ctx, base);"));
}

#[test]
fn scenario_5_rlwinm_mask_computation() {
    let image = Image::from_flat_binary(words(&[0x5483_083C]), 0x8200_0000, 0x8200_0000);
    let config = Config::default();
    let function = Function { base: 0x8200_0000, size: 4, blocks: vec![] };
    let (text, _) = emit_one(&image, &config, &function);
    assert!(text.contains("__builtin_rotateleft64(ctx.r4.u32 | (ctx.r4.u64 << 32), 1) & 0xFFFFFFFE;"));
}

#[test]
fn scenario_6_bctr_with_in_function_switch_table() {
    let image = Image::from_flat_binary(words(&[0x4E80_0420]), 0x8200_0000, 0x8200_0000);
    let mut config = Config::default();
    config.switch_tables.insert(
        0x8200_0000,
        ppc_recomp::config::SwitchTable { base: 0x8200_0000, r: 3, labels: vec![0x8200_0000, 0x8200_0000, 0x8200_0000], default: None },
    );
    let function = Function { base: 0x8200_0000, size: 4, blocks: vec![] };
    let (text, _) = emit_one(&image, &config, &function);
    assert!(text.contains("switch (ctx.r3.u64) {"));
    assert!(text.contains("case 0:"));
    assert!(text.contains("case 1:"));
    assert!(text.contains("case 2:"));
    assert!(text.contains("default:"));
    assert!(text.contains("__builtin_unreachable();"));
}

#[test]
fn output_dedup_skips_rewrite_on_identical_content() {
    let dir = tempfile::tempdir().unwrap();
    let image = Image::from_flat_binary(words(&[0x3860_0001, 0x4E80_0020]), 0x8200_0000, 0x8200_0000);
    let config = Config::default();
    let function = Function::analyze(&image.sections[0].data, 8, 0x8200_0000);

    let mut diagnostics = Diagnostics::new();
    let mut emitter = Emitter::new(dir.path());
    recompiler::recompile_function(&mut emitter, &image, &config, &function, &mut diagnostics);
    emitter.flush(Some("ppc_recomp.0.cpp")).unwrap();
    let mtime_first = std::fs::metadata(dir.path().join("ppc_recomp.0.cpp")).unwrap().modified().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(10));

    let mut emitter = Emitter::new(dir.path());
    recompiler::recompile_function(&mut emitter, &image, &config, &function, &mut diagnostics);
    emitter.flush(Some("ppc_recomp.0.cpp")).unwrap();
    let mtime_second = std::fs::metadata(dir.path().join("ppc_recomp.0.cpp")).unwrap().modified().unwrap();

    assert_eq!(mtime_first, mtime_second);
}
