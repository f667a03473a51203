//! Recompiler configuration (spec.md §3 `Config`/`SwitchTable`/`MidAsmHook`,
//! §6 TOML schema). Field names mirror the on-disk snake_case keys from the
//! original `[main]` table via `#[serde(rename = ...)]`, while the Rust
//! names stay idiomatic camelCase-free identifiers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForcedFunction {
    pub address: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidInstruction {
    pub data: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MainTable {
    #[serde(default)]
    file_path: String,
    #[serde(default)]
    patch_file_path: String,
    #[serde(default)]
    patched_file_path: String,
    #[serde(default)]
    out_directory_path: String,
    #[serde(default)]
    switch_table_file_path: String,
    #[serde(default)]
    skip_lr: bool,
    #[serde(default)]
    skip_msr: bool,
    #[serde(default)]
    ctr_as_local: bool,
    #[serde(default)]
    xer_as_local: bool,
    #[serde(default)]
    reserved_as_local: bool,
    #[serde(default)]
    cr_as_local: bool,
    #[serde(default)]
    non_argument_as_local: bool,
    #[serde(default)]
    non_volatile_as_local: bool,
    #[serde(default)]
    restgprlr_14_address: u32,
    #[serde(default)]
    savegprlr_14_address: u32,
    #[serde(default)]
    restfpr_14_address: u32,
    #[serde(default)]
    savefpr_14_address: u32,
    #[serde(default)]
    restvmx_14_address: u32,
    #[serde(default)]
    savevmx_14_address: u32,
    #[serde(default)]
    restvmx_64_address: u32,
    #[serde(default)]
    savevmx_64_address: u32,
    #[serde(default)]
    longjmp_address: u32,
    #[serde(default)]
    setjmp_address: u32,
    #[serde(default)]
    functions: Vec<ForcedFunction>,
    #[serde(default)]
    invalid_instructions: Vec<InvalidInstruction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TopLevelTable {
    #[serde(default)]
    main: MainTable,
    #[serde(default, rename = "midasm_hook")]
    midasm_hooks: Vec<MidAsmHookToml>,
}

#[derive(Debug, Clone, Deserialize)]
struct MidAsmHookToml {
    address: u32,
    name: String,
    #[serde(default)]
    registers: Vec<String>,
    #[serde(default, rename = "return")]
    ret: bool,
    #[serde(default)]
    return_on_true: bool,
    #[serde(default)]
    return_on_false: bool,
    #[serde(default)]
    jump_address: u32,
    #[serde(default)]
    jump_address_on_true: u32,
    #[serde(default)]
    jump_address_on_false: u32,
    #[serde(default)]
    after_instruction: bool,
}

/// `{name, register list, return?, returnOnTrue?, returnOnFalse?,
/// jumpAddress?, jumpAddressOnTrue?, jumpAddressOnFalse?, afterInstruction?}`
/// (spec.md §3). Invariant: an unconditional action and a conditional one
/// are mutually exclusive; `validate` reports `MidAsmHookConflict` when
/// violated rather than rejecting the config outright (spec.md §7 makes this
/// a non-aborting diagnostic).
#[derive(Debug, Clone)]
pub struct MidAsmHook {
    pub name: String,
    pub registers: Vec<String>,
    pub ret: bool,
    pub return_on_true: bool,
    pub return_on_false: bool,
    pub jump_address: Option<u32>,
    pub jump_address_on_true: Option<u32>,
    pub jump_address_on_false: Option<u32>,
    pub after_instruction: bool,
}

impl MidAsmHook {
    pub fn returns_bool(&self) -> bool {
        self.return_on_false || self.return_on_true || self.jump_address_on_false.is_some() || self.jump_address_on_true.is_some()
    }

    /// `MidAsmHookConflict` (§7): mixing a direct and a conditional form.
    pub fn has_conflict(&self) -> bool {
        let unconditional = self.ret || self.jump_address.is_some();
        let conditional = self.return_on_true || self.return_on_false || self.jump_address_on_true.is_some() || self.jump_address_on_false.is_some();
        unconditional && conditional
    }

    fn from_toml(t: MidAsmHookToml) -> Self {
        let nz = |v: u32| if v == 0 { None } else { Some(v) };
        MidAsmHook {
            name: t.name,
            registers: t.registers,
            ret: t.ret,
            return_on_true: t.return_on_true,
            return_on_false: t.return_on_false,
            jump_address: nz(t.jump_address),
            jump_address_on_true: nz(t.jump_address_on_true),
            jump_address_on_false: nz(t.jump_address_on_false),
            after_instruction: t.after_instruction,
        }
    }
}

/// `{r, labels}` keyed by the resolving `bctr`'s address (spec.md §3).
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchTable {
    #[serde(skip)]
    pub base: u32,
    pub r: u32,
    pub labels: Vec<u32>,
    /// Supplement beyond spec.md's literal struct: `XenonAnalyse`'s
    /// `SwitchTable::defaultLabel`. When set, an out-of-range `bctr` case
    /// falls through to this label instead of the `OutOfRangeSwitchLabel`
    /// diagnostic.
    pub default: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct SwitchTableEntry {
    base: u32,
    r: u32,
    labels: Vec<u32>,
    #[serde(default)]
    default: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SwitchTableFile {
    #[serde(default, rename = "switch")]
    switches: Vec<SwitchTableEntry>,
}

/// Aggregate recompiler configuration (spec.md §3 `Config`).
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub directory_path: PathBuf,
    pub file_path: String,
    pub patch_file_path: String,
    pub patched_file_path: String,
    pub out_directory_path: String,
    pub switch_table_file_path: String,

    pub skip_lr: bool,
    pub skip_msr: bool,
    pub ctr_as_local: bool,
    pub xer_as_local: bool,
    pub reserved_as_local: bool,
    pub cr_as_local: bool,
    pub non_argument_as_local: bool,
    pub non_volatile_as_local: bool,

    pub restgprlr_14_address: u32,
    pub savegprlr_14_address: u32,
    pub restfpr_14_address: u32,
    pub savefpr_14_address: u32,
    pub restvmx_14_address: u32,
    pub savevmx_14_address: u32,
    pub restvmx_64_address: u32,
    pub savevmx_64_address: u32,

    pub longjmp_address: Option<u32>,
    pub setjmp_address: Option<u32>,

    pub functions: Vec<ForcedFunction>,
    pub invalid_instructions: HashMap<u32, u32>,

    pub switch_tables: HashMap<u32, SwitchTable>,
    pub mid_asm_hooks: HashMap<u32, MidAsmHook>,
}

impl Config {
    /// Loads `[main]` and `[[midasm_hook]]` from `config_path`, and the
    /// sibling switch-table file named by `switch_table_file_path` if set.
    /// A missing mandatory save/restore trampoline address is logged, not a
    /// hard error: the recompiler still runs, producing functions that call
    /// into symbols it cannot synthesize bodies for.
    pub fn load(config_path: &Path) -> Result<Self> {
        let directory_path = config_path.parent().map(Path::to_path_buf).unwrap_or_default();
        let text = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Configuration(format!("cannot read {}: {e}", config_path.display())))?;
        let top: TopLevelTable = toml::from_str(&text)
            .map_err(|e| Error::Configuration(format!("malformed config TOML: {e}")))?;
        let main = top.main;

        let mut config = Config {
            directory_path,
            file_path: main.file_path,
            patch_file_path: main.patch_file_path,
            patched_file_path: main.patched_file_path,
            out_directory_path: main.out_directory_path,
            switch_table_file_path: main.switch_table_file_path.clone(),
            skip_lr: main.skip_lr,
            skip_msr: main.skip_msr,
            ctr_as_local: main.ctr_as_local,
            xer_as_local: main.xer_as_local,
            reserved_as_local: main.reserved_as_local,
            cr_as_local: main.cr_as_local,
            non_argument_as_local: main.non_argument_as_local,
            non_volatile_as_local: main.non_volatile_as_local,
            restgprlr_14_address: main.restgprlr_14_address,
            savegprlr_14_address: main.savegprlr_14_address,
            restfpr_14_address: main.restfpr_14_address,
            savefpr_14_address: main.savefpr_14_address,
            restvmx_14_address: main.restvmx_14_address,
            savevmx_14_address: main.savevmx_14_address,
            restvmx_64_address: main.restvmx_64_address,
            savevmx_64_address: main.savevmx_64_address,
            longjmp_address: (main.longjmp_address != 0).then_some(main.longjmp_address),
            setjmp_address: (main.setjmp_address != 0).then_some(main.setjmp_address),
            functions: main.functions,
            invalid_instructions: main.invalid_instructions.into_iter().map(|i| (i.data, i.size)).collect(),
            switch_tables: HashMap::new(),
            mid_asm_hooks: HashMap::new(),
        };

        for (label, address) in [
            ("__restgprlr_14", config.restgprlr_14_address),
            ("__savegprlr_14", config.savegprlr_14_address),
            ("__restfpr_14", config.restfpr_14_address),
            ("__savefpr_14", config.savefpr_14_address),
            ("__restvmx_14", config.restvmx_14_address),
            ("__savevmx_14", config.savevmx_14_address),
            ("__restvmx_64", config.restvmx_64_address),
            ("__savevmx_64", config.savevmx_64_address),
        ] {
            if address == 0 {
                tracing::warn!(%label, "trampoline address is unspecified");
            }
        }

        if !config.switch_table_file_path.is_empty() {
            let path = config.directory_path.join(&config.switch_table_file_path);
            let text = std::fs::read_to_string(&path)
                .map_err(|e| Error::Configuration(format!("cannot read {}: {e}", path.display())))?;
            let file: SwitchTableFile = toml::from_str(&text)
                .map_err(|e| Error::Configuration(format!("malformed switch table TOML: {e}")))?;
            for entry in file.switches {
                config.switch_tables.insert(
                    entry.base,
                    SwitchTable { base: entry.base, r: entry.r, labels: entry.labels, default: entry.default },
                );
            }
        }

        for hook_toml in top.midasm_hooks {
            let address = hook_toml.address;
            let hook = MidAsmHook::from_toml(hook_toml);
            if hook.has_conflict() {
                tracing::warn!(name = %hook.name, "mid-asm hook mixes direct and conditional return/jump");
            }
            config.mid_asm_hooks.insert(address, hook);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_main_table_with_defaults() {
        let toml = r#"
            [main]
            file_path = "game.xex"
            ctr_as_local = true
            [[main.functions]]
            address = 0x82001000
            size = 0x40
        "#;
        let top: TopLevelTable = toml::from_str(toml).unwrap();
        assert_eq!(top.main.file_path, "game.xex");
        assert!(top.main.ctr_as_local);
        assert_eq!(top.main.functions.len(), 1);
        assert_eq!(top.main.functions[0].address, 0x8200_1000);
    }

    #[test]
    fn mid_asm_hook_flags_conflict() {
        let hook = MidAsmHook {
            name: "hook".into(),
            registers: vec![],
            ret: true,
            return_on_true: true,
            return_on_false: false,
            jump_address: None,
            jump_address_on_true: None,
            jump_address_on_false: None,
            after_instruction: false,
        };
        assert!(hook.has_conflict());
    }

    #[test]
    fn mid_asm_hook_no_conflict_for_pure_unconditional() {
        let hook = MidAsmHook {
            name: "hook".into(),
            registers: vec![],
            ret: true,
            return_on_true: false,
            return_on_false: false,
            jump_address: None,
            jump_address_on_true: None,
            jump_address_on_false: None,
            after_instruction: false,
        };
        assert!(!hook.has_conflict());
    }
}
