//! Command-line entry point (spec.md §6's CLI/config surface, out of scope
//! for the core but built the way a complete crate ships it).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ppc_recomp::config::Config;
use ppc_recomp::image::Image;
use ppc_recomp::recompiler;
use ppc_recomp::{Diagnostics, Emitter};

#[derive(Debug, Parser)]
#[command(name = "ppc-recomp", about = "Statically recompile a PowerPC image into host source")]
struct Cli {
    /// Path to the TOML configuration file.
    config_path: PathBuf,

    /// Increase log verbosity (`-v` debug, `-vv` trace). Overridden by `RUST_LOG`.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn install_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;
    let default = match verbose {
        0 => "ppc_recomp=info",
        1 => "ppc_recomp=debug",
        _ => "ppc_recomp=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: Cli) -> ppc_recomp::Result<()> {
    let config = Config::load(&cli.config_path)?;

    let image_path = config.directory_path.join(&config.file_path);
    let bytes = std::fs::read(&image_path).map_err(|source| ppc_recomp::Error::ImageIo { path: image_path.clone(), source })?;
    let base = 0; // the flat-image loader has no container header to read a load address from.
    let mut image = Image::from_flat_binary(bytes, base, base);

    let functions = recompiler::discover_functions(&mut image, &config);
    tracing::info!(count = functions.len(), "discovered functions");

    let out_dir = config.directory_path.join(&config.out_directory_path);
    let mut emitter = Emitter::new(out_dir);
    let mut diagnostics = Diagnostics::new();

    for (i, function) in functions.iter().enumerate() {
        if i > 0 && i % 256 == 0 {
            emitter.flush(None)?;
            emitter.println("#include \"ppc_recomp_shared.h\"\n");
        }
        recompiler::recompile_function(&mut emitter, &image, &config, function, &mut diagnostics);
    }
    emitter.flush(None)?;

    emitter.println("PPCFuncMapping PPCFuncMappings[] = {");
    for symbol in image.symbols.iter() {
        emitter.println(&format!("\t{{ {:#X}, {} }},", symbol.address, symbol.name));
    }
    emitter.println("\t{ 0, nullptr }");
    emitter.println("};");
    emitter.flush(Some("ppc_func_mapping.cpp"))?;

    tracing::info!(diagnostics = diagnostics.len(), unsupported = diagnostics.count_unsupported(), "recompilation complete");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "recompilation failed");
            ExitCode::FAILURE
        }
    }
}
