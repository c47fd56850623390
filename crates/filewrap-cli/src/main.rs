//! filewrap - Wrap binary files into a C++ header and translation unit
//!
//! Meant to run as a single step of a build. Every input is embedded as a
//! string constant and listed in a `FileToc` table that the generated
//! accessors expose.

use anyhow::{Context, Result};
use clap::Parser;
use filewrap_core::{generate, EmbedContext, TranscoderConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Embed binary files into generated C++ sources
#[derive(Parser, Debug)]
#[command(name = "filewrap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Package label, used for the include guard and the include path
    package: String,

    /// Logical name; hyphens become underscores in the accessor names
    name: String,

    /// Namespace wrapping both outputs (empty string for none)
    namespace: String,

    /// Output path of the declaration header
    output_decl: PathBuf,

    /// Output path of the definition source
    output_def: PathBuf,

    /// Files to embed, in table order. Names starting with '-' are paths too.
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    inputs: Vec<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Allow two inputs to produce the same data identifier
    #[arg(long)]
    allow_collisions: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Invocation problems exit with 2 like clap's own usage errors, I/O failures with 1
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<filewrap_core::Error>() {
        Some(e) if e.is_usage() => 2,
        _ => 1,
    }
}

/// Generates both outputs for the parsed command line
fn run(cli: &Cli) -> Result<()> {
    let ctx = EmbedContext::new(&cli.package, &cli.name)
        .with_context(|| format!("Invalid NAME argument: {}", cli.name))?
        .namespace(&cli.namespace);
    let config = TranscoderConfig::new().reject_collisions(!cli.allow_collisions);

    let toc = generate(
        &ctx,
        &config,
        &cli.output_decl,
        &cli.output_def,
        cli.inputs.as_slice(),
    )
    .with_context(|| {
        format!(
            "Failed to generate {} and {}",
            cli.output_decl.display(),
            cli.output_def.display()
        )
    })?;

    info!(
        "Summary: {} files embedded, {} bytes, accessors {}() and {}()",
        toc.len(),
        toc.total_bytes(),
        ctx.create_fn(),
        ctx.size_fn()
    );

    Ok(())
}
