// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Luma compiler front-end command-line driver.
//!
//! Reads a source file, tokenizes and parses it, and reports
//! diagnostics to stderr in the `[line L] Error at 'T': MSG` format.
//! On request it also writes token and AST debug dumps (only when the
//! parse succeeded, matching the contract that a failed parse's tree
//! is not consumed).
//!
//! ```text
//! luma program.luma --dump-tokens tokens.txt --dump-ast ast.txt
//! ```

use std::fs;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::{Context, IntoDiagnostic, Result};

use luma_core::dump::{dump_ast, dump_tokens};
use luma_core::intern::StringPool;
use luma_core::source_analysis::{parse, tokenize};

/// Luma: a small statically-typed, Lua-derived language
#[derive(Debug, Parser)]
#[command(name = "luma")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source file to parse
    file: Utf8PathBuf,

    /// Write a token dump to this path
    #[arg(long, value_name = "PATH")]
    dump_tokens: Option<Utf8PathBuf>,

    /// Write an AST dump to this path
    #[arg(long, value_name = "PATH")]
    dump_ast: Option<Utf8PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing only when explicitly requested, so normal runs
    // keep stderr clean for diagnostics.
    if std::env::var("LUMA_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("LUMA_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let success = run(&cli)?;
    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// Runs the front end over the given file. Returns whether the parse
/// succeeded; IO problems surface as errors.
fn run(cli: &Cli) -> Result<bool> {
    let source = fs::read_to_string(&cli.file)
        .into_diagnostic()
        .wrap_err_with(|| format!("could not read '{}'", cli.file))?;

    let mut pool = StringPool::new();
    let tokens = tokenize(&source, &mut pool);
    tracing::debug!(tokens = tokens.len(), "tokenized {}", cli.file);

    let (tree, diagnostics) = parse(tokens.clone(), &pool);
    tracing::debug!(
        statements = tree.root_block().len(),
        errors = diagnostics.len(),
        "parsed {}",
        cli.file
    );

    for diagnostic in &diagnostics {
        eprintln!("{diagnostic}");
    }

    if !tree.success {
        return Ok(false);
    }

    if let Some(path) = &cli.dump_tokens {
        fs::write(path, dump_tokens(&tokens, &pool))
            .into_diagnostic()
            .wrap_err_with(|| format!("could not write token dump to '{path}'"))?;
    }
    if let Some(path) = &cli.dump_ast {
        fs::write(path, dump_ast(&tree, &pool))
            .into_diagnostic()
            .wrap_err_with(|| format!("could not write AST dump to '{path}'"))?;
    }

    Ok(true)
}
