//! Custom cargo commands for the flatcheck crate.
//!
//! Usage:
//!   cargo xtask check     - cargo check, tests and clippy
//!   cargo xtask test      - Run all tests
//!   cargo xtask fuzz      - Run every fuzz target for a short while
//!   cargo xtask bench     - Run benchmarks

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::process::Command;

/// Seconds each fuzz target runs under `cargo xtask fuzz`.
const FUZZ_SECONDS: u32 = 60;

const FUZZ_TARGETS: &[&str] = &["verify_buffer", "mutate_buffer"];

fn main() -> Result<()> {
    let task = env::args().nth(1);
    match task.as_deref() {
        Some("check") => check()?,
        Some("test") => test()?,
        Some("fuzz") => fuzz()?,
        Some("bench") => bench()?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        r#"
cargo xtask <COMMAND>

Commands:
  check     cargo check, tests and clippy with warnings denied
  test      Run all Rust tests
  fuzz      Run each fuzz target for {FUZZ_SECONDS}s (needs cargo-fuzz and nightly)
  bench     Run benchmarks
"#
    );
}

fn check() -> Result<()> {
    println!("==========================================");
    println!("flatcheck checks");
    println!("==========================================\n");

    println!("[1/3] cargo check...");
    run_cargo(&["check", "--all-targets"])?;
    println!("✓ Builds\n");

    println!("[2/3] cargo test...");
    run_cargo(&["test", "--quiet"])?;
    println!("✓ All tests passed\n");

    println!("[3/3] cargo clippy...");
    run_cargo(&["clippy", "--quiet", "--all-targets", "--", "-D", "warnings"])?;
    println!("✓ Clippy passed\n");

    println!("✓ Checks passed");
    Ok(())
}

fn test() -> Result<()> {
    run_cargo(&["test"])
}

fn fuzz() -> Result<()> {
    let fuzz_dir = project_root()?.join("fuzz");
    if !fuzz_dir.exists() {
        bail!("no fuzz directory at {}", fuzz_dir.display());
    }

    let max_time = format!("-max_total_time={}", FUZZ_SECONDS);
    for (i, target) in FUZZ_TARGETS.iter().enumerate() {
        println!("[{}/{}] fuzzing {}...", i + 1, FUZZ_TARGETS.len(), target);
        let status = Command::new("cargo")
            .args(["+nightly", "fuzz", "run", target, "--", &max_time])
            .current_dir(&fuzz_dir)
            .status()
            .context("Failed to run cargo fuzz")?;
        if !status.success() {
            bail!("fuzz target {} failed", target);
        }
        println!("✓ {} survived {}s\n", target, FUZZ_SECONDS);
    }
    Ok(())
}

fn bench() -> Result<()> {
    run_cargo(&["bench"])
}

// ============================================================================
// Helper functions
// ============================================================================

fn project_root() -> Result<PathBuf> {
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => env::current_dir().context("no current directory")?,
    };

    // xtask is in project_root/xtask, so go up one level
    let root = manifest_dir.parent().unwrap_or(&manifest_dir);
    Ok(root.to_path_buf())
}

fn run_cargo(args: &[&str]) -> Result<()> {
    let root = project_root()?;

    let status = Command::new("cargo")
        .args(args)
        .current_dir(&root)
        .status()
        .with_context(|| format!("Failed to run cargo {:?}", args))?;

    if !status.success() {
        bail!("cargo {:?} failed", args);
    }

    Ok(())
}
