// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the flatcheck command-line interface.
//!
//! Every command works against a schema: the built-in character schema by
//! default, or a JSON schema description passed with `--schema`.

pub mod display;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "flatcheck",
    about = "Build, verify, inspect and patch FlatBuffers-compatible buffers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a buffer from a JSON object
    Build {
        /// JSON input file ("-" for stdin)
        input: String,

        /// Where to write the buffer
        #[arg(short, long)]
        output: PathBuf,

        /// Four-character file identifier written after the root offset
        #[arg(long)]
        identifier: Option<String>,

        /// Write scalar fields even when they equal their default
        #[arg(long)]
        force_defaults: bool,

        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// Show the layout and contents of a buffer
    Inspect {
        /// Buffer file
        file: PathBuf,

        /// Print the contents as JSON only
        #[arg(long)]
        json: bool,

        /// Append a hex dump of the whole buffer
        #[arg(long)]
        hex: bool,

        #[command(flatten)]
        schema: SchemaArgs,

        #[command(flatten)]
        verify: VerifyArgs,
    },

    /// Verify a buffer; exits non-zero if it is malformed
    Verify {
        /// Buffer file
        file: PathBuf,

        #[command(flatten)]
        schema: SchemaArgs,

        #[command(flatten)]
        verify: VerifyArgs,
    },

    /// Overwrite fixed-width fields of a buffer in place
    ///
    /// Assignments look like `hp=1234`, `chtype=AI`, `inventory[1]=99` or
    /// `spawn.x=2.5`. Only fields present in the buffer can change.
    Mutate {
        /// Buffer file
        file: PathBuf,

        /// Field assignments
        #[arg(required = true)]
        assignments: Vec<String>,

        /// Write the result here instead of back into FILE
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        schema: SchemaArgs,

        #[command(flatten)]
        verify: VerifyArgs,
    },

    /// Print a schema as .fbs text
    Schema {
        #[command(flatten)]
        schema: SchemaArgs,
    },

    /// Run the character build, verify, read and mutate walkthrough
    Demo {
        /// Also write the final buffers into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Args, Clone)]
pub struct SchemaArgs {
    /// JSON schema description (defaults to the built-in character schema)
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct VerifyArgs {
    /// Maximum table nesting depth
    #[arg(long, default_value_t = flatcheck::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Maximum number of tables in one buffer
    #[arg(long, default_value_t = flatcheck::DEFAULT_MAX_TABLES)]
    pub max_tables: usize,

    /// Skip alignment checks
    #[arg(long)]
    pub no_align: bool,

    /// Require this four-character file identifier
    #[arg(long)]
    pub identifier: Option<String>,
}
