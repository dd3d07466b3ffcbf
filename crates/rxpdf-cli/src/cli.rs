// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "rxpdf")]
#[command(version)]
#[command(about = "Compress, merge, trim, rotate, reorder and assemble PDF documents", long_about = None)]
pub struct Cli {
    /// Engine configuration (JSON); unset fields keep their defaults
    #[arg(long, global = true, value_name = "FILE", env = "RXPDF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reject page lists containing malformed entries instead of skipping them
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Downsample and re-encode every embedded image as JPEG
    Compress {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Target resolution (images are scaled by DPI / 72)
        #[arg(long)]
        dpi: Option<u32>,

        /// JPEG quality, 0-100
        #[arg(short, long)]
        quality: Option<u8>,

        /// Keep images whose re-encoded form is not smaller
        #[arg(long)]
        only_if_smaller: bool,
    },

    /// Concatenate PDFs in the order given
    Merge {
        /// Input PDF files
        #[arg(value_name = "FILES", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Remove pages (1-based list, e.g. "2,4,6")
    #[command(alias = "rm")]
    Remove {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Pages to remove
        #[arg(short, long)]
        pages: String,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Rotate pages (e.g. "1:90,3:270", angles in steps of 90)
    Rotate {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page rotations
        #[arg(short, long)]
        rotations: String,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Rearrange pages (every page exactly once, e.g. "3,1,2")
    Reorder {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// New page order
        #[arg(long)]
        order: String,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Build a PDF with one page per image
    Assemble {
        /// Input images (JPEG, PNG, ...)
        #[arg(value_name = "IMAGES", required = true, num_args = 1..)]
        images: Vec<PathBuf>,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Show pages and images as JSON
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },
}
