// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command execution: read inputs, run the engine, write the result.

use std::io::Write;
use std::path::{Path, PathBuf};

use rxpdf_core::error::{Result, RxPdfError};
use rxpdf_core::{EngineConfig, SpecParseMode};
use rxpdf_document::Engine;
use tracing::{debug, info};

use crate::cli::{Cli, Command};

/// Build the engine configuration from `--config` and the global flags.
pub fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    if cli.strict {
        config.spec_parse_mode = SpecParseMode::Strict;
    }
    Ok(config)
}

/// Run the parsed command. JSON output (from `info`) goes to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Compress {
            input,
            output,
            dpi,
            quality,
            only_if_smaller,
        } => {
            // Flags override the configuration file.
            if only_if_smaller {
                config.only_if_smaller = true;
            }
            if let Some(dpi) = dpi {
                config.default_dpi = dpi;
            }
            if let Some(quality) = quality {
                config.default_quality = quality;
            }
            let bytes = Engine::new(config).recompress_with_defaults(&read(&input)?)?;
            write(&output, &bytes)
        }
        Command::Merge { inputs, output } => {
            let documents = read_all(&inputs)?;
            let bytes = Engine::new(config).merge(&documents)?;
            write(&output, &bytes)
        }
        Command::Remove {
            input,
            pages,
            output,
        } => {
            let bytes = Engine::new(config).remove_pages(&read(&input)?, &pages)?;
            write(&output, &bytes)
        }
        Command::Rotate {
            input,
            rotations,
            output,
        } => {
            let bytes = Engine::new(config).rotate_pages(&read(&input)?, &rotations)?;
            write(&output, &bytes)
        }
        Command::Reorder {
            input,
            order,
            output,
        } => {
            let bytes = Engine::new(config).reorder_pages(&read(&input)?, &order)?;
            write(&output, &bytes)
        }
        Command::Assemble { images, output } => {
            let images = read_all(&images)?;
            let bytes = Engine::new(config).assemble_from_images(&images)?;
            write(&output, &bytes)
        }
        Command::Info { input, compact } => {
            let summary = Engine::new(config).inspect(&read(&input)?)?;
            let json = if compact {
                serde_json::to_string(&summary)
            } else {
                serde_json::to_string_pretty(&summary)
            }
            .map_err(|err| RxPdfError::Encode(format!("cannot render summary: {}", err)))?;
            writeln!(out, "{}", json)?;
            Ok(())
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read input");
    Ok(bytes)
}

fn read_all(paths: &[PathBuf]) -> Result<Vec<Vec<u8>>> {
    paths.iter().map(|path| read(path)).collect()
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Wrote PDF");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use image::codecs::jpeg::JpegEncoder;
    use image::{Rgb, RgbImage};
    use rxpdf_document::load;
    use tempfile::TempDir;

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, 90);
        RgbImage::from_pixel(width, height, Rgb([200, 100, 50]))
            .write_with_encoder(encoder)
            .unwrap();
        buffer
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rxpdf").chain(args.iter().copied())).unwrap()
    }

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    /// Write `pages` JPEGs and assemble them into `name` inside `dir`.
    fn pdf_fixture(dir: &TempDir, name: &str, pages: usize) -> PathBuf {
        let mut args = vec!["assemble".to_string()];
        for n in 0..pages {
            let image = dir.path().join(format!("{}-{}.jpg", name, n));
            std::fs::write(&image, jpeg(20 + n as u32, 10)).unwrap();
            args.push(image.display().to_string());
        }
        let output = dir.path().join(name);
        args.push("-o".into());
        args.push(output.display().to_string());

        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        run(cli(&refs), &mut Vec::new()).unwrap();
        output
    }

    #[test]
    fn assemble_then_remove_and_rotate() {
        let dir = TempDir::new().unwrap();
        let input = pdf_fixture(&dir, "in.pdf", 3);
        let trimmed = dir.path().join("trimmed.pdf");
        let rotated = dir.path().join("rotated.pdf");

        run(
            cli(&["remove", path_str(&input), "-p", "2", "-o", path_str(&trimmed)]),
            &mut Vec::new(),
        )
        .unwrap();
        run(
            cli(&["rotate", path_str(&trimmed), "-r", "2:90", "-o", path_str(&rotated)]),
            &mut Vec::new(),
        )
        .unwrap();

        let document = load(&std::fs::read(&rotated).unwrap()).unwrap();
        assert_eq!(document.page_count(), 2);
        assert_eq!(document.page(0).unwrap().size(), (20.0, 10.0));
        assert_eq!(document.page(1).unwrap().size(), (22.0, 10.0));
        assert_eq!(document.page(1).unwrap().rotation().degrees(), 90);
    }

    #[test]
    fn merge_and_info() {
        let dir = TempDir::new().unwrap();
        let a = pdf_fixture(&dir, "a.pdf", 1);
        let b = pdf_fixture(&dir, "b.pdf", 2);
        let merged = dir.path().join("merged.pdf");

        run(
            cli(&["merge", path_str(&a), path_str(&b), "-o", path_str(&merged)]),
            &mut Vec::new(),
        )
        .unwrap();

        let mut out = Vec::new();
        run(cli(&["info", path_str(&merged), "--compact"]), &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["page_count"], 3);
        assert_eq!(json["pages"][2]["width_pt"], 21.0);
    }

    #[test]
    fn merge_of_one_file_fails() {
        let dir = TempDir::new().unwrap();
        let a = pdf_fixture(&dir, "a.pdf", 1);
        let out = dir.path().join("out.pdf");
        let err = run(cli(&["merge", path_str(&a), "-o", path_str(&out)]), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, RxPdfError::InsufficientInputs { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn compress_with_half_dpi() {
        let dir = TempDir::new().unwrap();
        let input = pdf_fixture(&dir, "in.pdf", 1);
        let output = dir.path().join("small.pdf");
        run(
            cli(&["compress", path_str(&input), "--dpi", "36", "-q", "40", "-o", path_str(&output)]),
            &mut Vec::new(),
        )
        .unwrap();

        let document = load(&std::fs::read(&output).unwrap()).unwrap();
        let image = &document.page(0).unwrap().images()[0];
        assert_eq!((image.width(), image.height()), (10, 5));
    }

    #[test]
    fn compress_falls_back_to_configured_dpi() {
        let dir = TempDir::new().unwrap();
        let input = pdf_fixture(&dir, "in.pdf", 1);
        let config = dir.path().join("rxpdf.json");
        std::fs::write(&config, r#"{"default_dpi": 36}"#).unwrap();
        let output = dir.path().join("small.pdf");
        run(
            cli(&["--config", path_str(&config), "compress", path_str(&input), "-o", path_str(&output)]),
            &mut Vec::new(),
        )
        .unwrap();

        let document = load(&std::fs::read(&output).unwrap()).unwrap();
        let image = &document.page(0).unwrap().images()[0];
        assert_eq!((image.width(), image.height()), (10, 5));
    }

    #[test]
    fn strict_flag_rejects_bad_page_lists() {
        let dir = TempDir::new().unwrap();
        let input = pdf_fixture(&dir, "in.pdf", 2);
        let output = dir.path().join("out.pdf");
        let err = run(
            cli(&["--strict", "remove", path_str(&input), "-p", "1,x", "-o", path_str(&output)]),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, RxPdfError::InvalidSpec { .. }));
    }

    #[test]
    fn config_file_sets_parse_mode() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("rxpdf.json");
        std::fs::write(&config, r#"{"spec_parse_mode": "strict", "min_merge_inputs": 3}"#).unwrap();

        let parsed = cli(&["--config", path_str(&config), "info", "x.pdf"]);
        let loaded = load_config(&parsed).unwrap();
        assert_eq!(loaded.spec_parse_mode, SpecParseMode::Strict);
        assert_eq!(loaded.min_merge_inputs, 3);
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.pdf");
        let err = run(cli(&["info", path_str(&missing)]), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, RxPdfError::Io(_)));
    }

    #[test]
    fn reorder_reverses_pages() {
        let dir = TempDir::new().unwrap();
        let input = pdf_fixture(&dir, "in.pdf", 3);
        let output = dir.path().join("reordered.pdf");
        run(
            cli(&["reorder", path_str(&input), "--order", "3,2,1", "-o", path_str(&output)]),
            &mut Vec::new(),
        )
        .unwrap();
        let document = load(&std::fs::read(&output).unwrap()).unwrap();
        let widths: Vec<f64> = document.pages().iter().map(|p| p.size().0).collect();
        assert_eq!(widths, vec![22.0, 21.0, 20.0]);
    }
}
