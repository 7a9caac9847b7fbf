//! `vrm-inspect`: command-line front end for the VRM importer.
//!
//! Exit codes: 0 success, 1 error, 2 license confirmation required,
//! 3 files differ.

mod cli;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use vrm_io::{
    ImportOptions, ImportOutcome, Language, LicenseConfirmationRequired, LicenseStatus, VrmDocument,
    VrmReader,
};

use crate::cli::{Cli, Command};

const EXIT_LICENSE: u8 = 2;
const EXIT_DIFFERENT: u8 = 3;

#[derive(Error, Debug)]
enum ToolError {
    #[error("{0}")]
    Vrm(#[from] vrm_io::VrmError),

    #[error("{0}")]
    Diff(#[from] vrm_io::DiffError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::initialize_tracing(&cli.log_filter, cli.log_format);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode, ToolError> {
    match command {
        Command::Inspect {
            file,
            skip_license_check,
            no_legacy_uv_fix,
            language,
            json,
        } => {
            let options = ImportOptions::new()
                .with_license_check(!skip_license_check)
                .with_legacy_uv_fix(!no_legacy_uv_fix)
                .with_language(language.into());
            inspect(&file, &options, json)
        }
        Command::License { file, language } => {
            let data = read_file(&file)?;
            match VrmReader::check_license(&data)? {
                LicenseStatus::Approved => {
                    println!("license: approved");
                    Ok(ExitCode::SUCCESS)
                }
                LicenseStatus::ConfirmationRequired(required) => {
                    print_confirmation(&required, language.into());
                    Ok(ExitCode::from(EXIT_LICENSE))
                }
            }
        }
        Command::Diff {
            left,
            right,
            tolerance,
        } => {
            let before = read_file(&left)?;
            let after = read_file(&right)?;
            let diffs = vrm_io::vrm_diff(&before, &after, tolerance)?;
            for diff in &diffs {
                println!("{}", diff);
            }
            if diffs.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                tracing::info!(differences = diffs.len(), "files differ");
                Ok(ExitCode::from(EXIT_DIFFERENT))
            }
        }
        Command::Sanitize { name } => {
            println!("{}", vrm_core::remove_unsafe_path_chars(&name));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ToolError> {
    fs::read(path).map_err(|source| ToolError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn inspect(file: &Path, options: &ImportOptions, json: bool) -> Result<ExitCode, ToolError> {
    let data = read_file(file)?;
    match VrmReader::from_glb(&data, Some(file.to_path_buf()), options)? {
        ImportOutcome::Imported(document) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                print_summary(&document);
            }
            Ok(ExitCode::SUCCESS)
        }
        ImportOutcome::LicenseConfirmationRequired(required) => {
            if json {
                let rows = required.license_confirmations(options.language);
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_confirmation(&required, options.language);
            }
            Ok(ExitCode::from(EXIT_LICENSE))
        }
    }
}

fn print_confirmation(required: &LicenseConfirmationRequired, language: Language) {
    println!("license: confirmation required");
    for row in required.license_confirmations(language) {
        println!("[{}]", row.name);
        if !row.url.is_empty() {
            println!("  url: {}", row.url);
        }
        if !row.json_key.is_empty() {
            println!("  field: {}", row.json_key);
        }
        for line in row.message.lines() {
            println!("  {}", line);
        }
    }
}

fn print_summary(document: &VrmDocument) {
    let meta = &document.meta;
    println!("generator: {}", document.generator().unwrap_or("-"));
    println!("title: {}", meta.title.as_deref().unwrap_or("-"));
    println!("author: {}", meta.author.as_deref().unwrap_or("-"));
    println!("license: {}", meta.license_name.as_deref().unwrap_or("-"));
    println!("accessors: {}", document.decoded_accessors.len());

    println!("meshes: {} ({} primitives)", document.meshes.len(), document.primitive_count());
    for primitive in document.meshes.iter().flatten() {
        let vertices = primitive.position().map_or(0, |p| p.len());
        let morphs = primitive.morph_targets.as_ref().map_or(0, |m| m.len());
        println!(
            "  {}: {} vertices, {} faces, {} morph targets, attributes [{}]",
            primitive.name,
            vertices,
            primitive.num_faces(),
            morphs,
            primitive.attributes.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    }

    println!("nodes: {}", document.nodes.len());
    for origin in document.origin_nodes.values() {
        let name = document.nodes[origin.node].name.as_deref().unwrap_or("-");
        match origin.skin {
            Some(skin) => println!("  {} -> mesh {} (skin {})", name, origin.mesh, skin),
            None => println!("  {} -> mesh {}", name, origin.mesh),
        }
    }

    println!("skins: {}", document.skins.len());
    for skin in &document.skins {
        println!("  skin {}: {} joints", skin.index, skin.joints.len());
    }

    println!("materials: {}", document.materials.len());
    for material in &document.materials {
        println!(
            "  {}: {}",
            material.name.as_deref().unwrap_or("-"),
            material.shader
        );
    }

    if !document.warnings.is_empty() {
        println!("warnings: {}", document.warnings.len());
        for warning in &document.warnings {
            println!("  {}", warning);
        }
    }
}
