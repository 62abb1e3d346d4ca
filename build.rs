use anyhow::{Context, Result};
use chrono::TimeZone;
use std::env;
use std::fs;
use std::process::Command;
use vergen_gitcl::{Emitter, GitclBuilder};

const LIB_NAME: &str = "dolby-dsi";
const LIB_MANIFEST: &str = "dolby-dsi/Cargo.toml";

fn main() -> Result<()> {
    // Generate git information
    let gitcl = GitclBuilder::default()
        .describe(true, true, Some("[0-9]*"))
        .build()?;

    let gitcl_res = Emitter::default()
        .idempotent()
        .fail_on_error()
        .add_instructions(&gitcl)
        .and_then(|emitter| emitter.emit());

    if let Err(e) = gitcl_res {
        eprintln!("error occurred while generating instructions: {e:?}");
        Emitter::default().idempotent().fail_on_error().emit()?;
        println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
    }

    // Add build timestamp
    let now = match env::var("SOURCE_DATE_EPOCH") {
        Ok(val) => {
            let secs = val
                .parse::<i64>()
                .with_context(|| format!("SOURCE_DATE_EPOCH is not an integer: {val}"))?;
            chrono::Utc
                .timestamp_opt(secs, 0)
                .single()
                .with_context(|| format!("SOURCE_DATE_EPOCH is out of range: {secs}"))?
        }
        Err(_) => chrono::Utc::now(),
    };

    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );

    // Get library version using cargo metadata
    let lib_version = lib_version_from_metadata().unwrap_or_else(|_| {
        read_lib_version_fallback().unwrap_or_else(|_| "unknown".to_string())
    });
    println!("cargo:rustc-env=DSI_VERSION={lib_version}");

    println!("cargo:rerun-if-changed={LIB_MANIFEST}");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    Ok(())
}

/// Get the library version using cargo metadata (works with published and local dependencies)
fn lib_version_from_metadata() -> Result<String> {
    let output = Command::new("cargo")
        .args(["metadata", "--format-version", "1"])
        .output()?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed");
    }

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    // Workspace members first (local development)
    if let Some(packages) = metadata["packages"].as_array() {
        let version = packages
            .iter()
            .filter(|package| package["name"].as_str() == Some(LIB_NAME))
            .find_map(|package| package["version"].as_str());
        if let Some(version) = version {
            return Ok(version.to_string());
        }
    }

    // Dependency graph, "dolby-dsi 0.1.0 (registry+...)"
    if let Some(nodes) = metadata["resolve"]["nodes"].as_array() {
        let prefix = format!("{LIB_NAME} ");
        let version = nodes
            .iter()
            .filter_map(|node| node["id"].as_str()?.strip_prefix(prefix.as_str()))
            .find_map(|rest| rest.split(' ').next());
        if let Some(version) = version {
            return Ok(version.to_string());
        }
    }

    anyhow::bail!("{LIB_NAME} package not found in metadata");
}

/// Fallback: manually parse the library Cargo.toml
fn read_lib_version_fallback() -> Result<String> {
    let toml_content = fs::read_to_string(LIB_MANIFEST)?;

    for line in toml_content.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("version") {
            if let Some(version_part) = value.trim_start().strip_prefix('=') {
                let version = version_part.trim().trim_matches('"').trim_matches('\'');
                return Ok(version.to_string());
            }
        }
    }

    anyhow::bail!("Could not find version in {LIB_MANIFEST}");
}
