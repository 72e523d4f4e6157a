//! tox configuration emitter
//!
//! Copies a template `tox.ini`, replaces its `envlist` with the generated
//! environments and appends one `[testenv:...]` section per sampled version.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::matrix::SampledMatrix;
use crate::matrix::error::EmitError;
use crate::version::key::compare;

/// No-op environment listed last so that tox never runs with an empty envlist
pub const EMPTY_ENVIRONMENT: &str = "empty";

/// tox key overriding the packages installed into a conda environment
const DEPS_OVERRIDE_KEY: &str = "conda_deps";

/// Name of the environment testing `version` of `family` through `driver`
///
/// e.g. ("r", "3.5.0", "conda") -> "r350-conda-cicd"
pub fn environment_name(family: &str, version: &str, driver: &str) -> String {
    format!("{}{}-{}-cicd", family, version.replace('.', ""), driver)
}

/// Iterate (family, version) pairs in output order: families by name, versions oldest first
fn ordered_entries(matrix: &SampledMatrix) -> Vec<(&str, Vec<&str>)> {
    matrix
        .iter()
        .filter(|(_, versions)| !versions.is_empty())
        .map(|(family, versions)| {
            let mut versions: Vec<&str> = versions.iter().map(String::as_str).collect();
            versions.sort_by(|a, b| compare(a, b));
            versions.dedup();
            (family.as_str(), versions)
        })
        .collect()
}

/// Render the configuration for one driver from the template text
pub fn render(template: &str, matrix: &SampledMatrix, driver: &str) -> String {
    let entries = ordered_entries(matrix);
    let mut out = String::with_capacity(template.len() + 512);

    let mut lines = template.split_inclusive('\n').peekable();
    while let Some(line) = lines.next() {
        if !line.starts_with("envlist") {
            out.push_str(line);
            continue;
        }

        out.push_str("envlist =\n");
        for (family, versions) in &entries {
            for version in versions {
                out.push_str(&format!(
                    "    {}\n",
                    environment_name(family, version, driver)
                ));
            }
        }
        out.push_str(&format!("    {}\n", EMPTY_ENVIRONMENT));

        // Drop the continuation lines of the original envlist
        while lines
            .next_if(|next| next.starts_with([' ', '\t']))
            .is_some()
        {}
    }

    for line in generated_sections(&entries, driver) {
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn generated_sections(entries: &[(&str, Vec<&str>)], driver: &str) -> Vec<String> {
    let mut out: Vec<String> = [
        "",
        "#",
        "# BEGIN GENERATED ENVIRONMENTS",
        "#",
        "",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    out.extend([
        format!("[testenv:{}]", EMPTY_ENVIRONMENT),
        "commands =".to_string(),
        "deps =".to_string(),
        format!("{} =", DEPS_OVERRIDE_KEY),
        String::new(),
    ]);

    for (family, versions) in entries {
        out.extend([
            "#".to_string(),
            format!("# {}-base", family),
            "#".to_string(),
            String::new(),
        ]);

        for version in versions {
            out.extend([
                format!("# {}-base {}", family, version),
                format!("[testenv:{}]", environment_name(family, version, driver)),
                format!("commands = {{[testenv:{}]commands}}", driver),
                format!("{} =", DEPS_OVERRIDE_KEY),
                format!("    {}-base=={}", family, version),
                format!("    {{[testenv]{}}}", DEPS_OVERRIDE_KEY),
                String::new(),
            ]);
        }
    }

    out
}

/// Path of the configuration generated for `driver`
///
/// `path/to/tox.ini` becomes `path/to/tox-conda.ini`, or `root/tox-conda.ini`
/// when an output root is given.
pub fn output_path(template_path: &Path, root: Option<&Path>, driver: &str) -> PathBuf {
    let stem = template_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tox".to_string());
    let file_name = format!("{}-{}.ini", stem, driver);

    match root {
        Some(root) => root.join(file_name),
        None => template_path.with_file_name(file_name),
    }
}

/// Write the configuration for one driver next to the template (or into `root`)
///
/// # Returns
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(EmitError)` - If the template is missing or a file operation fails
pub fn emit(
    template_path: &Path,
    matrix: &SampledMatrix,
    driver: &str,
    root: Option<&Path>,
) -> Result<PathBuf, EmitError> {
    let template = fs::read_to_string(template_path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            EmitError::TemplateNotFound(template_path.to_path_buf())
        } else {
            EmitError::Io {
                path: template_path.to_path_buf(),
                source,
            }
        }
    })?;

    let out_path = output_path(template_path, root, driver);
    fs::write(&out_path, render(&template, matrix, driver)).map_err(|source| EmitError::Io {
        path: out_path.clone(),
        source,
    })?;

    info!("Wrote {}", out_path.display());
    Ok(out_path)
}
