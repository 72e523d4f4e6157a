//! `cicd tox-ini`: generate tox configurations for the supported runtimes

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cicd_tools::config::{DEFAULT_FAMILIES, Platform};
use cicd_tools::matrix::emitter::emit;
use cicd_tools::matrix::error::EmitError;
use cicd_tools::matrix::resolver::MatrixResolver;
use cicd_tools::matrix::sampler::sample;
use cicd_tools::matrix::SampledMatrix;
use cicd_tools::version::registries::CondaIndex;
use cicd_tools::version::registry::PackageIndex;
use rand::Rng;
use tracing::info;

/// Versions per family, before and after sampling
pub struct Matrix {
    pub available: SampledMatrix,
    pub sampled: SampledMatrix,
}

/// Resolve and sample every family
pub fn build_matrix<I: PackageIndex, R: Rng + ?Sized>(
    resolver: &MatrixResolver<I>,
    platform: Platform,
    families: &[&str],
    rng: &mut R,
) -> Result<Matrix> {
    let mut available = BTreeMap::new();
    let mut sampled = BTreeMap::new();

    for family in families {
        let versions = resolver
            .resolve(platform, family)
            .with_context(|| format!("failed to resolve {}-base versions", family))?;
        info!("{} supported {}-base versions", versions.len(), family);

        sampled.insert(family.to_string(), sample(&versions, rng));
        available.insert(family.to_string(), versions);
    }

    Ok(Matrix { available, sampled })
}

/// Format a version listing the way the CI logs show it
pub fn format_listing(title: &str, matrix: &SampledMatrix) -> String {
    let mut out = format!("> {}:\n", title);
    for (family, versions) in matrix.iter().filter(|(_, v)| !v.is_empty()) {
        let _ = writeln!(out, "  + {}-base", family);
        for version in versions {
            let _ = writeln!(out, "    {}", version);
        }
    }
    out
}

/// Run the command and return the generated files
pub fn run(
    template: &Path,
    platform: Option<Platform>,
    root: Option<&Path>,
    drivers: &[String],
    conda: &str,
) -> Result<Vec<PathBuf>> {
    if !template.is_file() {
        return Err(EmitError::TemplateNotFound(template.to_path_buf()).into());
    }

    let Some(platform) = platform.or_else(Platform::detect) else {
        bail!("could not detect the host platform; pass --platform");
    };

    let resolver = MatrixResolver::new(CondaIndex::new(conda));
    let matrix = build_matrix(&resolver, platform, &DEFAULT_FAMILIES, &mut rand::rng())?;

    print!(
        "{}",
        format_listing(&format!("Available versions for {}", platform), &matrix.available)
    );
    println!();
    print!(
        "{}",
        format_listing(
            "Subset of versions used for test environments",
            &matrix.sampled
        )
    );

    drivers
        .iter()
        .map(|driver| {
            emit(template, &matrix.sampled, driver, root)
                .with_context(|| format!("failed to generate configuration for {}", driver))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cicd_tools::version::error::IndexError;
    use cicd_tools::version::types::PackageRecord;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Index answering from a fixed table
    struct TableIndex(Vec<(&'static str, Vec<PackageRecord>)>);

    impl PackageIndex for TableIndex {
        fn search(
            &self,
            _platform: Platform,
            package: &str,
        ) -> Result<Vec<PackageRecord>, IndexError> {
            Ok(self
                .0
                .iter()
                .find(|(name, _)| *name == package)
                .map(|(_, records)| records.clone())
                .unwrap_or_default())
        }
    }

    fn record(version: &str, depends: &[&str]) -> PackageRecord {
        PackageRecord::new(version, depends.iter().map(|d| d.to_string()).collect())
    }

    #[test]
    fn build_matrix_resolves_and_samples_each_family() {
        let unconstrained = vec![record("1.0", &["r-base >=3.0", "mro-base"])];
        let index = TableIndex(vec![
            (
                "r::r-base",
                vec![
                    record("3.4.2", &[]),
                    record("3.5.0", &[]),
                    record("3.6.1", &[]),
                    record("4.0.2", &[]),
                ],
            ),
            ("r::mro-base", vec![record("3.4.3", &[]), record("3.5.1", &[])]),
            ("r::r-httr", unconstrained.clone()),
            ("r::r-jsonlite", unconstrained.clone()),
            ("r::r-testthat", unconstrained),
        ]);
        let resolver = MatrixResolver::new(index);
        let mut rng = StdRng::seed_from_u64(7);

        let matrix = build_matrix(&resolver, Platform::Linux64, &["r", "mro"], &mut rng).unwrap();

        assert_eq!(matrix.available["r"], vec!["3.5.0", "3.6.1", "4.0.2"]);
        assert_eq!(matrix.sampled["r"], vec!["3.5.0", "3.6.1", "4.0.2"]);
        assert_eq!(matrix.available["mro"], vec!["3.4.3"]);
        assert_eq!(matrix.sampled["mro"], vec!["3.4.3"]);
    }

    #[test]
    fn format_listing_skips_empty_families() {
        let mut matrix = SampledMatrix::new();
        matrix.insert("mro".to_string(), vec![]);
        matrix.insert("r".to_string(), vec!["3.5.0".to_string(), "4.0.2".to_string()]);

        assert_eq!(
            format_listing("Available versions for linux-64", &matrix),
            "> Available versions for linux-64:\n  + r-base\n    3.5.0\n    4.0.2\n"
        );
    }

    #[test]
    fn run_fails_for_missing_template() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let template = temp_dir.path().join("tox.ini");

        let err = run(&template, Some(Platform::Linux64), None, &[], "conda").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EmitError>(),
            Some(EmitError::TemplateNotFound(_))
        ));
    }
}
