//! File-level conversion on top of the pure [`convert`](super::convert).
//!
//! Reads an AFNI matrix file, converts it, and writes
//! `<stem><suffix>` into the chosen output directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use volreg2itk::{convert_file, ConvertOptions};
//! use std::path::Path;
//!
//! let converted = convert_file(Path::new("sub-01_bold.aff12.1D"), &ConvertOptions::default())?;
//! println!("{} transforms → {}", converted.transform_count, converted.output.display());
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::{build_document, write_document};
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::config::{ConverterConfig, DEFAULT_SUFFIX};
use crate::error::{PipelineError, PipelineResult};

/// Extensions made of two dot-separated parts, stripped as one.
const COMPOUND_EXTENSIONS: [&str; 3] = [".nii.gz", ".tar.gz", ".niml.dset"];

/// Options for file conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Where to write the output. `None` uses the current directory.
    pub output_dir: Option<PathBuf>,
    /// Suffix replacing the input extension.
    pub suffix: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl From<&ConverterConfig> for ConvertOptions {
    fn from(config: &ConverterConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            suffix: config.suffix.clone(),
        }
    }
}

/// Result of converting one file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub transform_count: usize,
}

/// Strip the extension from a file name, treating compound extensions as one.
pub fn strip_extension(file_name: &str) -> &str {
    for ext in COMPOUND_EXTENSIONS {
        if let Some(stem) = file_name.strip_suffix(ext) {
            if !stem.is_empty() {
                return stem;
            }
        }
    }

    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(pos) => &file_name[..pos],
    }
}

/// Output path for `input`: its stem plus `suffix`, inside `output_dir`.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    output_dir.join(format!("{}{}", strip_extension(&file_name), suffix))
}

/// Replace `output` with `contents` in one step.
///
/// The text goes to a temporary file next to `output` first, so a failed
/// write never leaves a truncated transform file behind.
fn write_atomically(output: &Path, contents: &str) -> PipelineResult<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| PipelineError::io(tmp.path(), e))?;
    tmp.persist(output)
        .map_err(|e| PipelineError::io(output, e.error))?;

    Ok(())
}

/// Convert one file on disk.
///
/// The output is only written once the whole conversion succeeded.
pub fn convert_file(input: &Path, options: &ConvertOptions) -> PipelineResult<ConvertedFile> {
    log_info(format!("📄 Converting: {}", input.display()));

    let text = fs::read_to_string(input).map_err(|e| PipelineError::io(input, e))?;

    let document = build_document(&text)?;
    let rendered = write_document(&document)?;
    log_success(format!("{} transforms parsed", document.len()));

    let output_dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| PipelineError::io(".", e))?,
    };
    let output = output_path_for(input, &output_dir, &options.suffix);
    if output.exists() {
        log_warning(format!("Overwriting {}", output.display()));
    }

    write_atomically(&output, &rendered)?;
    log_success(format!("💾 Written: {}", output.display()));

    Ok(ConvertedFile {
        input: input.to_path_buf(),
        output,
        transform_count: document.len(),
    })
}

/// Convert several independent files concurrently.
///
/// Results come back in input order. A failure only affects its own file.
/// Inputs whose outputs would collide (same stem, shared output directory)
/// all fail with [`PipelineError::DuplicateOutput`] and nothing is written
/// for them.
pub async fn convert_batch(
    inputs: Vec<PathBuf>,
    options: ConvertOptions,
) -> Vec<(PathBuf, PipelineResult<ConvertedFile>)> {
    log_info(format!("🔄 Converting {} files...", inputs.len()));

    // Every input shares one directory, so comparing names relative to it is enough.
    let base = options.output_dir.clone().unwrap_or_default();
    let planned: Vec<PathBuf> = inputs
        .iter()
        .map(|input| output_path_for(input, &base, &options.suffix))
        .collect();

    let mut writers: HashMap<&Path, usize> = HashMap::new();
    for output in &planned {
        *writers.entry(output.as_path()).or_default() += 1;
    }

    let jobs: Vec<_> = inputs
        .into_iter()
        .zip(planned.iter())
        .map(|(input, output)| {
            let shared = writers.get(output.as_path()).copied().unwrap_or(1);
            if shared > 1 {
                let err = PipelineError::DuplicateOutput {
                    output: output.clone(),
                    inputs: shared,
                };
                return (input, Err(err));
            }

            let options = options.clone();
            let path = input.clone();
            let handle = tokio::task::spawn_blocking(move || convert_file(&path, &options));
            (input, Ok(handle))
        })
        .collect();

    let mut results = Vec::with_capacity(jobs.len());
    for (input, job) in jobs {
        let result = match job {
            Ok(handle) => match handle.await {
                Ok(result) => result,
                Err(e) => Err(PipelineError::Task(e.to_string())),
            },
            Err(e) => Err(e),
        };
        if let Err(ref e) = result {
            log_error(format!("{}: {}", input.display(), e));
        }
        results.push((input, result));
    }

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed == 0 {
        log_success(format!("All {} files converted", results.len()));
    } else {
        log_error(format!("{} of {} files failed", failed, results.len()));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;

    const TWO_VOLUMES: &str = "# 3dvolreg\n1 0 0 0 0 1 0 0 0 0 1 0\n1 0 0 0.25 0 1 0 -1 0 0 1 2\n";

    #[test]
    fn test_default_options() {
        let opts = ConvertOptions::default();
        assert_eq!(opts.suffix, "_mc4d_itk.txt");
        assert!(opts.output_dir.is_none());
    }

    #[test]
    fn test_options_from_config() {
        let config = ConverterConfig::default().with_output_dir(Some("/out".into()));
        let opts = ConvertOptions::from(&config);
        assert_eq!(opts.output_dir, Some(PathBuf::from("/out")));
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("motion.1D"), "motion");
        assert_eq!(strip_extension("sub-01_bold.aff12.1D"), "sub-01_bold.aff12");
        assert_eq!(strip_extension("bold.nii.gz"), "bold");
        assert_eq!(strip_extension("surf.niml.dset"), "surf");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }

    #[test]
    fn test_output_path_for() {
        let out = output_path_for(
            Path::new("/data/sub-01/func/mats.aff12.1D"),
            Path::new("/work"),
            "_mc4d_itk.txt",
        );
        assert_eq!(out, PathBuf::from("/work/mats.aff12_mc4d_itk.txt"));
    }

    #[test]
    fn test_convert_file_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("motion.1D");
        fs::write(&input, TWO_VOLUMES).unwrap();

        let options = ConvertOptions {
            output_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let converted = convert_file(&input, &options).unwrap();

        assert_eq!(converted.transform_count, 2);
        assert_eq!(converted.output, dir.path().join("motion_mc4d_itk.txt"));

        let text = fs::read_to_string(&converted.output).unwrap();
        assert!(text.starts_with("#Insight Transform File V1.0\n"));
        assert!(text.contains("#Transform 1\n"));
        assert!(text.contains("Parameters: 1 0 0 0 1 0 0 0 1 0.25 -1 2\n"));
    }

    #[test]
    fn test_malformed_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.1D");
        fs::write(&input, "1 0 0 0 0 1 0 0 0 0 1 0\n1 0 0\n").unwrap();

        let options = ConvertOptions {
            output_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let err = convert_file(&input, &options).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Conversion(ConversionError::MalformedInput { row: 1, .. })
        ));
        assert!(!dir.path().join("broken_mc4d_itk.txt").exists());
    }

    #[test]
    fn test_existing_output_replaced_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("motion.1D");
        let output = dir.path().join("motion_mc4d_itk.txt");
        fs::write(&input, "1 0 0 0 0 1 0 0 0 0 1 0").unwrap();
        fs::write(&output, "stale contents from an earlier run").unwrap();

        let options = ConvertOptions {
            output_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        convert_file(&input, &options).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("#Insight Transform File V1.0\n"));
        assert!(!text.contains("stale"));

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["motion.1D", "motion_mc4d_itk.txt"]);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_file(&dir.path().join("absent.1D"), &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good_a = dir.path().join("a.1D");
        let bad = dir.path().join("b.1D");
        let good_c = dir.path().join("c.1D");
        fs::write(&good_a, TWO_VOLUMES).unwrap();
        fs::write(&bad, "").unwrap();
        fs::write(&good_c, "1 0 0 0 0 1 0 0 0 0 1 0").unwrap();

        let options = ConvertOptions {
            output_dir: Some(dir.path().to_path_buf()),
            suffix: "_itk.txt".to_string(),
        };
        let results = convert_batch(vec![good_a.clone(), bad.clone(), good_c.clone()], options).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, good_a);
        assert_eq!(results[1].0, bad);
        assert_eq!(results[2].0, good_c);

        assert_eq!(results[0].1.as_ref().unwrap().transform_count, 2);
        assert!(matches!(
            results[1].1,
            Err(PipelineError::Conversion(ConversionError::EmptyInput))
        ));
        assert_eq!(results[2].1.as_ref().unwrap().transform_count, 1);
        assert!(dir.path().join("c_itk.txt").exists());
    }

    #[tokio::test]
    async fn test_batch_rejects_colliding_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::create_dir_all(&out).unwrap();

        let first = dir.path().join("a").join("m.1D");
        let second = dir.path().join("b").join("m.1D");
        let other = dir.path().join("a").join("n.1D");
        fs::write(&first, "1 0 0 0 0 1 0 0 0 0 1 0").unwrap();
        fs::write(&second, TWO_VOLUMES).unwrap();
        fs::write(&other, TWO_VOLUMES).unwrap();

        let options = ConvertOptions {
            output_dir: Some(out.clone()),
            ..Default::default()
        };
        let results = convert_batch(vec![first, second, other], options).await;

        for (_, result) in &results[..2] {
            match result {
                Err(PipelineError::DuplicateOutput { output, inputs }) => {
                    assert_eq!(output, &out.join("m_mc4d_itk.txt"));
                    assert_eq!(*inputs, 2);
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
        assert_eq!(results[2].1.as_ref().unwrap().transform_count, 2);

        assert!(!out.join("m_mc4d_itk.txt").exists());
        assert!(out.join("n_mc4d_itk.txt").exists());
    }
}
