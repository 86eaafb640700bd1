//! Output path preparation and size verification

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::model::OutputSize;
use crate::error::SizeFitResult;
use crate::planner::SizeTarget;

/// Make `output` absolute against `base_dir` and create its parent directory.
///
/// The report carries the absolute path, whatever form the user typed.
pub fn prepare_output_path(output: &Path, base_dir: &Path) -> SizeFitResult<PathBuf> {
    let resolved = if output.is_absolute() {
        output.to_path_buf()
    } else {
        base_dir.join(output)
    };

    if let Some(parent) = resolved.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!(dir = %parent.display(), "Creating output directory");
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(resolved)
}

/// File size in kilobytes, rounded to two decimals
pub fn file_size_kb(path: &Path) -> SizeFitResult<f64> {
    let bytes = std::fs::metadata(path)?.len() as f64;
    Ok((bytes / 1024.0 * 100.0).round() / 100.0)
}

/// Measure the finished artifact and compare it with the requested size
pub fn measure_output(path: &Path, target: Option<SizeTarget>) -> SizeFitResult<OutputSize> {
    let kilobytes = file_size_kb(path)?;
    let within_budget = target.map(|t| kilobytes <= t.kilobytes());

    if within_budget == Some(false) {
        warn!(
            output = %path.display(),
            kilobytes,
            "Output is larger than the requested size"
        );
    }

    Ok(OutputSize {
        kilobytes,
        within_budget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_pinned_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = prepare_output_path(Path::new("clips/out.webm"), dir.path()).unwrap();
        assert_eq!(resolved, dir.path().join("clips/out.webm"));
        assert!(dir.path().join("clips").is_dir());
    }

    #[test]
    fn absolute_paths_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("out.webm");
        let resolved = prepare_output_path(&absolute, Path::new("/elsewhere")).unwrap();
        assert_eq!(resolved, absolute);
    }

    #[test]
    fn size_is_rounded_to_two_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, vec![0u8; 1500]).unwrap();
        // 1500 / 1024 = 1.46484...
        assert_eq!(file_size_kb(&path).unwrap(), 1.46);
    }

    #[test]
    fn budget_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let tight = SizeTarget::new(0.001).unwrap();
        assert_eq!(measure_output(&path, Some(tight)).unwrap().within_budget, Some(false));

        let roomy = SizeTarget::new(1.0).unwrap();
        let size = measure_output(&path, Some(roomy)).unwrap();
        assert_eq!(size.kilobytes, 2.0);
        assert_eq!(size.within_budget, Some(true));

        assert_eq!(measure_output(&path, None).unwrap().within_budget, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(file_size_kb(Path::new("/no/such/file.webm")).is_err());
    }
}
