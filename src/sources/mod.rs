//! Readers that pull free-text license mentions out of build metadata.

pub mod manifest;
pub mod pom;

use std::path::Path;

use crate::error::{Error, Result};
use crate::license::expression::FreeText;
use crate::models::InputSource;

/// Recognize a supported input file by its name.
pub fn detect(path: &Path) -> Option<InputSource> {
    let name = path.file_name()?.to_str()?;
    if name == "pom.xml" || name.ends_with(".pom") {
        return Some(InputSource::Pom);
    }
    if name.eq_ignore_ascii_case("MANIFEST.MF") {
        return Some(InputSource::Manifest);
    }
    None
}

/// Read `path` and extract every license it declares.
pub fn read_licenses(path: &Path) -> Result<(InputSource, Vec<FreeText>)> {
    let source = detect(path).ok_or_else(|| Error::UnsupportedInput(path.to_path_buf()))?;
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let licenses = match source {
        InputSource::Pom => pom::extract_licenses(&content)?,
        InputSource::Manifest => manifest::bundle_licenses(&content),
        InputSource::Expression => Vec::new(),
    };
    Ok((source, licenses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_by_file_name() {
        assert_eq!(detect(Path::new("project/pom.xml")), Some(InputSource::Pom));
        assert_eq!(
            detect(Path::new("lib/foo-1.0.pom")),
            Some(InputSource::Pom)
        );
        assert_eq!(
            detect(Path::new("META-INF/MANIFEST.MF")),
            Some(InputSource::Manifest)
        );
        assert_eq!(detect(Path::new("Cargo.toml")), None);
    }

    #[test]
    fn test_read_pom_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pom.xml");
        std::fs::write(
            &path,
            "<project><licenses><license><name>MIT</name></license></licenses></project>",
        )
        .unwrap();
        let (source, licenses) = read_licenses(&path).unwrap();
        assert_eq!(source, InputSource::Pom);
        assert_eq!(licenses, vec![FreeText::new("MIT")]);
    }

    #[test]
    fn test_read_manifest_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MANIFEST.MF");
        std::fs::write(&path, "Manifest-Version: 1.0\nBundle-License: EPL-2.0\n").unwrap();
        let (source, licenses) = read_licenses(&path).unwrap();
        assert_eq!(source, InputSource::Manifest);
        assert_eq!(licenses, vec![FreeText::new("EPL-2.0")]);
    }

    #[test]
    fn test_unsupported_and_missing_files() {
        assert!(matches!(
            read_licenses(Path::new("notes.txt")),
            Err(Error::UnsupportedInput(_))
        ));
        let missing = PathBuf::from("/nonexistent/dir/pom.xml");
        assert!(matches!(read_licenses(&missing), Err(Error::Io { .. })));
    }
}
