use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::pipeline::exporter::ExportFile;

pub fn write_export(file: &ExportFile, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(&file.filename);
    fs::write(&path, &file.bytes)?;
    tracing::info!("export written to {}", path.display());
    Ok(path)
}

pub fn write_exports(files: &[ExportFile], dir: &Path) -> Result<Vec<PathBuf>> {
    files.iter().map(|f| write_export(f, dir)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_into_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports").join("today");
        let file = ExportFile {
            filename: "DETAILED_LOG_919123456789.csv".into(),
            content_type: "text/csv;charset=utf-8",
            bytes: b"TARGET IDENTIFIER,+91 91234 56789".to_vec(),
        };
        let path = write_export(&file, &out).unwrap();
        assert_eq!(path, out.join("DETAILED_LOG_919123456789.csv"));
        assert_eq!(fs::read(&path).unwrap(), file.bytes);
    }
}
