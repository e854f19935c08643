//! §4.7/§6 (C9): zips the rendered `<output>/<project>/` tree into
//! `<project>.zip` (DEFLATE).

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub fn package_project(project_dir: &Path, zip_path: &Path) -> io::Result<()> {
    let root = project_dir.parent().unwrap_or(project_dir);
    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut stack = vec![project_dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let rel = path.strip_prefix(root).unwrap_or(&path).to_string_lossy().replace('\\', "/");
            if path.is_dir() {
                zip.add_directory(rel, options).map_err(zip_err)?;
                stack.push(path);
            } else {
                zip.start_file(rel, options).map_err(zip_err)?;
                zip.write_all(&fs::read(&path)?)?;
            }
        }
    }

    zip.finish().map_err(zip_err)?;
    Ok(())
}

fn zip_err(e: zip::result::ZipError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}
