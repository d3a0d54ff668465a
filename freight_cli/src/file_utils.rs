use std::path::{Path, PathBuf};

/// Collects the `.json` files below `folder_path`, recursively, sorted by path.
pub fn read_problem_folder(folder_path: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder_path)? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(read_problem_folder(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}

/// A single file is used as is, a folder is expanded to its problem files.
pub fn resolve_inputs(input: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    if input.is_file() {
        Ok(vec![input.to_path_buf()])
    } else {
        read_problem_folder(input)
    }
}
