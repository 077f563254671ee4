//! Level files on disk: listing and naming `N.json` maps.

use std::fs;
use std::path::Path;

use crate::level_file::LevelError;

fn map_number(file_name: &str) -> Option<u64> {
    file_name.split('.').next()?.parse().ok()
}

fn io_err(dir: &Path) -> impl FnOnce(std::io::Error) -> LevelError + '_ {
    move |source| LevelError::Io {
        path: dir.to_path_buf(),
        source,
    }
}

/// `.json` file names in `dir`, sorted by numeric stem with non-numeric names
/// last (alphabetically). Creates `dir` if it does not exist.
pub fn list_maps(dir: impl AsRef<Path>) -> Result<Vec<String>, LevelError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(io_err(dir))?;

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let entry = entry.map_err(io_err(dir))?;
        if !entry.file_type().map_err(io_err(dir))?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && name.ends_with(".json")
        {
            names.push(name.to_string());
        }
    }
    names.sort_by(|a, b| {
        let key = |n: &String| (map_number(n).is_none(), map_number(n), n.clone());
        key(a).cmp(&key(b))
    });
    Ok(names)
}

/// Smallest `N.json` not present in `dir`.
pub fn next_map_filename(dir: impl AsRef<Path>) -> Result<String, LevelError> {
    let taken: Vec<u64> = list_maps(dir)?
        .iter()
        .filter(|n| n.strip_suffix(".json").is_some_and(|stem| stem.parse::<u64>().is_ok()))
        .filter_map(|n| map_number(n))
        .collect();
    let next = (0..).find(|n| !taken.contains(n)).unwrap_or_default();
    Ok(format!("{next}.json"))
}
