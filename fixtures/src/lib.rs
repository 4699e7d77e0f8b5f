//! Golden-file discovery: every `<name>.txt` under a root with a sibling
//! `<name>.out` is one case.

use std::path::{Path, PathBuf};
use std::{fs, io};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    /// Path of the input relative to the root, without extension.
    pub name: String,
    pub input: PathBuf,
    pub expected: PathBuf,
}

/// All cases below `root`, sorted by name. Inputs without an `.out` file
/// are skipped.
pub fn cases<P: AsRef<Path>>(root: P) -> io::Result<Vec<Case>> {
    let root = root.as_ref();
    let mut inputs = Vec::new();
    walk(root, "txt", &mut inputs)?;

    let mut found: Vec<Case> = inputs
        .into_iter()
        .filter_map(|input| {
            let expected = input.with_extension("out");
            if !expected.is_file() {
                return None;
            }
            let name = input
                .strip_prefix(root)
                .unwrap_or(&input)
                .with_extension("")
                .display()
                .to_string();
            Some(Case {
                name,
                input,
                expected,
            })
        })
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

/// Expected output as bytes; keys need not be UTF-8.
pub fn read_expected(case: &Case) -> io::Result<Vec<u8>> {
    fs::read(&case.expected)
}

fn walk(dir: &Path, ext: &str, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, ext, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            out.push(path);
        }
    }
    Ok(())
}
