use crate::constants::SUPPORTED_IMAGE_EXTENSIONS;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A candidate image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    /// Size in bytes when the file was resolved.
    pub size: u64,
}

impl ImageFile {
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// What the caller asked to compress.
#[derive(Debug, Clone, Default)]
pub struct ResolverInput {
    pub args: Vec<String>,
    pub recursive: bool,
}

impl ResolverInput {
    pub fn new(args: Vec<String>, recursive: bool) -> Self {
        Self { args, recursive }
    }

    /// Explicit file list, as used when retrying a previous run.
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        Self {
            args: paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            recursive: false,
        }
    }

    /// Directory the caller targets, if the arguments name exactly one.
    ///
    /// No arguments (or `.`) target the current directory.
    pub fn target_directory(&self) -> Option<PathBuf> {
        match self.args.as_slice() {
            [] => Some(PathBuf::from(".")),
            [only] if is_current_dir_arg(only) => Some(PathBuf::from(".")),
            [only] if Path::new(only).is_dir() => Some(PathBuf::from(only)),
            _ => None,
        }
    }

    /// No arguments, `.` or `./`.
    pub fn targets_current_dir(&self) -> bool {
        match self.args.as_slice() {
            [] => true,
            [only] => is_current_dir_arg(only),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub files: Vec<ImageFile>,
    /// Explicitly named images that do not exist.
    pub missing: Vec<PathBuf>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Turns command-line arguments into the ordered, de-duplicated list of
/// images to compress.
///
/// Entries that cannot be read while listing a directory are warned about
/// and skipped; resolution itself never fails.
///
/// # Arguments
/// * `input` - Paths given by the caller and the recursive flag
///
/// # Returns
/// Matching files plus the explicitly named files that were missing
pub fn resolve(input: &ResolverInput) -> Resolution {
    let mut resolution = match input.target_directory() {
        Some(dir) => Resolution {
            // the current directory is only ever listed one level deep
            files: collect_directory(&dir, input.recursive && !input.targets_current_dir()),
            missing: Vec::new(),
        },
        _ => collect_explicit(&input.args),
    };

    for missing in &resolution.missing {
        crate::warn!("{} does not exist!", missing.display());
    }

    dedup_preserving_order(&mut resolution.files);
    resolution
}

fn is_current_dir_arg(arg: &str) -> bool {
    arg == "." || arg == "./"
}

/// Hidden directories and hidden entries below the top level are pruned.
fn is_listed(entry: &DirEntry) -> bool {
    match entry.depth() {
        0 => true,
        1 if !entry.file_type().is_dir() => true,
        _ => !entry.file_name().to_string_lossy().starts_with('.'),
    }
}

fn collect_directory(dir: &Path, recursive: bool) -> Vec<ImageFile> {
    let walker = if recursive {
        WalkDir::new(dir).min_depth(1)
    } else {
        WalkDir::new(dir).min_depth(1).max_depth(1)
    };

    let mut image_files = Vec::new();
    for entry in walker
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_listed)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                crate::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_image_file(entry.path()) {
            continue;
        }
        match entry.metadata() {
            Ok(metadata) => {
                image_files.push(ImageFile::new(normalize(entry.path()), metadata.len()))
            }
            Err(e) => crate::warn!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    image_files
}

fn collect_explicit(args: &[String]) -> Resolution {
    let mut resolution = Resolution::default();

    for arg in args {
        let path = normalize(Path::new(arg));
        if !is_image_file(&path) {
            continue;
        }
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {
                resolution.files.push(ImageFile::new(path, metadata.len()));
            }
            // a directory that happens to be called `x.jpg`
            Ok(_) => {}
            Err(_) => resolution.missing.push(path),
        }
    }

    resolution
}

/// Drops `.` components so that `./a.jpg` and `a.jpg` compare equal.
fn normalize(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

fn dedup_preserving_order(files: &mut Vec<ImageFile>) {
    let mut seen = HashSet::new();
    files.retain(|f| seen.insert(f.path.clone()));
}

/// Check if a file path carries one of the supported image extensions
/// (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}
