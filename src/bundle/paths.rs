//! Media path resolution
//!
//! Copies the files referenced by a path column into the bundle and rewrites
//! the column to bundle-relative targets:
//!
//! ```text
//! /scans/run3/plate7/p0.png   (levels = 1)  ->  data/plate7/p0.png
//! /scans/run4/plate7/p0.png   (levels = 1)  ->  data/plate7/p0_1.png
//! ```
//!
//! The `used` set is the only thing standing between two sources and one
//! target: a target is claimed before anything is written to it, and a
//! claimed target gets a `_<n>` suffix (monotonic, never reused) instead of
//! being overwritten.
//!
//! Missing or unreadable sources are warnings. The value is left as it was
//! and flagged so the page shows a placeholder. Failing to write into the
//! bundle is an error.

use super::DATA_DIR;
use crate::error::{BuildError, Result, Warning, Warnings};
use crate::table::{Column, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

/// One file copied into the bundle
#[derive(Debug, Clone, Copy)]
pub struct CopyEvent<'a> {
    pub source: &'a Path,
    pub target: &'a Path,
    pub bytes: u64,
}

/// A path column after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub column: Column,
    /// Per row: no usable file behind the value
    pub missing: Vec<bool>,
}

#[derive(Debug, Clone)]
enum Resolution {
    /// Bundle-relative target, `/`-separated
    Target(String),
    /// Keep the original value, file not usable
    Missing,
    /// Keep the original value (copying disabled)
    Unchanged,
}

/// Stateful resolver shared by every media column of one bundle
#[derive(Debug)]
pub struct PathResolver {
    output_dir: PathBuf,
    levels: usize,
    copy: bool,
    used: BTreeSet<PathBuf>,
    resolved: BTreeMap<String, Resolution>,
    next_suffix: usize,
    copied: usize,
}

impl PathResolver {
    pub fn new(output_dir: impl Into<PathBuf>, levels: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            levels,
            copy: true,
            used: BTreeSet::new(),
            resolved: BTreeMap::new(),
            next_suffix: 1,
            copied: 0,
        }
    }

    /// With copying off, values are kept and only checked for existence
    pub fn with_copy(mut self, copy: bool) -> Self {
        self.copy = copy;
        self
    }

    /// Start from targets already claimed by an earlier stage
    pub fn with_used_paths(mut self, used: BTreeSet<PathBuf>) -> Self {
        self.used = used;
        self
    }

    /// Bundle-relative targets claimed so far
    pub fn used_paths(&self) -> &BTreeSet<PathBuf> {
        &self.used
    }

    pub fn into_used_paths(self) -> BTreeSet<PathBuf> {
        self.used
    }

    /// Number of files actually copied
    pub fn copied(&self) -> usize {
        self.copied
    }

    /// Resolve every distinct value of `column`, first occurrence first.
    /// A value seen before (in this or an earlier column) reuses its target.
    pub fn resolve(
        &mut self,
        column: &Column,
        warnings: &mut Warnings,
        observer: &mut dyn FnMut(&CopyEvent),
    ) -> Result<ResolvedColumn> {
        let mut values = Vec::with_capacity(column.len());
        let mut missing = Vec::with_capacity(column.len());

        for value in &column.values {
            let raw = match value {
                Value::Null => {
                    values.push(Value::Null);
                    missing.push(true);
                    continue;
                }
                other => other.display(None),
            };
            if raw.trim().is_empty() {
                values.push(value.clone());
                missing.push(true);
                continue;
            }

            let resolution = match self.resolved.get(&raw) {
                Some(known) => known.clone(),
                None => {
                    let fresh = self.resolve_one(&raw, warnings, observer)?;
                    self.resolved.insert(raw.clone(), fresh.clone());
                    fresh
                }
            };
            match resolution {
                Resolution::Target(target) => {
                    values.push(Value::Text(target));
                    missing.push(false);
                }
                Resolution::Missing => {
                    values.push(Value::Text(raw));
                    missing.push(true);
                }
                Resolution::Unchanged => {
                    values.push(Value::Text(raw));
                    missing.push(false);
                }
            }
        }

        let resolved = Column {
            name: column.name.clone(),
            kind: column.kind,
            values,
        }
        .into_path();
        Ok(ResolvedColumn {
            column: resolved,
            missing,
        })
    }

    fn resolve_one(
        &mut self,
        raw: &str,
        warnings: &mut Warnings,
        observer: &mut dyn FnMut(&CopyEvent),
    ) -> Result<Resolution> {
        let source = PathBuf::from(raw);
        if !source.exists() {
            warnings.push(Warning::MissingMedia(source));
            return Ok(Resolution::Missing);
        }
        if let Err(err) = File::open(&source).and_then(|f| f.metadata()) {
            warnings.push(Warning::UnreadableMedia {
                path: source,
                reason: err.to_string(),
            });
            return Ok(Resolution::Missing);
        }
        if !source.is_file() {
            warnings.push(Warning::UnreadableMedia {
                path: source,
                reason: "not a regular file".to_string(),
            });
            return Ok(Resolution::Missing);
        }
        if !self.copy {
            return Ok(Resolution::Unchanged);
        }

        let target = self.claim_target(&source, warnings);
        let destination = self.output_dir.join(&target);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }

        if same_file(&source, &destination) {
            tracing::debug!(path = %source.display(), "already in the bundle, not copied");
        } else {
            let bytes = fs::copy(&source, &destination).map_err(|e| BuildError::io(&destination, e))?;
            tracing::debug!(
                source = %source.display(),
                target = %destination.display(),
                bytes,
                "copied media"
            );
            self.copied += 1;
            observer(&CopyEvent {
                source: &source,
                target: &destination,
                bytes,
            });
        }

        Ok(Resolution::Target(to_url_path(&target)))
    }

    /// Pick and claim the bundle-relative target for `source`
    fn claim_target(&mut self, source: &Path, warnings: &mut Warnings) -> PathBuf {
        let dir = Path::new(DATA_DIR).join(preserved_subpath(source, self.levels));
        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut target = dir.join(&filename);
        if self.used.contains(&target) {
            let (stem, ext) = split_extension(&filename);
            loop {
                let renamed = format!("{}_{}{}", stem, self.next_suffix, ext);
                self.next_suffix += 1;
                let candidate = dir.join(&renamed);
                if !self.used.contains(&candidate) {
                    warnings.push(Warning::DuplicateTarget {
                        filename: filename.clone(),
                        renamed_to: renamed,
                    });
                    target = candidate;
                    break;
                }
            }
        }
        self.used.insert(target.clone());
        target
    }
}

/// Functional form of [`PathResolver::resolve`]: one column, explicit used set.
pub fn resolve_column(
    column: &Column,
    output_dir: &Path,
    used: BTreeSet<PathBuf>,
    levels: usize,
    warnings: &mut Warnings,
) -> Result<(Column, BTreeSet<PathBuf>)> {
    let mut resolver = PathResolver::new(output_dir, levels).with_used_paths(used);
    let resolved = resolver.resolve(column, warnings, &mut |_| {})?;
    Ok((resolved.column, resolver.into_used_paths()))
}

/// The `levels` directories nearest the file, outer to inner. Root, prefix
/// and `..` components are never part of it.
pub fn preserved_subpath(source: &Path, levels: usize) -> PathBuf {
    let normalized = normalize(source);
    let dirs: Vec<&std::ffi::OsStr> = normalized
        .parent()
        .map(|p| {
            p.components()
                .filter_map(|c| match c {
                    Component::Normal(name) => Some(name),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    let start = dirs.len().saturating_sub(levels);
    dirs[start..].iter().collect()
}

/// Lexical normalization: drops `.` and folds `name/..`
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        std::env::current_dir()
            .map(|cwd| normalize(&cwd.join(path)))
            .unwrap_or_else(|_| normalize(path))
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    absolute(a) == absolute(b)
}

fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(0) | None => (filename, ""),
        Some(dot) => filename.split_at(dot),
    }
}

fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn path_column(name: &str, paths: &[&Path]) -> Column {
        Column::text(name, paths.iter().map(|p| p.to_string_lossy().into_owned()))
    }

    // ==========================================================================
    // SUBPATHS
    // ==========================================================================

    #[test]
    fn test_preserved_subpath_keeps_nearest_dirs() {
        let p = Path::new("/scans/run3/plate7/p0.png");
        assert_eq!(preserved_subpath(p, 1), PathBuf::from("plate7"));
        assert_eq!(preserved_subpath(p, 2), PathBuf::from("run3/plate7"));
        assert_eq!(preserved_subpath(p, 0), PathBuf::new());
        assert_eq!(preserved_subpath(p, 10), PathBuf::from("scans/run3/plate7"), "root never copied");
        assert_eq!(preserved_subpath(Path::new("p0.png"), 1), PathBuf::new());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("./a/b/../c.png")), PathBuf::from("a/c.png"));
        assert_eq!(normalize(Path::new("../x.png")), PathBuf::from("../x.png"));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("img.png"), ("img", ".png"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("noext"), ("noext", ""));
    }

    // ==========================================================================
    // COPYING
    // ==========================================================================

    #[test]
    fn test_copies_and_rewrites() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let p0 = src.path().join("imgs/p0.png");
        write(&p0, "zero");

        let mut warnings = Warnings::new();
        let mut resolver = PathResolver::new(out.path(), 1);
        let mut events = 0;
        let resolved = resolver
            .resolve(&path_column("path", &[&p0, &p0]), &mut warnings, &mut |_| events += 1)
            .unwrap();

        assert_eq!(resolved.column.values[0], Value::from("data/imgs/p0.png"));
        assert_eq!(resolved.column.values[1], Value::from("data/imgs/p0.png"));
        assert_eq!(resolved.missing, vec![false, false]);
        assert_eq!(events, 1, "repeated value copied once");
        assert_eq!(fs::read_to_string(out.path().join("data/imgs/p0.png")).unwrap(), "zero");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_collision_renames_second_source() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let a = src.path().join("run3/plate/img.png");
        let b = src.path().join("run4/plate/img.png");
        write(&a, "a");
        write(&b, "b");

        let mut warnings = Warnings::new();
        let (column, used) = resolve_column(
            &path_column("path", &[&a, &b]),
            out.path(),
            BTreeSet::new(),
            1,
            &mut warnings,
        )
        .unwrap();

        assert_eq!(column.values[0], Value::from("data/plate/img.png"));
        assert_eq!(column.values[1], Value::from("data/plate/img_1.png"));
        assert!(used.contains(Path::new("data/plate/img.png")));
        assert!(used.contains(Path::new("data/plate/img_1.png")));
        assert_eq!(fs::read_to_string(out.path().join("data/plate/img.png")).unwrap(), "a", "no overwrite");
        assert_eq!(fs::read_to_string(out.path().join("data/plate/img_1.png")).unwrap(), "b");
        assert!(matches!(
            warnings.iter().next(),
            Some(Warning::DuplicateTarget { renamed_to, .. }) if renamed_to == "img_1.png"
        ));
    }

    #[test]
    fn test_suffix_skips_claimed_targets() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let a = src.path().join("x/a/img.png");
        write(&a, "a");

        let mut used = BTreeSet::new();
        used.insert(PathBuf::from("data/a/img.png"));
        used.insert(PathBuf::from("data/a/img_1.png"));

        let mut warnings = Warnings::new();
        let (column, used) =
            resolve_column(&path_column("path", &[&a]), out.path(), used, 1, &mut warnings).unwrap();
        assert_eq!(column.values[0], Value::from("data/a/img_2.png"));
        assert_eq!(used.len(), 3);
    }

    #[test]
    fn test_same_source_across_columns_copied_once() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let p = src.path().join("d/p.png");
        write(&p, "p");

        let mut warnings = Warnings::new();
        let mut resolver = PathResolver::new(out.path(), 1);
        let first = resolver.resolve(&path_column("a", &[&p]), &mut warnings, &mut |_| {}).unwrap();
        let second = resolver.resolve(&path_column("b", &[&p]), &mut warnings, &mut |_| {}).unwrap();

        assert_eq!(first.column.values, second.column.values);
        assert_eq!(resolver.copied(), 1);
        assert_eq!(resolver.used_paths().len(), 1);
    }

    // ==========================================================================
    // DEGRADED INPUT
    // ==========================================================================

    #[test]
    fn test_missing_source_is_flagged_not_fatal() {
        let out = tempdir().unwrap();
        let column = Column::text("path", ["does/not/exist.png"]);

        let mut warnings = Warnings::new();
        let resolved = PathResolver::new(out.path(), 1)
            .resolve(&column, &mut warnings, &mut |_| {})
            .unwrap();

        assert_eq!(resolved.column.values[0], Value::from("does/not/exist.png"), "reference kept");
        assert_eq!(resolved.missing, vec![true]);
        assert_eq!(
            warnings.into_vec(),
            vec![Warning::MissingMedia(PathBuf::from("does/not/exist.png"))]
        );
    }

    #[test]
    fn test_nulls_are_missing() {
        let out = tempdir().unwrap();
        let column = Column {
            name: "path".into(),
            kind: crate::table::ColumnKind::Text,
            values: vec![Value::Null],
        };
        let mut warnings = Warnings::new();
        let resolved = PathResolver::new(out.path(), 1)
            .resolve(&column, &mut warnings, &mut |_| {})
            .unwrap();
        assert_eq!(resolved.missing, vec![true]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_no_copy_keeps_values() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let p = src.path().join("p.png");
        write(&p, "p");

        let mut warnings = Warnings::new();
        let mut resolver = PathResolver::new(out.path(), 1).with_copy(false);
        let resolved = resolver.resolve(&path_column("path", &[&p]), &mut warnings, &mut |_| {}).unwrap();

        assert_eq!(resolved.column.values[0], Value::from(p.to_string_lossy().into_owned()));
        assert!(!out.path().join(DATA_DIR).exists());
    }

    #[test]
    fn test_source_already_in_bundle_is_not_copied() {
        let out = tempdir().unwrap();
        let p = out.path().join("data/imgs/p.png");
        write(&p, "p");

        let mut warnings = Warnings::new();
        let mut resolver = PathResolver::new(out.path(), 1);
        let resolved = resolver.resolve(&path_column("path", &[&p]), &mut warnings, &mut |_| {}).unwrap();

        assert_eq!(resolved.column.values[0], Value::from("data/imgs/p.png"));
        assert_eq!(resolver.copied(), 0);
        assert!(warnings.is_empty(), "re-running in place is silent, got {:?}", warnings);
    }
}
