//! Migration scripts loaded from disk.
//!
//! A [`Migration`] is an immutable snapshot of one script: where it came
//! from, what it contains and the SHA-256 of that content. The checksum is
//! computed by the constructors and never supplied by callers, so it always
//! describes `content`.

use crate::checksum::Checksum;
use crate::error::{CoreError, CoreResult};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// File patterns searched for migrations when none are configured.
pub const DEFAULT_PATTERNS: &[&str] = &["*.sql", "*.cql", "*.rs"];

/// How a migration is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigrationFormat {
    /// Statement text, split and executed one statement at a time
    Declarative,
    /// Entry point compiled into the host binary and looked up by name
    Executable,
}

impl MigrationFormat {
    /// Determine the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "sql" | "cql" => Some(MigrationFormat::Declarative),
            "rs" => Some(MigrationFormat::Executable),
            _ => None,
        }
    }

    /// Extension used for newly generated files of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            MigrationFormat::Declarative => "sql",
            MigrationFormat::Executable => "rs",
        }
    }
}

impl fmt::Display for MigrationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationFormat::Declarative => write!(f, "declarative"),
            MigrationFormat::Executable => write!(f, "executable"),
        }
    }
}

/// One migration script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    path: PathBuf,
    name: String,
    content: String,
    checksum: Checksum,
    format: MigrationFormat,
}

impl Migration {
    /// Build a migration from a path and its content.
    ///
    /// The name is the file's basename and the format is derived from its
    /// extension.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> CoreResult<Self> {
        let path = path.into();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = MigrationFormat::from_extension(&extension).ok_or_else(|| {
            CoreError::UnknownMigrationFormat {
                path: path.display().to_string(),
                extension: if extension.is_empty() {
                    String::new()
                } else {
                    format!(".{extension}")
                },
            }
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = content.into();
        let checksum = Checksum::of(&content);

        Ok(Self {
            path,
            name,
            content,
            checksum,
            format,
        })
    }

    /// Read a migration from a file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        Self::new(absolute, content)
    }

    /// Load every file in `dir` whose name matches one of `patterns`.
    ///
    /// Files matched by several patterns are loaded once. The result is in
    /// natural order of file name, so `v2_x` sorts before `v10_y`.
    pub fn load_all(dir: &Path, patterns: &[&str]) -> CoreResult<Vec<Self>> {
        let patterns = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| CoreError::InvalidPattern {
                    pattern: (*p).to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if patterns.iter().any(|p| p.matches(&name)) {
                names.insert(name);
            }
        }

        let mut names: Vec<String> = names.into_iter().collect();
        names.sort_by(|a, b| natural_cmp(a, b));

        names
            .iter()
            .map(|name| Self::load(&dir.join(name)))
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File basename, e.g. `v1_create_users.sql`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Basename without its extension, e.g. `v1_create_users`
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(stem, _)| stem)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    pub fn format(&self) -> MigrationFormat {
        self.format
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Migration(\"{}\")", self.name)
    }
}

/// Compare two file names, treating runs of ASCII digits as numbers.
///
/// Names are cut into alternating text and digit segments. Text segments
/// compare as strings, digit segments by numeric value (leading zeros
/// ignored). Names equal under that rule fall back to plain string order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);

    for (idx, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        let ord = if idx % 2 == 1 {
            compare_digits(l, r)
        } else {
            l.cmp(r)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

/// Text at even indices, digit runs at odd indices. Always starts and ends
/// with a (possibly empty) text segment.
fn segments(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_digits = false;

    for (idx, c) in s.char_indices() {
        if c.is_ascii_digit() != in_digits {
            parts.push(&s[start..idx]);
            start = idx;
            in_digits = !in_digits;
        }
    }
    parts.push(&s[start..]);
    if in_digits {
        parts.push("");
    }
    parts
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
