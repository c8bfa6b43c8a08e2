use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use log::debug;
use walkdir::{IntoIter, WalkDir};

/// What the finder decided about a directory on the current branch.
#[derive(Debug, Clone, Copy)]
struct DirState {
    /// Files directly inside are candidates (path pattern matched)
    yields_files: bool,
    /// Subdirectories are visited (depth threshold not reached)
    descends: bool,
}

/// Lazy, single-pass search for files matching a shell-style pattern.
///
/// Directories are visited top-down in the order the filesystem returns
/// them. Unreadable directories are skipped silently.
pub struct FileFinder {
    walker: IntoIter,
    file_matcher: GlobMatcher,
    path_matcher: Option<GlobMatcher>,
    depth_threshold: Option<usize>,
    branch: Vec<DirState>,
}

/// Find files named like `file_pattern` below `top_dir`.
///
/// When `max_depth` is given (0 means unbounded), a directory whose path
/// holds at least `separators(dirname(top_dir)) + max_depth` separators is
/// still searched for files but not descended into. When `path_pattern` is
/// given, only directories whose full path matches it contribute files;
/// their subdirectories are visited regardless.
///
/// ```no_run
/// use std::path::Path;
/// use pg_collector::collectors::find_files;
///
/// # fn example() -> anyhow::Result<()> {
/// for path in find_files("*.conf", Path::new("/var/lib/pgsql"), None, None)? {
///     println!("{}", path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn find_files(
    file_pattern: &str,
    top_dir: &Path,
    max_depth: Option<usize>,
    path_pattern: Option<&str>,
) -> Result<FileFinder> {
    let file_matcher = fnmatch_matcher(file_pattern)?;
    let path_matcher = path_pattern.map(fnmatch_matcher).transpose()?;

    let depth_threshold = max_depth
        .filter(|depth| *depth > 0)
        .map(|depth| parent_separator_count(top_dir) + depth);

    debug!(
        "Searching {} for {} (threshold: {:?}, path pattern: {:?})",
        top_dir.display(),
        file_pattern,
        depth_threshold,
        path_pattern
    );

    Ok(FileFinder {
        walker: WalkDir::new(top_dir).into_iter(),
        file_matcher,
        path_matcher,
        depth_threshold,
        branch: Vec::new(),
    })
}

impl FileFinder {
    fn directory_state(&self, path: &Path) -> DirState {
        let yields_files = self
            .path_matcher
            .as_ref()
            .map_or(true, |matcher| matcher.is_match(path));

        let descends = self
            .depth_threshold
            .map_or(true, |threshold| separator_count(path) < threshold);

        DirState { yields_files, descends }
    }
}

impl Iterator for FileFinder {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let depth = entry.depth();

            // A linked root is walked through; links further down are not
            let is_dir = if depth == 0 {
                entry.path().is_dir()
            } else {
                entry.file_type().is_dir()
            };

            if is_dir {
                // A directory below a depth-cut parent is never entered
                if depth > 0 && !self.branch.get(depth - 1).map_or(false, |p| p.descends) {
                    self.walker.skip_current_dir();
                    continue;
                }

                let state = self.directory_state(entry.path());
                self.branch.truncate(depth);
                self.branch.push(state);
                continue;
            }

            // The root itself must be a directory
            if depth == 0 {
                continue;
            }

            // Links to directories count as directories, and are not followed
            if entry.path_is_symlink() && entry.path().is_dir() {
                continue;
            }

            let parent_yields = self
                .branch
                .get(depth - 1)
                .map_or(false, |parent| parent.yields_files);

            if parent_yields && self.file_matcher.is_match(entry.file_name()) {
                return Some(entry.into_path());
            }
        }
    }
}

/// Compile a pattern with `fnmatch` semantics: `*` crosses separators and
/// backslash is an ordinary character.
fn fnmatch_matcher(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(&fnmatch_to_glob(pattern))
        .literal_separator(false)
        .backslash_escape(false)
        .build()
        .context(format!("Invalid glob pattern: {}", pattern))?;

    Ok(glob.compile_matcher())
}

/// Rewrite an `fnmatch` pattern so globset reads it the same way.
///
/// Braces and commas have no meaning to `fnmatch`, and a `[` without a
/// closing `]` is an ordinary character. Both become one-character classes.
fn fnmatch_to_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut glob = String::with_capacity(pattern.len());

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    glob.push('[');
                    glob.extend(&chars[i..=end]);
                    i = end + 1;
                }
                None => glob.push_str("[[]"),
            },
            '{' | '}' | ',' => {
                glob.push('[');
                glob.push(c);
                glob.push(']');
            }
            _ => glob.push(c),
        }
    }

    glob
}

/// Index of the `]` closing a class whose body starts at `start`. A leading
/// `!` and a `]` right after it belong to the body.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }

    chars
        .get(j..)?
        .iter()
        .position(|&c| c == ']')
        .map(|offset| j + offset)
}

fn separator_count(path: &Path) -> usize {
    path.to_string_lossy().matches(MAIN_SEPARATOR).count()
}

/// Separator count of the textual parent of `path`, as POSIX `dirname`
/// would produce it (trailing separators kept on the input, stripped from
/// the result unless it is all separators).
fn parent_separator_count(path: &Path) -> usize {
    let text = path.to_string_lossy();

    let head = match text.rfind(MAIN_SEPARATOR) {
        Some(idx) => &text[..=idx],
        None => "",
    };

    let head = if head.chars().all(|c| c == MAIN_SEPARATOR) {
        head
    } else {
        head.trim_end_matches(MAIN_SEPARATOR)
    };

    separator_count(Path::new(head))
}
