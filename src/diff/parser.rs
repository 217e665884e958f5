//! Unified diff format parser.
//!
//! Parses `git diff` output as well as plain `diff -u` output (files
//! introduced by `---`/`+++` pairs with no `diff --git` line) into
//! `Vec<PatchedFile>`. Hunk bodies are consumed by the line counts in their
//! `@@` header, so a removed line that happens to read `-- foo` is never
//! mistaken for a file header.
//!
//! Line text keeps its trailing newline. A `\ No newline at end of file`
//! marker strips it from the line it follows.

use crate::models::diff::{DEV_NULL, DiffLine, Hunk, PatchedFile};

use super::DiffError;

/// Parse a unified diff string into a list of patched files.
///
/// Text outside any file section (commit messages, `git format-patch`
/// preambles) is ignored. Malformed headers and hunks whose bodies do not
/// match their declared lengths are errors.
pub fn parse_unified_diff(input: &str) -> Result<Vec<PatchedFile>, DiffError> {
    let mut files = Vec::new();
    let mut cursor = Cursor::new(input);

    while let Some(line) = cursor.peek() {
        let line = strip_eol(line);
        if let Some(rest) = line.strip_prefix("diff --git ") {
            cursor.advance();
            files.push(parse_git_file(&mut cursor, rest)?);
        } else if line.starts_with("--- ") {
            let (source_path, target_path) = parse_file_headers(&mut cursor)?;
            let hunks = parse_hunks(&mut cursor)?;
            files.push(PatchedFile {
                source_path,
                target_path,
                is_rename: false,
                is_binary: false,
                hunks,
            });
        } else if line.starts_with("+++ ") {
            return Err(cursor.error_ahead("'+++' header without a preceding '---' header"));
        } else if line.starts_with("@@") {
            return Err(cursor.error_ahead("hunk found outside of a file section"));
        } else {
            cursor.advance();
        }
    }

    Ok(files)
}

/// Line-oriented reader that remembers how far it has got, for error messages.
struct Cursor<'a> {
    lines: std::iter::Peekable<std::str::SplitInclusive<'a, char>>,
    consumed: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.split_inclusive('\n').peekable(),
            consumed: 0,
        }
    }

    fn peek(&mut self) -> Option<&'a str> {
        self.lines.peek().copied()
    }

    fn advance(&mut self) -> Option<&'a str> {
        let line = self.lines.next();
        if line.is_some() {
            self.consumed += 1;
        }
        line
    }

    /// Error attributed to the most recently consumed line.
    fn error(&self, message: impl AsRef<str>) -> DiffError {
        DiffError::ParseError(format!("line {}: {}", self.consumed, message.as_ref()))
    }

    /// Error attributed to the line about to be consumed.
    fn error_ahead(&self, message: impl AsRef<str>) -> DiffError {
        DiffError::ParseError(format!("line {}: {}", self.consumed + 1, message.as_ref()))
    }
}

/// Parse the extended headers and hunks following a `diff --git` line.
fn parse_git_file(cursor: &mut Cursor<'_>, header: &str) -> Result<PatchedFile, DiffError> {
    let (mut source_path, mut target_path) = parse_diff_header(header);
    let mut is_rename = false;
    let mut is_binary = false;

    while let Some(next) = cursor.peek() {
        let next = strip_eol(next);
        if next.starts_with("--- ") {
            (source_path, target_path) = parse_file_headers(cursor)?;
            break;
        }

        if next.starts_with("new file mode") {
            source_path = DEV_NULL.to_string();
        } else if next.starts_with("deleted file mode") {
            target_path = DEV_NULL.to_string();
        } else if let Some(path) = next.strip_prefix("rename from ") {
            is_rename = true;
            source_path = path.to_string();
        } else if let Some(path) = next.strip_prefix("rename to ") {
            is_rename = true;
            target_path = path.to_string();
        } else if next.starts_with("Binary files") || next == "GIT binary patch" {
            is_binary = true;
        } else if !is_extended_header(next) {
            break;
        }
        cursor.advance();
    }

    let hunks = parse_hunks(cursor)?;

    Ok(PatchedFile {
        source_path,
        target_path,
        is_rename,
        is_binary,
        hunks,
    })
}

/// Extended header lines that carry nothing we need.
fn is_extended_header(line: &str) -> bool {
    const IGNORED: &[&str] = &[
        "index ",
        "old mode",
        "new mode",
        "similarity index",
        "dissimilarity index",
        "copy from",
        "copy to",
    ];
    IGNORED.iter().any(|prefix| line.starts_with(prefix))
}

/// Consume a `---`/`+++` pair and return the (source, target) paths.
fn parse_file_headers(cursor: &mut Cursor<'_>) -> Result<(String, String), DiffError> {
    let minus = cursor
        .advance()
        .and_then(|l| strip_eol(l).strip_prefix("--- "))
        .ok_or_else(|| cursor.error("expected '---' file header"))?;
    let source_path = header_path(minus);

    let plus = cursor
        .advance()
        .and_then(|l| strip_eol(l).strip_prefix("+++ "))
        .ok_or_else(|| cursor.error("expected '+++' file header after '---'"))?;
    let target_path = header_path(plus);

    Ok((source_path, target_path))
}

/// Extract the path from a `---`/`+++` header value, dropping any timestamp.
fn header_path(raw: &str) -> String {
    let path = raw.split('\t').next().unwrap_or(raw).trim_end();
    let path = path.trim_matches('"');
    if path == DEV_NULL {
        return path.to_string();
    }
    strip_diff_prefix(path).to_string()
}

/// Parse the "diff --git a/path b/path" header remainder.
fn parse_diff_header(rest: &str) -> (String, String) {
    // Handle paths with spaces by finding the second prefix separator
    // Paths are prefixed with a/ and b/ (default), or c/w/i/o/ when
    // git's diff.mnemonicPrefix is enabled.
    if let Some(b_idx) = find_second_prefix(rest) {
        let a_part = &rest[..b_idx];
        let b_part = &rest[b_idx + 1..];
        (
            strip_diff_prefix(a_part).to_string(),
            strip_diff_prefix(b_part).to_string(),
        )
    } else {
        let mut parts = rest.splitn(2, ' ');
        let old_path = strip_diff_prefix(parts.next().unwrap_or("")).to_string();
        let new_path = strip_diff_prefix(parts.next().unwrap_or("")).to_string();
        (old_path, new_path)
    }
}

/// Strip a single-character git diff prefix (`a/`, `b/`, `c/`, `w/`, `i/`, `o/`).
fn strip_diff_prefix(path: &str) -> &str {
    if path.len() >= 2 {
        let bytes = path.as_bytes();
        if bytes[1] == b'/' && matches!(bytes[0], b'a' | b'b' | b'c' | b'w' | b'i' | b'o') {
            return &path[2..];
        }
    }
    path
}

/// Find the position of the second path prefix separator in a diff header.
fn find_second_prefix(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (1..bytes.len().saturating_sub(1)).find(|&i| {
        bytes[i] == b' '
            && bytes.get(i + 2) == Some(&b'/')
            && matches!(bytes.get(i + 1), Some(b'a' | b'b' | b'c' | b'w' | b'i' | b'o'))
    })
}

/// Parse consecutive hunks for the current file.
fn parse_hunks(cursor: &mut Cursor<'_>) -> Result<Vec<Hunk>, DiffError> {
    let mut hunks = Vec::new();
    while let Some(next) = cursor.peek() {
        if !next.starts_with("@@") {
            break;
        }
        hunks.push(parse_hunk(cursor)?);
    }
    Ok(hunks)
}

/// Parse a single hunk starting with its `@@` line.
fn parse_hunk(cursor: &mut Cursor<'_>) -> Result<Hunk, DiffError> {
    let header_line = cursor
        .advance()
        .map(strip_eol)
        .ok_or_else(|| cursor.error("expected hunk header"))?;
    let (source_start, source_length, target_start, target_length, section_header) =
        parse_hunk_header(header_line)
            .ok_or_else(|| cursor.error(format!("malformed hunk header: {header_line}")))?;
    if source_start.checked_add(source_length).is_none()
        || target_start.checked_add(target_length).is_none()
    {
        return Err(cursor.error(format!("hunk header out of range: {header_line}")));
    }

    let mut lines: Vec<DiffLine> = Vec::new();
    let mut source_left = source_length;
    let mut target_left = target_length;
    let mut source_no = source_start;
    let mut target_no = target_start;

    while source_left > 0 || target_left > 0 {
        let Some(raw) = cursor.advance() else {
            return Err(cursor.error(format!(
                "unexpected end of input in hunk '{header_line}'"
            )));
        };

        if raw.starts_with('\\') {
            strip_last_newline(&mut lines);
            continue;
        }

        if raw == "\n" || raw == "\r\n" {
            // Some tools strip the single space from blank context lines.
            if source_left == 0 || target_left == 0 {
                return Err(cursor.error(format!("hunk '{header_line}' is longer than declared")));
            }
            lines.push(DiffLine::context(raw, source_no, target_no));
            source_no += 1;
            target_no += 1;
            source_left -= 1;
            target_left -= 1;
            continue;
        }

        // Markers are ASCII, so slicing past the first byte is safe once matched.
        match raw.as_bytes()[0] {
            b' ' => {
                let text = &raw[1..];
                if source_left == 0 || target_left == 0 {
                    return Err(cursor.error(format!("hunk '{header_line}' is longer than declared")));
                }
                lines.push(DiffLine::context(text, source_no, target_no));
                source_no += 1;
                target_no += 1;
                source_left -= 1;
                target_left -= 1;
            }
            b'+' => {
                let text = &raw[1..];
                if target_left == 0 {
                    return Err(cursor.error(format!("hunk '{header_line}' has too many added lines")));
                }
                lines.push(DiffLine::added(text, target_no));
                target_no += 1;
                target_left -= 1;
            }
            b'-' => {
                let text = &raw[1..];
                if source_left == 0 {
                    return Err(cursor.error(format!("hunk '{header_line}' has too many removed lines")));
                }
                lines.push(DiffLine::removed(text, source_no));
                source_no += 1;
                source_left -= 1;
            }
            _ => {
                return Err(cursor.error(format!(
                    "unexpected line in hunk '{header_line}': {}",
                    strip_eol(raw)
                )));
            }
        }
    }

    // The marker for the final line comes after the counts are exhausted.
    if cursor.peek().is_some_and(|next| next.starts_with('\\')) {
        cursor.advance();
        strip_last_newline(&mut lines);
    }

    if cursor.peek().is_some_and(is_hunk_body_line) {
        return Err(cursor.error_ahead(format!("hunk '{header_line}' is longer than declared")));
    }

    Ok(Hunk {
        source_start,
        source_length,
        target_start,
        target_length,
        section_header,
        lines,
    })
}

/// Whether `line` reads as part of a hunk body rather than the next header.
///
/// The `-- ` line that opens a `git format-patch` signature is not.
fn is_hunk_body_line(line: &str) -> bool {
    let line = strip_eol(line);
    if line.is_empty() {
        return true;
    }
    if line == "-- " || line.starts_with("--- ") || line.starts_with("+++ ") {
        return false;
    }
    matches!(line.as_bytes()[0], b' ' | b'+' | b'-')
}

fn strip_last_newline(lines: &mut [DiffLine]) {
    if let Some(last) = lines.last_mut() {
        if last.text.ends_with('\n') {
            last.text.pop();
            if last.text.ends_with('\r') {
                last.text.pop();
            }
        }
    }
}

/// Parse a `@@ -source_start,source_length +target_start,target_length @@ header` line.
fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32, Option<String>)> {
    let line = line.strip_prefix("@@ ")?;
    let end = line.find(" @@")?;
    let range_part = &line[..end];
    let header = {
        let rest = line[end + 3..].trim();
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    };

    let (source, target) = range_part.split_once(' ')?;
    let (source_start, source_length) = parse_range(source.strip_prefix('-')?)?;
    let (target_start, target_length) = parse_range(target.strip_prefix('+')?)?;

    Some((source_start, source_length, target_start, target_length, header))
}

/// Parse "start,count" or "start" (count defaults to 1).
fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
