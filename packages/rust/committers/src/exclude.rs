//! Page exclusion matching.
//!
//! Decides whether a page's source path is skipped, based on the `exclude`
//! glob patterns from the config. Shell-glob semantics: `*`, `?` and
//! `[...]`/`[!...]` classes, case-sensitive, no recursive `**` (a single `*`
//! already matches across `/`, so `folder/*` covers nested files).

use regex::Regex;

/// Determine whether `src_path` matches any of the exclusion globs.
///
/// Returns true on the first match, false for an empty pattern list.
/// Patterns always use `/` separators; paths are additionally tried with
/// `\` normalized to `/` so Windows-style paths match the same globs.
pub fn exclude(src_path: &str, globs: &[String]) -> bool {
    let normalized = src_path.replace('\\', "/");

    for glob in globs {
        let Some(re) = glob_to_regex(glob) else {
            continue;
        };
        if re.is_match(src_path) {
            return true;
        }
        if normalized != src_path && re.is_match(&normalized) {
            return true;
        }
    }

    false
}

/// Convert a shell glob to an anchored regex.
///
/// Unlike filesystem globs, `*` here matches path separators too, so that
/// `docs/*` excludes the whole subtree.
fn glob_to_regex(glob: &str) -> Option<Regex> {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');

    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            '[' => {
                // Collect a character class verbatim; `[!...]` negates.
                let mut raw = String::new();
                let negated = chars.peek() == Some(&'!');
                if negated {
                    chars.next();
                }
                let mut closed = false;
                for cc in chars.by_ref() {
                    if cc == ']' && !raw.is_empty() {
                        closed = true;
                        break;
                    }
                    raw.push(cc);
                }
                if closed {
                    pattern.push('[');
                    if negated {
                        pattern.push('^');
                    }
                    // A leading `]` is literal in glob classes; escape it
                    // (and backslashes) for the regex engine.
                    pattern.push_str(&raw.replace('\\', r"\\").replace(']', r"\]"));
                    pattern.push(']');
                } else {
                    // Unterminated class: treat the `[` literally.
                    pattern.push_str(r"\[");
                    if negated {
                        pattern.push('!');
                    }
                    pattern.push_str(&regex::escape(&raw));
                }
            }
            _ => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }

    pattern.push('$');
    Regex::new(&pattern).ok()
}
