//! Filesystem-safe local names
//!
//! Remote display names may contain characters that are reserved on one or
//! more local filesystems, and may be arbitrarily long. [`sanitize`] maps a
//! remote name to a name that is safe to use as a single path component.

/// Maximum length, in characters, of a sanitized name
pub const MAX_NAME_CHARS: usize = 70;

/// Characters that are replaced by [`REPLACEMENT`]
pub const RESERVED_CHARS: [char; 9] = ['\\', '*', '/', '|', '<', '>', ':', '?', '"'];

/// Replacement for every reserved character
pub const REPLACEMENT: char = '_';

/// Extensions longer than this are treated as part of the stem when
/// truncating
const MAX_KEPT_EXTENSION_CHARS: usize = 16;

/// Maps a remote name to a filesystem-safe, length-bounded local name
///
/// Every reserved character (and NUL) becomes `_`. Names longer than
/// [`MAX_NAME_CHARS`] are truncated; when the name has a short extension the
/// stem is shortened instead so the extension survives. The empty name and
/// the relative components `.` and `..` become underscores so the result
/// can never address a parent directory.
///
/// # Examples
///
/// ```
/// use boxmirror_core::domain::sanitize;
///
/// assert_eq!(sanitize("Q3: plan/draft?.docx"), "Q3_ plan_draft_.docx");
/// assert_eq!(sanitize(".."), "__");
/// ```
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if RESERVED_CHARS.contains(&c) || c == '\0' {
                REPLACEMENT
            } else {
                c
            }
        })
        .collect();

    let bounded = truncate_to(&replaced, "", MAX_NAME_CHARS);

    match bounded.as_str() {
        "" => REPLACEMENT.to_string(),
        "." => "_".to_string(),
        ".." => "__".to_string(),
        _ => bounded,
    }
}

/// Makes a local name unique by inserting `_<id>` before its extension
///
/// Used when two items of the same container map to the same local name.
/// The result stays within [`MAX_NAME_CHARS`] unless the input itself was
/// longer.
pub fn disambiguate(local_name: &str, id: &str) -> String {
    let marker = format!("{REPLACEMENT}{id}");
    let budget = MAX_NAME_CHARS.max(local_name.chars().count());
    truncate_to(local_name, &marker, budget)
}

/// Builds `stem + marker + ext` bounded to `limit` characters, cutting the
/// stem first
fn truncate_to(name: &str, marker: &str, limit: usize) -> String {
    let (stem, ext) = split_extension(name);
    let stem_len = stem.chars().count();
    let marker_len = marker.chars().count();
    let ext_len = ext.chars().count();

    if stem_len + marker_len + ext_len <= limit {
        return format!("{stem}{marker}{ext}");
    }

    match limit.checked_sub(marker_len + ext_len) {
        Some(room) if room > 0 => {
            let kept: String = stem.chars().take(room).collect();
            format!("{kept}{marker}{ext}")
        }
        _ => format!("{stem}{marker}{ext}").chars().take(limit).collect(),
    }
}

/// Splits `name` into stem and extension (including the dot)
///
/// Dotfiles like `.profile` have no extension. Overlong extensions are not
/// treated as extensions.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext = &name[idx..];
            if ext.chars().count() - 1 <= MAX_KEPT_EXTENSION_CHARS {
                (&name[..idx], ext)
            } else {
                (name, "")
            }
        }
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_every_reserved_char() {
        let input = r#"a\b*c/d|e<f>g:h?i"j"#;
        let output = sanitize(input);
        assert_eq!(output, "a_b_c_d_e_f_g_h_i_j");
        assert!(!output.chars().any(|c| RESERVED_CHARS.contains(&c)));
    }

    #[test]
    fn test_plain_name_unchanged() {
        assert_eq!(sanitize("Quarterly Report (final).pdf"), "Quarterly Report (final).pdf");
        assert_eq!(sanitize("résumé ünïcödé.txt"), "résumé ünïcödé.txt");
    }

    #[test]
    fn test_truncates_to_max_chars() {
        let long = "x".repeat(200);
        let output = sanitize(&long);
        assert_eq!(output.chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn test_truncation_keeps_extension() {
        let long = format!("{}.boxnote", "n".repeat(100));
        let output = sanitize(&long);
        assert_eq!(output.chars().count(), MAX_NAME_CHARS);
        assert!(output.ends_with(".boxnote"));
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let long = "é".repeat(100);
        let output = sanitize(&long);
        assert_eq!(output.chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn test_long_extension_is_truncated_plainly() {
        let long = format!("a.{}", "e".repeat(100));
        let output = sanitize(&long);
        assert_eq!(output.chars().count(), MAX_NAME_CHARS);
        assert!(output.starts_with("a."));
    }

    #[test]
    fn test_relative_components_are_neutralized() {
        assert_eq!(sanitize(""), "_");
        assert_eq!(sanitize("."), "_");
        assert_eq!(sanitize(".."), "__");
        assert_eq!(sanitize("..."), "...");
    }

    #[test]
    fn test_nul_is_replaced() {
        assert_eq!(sanitize("a\0b"), "a_b");
    }

    #[test]
    fn test_output_bounded_and_clean_for_mixed_input() {
        let input = format!("{}{}", "<>:?".repeat(30), "tail.txt");
        let output = sanitize(&input);
        assert!(output.chars().count() <= MAX_NAME_CHARS);
        assert!(!output.chars().any(|c| RESERVED_CHARS.contains(&c)));
    }

    #[test]
    fn test_disambiguate_inserts_id_before_extension() {
        assert_eq!(disambiguate("report.pdf", "123"), "report_123.pdf");
        assert_eq!(disambiguate("notes.txt", "9"), "notes_9.txt");
        assert_eq!(disambiguate("Makefile", "7"), "Makefile_7");
    }

    #[test]
    fn test_disambiguate_stays_bounded() {
        let name = format!("{}.pdf", "r".repeat(66));
        assert_eq!(name.chars().count(), MAX_NAME_CHARS);
        let output = disambiguate(&name, "4242");
        assert_eq!(output.chars().count(), MAX_NAME_CHARS);
        assert!(output.ends_with("_4242.pdf"));
    }
}
