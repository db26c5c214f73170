//! Archive member path normalization.
//!
//! Member paths are split on both `/` and `\`, so the result does not depend on
//! which platform built the archive. Output paths always use `/`.

use super::archive::ArchiveMember;

/// Splits an archive path into its components.
///
/// Empty segments are dropped; `.` counts as a component.
///
/// ```ignore
/// assert_eq!(split_components("nano-2.2.6/doc/Makefile.am"), ["nano-2.2.6", "doc", "Makefile.am"]);
/// ```
pub fn split_components(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Drops the first `strip_components` segments of `path`.
///
/// Returns `None` when nothing would be left, which is how the wrapping
/// top-level directory entry of an archive gets skipped.
pub fn normalize_path(path: &str, strip_components: usize) -> Option<String> {
    let components = split_components(path);
    if components.len() <= strip_components {
        return None;
    }
    Some(components[strip_components..].join("/"))
}

/// Rewrites a member's path, or returns `None` if the member must be skipped.
pub fn normalize_member(member: ArchiveMember, strip_components: usize) -> Option<ArchiveMember> {
    let path = normalize_path(&member.path, strip_components)?;
    Some(ArchiveMember { path, ..member })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::archive::MemberKind;

    fn member(path: &str) -> ArchiveMember {
        ArchiveMember {
            index: 3,
            path: path.to_string(),
            kind: MemberKind::File,
            size: 12,
            mode: Some(0o644),
        }
    }

    #[test]
    fn test_split_components() {
        assert_eq!(
            split_components("nano-2.2.6/doc/Makefile.am"),
            vec!["nano-2.2.6", "doc", "Makefile.am"]
        );
        assert_eq!(split_components("a\\b/c"), vec!["a", "b", "c"]);
        assert_eq!(split_components("a//b/./c/"), vec!["a", "b", ".", "c"]);
        assert!(split_components("").is_empty());
    }

    #[test]
    fn test_strip_one_component() {
        assert_eq!(
            normalize_path("pkg-1.0/doc/readme.txt", 1).as_deref(),
            Some("doc/readme.txt")
        );
    }

    #[test]
    fn test_dot_prefix_counts_as_component() {
        assert_eq!(
            normalize_path("./pkg-1.0/doc/readme.txt", 1).as_deref(),
            Some("pkg-1.0/doc/readme.txt")
        );
        assert_eq!(
            normalize_path("./pkg-1.0/doc/readme.txt", 2).as_deref(),
            Some("doc/readme.txt")
        );
        assert_eq!(normalize_path("./", 1), None);
    }

    #[test]
    fn test_bare_top_level_dir_is_skipped() {
        assert_eq!(normalize_path("pkg-1.0", 1), None);
        assert_eq!(normalize_path("pkg-1.0/", 1), None);
    }

    #[test]
    fn test_fewer_components_than_strip_is_skipped() {
        assert_eq!(normalize_path("a/b", 3), None);
        assert_eq!(normalize_path("", 0), None);
    }

    #[test]
    fn test_strip_zero_normalizes_separators() {
        assert_eq!(
            normalize_path("bin\\make.exe", 0).as_deref(),
            Some("bin/make.exe")
        );
        assert_eq!(
            normalize_path("share/doc/", 0).as_deref(),
            Some("share/doc")
        );
    }

    #[test]
    fn test_backslash_paths_strip_like_slash_paths() {
        assert_eq!(
            normalize_path("pkg-1.0\\doc\\syntax\\c.nanorc", 1).as_deref(),
            Some("doc/syntax/c.nanorc")
        );
    }

    #[test]
    fn test_strip_matches_component_count_for_many_depths() {
        let path = "a/b/c/d/e";
        for k in 0..5 {
            let expected = split_components(path)[k..].join("/");
            assert_eq!(normalize_path(path, k), Some(expected));
        }
        assert_eq!(normalize_path(path, 5), None);
        assert_eq!(normalize_path(path, 6), None);
    }

    #[test]
    fn test_normalize_member_keeps_other_fields() {
        let rewritten = normalize_member(member("nano-2.2.6/doc/syntax/c.nanorc"), 1).unwrap();
        assert_eq!(rewritten.path, "doc/syntax/c.nanorc");
        assert_eq!(rewritten.index, 3);
        assert_eq!(rewritten.size, 12);
        assert_eq!(rewritten.kind, MemberKind::File);

        assert!(normalize_member(member("nano-2.2.6"), 1).is_none());
    }
}
