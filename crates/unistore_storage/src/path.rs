//! Path normalization helpers.
//!
//! Caller paths are relative to an operator root. A normalized path never
//! starts with `/` (except the root itself, which is `"/"`), never contains
//! empty, `.` or `..` segments, and ends with `/` exactly when it names a
//! directory. `..` is resolved lexically and can never climb above the root.

fn segments(path: &str) -> (Vec<&str>, bool) {
    let mut out: Vec<&str> = Vec::new();
    let mut is_dir = path.ends_with('/');
    for seg in path.split('/') {
        match seg {
            "" => {}
            "." => is_dir = true,
            ".." => {
                out.pop();
                is_dir = true;
            }
            s => {
                out.push(s);
                is_dir = path.ends_with('/');
            }
        }
    }
    (out, is_dir)
}

/// Normalizes a caller-supplied path.
///
/// ```
/// use unistore_storage::normalize_path;
///
/// assert_eq!(normalize_path("/testdir1//hello.txt"), "testdir1/hello.txt");
/// assert_eq!(normalize_path("testdir1/"), "testdir1/");
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("../../etc/passwd"), "etc/passwd");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let (segs, is_dir) = segments(path);
    if segs.is_empty() {
        return "/".to_string();
    }
    let mut out = segs.join("/");
    if is_dir {
        out.push('/');
    }
    out
}

/// Normalizes an operator root so it starts and ends with `/`.
///
/// ```
/// use unistore_storage::normalize_root;
///
/// assert_eq!(normalize_root("/myroot"), "/myroot/");
/// assert_eq!(normalize_root(""), "/");
/// ```
#[must_use]
pub fn normalize_root(root: &str) -> String {
    let (segs, _) = segments(root);
    if segs.is_empty() {
        return "/".to_string();
    }
    format!("/{}/", segs.join("/"))
}

/// Joins a normalized root and a normalized relative path.
#[must_use]
pub fn build_abs_path(root: &str, path: &str) -> String {
    if path == "/" {
        root.to_string()
    } else {
        format!("{root}{path}")
    }
}

/// Strips a normalized root from an absolute path.
///
/// Returns `"/"` for the root itself.
#[must_use]
pub fn build_rel_path(root: &str, abs: &str) -> String {
    match abs.strip_prefix(root) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => "/".to_string(),
    }
}

/// Returns the last segment of a normalized path, keeping a trailing `/`.
///
/// ```
/// use unistore_storage::get_basename;
///
/// assert_eq!(get_basename("/"), "/");
/// assert_eq!(get_basename("a/b/"), "b/");
/// assert_eq!(get_basename("a/b.txt"), "b.txt");
/// ```
#[must_use]
pub fn get_basename(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Returns the parent directory of a normalized path.
///
/// The parent of a top-level entry, and of the root itself, is `"/"`.
#[must_use]
pub fn get_parent(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_cases() {
        let cases = [
            ("", "/"),
            ("/", "/"),
            ("//", "/"),
            ("/testpath", "testpath"),
            ("testpath/", "testpath/"),
            ("/testdir1/subdir/", "testdir1/subdir/"),
            ("a//b///c", "a/b/c"),
            ("a/./b", "a/b"),
            ("a/b/..", "a/"),
            ("a/../b", "b"),
            ("..", "/"),
            ("/../..", "/"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_path(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn root_cases() {
        assert_eq!(normalize_root("/"), "/");
        assert_eq!(normalize_root("myroot"), "/myroot/");
        assert_eq!(normalize_root("/a//b/"), "/a/b/");
    }

    #[test]
    fn abs_and_rel() {
        assert_eq!(build_abs_path("/", "a/b"), "/a/b");
        assert_eq!(build_abs_path("/myroot/", "/"), "/myroot/");
        assert_eq!(build_abs_path("/myroot/", "x/"), "/myroot/x/");

        assert_eq!(build_rel_path("/myroot/", "/myroot/x/"), "x/");
        assert_eq!(build_rel_path("/myroot/", "/myroot/"), "/");
        assert_eq!(build_rel_path("/", "/a"), "a");
    }

    #[test]
    fn basename_and_parent() {
        assert_eq!(get_basename("a"), "a");
        assert_eq!(get_basename("a/"), "a/");
        assert_eq!(get_parent("a"), "/");
        assert_eq!(get_parent("a/"), "/");
        assert_eq!(get_parent("a/b/c"), "a/b/");
        assert_eq!(get_parent("a/b/"), "a/");
        assert_eq!(get_parent("/"), "/");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(path in "[a-c/.]{0,24}") {
            let once = normalize_path(&path);
            prop_assert_eq!(normalize_path(&once), once.clone());
        }

        #[test]
        fn normalized_paths_stay_under_root(path in "[a-c/.]{0,24}") {
            let abs = build_abs_path("/root/", &normalize_path(&path));
            prop_assert!(abs.starts_with("/root/"));
            prop_assert!(!abs.contains("/../"));
        }
    }
}
