use crate::constants::MAX_PATH_LEN;
use thiserror::Error;

/// Reasons the path builder refuses a client-supplied path.
///
/// The display strings are the classic strerror texts; handlers send them
/// verbatim after the reply code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    #[error("Invalid argument")]
    InvalidArgument,

    #[error("File name too long")]
    NameTooLong,
}

/// Rejects arguments that try to climb with `..` or contain an empty `//` segment.
pub fn validate_path(args: &str) -> Result<(), PathError> {
    if args.contains("//") {
        return Err(PathError::InvalidArgument);
    }
    if args.split('/').any(|component| component == "..") {
        return Err(PathError::InvalidArgument);
    }
    Ok(())
}

/// Resolves `args` against `cwd` into a canonical absolute path.
///
/// Absolute arguments replace the working directory, relative ones are joined
/// to it with a single `/`. `.` components and trailing slashes are dropped,
/// and a path that reduces to nothing becomes the root `/`.
///
/// # Arguments
///
/// * `cwd` - The session's current working directory, always absolute.
/// * `args` - The raw path argument received from the client.
///
/// # Returns
///
/// The absolute path, or a `PathError` if the argument is unsafe or too long.
pub fn build_path(cwd: &str, args: &str) -> Result<String, PathError> {
    validate_path(args)?;

    let joined = if args.starts_with('/') {
        args.to_string()
    } else if cwd == "/" {
        format!("/{}", args)
    } else {
        format!("{}/{}", cwd, args)
    };

    if joined.len() > MAX_PATH_LEN {
        return Err(PathError::NameTooLong);
    }

    let mut path = String::with_capacity(joined.len());
    for component in joined
        .split('/')
        .filter(|component| !component.is_empty() && *component != ".")
    {
        path.push('/');
        path.push_str(component);
    }

    if path.is_empty() {
        path.push('/');
    }

    Ok(path)
}

/// Returns the parent of `cwd`, staying at `/` when already at the root.
pub fn cd_up(cwd: &str) -> String {
    match cwd.rfind('/') {
        Some(0) | None => String::from("/"),
        Some(slash) => cwd[..slash].to_string(),
    }
}

/// Returns the last component of an absolute path.
pub fn base_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(slash) => &path[slash + 1..],
        None => path,
    }
}

/// Escapes a string before it is echoed back on an FTP line.
///
/// Newlines become NUL, and with `quotes` set every `"` is doubled the way
/// PWD-style replies require.
pub fn encode_path(path: &str, quotes: bool) -> String {
    let needs_escape = path.contains('\n') || (quotes && path.contains('"'));
    if !needs_escape {
        return path.to_string();
    }

    let mut encoded = String::with_capacity(path.len() + 8);
    for c in path.chars() {
        match c {
            '\n' => encoded.push('\0'),
            '"' if quotes => encoded.push_str("\"\""),
            _ => encoded.push(c),
        }
    }
    encoded
}

/// Reverses the NUL escape on inbound command text.
pub fn decode_path(bytes: &mut [u8]) {
    for byte in bytes.iter_mut().filter(|b| **b == 0) {
        *byte = b'\n';
    }
}

/// Renders a byte count with the largest unit that keeps it above one.
pub fn format_free_space(bytes: u64) -> String {
    let size_in_mb = bytes as f64 / 1_048_576.0;
    if size_in_mb >= 1_048_576.0 {
        format!("{:.2} TB", size_in_mb / 1_048_576.0)
    } else if size_in_mb >= 1_024.0 {
        format!("{:.2} GB", size_in_mb / 1_024.0)
    } else {
        format!("{:.2} MB", size_in_mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_space_picks_unit() {
        assert_eq!(format_free_space(512 * 1_048_576), "512.00 MB");
        assert_eq!(format_free_space(3 * 1_073_741_824), "3.00 GB");
        assert_eq!(format_free_space(2 * 1_099_511_627_776), "2.00 TB");
    }

    #[test]
    fn relative_paths_join_cwd() {
        assert_eq!(build_path("/", "sub").unwrap(), "/sub");
        assert_eq!(build_path("/sub", "file.txt").unwrap(), "/sub/file.txt");
        assert_eq!(build_path("/sub", "a/b/").unwrap(), "/sub/a/b");
    }

    #[test]
    fn absolute_paths_replace_cwd() {
        assert_eq!(build_path("/sub", "/other/").unwrap(), "/other");
        assert_eq!(build_path("/sub", "/").unwrap(), "/");
    }

    #[test]
    fn noop_inputs_resolve_to_cwd() {
        assert_eq!(build_path("/sub", "").unwrap(), "/sub");
        assert_eq!(build_path("/sub", ".").unwrap(), "/sub");
        assert_eq!(build_path("/sub", "./").unwrap(), "/sub");
        assert_eq!(build_path("/", ".").unwrap(), "/");
    }

    #[test]
    fn traversal_is_rejected() {
        assert_eq!(build_path("/", ".."), Err(PathError::InvalidArgument));
        assert_eq!(build_path("/a", "../b"), Err(PathError::InvalidArgument));
        assert_eq!(build_path("/a", "b/.."), Err(PathError::InvalidArgument));
        assert_eq!(build_path("/a", "/x/../y"), Err(PathError::InvalidArgument));
        assert_eq!(build_path("/a", "b//c"), Err(PathError::InvalidArgument));
    }

    #[test]
    fn dotted_names_are_not_traversal() {
        assert_eq!(build_path("/", "..hidden").unwrap(), "/..hidden");
        assert_eq!(build_path("/", "a..b/c").unwrap(), "/a..b/c");
    }

    #[test]
    fn long_paths_are_rejected() {
        let long = "x".repeat(MAX_PATH_LEN + 1);
        assert_eq!(build_path("/", &long), Err(PathError::NameTooLong));
        assert_eq!(PathError::NameTooLong.to_string(), "File name too long");
    }

    #[test]
    fn built_paths_are_canonical() {
        for (cwd, args) in [("/", "a/b"), ("/x", "y/./z/"), ("/x/y", "/q"), ("/", "")] {
            let path = build_path(cwd, args).unwrap();
            assert!(path.starts_with('/'));
            assert!(!path.contains("//"));
            assert!(!path.split('/').any(|c| c == ".."));
            assert!(path == "/" || !path.ends_with('/'));
        }
    }

    #[test]
    fn cd_up_strips_last_component() {
        assert_eq!(cd_up("/a/b"), "/a");
        assert_eq!(cd_up("/a"), "/");
        assert_eq!(cd_up("/"), "/");
        assert_eq!(cd_up(""), "/");
    }

    #[test]
    fn encode_escapes_newlines_and_quotes() {
        assert_eq!(encode_path("plain", true), "plain");
        assert_eq!(encode_path("a\nb", false), "a\0b");
        assert_eq!(encode_path("say \"hi\"", true), "say \"\"hi\"\"");
        assert_eq!(encode_path("say \"hi\"", false), "say \"hi\"");
    }

    #[test]
    fn decode_restores_newlines() {
        let mut line = b"RETR a\0b".to_vec();
        decode_path(&mut line);
        assert_eq!(line, b"RETR a\nb");
    }

    #[test]
    fn base_name_takes_last_component() {
        assert_eq!(base_name("/a/b.txt"), "b.txt");
        assert_eq!(base_name("/b.txt"), "b.txt");
    }
}
