//! Size limits for pointers read from untrusted wire input.

use crate::JsonPointerError;

/// Maximum allowed pointer string length.
pub const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum allowed path depth.
pub const MAX_PATH_LENGTH: usize = 256;

/// Validate a JSON Pointer string.
///
/// # Errors
///
/// - [`JsonPointerError::Malformed`] if the pointer is non-empty but doesn't start with `/`
/// - [`JsonPointerError::TooLong`] if it exceeds [`MAX_POINTER_LENGTH`] bytes
///
/// # Example
///
/// ```
/// use docgit_json_pointer::validate_json_pointer;
///
/// validate_json_pointer("").unwrap();
/// validate_json_pointer("/foo/bar").unwrap();
/// validate_json_pointer("foo").unwrap_err();
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), JsonPointerError> {
    if pointer.is_empty() {
        return Ok(());
    }
    if !pointer.starts_with('/') {
        return Err(JsonPointerError::Malformed(pointer.to_string()));
    }
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(JsonPointerError::TooLong);
    }
    Ok(())
}

/// Validate a path depth.
pub fn validate_path(path: &[String]) -> Result<(), JsonPointerError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(JsonPointerError::TooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_pointer_is_malformed() {
        assert!(validate_json_pointer("foo/bar").is_err());
    }

    #[test]
    fn long_pointer() {
        let long_pointer = "/".to_string() + &"a".repeat(2000);
        assert_eq!(validate_json_pointer(&long_pointer), Err(JsonPointerError::TooLong));
    }

    #[test]
    fn path_depth() {
        let ok: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let deep: Vec<String> = (0..300).map(|i| i.to_string()).collect();
        assert!(validate_path(&ok).is_ok());
        assert!(validate_path(&deep).is_err());
    }
}
