use std::path::PathBuf;

use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::error::{ChatError, Result};

/// Looks up `name` in a `key=value; key2=value2` cookie string.
///
/// The first matching pair wins. Values are percent-decoded, keeping malformed
/// escapes verbatim; a pair without `=` yields an empty value. A value that
/// decodes to invalid UTF-8 is an error rather than a lossy token.
pub fn get_cookie(cookies: &str, name: &str) -> Result<Option<String>> {
    for pair in cookies.split(';') {
        let pair = pair.trim();
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == name {
            let decoded = percent_decode_str(value)
                .decode_utf8()
                .map_err(|source| ChatError::CookieEncoding {
                    name: name.to_string(),
                    source,
                })?;
            return Ok(Some(decoded.into_owned()));
        }
    }
    Ok(None)
}

/// Where the cookie string comes from.
///
/// Nothing is cached: a file source is re-read on every lookup so a token
/// rotated on disk is picked up by the next request.
#[derive(Debug, Clone, Default)]
pub enum CookieSource {
    #[default]
    None,
    Inline(String),
    File(PathBuf),
}

impl CookieSource {
    pub fn cookie_string(&self) -> Result<Option<String>> {
        match self {
            CookieSource::None => Ok(None),
            CookieSource::Inline(s) => Ok(Some(s.clone())),
            CookieSource::File(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| ChatError::CookieFile {
                        path: path.clone(),
                        source,
                    })?;
                debug!(path = %path.display(), "Read cookie file");
                Ok(Some(contents.trim().to_string()))
            }
        }
    }

    pub fn get(&self, name: &str) -> Result<Option<String>> {
        match self.cookie_string()? {
            Some(cookies) => get_cookie(&cookies, name),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_get_cookie_finds_value() {
        let cookies = "session=xyz; csrftoken=abc123; theme=dark";
        assert_eq!(get_cookie(cookies, "csrftoken").unwrap(), Some("abc123".to_string()));
        assert_eq!(get_cookie(cookies, "session").unwrap(), Some("xyz".to_string()));
    }

    #[test]
    fn test_get_cookie_missing() {
        assert_eq!(get_cookie("session=xyz", "csrftoken").unwrap(), None);
        assert_eq!(get_cookie("", "csrftoken").unwrap(), None);
    }

    #[test]
    fn test_get_cookie_first_match_wins() {
        assert_eq!(get_cookie("a=1; a=2", "a").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_get_cookie_decodes_value() {
        assert_eq!(
            get_cookie("csrftoken=a%20b%3Dc", "csrftoken").unwrap(),
            Some("a b=c".to_string())
        );
    }

    #[test]
    fn test_get_cookie_keeps_bad_escape() {
        assert_eq!(get_cookie("t=100%", "t").unwrap(), Some("100%".to_string()));
        assert_eq!(get_cookie("t=%zz", "t").unwrap(), Some("%zz".to_string()));
    }

    #[test]
    fn test_get_cookie_invalid_utf8_is_an_error() {
        assert!(matches!(
            get_cookie("csrftoken=%FF", "csrftoken"),
            Err(ChatError::CookieEncoding { .. })
        ));
        // Other keys stay readable.
        assert_eq!(
            get_cookie("csrftoken=%FF; session=ok", "session").unwrap(),
            Some("ok".to_string())
        );
    }

    #[test]
    fn test_get_cookie_prefix_is_not_a_match() {
        assert_eq!(get_cookie("csrftoken2=x", "csrftoken").unwrap(), None);
    }

    #[test]
    fn test_file_source_is_reread() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "csrftoken=first").unwrap();
        let source = CookieSource::File(file.path().to_path_buf());
        assert_eq!(source.get("csrftoken").unwrap(), Some("first".to_string()));

        std::fs::write(file.path(), "csrftoken=second\n").unwrap();
        assert_eq!(source.get("csrftoken").unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let source = CookieSource::File(PathBuf::from("/nonexistent/arena-chat/cookies"));
        assert!(matches!(
            source.get("csrftoken"),
            Err(ChatError::CookieFile { .. })
        ));
    }

    #[test]
    fn test_none_source() {
        assert_eq!(CookieSource::None.get("csrftoken").unwrap(), None);
    }
}
