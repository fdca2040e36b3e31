//! Shared handler helpers

use axum::http::StatusCode;

/// Builds a `Content-Disposition` value that offers `file_name` as a download.
///
/// Quotes and backslashes are escaped. Names that are not plain printable
/// ASCII get an ASCII fallback with `_` substituted, plus an RFC 5987
/// `filename*` parameter carrying the exact name.
pub fn content_disposition(file_name: &str) -> String {
    let needs_extended = file_name
        .chars()
        .any(|c| !c.is_ascii() || c.is_ascii_control());

    let mut fallback = String::with_capacity(file_name.len());
    for c in file_name.chars() {
        match c {
            '"' | '\\' => {
                fallback.push('\\');
                fallback.push(c);
            }
            c if !c.is_ascii() || c.is_ascii_control() => fallback.push('_'),
            c => fallback.push(c),
        }
    }

    if needs_extended {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(file_name)
        )
    } else {
        format!("attachment; filename=\"{fallback}\"")
    }
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for paths no route claims.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        assert_eq!(
            content_disposition("My.Show.S01E01.torrent"),
            "attachment; filename=\"My.Show.S01E01.torrent\""
        );
    }

    #[test]
    fn test_quotes_and_backslashes_are_escaped() {
        assert_eq!(
            content_disposition("a\"b\\c.nzb"),
            "attachment; filename=\"a\\\"b\\\\c.nzb\""
        );
    }

    #[test]
    fn test_non_ascii_gets_extended_parameter() {
        assert_eq!(
            content_disposition("Café.nzb"),
            "attachment; filename=\"Caf_.nzb\"; filename*=UTF-8''Caf%C3%A9.nzb"
        );
    }

    #[test]
    fn test_control_characters_are_replaced() {
        let value = content_disposition("a\nb.torrent");
        assert!(value.starts_with("attachment; filename=\"a_b.torrent\""));
        assert!(value.ends_with("filename*=UTF-8''a%0Ab.torrent"));
    }
}
