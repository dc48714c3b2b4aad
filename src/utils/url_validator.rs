//! 原始 URL 校验
//!
//! 只接受可解析的 http/https 绝对地址，长度受 urls 表列宽限制。

use url::Url;

use crate::errors::{LinkvaultError, Result};

/// urls.original_url 列宽
pub const MAX_URL_LEN: usize = 700;

/// 校验待缩短的 URL，返回去除首尾空白后的形式
pub fn validate_url(raw: &str) -> Result<&str> {
    let url = raw.trim();

    if url.is_empty() {
        return Err(LinkvaultError::validation("URL 不能为空"));
    }

    if url.len() > MAX_URL_LEN {
        return Err(LinkvaultError::validation(format!(
            "URL 长度 {} 超过上限 {}",
            url.len(),
            MAX_URL_LEN
        )));
    }

    let parsed = Url::parse(url)
        .map_err(|e| LinkvaultError::validation(format!("URL 格式无效: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(LinkvaultError::validation(format!(
                "不支持的协议: {}，仅允许 http 与 https",
                other
            )));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(LinkvaultError::validation("URL 缺少主机名"));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(validate_url("https://example.com").unwrap(), "https://example.com");
        assert!(validate_url("http://localhost:8080/a?b=1").is_ok());
        assert!(validate_url("HTTPS://EXAMPLE.COM").is_ok());
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(
            validate_url("  https://example.com/x \n").unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_rejects_empty_and_relative() {
        assert!(validate_url("").is_err());
        assert!(validate_url("   ").is_err());
        assert!(validate_url("/just/a/path").is_err());
    }

    #[test]
    fn test_rejects_other_schemes() {
        for url in ["javascript:alert(1)", "ftp://example.com", "file:///etc/passwd"] {
            let err = validate_url(url).unwrap_err();
            assert!(matches!(err, LinkvaultError::Validation(_)), "{url}");
        }
    }

    #[test]
    fn test_rejects_overlong_url() {
        let url = format!("https://example.com/{}", "a".repeat(MAX_URL_LEN));
        assert!(validate_url(&url).is_err());
    }
}
