//! 短 ID 生成
//!
//! 对原始 URL 做 SHA-256，取十六进制摘要的前 8 位。同一 URL 总是得到同一 ID，
//! 与所属用户无关，因此重复缩短会自然落到“已存在”分支。
//!
//! 8 位十六进制只有 32 bit 空间，不同 URL 撞到同一前缀时会被当作重复处理。

use sha2::{Digest, Sha256};

/// 短 ID 长度（十六进制字符数）
pub const SHORT_ID_LEN: usize = 8;

/// 由原始 URL 推导短 ID
pub fn generate_id(original_url: &str) -> String {
    let digest = Sha256::digest(original_url.as_bytes());
    // 4 字节正好编码为 8 个十六进制字符
    hex::encode(&digest[..SHORT_ID_LEN / 2])
}

/// 判断字符串是否是合法的短 ID 形态
pub fn is_valid_id(id: &str) -> bool {
    id.len() == SHORT_ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_deterministic() {
        let url = "https://console.yandex.cloud/";
        assert_eq!(generate_id(url), generate_id(url));
    }

    #[test]
    fn test_generate_id_length_and_alphabet() {
        let id = generate_id("https://example.com");
        assert_eq!(id.len(), SHORT_ID_LEN);
        assert!(is_valid_id(&id));
    }

    #[test]
    fn test_generate_id_known_vector() {
        // sha256("https://example.com") = 100680ad546ce6a5...
        assert_eq!(generate_id("https://example.com"), "100680ad");
    }

    #[test]
    fn test_distinct_urls_produce_distinct_ids() {
        let ids: std::collections::HashSet<String> = (0..1000)
            .map(|i| generate_id(&format!("https://example.com/{}", i)))
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("a1b2c3d4"));
        assert!(!is_valid_id("A1B2C3D4"));
        assert!(!is_valid_id("a1b2c3"));
        assert!(!is_valid_id("zzzzzzzz"));
    }
}
