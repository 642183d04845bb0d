// hash.rs - 内容指纹
//! 对笔记正文计算稳定的短指纹，用于跨运行去重
//!
//! 指纹只由去除首尾空白后的正文决定，元数据 (类型/位置/日期) 不参与

use sha2::{Digest, Sha256};

/// 指纹长度 (十六进制字符数)
pub const HASH_LEN: usize = 8;

/// 计算正文指纹: SHA-256 的前 8 位十六进制
///
/// 32 位空间对去重足够，不承担密码学职责
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(text.trim().as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(HASH_LEN);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(content_hash("hello world"), content_hash("hello world"));
    }

    #[test]
    fn test_hash_ignores_surrounding_whitespace() {
        assert_eq!(content_hash("A\n"), content_hash("A"));
        assert_eq!(content_hash("  text  "), content_hash("text"));
    }

    #[test]
    fn test_hash_shape() {
        let hash = content_hash("hello world");
        assert_eq!(hash.len(), HASH_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash.to_lowercase());
    }

    #[test]
    fn test_known_digest_prefix() {
        // SHA-256("hello world") = b94d27b9934d3e08...
        assert_eq!(content_hash("hello world"), "b94d27b9");
    }
}
