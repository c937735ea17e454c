//! 记录 ID

use uuid::Uuid;

/// 生成 `<prefix>_<32位十六进制>` 形式的 ID
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// 请求体中给出的非空值优先，否则使用当前登录用户
pub fn actor_or(explicit: Option<String>, actor: &str) -> String {
    explicit
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| actor.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix_and_are_unique() {
        let a = new_id("app");
        let b = new_id("app");
        assert!(a.starts_with("app_"));
        assert_eq!(a.len(), "app_".len() + 32);
        assert_ne!(a, b);
    }

    #[test]
    fn explicit_actor_wins_unless_blank() {
        assert_eq!(actor_or(Some("u1".into()), "me"), "u1");
        assert_eq!(actor_or(Some("  ".into()), "me"), "me");
        assert_eq!(actor_or(None, "me"), "me");
    }
}
