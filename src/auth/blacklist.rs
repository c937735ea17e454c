//! 令牌黑名单，条目在令牌自身的 `exp` 到期后自动淘汰

use moka::{future::Cache, Expiry};
use std::time::{Duration, Instant};

struct UntilTokenExpiry;

impl Expiry<String, Instant> for UntilTokenExpiry {
    fn expire_after_create(
        &self,
        _token: &String,
        deadline: &Instant,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(deadline.saturating_duration_since(created_at))
    }
}

#[derive(Clone)]
pub struct TokenBlacklist {
    cache: Cache<String, Instant>,
}

impl TokenBlacklist {
    /// 不设容量上限，条目只会因令牌到期而淘汰
    pub fn new() -> Self {
        let cache = Cache::builder().expire_after(UntilTokenExpiry).build();
        Self { cache }
    }

    /// `expires_at` 为 Unix 秒，已过期的令牌无需记录
    pub async fn revoke(&self, token: &str, expires_at: i64) {
        let remaining = expires_at - chrono::Utc::now().timestamp();
        if remaining <= 0 {
            return;
        }
        let deadline = Instant::now() + Duration::from_secs(remaining as u64);
        self.cache.insert(token.to_string(), deadline).await;
    }

    pub async fn is_revoked(&self, token: &str) -> bool {
        match self.cache.get(token).await {
            Some(deadline) => deadline > Instant::now(),
            None => false,
        }
    }
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoked_tokens_are_reported() {
        let blacklist = TokenBlacklist::new();
        let exp = chrono::Utc::now().timestamp() + 3600;

        assert!(!blacklist.is_revoked("t1").await);
        blacklist.revoke("t1", exp).await;
        assert!(blacklist.is_revoked("t1").await);
        assert!(!blacklist.is_revoked("t2").await);
    }

    #[tokio::test]
    async fn already_expired_tokens_are_skipped() {
        let blacklist = TokenBlacklist::new();
        blacklist
            .revoke("old", chrono::Utc::now().timestamp() - 5)
            .await;
        assert!(!blacklist.is_revoked("old").await);
    }

    #[tokio::test]
    async fn revocations_survive_a_large_blacklist() {
        let blacklist = TokenBlacklist::new();
        let exp = chrono::Utc::now().timestamp() + 3600;
        for i in 0..500 {
            blacklist.revoke(&format!("token_{i}"), exp).await;
            blacklist.cache.run_pending_tasks().await;
        }
        blacklist.revoke("last", exp).await;
        blacklist.cache.run_pending_tasks().await;

        assert!(blacklist.is_revoked("last").await);
        for i in 0..500 {
            assert!(blacklist.is_revoked(&format!("token_{i}")).await);
        }
    }
}
