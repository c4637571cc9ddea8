//! # 用户状态缓存
//!
//! API 密钥守卫每次请求都要确认令牌所有者是否启用。
//! 这里缓存一份轻量快照（启用状态、角色、分组），封禁 / 解封在 TTL 内生效即可。

use moka::future::Cache;
use std::time::Duration;

use super::permissions::{Role, UserStatus};
use crate::config::CacheConfig;
use crate::ldebug;
use crate::logging::{LogComponent, LogStage};

/// 用户快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    pub id: i32,
    pub username: String,
    pub role: i32,
    pub status: i32,
    pub group: String,
}

impl UserSnapshot {
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        UserStatus::from_i32(self.status).is_enabled()
    }

    /// 有效角色；存储值不在集合内时返回 `None`
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        Role::from_i32(self.role)
    }
}

impl From<&entity::users::Model> for UserSnapshot {
    fn from(user: &entity::users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            status: user.status,
            group: user.group.clone(),
        }
    }
}

/// 按用户 ID 缓存快照
#[derive(Clone)]
pub struct UserStatusCache {
    cache: Cache<i32, UserSnapshot>,
}

impl UserStatusCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.user_status_ttl(), config.user_status_max_entries)
    }

    pub async fn get(&self, user_id: i32) -> Option<UserSnapshot> {
        let hit = self.cache.get(&user_id).await;
        ldebug!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            "user_status_lookup",
            if hit.is_some() { "用户状态缓存命中" } else { "用户状态缓存未命中" },
            user_id = user_id
        );
        hit
    }

    pub async fn insert(&self, snapshot: UserSnapshot) {
        self.cache.insert(snapshot.id, snapshot).await;
    }

    /// 用户记录变更后调用
    pub async fn invalidate(&self, user_id: i32) {
        self.cache.invalidate(&user_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: i32, status: i32) -> UserSnapshot {
        UserSnapshot {
            id,
            username: format!("user{id}"),
            role: 1,
            status,
            group: "default".into(),
        }
    }

    #[tokio::test]
    async fn test_insert_get_invalidate() {
        let cache = UserStatusCache::new(Duration::from_secs(60), 100);
        assert!(cache.get(1).await.is_none());

        cache.insert(snapshot(1, 1)).await;
        let hit = cache.get(1).await.unwrap();
        assert!(hit.is_enabled());
        assert_eq!(hit.role(), Some(Role::Common));

        cache.invalidate(1).await;
        assert!(cache.get(1).await.is_none());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = UserStatusCache::new(Duration::from_millis(50), 100);
        cache.insert(snapshot(2, 2)).await;
        assert!(!cache.get(2).await.unwrap().is_enabled());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get(2).await.is_none());
    }
}
