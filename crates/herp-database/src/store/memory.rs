//! In-memory store for tests and database-less local runs.
//!
//! Mirrors the PostgreSQL semantics the auth core relies on: case-insensitive
//! lookups, unique usernames/emails/token digests, idempotent grants, and
//! conditional one-time-code updates.
//!
//! Audit tables keep only the newest [`AUDIT_CAPACITY`] rows each.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use herp_core::error::AppError;
use herp_core::result::AppResult;
use herp_core::types::{Page, PageRequest};
use herp_entity::audit::{ActivityLog, CreateActivityLog, CreateLoginHistory, LoginHistory};
use herp_entity::principal::{Admin, CreateAdmin, CreateUser, PrincipalRef, UpdateUser, User};
use herp_entity::role::{CreateRole, Permission, Role, UpdateRole, codes};
use herp_entity::session::{CreateRefreshToken, RefreshToken};

use super::{AuditStore, PrincipalStore, RefreshTokenStore, RoleStore};

/// Rows kept per audit table before the oldest are dropped.
pub const AUDIT_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct Tables {
    roles: BTreeMap<i32, Role>,
    permissions: BTreeMap<i32, Permission>,
    grants: BTreeSet<(i32, i32)>,
    users: BTreeMap<i32, User>,
    admins: BTreeMap<i32, Admin>,
    refresh_tokens: BTreeMap<i64, RefreshToken>,
    login_history: Vec<LoginHistory>,
    activity: Vec<ActivityLog>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn role_name(&self, role_id: i32) -> AppResult<String> {
        self.roles
            .get(&role_id)
            .map(|r| r.name.clone())
            .ok_or_else(|| AppError::conflict(format!("Role {role_id} does not exist")))
    }

    fn username_taken(&self, username: &str, except_user: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except_user && u.username.eq_ignore_ascii_case(username))
    }

    fn user_email_taken(&self, email: &str, except_user: Option<i32>) -> bool {
        self.users.values().any(|u| {
            Some(u.id) != except_user
                && u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email))
        })
    }

    /// Re-read the role name so renamed roles show through, as a join would.
    fn user_view(&self, user: &User) -> User {
        let mut user = user.clone();
        if let Some(role) = self.roles.get(&user.role_id) {
            user.role_name = role.name.clone();
        }
        user
    }

    fn admin_view(&self, admin: &Admin) -> Admin {
        let mut admin = admin.clone();
        if let Some(role) = self.roles.get(&admin.role_id) {
            admin.role_name = role.name.clone();
        }
        admin
    }
}

/// A process-local implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// An empty store with no roles or permissions.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the same roles, permissions, and grants as the
    /// initial migration: `admin` (id 1) with every permission and
    /// `pos_staff` (id 2) with `pos:sell` and `pos:view`.
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut t = store.lock();
            let now = Utc::now();
            for (id, name, description) in [
                (1, "admin", "Full administrative access"),
                (2, "pos_staff", "Point-of-sale staff"),
            ] {
                t.roles.insert(
                    id,
                    Role {
                        id,
                        name: name.to_string(),
                        description: Some(description.to_string()),
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
            let all = [
                codes::POS_SELL,
                codes::POS_VIEW,
                codes::POS_MANAGE_ITEMS,
                codes::BOOKING_CREATE,
                codes::BOOKING_MANAGE,
                codes::ADMIN_MANAGE,
            ];
            for (idx, code) in all.iter().enumerate() {
                let id = idx as i32 + 1;
                t.permissions.insert(
                    id,
                    Permission {
                        id,
                        code: code.to_string(),
                        description: None,
                    },
                );
                t.grants.insert((1, id));
            }
            t.grants.insert((2, 1));
            t.grants.insert((2, 2));
            t.next_id = 100;
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a permission code directly.
    pub fn insert_permission(&self, code: &str) -> Permission {
        let mut t = self.lock();
        let id = t.next_id() as i32;
        let permission = Permission {
            id,
            code: code.to_string(),
            description: None,
        };
        t.permissions.insert(id, permission.clone());
        permission
    }

    /// All refresh-token rows, revoked or not.
    pub fn refresh_tokens(&self) -> Vec<RefreshToken> {
        self.lock().refresh_tokens.values().cloned().collect()
    }

    /// All recorded login attempts, oldest first.
    pub fn login_history(&self) -> Vec<LoginHistory> {
        self.lock().login_history.clone()
    }

    /// All recorded activity, oldest first.
    pub fn activity(&self) -> Vec<ActivityLog> {
        self.lock().activity.clone()
    }

    /// Flip an admin's active flag.
    pub fn set_admin_active(&self, admin_id: i32, active: bool) {
        if let Some(admin) = self.lock().admins.get_mut(&admin_id) {
            admin.is_active = active;
        }
    }
}

fn paginate<T: Clone>(rows: &[T], page: PageRequest) -> Page<T> {
    let items = rows
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Page::new(items, page, rows.len() as u64)
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let t = self.lock();
        Ok(t.users.get(&id).map(|u| t.user_view(u)))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let t = self.lock();
        Ok(t.users
            .values()
            .find(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            .map(|u| t.user_view(u)))
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let t = self.lock();
        Ok(t.users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .map(|u| t.user_view(u)))
    }

    async fn list_users(&self, page: PageRequest) -> AppResult<Page<User>> {
        let t = self.lock();
        let rows: Vec<User> = t.users.values().map(|u| t.user_view(u)).collect();
        Ok(paginate(&rows, page))
    }

    async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        let mut t = self.lock();
        if t.username_taken(&data.username, None)
            || data.email.as_deref().is_some_and(|e| t.user_email_taken(e, None))
        {
            return Err(AppError::conflict("Failed to create user: resource already exists"));
        }
        let role_name = t.role_name(data.role_id)?;
        let id = t.next_id() as i32;
        let now = Utc::now();
        let user = User {
            id,
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            first_name: data.first_name,
            last_name: data.last_name,
            role_id: data.role_id,
            role_name,
            is_active: data.is_active,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i32, data: UpdateUser) -> AppResult<Option<User>> {
        let mut t = self.lock();
        if !t.users.contains_key(&id) {
            return Ok(None);
        }
        if data.username.as_deref().is_some_and(|u| t.username_taken(u, Some(id)))
            || data.email.as_deref().is_some_and(|e| t.user_email_taken(e, Some(id)))
        {
            return Err(AppError::conflict("Failed to update user: resource already exists"));
        }
        if let Some(role_id) = data.role_id {
            t.role_name(role_id)?;
        }
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = data.username {
            user.username = v;
        }
        if let Some(v) = data.email {
            user.email = Some(v);
        }
        if let Some(v) = data.first_name {
            user.first_name = Some(v);
        }
        if let Some(v) = data.last_name {
            user.last_name = Some(v);
        }
        if let Some(v) = data.role_id {
            user.role_id = v;
        }
        if let Some(v) = data.is_active {
            user.is_active = v;
        }
        user.updated_at = Utc::now();
        let user = user.clone();
        Ok(Some(t.user_view(&user)))
    }

    async fn update_user_password(&self, id: i32, password_hash: &str) -> AppResult<bool> {
        let mut t = self.lock();
        Ok(match t.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_user(&self, id: i32) -> AppResult<bool> {
        Ok(self.lock().users.remove(&id).is_some())
    }

    async fn find_admin_by_id(&self, id: i32) -> AppResult<Option<Admin>> {
        let t = self.lock();
        Ok(t.admins.get(&id).map(|a| t.admin_view(a)))
    }

    async fn find_admin_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let t = self.lock();
        Ok(t.admins
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .map(|a| t.admin_view(a)))
    }

    async fn find_admin_by_username(&self, username: &str) -> AppResult<Option<Admin>> {
        let t = self.lock();
        Ok(t.admins
            .values()
            .find(|a| a.username.eq_ignore_ascii_case(username))
            .map(|a| t.admin_view(a)))
    }

    async fn create_admin(&self, data: CreateAdmin) -> AppResult<Admin> {
        let mut t = self.lock();
        if t.admins.values().any(|a| {
            a.username.eq_ignore_ascii_case(&data.username)
                || a.email.eq_ignore_ascii_case(&data.email)
        }) {
            return Err(AppError::conflict("Failed to create admin: resource already exists"));
        }
        let role_name = t.role_name(data.role_id)?;
        let id = t.next_id() as i32;
        let now = Utc::now();
        let admin = Admin {
            id,
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            first_name: data.first_name,
            last_name: data.last_name,
            role_id: data.role_id,
            role_name,
            is_active: true,
            email_verified: false,
            verification_code: None,
            verification_expires_at: None,
            reset_code: None,
            reset_code_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        t.admins.insert(id, admin.clone());
        Ok(admin)
    }

    async fn set_verification_code(
        &self,
        admin_id: i32,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(admin) = self.lock().admins.get_mut(&admin_id) {
            admin.verification_code = Some(code.to_string());
            admin.verification_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn confirm_email(
        &self,
        admin_id: i32,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut t = self.lock();
        let Some(admin) = t.admins.get_mut(&admin_id) else {
            return Ok(false);
        };
        if admin.email_verified || !admin.verification_code_matches(code, now) {
            return Ok(false);
        }
        admin.email_verified = true;
        admin.verification_code = None;
        admin.verification_expires_at = None;
        admin.updated_at = now;
        Ok(true)
    }

    async fn mark_email_verified(&self, admin_id: i32, now: DateTime<Utc>) -> AppResult<bool> {
        let mut t = self.lock();
        let Some(admin) = t.admins.get_mut(&admin_id) else {
            return Ok(false);
        };
        admin.email_verified = true;
        admin.verification_code = None;
        admin.verification_expires_at = None;
        admin.updated_at = now;
        Ok(true)
    }

    async fn set_reset_code(
        &self,
        admin_id: i32,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(admin) = self.lock().admins.get_mut(&admin_id) {
            admin.reset_code = Some(code.to_string());
            admin.reset_code_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn reset_admin_password(
        &self,
        admin_id: i32,
        code: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut t = self.lock();
        let Some(admin) = t.admins.get_mut(&admin_id) else {
            return Ok(false);
        };
        if !admin.reset_code_matches(code, now) {
            return Ok(false);
        }
        admin.password_hash = password_hash.to_string();
        admin.reset_code = None;
        admin.reset_code_expires_at = None;
        admin.updated_at = now;
        Ok(true)
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.lock().roles.values().cloned().collect())
    }

    async fn find_role(&self, id: i32) -> AppResult<Option<Role>> {
        Ok(self.lock().roles.get(&id).cloned())
    }

    async fn create_role(&self, data: CreateRole) -> AppResult<Role> {
        let mut t = self.lock();
        if t.roles.values().any(|r| r.name == data.name) {
            return Err(AppError::conflict("Failed to create role: resource already exists"));
        }
        let id = t.next_id() as i32;
        let now = Utc::now();
        let role = Role {
            id,
            name: data.name,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        t.roles.insert(id, role.clone());
        Ok(role)
    }

    async fn update_role(&self, id: i32, data: UpdateRole) -> AppResult<Option<Role>> {
        let mut t = self.lock();
        if let Some(name) = &data.name {
            if t.roles.values().any(|r| r.id != id && &r.name == name) {
                return Err(AppError::conflict("Failed to update role: resource already exists"));
            }
        }
        Ok(t.roles.get_mut(&id).map(|role| {
            if let Some(v) = data.name {
                role.name = v;
            }
            if let Some(v) = data.description {
                role.description = Some(v);
            }
            role.updated_at = Utc::now();
            role.clone()
        }))
    }

    async fn delete_role(&self, id: i32) -> AppResult<bool> {
        let mut t = self.lock();
        if t.users.values().any(|u| u.role_id == id) || t.admins.values().any(|a| a.role_id == id)
        {
            return Err(AppError::conflict(
                "Failed to delete role: resource is still referenced or references a missing row",
            ));
        }
        t.grants.retain(|(role_id, _)| *role_id != id);
        Ok(t.roles.remove(&id).is_some())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let mut all: Vec<Permission> = self.lock().permissions.values().cloned().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(all)
    }

    async fn find_permission(&self, id: i32) -> AppResult<Option<Permission>> {
        Ok(self.lock().permissions.get(&id).cloned())
    }

    async fn role_permissions(&self, role_id: i32) -> AppResult<Vec<Permission>> {
        let t = self.lock();
        let mut granted: Vec<Permission> = t
            .grants
            .iter()
            .filter(|(r, _)| *r == role_id)
            .filter_map(|(_, p)| t.permissions.get(p).cloned())
            .collect();
        granted.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(granted)
    }

    async fn permission_codes(&self, role_id: i32) -> AppResult<Vec<String>> {
        let codes: BTreeSet<String> = self
            .role_permissions(role_id)
            .await?
            .into_iter()
            .map(|p| p.code)
            .collect();
        Ok(codes.into_iter().collect())
    }

    async fn add_role_permission(&self, role_id: i32, permission_id: i32) -> AppResult<()> {
        let mut t = self.lock();
        if !t.roles.contains_key(&role_id) || !t.permissions.contains_key(&permission_id) {
            return Err(AppError::conflict(
                "Failed to add role permission: resource is still referenced or references a missing row",
            ));
        }
        t.grants.insert((role_id, permission_id));
        Ok(())
    }

    async fn remove_role_permission(&self, role_id: i32, permission_id: i32) -> AppResult<bool> {
        Ok(self.lock().grants.remove(&(role_id, permission_id)))
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create_refresh_token(&self, data: CreateRefreshToken) -> AppResult<RefreshToken> {
        let mut t = self.lock();
        if t.refresh_tokens.values().any(|r| r.token_hash == data.token_hash) {
            return Err(AppError::conflict(
                "Failed to create refresh token: resource already exists",
            ));
        }
        let id = t.next_id();
        let now = Utc::now();
        let row = RefreshToken {
            id,
            principal_kind: data.principal.kind,
            principal_id: data.principal.id,
            token_hash: data.token_hash,
            expires_at: data.expires_at,
            revoked: false,
            created_at: now,
            updated_at: now,
        };
        t.refresh_tokens.insert(id, row.clone());
        Ok(row)
    }

    async fn find_active_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<RefreshToken>> {
        Ok(self
            .lock()
            .refresh_tokens
            .values()
            .find(|r| r.token_hash == token_hash && r.is_usable(now))
            .cloned())
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> AppResult<()> {
        let mut t = self.lock();
        for row in t.refresh_tokens.values_mut() {
            if row.token_hash == token_hash {
                row.revoked = true;
            }
        }
        Ok(())
    }

    async fn revoke_all_refresh_tokens(&self, principal: PrincipalRef) -> AppResult<u64> {
        let mut t = self.lock();
        let mut count = 0;
        for row in t.refresh_tokens.values_mut() {
            if row.principal() == principal && !row.revoked {
                row.revoked = true;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn delete_expired_or_revoked(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut t = self.lock();
        let before = t.refresh_tokens.len();
        t.refresh_tokens.retain(|_, row| row.is_usable(now));
        Ok((before - t.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn record_login(&self, entry: CreateLoginHistory) -> AppResult<()> {
        let mut t = self.lock();
        let id = t.next_id();
        let row = LoginHistory {
            id,
            principal_kind: entry.principal_kind,
            principal_id: entry.principal_id,
            identifier: entry.identifier,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            success: entry.outcome.is_success(),
            reason: (!entry.outcome.is_success()).then(|| entry.outcome.as_str().to_string()),
            created_at: Utc::now(),
        };
        push_capped(&mut t.login_history, row, AUDIT_CAPACITY);
        Ok(())
    }

    async fn record_activity(&self, entry: CreateActivityLog) -> AppResult<()> {
        let mut t = self.lock();
        let id = t.next_id();
        let row = ActivityLog {
            id,
            actor_kind: entry.actor_kind,
            actor_id: entry.actor_id,
            action: entry.action,
            target_type: entry.target_type,
            target_id: entry.target_id,
            details: entry.details,
            ip_address: entry.ip_address,
            created_at: Utc::now(),
        };
        push_capped(&mut t.activity, row, AUDIT_CAPACITY);
        Ok(())
    }

    async fn list_login_history(&self, page: PageRequest) -> AppResult<Page<LoginHistory>> {
        let rows: Vec<LoginHistory> = self.lock().login_history.iter().rev().cloned().collect();
        Ok(paginate(&rows, page))
    }

    async fn list_activity(
        &self,
        actor: PrincipalRef,
        page: PageRequest,
    ) -> AppResult<Page<ActivityLog>> {
        let rows: Vec<ActivityLog> = self
            .lock()
            .activity
            .iter()
            .rev()
            .filter(|a| a.actor_kind == actor.kind && a.actor_id == actor.id)
            .cloned()
            .collect();
        Ok(paginate(&rows, page))
    }
}

fn push_capped<T>(rows: &mut Vec<T>, row: T, capacity: usize) {
    rows.push(row);
    if rows.len() > capacity {
        let excess = rows.len() - capacity;
        rows.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use herp_core::ErrorKind;
    use herp_entity::audit::LoginOutcome;

    fn new_user(username: &str, email: Option<&str>) -> CreateUser {
        CreateUser {
            username: username.into(),
            email: email.map(Into::into),
            password_hash: "hash".into(),
            first_name: None,
            last_name: None,
            role_id: 2,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_user_lookup_is_case_insensitive() {
        let store = MemoryStore::seeded();
        store
            .create_user(new_user("Frontdesk", Some("Desk@Hotel.com")))
            .await
            .unwrap();

        let by_email = store.find_user_by_email("desk@hotel.com").await.unwrap();
        let by_name = store.find_user_by_username("FRONTDESK").await.unwrap();
        assert_eq!(by_email.unwrap().role_name, "pos_staff");
        assert!(by_name.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::seeded();
        store.create_user(new_user("a", None)).await.unwrap();
        let err = store.create_user(new_user("A", None)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_permission_codes_are_distinct_and_sorted() {
        let store = MemoryStore::seeded();
        store.add_role_permission(2, 1).await.unwrap();
        let codes = store.permission_codes(2).await.unwrap();
        assert_eq!(codes, vec!["pos:sell".to_string(), "pos:view".to_string()]);
    }

    #[tokio::test]
    async fn test_refresh_token_lifecycle() {
        let store = MemoryStore::seeded();
        let now = Utc::now();
        let principal = PrincipalRef::user(1);
        for (hash, ttl) in [("live", 60), ("stale", -60)] {
            store
                .create_refresh_token(CreateRefreshToken {
                    principal,
                    token_hash: hash.into(),
                    expires_at: now + Duration::seconds(ttl),
                })
                .await
                .unwrap();
        }

        assert!(store.find_active_refresh_token("live", now).await.unwrap().is_some());
        assert!(store.find_active_refresh_token("stale", now).await.unwrap().is_none());

        assert_eq!(store.revoke_all_refresh_tokens(principal).await.unwrap(), 2);
        assert!(store.find_active_refresh_token("live", now).await.unwrap().is_none());
        assert_eq!(store.delete_expired_or_revoked(now).await.unwrap(), 2);
        assert!(store.refresh_tokens().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_token_hash_conflicts() {
        let store = MemoryStore::new();
        let data = CreateRefreshToken {
            principal: PrincipalRef::admin(1),
            token_hash: "same".into(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        store.create_refresh_token(data.clone()).await.unwrap();
        let err = store.create_refresh_token(data).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_role_in_use_cannot_be_deleted() {
        let store = MemoryStore::seeded();
        store.create_user(new_user("a", None)).await.unwrap();
        let err = store.delete_role(2).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[test]
    fn test_push_capped_drops_oldest() {
        let mut rows = Vec::new();
        for n in 0..7 {
            push_capped(&mut rows, n, 3);
        }
        assert_eq!(rows, vec![4, 5, 6]);
    }

    #[tokio::test]
    async fn test_login_history_is_bounded() {
        let store = MemoryStore::new();
        for n in 0..AUDIT_CAPACITY + 5 {
            store
                .record_login(CreateLoginHistory {
                    principal_kind: None,
                    principal_id: None,
                    identifier: format!("guest{n}@hotel.com"),
                    ip_address: None,
                    user_agent: None,
                    outcome: LoginOutcome::UnknownIdentifier,
                })
                .await
                .unwrap();
        }

        let rows = store.login_history();
        assert_eq!(rows.len(), AUDIT_CAPACITY);
        assert_eq!(rows[0].identifier, "guest5@hotel.com");
    }

    #[tokio::test]
    async fn test_mark_email_verified_clears_pending_code() {
        let store = MemoryStore::seeded();
        let admin = store
            .create_admin(CreateAdmin {
                username: "ops".into(),
                email: "ops@hotel.com".into(),
                password_hash: "hash".into(),
                first_name: None,
                last_name: None,
                role_id: 1,
            })
            .await
            .unwrap();
        let now = Utc::now();
        store
            .set_verification_code(admin.id, "1234567", now + Duration::minutes(10))
            .await
            .unwrap();

        assert!(store.mark_email_verified(admin.id, now).await.unwrap());
        assert!(!store.mark_email_verified(9999, now).await.unwrap());

        let admin = store.find_admin_by_id(admin.id).await.unwrap().unwrap();
        assert!(admin.email_verified);
        assert!(admin.verification_code.is_none());
        assert!(!store.confirm_email(admin.id, "1234567", now).await.unwrap());
    }
}
