//! 基于请求头的角色鉴权
//!
//! 身份认证由上游反向代理完成，代理把角色和用户名写入请求头
//! （默认 `x-machinatrack-role` / `x-machinatrack-user`，可通过 `api` 配置修改）。
//! 本模块只负责解析这两个请求头并按角色权限矩阵放行或拒绝。

use axum::{extract::FromRequestParts, http::request::Parts};
use machinatrack_domain::{Permission, Role, TrackError};
use tracing::warn;

use crate::{error::ApiError, routes::AppState};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("缺少角色请求头")]
    MissingRole,
    #[error("未知角色: {0}")]
    UnknownRole(String),
}

/// 当前请求的操作者
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub role: Role,
    pub user: Option<String>,
}

impl Actor {
    pub fn new(role: Role, user: Option<String>) -> Self {
        Self { role, user }
    }

    pub fn name(&self) -> &str {
        self.user.as_deref().unwrap_or("anonymous")
    }

    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            warn!(
                user = self.name(),
                role = %self.role,
                permission = ?permission,
                "权限不足，拒绝请求"
            );
            Err(TrackError::Permission(format!(
                "角色 {} 缺少 {permission:?} 权限",
                self.role
            ))
            .into())
        }
    }

    pub fn require_all(&self, permissions: &[Permission]) -> Result<(), ApiError> {
        permissions.iter().try_for_each(|p| self.require(*p))
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let api = &state.config.api;

        let raw_role = parts
            .headers
            .get(api.role_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingRole)?;

        let role = raw_role
            .parse::<Role>()
            .map_err(|_| AuthError::UnknownRole(raw_role.to_string()))?;

        let user = parts
            .headers
            .get(api.user_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(Actor::new(role, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_cannot_write() {
        let actor = Actor::new(Role::Viewer, Some("alice".to_string()));
        assert!(actor.require(Permission::EquipmentRead).is_ok());
        assert!(matches!(
            actor.require(Permission::EquipmentWrite),
            Err(ApiError::Track(TrackError::Permission(_)))
        ));
    }

    #[test]
    fn test_require_all() {
        let operator = Actor::new(Role::Operator, None);
        assert!(operator
            .require_all(&[Permission::MaintenanceWrite, Permission::MetrologyWrite])
            .is_err());

        let manager = Actor::new(Role::Manager, None);
        assert!(manager
            .require_all(&[Permission::MaintenanceWrite, Permission::MetrologyWrite])
            .is_ok());
    }

    #[test]
    fn test_anonymous_name() {
        assert_eq!(Actor::new(Role::Admin, None).name(), "anonymous");
    }
}
