use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

/// HTTP服务配置
///
/// 认证由上游代理完成，本服务只读取代理注入的角色与用户请求头。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    pub bind_address: String,
    pub cors_enabled: bool,
    pub request_timeout_seconds: u64,
    pub role_header: String,
    pub user_header: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            cors_enabled: true,
            request_timeout_seconds: 30,
            role_header: "x-machinatrack-role".to_string(),
            user_header: "x-machinatrack-user".to_string(),
        }
    }
}

impl ConfigValidator for ApiConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_bind_address(&self.bind_address, "api.bind_address")?;
        ValidationUtils::validate_timeout_seconds(
            self.request_timeout_seconds,
            "api.request_timeout_seconds",
        )?;
        ValidationUtils::validate_header_name(&self.role_header, "api.role_header")?;
        ValidationUtils::validate_header_name(&self.user_header, "api.user_header")?;

        if self.role_header == self.user_header {
            return Err(crate::ConfigError::Validation(
                "api.role_header and api.user_header must differ".to_string(),
            ));
        }
        Ok(())
    }
}
