use serde::{Deserialize, Serialize};

/// 操作权限
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    EquipmentRead,
    EquipmentWrite,
    EquipmentDelete,
    InventoryRead,
    InventoryWrite,
    InventoryDelete,
    MaintenanceRead,
    MaintenanceWrite,
    MaintenanceDelete,
    MetrologyRead,
    MetrologyWrite,
    MetrologyDelete,
    CalibrationRecord,
    SystemAdmin,
}

impl Permission {
    pub const ALL: [Permission; 14] = [
        Permission::EquipmentRead,
        Permission::EquipmentWrite,
        Permission::EquipmentDelete,
        Permission::InventoryRead,
        Permission::InventoryWrite,
        Permission::InventoryDelete,
        Permission::MaintenanceRead,
        Permission::MaintenanceWrite,
        Permission::MaintenanceDelete,
        Permission::MetrologyRead,
        Permission::MetrologyWrite,
        Permission::MetrologyDelete,
        Permission::CalibrationRecord,
        Permission::SystemAdmin,
    ];

    const READS: [Permission; 4] = [
        Permission::EquipmentRead,
        Permission::InventoryRead,
        Permission::MaintenanceRead,
        Permission::MetrologyRead,
    ];
}

/// 用户角色，由上游代理通过请求头传入
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Operator,
    Viewer,
}

impl Role {
    pub fn permissions(&self) -> Vec<Permission> {
        match self {
            Role::Admin => Permission::ALL.to_vec(),
            Role::Manager => Permission::ALL
                .into_iter()
                .filter(|p| *p != Permission::SystemAdmin)
                .collect(),
            Role::Operator => {
                let mut permissions = Permission::READS.to_vec();
                permissions.extend([
                    Permission::InventoryWrite,
                    Permission::MaintenanceWrite,
                    Permission::CalibrationRecord,
                ]);
                permissions
            }
            Role::Viewer => Permission::READS.to_vec(),
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Operator => "OPERATOR",
            Role::Viewer => "VIEWER",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// 大小写不敏感
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "OPERATOR" => Ok(Role::Operator),
            "VIEWER" => Ok(Role::Viewer),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
