use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

const MAX_LEAD_DAYS: u32 = 365;

/// 到期预警窗口配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulingConfig {
    /// 保养任务"即将到期"提前天数
    pub maintenance_lead_days: u32,
    /// 量具校准"即将到期"提前天数
    pub calibration_lead_days: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            maintenance_lead_days: 7,
            calibration_lead_days: 7,
        }
    }
}

impl ConfigValidator for SchedulingConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_days(
            self.maintenance_lead_days,
            MAX_LEAD_DAYS,
            "scheduling.maintenance_lead_days",
        )?;
        ValidationUtils::validate_days(
            self.calibration_lead_days,
            MAX_LEAD_DAYS,
            "scheduling.calibration_lead_days",
        )?;
        Ok(())
    }
}
