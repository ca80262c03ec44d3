// ==========================================
// 维修门店分析驾驶舱 - 维修记录实体
// ==========================================
// 对应表: repair_operations
// 生命周期: 不存在 -> 有效 -> (修改)* -> 删除
// 约束: if_repair_successful=1 的记录不可删除（保留审计历史）
// ==========================================

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Unexpected};
use serde::{Deserialize, Serialize};

// ==========================================
// RepairDraft - 新建维修记录请求（未校验）
// ==========================================
// 所有字段可缺省，缺失项由 repair_rules 统一校验并给出原因
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairDraft {
    pub model_id: Option<i64>,
    pub service_id: Option<i64>,
    pub part_id: Option<i64>,
    /// YYYY-MM-DD（允许带时间部分，按日截断）
    pub operation_date: Option<String>,
    pub service_cost: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub if_repair_successful: Option<bool>,
}

// ==========================================
// NewRepair - 通过校验的新建记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRepair {
    pub model_id: i64,
    pub service_id: i64,
    pub part_id: i64,
    pub operation_date: NaiveDate,
    pub service_cost: Option<f64>,
    pub if_repair_successful: bool,
}

// ==========================================
// RepairPatch - 维修记录部分更新
// ==========================================
// None 表示保持原值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairPatch {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub if_repair_successful: Option<bool>,
    pub service_cost: Option<f64>,
    /// 维修耗时（分钟）
    pub service_time: Option<i64>,
}

// ==========================================
// RepairDetail - 单条维修记录（含关联名称）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairDetail {
    pub operation_id: i64,
    pub model_id: i64,
    pub service_id: i64,
    pub part_id: i64,
    pub operation_date: NaiveDate,
    pub service_cost: Option<f64>,
    pub service_time: Option<i64>,
    pub if_repair_successful: bool,
    pub model_name: String,
    pub service_name: String,
    pub part_name: String,
}

// ==========================================
// RepairSummary - 列表视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairSummary {
    pub operation_id: i64,
    pub operation_date: NaiveDate,
    pub service_cost: Option<f64>,
    pub if_repair_successful: bool,
    pub model_name: String,
    pub service_name: String,
    pub part_name: String,
}

// ==========================================
// MutationGuard - 修改/删除前的守卫状态
// ==========================================
// 由仓储层一次查询得到，业务层据此判定拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationGuard {
    /// 记录不存在
    Missing,
    /// 记录存在
    Present {
        /// 是否已标记维修成功（禁止删除）
        successful: bool,
        /// 是否挂有 CRITICAL/HIGH 异常（禁止修改）
        frozen: bool,
    },
}

// ==========================================
// 维修成功标记反序列化
// ==========================================
// 库中以 0/1 存储，请求体可传 true/false 或 0/1；其他整数拒绝
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(value)) => Ok(Some(value)),
        Some(Flag::Int(0)) => Ok(Some(false)),
        Some(Flag::Int(1)) => Ok(Some(true)),
        Some(Flag::Int(other)) => Err(de::Error::invalid_value(
            Unexpected::Signed(other),
            &"true/false 或 0/1",
        )),
    }
}
