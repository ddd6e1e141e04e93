//! 处理器档位与价格表

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use phf::phf_map;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AppError, ConfigError};

/// 远程服务提供的处理器档位（质量/价格预设）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorTier {
    Lite,
    Base,
    Core,
    Core2x,
    Pro,
    Ultra,
    Ultra2x,
    Ultra4x,
    Ultra8x,
}

/// 档位名称 -> 档位
static TIER_BY_NAME: phf::Map<&'static str, ProcessorTier> = phf_map! {
    "lite" => ProcessorTier::Lite,
    "base" => ProcessorTier::Base,
    "core" => ProcessorTier::Core,
    "core2x" => ProcessorTier::Core2x,
    "pro" => ProcessorTier::Pro,
    "ultra" => ProcessorTier::Ultra,
    "ultra2x" => ProcessorTier::Ultra2x,
    "ultra4x" => ProcessorTier::Ultra4x,
    "ultra8x" => ProcessorTier::Ultra8x,
};

impl ProcessorTier {
    /// 全部 9 个档位，按价格升序
    pub const ALL: [ProcessorTier; 9] = [
        ProcessorTier::Lite,
        ProcessorTier::Base,
        ProcessorTier::Core,
        ProcessorTier::Core2x,
        ProcessorTier::Pro,
        ProcessorTier::Ultra,
        ProcessorTier::Ultra2x,
        ProcessorTier::Ultra4x,
        ProcessorTier::Ultra8x,
    ];

    /// 深度研究档位
    pub const DEEP_RESEARCH: [ProcessorTier; 5] = [
        ProcessorTier::Pro,
        ProcessorTier::Ultra,
        ProcessorTier::Ultra2x,
        ProcessorTier::Ultra4x,
        ProcessorTier::Ultra8x,
    ];

    /// API 使用的档位 ID
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorTier::Lite => "lite",
            ProcessorTier::Base => "base",
            ProcessorTier::Core => "core",
            ProcessorTier::Core2x => "core2x",
            ProcessorTier::Pro => "pro",
            ProcessorTier::Ultra => "ultra",
            ProcessorTier::Ultra2x => "ultra2x",
            ProcessorTier::Ultra4x => "ultra4x",
            ProcessorTier::Ultra8x => "ultra8x",
        }
    }

    /// 标准单价（美元/次）
    pub fn list_price(&self) -> f64 {
        match self {
            ProcessorTier::Lite => 0.005,
            ProcessorTier::Base => 0.010,
            ProcessorTier::Core => 0.025,
            ProcessorTier::Core2x => 0.050,
            ProcessorTier::Pro => 0.100,
            ProcessorTier::Ultra => 0.300,
            ProcessorTier::Ultra2x => 0.600,
            ProcessorTier::Ultra4x => 1.200,
            ProcessorTier::Ultra8x => 2.400,
        }
    }
}

impl fmt::Display for ProcessorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessorTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TIER_BY_NAME
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| {
                AppError::Config(ConfigError::UnknownProcessor {
                    name: s.to_string(),
                })
            })
    }
}

/// 反序列化与 `FromStr` 一致：忽略首尾空白和大小写
impl<'de> Deserialize<'de> for ProcessorTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 结果记录中的处理器字段
///
/// 无法追溯到具体档位的失败记为 `unknown`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessorSlot {
    Tier(ProcessorTier),
    Unknown,
}

impl ProcessorSlot {
    pub const UNKNOWN_ID: &'static str = "unknown";

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorSlot::Tier(tier) => tier.as_str(),
            ProcessorSlot::Unknown => Self::UNKNOWN_ID,
        }
    }

    pub fn tier(&self) -> Option<ProcessorTier> {
        match self {
            ProcessorSlot::Tier(tier) => Some(*tier),
            ProcessorSlot::Unknown => None,
        }
    }
}

impl From<ProcessorTier> for ProcessorSlot {
    fn from(tier: ProcessorTier) -> Self {
        ProcessorSlot::Tier(tier)
    }
}

impl fmt::Display for ProcessorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProcessorSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProcessorSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == Self::UNKNOWN_ID {
            return Ok(ProcessorSlot::Unknown);
        }
        raw.parse::<ProcessorTier>()
            .map(ProcessorSlot::Tier)
            .map_err(serde::de::Error::custom)
    }
}

/// 档位价格表
///
/// 不可变，显式传给查询客户端和统计模块
#[derive(Debug, Clone, PartialEq)]
pub struct CostTable {
    prices: HashMap<ProcessorTier, f64>,
}

impl CostTable {
    /// 使用标准价格
    pub fn standard() -> Self {
        Self {
            prices: ProcessorTier::ALL
                .iter()
                .map(|tier| (*tier, tier.list_price()))
                .collect(),
        }
    }

    /// 覆盖部分档位的价格，其余沿用标准价格
    pub fn with_overrides(overrides: impl IntoIterator<Item = (ProcessorTier, f64)>) -> Self {
        let mut table = Self::standard();
        for (tier, price) in overrides {
            table.prices.insert(tier, price.max(0.0));
        }
        table
    }

    /// 单次调用成本；`unknown` 记为 0
    pub fn cost_of(&self, slot: ProcessorSlot) -> f64 {
        match slot {
            ProcessorSlot::Tier(tier) => self
                .prices
                .get(&tier)
                .copied()
                .unwrap_or_else(|| tier.list_price()),
            ProcessorSlot::Unknown => 0.0,
        }
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tier_names() {
        for tier in ProcessorTier::ALL {
            assert_eq!(tier.as_str().parse::<ProcessorTier>().unwrap(), tier);
        }
        assert_eq!(" ULTRA2X ".parse::<ProcessorTier>().unwrap(), ProcessorTier::Ultra2x);
        assert!("mega".parse::<ProcessorTier>().is_err());
    }

    #[test]
    fn test_deep_research_is_suffix_of_all() {
        assert_eq!(&ProcessorTier::ALL[4..], &ProcessorTier::DEEP_RESEARCH[..]);
    }

    #[test]
    fn test_tier_serde_uses_api_ids() {
        let json = serde_json::to_string(&ProcessorTier::Core2x).unwrap();
        assert_eq!(json, "\"core2x\"");
        let tier: ProcessorTier = serde_json::from_str("\"ultra8x\"").unwrap();
        assert_eq!(tier, ProcessorTier::Ultra8x);
    }

    #[test]
    fn test_tier_deserialize_matches_from_str() {
        let tier: ProcessorTier = serde_json::from_str("\" Pro \"").unwrap();
        assert_eq!(tier, ProcessorTier::Pro);
        let tier: ProcessorTier = serde_json::from_str("\"ULTRA4X\"").unwrap();
        assert_eq!(tier, ProcessorTier::Ultra4x);
        assert!(serde_json::from_str::<ProcessorTier>("\"mega\"").is_err());
    }

    #[test]
    fn test_slot_serde_with_unknown_sentinel() {
        let slots = vec![ProcessorSlot::Tier(ProcessorTier::Pro), ProcessorSlot::Unknown];
        let json = serde_json::to_string(&slots).unwrap();
        assert_eq!(json, r#"["pro","unknown"]"#);
        let back: Vec<ProcessorSlot> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slots);
        assert!(serde_json::from_str::<ProcessorSlot>("\"mega\"").is_err());
    }

    #[test]
    fn test_cost_table() {
        let table = CostTable::standard();
        assert_eq!(table.cost_of(ProcessorTier::Lite.into()), 0.005);
        assert_eq!(table.cost_of(ProcessorTier::Ultra8x.into()), 2.4);
        assert_eq!(table.cost_of(ProcessorSlot::Unknown), 0.0);

        let custom = CostTable::with_overrides([(ProcessorTier::Pro, 0.2)]);
        assert_eq!(custom.cost_of(ProcessorTier::Pro.into()), 0.2);
        assert_eq!(custom.cost_of(ProcessorTier::Base.into()), 0.01);
    }

    #[test]
    fn test_slot_order_follows_tier_order() {
        let mut slots = vec![
            ProcessorSlot::Unknown,
            ProcessorTier::Ultra.into(),
            ProcessorTier::Lite.into(),
        ];
        slots.sort();
        assert_eq!(
            slots,
            vec![
                ProcessorSlot::Tier(ProcessorTier::Lite),
                ProcessorSlot::Tier(ProcessorTier::Ultra),
                ProcessorSlot::Unknown,
            ]
        );
    }
}
