//! 响应体与组件（widget）
//!
//! 成功的响应里应当包含三个组件：`media_segments`、`sentiment`、
//! `platform_heat_spike_map`，位于输出文档的 `content` 对象下。

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MEDIA_SEGMENTS: &str = "media_segments";
pub const SENTIMENT: &str = "sentiment";
pub const PLATFORM_HEAT_SPIKE_MAP: &str = "platform_heat_spike_map";

/// 在边界处对输出文档分类后的响应体
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// 输出为空、不是对象，或 `content` 不是对象
    Unknown,
    /// `content` 是对象；三个组件各自可能缺失
    StructuredReport {
        media_segments: Option<Value>,
        sentiment: Option<Value>,
        platform_heat_spike_map: Option<Value>,
    },
}

impl ResponseBody {
    pub fn classify(output: Option<&Value>) -> Self {
        let Some(document) = output.and_then(Value::as_object) else {
            return ResponseBody::Unknown;
        };

        // 缺少 content 时按空对象处理
        let content = match document.get("content") {
            None => return ResponseBody::StructuredReport {
                media_segments: None,
                sentiment: None,
                platform_heat_spike_map: None,
            },
            Some(Value::Object(content)) => content,
            Some(_) => return ResponseBody::Unknown,
        };

        let field = |name: &str| content.get(name).filter(|v| !v.is_null()).cloned();

        ResponseBody::StructuredReport {
            media_segments: field(MEDIA_SEGMENTS),
            sentiment: field(SENTIMENT),
            platform_heat_spike_map: field(PLATFORM_HEAT_SPIKE_MAP),
        }
    }
}

/// 从响应中提取出的三个组件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedWidgets {
    pub media_segments: Option<Value>,
    pub sentiment: Option<Value>,
    pub platform_heat_spike_map: Option<Value>,
    pub extraction_success: bool,
}

impl ExtractedWidgets {
    /// 三个组件都为空
    pub fn empty() -> Self {
        Self {
            media_segments: None,
            sentiment: None,
            platform_heat_spike_map: None,
            extraction_success: false,
        }
    }

    /// 仅检查三个组件是否存在且非 null，不校验内部结构
    pub fn extract(output: Option<&Value>) -> Self {
        Self::from(ResponseBody::classify(output))
    }
}

impl From<ResponseBody> for ExtractedWidgets {
    fn from(body: ResponseBody) -> Self {
        match body {
            ResponseBody::Unknown => Self::empty(),
            ResponseBody::StructuredReport {
                media_segments,
                sentiment,
                platform_heat_spike_map,
            } => {
                let extraction_success = media_segments.is_some()
                    && sentiment.is_some()
                    && platform_heat_spike_map.is_some();
                Self {
                    media_segments,
                    sentiment,
                    platform_heat_spike_map,
                    extraction_success,
                }
            }
        }
    }
}
