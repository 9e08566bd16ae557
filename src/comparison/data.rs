//! 对比数据模型
//!
//! `ComparisonData` 总是整体替换，从不局部修改：
//! - 演示实例：启动时由 `ComparisonDataProvider` 产生，前后使用同一张图
//! - 结果实例：压缩成功后以“原图句柄 + 下载地址”整体替换演示实例

use serde::{Deserialize, Serialize};

use crate::compression::human_size;

pub const DEMO_BEFORE_LABEL: &str = "Original";
pub const DEMO_AFTER_LABEL: &str = "Compressed";

/// 标签中体积的小数位数
const LABEL_SIZE_DECIMALS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonData {
    pub before_url: String,
    pub after_url: String,
    pub before_label: String,
    pub after_label: String,
    pub is_demo: bool,
}

impl ComparisonData {
    /// 演示对比：同一张图同时作为前后两侧
    pub fn demo(image_url: impl Into<String>) -> Self {
        let url = image_url.into();
        Self {
            before_url: url.clone(),
            after_url: url,
            before_label: DEMO_BEFORE_LABEL.to_string(),
            after_label: DEMO_AFTER_LABEL.to_string(),
            is_demo: true,
        }
    }

    /// 压缩结果对比，标签形如 `Original (1.91 MB)` / `Compressed (900 KB)`
    pub fn for_compression(
        before_url: impl Into<String>,
        after_url: impl Into<String>,
        original_bytes: u64,
        compressed_bytes: u64,
    ) -> Self {
        Self {
            before_url: before_url.into(),
            after_url: after_url.into(),
            before_label: format!("Original ({})", human_size(original_bytes, LABEL_SIZE_DECIMALS)),
            after_label: format!("Compressed ({})", human_size(compressed_bytes, LABEL_SIZE_DECIMALS)),
            is_demo: false,
        }
    }
}
