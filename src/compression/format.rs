//! 体积文案格式化
//!
//! - `0` → `"0 Bytes"`
//! - `>= 1_000_000` → 强制 MB，数值按 `1024 × 1024` 换算，保留固定小数位（`1.91 MB`、`1.00 MB`）
//! - 其余按 1024 阈值选择单位：`< 1024` 为 Bytes，否则为 KB；KB 数值按 1000 换算并去掉末尾的 0（`900 KB`）
//!
//! MB 判定阈值是十进制、换算除数是二进制，两者不一致是沿用下来的显示行为，
//! 标签文案依赖它（`Compressed (900 KB)`），不要“顺手修正”。

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// 强制按 MB 显示的阈值（十进制）
const FORCE_MB_THRESHOLD: u64 = 1_000_000;
const MB_DIVISOR: f64 = 1024.0 * 1024.0;
const KB_DIVISOR: f64 = 1000.0;

/// 将字节数格式化为可读文案
pub fn human_size(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    if bytes >= FORCE_MB_THRESHOLD {
        return format!("{:.*} {}", decimals, bytes as f64 / MB_DIVISOR, UNITS[2]);
    }

    let tier = unit_tier(bytes);
    let value = match tier {
        0 => return format!("{} {}", bytes, UNITS[0]),
        1 => bytes as f64 / KB_DIVISOR,
        n => bytes as f64 / 1024f64.powi(n as i32),
    };
    format!("{} {}", trim_decimals(value, decimals), UNITS[tier])
}

/// 以 1024 为底选择单位档位
fn unit_tier(bytes: u64) -> usize {
    let mut tier = 0;
    let mut threshold = 1024u64;
    while tier + 1 < UNITS.len() && bytes >= threshold {
        tier += 1;
        threshold = threshold.saturating_mul(1024);
    }
    tier
}

/// 保留 `decimals` 位后去掉末尾多余的 0
fn trim_decimals(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value);
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_small_values_are_bytes() {
        assert_eq!(human_size(0, 2), "0 Bytes");
        assert_eq!(human_size(1, 2), "1 Bytes");
        assert_eq!(human_size(1023, 2), "1023 Bytes");
    }

    #[test]
    fn values_from_one_million_are_forced_to_mb() {
        assert_eq!(human_size(1_500_000, 2), "1.43 MB");
        assert_eq!(human_size(2_000_000, 2), "1.91 MB");
        assert_eq!(human_size(1_000_000, 2), "0.95 MB");
        assert_eq!(human_size(1_048_576, 2), "1.00 MB");
    }

    #[test]
    fn kilobyte_tier_drops_trailing_zeros() {
        assert_eq!(human_size(900_000, 2), "900 KB");
        assert_eq!(human_size(1024, 2), "1.02 KB");
        assert_eq!(human_size(999_999, 2), "1000 KB");
        assert_eq!(human_size(12_500, 2), "12.5 KB");
    }

    #[test]
    fn decimals_control_precision() {
        assert_eq!(human_size(1_500_000, 0), "1 MB");
        assert_eq!(human_size(12_345, 1), "12.3 KB");
    }
}
