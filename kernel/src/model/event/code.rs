use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 3;

// 例: EVT-JAN2026-X3B
// 一意性はストレージの一意制約に任せる（衝突時はリトライせず失敗を返す）
pub fn generate(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect();
    format!("EVT-{}{}-{}", MONTHS[now.month0() as usize], now.year(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn code_carries_month_year_and_random_suffix() {
        let now = Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap();
        let code = generate(now);
        assert!(code.starts_with("EVT-AUG2026-"));
        let suffix = code.strip_prefix("EVT-AUG2026-").unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    }

    #[test]
    fn december_uses_the_last_month_abbreviation() {
        let now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        assert!(generate(now).starts_with("EVT-DEC2025-"));
    }
}
