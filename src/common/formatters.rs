// src/common/formatters.rs

use chrono::{Datelike, NaiveDate};

const WEEKDAYS_JA: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

/// 2024/03/15
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// 2024年3月15日(金)
pub fn format_date_jp(date: NaiveDate) -> String {
    format!(
        "{}年{}月{}日({})",
        date.year(),
        date.month(),
        date.day(),
        WEEKDAYS_JA[date.weekday().num_days_from_sunday() as usize]
    )
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Hifeniza telefones japoneses de 10/11 dígitos. Qualquer outra coisa volta intacta.
pub fn format_phone(raw: &str) -> String {
    let digits = digits_only(raw);
    match digits.len() {
        11 => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
        // Tóquio e Osaka usam código de área de 2 dígitos
        10 if digits.starts_with("03") || digits.starts_with("06") => {
            format!("{}-{}-{}", &digits[..2], &digits[2..6], &digits[6..])
        }
        10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => raw.to_string(),
    }
}

/// Corta por caracteres (não bytes) e acrescenta reticências.
pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars).collect();
    out.push('…');
    out
}

/// `attachment; filename*=UTF-8''...` com o nome percent-encoded (nomes em japonês).
pub fn content_disposition(file_name: &str) -> String {
    let encoded: String = file_name
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect();
    format!("attachment; filename*=UTF-8''{}", encoded)
}
