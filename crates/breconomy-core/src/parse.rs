//! 업스트림 응답 필드 파싱.
//!
//! 중앙은행 시계열 API는 날짜를 `DD/MM/YYYY`, 값을 `.` 구분 소수 문자열로 보냅니다.
//! 두 필드 모두 로케일과 무관하게 엄격히 해석합니다.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};

/// 업스트림 및 캐시 스냅샷의 기준일 형식.
pub const REFERENCE_DATE_FORMAT: &str = "%d/%m/%Y";

/// `DD/MM/YYYY` 문자열을 달력 날짜로 파싱합니다.
///
/// 자리수가 정확히 맞아야 하며 (`1/2/2026` 거부), 달력상 존재하지 않는 날짜
/// (`31/04/2026`, 평년의 `29/02`)는 거부됩니다.
pub fn parse_reference_date(raw: &str) -> CoreResult<NaiveDate> {
    let invalid = || CoreError::InvalidDate {
        raw: raw.to_string(),
    };

    let bytes = raw.as_bytes();
    if bytes.len() != 10 {
        return Err(invalid());
    }
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        2 | 5 => *b == b'/',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(raw, REFERENCE_DATE_FORMAT).map_err(|_| invalid())
}

/// 날짜를 해당일 UTC 자정 타임스탬프로 변환합니다.
pub fn to_utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// 날짜를 `DD/MM/YYYY` 형식으로 출력합니다.
pub fn format_reference_date(date: NaiveDate) -> String {
    date.format(REFERENCE_DATE_FORMAT).to_string()
}

/// 지표 값을 불변(invariant) 형식 소수로 파싱합니다.
///
/// 허용: 선택적 부호, 숫자, 최대 하나의 `.`. 천 단위 구분자, 지수 표기, `,` 소수점은 거부합니다.
pub fn parse_indicator_value(raw: &str) -> CoreResult<Decimal> {
    let invalid = || CoreError::InvalidValue {
        raw: raw.to_string(),
    };

    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);

    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return Err(invalid()),
        }
    }
    if !seen_digit {
        return Err(invalid());
    }

    Decimal::from_str(trimmed.trim_start_matches('+')).map_err(|_| invalid())
}
