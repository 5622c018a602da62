//! 지표 도메인 타입.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::parse::{
    format_reference_date, parse_indicator_value, parse_reference_date, to_utc_midnight,
};

/// 업스트림 시계열 응답의 한 항목.
///
/// `[{"data": "27/01/2026", "valor": "11.25"}]` 형태의 배열 원소입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRecord {
    /// 기준일 (`DD/MM/YYYY`)
    #[serde(rename = "data")]
    pub date: String,
    /// 값 (불변 형식 소수 문자열)
    #[serde(rename = "valor")]
    pub value: String,
}

/// 검증을 통과한 지표 관측값.
///
/// 저장소 upsert와 캐시 스냅샷 생성의 입력입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorUpdate {
    /// 저장소 키 (예: "SELIC")
    pub name: String,
    /// 지표 값
    pub value: Decimal,
    /// 기준일 (해당일 UTC 자정)
    pub reference_date: DateTime<Utc>,
}

impl IndicatorUpdate {
    /// 업스트림 항목을 검증하여 관측값으로 변환합니다.
    ///
    /// 값을 먼저 검사하고 그 다음 날짜를 검사합니다.
    pub fn from_series(name: impl Into<String>, record: &SeriesRecord) -> CoreResult<Self> {
        let value = parse_indicator_value(&record.value)?;
        let date = parse_reference_date(&record.date)?;

        Ok(Self {
            name: name.into(),
            value,
            reference_date: to_utc_midnight(date),
        })
    }
}

/// 저장소의 지표 레코드 (이름당 한 행).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct IndicatorRecord {
    /// 생성 시 부여되는 불변 식별자
    pub id: Uuid,
    /// 지표 이름 (유일)
    pub name: String,
    /// 지표 값
    pub value: Decimal,
    /// 기준일 (UTC 자정)
    pub reference_date: DateTime<Utc>,
    /// 마지막으로 성공한 쓰기 시각
    pub last_updated: DateTime<Utc>,
}

impl IndicatorRecord {
    /// 기준일의 달력 날짜.
    pub fn reference_day(&self) -> NaiveDate {
        self.reference_date.date_naive()
    }
}

/// 캐시에 저장되는 지표 스냅샷.
///
/// `{"value": 11.25, "date": "27/01/2026", "lastVerifiedAt": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    /// 지표 값
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// 기준일 (`DD/MM/YYYY`)
    pub date: String,
    /// 값이 업스트림 또는 저장소에서 확인된 시각
    pub last_verified_at: DateTime<Utc>,
}

impl IndicatorSnapshot {
    /// 관측값으로부터 스냅샷을 만듭니다.
    pub fn from_update(update: &IndicatorUpdate, verified_at: DateTime<Utc>) -> Self {
        Self {
            value: update.value,
            date: format_reference_date(update.reference_date.date_naive()),
            last_verified_at: verified_at,
        }
    }

    /// 저장소 레코드로부터 스냅샷을 만듭니다.
    pub fn from_record(record: &IndicatorRecord, verified_at: DateTime<Utc>) -> Self {
        Self {
            value: record.value,
            date: format_reference_date(record.reference_day()),
            last_verified_at: verified_at,
        }
    }

    /// 스냅샷의 기준일을 파싱합니다.
    pub fn reference_day(&self) -> CoreResult<NaiveDate> {
        parse_reference_date(&self.date)
    }
}
