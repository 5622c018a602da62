//! 지표 카탈로그.
//!
//! 수집/조회 대상 지표와 중앙은행 SGS 시계열 코드, 캐시 키 규칙을 정의합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 지표 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum IndicatorType {
    /// 기준금리
    Selic,
    /// 은행간 예금 금리
    Cdi,
    /// 소비자물가지수
    Ipca,
    /// 미 달러 환율
    Dolar,
}

impl IndicatorType {
    pub const ALL: [IndicatorType; 4] = [Self::Selic, Self::Cdi, Self::Ipca, Self::Dolar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selic => "selic",
            Self::Cdi => "cdi",
            Self::Ipca => "ipca",
            Self::Dolar => "dolar",
        }
    }

    /// 기간을 생략한 조회에 사용할 기본 기간.
    pub fn default_window(&self) -> Window {
        match self {
            Self::Selic | Self::Dolar => Window::Current,
            Self::Cdi | Self::Ipca => Window::TwelveMonths,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "selic" => Ok(Self::Selic),
            "cdi" => Ok(Self::Cdi),
            "ipca" => Ok(Self::Ipca),
            "dolar" => Ok(Self::Dolar),
            _ => Err(CoreError::UnknownIndicator(s.to_string())),
        }
    }
}

/// 지표 집계 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum Window {
    /// 최신 단일 값
    #[serde(rename = "current")]
    Current,
    /// 연초 대비 누적
    #[serde(rename = "ytd")]
    YearToDate,
    /// 최근 12개월 누적
    #[serde(rename = "12m")]
    TwelveMonths,
}

impl Window {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::YearToDate => "ytd",
            Self::TwelveMonths => "12m",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Window {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "current" | "atual" => Ok(Self::Current),
            "ytd" => Ok(Self::YearToDate),
            "12m" => Ok(Self::TwelveMonths),
            _ => Err(CoreError::UnknownIndicator(s.to_string())),
        }
    }
}

/// 카탈로그 항목 하나.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorDefinition {
    pub indicator_type: IndicatorType,
    pub window: Window,
    /// 저장소 키
    pub name: &'static str,
    /// 중앙은행 SGS 시계열 코드
    pub series_code: u32,
    pub description: &'static str,
}

impl IndicatorDefinition {
    /// 캐시 키.
    ///
    /// `current` 기간은 `indicador:{type}`, 그 외는 `indicador:{type}:{window}`.
    pub fn cache_key(&self) -> String {
        match self.window {
            Window::Current => format!("indicador:{}", self.indicator_type),
            window => format!("indicador:{}:{}", self.indicator_type, window),
        }
    }

    /// 업스트림 기준 URL에 대한 상대 경로 (최신 1건 요청).
    pub fn source_path(&self) -> String {
        format!(
            "dados/serie/bcdata.sgs.{}/dados/ultimos/1?formato=json",
            self.series_code
        )
    }
}

/// 전체 지표 카탈로그.
pub const CATALOG: &[IndicatorDefinition] = &[
    IndicatorDefinition {
        indicator_type: IndicatorType::Selic,
        window: Window::Current,
        name: "SELIC",
        series_code: 432,
        description: "Taxa SELIC meta definida pelo Copom (% a.a.)",
    },
    IndicatorDefinition {
        indicator_type: IndicatorType::Cdi,
        window: Window::YearToDate,
        name: "CDI_YTD",
        series_code: 4391,
        description: "CDI acumulado no ano (%)",
    },
    IndicatorDefinition {
        indicator_type: IndicatorType::Cdi,
        window: Window::TwelveMonths,
        name: "CDI_12M",
        series_code: 4392,
        description: "CDI acumulado nos últimos 12 meses (%)",
    },
    IndicatorDefinition {
        indicator_type: IndicatorType::Ipca,
        window: Window::YearToDate,
        name: "IPCA_YTD",
        series_code: 433,
        description: "IPCA acumulado no ano (%)",
    },
    IndicatorDefinition {
        indicator_type: IndicatorType::Ipca,
        window: Window::TwelveMonths,
        name: "IPCA_12M",
        series_code: 13522,
        description: "IPCA acumulado nos últimos 12 meses (%)",
    },
    IndicatorDefinition {
        indicator_type: IndicatorType::Dolar,
        window: Window::Current,
        name: "DOLAR",
        series_code: 1,
        description: "Dólar comercial, venda (R$)",
    },
];

/// 유형과 기간으로 카탈로그 항목을 찾습니다.
pub fn find_indicator(
    indicator_type: IndicatorType,
    window: Window,
) -> Option<&'static IndicatorDefinition> {
    CATALOG
        .iter()
        .find(|d| d.indicator_type == indicator_type && d.window == window)
}

/// 저장소 이름으로 카탈로그 항목을 찾습니다 (대소문자 무시).
pub fn find_indicator_by_name(name: &str) -> Option<&'static IndicatorDefinition> {
    CATALOG.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// 경로 파라미터 문자열을 카탈로그 항목으로 해석합니다.
///
/// `window`가 없거나 `latest`이면 유형의 기본 기간을 사용합니다.
pub fn resolve_indicator(
    indicator_type: &str,
    window: Option<&str>,
) -> CoreResult<&'static IndicatorDefinition> {
    let parsed_type: IndicatorType = indicator_type.parse()?;
    let parsed_window = match window {
        Some(w) if !w.eq_ignore_ascii_case("latest") => w.parse()?,
        _ => parsed_type.default_window(),
    };

    find_indicator(parsed_type, parsed_window).ok_or_else(|| {
        CoreError::UnknownIndicator(format!("{}/{}", parsed_type, parsed_window))
    })
}
