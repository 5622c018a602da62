//! 갱신 작업 설정.

use std::time::Duration;

use breconomy_core::{find_indicator_by_name, IndicatorDefinition, RefreshConfig, CATALOG};

use crate::error::{CollectorError, Result};

/// 지표 하나에 대한 갱신 작업 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshJobConfig {
    /// 저장소 키 (예: "SELIC")
    pub name: String,
    /// 업스트림 기준 URL에 대한 상대 경로
    pub source_path: String,
    /// 캐시 키
    pub cache_key: String,
    /// 주기 간격
    pub update_interval: Duration,
    /// 첫 실행 전 대기
    pub initial_delay: Duration,
    /// 캐시 항목 만료 (주기 간격 + 여유분)
    pub cache_ttl: Duration,
}

impl RefreshJobConfig {
    /// 카탈로그 항목과 공통 설정으로 작업 설정을 만듭니다.
    pub fn from_definition(definition: &IndicatorDefinition, refresh: &RefreshConfig) -> Self {
        Self {
            name: definition.name.to_string(),
            source_path: definition.source_path(),
            cache_key: definition.cache_key(),
            update_interval: refresh.update_interval(),
            initial_delay: refresh.initial_delay(),
            cache_ttl: refresh.update_interval() + refresh.cache_margin(),
        }
    }

    /// 전체 카탈로그의 작업 설정.
    pub fn catalog(refresh: &RefreshConfig) -> Vec<Self> {
        CATALOG
            .iter()
            .map(|d| Self::from_definition(d, refresh))
            .collect()
    }

    /// 이름이 주어지면 해당 지표만, 없으면 전체.
    pub fn select(refresh: &RefreshConfig, name: Option<&str>) -> Result<Vec<Self>> {
        match name {
            None => Ok(Self::catalog(refresh)),
            Some(name) => find_indicator_by_name(name)
                .map(|d| vec![Self::from_definition(d, refresh)])
                .ok_or_else(|| CollectorError::UnknownIndicator(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_ttl_exceeds_interval() {
        let refresh = RefreshConfig::default();
        for job in RefreshJobConfig::catalog(&refresh) {
            assert!(job.cache_ttl > job.update_interval, "{}", job.name);
            assert_eq!(job.cache_ttl, Duration::from_secs(25 * 60 * 60));
        }
    }

    #[test]
    fn test_select() {
        let refresh = RefreshConfig::default();
        assert_eq!(RefreshJobConfig::select(&refresh, None).unwrap().len(), CATALOG.len());

        let selic = RefreshJobConfig::select(&refresh, Some("selic")).unwrap();
        assert_eq!(selic.len(), 1);
        assert_eq!(selic[0].name, "SELIC");
        assert_eq!(selic[0].cache_key, "indicador:selic");
        assert_eq!(selic[0].initial_delay, Duration::from_secs(2));

        assert!(matches!(
            RefreshJobConfig::select(&refresh, Some("IGPM")),
            Err(CollectorError::UnknownIndicator(_))
        ));
    }
}
