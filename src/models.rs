use crate::constants::*;
use tracing::warn;

/// Granularity of the date intervals a collection type is requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalMode {
    /// One request per calendar month, labeled `YYYYMM`.
    Monthly,
    /// Month-wide `YYYYMMDD` chunks, the last one clipped to the end date.
    Range,
}

/// Weather product exposed by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionType {
    ShortTermForecast,
    UltraShortTermNowcast,
    UltraShortTermForecast,
}

/// Static request parameters for one collection type.
///
/// The codes are an implementation contract with the portal and must match its
/// undocumented expectations exactly.
#[derive(Debug, Clone, Copy)]
pub struct CollectionProfile {
    pub data_code: &'static str,
    pub api_code: &'static str,
    pub interval_mode: IntervalMode,
    pub purpose_code: &'static str,
    pub request_path: &'static str,
    pub select_type: &'static str,
}

impl CollectionType {
    /// Portal-facing name, also used as the output directory segment.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ShortTermForecast => "단기예보",
            Self::UltraShortTermNowcast => "초단기실황",
            Self::UltraShortTermForecast => "초단기예보",
        }
    }

    /// Resolves a configured name to a collection type.
    ///
    /// Accepts the Korean portal name or an ASCII alias, case-insensitively.
    /// Unknown names return `None`; callers treat that as a configuration
    /// error, never as a silent default.
    pub fn from_name(value: &str) -> Option<Self> {
        let lower = value.trim().to_lowercase();
        if SHORT_TERM_FORECAST_ALIASES.contains(&lower.as_str()) {
            Some(Self::ShortTermForecast)
        } else if ULTRA_SHORT_TERM_NOWCAST_ALIASES.contains(&lower.as_str()) {
            Some(Self::UltraShortTermNowcast)
        } else if ULTRA_SHORT_TERM_FORECAST_ALIASES.contains(&lower.as_str()) {
            Some(Self::UltraShortTermForecast)
        } else {
            None
        }
    }

    pub fn profile(&self) -> CollectionProfile {
        match self {
            Self::ShortTermForecast => CollectionProfile {
                data_code: "424",
                api_code: "request420",
                interval_mode: IntervalMode::Range,
                purpose_code: "F00415",
                request_path: "/mypage/rmt/callDtaReqstIrods4xxNewAjax.do",
                select_type: "1",
            },
            Self::UltraShortTermNowcast => CollectionProfile {
                data_code: "400",
                api_code: "request400",
                interval_mode: IntervalMode::Monthly,
                purpose_code: "F00401",
                request_path: "/mypage/rmt/callDtaReqstIrods4xxAjax.do",
                select_type: "1",
            },
            Self::UltraShortTermForecast => CollectionProfile {
                data_code: "411",
                api_code: "request410",
                interval_mode: IntervalMode::Range,
                purpose_code: "F00415",
                request_path: "/mypage/rmt/callDtaReqstIrods4xxNewAjax.do",
                select_type: "1",
            },
        }
    }
}

/// Variable name -> portal code mapping.
///
/// The portal identifies variables by short codes while configuration and the
/// output layout use the human-readable names.
const VARIABLE_MAPPING: &[(&str, &str)] = &[
    ("1시간기온", "TMP"),
    ("풍속", "WSD"),
    ("하늘상태", "SKY"),
    ("습도", "REH"),
    ("일최고기온", "TMX"),
    ("일최저기온", "TMN"),
    ("강수형태", "PTY"),
    ("강수확률", "POP"),
    ("동서바람성분", "UUU"),
    ("남북바람성분", "VVV"),
    ("1시간강수량", "PCP"),
    ("1시간적설", "SNO"),
    ("파고", "WAV"),
    ("풍향", "VEC"),
];

/// One weather variable with its portal request code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSpec {
    pub name: String,
    pub code: &'static str,
}

/// Resolves variable names through the fixed mapping table.
///
/// Unknown names are dropped with a warning so one typo never aborts a run,
/// but they are never silently substituted either.
pub fn resolve_variables(names: &[String]) -> Vec<VariableSpec> {
    let mut variables = Vec::with_capacity(names.len());
    for name in names {
        match VARIABLE_MAPPING.iter().find(|(n, _)| n == name) {
            Some((n, code)) => variables.push(VariableSpec {
                name: (*n).to_string(),
                code,
            }),
            None => warn!(variable = %name, "Unknown variable name, dropping"),
        }
    }
    variables
}

/// One leaf administrative area from the region list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub code: String,
}

/// Calendar interval as the portal expects it: `YYYYMMDD` strings in range
/// mode, a single `YYYYMM` label (start == end) in monthly mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateInterval {
    pub start: String,
    pub end: String,
}

/// Atomic unit of download work: one region, one interval, one variable.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub region: Region,
    pub interval: DateInterval,
    pub variable: VariableSpec,
}

impl WorkUnit {
    /// File name the portal prepares for this unit, and the name the final
    /// CSV is persisted under. The file-serving API depends on this scheme.
    pub fn expected_csv_name(&self) -> String {
        format!(
            "{}_{}_{}_{}.csv",
            self.region.level3, self.variable.name, self.interval.start, self.interval.end
        )
    }

    /// Short human-readable description for progress reporting.
    pub fn description(&self) -> String {
        format!(
            "{} - {} ({}~{})",
            self.region.level3, self.variable.name, self.interval.start, self.interval.end
        )
    }
}
