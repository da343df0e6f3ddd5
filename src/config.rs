use crate::constants::*;
use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved run configuration with all values filled in (no Options).
///
/// This struct carries the pipeline defaults and can be deserialized by the
/// TOML loader. All fields have concrete values, making it safe to access
/// directly without unwrapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Root of the on-disk output tree
    pub base_dir: PathBuf,
    /// Region list CSV produced by the region scraper
    pub region_file: PathBuf,
    /// Portal base URL; overridable for testing against a local server
    pub portal_base_url: String,
    /// Per-request network timeout in seconds
    pub request_timeout_secs: u64,
    /// Wait after a successful login before the session is considered usable.
    /// The portal is observed to reject requests issued immediately.
    pub login_settle_ms: u64,
    /// Politeness delay between work units
    pub unit_delay_ms: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            region_file: PathBuf::from(DEFAULT_REGION_FILE),
            portal_base_url: DEFAULT_PORTAL_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            login_settle_ms: DEFAULT_LOGIN_SETTLE_MS,
            unit_delay_ms: DEFAULT_UNIT_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginSection {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRangeSection {
    /// First day to collect, `YYYY-MM-DD`
    pub start: String,
    /// Last day to collect, `YYYY-MM-DD`
    pub end: String,
}

/// Run configuration loaded from a TOML file.
///
/// Deserializes the required sections (login, date_range) plus the optional
/// collection type and variable lists. The parser rejects unknown keys to
/// catch typos, and validates the credential and date range up front.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfigFile {
    pub login: LoginSection,
    /// Collection types to process as independent sequential sub-runs
    #[serde(default = "default_collection_types")]
    pub collection_types: Vec<String>,
    /// Variable names per collection type; types without an entry fall back
    /// to the default variable set
    #[serde(default)]
    pub variables_by_type: BTreeMap<String, Vec<String>>,
    pub date_range: DateRangeSection,
    /// Flattened resolved configuration with pipeline defaults
    #[serde(flatten)]
    pub resolved: ResolvedConfig,
}

fn default_collection_types() -> Vec<String> {
    vec![
        "단기예보".to_string(),
        "초단기실황".to_string(),
        "초단기예보".to_string(),
    ]
}

impl CollectionConfigFile {
    /// Loads and validates configuration from a TOML file.
    ///
    /// Rejects unknown keys, placeholder credentials, an empty collection
    /// type list, and a date range that does not parse or is reversed.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: CollectionConfigFile = toml::from_str(&contents)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config: {e}")))?;

        if config.login.id.is_empty() || config.login.password.is_empty() {
            return Err(AppError::ConfigError(
                "Login id and password must be set".into(),
            ));
        }
        if config.collection_types.is_empty() {
            return Err(AppError::ConfigError(
                "At least one collection type must be configured".into(),
            ));
        }
        config.date_range()?;

        Ok(config)
    }

    /// Parses the configured date range, validating start <= end.
    pub fn date_range(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        parse_date_range(&self.date_range.start, &self.date_range.end)
    }
}

/// Parses a `YYYY-MM-DD` date pair, validating start <= end.
pub fn parse_date_range(start: &str, end: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")?;
    let end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d")?;
    if start_date > end_date {
        return Err(AppError::InvalidInput(format!(
            "Start date '{start}' must be less than or equal to end date '{end}'"
        )));
    }
    Ok((start_date, end_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_values() {
        let config = ResolvedConfig::default();
        assert_eq!(config.base_dir, PathBuf::from("data"));
        assert_eq!(config.region_file, PathBuf::from("지역코드.csv"));
        assert_eq!(config.portal_base_url, "https://data.kma.go.kr");
        assert_eq!(config.login_settle_ms, 2000);
        assert_eq!(config.unit_delay_ms, 500);
    }

    #[test]
    fn minimal_toml_is_parsed_and_defaults_apply() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            [login]
            id = "user"
            password = "secret"

            [date_range]
            start = "2021-01-01"
            end = "2021-03-01"
            "#,
        )
        .unwrap();

        let config = CollectionConfigFile::from_toml_file(tmp.path()).unwrap();
        assert_eq!(config.login.id, "user");
        assert_eq!(config.collection_types.len(), 3);
        assert_eq!(config.collection_types[0], "단기예보");
        assert!(config.variables_by_type.is_empty());
        assert_eq!(config.resolved.request_timeout_secs, 60);
        let (start, end) = config.date_range().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
    }

    #[test]
    fn full_toml_with_variables_and_overrides() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            base_dir = "out"
            unit_delay_ms = 0
            collection_types = ["단기예보"]

            [login]
            id = "user"
            password = "secret"

            [variables_by_type]
            "단기예보" = ["1시간기온", "습도"]

            [date_range]
            start = "2021-01-01"
            end = "2021-02-01"
            "#,
        )
        .unwrap();

        let config = CollectionConfigFile::from_toml_file(tmp.path()).unwrap();
        assert_eq!(config.resolved.base_dir, PathBuf::from("out"));
        assert_eq!(config.resolved.unit_delay_ms, 0);
        assert_eq!(config.collection_types, vec!["단기예보".to_string()]);
        assert_eq!(
            config.variables_by_type.get("단기예보").unwrap(),
            &vec!["1시간기온".to_string(), "습도".to_string()]
        );
    }

    #[test]
    fn missing_login_section_errors() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            [date_range]
            start = "2021-01-01"
            end = "2021-03-01"
            "#,
        )
        .unwrap();

        assert!(CollectionConfigFile::from_toml_file(tmp.path()).is_err());
    }

    #[test]
    fn empty_credential_errors() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            [login]
            id = ""
            password = "secret"

            [date_range]
            start = "2021-01-01"
            end = "2021-03-01"
            "#,
        )
        .unwrap();

        let err = CollectionConfigFile::from_toml_file(tmp.path()).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn unknown_key_errors() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            extra_flag = true

            [login]
            id = "user"
            password = "secret"

            [date_range]
            start = "2021-01-01"
            end = "2021-03-01"
            "#,
        )
        .unwrap();

        assert!(CollectionConfigFile::from_toml_file(tmp.path()).is_err());
    }

    #[test]
    fn reversed_date_range_errors() {
        let result = parse_date_range("2021-03-01", "2021-01-01");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn malformed_date_errors() {
        let result = parse_date_range("2021/01/01", "2021-03-01");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
