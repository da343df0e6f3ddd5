// Portal endpoints. The portal has no documented API; these paths and the
// header values below were captured from a browser session and the service
// rejects requests that deviate from them.
pub const DEFAULT_PORTAL_BASE_URL: &str = "https://data.kma.go.kr";
pub const LOGIN_PATH: &str = "/login/loginAjax.do";
pub const DOWNLOAD_PATH: &str = "/data/rmt/downloadZip.do";
pub const REFERER_PATH: &str = "/data/rmt/rmtList.do";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

// Run defaults
pub const DEFAULT_BASE_DIR: &str = "data";
pub const DEFAULT_REGION_FILE: &str = "지역코드.csv";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOGIN_SETTLE_MS: u64 = 2000;
pub const DEFAULT_UNIT_DELAY_MS: u64 = 500;

/// Variables collected when a collection type has no configured list.
pub const DEFAULT_VARIABLES: &[&str] = &["1시간기온", "풍속", "하늘상태", "습도"];

// Collection type aliases (Korean portal name first, ASCII aliases for CLI use)
pub const SHORT_TERM_FORECAST_ALIASES: &[&str] = &["단기예보", "short-term-forecast", "stf"];
pub const ULTRA_SHORT_TERM_NOWCAST_ALIASES: &[&str] =
    &["초단기실황", "ultra-short-term-nowcast", "nowcast"];
pub const ULTRA_SHORT_TERM_FORECAST_ALIASES: &[&str] =
    &["초단기예보", "ultra-short-term-forecast", "ustf"];
