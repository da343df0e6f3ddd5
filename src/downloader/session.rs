use crate::constants::*;
use crate::errors::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use std::time::Duration;
use tracing::{debug, info};

/// Login credential, immutable for a run. Used only to mint sessions.
#[derive(Debug, Clone)]
pub struct Credential {
    pub login_id: String,
    pub password: String,
}

/// Authenticated portal session.
///
/// Holds the cookie material from one login. Never mutated in place: when a
/// work unit fails the whole session is replaced by a fresh
/// [`authenticate`] call, so the header sets derived below always reflect
/// exactly one credential exchange.
#[derive(Debug, Clone)]
pub struct Session {
    cookie: String,
}

/// Logs into the portal and mints a new session.
///
/// Fails with `AuthError` if the login endpoint responds with a non-success
/// status or sets no cookies. After a successful login the portal needs a
/// short settle interval before the session is usable; callers get the
/// session back only once that wait has elapsed.
pub async fn authenticate(
    client: &reqwest::Client,
    base_url: &str,
    credential: &Credential,
    settle: Duration,
) -> AppResult<Session> {
    info!("Logging into the portal");
    let login_url = url::Url::parse(base_url)?.join(LOGIN_PATH)?;

    let body = [
        ("loginId", credential.login_id.as_str()),
        ("passwordNo", credential.password.as_str()),
    ];
    let response = client
        .post(login_url)
        .form(&body)
        .send()
        .await
        .map_err(|e| AppError::AuthError(format!("Login request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::AuthError(format!(
            "Login returned HTTP {status}"
        )));
    }

    let cookie = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

    if cookie.is_empty() {
        return Err(AppError::AuthError(
            "Login response contained no usable session cookies".to_string(),
        ));
    }

    debug!(settle_ms = settle.as_millis() as u64, "Login accepted, settling");
    tokio::time::sleep(settle).await;

    Ok(Session { cookie })
}

impl Session {
    /// Headers for the "generate" phase (the AJAX request that triggers
    /// server-side file preparation). Captured values; the portal rejects
    /// requests without them.
    pub fn generate_headers(&self, base_url: &str) -> AppResult<HeaderMap> {
        let mut headers = self.common_headers(base_url)?;
        insert(&mut headers, "accept", "text/plain, */*; q=0.01")?;
        insert(
            &mut headers,
            "content-type",
            "application/x-www-form-urlencoded; charset=UTF-8",
        )?;
        insert(&mut headers, "sec-fetch-dest", "empty")?;
        insert(&mut headers, "sec-fetch-mode", "cors")?;
        insert(&mut headers, "sec-fetch-site", "same-origin")?;
        insert(&mut headers, "x-requested-with", "XMLHttpRequest")?;
        Ok(headers)
    }

    /// Headers for the "download" phase (the iframe-style POST that streams
    /// the prepared ZIP back).
    pub fn download_headers(&self, base_url: &str) -> AppResult<HeaderMap> {
        let mut headers = self.common_headers(base_url)?;
        insert(
            &mut headers,
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )?;
        insert(
            &mut headers,
            "content-type",
            "application/x-www-form-urlencoded",
        )?;
        insert(&mut headers, "cache-control", "max-age=0")?;
        insert(&mut headers, "sec-fetch-dest", "iframe")?;
        insert(&mut headers, "sec-fetch-mode", "navigate")?;
        insert(&mut headers, "sec-fetch-site", "same-origin")?;
        insert(&mut headers, "sec-fetch-user", "?1")?;
        insert(&mut headers, "upgrade-insecure-requests", "1")?;
        Ok(headers)
    }

    fn common_headers(&self, base_url: &str) -> AppResult<HeaderMap> {
        let referer = format!("{}{}", base_url.trim_end_matches('/'), REFERER_PATH);
        let mut headers = HeaderMap::new();
        insert(&mut headers, "accept-language", ACCEPT_LANGUAGE)?;
        insert(&mut headers, "cookie", &self.cookie)?;
        insert(&mut headers, "origin", base_url.trim_end_matches('/'))?;
        insert(&mut headers, "referer", &referer)?;
        insert(&mut headers, "user-agent", USER_AGENT)?;
        Ok(headers)
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> AppResult<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| AppError::InvalidInput(format!("invalid header value for {name}: {e}")))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> Session {
        Session {
            cookie: "JSESSIONID=abc123; loginId=user".to_string(),
        }
    }

    #[test]
    fn generate_headers_bind_session_and_phase() {
        let headers = test_session()
            .generate_headers("https://data.kma.go.kr")
            .unwrap();
        assert_eq!(
            headers.get("cookie").unwrap(),
            "JSESSIONID=abc123; loginId=user"
        );
        assert_eq!(headers.get("sec-fetch-dest").unwrap(), "empty");
        assert_eq!(headers.get("x-requested-with").unwrap(), "XMLHttpRequest");
        assert_eq!(
            headers.get("referer").unwrap(),
            "https://data.kma.go.kr/data/rmt/rmtList.do"
        );
    }

    #[test]
    fn download_headers_differ_per_phase() {
        let session = test_session();
        let generate = session.generate_headers("https://data.kma.go.kr").unwrap();
        let download = session.download_headers("https://data.kma.go.kr").unwrap();

        assert_eq!(download.get("sec-fetch-dest").unwrap(), "iframe");
        assert_eq!(download.get("upgrade-insecure-requests").unwrap(), "1");
        assert!(download.get("x-requested-with").is_none());
        assert_ne!(
            generate.get("accept").unwrap(),
            download.get("accept").unwrap()
        );
        // Both phases carry the same session cookie
        assert_eq!(
            generate.get("cookie").unwrap(),
            download.get("cookie").unwrap()
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let headers = test_session()
            .generate_headers("https://data.kma.go.kr/")
            .unwrap();
        assert_eq!(headers.get("origin").unwrap(), "https://data.kma.go.kr");
    }
}
