use std::time::Duration;

use reqwest::header::RETRY_AFTER;

use crate::core::error::FetchErrorKind;
use crate::core::models::Provider;
use crate::core::FsError;

/// Sends a request, translating transport failures and unsuccessful statuses at the adapter
/// boundary.
pub(crate) async fn send(
    provider: Provider,
    req: reqwest::RequestBuilder,
) -> Result<reqwest::Response, FsError> {
    let resp = req
        .send()
        .await
        .map_err(|e| FsError::transport(provider, &e))?;

    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let code = status.as_u16();
    Err(match code {
        401 | 403 => FsError::Fetch {
            provider,
            kind: FetchErrorKind::Unauthorized,
            detail: format!("provider answered {code}"),
        },
        429 => FsError::RateLimited {
            provider,
            retry_after: retry_after(&resp).unwrap_or(Duration::from_secs(60)),
        },
        _ => FsError::Fetch {
            provider,
            kind: FetchErrorKind::Status(code),
            detail: format!("provider answered {code}"),
        },
    })
}

fn retry_after(resp: &reqwest::Response) -> Option<Duration> {
    resp.headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Read the response body as text.
/// In `test-mode`, if `FS_RECORD=1`, the body is saved as a fixture.
pub(crate) async fn get_text(
    provider: Provider,
    resp: reqwest::Response,
    _endpoint: &str,
    _key: &str,
) -> Result<String, FsError> {
    let text = resp
        .text()
        .await
        .map_err(|e| FsError::transport(provider, &e))?;

    #[cfg(feature = "test-mode")]
    {
        if std::env::var("FS_RECORD").ok().as_deref() == Some("1")
            && let Err(e) = crate::core::fixtures::record_fixture(_endpoint, _key, "json", &text)
        {
            eprintln!("FS_RECORD: failed to write fixture for {_key}: {e}");
        }
    }

    Ok(text)
}
