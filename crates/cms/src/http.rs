//! Request helpers shared by the adapters.

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::CmsError;

pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

pub fn bearer_headers(api_key: &str) -> Result<HeaderMap, CmsError> {
    let mut headers = json_headers();
    let value =
        HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(CmsError::InvalidApiKey)?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// GET `url` and decode the JSON body. Any non-2xx status is an error.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
) -> Result<T, CmsError> {
    get_json_with_query(client, url, headers, &[]).await
}

pub async fn get_json_with_query<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
    query: &[(&str, String)],
) -> Result<T, CmsError> {
    let mut request = client.get(url).headers(headers.clone());
    if !query.is_empty() {
        request = request.query(query);
    }

    let resp = request.send().await.map_err(|source| CmsError::Request {
        url: url.to_string(),
        source,
    })?;

    if !resp.status().is_success() {
        return Err(CmsError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }

    resp.json::<T>().await.map_err(|source| CmsError::Decode {
        url: url.to_string(),
        source,
    })
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
