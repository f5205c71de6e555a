use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::error::SpeedTestError;
use super::types::Endpoint;

const BASE_URL: &str = "https://fast.com";
const API_URL: &str = "https://api.fast.com/netflix/speedtest/v2";

#[derive(Debug, Deserialize)]
struct UrlListResponse {
    targets: Vec<Target>,
}

#[derive(Debug, Deserialize)]
struct Target {
    url: String,
}

/// Fetch `count` signed test-file URLs from the fast.com API.
///
/// The API token is not published anywhere stable; it is embedded in the
/// site's app bundle, so the page and the bundle are scraped first.
pub async fn fetch_endpoints(
    client: &Client,
    count: u32,
) -> Result<Vec<Endpoint>, SpeedTestError> {
    let token = fetch_token(client).await?;
    debug!("Using API token {token}");

    let url = format!("{API_URL}?https=true&token={token}&urlCount={count}");
    let body = client.get(&url).send().await?.text().await?;
    let response: UrlListResponse = serde_json::from_str(&body)?;

    let endpoints: Vec<Endpoint> = response.targets.into_iter().map(|t| t.url).collect();
    info!("Discovered {} download endpoints", endpoints.len());
    Ok(endpoints)
}

async fn fetch_token(client: &Client) -> Result<String, SpeedTestError> {
    let html = client.get(BASE_URL).send().await?.text().await?;
    let script = parse_script_name(&html)
        .ok_or_else(|| SpeedTestError::ScriptNotFound(BASE_URL.to_string()))?;

    let script_url = format!("{BASE_URL}/{script}");
    debug!("Fetching app bundle {script_url}");
    let bundle = client.get(&script_url).send().await?.text().await?;

    parse_token(&bundle)
        .map(str::to_string)
        .ok_or_else(|| SpeedTestError::TokenNotFound(script_url))
}

/// Locate the `app-<hash>.js` bundle reference in the landing page.
fn parse_script_name(html: &str) -> Option<&str> {
    let start = html.find("app-")?;
    let rest = &html[start..];
    let end = rest.find(".js")?;
    Some(&rest[..end + 3])
}

/// Extract the value of the `token:"…"` literal from the app bundle.
fn parse_token(bundle: &str) -> Option<&str> {
    let start = bundle.find("token:\"")? + "token:\"".len();
    let rest = &bundle[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}
