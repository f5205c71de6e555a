use reqwest::Client;
use std::net::IpAddr;
use std::time::Duration;

use super::error::SpeedTestError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// fast.com rejects clients it does not recognize as browsers.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Build an async reqwest client, optionally bound to a local address.
///
/// Only connection establishment is bounded here; body reads get their
/// own deadline in the download loop so long transfers are not cut off.
pub fn build_client(local_addr: Option<IpAddr>) -> Result<Client, SpeedTestError> {
    let mut builder = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT);

    if let Some(addr) = local_addr {
        builder = builder.local_address(addr);
    }

    Ok(builder.build()?)
}
