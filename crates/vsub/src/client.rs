use reqwest::Client;

use crate::config::SiteConfig;
use crate::error::Result;

/// Builds the HTTP client shared by every component.
///
/// The client keeps a cookie store because the site hands out session
/// cookies on the catalog pages that the player API expects back.
pub fn create_client(config: &SiteConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout)
        .cookie_store(true)
        .build()?;
    Ok(client)
}
