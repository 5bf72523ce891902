//! Reddit OAuth HTTP client

use crate::credentials::Credentials;
use crate::error::{RedditError, Result};
use crate::types::*;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Authenticated client for the Reddit API
pub struct RedditClient {
    http: reqwest::Client,
    api_base_url: String,
    token: String,
    /// True when connected with an app-only (client credentials) token
    read_only: bool,
}

impl RedditClient {
    /// OAuth token endpoint
    pub const AUTH_URL: &'static str = "https://www.reddit.com/api/v1/access_token";
    /// Base URL for authenticated API calls
    pub const API_BASE_URL: &'static str = "https://oauth.reddit.com";

    /// Obtain an access token and build a client (30 second timeout)
    pub async fn connect(credentials: &Credentials) -> Result<Self> {
        Self::connect_to(credentials, Self::AUTH_URL, Self::API_BASE_URL).await
    }

    /// Connect against custom token and API endpoints
    pub async fn connect_to(
        credentials: &Credentials,
        auth_url: &str,
        api_base_url: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(credentials.user_agent.as_str())
            .build()?;

        let (body, read_only) = match credentials.account() {
            Some((username, password)) => (
                encode_form(&[
                    ("grant_type", "password"),
                    ("username", username),
                    ("password", password),
                ]),
                false,
            ),
            None => {
                warn!("No Reddit username/password provided, using read-only access");
                (encode_form(&[("grant_type", "client_credentials")]), true)
            }
        };

        let response = http
            .post(auth_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(body)
            .send()
            .await?;
        let text = check_status(response).await?;

        let token: TokenResponse = serde_json::from_str(&text)?;
        let expires_in = token.expires_in;
        let token = match (token.access_token, token.error) {
            (Some(access_token), None) => access_token,
            (_, Some(error)) => return Err(RedditError::Auth(error)),
            (None, None) => return Err(RedditError::Auth("no access token returned".to_string())),
        };

        info!(read_only, expires_in, "Obtained Reddit access token");

        Ok(Self {
            http,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            token,
            read_only,
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Name of the authenticated account, `None` for app-only access
    pub async fn me(&self) -> Result<Option<String>> {
        if self.read_only {
            return Ok(None);
        }
        let me: MeResponse = self.get_json("/api/v1/me?raw_json=1").await?;
        Ok(Some(me.name))
    }

    /// Fetch the moderation log, newest first
    ///
    /// # Arguments
    /// * `subreddit` - Subreddit name without the `r/` prefix
    /// * `action` - Optional action filter (e.g. "banuser")
    /// * `limit` - Maximum number of entries (Reddit caps this at 500)
    pub async fn mod_log(
        &self,
        subreddit: &str,
        action: Option<&str>,
        limit: u32,
    ) -> Result<Vec<ModAction>> {
        let mut path = format!(
            "/r/{}/about/log?limit={}&raw_json=1",
            urlencoding::encode(subreddit),
            limit
        );
        if let Some(a) = action {
            path.push_str(&format!("&type={}", urlencoding::encode(a)));
        }

        let listing: Listing<Thing<ModAction>> = self.get_json(&path).await?;
        Ok(listing.data.children.into_iter().map(|t| t.data).collect())
    }

    /// Fetch the subreddit's ban list (requires moderator access)
    pub async fn banned_users(&self, subreddit: &str, limit: u32) -> Result<Vec<BannedUser>> {
        let path = format!(
            "/r/{}/about/banned?limit={}&raw_json=1",
            urlencoding::encode(subreddit),
            limit
        );
        let listing: Listing<BannedUser> = self.get_json(&path).await?;
        Ok(listing.data.children)
    }

    /// List modmail conversations for a subreddit
    ///
    /// # Arguments
    /// * `state` - Conversation state filter ("all", "new", "inprogress", ...)
    pub async fn modmail_conversations(
        &self,
        subreddit: &str,
        state: &str,
        limit: u32,
    ) -> Result<Vec<ModmailConversation>> {
        let path = format!(
            "/api/mod/conversations?entity={}&state={}&limit={}",
            urlencoding::encode(subreddit),
            urlencoding::encode(state),
            limit
        );
        let response: ConversationsResponse = self.get_json(&path).await?;
        Ok(response.into_ordered())
    }

    /// Reply to a modmail conversation
    pub async fn reply_to_conversation(
        &self,
        conversation_id: &str,
        body: &str,
        author_hidden: bool,
        internal: bool,
    ) -> Result<()> {
        let path = format!(
            "/api/mod/conversations/{}",
            urlencoding::encode(conversation_id)
        );
        let form = encode_form(&[
            ("body", body),
            ("isAuthorHidden", bool_str(author_hidden)),
            ("isInternal", bool_str(internal)),
        ]);
        self.post_form(&path, form).await
    }

    /// Mute the participant of a modmail conversation
    pub async fn mute_conversation(&self, conversation_id: &str) -> Result<()> {
        let path = format!(
            "/api/mod/conversations/{}/mute",
            urlencoding::encode(conversation_id)
        );
        self.post_form(&path, String::new()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base_url, path);
        debug!(url = %url, "GET");

        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
        let text = check_status(response).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn post_form(&self, path: &str, form: String) -> Result<()> {
        let url = format!("{}{}", self.api_base_url, path);
        debug!(url = %url, "POST");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(form)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Return the body of a successful response, or an `Api` error
async fn check_status(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(RedditError::Api {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

/// Encode key/value pairs as `application/x-www-form-urlencoded`
fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_form_escapes_values() {
        let form = encode_form(&[
            ("grant_type", "password"),
            ("password", "p@ss word&more"),
        ]);
        assert_eq!(form, "grant_type=password&password=p%40ss%20word%26more");
    }

    #[test]
    fn test_encode_form_empty() {
        assert_eq!(encode_form(&[]), "");
    }

    #[test]
    fn test_bool_str() {
        assert_eq!(bool_str(true), "true");
        assert_eq!(bool_str(false), "false");
    }
}
