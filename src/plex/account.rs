use error_stack::{IntoReport, Report, ResultExt};
use reqwest::Client;
use serde::Deserialize;

use crate::dialoguer::Dialoguer;
use crate::plex::server::PlexServer;
use crate::plex::{IdentityResponse, PlexError, PlexResult, PLEX_PRODUCT, PLEX_TV_BASE, PLEX_VERSION};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SigninResponse {
    auth_token: String,
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlexConnection {
    pub uri: String,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub relay: bool,
}

/// A device enumerated by plex.tv for the signed-in account. Only entries
/// with `product == "Plex Media Server"` are offered as copy endpoints.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlexResource {
    pub name: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub connections: Vec<PlexConnection>,
}

/// A signed-in plex.tv account, the entry point for enumerating and
/// connecting to media servers.
pub struct PlexAccount {
    pub username: String,
    token: String,
    client_identifier: String,
    client: Client,
}

impl PlexAccount {
    pub async fn signin(
        username: String,
        password: String,
        two_factor_code: Option<String>,
        client_identifier: &str,
    ) -> PlexResult<Self> {
        let client = Client::new();
        let mut params = vec![
            ("login".to_string(), username.clone()),
            ("password".to_string(), password),
            ("rememberMe".to_string(), "false".to_string()),
        ];
        if let Some(code) = two_factor_code {
            params.push(("verificationCode".to_string(), code));
        }

        let response = client
            .post(format!("{}/api/v2/users/signin", PLEX_TV_BASE))
            .header("X-Plex-Client-Identifier", client_identifier)
            .header("X-Plex-Product", PLEX_PRODUCT)
            .header("X-Plex-Version", PLEX_VERSION)
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await
            .into_report()
            .change_context(PlexError::Api)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Report::new(PlexError::Api).attach_printable(
                "plex.tv sign-in failed, check your credentials and two-factor code",
            ));
        }
        if !response.status().is_success() {
            return Err(Report::new(PlexError::Api)
                .attach_printable(format!("plex.tv sign-in failed: {}", response.status())));
        }

        let signin: SigninResponse = response
            .json()
            .await
            .into_report()
            .change_context(PlexError::Api)?;
        let username = if signin.username.is_empty() {
            username
        } else {
            signin.username
        };
        Ok(Self {
            username,
            token: signin.auth_token,
            client_identifier: client_identifier.to_string(),
            client,
        })
    }

    /// Prompts for credentials (and a two-factor code when the account uses
    /// one) and signs in.
    pub async fn interactive_signin(client_identifier: &str) -> PlexResult<Self> {
        let username =
            Dialoguer::input("Plex username".to_string()).change_context(PlexError::Api)?;
        let password =
            Dialoguer::password("Plex password".to_string()).change_context(PlexError::Api)?;
        let uses_two_factor = Dialoguer::select_yes_or_no(
            "Is your account using two factor authentication?".to_string(),
        )
        .change_context(PlexError::Api)?;
        let two_factor_code = if uses_two_factor {
            Some(Dialoguer::password("Two-factor code".to_string()).change_context(PlexError::Api)?)
        } else {
            None
        };
        Self::signin(username, password, two_factor_code, client_identifier).await
    }

    pub fn from_token(username: String, token: String, client_identifier: String) -> Self {
        Self {
            username,
            token,
            client_identifier,
            client: Client::new(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Enumerates the account's media servers (other device types are
    /// filtered out).
    pub async fn servers(&self) -> PlexResult<Vec<PlexResource>> {
        let response = self
            .client
            .get(format!("{}/api/v2/resources", PLEX_TV_BASE))
            .query(&[("includeHttps", "1"), ("includeRelay", "1")])
            .header("X-Plex-Token", &self.token)
            .header("X-Plex-Client-Identifier", &self.client_identifier)
            .header("X-Plex-Product", PLEX_PRODUCT)
            .header("X-Plex-Version", PLEX_VERSION)
            .header("Accept", "application/json")
            .send()
            .await
            .into_report()
            .change_context(PlexError::Api)?;
        if !response.status().is_success() {
            return Err(Report::new(PlexError::Api)
                .attach_printable(format!("Failed to list resources: {}", response.status())));
        }
        let resources: Vec<PlexResource> = response
            .json()
            .await
            .into_report()
            .change_context(PlexError::Api)?;
        Ok(resources
            .into_iter()
            .filter(|resource| resource.product == "Plex Media Server")
            .collect())
    }

    /// Connects to a server, preferring direct connections over the plex.tv
    /// relay. The first connection that answers `/identity` wins.
    pub async fn connect(&self, resource: &PlexResource) -> PlexResult<PlexServer> {
        let token = if resource.access_token.is_empty() {
            self.token.clone()
        } else {
            resource.access_token.clone()
        };
        let mut connections: Vec<&PlexConnection> =
            resource.connections.iter().filter(|c| !c.relay).collect();
        connections.extend(resource.connections.iter().filter(|c| c.relay));

        for connection in connections {
            let response = self
                .client
                .get(format!("{}/identity", connection.uri))
                .header("X-Plex-Token", &token)
                .header("Accept", "application/json")
                .send()
                .await;
            let response = match response {
                Ok(response) if response.status().is_success() => response,
                _ => continue,
            };
            let identity: IdentityResponse = match response.json().await {
                Ok(identity) => identity,
                Err(_) => continue,
            };
            return Ok(PlexServer::new(
                resource.name.clone(),
                connection.uri.clone(),
                token,
                identity.media_container.machine_identifier,
                self.client_identifier.clone(),
            ));
        }
        Err(Report::new(PlexError::Api).attach_printable(format!(
            "Could not reach server {} on any advertised connection",
            resource.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Needs PLEX_TOKEN with a real account. Run with `cargo test -- --ignored`
    async fn test_list_servers() {
        let token = std::env::var("PLEX_TOKEN").unwrap();
        let account =
            PlexAccount::from_token("".to_string(), token, "plexportertestclient0001".to_string());
        let servers = account.servers().await.unwrap();
        println!("{:#?}", servers);
        assert!(servers.iter().all(|s| s.product == "Plex Media Server"));
    }
}
