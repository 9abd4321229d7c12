use anyhow::{Context, Result, bail};
use reqwest::Url;
use tracing::{debug, info, instrument};

use crate::credentials::Credentials;
use crate::linkedin::scrape::PageScraper;

pub const LOGIN_URL: &str = "https://www.linkedin.com/uas/login?trk=learning";
const LOGIN_SUBMIT_FALLBACK: &str = "https://www.linkedin.com/uas/login-submit";

/// An extraction session owning the shared cookie-enabled HTTP client and
/// the logged-in state. One session can serve any number of extractions;
/// login happens at most once for its lifetime.
#[derive(Debug)]
pub struct Session {
    client: reqwest::Client,
    logged_in: bool,
}

impl Session {
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            logged_in: false,
        }
    }

    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Performs the credential form login. No-op once the session is
    /// authenticated.
    ///
    /// # Errors
    /// Errors on network failure, or with the site's own error text when
    /// LinkedIn rejects the credentials
    #[instrument(skip(self, scraper, credentials))]
    pub async fn login(
        &mut self,
        scraper: &dyn PageScraper,
        credentials: &Credentials,
    ) -> Result<()> {
        self.login_at(scraper, credentials, LOGIN_URL, LOGIN_SUBMIT_FALLBACK)
            .await
    }

    async fn login_at(
        &mut self,
        scraper: &dyn PageScraper,
        credentials: &Credentials,
        login_url: &str,
        submit_fallback: &str,
    ) -> Result<()> {
        if self.logged_in {
            return Ok(());
        }

        info!("Logging in to LinkedIn");
        let login_page = self
            .client
            .get(login_url)
            .send()
            .await
            .context("Fetching login page")?
            .text()
            .await
            .context("Decoding login page")?;

        let action_url = match scraper.form_action(&login_page) {
            Some(action) => Url::parse(login_url)
                .and_then(|base| base.join(&action))
                .context("Resolving login form action")?
                .to_string(),
            None => submit_fallback.to_string(),
        };
        debug!("Submitting login form to {action_url}");

        let mut form = scraper.hidden_inputs(&login_page);
        form.push(("session_key".to_string(), credentials.username.clone()));
        form.push(("session_password".to_string(), credentials.password.clone()));

        let submit_page = self
            .client
            .post(action_url)
            .form(&form)
            .send()
            .await
            .context("Submitting login form")?
            .text()
            .await
            .context("Decoding login response")?;

        if let Some(error) = scraper.error_message(&submit_page) {
            bail!("LinkedIn rejected the login: {error}");
        }

        self.logged_in = true;
        info!("Logged in");
        Ok(())
    }
}
