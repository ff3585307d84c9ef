//! Authenticated retrieval from Fantasy Football Fix.
//!
//! Each check runs against a fresh cookie session: GET the signin page for the
//! CSRF tokens, submit the email step, then the password step, then fetch the
//! reveal page. Any failure here surfaces to the checker as the source being
//! unavailable; it never touches persisted state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use tracing::info;

const LOGIN_URL: &str = "https://www.fantasyfootballfix.com/signin/";
const ORIGIN: &str = "https://www.fantasyfootballfix.com";
const REVEAL_URL: &str = "https://www.fantasyfootballfix.com/reveal/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

#[derive(Clone)]
pub struct FixClient {
    email: String,
    password: String,
    timeout: Duration,
}

impl FixClient {
    pub fn new(email: String, password: String, timeout: Duration) -> Self {
        Self {
            email,
            password,
            timeout,
        }
    }

    /// Log in and fetch the raw HTML of the reveal page.
    pub async fn fetch_reveal_page(&self) -> Result<String> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        self.login(&client, &jar).await?;

        info!("Fetching reveal page from {}", REVEAL_URL);
        let response = client
            .get(REVEAL_URL)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .context("Failed to request reveal page")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Reveal page request failed with status {}",
                response.status()
            ));
        }

        response.text().await.context("Failed to read reveal page")
    }

    async fn login(&self, client: &Client, jar: &Arc<Jar>) -> Result<()> {
        info!("Attempting to log in to Fantasy Football Fix");

        let response = client
            .get(LOGIN_URL)
            .header("User-Agent", USER_AGENT)
            .header("Referer", LOGIN_URL)
            .send()
            .await
            .context("Failed to request signin page")?;
        let signin_page = response
            .error_for_status()
            .context("Signin page request failed")?
            .text()
            .await
            .context("Failed to read signin page")?;

        let form_token = csrf_form_token(&signin_page)
            .context("No csrfmiddlewaretoken field on the signin page")?;
        let cookie_token =
            csrf_cookie_token(jar).context("No csrftoken cookie set by the signin page")?;

        let response = client
            .post(LOGIN_URL)
            .header("User-Agent", USER_AGENT)
            .header("Referer", LOGIN_URL)
            .header("Origin", ORIGIN)
            .header("X-CSRFToken", &cookie_token)
            .form(&[
                ("email", self.email.as_str()),
                ("csrfmiddlewaretoken", form_token.as_str()),
            ])
            .send()
            .await
            .context("Failed to submit email step")?;
        let password_page = response
            .error_for_status()
            .context("Email step failed")?
            .text()
            .await
            .context("Failed to read email step response")?;

        if !has_password_field(&password_page) {
            return Err(anyhow!(
                "Login failed at email submission step: no password field found"
            ));
        }
        let password_token = csrf_form_token(&password_page)
            .context("No csrfmiddlewaretoken field on the password page")?;

        let response = client
            .post(LOGIN_URL)
            .header("User-Agent", USER_AGENT)
            .header("Referer", LOGIN_URL)
            .header("Origin", ORIGIN)
            .header("X-CSRFToken", &cookie_token)
            .form(&[
                ("password", self.password.as_str()),
                ("csrfmiddlewaretoken", password_token.as_str()),
                ("email", self.email.as_str()),
            ])
            .send()
            .await
            .context("Failed to submit password step")?;
        let landing_page = response
            .error_for_status()
            .context("Password step failed")?
            .text()
            .await
            .context("Failed to read password step response")?;

        if landing_page.contains("Logout") || landing_page.contains("My Account") {
            info!("Fantasy Football Fix login successful");
            Ok(())
        } else {
            Err(anyhow!(
                "Login failed at password step; check FIX_EMAIL and FIX_PASSWORD"
            ))
        }
    }
}

/// Pull the `csrfmiddlewaretoken` hidden-input value out of a signin page.
fn csrf_form_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(r#"input[name="csrfmiddlewaretoken"]"#).expect("static selector");
    document
        .select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

fn has_password_field(html: &str) -> bool {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"input[type="password"]"#).expect("static selector");
    document.select(&selector).next().is_some()
}

/// Read the `csrftoken` cookie the signin page sets on the session jar.
fn csrf_cookie_token(jar: &Arc<Jar>) -> Option<String> {
    let url = Url::parse(ORIGIN).expect("static url");
    let header = jar.cookies(&url)?;
    let cookies = header.to_str().ok()?;
    cookies.split("; ").find_map(|cookie| {
        cookie
            .strip_prefix("csrftoken=")
            .map(|value| value.to_string())
    })
}
