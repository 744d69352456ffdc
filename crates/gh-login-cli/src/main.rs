use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use url::Url;

use gh_login_core::auth::{AuthOutcome, GithubAuthenticator};
use gh_login_core::config::GithubConfig;

/// Walk through the "Login with GitHub" flow from a terminal and print the
/// resulting profile as JSON.
#[derive(Debug, Parser)]
#[command(name = "gh-login", version, about = "Login with GitHub from the command line")]
struct Cli {
    /// OAuth application client id.
    #[arg(long, env = "GITHUB_CLIENT_ID")]
    client_id: String,
    /// OAuth application client secret.
    #[arg(long, env = "GITHUB_CLIENT_SECRET")]
    client_secret: String,
    /// Redirect URL registered with the OAuth application.
    #[arg(long, default_value = "http://127.0.0.1:8080/callback")]
    redirect_url: String,
    /// Application name sent as the User-Agent on API calls.
    #[arg(long, default_value = "gh-login-cli")]
    app_name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GithubConfig::new(
        cli.client_id,
        cli.client_secret,
        &cli.redirect_url,
        cli.app_name,
    )?;
    let authenticator = GithubAuthenticator::new(config)?;

    let AuthOutcome::Redirect(authorize_url) =
        authenticator.authenticate(&HashMap::new()).await?
    else {
        bail!("expected a redirect before any code was exchanged");
    };

    println!("Open the following URL in a browser and authorize the application:");
    println!("\n  {authorize_url}\n");
    print!("Paste the authorization code (or the full redirect URL): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read authorization code")?;
    let code = extract_code(line.trim()).context("no authorization code found in input")?;

    let query = HashMap::from([("code".to_owned(), code)]);
    match authenticator.authenticate(&query).await? {
        AuthOutcome::Profile(profile) => {
            println!("{}", serde_json::to_string_pretty(&profile)?);
            Ok(())
        }
        AuthOutcome::Redirect(_) => bail!("authorization code was dropped before the exchange"),
    }
}

/// Accept either a bare code or the full redirect URL GitHub sent the
/// browser back to.
fn extract_code(input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(input) {
        return url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned());
    }
    Some(input.to_owned())
}
