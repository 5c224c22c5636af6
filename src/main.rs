use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use uclif_auth::{
    AuthError, ConfidentialClient, PublicClient, Scope, UCLIF_AUTHORIZE_URL, UCLIF_TOKEN_URL,
};

#[derive(Debug, Parser)]
#[command(
    name = "uclif-auth",
    about = "Sign in against UCLIF and print verified token claims as JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print an authorization URL and the state to keep for the callback.
    Url {
        #[command(flatten)]
        client: ClientArgs,
        /// Use the implicit grant instead of the code grant.
        #[arg(long)]
        public: bool,
        #[arg(long = "scope", required = true, value_parser = parse_scope)]
        scopes: Vec<Scope>,
    },
    /// Run the code grant through a loopback redirect URI.
    Login {
        #[command(flatten)]
        client: ClientArgs,
        #[arg(long = "scope", required = true, value_parser = parse_scope)]
        scopes: Vec<Scope>,
        /// Seconds to wait for the browser to come back.
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },
    /// Verify a token issued to this client.
    Verify {
        #[command(flatten)]
        client: ClientArgs,
        token: String,
    },
}

#[derive(Debug, Args)]
struct ClientArgs {
    #[arg(long, env = "UCLIF_CLIENT_ID")]
    client_id: String,
    #[arg(long, env = "UCLIF_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,
    #[arg(long, env = "UCLIF_REDIRECT_URI")]
    redirect_uri: String,
}

impl ClientArgs {
    fn confidential(&self) -> Result<ConfidentialClient, AuthError> {
        let secret = self
            .client_secret
            .as_deref()
            .ok_or(AuthError::InvalidClientSecret)?;
        ConfidentialClient::new(&self.client_id, secret, &self.redirect_uri)
    }

    fn public(&self) -> Result<PublicClient, AuthError> {
        PublicClient::new(&self.client_id, &self.redirect_uri)
    }
}

fn parse_scope(value: &str) -> Result<Scope, String> {
    value.parse().map_err(|err: AuthError| err.to_string())
}

#[tokio::main]
async fn main() -> Result<(), AuthError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("UCLIF_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Url {
            client,
            public,
            scopes,
        } => {
            let request = if public {
                client.public()?.build_authorization_url(&scopes)?
            } else {
                client.confidential()?.build_authorization_url(&scopes)?
            };
            print_json(&json!({
                "authorization_url": request.authorization_url,
                "state": request.state,
                "scope": request.scope,
            }));
        }
        Command::Login {
            client,
            scopes,
            timeout,
        } => {
            let client = client.confidential()?;
            let token = client
                .run_local_flow(&scopes, Some(Duration::from_secs(timeout)), |request| {
                    eprintln!("Authorization URL:\n{}", request.authorization_url);
                    if let Err(err) = webbrowser::open(&request.authorization_url) {
                        eprintln!("Failed to open browser automatically: {err}");
                    }
                    Ok(())
                })
                .await?;

            print_json(&json!({
                "client_id": client.identity().client_id(),
                "redirect_uri": client.identity().redirect_uri(),
                "authorization_endpoint": UCLIF_AUTHORIZE_URL,
                "token_endpoint": UCLIF_TOKEN_URL,
                "token_type": token.token_type,
                "expires_in": token.expires_in,
                "claims": token.claims,
            }));
        }
        Command::Verify { client, token } => {
            let claims = client.public()?.verify_token(&token)?;
            print_json(&claims);
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(output) => println!("{output}"),
        Err(err) => eprintln!("Failed to render output: {err}"),
    }
}
