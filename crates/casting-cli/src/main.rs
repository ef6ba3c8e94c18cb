use clap::{Parser, Subcommand};
use casting_core::RolePreset;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "casting", version, about = "Casting agency developer CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Development token operations
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Print which permissions each role grants
    Roles {
        /// Print as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Sign an RS256 token carrying a role's permissions
    Mint {
        /// RSA private key (PEM)
        #[arg(long, env = "CASTING_SIGNING_KEY")]
        key: PathBuf,

        /// Key id placed in the token header; must match the JWKS entry
        #[arg(long, default_value = "casting-dev-1")]
        kid: String,

        /// assistant, director or producer
        #[arg(long)]
        role: RolePreset,

        /// `iss` claim, e.g. https://casting.eu.auth0.com/
        #[arg(long, env = "CASTING_TOKEN_ISSUER")]
        issuer: String,

        /// `aud` claim
        #[arg(long, env = "API_AUDIENCE")]
        audience: String,

        /// `sub` claim (defaults to dev|<role>)
        #[arg(long)]
        subject: Option<String>,

        /// Lifetime, e.g. 30m, 1h, 7d
        #[arg(long, default_value = "1h")]
        ttl: String,
    },

    /// Verify a token against a local JWKS file and print its claims
    Verify {
        /// The token (without "Bearer ")
        token: String,

        #[arg(long)]
        jwks: PathBuf,

        #[arg(long, env = "CASTING_TOKEN_ISSUER")]
        issuer: String,

        #[arg(long, env = "API_AUDIENCE")]
        audience: String,

        /// Also require this permission, e.g. post:movies
        #[arg(long)]
        permission: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Token { cmd } => match cmd {
            TokenCommand::Mint {
                key,
                kid,
                role,
                issuer,
                audience,
                subject,
                ttl,
            } => {
                let token = commands::token::mint(commands::token::MintOptions {
                    key,
                    kid,
                    role,
                    issuer,
                    audience,
                    subject,
                    ttl,
                })?;
                println!("{token}");
            }
            TokenCommand::Verify {
                token,
                jwks,
                issuer,
                audience,
                permission,
            } => {
                commands::token::verify(&token, &jwks, &issuer, &audience, permission.as_deref())
                    .await?;
            }
        },
        Command::Roles { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&commands::roles::render_json())?);
            } else {
                print!("{}", commands::roles::render());
            }
        }
    }

    Ok(())
}
