//! `timetabler` -- administrative client for the university timetable service.
//!
//! Lists and manages the entity collections over REST and follows timetable
//! generation live over WebSocket.
//!
//! # Environment variables
//!
//! | Variable                    | Required | Default                 | Description                        |
//! |-----------------------------|----------|-------------------------|------------------------------------|
//! | `TIMETABLER_URL`            | no       | `http://localhost:8000` | Backend origin                     |
//! | `TIMETABLER_TOKEN`          | no       | --                      | Bearer token when not using `--username` |
//! | `TIMETABLER_USERNAME`       | no       | --                      | Same as `--username`               |
//! | `REQUEST_TIMEOUT_SECS`      | no       | `30`                    | REST request timeout               |
//! | `GENERATION_CLOSE_DELAY_MS` | no       | `2000`                  | Linger after a terminal event      |

mod cli;
mod commands;
mod generate;
mod render;

use timetabler_client::api::TimetablerApi;
use timetabler_client::config::ClientConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timetabler=info,timetabler_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli::build_cli().get_matches();

    let config = ClientConfig::from_env()?;
    let api = TimetablerApi::from_config(&config)?;
    tracing::debug!(base_url = %config.base_url, "Using backend");

    let username = matches.get_one::<String>("username").map(String::as_str);
    let session = commands::establish_session(&api, &config, username).await?;

    let app = App {
        api,
        config,
        session,
    };
    app.dispatch(&matches).await
}
