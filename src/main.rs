use clap::Parser;

mod api;
mod cli;
mod commands;
mod domain;
mod error;
#[cfg(test)]
mod fake_api;
mod services;

pub use api::*;
pub use cli::*;
pub use commands::*;
pub use domain::constants::*;
pub use domain::models::*;
pub use error::*;
pub use services::loader::*;
pub use services::output::*;
pub use services::scan::*;
pub use services::session::*;
pub use services::settings::*;
pub use services::storage::*;
pub use services::system_config::*;
pub use services::violations::*;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        settings.api_url = url.clone();
    }
    services::logging::init(settings.log_json);

    let ctx = Context {
        settings,
        store: SessionStore::default_location()?,
    };

    if handle_account_commands(&cli, &ctx)? {
        return Ok(());
    }
    match handle_console_commands(&cli, &ctx)? {
        Dispatch::Done => Ok(()),
        Dispatch::LoginRedirect => std::process::exit(EXIT_LOGIN_REDIRECT),
        Dispatch::Unhandled => anyhow::bail!("unsupported command"),
    }
}
