use crate::*;

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.trim().to_string(),
        password: password.to_string(),
    }
}

pub fn handle_account_commands(cli: &Cli, ctx: &Context) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Register { email, password } => {
            let client = AuthClient::new(&ctx.settings)?;
            let resp = client
                .register(&credentials(email, password))
                .map_err(|e| anyhow::anyhow!(failure_message(&e, "Registration failed")))?;
            audit("register", serde_json::json!({ "email": email.trim() }));
            print_one(cli.json, resp, |r| {
                if r.message.is_empty() {
                    format!("registered {}", email.trim())
                } else {
                    r.message.clone()
                }
            })?;
        }
        Commands::Login { email, password } => {
            let client = AuthClient::new(&ctx.settings)?;
            let token = client
                .login(&credentials(email, password))
                .map_err(|e| anyhow::anyhow!(failure_message(&e, "Login failed")))?;
            ctx.store.begin(&token.access_token)?;
            tracing::info!(email = email.trim(), "session started");
            audit("login", serde_json::json!({ "email": email.trim() }));
            print_one(
                cli.json,
                serde_json::json!({ "email": email.trim(), "logged_in": true }),
                |_| format!("logged in as {}", email.trim()),
            )?;
        }
        Commands::Logout => {
            let ended = ctx.store.end()?;
            if ended {
                audit("logout", serde_json::json!({}));
            }
            print_one(cli.json, serde_json::json!({ "logged_out": ended }), |_| {
                if ended {
                    "logged out".to_string()
                } else {
                    "no active session".to_string()
                }
            })?;
        }
        Commands::Session => {
            let status = SessionStatus {
                logged_in: ctx.store.current().is_some(),
                routes: ROUTES
                    .iter()
                    .map(|(name, command)| RouteEntry {
                        name: name.to_string(),
                        command: command.to_string(),
                    })
                    .collect(),
            };
            print_one(cli.json, status, |s| {
                let mut lines = vec![format!(
                    "session: {}",
                    if s.logged_in { "active" } else { "none" }
                )];
                lines.extend(s.routes.iter().map(|r| format!("{}\t{}", r.command, r.name)));
                lines.join("\n")
            })?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}
