use std::fs;
use std::path::Path;

use chrono::Utc;
use log::info;
use omnicode_core::auth::validate_password;
use omnicode_core::commands::{Assistant, CommandError};
use omnicode_core::config::OmnicodeConfig;
use omnicode_core::dashboard::render_html;
use omnicode_core::models::usage::{DashboardSummary, FeatureKind};

use crate::cli::Commands;
use crate::{Result, prompt, source};

pub async fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Version => {
            println!(
                "{} {} (core {})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                omnicode_core::version()
            );
            return Ok(());
        }
        Commands::CheckPassword => {
            let candidate = prompt::ask("Password")?;
            validate_password(&candidate)
                .map_err(|v| CommandError::Validation(v.to_string()))?;
            info!("Password is valid.");
            return Ok(());
        }
        _ => {}
    }

    let config = OmnicodeConfig::from_env();
    let assistant = Assistant::from_config(&config, reqwest::Client::new());

    match command {
        Commands::Register { email, code } => {
            let password = prompt::password()?;
            let outcome = assistant.register(&email, &password).await?;
            if outcome.needs_confirmation {
                let code = match code {
                    Some(code) => code,
                    None => prompt::ask("Verification code")?,
                };
                assistant.confirm(&email, &code).await?;
            }
            info!("Registration successful. You can now log in.");
        }
        Commands::Confirm { email, code } => {
            assistant.confirm(&email, &code).await?;
            info!("Account confirmed.");
        }
        Commands::Login { email } => {
            let password = prompt::password()?;
            let user_id = assistant.login(&email, &password).await?;
            info!("Logged in as {user_id}.");
        }
        Commands::Logout => {
            if assistant.logout()? {
                info!("Logged out.");
            } else {
                info!("No active session.");
            }
        }
        Commands::Whoami => match assistant.whoami() {
            Some(user_id) => println!("{user_id}"),
            None => return Err(CommandError::NotLoggedIn.into()),
        },
        Commands::Complete {
            file,
            line,
            language,
        } => {
            let language = language.unwrap_or_else(|| source::language_for(&file).into());
            let text = source::read_line(&file, line)?;
            let suggestion = assistant.complete(&language, &text).await?;
            println!("{suggestion}");
        }
        Commands::Refactor {
            file,
            lines,
            language,
        } => {
            let language = language.unwrap_or_else(|| source::language_for(&file).into());
            let text = source::read_selection(&file, lines.as_deref())?;
            println!("{}", assistant.refactor(&language, &text).await?);
        }
        Commands::Doc {
            file,
            lines,
            language,
        } => {
            let language = language.unwrap_or_else(|| source::language_for(&file).into());
            let text = source::read_selection(&file, lines.as_deref())?;
            println!("{}", assistant.document(&language, &text).await?);
        }
        Commands::Accept { bytes } => {
            let record = assistant.reconcile(true, bytes).await?;
            info!("Recorded {bytes} accepted bytes ({}).", record.code_language);
        }
        Commands::Reject => {
            assistant.reconcile(false, 0).await?;
            info!("Recorded rejected suggestion.");
        }
        Commands::Dashboard { json, html, local } => {
            let now = Utc::now();
            let summary = if local {
                assistant.local_summary(now).await?
            } else {
                assistant.dashboard(now).await?
            };
            if let Some(path) = html {
                write_html(&path, &summary)?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", describe(&summary));
            }
        }
        Commands::Version | Commands::CheckPassword => {}
    }

    Ok(())
}

fn write_html(path: &Path, summary: &DashboardSummary) -> Result<()> {
    fs::write(path, render_html(summary))?;
    info!("Dashboard written to {}.", path.display());
    Ok(())
}

/// Plain-text rendering of a summary.
fn describe(summary: &DashboardSummary) -> String {
    let mut out = format!("Data written: {} bytes\n", summary.data_written);

    out.push_str("Languages:\n");
    if summary.code_languages.is_empty() {
        out.push_str("  (no usage recorded yet)\n");
    }
    for (language, count) in &summary.code_languages {
        out.push_str(&format!("  {language:<14} {count}\n"));
    }

    out.push_str("Requests:\n");
    for (i, label) in summary.requests.labels().enumerate() {
        let counts: Vec<String> = FeatureKind::ALL
            .iter()
            .map(|&f| format!("{}={}", f, summary.requests.count_at(i, f)))
            .collect();
        out.push_str(&format!("  {label:<4} {}\n", counts.join(" ")));
    }
    out
}
