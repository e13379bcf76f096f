use std::{io::Write, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{api_exception, RegisterClient};
use shared::{
    domain::{MemberDraft, MemberField, MemberNo, RequestId, Role, SearchKey, SessionId},
    error::ApiException,
    protocol::Notification,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(about = "Member register console")]
struct Cli {
    #[arg(long, env = "REGISTER_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
    /// Token printed by `login`.
    #[arg(long, env = "REGISTER_SESSION")]
    session: Option<SessionId>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long)]
        password: String,
        /// `admin` or `head`.
        #[arg(long)]
        role: Role,
    },
    Logout,
    List,
    Search {
        term: String,
        /// `memberNo` or `siteNo`.
        #[arg(long, default_value = "memberNo")]
        key: SearchKey,
    },
    Show {
        member_no: String,
    },
    Finance {
        member_no: String,
    },
    /// Lists the editable fields and the values they accept.
    Fields,
    Add {
        /// `field=value`, repeatable. Field names are the wire names, e.g. `memberName`.
        #[arg(long = "set", value_parser = parse_assignment)]
        fields: Vec<(MemberField, String)>,
    },
    RequestUpdate {
        member_no: String,
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        changes: Vec<(MemberField, String)>,
        #[arg(long, default_value = "")]
        reason: String,
    },
    Requests,
    Approve {
        request_id: String,
    },
    Reject {
        request_id: String,
    },
}

fn parse_assignment(raw: &str) -> Result<(MemberField, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))?;
    let field = name.parse::<MemberField>().map_err(|err| err.to_string())?;
    Ok((field, value.to_string()))
}

fn draft(entries: Vec<(MemberField, String)>) -> MemberDraft {
    entries.into_iter().collect()
}

fn failure_line(exception: &ApiException) -> String {
    render::notification(&Notification::from(exception))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match api_exception(&err) {
                Some(exception) => eprintln!("{}", failure_line(exception)),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut client = RegisterClient::new(&cli.server_url)?.with_session(cli.session);
    debug!(server_url = %cli.server_url, "console command");

    match cli.command {
        Command::Login {
            username,
            password,
            role,
        } => {
            let login = client.login(&username, &password, role).await?;
            println!("Logged in as {} ({})", login.username, login.role.label());
            println!("export REGISTER_SESSION={}", login.session_id);
        }
        Command::Logout => {
            let notification = client.logout().await?;
            println!("{}", render::notification(&notification));
        }
        Command::List => {
            let list = client.list_members(SearchKey::MemberNo, None).await?;
            print!("{}", render::member_table(&list));
        }
        Command::Search { term, key } => {
            let list = client.list_members(key, Some(&term)).await?;
            print!("{}", render::member_table(&list));
        }
        Command::Show { member_no } => {
            let view = client.member_detail(&MemberNo::from(member_no)).await?;
            print!("{}", render::member_detail(&view));
        }
        Command::Finance { member_no } => {
            let view = client.financial_summary(&MemberNo::from(member_no)).await?;
            print!("{}", render::financial_summary(&view));
        }
        Command::Fields => print!("{}", render::field_reference()),
        Command::Add { fields } => {
            let added = client.add_member(draft(fields)).await?;
            println!("{}", render::notification(&added.notification));
        }
        Command::RequestUpdate {
            member_no,
            changes,
            reason,
        } => {
            print!("Submitting...");
            std::io::stdout().flush().context("failed to flush stdout")?;
            let result = client
                .submit_update_request(&MemberNo::from(member_no), draft(changes), &reason)
                .await;
            println!();
            let submitted = result?;
            println!("{}", render::notification(&submitted.notification));
            print!("{}", render::update_request(&submitted.data));
        }
        Command::Requests => {
            let inbox = client.request_inbox().await?;
            print!("{}", render::request_inbox(&inbox));
        }
        Command::Approve { request_id } => {
            let approved = client.approve_request(&RequestId::from(request_id)).await?;
            println!("{}", render::notification(&approved.notification));
        }
        Command::Reject { request_id } => {
            let rejected = client.reject_request(&RequestId::from(request_id)).await?;
            println!("{}", render::notification(&rejected.notification));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
