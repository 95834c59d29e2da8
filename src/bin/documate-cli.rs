use std::env;

use anyhow::Result;
use dotenv::dotenv;
use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use documate::client;
use documate::models::{Author, Document};
use documate::staging::StagedFile;
use documate::{Config, DocumentService, HttpDocumentService, SendOutcome, Workspace};

const HELP: &str = "Commands: 'upload <path>', 'list', 'use <n>', 'remove <n>', 'history', 'help', 'exit'. Anything else is sent as a question.";

#[derive(Debug, PartialEq, Eq)]
enum CliCommand<'a> {
    Empty,
    Exit,
    Help,
    Upload(&'a str),
    UploadUsage,
    List,
    History,
    Use(&'a str),
    Remove(&'a str),
    Ask(&'a str),
}

/// Keywords are case-insensitive; anything that is not a command is a question.
fn parse_command(input: &str) -> CliCommand<'_> {
    let input = input.trim();
    if input.is_empty() {
        return CliCommand::Empty;
    }
    let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
    let rest = rest.trim();
    match command.to_lowercase().as_str() {
        "exit" if rest.is_empty() => CliCommand::Exit,
        "help" => CliCommand::Help,
        "upload" if rest.is_empty() => CliCommand::UploadUsage,
        "upload" => CliCommand::Upload(rest),
        "list" => CliCommand::List,
        "history" => CliCommand::History,
        "use" => CliCommand::Use(rest),
        "remove" => CliCommand::Remove(rest),
        _ => CliCommand::Ask(input),
    }
}

async fn run_client(service: &dyn DocumentService) -> Result<()> {
    let mut workspace = Workspace::new();
    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut input = String::new();

    println!("{}", HELP);

    loop {
        match workspace.active_document() {
            Some(document) => print!("[{}]> ", document.display_name),
            None => print!("> "),
        }
        std::io::Write::flush(&mut std::io::stdout())?;

        input.clear();
        if reader.read_line(&mut input).await? == 0 {
            break;
        }
        let input = input.trim();

        match parse_command(input) {
            CliCommand::Empty => continue,
            CliCommand::Exit => {
                println!("Exiting client...");
                break;
            }
            CliCommand::Help => println!("{}", HELP),
            CliCommand::Upload(path) => upload(service, &mut workspace, path).await,
            CliCommand::UploadUsage => println!("Usage: upload <path>"),
            CliCommand::List => list(&workspace),
            CliCommand::History => history(&workspace),
            CliCommand::Use(position) => match document_at(&workspace, position) {
                Some(document) => {
                    let welcome = document.welcome_text();
                    let id = document.id.clone();
                    let name = document.display_name.clone();
                    workspace.select_document(&id, &welcome);
                    println!("Now analyzing: {}", name);
                }
                None => println!("No document numbered '{}'", position),
            },
            CliCommand::Remove(position) => {
                match document_at(&workspace, position).map(|d| d.id.clone()) {
                    Some(id) => {
                        if let Some(removed) = workspace.remove_document(&id, Document::welcome_text)
                        {
                            println!("Removed {}", removed.display_name);
                        }
                    }
                    None => println!("No document numbered '{}'", position),
                }
            }
            CliCommand::Ask(question) => {
                if workspace.active_id().is_none() {
                    println!("Please upload a PDF first");
                    continue;
                }
                match workspace.send_user_message(service, question).await {
                    SendOutcome::Answered => {
                        if let Some(answer) = workspace.active_session().last() {
                            println!("{}", answer.text);
                        }
                    }
                    SendOutcome::Failed(e) => {
                        error!("Query failed: {}", e);
                        println!("Error: {}", e);
                    }
                    SendOutcome::Skipped => {}
                }
            }
        }
    }

    Ok(())
}

async fn upload(service: &dyn DocumentService, workspace: &mut Workspace, path: &str) {
    let file = match StagedFile::load(path).await {
        Ok(file) => file,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    match client::upload(service, &file).await {
        Ok(document) => {
            info!("Uploaded {} as {}", document.display_name, document.id);
            let welcome = document.welcome_text();
            println!("Added {} (id {})", document.display_name, document.id);
            workspace.add_document(document, &welcome);
        }
        Err(e) => println!("Error: {}", e),
    }
}

/// Documents are addressed by their 1-based position in `list`.
fn document_at<'a>(workspace: &'a Workspace, position: &str) -> Option<&'a Document> {
    let index = position.parse::<usize>().ok()?.checked_sub(1)?;
    workspace.documents().get(index)
}

fn list(workspace: &Workspace) {
    if workspace.documents().is_empty() {
        println!("No documents uploaded");
        return;
    }
    for (index, document) in workspace.documents().iter().enumerate() {
        let marker = if workspace.active_id() == Some(document.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {}. {} ({} bytes)",
            marker,
            index + 1,
            document.display_name,
            document.byte_size
        );
    }
}

fn history(workspace: &Workspace) {
    for message in workspace.active_session() {
        let who = match message.author {
            Author::User => "you",
            Author::Assistant => "documate",
        };
        println!("{} [{}]: {}", who, message.sent_at.format("%H:%M"), message.text);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(url) => Config::new(&url)?,
        None => Config::from_env()?,
    };
    info!("Using document service at {}", config.api_base_url);
    let service = HttpDocumentService::new(&config)?;

    run_client(&service).await
}
