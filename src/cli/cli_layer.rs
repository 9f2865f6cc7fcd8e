// Terminal adapter: argument parsing, wiring and rendering.
// Every failure is turned into a message here; nothing below this layer prints.

#[path = "render.rs"]
pub mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, Config};
use crate::core::auth::{
    AuthError, AuthService, CallbackOutcome, KeyValueStore, SystemClock, TokenManager,
};
use crate::core::sheets::search::filter_sheets;
use crate::core::sheets::{
    CardListState, ContactCard, PhoneProfile, SheetService, SheetView, SheetsError,
};
use crate::infra::google::{grid_from_json, GoogleOAuthClient, GoogleSheetsClient};
use crate::infra::storage::{InMemoryKeyValueStore, JsonKeyValueStore};

const EXIT_FAILURE: u8 = 1;
/// Exit status when the user has to authorize (again).
const EXIT_NEEDS_AUTH: u8 = 2;

/// Browse Google Sheets as searchable contact cards
#[derive(Parser, Debug)]
#[command(name = "sheet_cards", version)]
pub struct Args {
    /// Key-value store file (overrides SHEET_CARDS_STORE)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Use this access token for this run only; nothing is written to disk
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the Google consent URL for Drive/Sheets read access
    AuthUrl,

    /// Handle the OAuth callback query parameters
    Callback {
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },

    /// Show session and token state
    Status,

    /// Forget the stored token and session
    Logout,

    /// List spreadsheets, most recently modified first
    List {
        /// Only sheets whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show the first tab of a spreadsheet as cards
    Show {
        spreadsheet_id: String,

        /// Only rows containing this text in any column
        #[arg(short, long)]
        search: Option<String>,

        /// A1 range to read instead of the whole first tab
        #[arg(long)]
        range: Option<String>,

        /// Print columns and cards as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a saved values response (or a bare 2D JSON array) as cards
    Parse {
        file: PathBuf,

        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        json: bool,
    },
}

pub async fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Command::Parse { file, search, json } => parse_file(&file, search.as_deref(), json).await,
        command => run_with_google(command, args.store, args.token).await,
    }
}

async fn run_with_google(
    command: Command,
    store_path: Option<PathBuf>,
    token: Option<String>,
) -> Result<ExitCode> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let store: Arc<dyn KeyValueStore> = match &token {
        Some(_) => Arc::new(InMemoryKeyValueStore::new()),
        None => {
            let path = store_path.unwrap_or_else(|| config.store_path.clone());
            Arc::new(
                JsonKeyValueStore::open(&path)
                    .await
                    .with_context(|| format!("Failed to open store at {}", path.display()))?,
            )
        }
    };

    let tokens = TokenManager::new(store.clone(), SystemClock, config.token_policy);
    if let Some(token) = &token {
        tokens.store(token).await?;
    }

    let auth = AuthService::new(
        GoogleOAuthClient::new(config.oauth.clone()),
        store.clone(),
        SystemClock,
        config.token_policy,
    );
    let sheets = SheetService::new(GoogleSheetsClient::new(), tokens);

    match command {
        Command::AuthUrl => {
            println!("{}", auth.authorization_url()?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Callback { code, state } => {
            match auth.handle_callback(code.as_deref(), state.as_deref()).await {
                Ok(CallbackOutcome::TokenStored) => {
                    println!("Google Sheets access granted.");
                    Ok(ExitCode::SUCCESS)
                }
                Ok(CallbackOutcome::SessionStarted) => {
                    println!("Signed in.");
                    Ok(ExitCode::SUCCESS)
                }
                Ok(CallbackOutcome::LoginRequired) => {
                    eprintln!("No usable authorization code; sign in again.");
                    Ok(ExitCode::from(EXIT_NEEDS_AUTH))
                }
                Err(e) => Ok(ExitCode::from(report_auth_error(&e))),
            }
        }
        Command::Status => {
            print!("{}", render::render_status(&auth.status().await?));
            Ok(ExitCode::SUCCESS)
        }
        Command::Logout => {
            auth.sign_out().await?;
            println!("Signed out.");
            Ok(ExitCode::SUCCESS)
        }
        Command::List { search } => match sheets.list_sheets().await {
            Ok(all) => {
                let term = search.as_deref().unwrap_or("");
                let shown = filter_sheets(&all, term);
                print!("{}", render::render_sheet_list(&shown, search.as_deref()));
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(ExitCode::from(report_sheets_error(&e, "loading your spreadsheets"))),
        },
        Command::Show {
            spreadsheet_id,
            search,
            range,
            json,
        } => match sheets.load_sheet(&spreadsheet_id, range.as_deref()).await {
            Ok(view) => {
                print_view(&view, search.as_deref().unwrap_or(""), json, &config.phone_profile)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(ExitCode::from(report_sheets_error(&e, "loading the sheet"))),
        },
        Command::Parse { file, search, json } => parse_file(&file, search.as_deref(), json).await,
    }
}

async fn parse_file(file: &Path, search: Option<&str>, json: bool) -> Result<ExitCode> {
    let profile = config::phone_profile_from_env()?;
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let grid = grid_from_json(&text)?;

    let title = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Sheet".to_string());
    let view = SheetView::from_grid(title, &grid);

    print_view(&view, search.unwrap_or(""), json, &profile)?;
    Ok(ExitCode::SUCCESS)
}

fn print_view(
    view: &SheetView,
    term: &str,
    json: bool,
    profile: &PhoneProfile,
) -> Result<()> {
    let state = view.cards(term, profile);

    if json {
        println!("{}", serde_json::to_string_pretty(&view_json(view, &state))?);
    } else {
        print!("{}", render::render_cards(view, &state));
    }

    Ok(())
}

/// `--json` body. `state` keeps an empty sheet apart from a search with no
/// hits, both of which have no cards.
fn view_json(view: &SheetView, state: &CardListState) -> serde_json::Value {
    let (state_name, cards): (&str, &[ContactCard]) = match state {
        CardListState::Empty => ("empty", &[]),
        CardListState::NoMatches => ("no_matches", &[]),
        CardListState::Cards(cards) => ("cards", cards.as_slice()),
    };

    serde_json::json!({
        "title": view.title,
        "columns": view.columns,
        "primaryColumn": view.primary_column().map(|c| c.name.as_str()),
        "state": state_name,
        "cards": cards,
    })
}

/// Prints the user-facing message for a failed Google call and returns the
/// exit status.
fn report_sheets_error(err: &SheetsError, doing: &str) -> u8 {
    tracing::error!("Error {}: {}", doing, err);

    if err.needs_reauthorization() {
        eprintln!(
            "Your Google authorization is missing or has expired. \
             Run `sheet_cards auth-url` and open the link to authorize again."
        );
        return EXIT_NEEDS_AUTH;
    }

    eprintln!("Error while {}. Please try again.", doing);
    EXIT_FAILURE
}

fn report_auth_error(err: &AuthError) -> u8 {
    tracing::error!("Error during authorization: {}", err);

    match err {
        AuthError::MissingCode => {
            eprintln!("No authorization code received from Google.");
            EXIT_NEEDS_AUTH
        }
        AuthError::MissingClientSecret => {
            eprintln!("GOOGLE_CLIENT_SECRET must be set to complete the authorization.");
            EXIT_FAILURE
        }
        _ => {
            eprintln!("Sign-in failed: {}", err);
            EXIT_FAILURE
        }
    }
}
