use std::sync::Arc;

use clap::Parser;

use lmsquiz::api::{HttpPortalApi, PortalApi};
use lmsquiz::cli::{Cli, Command};
use lmsquiz::config::{self, Config};
use lmsquiz::error::{Error, Result};
use lmsquiz::session::{Session, SessionStore};
use lmsquiz::state::AppState;
use lmsquiz::tui::{self, Runtime};
use lmsquiz::viewer::{self, BlobStore, DocumentViewer};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command();
    let data_dir = config::data_dir();
    let store = SessionStore::in_dir(&data_dir);

    // Commands that never reach the portal work without a portal address.
    if !command.needs_portal() {
        lmsquiz::logging::init(&data_dir, "info")?;
        return logout(&store);
    }

    let config = Config::load(cli.config.as_deref(), cli.base_url.as_deref())?;
    let log_path = lmsquiz::logging::init(&data_dir, &config.log_level)?;
    tracing::info!(log = %log_path.display(), base_url = %config.base_url, "lmsquiz starting");

    let session = store
        .load()?
        .with_token_override(std::env::var("LMSQUIZ_TOKEN").ok());

    match command {
        Command::Login { token } => {
            let api = HttpPortalApi::new(&config, &Session::new(token.clone(), None))?;
            let profile = api.profile()?;
            println!("Signed in as {}.", profile.name);
            store.save(&Session::new(token, Some(profile)))?;
        }
        Command::Logout => logout(&store)?,
        Command::Whoami => {
            let api = signed_in_api(&config, &session)?;
            let profile = api.profile()?;
            match profile.email {
                Some(email) => println!("{} <{}>", profile.name, email),
                None => println!("{}", profile.name),
            }
        }
        Command::Results => {
            let api = signed_in_api(&config, &session)?;
            let records = api.attempts()?;
            if records.is_empty() {
                println!("No submitted attempts yet.");
            }
            for r in records {
                let score = r.score.map_or("-".to_string(), |s| format!("{:.1}", s));
                let verdict = match r.passed {
                    Some(true) => "passed",
                    Some(false) => "not passed",
                    None => "pending",
                };
                let when = r
                    .submitted_at
                    .map_or("-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
                println!("{:<16} {:<32} {:>6}  {}", when, r.assessment_title, score, verdict);
            }
        }
        Command::Materials { course } => {
            let api = signed_in_api(&config, &session)?;
            let materials = api.materials(course)?;
            if materials.is_empty() {
                println!("This course has no materials.");
            }
            for m in materials {
                println!("{:>6}  {:<10} {}", m.id, m.kind, m.title);
            }
        }
        Command::Open { material } => {
            let api = signed_in_api(&config, &session)?;
            let blobs = BlobStore::new(std::env::temp_dir().join("lmsquiz-blobs"))?;
            let mut doc = DocumentViewer::new(blobs);
            viewer::open_material(&api, &mut doc, material, |path| {
                viewer::launch_external(&config.viewer, path)
            })?;

            // The desktop viewer reads the file after the launcher returns.
            println!("Opened material {}. Press Enter when you are done with it.", material);
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            doc.close();
        }
        Command::Tui { assessment } => {
            let api = signed_in_api(&config, &session)?;
            let learner = match &session.profile {
                Some(p) => Some(p.name.clone()),
                None => match api.profile() {
                    Ok(p) => Some(p.name),
                    Err(e) => {
                        tracing::warn!(error = %e, "cannot fetch profile");
                        None
                    }
                },
            };

            let mut state = AppState::new(learner);
            let mut initial = state.load_assessments();
            if let Some(id) = assessment {
                initial.extend(state.open_assessment(id));
            }

            let runtime = Runtime::new(Arc::new(api), config.warn_at());
            tui::run_tui(state, runtime, initial)?;
        }
    }

    Ok(())
}

fn logout(store: &SessionStore) -> Result<()> {
    if store.clear()? {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

fn signed_in_api(config: &Config, session: &Session) -> Result<HttpPortalApi> {
    if !session.is_signed_in() {
        return Err(Error::Unauthorized);
    }
    HttpPortalApi::new(config, session)
}
