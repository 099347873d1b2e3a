use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod commands;
mod display;

use commands::{Command, HELP};
use patient_lookup_cell::{DirectorySink, LookupSession, PrintView, SearchOutcome};
use shared_config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "mediqueue-lookup", about = "Look up a patient and export prescriptions")]
struct Args {
    /// Where downloads and print views are written
    #[arg(long, env = "EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Operator access token forwarded to the store
    #[arg(long, env = "SUPABASE_USER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Run one search, print the result and exit
    query: Option<String>,
}

struct Repl {
    session: LookupSession,
    sink: DirectorySink,
    config: AppConfig,
    token: Option<String>,
}

impl Repl {
    /// Returns false once the operator asks to quit.
    async fn handle(&self, command: Command) -> bool {
        let offset = self.config.clinic_offset();

        match command {
            Command::Empty => {}
            Command::Quit => return false,
            Command::Help => println!("{}", HELP),
            Command::Invalid(reason) => println!("{}", reason),
            Command::Clear => self.session.reset(),
            Command::Search(query) => self.search(&query).await,
            Command::ShowVisits => println!("{}", display::visits_tab(&self.session.snapshot(), &offset)),
            Command::ShowHistory => println!("{}", display::history_tab(&self.session.snapshot(), &offset)),
            Command::View(n) => {
                let state = self.session.snapshot();
                match (state.patient.as_ref(), state.history.get(n - 1)) {
                    (Some(patient), Some(record)) => {
                        println!("{}", display::record_detail(record, patient, &offset))
                    }
                    _ => println!("No medical record #{}", n),
                }
            }
            Command::Download(n) => match self.record_id(n) {
                Some(id) => match self.session.download(id, &self.sink) {
                    Ok(filename) => match self.sink.download_path(&filename) {
                        Ok(path) => println!("Saved {}", path.display()),
                        Err(_) => println!("Saved {}", filename),
                    },
                    Err(e) => println!("{}", e.user_message()),
                },
                None => println!("No medical record #{}", n),
            },
            Command::Print(n) => match self.record_id(n) {
                Some(id) => match self.session.print(id, &self.sink) {
                    Ok(PrintView::Opened) => println!("Print view written to {}", self.sink.dir().display()),
                    Ok(PrintView::Blocked) => println!("Print view could not be created."),
                    Err(e) => println!("{}", e.user_message()),
                },
                None => println!("No medical record #{}", n),
            },
        }

        true
    }

    async fn search(&self, query: &str) {
        let offset = self.config.clinic_offset();

        match self.session.search(query, self.token.as_deref()).await {
            SearchOutcome::Ignored => {}
            SearchOutcome::Busy => println!("A search is already running."),
            SearchOutcome::Found(result) => {
                println!("{}", display::patient_card(&result.patient, &self.session.snapshot(), &offset));
            }
            SearchOutcome::Failed(error) => println!("{}", error.user_message()),
        }
    }

    fn record_id(&self, n: usize) -> Option<Uuid> {
        self.session.snapshot().history.get(n - 1).map(|record| record.id)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();
    let export_dir = args.export_dir.unwrap_or_else(|| config.export_dir.clone());

    let repl = Repl {
        session: LookupSession::new(&config),
        sink: DirectorySink::new(export_dir),
        config,
        token: args.token,
    };

    if let Some(query) = args.query {
        repl.search(&query).await;
        return Ok(());
    }

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !repl.handle(Command::parse(&line)).await {
            break;
        }
    }

    Ok(())
}
