mod cli;
mod providers;
mod repl;

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Parser;
use reco_core::{
    build_documents, generate_suggestions, load_employees, load_suggestions, load_trainings,
    run_session, save_suggestions, AppConfig, BufReadSource, FlatIndex, LineSource, QaService,
};
use tracing::info;

use cli::{Cli, Commands};
use providers::{make_chat_model, make_embedder};
use repl::ReadlineSource;

fn recommend(config: &AppConfig) -> Result<()> {
    let paths = &config.paths;
    let employees = load_employees(&paths.employees)?;
    let trainings = load_trainings(&paths.trainings)?;
    info!(
        employees = employees.len(),
        trainings = trainings.len(),
        "inputs loaded"
    );

    let embedder = make_embedder(config.recommend.embedder, config)?;
    let records = generate_suggestions(&embedder, &employees, &trainings, config.recommend.top_n)?;
    save_suggestions(&paths.suggestions, &records)
        .with_context(|| format!("write {}", paths.suggestions.display()))?;

    println!("Recommandations générées avec succès.");
    println!(
        "employees={} trainings={} output={}",
        records.len(),
        trainings.len(),
        paths.suggestions.display()
    );
    Ok(())
}

fn build_service(config: &AppConfig) -> Result<QaService> {
    let records = load_suggestions(&config.paths.suggestions)?;
    let documents = build_documents(&records);

    let embedder = make_embedder(config.qa.embedder, config)?;
    let llm = make_chat_model(config)?;
    let service = QaService::build(
        &documents,
        embedder,
        Box::new(FlatIndex::new()),
        llm,
        config.qa.settings(),
    )?;
    Ok(service)
}

fn ask(config: &AppConfig, question: Option<&str>) -> Result<()> {
    let mut service = build_service(config)?;

    match question {
        Some(q) => {
            let answer = service.answer(q)?;
            println!("{answer}");
        }
        None => {
            let stdin = io::stdin();
            let mut source: Box<dyn LineSource> = if stdin.is_terminal() {
                Box::new(ReadlineSource::new().context("initialise line editor")?)
            } else {
                Box::new(BufReadSource::new(stdin.lock(), io::stdout()))
            };
            let mut out = io::stdout();
            let summary = run_session(source.as_mut(), &mut service, &mut out)?;
            out.flush()?;
            info!(
                questions = summary.questions,
                errors = summary.errors,
                "session ended"
            );
        }
    }

    service.shutdown();
    Ok(())
}

fn run() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .ok();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    match &cli.command {
        Commands::Recommend { .. } => recommend(&config),
        Commands::Ask { question, .. } => ask(&config, question.as_deref()),
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
