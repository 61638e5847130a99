//! Interactive single-operator session over the coordination service.
//!
//! This is the console counterpart of whatever transport an embedder wires
//! up: it drives one session through the list → start → next → decide loop
//! with keyboard choices, exactly the shape the service exposes to any
//! operator surface.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::cli::GlossaryAction;
use crate::config::TandemConfig;
use crate::coordinator::{CoordinatorService, DecideOutcome, Decision, ItemView, NextItem};
use crate::gateway::GenerationClient;
use crate::glossary::GlossaryStore;
use crate::store::{ItemSource, ParatranzClient, Stage};
use crate::ui::{FetchSpinner, Screen};

type Service = CoordinatorService<ParatranzClient, GenerationClient>;

fn paratranz_client(config: &TandemConfig) -> Result<ParatranzClient> {
    if config.paratranz.api_key.is_empty() {
        bail!("ParaTranz API key missing: set PARATRANZ_API_KEY or [paratranz].api_key");
    }
    if config.paratranz.project_id == 0 {
        bail!("ParaTranz project id missing: set [paratranz].project_id in tandem.toml");
    }
    Ok(ParatranzClient::new(
        config.paratranz.api_key.clone(),
        config.paratranz.project_id,
    ))
}

fn generation_client(config: &TandemConfig) -> Result<GenerationClient> {
    if config.generation.api_key.is_empty() {
        bail!("generation API key missing: set GENERATION_API_KEY or [generation].api_key");
    }
    Ok(GenerationClient::new(&config.generation))
}

fn build_service(config: &TandemConfig) -> Result<Arc<Service>> {
    let service = CoordinatorService::new(
        paratranz_client(config)?,
        generation_client(config)?,
        &config.coordinator,
        config.translation.clone(),
        GlossaryStore::new(&config.glossary.path),
        &config.glossary.seed,
    );
    Ok(Arc::new(service))
}

/// `tandem files`: print the project's files with progress.
pub async fn list_files(config: &TandemConfig) -> Result<()> {
    let store = paratranz_client(config)?;
    let files = store.list_files().await.context("could not list files")?;
    if files.is_empty() {
        Screen::new().warn("the project has no files");
        return Ok(());
    }
    Screen::new().show_files(&files);
    Ok(())
}

/// `tandem glossary ...`: inspect or edit the glossary file directly.
pub fn glossary(config: &TandemConfig, action: GlossaryAction) -> Result<()> {
    let screen = Screen::new();
    let store = GlossaryStore::new(&config.glossary.path);
    let mut glossary = store.load(&config.glossary.seed);

    match action {
        GlossaryAction::List => {
            if glossary.is_empty() {
                screen.warn("glossary is empty");
            }
            for (term, translation) in &glossary {
                println!("{term} -> {translation}");
            }
        }
        GlossaryAction::Set { term, translation } => {
            glossary.insert(term.clone(), translation);
            store.save(&glossary)?;
            screen.success(&format!("saved term: {term}"));
        }
        GlossaryAction::Remove { term } => {
            if glossary.remove(&term).is_some() {
                store.save(&glossary)?;
                screen.success(&format!("removed term: {term}"));
            } else {
                screen.warn(&format!("no such term: {term}"));
            }
        }
    }
    Ok(())
}

/// `tandem run`: drive one operator session interactively.
pub async fn run(
    config: &TandemConfig,
    file: Option<i64>,
    stage: Option<Stage>,
    review: bool,
) -> Result<()> {
    let screen = Screen::new();
    let service = build_service(config)?;

    // Ctrl+C during a rate-limit countdown abandons the wait instead of
    // leaving the process hanging until the timer fires.
    {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                service.cancel_waits();
            }
        });
    }

    let file_id = match file {
        Some(id) => id,
        None => pick_file(&service, &screen).await?,
    };

    let session = service.new_session();
    service.start(&session, file_id, stage);
    screen.success(&format!("session started on file {file_id}"));

    loop {
        let spinner = FetchSpinner::start();
        let next = service.next_item(&session).await;
        spinner.finish();

        match next {
            Ok(NextItem::Completed(stats)) => {
                screen.success("all items in this file are done");
                screen.show_stats(&stats);
                return Ok(());
            }
            Ok(NextItem::Contended) => {
                screen.warn("every remaining item is being worked on by someone else; try again shortly");
                screen.show_stats(&service.stats(&session).await?);
                return Ok(());
            }
            Ok(NextItem::Item(view)) => {
                if !handle_item(&service, &screen, &session, &view, review).await? {
                    screen.show_stats(&service.stats(&session).await?);
                    return Ok(());
                }
            }
            Err(e) => {
                screen.error(&format!("session aborted: {e}"));
                return Err(e.into());
            }
        }
    }
}

/// Present one item and apply the operator's decision. Returns false when
/// the operator quits.
async fn handle_item(
    service: &Service,
    screen: &Screen,
    session: &str,
    view: &ItemView,
    review_default: bool,
) -> Result<bool> {
    screen.show_item(view);

    loop {
        let choice = prompt("choose [1/2] candidate, [e]dit, [g]lossary, [s]kip, [q]uit: ")?;
        let decision = match choice.as_str() {
            "1" => Decision::First,
            "2" => Decision::Second,
            "e" => {
                let edited = prompt("edited translation: ")?;
                if edited.is_empty() {
                    screen.warn("empty edit discarded");
                    continue;
                }
                Decision::Edited(edited)
            }
            "g" => {
                edit_glossary(service, screen)?;
                continue;
            }
            "s" => Decision::Skip,
            "q" => return Ok(false),
            _ => {
                screen.warn("unrecognized choice");
                continue;
            }
        };

        if decision == Decision::Skip {
            service.decide(session, decision, false).await?;
            return Ok(true);
        }

        let as_review = match prompt("[1] save, [2] save as reviewed, [3] cancel: ")?.as_str() {
            "1" => false,
            "2" => true,
            "3" => {
                service.cancel_save(session)?;
                continue;
            }
            _ => review_default,
        };

        match service.decide(session, decision, as_review).await? {
            DecideOutcome::Saved => {
                screen.success("saved");
                return Ok(true);
            }
            DecideOutcome::Skipped => return Ok(true),
            DecideOutcome::SaveFailed { error } => {
                screen.error(&format!("save failed ({error}); the item is still yours"));
                continue;
            }
        }
    }
}

async fn pick_file(service: &Service, screen: &Screen) -> Result<i64> {
    let files = service.list_files().await?;
    if files.is_empty() {
        bail!("the project has no files");
    }
    screen.show_files(&files);

    loop {
        let choice = prompt(&format!("pick a file (1-{}): ", files.len()))?;
        match choice.parse::<usize>() {
            Ok(n) if (1..=files.len()).contains(&n) => return Ok(files[n - 1].id),
            _ => screen.warn("enter a number from the list"),
        }
    }
}

fn edit_glossary(service: &Service, screen: &Screen) -> Result<()> {
    let glossary = service.glossary();
    if glossary.is_empty() {
        screen.warn("glossary is empty");
    }
    for (term, translation) in &glossary {
        println!("  {term} -> {translation}");
    }

    let term = prompt("term to set/remove (empty to go back): ")?;
    if term.is_empty() {
        return Ok(());
    }
    let translation = prompt("translation (empty removes the term): ")?;
    if translation.is_empty() {
        if service.remove_term(&term)? {
            screen.success(&format!("removed term: {term}"));
        } else {
            screen.warn(&format!("no such term: {term}"));
        }
    } else {
        service.set_term(&term, &translation)?;
        screen.success(&format!("saved term: {term}"));
        screen.warn("glossary changes apply from the next batch");
    }
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
