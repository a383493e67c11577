use crate::cli::Command;
use shortly_core::Clock;
use shortly_generator::Generator;
use shortly_registry::{
    evaluate_safety, share_url, KeyValueStore, Registry, RegistryError, SafetyWarning,
};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use tracing::debug;

const NOT_FOUND_MESSAGE: &str =
    "Link not found locally. This demo does not use a server redirect.";

/// Message shown for errors the user can fix by trying again differently.
/// Anything else is a hard failure and bubbles up to `main`.
fn user_message(err: &RegistryError) -> Option<&'static str> {
    match err {
        RegistryError::EmptyInput => Some("Please enter a URL"),
        RegistryError::InvalidUrl(_) => Some("Invalid URL format"),
        RegistryError::InvalidSlug(_) => Some("Invalid slug"),
        RegistryError::SlugTaken(_) => Some("Custom slug taken, choose another"),
        RegistryError::SlugExhausted { .. } => Some("Unable to generate a free slug, try again"),
        RegistryError::NotFound(_) => Some(NOT_FOUND_MESSAGE),
        RegistryError::CorruptState(_) | RegistryError::Storage(_) => None,
    }
}

fn join_warnings(warnings: &[SafetyWarning]) -> String {
    warnings
        .iter()
        .map(SafetyWarning::message)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn run<S, G, C>(
    registry: &mut Registry<S, G, C>,
    command: Command,
    base_url: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<ExitCode>
where
    S: KeyValueStore,
    G: Generator,
    C: Clock,
{
    let result = match command {
        Command::Shorten { url, slug } => {
            let slug = slug.as_deref().unwrap_or_default().trim();
            shorten(registry, &url, slug, base_url, out)
        }
        Command::Check { url } => check(&url, out),
        Command::List => list(registry, base_url, out),
        Command::Open { target, launch } => open_link(registry, target.trim(), launch, out),
        Command::Delete { slug, yes } => delete(registry, slug.trim(), yes, input, out),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            let Some(registry_err) = err.downcast_ref::<RegistryError>() else {
                return Err(err);
            };
            let Some(message) = user_message(registry_err) else {
                return Err(err);
            };
            debug!(error = %registry_err, "command rejected");
            writeln!(out, "{message}")?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn shorten<S: KeyValueStore, G: Generator, C: Clock>(
    registry: &mut Registry<S, G, C>,
    url: &str,
    slug: &str,
    base_url: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let created = registry.create_short_link(url, slug)?;

    if !created.warnings.is_empty() {
        writeln!(out, "Warnings: {}", join_warnings(&created.warnings))?;
    }
    writeln!(out, "Shortened, saved locally")?;
    writeln!(out, "{}", share_url(base_url, &created.slug)?)?;
    writeln!(out, "{}", created.record.original)?;
    Ok(())
}

fn check(url: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let warnings = evaluate_safety(url.trim());
    if warnings.is_empty() {
        writeln!(out, "No warnings")?;
    } else {
        for warning in warnings {
            writeln!(out, "- {warning}")?;
        }
    }
    Ok(())
}

fn list<S: KeyValueStore, G: Generator, C: Clock>(
    registry: &Registry<S, G, C>,
    base_url: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let links = registry.list_all();
    if links.is_empty() {
        writeln!(out, "No links yet.")?;
        return Ok(());
    }

    for (slug, record) in links {
        writeln!(
            out,
            "{}\t{}\tcreated {}",
            share_url(base_url, &slug)?,
            record.original,
            record.created_at.strftime("%Y-%m-%d %H:%M:%S UTC")
        )?;
    }
    Ok(())
}

fn open_link<S: KeyValueStore, G: Generator, C: Clock>(
    registry: &Registry<S, G, C>,
    target: &str,
    launch: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let (slug, record) = registry.open_request(target)?;
    writeln!(out, "{}", record.original)?;

    if launch {
        debug!(slug = %slug, url = %record.original, "launching link");
        open::that(&record.original)?;
    }
    Ok(())
}

fn delete<S: KeyValueStore, G: Generator, C: Clock>(
    registry: &mut Registry<S, G, C>,
    slug: &str,
    yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if !yes {
        write!(out, "Delete this link? [y/N] ")?;
        out.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            writeln!(out, "Cancelled")?;
            return Ok(());
        }
    }

    if registry.delete_link(slug)? {
        writeln!(out, "Deleted {slug}")?;
    } else {
        writeln!(out, "No link named {slug}")?;
    }
    Ok(())
}
