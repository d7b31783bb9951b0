mod template;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cal2org_core::{DEFAULT_OCCURRENCE_CAP, ics, render_event};
use chrono_tz::Tz;
use clap::Parser;

#[derive(Parser)]
#[command(name = "cal2org")]
#[command(about = "Convert an iCalendar (.ics) file to an org-mode outline")]
struct Cli {
    /// Input ICS file to convert
    input_file: PathBuf,

    /// Target IANA timezone (e.g. "Europe/Paris"; defaults to the system timezone)
    #[arg(short, long)]
    timezone: Option<String>,

    /// Output template with {summary}, {dates}, {description}, {location} placeholders
    #[arg(short = 'T', long)]
    template: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let tz = resolve_timezone(cli.timezone.as_deref())?;

    let content = fs::read_to_string(&cli.input_file)
        .with_context(|| format!("Failed to read {}", cli.input_file.display()))?;
    let events = ics::parse_calendar(&content)
        .with_context(|| format!("Failed to parse {}", cli.input_file.display()))?;

    let template = cli
        .template
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {}", path.display()))
        })
        .transpose()?;

    for event in &events {
        let rendered = render_event(event, tz, DEFAULT_OCCURRENCE_CAP)
            .with_context(|| format!("Failed to render event '{}'", event.summary))?;
        match &template {
            Some(tpl) => println!("{}", template::apply(tpl, &rendered.fields())),
            None => println!("{}", rendered.org_fragment()),
        }
    }

    Ok(())
}

/// Parse the requested timezone, or fall back to the system zone.
fn resolve_timezone(arg: Option<&str>) -> Result<Tz> {
    let name = match arg {
        Some(name) => name.to_string(),
        None => iana_time_zone::get_timezone().context("Failed to detect the system timezone")?,
    };
    name.parse().map_err(|_| {
        anyhow::anyhow!("Invalid timezone '{name}': use an IANA name like Europe/Paris")
    })
}
