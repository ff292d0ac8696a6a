use colored::Colorize;
use fedboard_data::schema::econ::fred::Probe;
use fedboard_data::{CalendarState, Card, Config};

pub fn cards(cards: &[Card]) {
    println!("{:<32} {:>10}  {:<12} {}", "Indicator".bold(), "Latest".bold(), "As of".bold(), "Change".bold());
    for card in cards {
        match &card.error {
            None => println!(
                "{:<32} {:>10}  {:<12} {}",
                card.name,
                card.value.green(),
                card.as_of.map(|d| d.to_string()).unwrap_or_default(),
                card.delta.clone().unwrap_or_default().dimmed()
            ),
            Some(e) => println!("{:<32} {:>10}  {}", card.name, card.value.red(), e.red()),
        }
    }
}

pub fn calendar(state: &CalendarState) {
    match state {
        CalendarState::Unconfigured => println!(
            "{}",
            "Add a Trading Economics API key (TE_API_KEY) to show the calendar.".blue()
        ),
        CalendarState::Empty => println!("{}", "No events returned.".yellow()),
        CalendarState::Failed { message } => failure(&format!("Calendar request failed: {message}")),
        CalendarState::Events { upcoming, .. } => {
            println!("{}", "Next Up (ET)".bold());
            for event in upcoming {
                println!(
                    "{:<22} {:<40} {:>10} {:>10} {:>10}",
                    event.display_date(),
                    event.event.as_deref().unwrap_or_default(),
                    event.actual.as_deref().unwrap_or("-").green(),
                    event.forecast.as_deref().unwrap_or("-"),
                    event.previous.as_deref().unwrap_or("-").dimmed(),
                );
            }
        }
    }
}

pub fn keys(config: &Config) {
    let status = |present: bool| if present { "set".green() } else { "missing".red() };
    println!("FRED key present:              {}", status(config.fred_key_present()));
    println!("TradingEconomics key present:  {}", status(config.te_key_present()));
}

pub fn probe(probe: &Probe) -> anyhow::Result<()> {
    println!("HTTP status: {}", probe.status);
    match (&probe.error, &probe.sample) {
        (Some(e), _) => failure(e),
        (None, Some(sample)) => {
            println!("{}", "FRED request OK. Sample:".green());
            println!("{}", serde_json::to_string_pretty(sample)?);
        }
        (None, None) => println!("{}", "FRED request OK.".green()),
    }
    Ok(())
}

pub fn failure(message: &str) {
    eprintln!("{}", message.red());
}
