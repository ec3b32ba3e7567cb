use std::{env, process::ExitCode, sync::Arc};

use chrono::{Local, NaiveDate};

use kinowatch_core::{
    config::Config,
    cycle,
    domain::{FetchMode, SourceKey},
    fetch::SourceFetcher,
    listings::ListingService,
    logging,
    seen::SeenStore,
    Error,
};
use kinowatch_render::ChromeRenderer;
use kinowatch_sources::{http, KaroFetcher, KinoformatFetcher, PradaFetcher};

const USAGE: &str = "usage: kinowatch <command>
  today                      filtered listings for today, all sources
  schedule <source> <date>   one source for a date (YYYY-MM-DD or DD.MM.YYYY)
  check [date]               report titles never seen before and record them
sources: prada, karo, kinoformat";

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = run().await {
        eprintln!("kinowatch: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run() -> kinowatch_core::Result<()> {
    logging::init("kinowatch")?;
    let cfg = Arc::new(Config::load()?);

    let client = http::build_client(&cfg);
    let renderer = Arc::new(ChromeRenderer::new(&cfg));

    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(PradaFetcher::new(client.clone())),
        Arc::new(KaroFetcher::new(client.clone(), renderer.clone())),
        Arc::new(KinoformatFetcher::new(client, renderer)),
    ];
    let service = ListingService::new(fetchers, cfg.source_timeout);

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("today") => {
            let day = Local::now().date_naive();
            let listing = cycle::daily_digest(&service, day, FetchMode::Quick).await;
            let mut first = true;
            for (key, titles) in &listing {
                if !first {
                    println!();
                }
                first = false;
                print_section(key.label(), titles);
            }
        }
        Some("schedule") => {
            let (Some(source), Some(date)) = (args.get(1), args.get(2)) else {
                return Err(Error::Config(USAGE.to_string()));
            };
            let key: SourceKey = source.parse()?;
            let day = parse_date(date)?;

            let titles = service.fetch_and_filter(key, day, FetchMode::Quick).await;
            print_section(&format!("{} — {day}", key.label()), &titles);
        }
        Some("check") => {
            let day = match args.get(1) {
                Some(date) => parse_date(date)?,
                None => Local::now().date_naive(),
            };

            let mut store = SeenStore::load(&cfg.seen_path);
            let new_titles =
                cycle::check_new_titles(&service, &mut store, day, FetchMode::Full).await?;

            if new_titles.is_empty() {
                println!("Новых фильмов нет");
            } else {
                println!("Обнаружены новые фильмы:");
                for (key, titles) in &new_titles {
                    println!();
                    print_section(key.label(), titles);
                }
            }
        }
        _ => return Err(Error::Config(USAGE.to_string())),
    }

    Ok(())
}

fn print_section(header: &str, titles: &[String]) {
    println!("{header}");
    if titles.is_empty() {
        println!("— нет данных");
    } else {
        for title in titles {
            println!("{title}");
        }
    }
}

/// Accepts ISO `YYYY-MM-DD` and the local habit `DD.MM.YYYY`.
fn parse_date(s: &str) -> kinowatch_core::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .map_err(|_| {
            Error::Config(format!(
                "invalid date: {s} (expected YYYY-MM-DD or DD.MM.YYYY)"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 9, 28).unwrap();
        assert_eq!(parse_date("2025-09-28").unwrap(), expected);
        assert_eq!(parse_date("28.09.2025").unwrap(), expected);
        assert!(parse_date("28/09/2025").is_err());
        assert!(parse_date("сегодня").is_err());
    }
}
