//! Command-line menu fetcher.
//!
//! Pulls the Sodexo feed for a range of days around today, runs each day
//! through the same transformation pipeline the server uses, and writes
//! the canonical documents to disk. Handy for checking what the feed will
//! serve before it goes live.

use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, Local};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use menu::{fetch::SodexoClient, flags::MealFlags, transform, windows::MealSchedule};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    days_before: u32,

    days_after: u32,

    /// Directory the per-date menu documents are written to.
    #[arg(long, default_value = "menus")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let api_key = env::var("SODEXO_API_KEY").unwrap_or_default();
    let location_id = env::var("SODEXO_LOCATION_ID").unwrap_or_else(|_| "73110001".to_string());
    let site_id = env::var("SODEXO_SITE_ID").unwrap_or_else(|_| "22135".to_string());
    let sodexo = SodexoClient::new(&api_key, &location_id, &site_id);

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let now = Local::now().naive_local();
    let today = now.date();
    let schedule = MealSchedule::default();
    let no_flags = MealFlags::new();

    let pb = ProgressBar::new((args.days_before + args.days_after + 1) as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap()
        .progress_chars("=> "),
    );

    let mut saved = 0;

    for offset in -(args.days_before as i32)..=(args.days_after as i32) {
        let date = today + Duration::days(offset as i64);
        pb.set_message(format!("Fetching {date}"));

        match sodexo.fetch(date).await {
            Ok(raw_meals) => {
                match transform::transform(raw_meals, date, now, &no_flags, &schedule) {
                    Some(document) => {
                        let items: usize = document
                            .meals
                            .iter()
                            .flat_map(|meal| &meal.stations)
                            .map(|station| station.items.len())
                            .sum();

                        let path = args.out_dir.join(format!("{date}.json"));
                        let contents = serde_json::to_string_pretty(&document)?;
                        fs::write(&path, contents)
                            .with_context(|| format!("writing {}", path.display()))?;

                        println!("{date}: {} meals, {items} items", document.meals.len());
                        saved += 1;
                    }
                    None => println!("{date}: no menu published"),
                }
            }
            Err(e) => println!("{date}: fetch failed: {e}"),
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("\nSaved {saved} menu document(s) to {}", args.out_dir.display());

    Ok(())
}
