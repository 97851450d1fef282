use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Parser;
use clicker::model::{ClickResult, Stats};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    user_id: String,

    clicks: u32,

    #[arg(long, default_value = "http://localhost:5000")]
    url: String,
}

#[derive(Default)]
struct Tally {
    prizes: BTreeMap<String, u32>,
    effect_clicks: u32,
    last: Option<ClickResult>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = Client::new();
    let base = args.url.trim_end_matches('/');

    let pb = ProgressBar::new(args.clicks as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut tally = Tally::default();

    for _ in 0..args.clicks {
        let result: ClickResult = client
            .post(format!("{base}/api/click"))
            .json(&json!({ "userId": args.user_id }))
            .send()
            .await
            .context("click request failed")?
            .error_for_status()?
            .json()
            .await?;

        if let Some(prize) = &result.prize {
            *tally.prizes.entry(prize.clone()).or_default() += 1;
        }
        if !result.active_effects.is_empty() {
            tally.effect_clicks += 1;
        }

        pb.set_message(format!("score {}", result.total_score));
        pb.inc(1);

        tally.last = Some(result);
    }

    pb.finish_with_message("Done");

    let stats: Stats = client
        .get(format!("{base}/api/stats/{}", args.user_id))
        .send()
        .await
        .context("stats request failed")?
        .error_for_status()?
        .json()
        .await?;

    if let Some(last) = &tally.last {
        println!("\nTotal Score: {}", last.total_score);
        println!("Total Clicks: {}", last.total_clicks);
    }
    println!("Clicks With Effects: {}", tally.effect_clicks);

    if tally.prizes.is_empty() {
        println!("No prizes this run.");
    } else {
        println!("\nPrizes:");
        for (name, count) in &tally.prizes {
            println!("  {name}: {count}");
        }
    }

    match stats {
        Stats::Found(record) => println!("\nStored Prizes: {}", record.prizes.len()),
        Stats::Unknown(_) => println!("\nNo stored record for {}", args.user_id),
    }

    Ok(())
}
