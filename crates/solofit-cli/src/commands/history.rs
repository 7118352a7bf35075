use clap::Args;
use solofit_core::Database;

#[derive(Args)]
pub struct HistoryArgs {
    /// Show at most this many entries
    #[arg(long, default_value = "10")]
    limit: usize,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: HistoryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut records = db.records()?;
    records.truncate(args.limit);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("no workouts yet");
        return Ok(());
    }
    for r in &records {
        let status = if r.completed { "done" } else { "partial" };
        let rank = r.rank.map(|rank| format!(" rank {rank}")).unwrap_or_default();
        println!(
            "{}  {:<10} {:<24} {:>3} min  +{} pts  {status}{rank}",
            r.performed_at.format("%Y-%m-%d %H:%M"),
            r.kind.as_str(),
            r.name,
            r.duration_secs / 60,
            r.points_earned,
        );
    }
    Ok(())
}
