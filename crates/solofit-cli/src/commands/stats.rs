use chrono::Utc;
use clap::Args;
use solofit_core::{Database, ProgressStats};

#[derive(Args)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let profile = db.ensure_profile()?;
    let history = db.records()?;
    let stats = ProgressStats::compute(&profile, &history, Utc::now().date_naive());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("Workouts:  {} ({} completed)", stats.total_workouts, stats.completed_workouts);
    println!("Minutes:   {}", stats.total_minutes);
    println!("Points:    {}", stats.total_points);
    println!("Streak:    {} day(s)", stats.streak_days);
    match (stats.next_rank, stats.points_to_next_rank) {
        (Some(next), Some(missing)) => {
            println!("Rank:      {} ({missing} points to {next})", stats.rank)
        }
        _ => println!("Rank:      {} (top rank)", stats.rank),
    }
    Ok(())
}
