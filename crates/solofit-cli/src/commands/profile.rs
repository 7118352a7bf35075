//! Local profile commands.

use clap::Subcommand;
use solofit_core::{CoachingStyle, Database, Gender, Profile, ProfileUpdate};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the local profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update profile details
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        /// Weight in kilograms
        #[arg(long)]
        weight: Option<f32>,
        /// Height in centimeters
        #[arg(long)]
        height: Option<u32>,
        /// male or female
        #[arg(long)]
        gender: Option<Gender>,
        /// caring, strict or balanced
        #[arg(long)]
        coaching_style: Option<CoachingStyle>,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let profile = db.ensure_profile()?;

    match action {
        ProfileAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print_profile(&profile);
            }
        }
        ProfileAction::Set {
            name,
            age,
            weight,
            height,
            gender,
            coaching_style,
        } => {
            let update = ProfileUpdate {
                name,
                age,
                weight_kg: weight,
                height_cm: height,
                gender,
                coaching_style,
                ..Default::default()
            };
            if update.is_empty() {
                return Err("nothing to update".into());
            }
            let profile = db.apply_update(&update)?;
            print_profile(&profile);
        }
    }
    Ok(())
}

fn print_profile(profile: &Profile) {
    fn or_dash<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(|| "-".to_string(), |v| v.to_string())
    }

    println!("Name:      {}", or_dash(profile.name.as_deref()));
    println!("Age:       {}", or_dash(profile.age));
    println!("Weight:    {}", or_dash(profile.weight_kg.map(|w| format!("{w} kg"))));
    println!("Height:    {}", or_dash(profile.height_cm.map(|h| format!("{h} cm"))));
    println!("Gender:    {}", or_dash(profile.gender.map(Gender::as_str)));
    println!(
        "Coaching:  {}",
        or_dash(profile.coaching_style.map(CoachingStyle::as_str))
    );
    println!("Rank:      {}", profile.rank);
    match profile.points_to_next_rank() {
        Some(missing) => println!("Points:    {} ({missing} to next rank)", profile.points),
        None => println!("Points:    {} (top rank)", profile.points),
    }
}
