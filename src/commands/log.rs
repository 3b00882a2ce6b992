use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use serde_json::json;

use super::food::OutputFormat;
use crate::db::{DailyLog, FoodStore};

#[derive(Args)]
pub struct LogCommand {
    #[command(subcommand)]
    pub command: LogSubcommand,
}

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Log servings of a food
    Add {
        /// Food identifier
        food_id: String,

        /// Number of servings
        #[arg(long, default_value = "1")]
        servings: u32,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Remove an entry by its index in the day's log
    Remove {
        /// Zero-based entry index (as printed by `log show`)
        index: usize,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show a day's entries
    Show {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a day's total calories
    Total {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Undo the most recent log mutation
    Undo,
}

fn date_string(date: &Option<NaiveDate>) -> String {
    (*date)
        .unwrap_or_else(|| Local::now().date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

impl LogCommand {
    pub fn run(
        &self,
        log: &mut DailyLog,
        store: &FoodStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            LogSubcommand::Add {
                food_id,
                servings,
                date,
            } => {
                if *servings == 0 {
                    return Err("servings must be positive".into());
                }
                let date = date_string(date);
                if store.get_food(food_id).is_none() {
                    // Logging is decoupled from food existence; warn but
                    // proceed.
                    tracing::warn!("food '{}' is not in the store", food_id);
                }
                log.add_entry(&date, food_id, *servings)?;
                println!("Logged {} x{} on {}", food_id, servings, date);
            }
            LogSubcommand::Remove { index, date } => {
                let date = date_string(date);
                // Touch the date first so removal works in a fresh process.
                let len = log.get_log(&date)?.len();
                log.remove_entry(&date, *index)?;
                if *index < len {
                    println!("Removed entry {} from {}", index, date);
                } else {
                    println!("No entry {} on {}", index, date);
                }
            }
            LogSubcommand::Show { date, format } => {
                let date = date_string(date);
                let entries = log.get_log(&date)?;
                match format {
                    OutputFormat::Text => {
                        if entries.is_empty() {
                            println!("No entries for {}", date);
                        }
                        for (i, entry) in entries.iter().enumerate() {
                            println!("{}: {}", i, entry);
                        }
                    }
                    OutputFormat::Json => {
                        let entries: Vec<_> = entries
                            .iter()
                            .map(|e| {
                                json!({
                                    "food_id": e.food_id,
                                    "servings": e.servings,
                                    "timestamp": e.timestamp,
                                })
                            })
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                }
            }
            LogSubcommand::Total { date } => {
                let date = date_string(date);
                let total =
                    log.total_calories(&date, |id, servings| store.calculate_calories(id, servings))?;
                println!("Total for {}: {:.0} calories", date, total);
            }
            LogSubcommand::Undo => {
                if log.undo()? {
                    println!("Undid last log change");
                } else {
                    println!("Nothing to undo");
                }
            }
        }
        Ok(())
    }
}
