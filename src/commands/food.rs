use clap::{Args, Subcommand, ValueEnum};
use serde_json::json;

use crate::db::FoodStore;
use crate::models::FoodRef;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// Add a basic food
    AddBasic {
        /// Food identifier
        id: String,

        /// Calories per serving
        #[arg(long)]
        calories: f64,

        /// Search keyword (can be repeated)
        #[arg(long = "keyword", value_name = "KEYWORD")]
        keywords: Vec<String>,
    },

    /// Add an empty composite food
    AddComposite {
        /// Food identifier
        id: String,

        /// Search keyword (can be repeated)
        #[arg(long = "keyword", value_name = "KEYWORD")]
        keywords: Vec<String>,
    },

    /// Add or replace a component of a composite food
    AddComponent {
        /// Composite food identifier
        id: String,

        /// Component food identifier
        component: String,

        /// Servings of the component
        #[arg(long, default_value = "1")]
        servings: u32,
    },

    /// Remove a component from a composite food
    RemoveComponent {
        /// Composite food identifier
        id: String,

        /// Component food identifier
        component: String,
    },

    /// Show a food's details
    Show {
        /// Food identifier
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Search foods by keyword
    Search {
        /// Query keyword (can be repeated; none lists everything with --match-all)
        #[arg(long = "keyword", value_name = "KEYWORD")]
        keywords: Vec<String>,

        /// Require every query keyword to match
        #[arg(long)]
        match_all: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl FoodCommand {
    pub fn run(&self, store: &mut FoodStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FoodSubcommand::AddBasic {
                id,
                calories,
                keywords,
            } => {
                if *calories < 0.0 {
                    return Err("calories must be non-negative".into());
                }
                store.add_basic_food(id.clone(), keywords.clone(), *calories);
                store.save()?;
                println!("Added basic food '{}'", id);
            }
            FoodSubcommand::AddComposite { id, keywords } => {
                store.add_composite_food(id.clone(), keywords.clone());
                store.save()?;
                println!("Added composite food '{}'", id);
            }
            FoodSubcommand::AddComponent {
                id,
                component,
                servings,
            } => {
                if *servings == 0 {
                    return Err("servings must be positive".into());
                }
                store.add_component(id, component, *servings)?;
                store.save()?;
                let calories = store
                    .get_composite(id)
                    .map(|f| f.calories_per_serving)
                    .unwrap_or(0.0);
                println!(
                    "Added {} x{} to '{}' ({} calories per serving)",
                    component, servings, id, calories
                );
            }
            FoodSubcommand::RemoveComponent { id, component } => {
                store.remove_component(id, component);
                store.save()?;
                println!("Removed {} from '{}'", component, id);
            }
            FoodSubcommand::Show { id, format } => {
                let Some(food) = store.get_food(id) else {
                    return Err(format!("food not found: {}", id).into());
                };
                match format {
                    OutputFormat::Text => match food {
                        FoodRef::Basic(f) => println!("{}", f),
                        FoodRef::Composite(f) => println!("{}", f),
                    },
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&food_json(&food))?),
                }
            }
            FoodSubcommand::Search {
                keywords,
                match_all,
                format,
            } => {
                let results = store.search_foods(keywords, *match_all);
                match format {
                    OutputFormat::Text => {
                        if results.is_empty() {
                            println!("No foods found");
                        }
                        for food in &results {
                            let kind = if food.is_composite() { "composite" } else { "basic" };
                            println!(
                                "{} ({}, {} cal/serving) [{}]",
                                food.id(),
                                kind,
                                food.calories_per_serving(),
                                food.keywords().join(", ")
                            );
                        }
                    }
                    OutputFormat::Json => {
                        let foods: Vec<_> = results.iter().map(food_json).collect();
                        println!("{}", serde_json::to_string_pretty(&foods)?);
                    }
                }
            }
        }
        Ok(())
    }
}

fn food_json(food: &FoodRef<'_>) -> serde_json::Value {
    match food {
        FoodRef::Basic(f) => json!({
            "type": "basic",
            "id": f.id,
            "keywords": f.keywords,
            "calories_per_serving": f.calories_per_serving,
        }),
        FoodRef::Composite(f) => json!({
            "type": "composite",
            "id": f.id,
            "keywords": f.keywords,
            "calories_per_serving": f.calories_per_serving,
            "components": f.components,
        }),
    }
}
