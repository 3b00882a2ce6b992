use clap::{Args, Subcommand};
use std::io::{self, BufRead, Write};

use crate::db::UserStore;
use crate::models::{ActivityLevel, Gender};

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Register a new user (prompts for a password)
    Register {
        /// Username (3-20 letters, digits or underscores)
        username: String,

        /// Gender: male, female or other
        #[arg(long)]
        gender: Gender,

        /// Height in centimeters
        #[arg(long)]
        height: f64,

        /// Age in years
        #[arg(long)]
        age: u32,

        /// Weight in kilograms
        #[arg(long)]
        weight: f64,

        /// Activity level: sedentary, light, moderate, very or extra
        #[arg(long, default_value = "sedentary")]
        activity: ActivityLevel,
    },

    /// Verify a user's password
    Login {
        /// Username
        username: String,
    },

    /// Show a user's profile and calorie targets
    Show {
        /// Username
        username: String,
    },

    /// Update a user's physical profile
    Update {
        /// Username
        username: String,

        /// Height in centimeters
        #[arg(long)]
        height: f64,

        /// Age in years
        #[arg(long)]
        age: u32,

        /// Weight in kilograms
        #[arg(long)]
        weight: f64,

        /// Activity level: sedentary, light, moderate, very or extra
        #[arg(long)]
        activity: ActivityLevel,
    },
}

fn prompt_password(prompt: &str) -> Result<String, io::Error> {
    print!("{}: ", prompt);
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().lock().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

impl UserCommand {
    pub fn run(&self, store: &mut UserStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            UserSubcommand::Register {
                username,
                gender,
                height,
                age,
                weight,
                activity,
            } => {
                let password = prompt_password("Password")?;
                let confirm = prompt_password("Confirm password")?;
                if password != confirm {
                    return Err("passwords do not match".into());
                }
                let user =
                    store.register(username, &password, *gender, *height, *age, *weight, *activity)?;
                println!("Registered '{}'", user.username);
            }
            UserSubcommand::Login { username } => {
                let password = prompt_password("Password")?;
                let user = store.login(username, &password)?;
                println!("Welcome back, {}", user.username);
            }
            UserSubcommand::Show { username } => {
                let user = store
                    .get(username)
                    .ok_or_else(|| format!("user not found: {}", username))?;
                println!("{}", user);
            }
            UserSubcommand::Update {
                username,
                height,
                age,
                weight,
                activity,
            } => {
                store.update_profile(username, *height, *age, *weight, *activity)?;
                println!("Updated profile for '{}'", username);
            }
        }
        Ok(())
    }
}
