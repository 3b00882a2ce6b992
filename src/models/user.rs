//! User accounts and calorie-target profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Uppercase name used in the users file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }

    /// Parses the stored name; anything unrecognized falls back to `Other`.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "MALE" => Gender::Male,
            "FEMALE" => Gender::Female,
            _ => Gender::Other,
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("unknown gender: {} (expected male, female or other)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied to the BMR.
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Index used in the users file.
    pub fn as_index(&self) -> u8 {
        match self {
            ActivityLevel::Sedentary => 0,
            ActivityLevel::LightlyActive => 1,
            ActivityLevel::ModeratelyActive => 2,
            ActivityLevel::VeryActive => 3,
            ActivityLevel::ExtraActive => 4,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            1 => ActivityLevel::LightlyActive,
            2 => ActivityLevel::ModeratelyActive,
            3 => ActivityLevel::VeryActive,
            4 => ActivityLevel::ExtraActive,
            _ => ActivityLevel::Sedentary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::VeryActive => "Very Active",
            ActivityLevel::ExtraActive => "Extra Active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" | "lightly-active" => Ok(ActivityLevel::LightlyActive),
            "moderate" | "moderately-active" => Ok(ActivityLevel::ModeratelyActive),
            "very" | "very-active" => Ok(ActivityLevel::VeryActive),
            "extra" | "extra-active" => Ok(ActivityLevel::ExtraActive),
            _ => Err(format!(
                "unknown activity level: {} (expected sedentary, light, moderate, very or extra)",
                s
            )),
        }
    }
}

/// An account with the physical profile used for calorie targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub gender: Gender,
    /// Height in centimeters.
    pub height: f64,
    pub age: u32,
    /// Weight in kilograms.
    pub weight: f64,
    pub activity_level: ActivityLevel,
}

impl User {
    /// Basal metabolic rate, Mifflin-St Jeor equation.
    pub fn bmr(&self) -> f64 {
        let base = (10.0 * self.weight) + (6.25 * self.height) - (5.0 * f64::from(self.age));
        match self.gender {
            Gender::Male => base + 5.0,
            Gender::Female | Gender::Other => base - 161.0,
        }
    }

    /// Total daily energy expenditure: BMR scaled by activity level.
    pub fn tdee(&self) -> f64 {
        self.bmr() * self.activity_level.multiplier()
    }

    /// Daily calorie target, defaulting to a 500-calorie deficit.
    pub fn target_calories(&self) -> f64 {
        self.tdee() - 500.0
    }

    pub fn update_profile(
        &mut self,
        height: f64,
        age: u32,
        weight: f64,
        activity_level: ActivityLevel,
    ) {
        self.height = height;
        self.age = age;
        self.weight = weight;
        self.activity_level = activity_level;
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "User Profile:")?;
        writeln!(f, "Username: {}", self.username)?;
        writeln!(f, "Gender: {}", self.gender.as_str())?;
        writeln!(f, "Height: {} cm", self.height)?;
        writeln!(f, "Age: {} years", self.age)?;
        writeln!(f, "Weight: {} kg", self.weight)?;
        writeln!(f, "Activity Level: {}", self.activity_level.as_str())?;
        writeln!(f, "BMR: {:.0} calories", self.bmr())?;
        writeln!(f, "TDEE: {:.0} calories", self.tdee())?;
        write!(f, "Target Calories: {:.0} calories", self.target_calories())
    }
}
