//! Delimiter-based record encoding shared by the food store, the daily log
//! and the user store.
//!
//! All resources are line-oriented: fields are separated by `|`, keyword
//! lists by `,`. Decoding returns a structured error for malformed lines so
//! callers can report and skip them instead of mis-parsing.

use thiserror::Error;

use crate::models::{ActivityLevel, BasicFood, Gender, LogEntry, User};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid {field} '{value}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Splits a comma-separated keyword list, trimming whitespace and dropping
/// empty items. Original case is preserved.
pub fn split_keywords(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_keywords(keywords: &[String]) -> String {
    keywords.join(",")
}

fn fields(line: &str, expected: usize, line_no: usize) -> Result<Vec<&str>, CodecError> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != expected {
        return Err(CodecError::FieldCount {
            line: line_no,
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

fn invalid(line: usize, field: &'static str, value: &str) -> CodecError {
    CodecError::InvalidField {
        line,
        field,
        value: value.to_string(),
    }
}

/// `identifier|caloriesPerServing|keyword1,keyword2,...`
pub fn encode_basic(food: &BasicFood) -> String {
    format!(
        "{}|{}|{}",
        food.id,
        food.calories_per_serving,
        join_keywords(&food.keywords)
    )
}

pub fn decode_basic(line: &str, line_no: usize) -> Result<BasicFood, CodecError> {
    let fields = fields(line, 3, line_no)?;
    let calories: f64 = fields[1]
        .trim()
        .parse()
        .map_err(|_| invalid(line_no, "calories", fields[1]))?;
    Ok(BasicFood::new(fields[0], split_keywords(fields[2]), calories))
}

/// Composite block header: `identifier|keyword1,keyword2,...`
pub fn encode_composite_header(id: &str, keywords: &[String]) -> String {
    format!("{}|{}", id, join_keywords(keywords))
}

pub fn decode_composite_header(
    line: &str,
    line_no: usize,
) -> Result<(String, Vec<String>), CodecError> {
    let fields = fields(line, 2, line_no)?;
    Ok((fields[0].to_string(), split_keywords(fields[1])))
}

/// Composite component line: `componentIdentifier|servingsCount`
pub fn encode_component(id: &str, servings: u32) -> String {
    format!("{}|{}", id, servings)
}

pub fn decode_component(line: &str, line_no: usize) -> Result<(String, u32), CodecError> {
    let fields = fields(line, 2, line_no)?;
    let servings: u32 = fields[1]
        .trim()
        .parse()
        .map_err(|_| invalid(line_no, "servings", fields[1]))?;
    Ok((fields[0].to_string(), servings))
}

/// Daily log line: `foodId|servings|unixTimestamp`
pub fn encode_log_entry(entry: &LogEntry) -> String {
    format!("{}|{}|{}", entry.food_id, entry.servings, entry.timestamp)
}

pub fn decode_log_entry(line: &str, line_no: usize) -> Result<LogEntry, CodecError> {
    let fields = fields(line, 3, line_no)?;
    let servings: u32 = fields[1]
        .trim()
        .parse()
        .map_err(|_| invalid(line_no, "servings", fields[1]))?;
    let timestamp: i64 = fields[2]
        .trim()
        .parse()
        .map_err(|_| invalid(line_no, "timestamp", fields[2]))?;
    Ok(LogEntry::new(fields[0], servings, timestamp))
}

/// User line: `username|passwordHash|GENDER|height age weight activityLevel`
pub fn encode_user(user: &User) -> String {
    format!(
        "{}|{}|{}|{} {} {} {}",
        user.username,
        user.password_hash,
        user.gender.as_str(),
        user.height,
        user.age,
        user.weight,
        user.activity_level.as_index()
    )
}

pub fn decode_user(line: &str, line_no: usize) -> Result<User, CodecError> {
    let fields = fields(line, 4, line_no)?;
    let profile: Vec<&str> = fields[3].split_whitespace().collect();
    if profile.len() != 4 {
        return Err(invalid(line_no, "profile", fields[3]));
    }
    let height: f64 = profile[0]
        .parse()
        .map_err(|_| invalid(line_no, "height", profile[0]))?;
    let age: u32 = profile[1]
        .parse()
        .map_err(|_| invalid(line_no, "age", profile[1]))?;
    let weight: f64 = profile[2]
        .parse()
        .map_err(|_| invalid(line_no, "weight", profile[2]))?;
    let activity: u8 = profile[3]
        .parse()
        .map_err(|_| invalid(line_no, "activity level", profile[3]))?;

    Ok(User {
        username: fields[0].to_string(),
        password_hash: fields[1].to_string(),
        gender: Gender::from_stored(fields[2]),
        height,
        age,
        weight,
        activity_level: ActivityLevel::from_index(activity),
    })
}
