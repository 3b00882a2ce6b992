mod food;
mod log_entry;
mod user;

pub use food::{BasicFood, CompositeFood, FoodRef};
pub use log_entry::LogEntry;
pub use user::{ActivityLevel, Gender, User};
