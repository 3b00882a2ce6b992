mod food;
mod log;
mod user;

pub use food::FoodCommand;
pub use log::LogCommand;
pub use user::UserCommand;
