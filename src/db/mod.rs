pub mod codec;
mod daily_log;
mod food_store;
mod user_store;

pub use daily_log::{DailyLog, LogError};
pub use food_store::{FoodStore, StoreError};
pub use user_store::{UserStore, UserStoreError};
