mod user;

pub use user::{NewUser, NewUserRecord, User, UserChanges, UserChangeset, UserId, UserRecord};
pub(crate) use user::update_timestamp;
