//! Account records and the stores that own them.

mod database;
mod memory;
mod model;
pub mod password;
mod store;

pub use database::SeaOrmAccountStore;
pub use memory::InMemoryAccountStore;
pub use model::{Account, AccountPolicy, NewAccount, Role, normalize_username};
pub use store::AccountStore;
