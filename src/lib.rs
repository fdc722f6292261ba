pub mod activities;
pub mod companies;
pub mod contacts;
pub mod deals;
pub mod shared;
pub mod store;

#[cfg(test)]
pub mod tests;

pub use shared::error::CrmError;
pub use shared::state::CrmState;
