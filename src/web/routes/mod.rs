pub mod account;
pub mod activities;
pub mod follow;
pub mod photos;
pub mod profiles;
