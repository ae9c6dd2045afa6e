pub mod account_service;
pub mod activities_service;
pub mod follow_service;
pub mod photo_service;
pub mod photo_storage;
pub mod profile_service;
pub mod token_service;
