pub mod app_settings;
pub mod app_state;
pub mod messages;
pub mod network;
pub mod predictions;
pub mod quiz;
pub mod storage;
