pub mod currencies;
pub mod setup;
pub mod ui;
