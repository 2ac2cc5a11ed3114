pub mod inflation_forecast;
pub mod retirement;
