pub mod generator;
pub mod loader;
pub mod series;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Series`).
pub use generator::{generate_series, GeneratorParams};
pub use loader::{csv_path, load_series, save_combined, save_series, COMBINED_CSV};
pub use series::{PricePoint, Series};
