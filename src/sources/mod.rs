pub mod cheapshark;
pub mod rawg;
pub mod traits;

pub use cheapshark::CheapSharkClient;
pub use rawg::RawgClient;
pub use traits::{DealSource, GameCatalog};
