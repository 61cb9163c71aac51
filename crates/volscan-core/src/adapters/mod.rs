pub mod fixture;
pub mod yahoo;

pub use fixture::FixtureSource;
pub use yahoo::YahooAdapter;
