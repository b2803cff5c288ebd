//! Ranking tables ordered by rating

pub mod reader;

pub use reader::{order_by_rating, ordered_pool, RankingReader};
