pub mod normalize;
pub mod ranking;

pub use normalize::{match_quality_label, match_reasoning, normalize_score, MatchQuality};
pub use ranking::{rank_careers, CareerRanking, RankedCareer};
