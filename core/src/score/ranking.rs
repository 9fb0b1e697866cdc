use serde::{Deserialize, Serialize};

use super::normalize::{match_reasoning, normalize_score, MatchQuality};

/// One career recommendation as returned by the scoring API.
///
/// The API sends `[code, title, score]` triples; named objects are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RankingWire")]
pub struct CareerRanking {
    pub code: String,
    pub title: String,
    pub score: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RankingWire {
    Triple(String, String, f64),
    Named {
        code: String,
        title: String,
        score: f64,
    },
}

impl From<RankingWire> for CareerRanking {
    fn from(wire: RankingWire) -> Self {
        match wire {
            RankingWire::Triple(code, title, score) | RankingWire::Named { code, title, score } => {
                Self { code, title, score }
            }
        }
    }
}

/// A ranking annotated for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCareer {
    pub rank: usize,
    pub code: String,
    pub title: String,
    pub score: f64,
    pub percentage: u8,
    pub quality: MatchQuality,
    pub label: &'static str,
    pub reasoning: &'static str,
}

impl RankedCareer {
    fn new(rank: usize, ranking: &CareerRanking) -> Self {
        let percentage = normalize_score(ranking.score);
        let quality = MatchQuality::from_percentage(percentage);
        Self {
            rank,
            code: ranking.code.clone(),
            title: ranking.title.clone(),
            score: ranking.score,
            percentage,
            quality,
            label: quality.label(),
            reasoning: match_reasoning(percentage),
        }
    }
}

/// Top `limit` careers by raw score, best first. Ties keep input order; NaN
/// scores sort last.
pub fn rank_careers(rankings: &[CareerRanking], limit: usize) -> Vec<RankedCareer> {
    let mut ordered: Vec<&CareerRanking> = rankings.iter().collect();
    ordered.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));

    ordered
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, r)| RankedCareer::new(idx + 1, r))
        .collect()
}

fn sort_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}
