//! Two-profile compatibility.
//!
//! Each category's raw 1–7 mean is rescaled onto a 54-point scale and
//! bucketed into low / medium / high bands. Equal bands are alignments, one
//! band apart is a complementary dynamic, two bands apart is friction. The
//! aggregate score is driven by the absolute point gap across all five
//! categories.

use mp_core::models::profile::{Category, Profile};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::scoring::LIKERT_MAX;

/// Top of the per-category point scale.
pub const MAX_POINTS: f64 = 54.0;

/// Points at or above which a category is "medium".
pub const MEDIUM_FROM: f64 = 32.0;

/// Points at or above which a category is "high".
pub const HIGH_FROM: f64 = 45.0;

/// Floor of the aggregate score.
pub const MIN_SCORE: u8 = 5;

/// Raw mean assumed for a category a profile has no score for.
const NEUTRAL_MEAN: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Band {
    Low,
    Medium,
    High,
}

impl Band {
    pub fn from_points(points: f64) -> Self {
        if points >= HIGH_FROM {
            Band::High
        } else if points >= MEDIUM_FROM {
            Band::Medium
        } else {
            Band::Low
        }
    }

    fn rank(self) -> u8 {
        match self {
            Band::Low => 0,
            Band::Medium => 1,
            Band::High => 2,
        }
    }

    /// Number of bands between `self` and `other` (0, 1 or 2).
    pub fn distance(self, other: Band) -> u8 {
        self.rank().abs_diff(other.rank())
    }
}

/// Rescale a raw 1–7 category mean onto the 0–54 point scale.
pub fn to_points(raw_mean: f64) -> f64 {
    raw_mean / f64::from(LIKERT_MAX) * MAX_POINTS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CompatibilityTier {
    StrongAlignment,
    ComplementaryBalance,
    GrowthOpportunity,
}

impl CompatibilityTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => CompatibilityTier::StrongAlignment,
            50.. => CompatibilityTier::ComplementaryBalance,
            _ => CompatibilityTier::GrowthOpportunity,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompatibilityTier::StrongAlignment => "Strong Alignment",
            CompatibilityTier::ComplementaryBalance => "Complementary Balance",
            CompatibilityTier::GrowthOpportunity => "Growth Opportunity",
        }
    }
}

/// Per-category comparison detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryComparison {
    pub category: Category,
    pub points_a: f64,
    pub points_b: f64,
    pub band_a: Band,
    pub band_b: Band,
    pub distance: u8,
}

/// A narrative insight about one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Insight {
    pub category: Category,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompatibilityReport {
    pub score: u8,
    pub tier: CompatibilityTier,
    pub label: String,
    pub alignments: Vec<Insight>,
    pub complementary: Vec<Insight>,
    pub frictions: Vec<Insight>,
    pub conversation_starters: Vec<String>,
    pub categories: Vec<CategoryComparison>,
}

/// Compare two profiles. Deterministic and symmetric in score.
pub fn compare_profiles(a: &Profile, b: &Profile) -> CompatibilityReport {
    let mut alignments = Vec::new();
    let mut complementary = Vec::new();
    let mut frictions = Vec::new();
    let mut conversation_starters = Vec::new();
    let mut categories = Vec::with_capacity(Category::ALL.len());
    let mut total_gap = 0.0;

    for category in Category::ALL {
        let points_a = to_points(a.raw_score(category).unwrap_or(NEUTRAL_MEAN));
        let points_b = to_points(b.raw_score(category).unwrap_or(NEUTRAL_MEAN));
        let band_a = Band::from_points(points_a);
        let band_b = Band::from_points(points_b);
        let distance = band_a.distance(band_b);
        total_gap += (points_a - points_b).abs();

        let text = narrative(category);
        match distance {
            0 => alignments.push(Insight {
                category,
                title: format!("Aligned on {}", category.label()),
                description: text.aligned.to_string(),
            }),
            1 => {
                complementary.push(Insight {
                    category,
                    title: format!("Complementary {}", category.label()),
                    description: text.complementary.to_string(),
                });
                conversation_starters.push(text.starter.to_string());
            }
            _ => {
                frictions.push(Insight {
                    category,
                    title: format!("Different approaches to {}", category.label()),
                    description: text.friction.to_string(),
                });
                conversation_starters.push(text.starter.to_string());
            }
        }

        categories.push(CategoryComparison {
            category,
            points_a,
            points_b,
            band_a,
            band_b,
            distance,
        });
    }

    let score = aggregate_score(total_gap, Category::ALL.len());
    let tier = CompatibilityTier::from_score(score);

    CompatibilityReport {
        score,
        tier,
        label: tier.label().to_string(),
        alignments,
        complementary,
        frictions,
        conversation_starters,
        categories,
    }
}

fn aggregate_score(total_gap: f64, category_count: usize) -> u8 {
    let max_gap = category_count as f64 * MAX_POINTS;
    let raw = 100.0 - (total_gap / max_gap) * 100.0;
    raw.round().clamp(f64::from(MIN_SCORE), 100.0) as u8
}

struct Narrative {
    aligned: &'static str,
    complementary: &'static str,
    friction: &'static str,
    starter: &'static str,
}

fn narrative(category: Category) -> Narrative {
    match category {
        Category::Emotions => Narrative {
            aligned: "You experience money with a similar emotional temperature, which makes it easier to read each other's reactions.",
            complementary: "One of you tends to stay steadier when money is tight; that calm can anchor the other on stressful days.",
            friction: "Money stirs very different feelings in each of you. What feels routine to one can feel alarming to the other.",
            starter: "What money situation makes you most uneasy, and what helps you feel settled again?",
        },
        Category::Outlook => Narrative {
            aligned: "You share a similar sense of whether there will be enough, so long-term expectations line up naturally.",
            complementary: "One of you leans more hopeful and the other more guarded; together you can balance ambition with prudence.",
            friction: "One of you expects abundance while the other braces for scarcity, which can make the same plan look reckless or timid.",
            starter: "When you picture your finances five years from now, what do you see?",
        },
        Category::Focus => Narrative {
            aligned: "You weigh today against tomorrow in much the same way, so budgeting priorities rarely surprise each other.",
            complementary: "One of you plans further ahead; the other keeps room for enjoying the present. Each can stretch the other gently.",
            friction: "One of you saves for the future while the other spends for the moment, a classic source of tension over purchases.",
            starter: "What is one thing you would happily spend on today, and one goal you would protect at all costs?",
        },
        Category::Influence => Narrative {
            aligned: "You are similarly open to outside opinions, so you agree on when to ask for advice and when to decide alone.",
            complementary: "One of you looks outward for input while the other trusts their own judgement; combined, you get both perspectives.",
            friction: "One of you is shaped by what others do with money while the other goes their own way, which can feel like judgement.",
            starter: "Whose money habits influenced you most growing up, and which of them do you keep today?",
        },
        Category::RiskTolerance => Narrative {
            aligned: "You are comfortable with a similar level of risk, which makes shared investment decisions smoother.",
            complementary: "One of you is a little more adventurous with risk; with clear limits that difference can grow your options safely.",
            friction: "One of you seeks risk while the other avoids it. Agree on limits before big decisions to avoid stalemates.",
            starter: "How much could you comfortably see an investment drop before you would want to sell?",
        },
    }
}
