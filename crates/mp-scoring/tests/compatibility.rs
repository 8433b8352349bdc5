use mp_scoring::compatibility::{compare_profiles, Band, CompatibilityTier};
use mp_scoring::questionnaire::{MoneyPersonality, QUESTION_COUNT};
use mp_scoring::{calculate_profile, Questionnaire};

fn profile_from(groups: [u8; 5]) -> mp_core::models::profile::Profile {
    let answers: Vec<u8> = MoneyPersonality
        .groups()
        .iter()
        .zip(groups)
        .flat_map(|(group, value)| std::iter::repeat_n(value, group.len()))
        .collect();
    calculate_profile(&answers).unwrap()
}

#[test]
fn identical_profiles_are_fully_aligned() {
    let a = profile_from([2, 5, 6, 3, 7]);
    let report = compare_profiles(&a, &a.clone());

    assert_eq!(report.score, 100);
    assert_eq!(report.alignments.len(), 5);
    assert!(report.frictions.is_empty());
    assert!(report.complementary.is_empty());
    assert!(report.conversation_starters.is_empty());
    assert_eq!(report.tier, CompatibilityTier::StrongAlignment);
}

#[test]
fn score_is_symmetric() {
    let pairs = [
        ([1, 2, 3, 4, 5], [7, 6, 5, 4, 3]),
        ([4, 4, 4, 4, 4], [6, 6, 6, 6, 6]),
        ([1, 7, 1, 7, 1], [7, 1, 7, 1, 7]),
    ];
    for (x, y) in pairs {
        let a = profile_from(x);
        let b = profile_from(y);
        let ab = compare_profiles(&a, &b);
        let ba = compare_profiles(&b, &a);
        assert_eq!(ab.score, ba.score);
        assert_eq!(ab.frictions.len(), ba.frictions.len());
        assert_eq!(ab.alignments.len(), ba.alignments.len());
    }
}

#[test]
fn opposite_extremes_produce_friction_and_starters() {
    let a = profile_from([1, 1, 1, 1, 1]);
    let b = profile_from([7, 7, 7, 7, 7]);
    let report = compare_profiles(&a, &b);

    assert_eq!(report.frictions.len(), 5);
    assert_eq!(report.conversation_starters.len(), 5);
    assert!(report.categories.iter().all(|c| c.band_a == Band::Low && c.band_b == Band::High));
    // 100 - (5 * 46.29 / 270) * 100 ≈ 14
    assert_eq!(report.score, 14);
    assert_eq!(report.tier, CompatibilityTier::GrowthOpportunity);
}

#[test]
fn one_band_apart_is_complementary() {
    // 5 → 38.6 points (medium), 6 → 46.3 points (high)
    let a = profile_from([5, 5, 5, 5, 5]);
    let b = profile_from([6, 5, 5, 5, 5]);
    let report = compare_profiles(&a, &b);

    assert_eq!(report.complementary.len(), 1);
    assert_eq!(report.alignments.len(), 4);
    assert_eq!(report.conversation_starters.len(), 1);
    assert!(report.score >= 95);
}

#[test]
fn all_neutral_pair_matches_neutral() {
    let a = calculate_profile(&[4; QUESTION_COUNT]).unwrap();
    let mut b = a.clone();
    b.personality_scores.clear();

    // Missing raw scores fall back to the neutral mean.
    assert_eq!(compare_profiles(&a, &b).score, 100);
}
