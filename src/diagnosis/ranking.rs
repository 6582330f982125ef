/// Number of ranked alternatives reported with each diagnosis.
pub const TOP_K: usize = 5;

/// Index and score of the highest score. Ties resolve to the lowest index.
pub fn top1(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, score)| match best {
            Some((_, best_score)) if score <= best_score => best,
            _ => Some((i, score)),
        })
}

/// The `k` highest scores, descending. Equal scores keep their original
/// index order (stable sort).
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
    indexed.truncate(k);
    indexed
}

/// Score in `[0, 1]` as a percentage rounded to two decimals.
pub fn to_percent(score: f32) -> f64 {
    (score as f64 * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top1_finds_the_maximum() {
        let scores = [0.1, 0.7, 0.05, 0.05, 0.05, 0.05];
        assert_eq!(top1(&scores), Some((1, 0.7)));
        assert_eq!(top1(&[]), None);
    }

    #[test]
    fn top1_ties_go_to_the_first_index() {
        assert_eq!(top1(&[0.2, 0.4, 0.4]), Some((1, 0.4)));
    }

    #[test]
    fn top_k_is_descending_and_stable() {
        let scores = [0.1, 0.7, 0.05, 0.05, 0.05, 0.05];
        let ranked = top_k(&scores, TOP_K);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0], (1, 0.7));
        assert_eq!(ranked[1], (0, 0.1));
        let tied = ranked[2..].iter().map(|x| x.0).collect::<Vec<_>>();
        assert_eq!(tied, vec![2, 3, 4]);
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn top_k_with_fewer_scores_than_k() {
        assert_eq!(top_k(&[0.3, 0.6], TOP_K), vec![(1, 0.6), (0, 0.3)]);
    }

    #[test]
    fn top_k_agrees_with_top1() {
        let scores = [0.3, 0.9, 0.9, 0.1];
        assert_eq!(top_k(&scores, 1)[0], top1(&scores).unwrap());
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        assert_eq!(to_percent(0.92), 92.0);
        assert_eq!(to_percent(0.123456), 12.35);
        assert_eq!(to_percent(1.0), 100.0);
        assert_eq!(to_percent(0.0), 0.0);
    }
}
