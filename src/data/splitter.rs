// ============================================================
// Layer 4 — Train/Validation/Test Splitter
// ============================================================
// Splits the filtered examples into three consecutive slices:
//   - Training set:   used to update model weights
//   - Validation set: used to measure loss on unseen data
//   - Test set:       held back for final evaluation
//
// The split is ORDERED, not shuffled. Training processes the
// examples in corpus order, one at a time, and the same corpus
// must always give the same three sets.
//
// Sizes: train = floor(n * train_fraction)
//        val   = floor(n * val_fraction)
//        test  = everything that remains
//
// Reference: Rust Book §8 (Vectors)

/// The three partitions of a corpus.
#[derive(Debug, Clone)]
pub struct Splits<T> {
    pub train: Vec<T>,
    pub val:   Vec<T>,
    pub test:  Vec<T>,
}

/// Split `samples` into (train, validation, test) without shuffling.
///
/// # Arguments
/// * `samples`        - All available samples (consumed by this function)
/// * `train_fraction` - Proportion for training, e.g. 0.7 = 70%
/// * `val_fraction`   - Proportion for validation, e.g. 0.15 = 15%
pub fn split_train_val_test<T>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    val_fraction:   f64,
) -> Splits<T> {
    let total = samples.len();

    // Truncate like an integer cast, then clamp so tiny corpora never panic
    let train_len = ((total as f64) * train_fraction).floor() as usize;
    let train_len = train_len.min(total);
    let val_len   = ((total as f64) * val_fraction).floor() as usize;
    let val_len   = val_len.min(total - train_len);

    // split_off(n) keeps [0..n] in place and returns [n..]
    let mut rest = samples.split_off(train_len);
    let test     = rest.split_off(val_len);

    tracing::debug!(
        "Dataset split: {} training, {} validation, {} test",
        samples.len(),
        rest.len(),
        test.len(),
    );

    Splits { train: samples, val: rest, test }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let s = split_train_val_test(items, 0.7, 0.15);
        assert_eq!(s.train.len(), 70);
        assert_eq!(s.val.len(),   15);
        assert_eq!(s.test.len(),  15);
    }

    #[test]
    fn test_order_is_preserved() {
        let items: Vec<usize> = (0..10).collect();
        let s = split_train_val_test(items, 0.7, 0.15);
        assert_eq!(s.train, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(s.val,   vec![7]);
        assert_eq!(s.test,  vec![8, 9]);
    }

    #[test]
    fn test_sizes_truncate() {
        // 0.7 * 9 = 6.3 → 6, 0.15 * 9 = 1.35 → 1
        let items: Vec<usize> = (0..9).collect();
        let s = split_train_val_test(items, 0.7, 0.15);
        assert_eq!((s.train.len(), s.val.len(), s.test.len()), (6, 1, 2));
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let s = split_train_val_test(items, 0.7, 0.15);
        assert!(s.train.is_empty());
        assert!(s.val.is_empty());
        assert!(s.test.is_empty());
    }

    #[test]
    fn test_fractions_over_one_are_clamped() {
        let items: Vec<usize> = (0..10).collect();
        let s = split_train_val_test(items, 0.9, 0.5);
        assert_eq!(s.train.len() + s.val.len() + s.test.len(), 10);
        assert_eq!(s.val.len(), 1);
    }
}
