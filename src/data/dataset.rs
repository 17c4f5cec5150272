use burn::data::dataset::Dataset;

use crate::domain::example::SummaryExample;

/// Vectorised examples of one split, served in corpus order.
pub struct SummaryDataset {
    examples: Vec<SummaryExample>,
}

impl SummaryDataset {
    pub fn new(examples: Vec<SummaryExample>) -> Self { Self { examples } }
}

impl Dataset<SummaryExample> for SummaryDataset {
    fn get(&self, index: usize) -> Option<SummaryExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_in_order() {
        let v: Arc<[f32]> = Arc::from(&[1.0f32][..]);
        let ds = SummaryDataset::new(vec![
            SummaryExample::new(vec![v.clone(); 3], vec![v.clone(); 2]),
            SummaryExample::new(vec![v.clone(); 5], vec![v; 2]),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).map(|e| e.seq_len()), Some(5));
        assert!(ds.get(2).is_none());
    }
}
