use burn::data::dataset::Dataset;

/// One padded sentence, as vocabulary ids.
/// Every sample in a dataset has the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceSample {
    pub token_ids: Vec<u32>,
}

impl SentenceSample {
    pub fn new(token_ids: Vec<u32>) -> Self {
        Self { token_ids }
    }

    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }
}

pub struct SentenceDataset {
    samples: Vec<SentenceSample>,
}

impl SentenceDataset {
    pub fn new(samples: Vec<SentenceSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<SentenceSample> for SentenceDataset {
    fn get(&self, index: usize) -> Option<SentenceSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
