use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Source of paste identifiers. Implementations must be collision-resistant
/// over the lifetime of the store.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random alphanumeric ids, 12 characters (~71 bits of entropy).
#[derive(Debug, Clone)]
pub struct RandomIds {
    length: usize,
}

impl Default for RandomIds {
    fn default() -> Self {
        RandomIds { length: 12 }
    }
}

impl IdGenerator for RandomIds {
    fn generate(&self) -> String {
        thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}
