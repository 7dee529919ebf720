use rand::seq::SliceRandom;

use crate::commands::prize::strategies::base::DrawStrategy;

// Every subset of the requested size is equally likely.
#[derive(Debug, Default)]
pub struct UniformDrawStrategy;

impl UniformDrawStrategy {
    pub fn new() -> Self {
        UniformDrawStrategy {}
    }
}

impl DrawStrategy for UniformDrawStrategy {
    fn pick(&self, participants: &[String], count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        participants
            .choose_multiple(&mut rng, count.min(participants.len()))
            .cloned()
            .collect()
    }
}
