pub trait DrawStrategy: Send + Sync {
    // Returns `count` distinct participants taken from the given list. The
    // caller guarantees that `count` never exceeds the list length.
    fn pick(&self, participants: &[String], count: usize) -> Vec<String>;
}
