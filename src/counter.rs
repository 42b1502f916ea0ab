//! Counters with private, per-instance state.

/// Yields 1, 2, 3, … on successive calls.
///
/// The count is owned by this value alone. Independent counters never observe each other.
#[derive(Debug, Default)]
pub struct Increment {
    count: u64,
}

/// Create a function returning 1 on its first call, and one more on each call after that.
pub fn create_increment() -> impl FnMut() -> u64 {
    let mut increment = Increment::new();
    move || increment.next_value()
}

impl Increment {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter, returning the new value.
    pub fn next_value(&mut self) -> u64 {
        self.count = self
            .count
            .checked_add(1)
            .expect("counter shouldn't exceed u64::MAX");
        self.count
    }
}

impl Iterator for Increment {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_value())
    }
}

#[cfg(test)]
mod tests {
    use super::{create_increment, Increment};

    #[test]
    fn counts_from_one() {
        let mut increment = create_increment();

        let values: Vec<_> = (0..5).map(|_| increment()).collect();

        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn instances_are_independent() {
        let mut a = create_increment();
        let mut b = create_increment();

        assert_eq!(a(), 1);
        assert_eq!(a(), 2);
        assert_eq!(b(), 1);
        assert_eq!(a(), 3);
        assert_eq!(b(), 2);
        assert_eq!(b(), 3);
    }

    #[test]
    fn iterates() {
        let values: Vec<_> = Increment::new().take(1000).collect();

        assert_eq!(values.len(), 1000);
        assert_eq!(values.first(), Some(&1));
        assert_eq!(values.last(), Some(&1000));
        assert!(values.windows(2).all(|w| w[1] == w[0] + 1));
    }
}
