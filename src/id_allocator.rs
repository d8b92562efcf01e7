/// Order identifier allocation
///
/// Hands out 0, 1, 2, ... with no reuse. One allocator per run, owned by the
/// pipeline driving generation.

#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { next: 0 }
    }

    /// Issue the next identifier
    pub fn next(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of identifiers issued so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(), 0);
        assert_eq!(ids.next(), 1);
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_strictly_increasing() {
        let mut ids = IdAllocator::default();
        let issued: Vec<u64> = (0..1000).map(|_| ids.next()).collect();
        assert!(issued.windows(2).all(|w| w[1] == w[0] + 1));
    }
}
