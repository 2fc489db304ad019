//! Cyclic selection among several matches.

/// Remembers which match was filled last on a page so repeated invocations
/// walk through the candidates.
///
/// The first invocation always picks index 0. Forward steps go `0,1,2,0,...`,
/// reverse steps go `0,2,1,0,...`. A different URL or candidate count starts
/// over.
#[derive(Debug, Clone, Default)]
pub struct FillCycle {
    url: Option<String>,
    count: usize,
    position: Option<usize>,
}

impl FillCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the index to fill, or `None` when there are no
    /// candidates.
    pub fn next(&mut self, url: &str, count: usize, reverse: bool) -> Option<usize> {
        if count == 0 {
            self.reset();
            return None;
        }
        if self.url.as_deref() != Some(url) || self.count != count {
            self.url = Some(url.to_string());
            self.count = count;
            self.position = None;
        }

        let next = match self.position {
            None => 0,
            Some(p) if reverse => (p + count - 1) % count,
            Some(p) => (p + 1) % count,
        };
        self.position = Some(next);
        Some(next)
    }

    /// Index filled last, if any.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn reset(&mut self) {
        self.url = None;
        self.count = 0;
        self.position = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/login";

    #[test]
    fn test_forward_cycle() {
        let mut cycle = FillCycle::new();
        let visited: Vec<usize> = (0..6).filter_map(|_| cycle.next(URL, 3, false)).collect();
        assert_eq!(visited, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_reverse_cycle() {
        let mut cycle = FillCycle::new();
        let visited: Vec<usize> = (0..6).filter_map(|_| cycle.next(URL, 3, true)).collect();
        assert_eq!(visited, vec![0, 2, 1, 0, 2, 1]);
    }

    #[test]
    fn test_mixed_directions() {
        let mut cycle = FillCycle::new();
        assert_eq!(cycle.next(URL, 3, false), Some(0));
        assert_eq!(cycle.next(URL, 3, false), Some(1));
        assert_eq!(cycle.next(URL, 3, true), Some(0));
        assert_eq!(cycle.next(URL, 3, true), Some(2));
    }

    #[test]
    fn test_single_match_always_zero() {
        let mut cycle = FillCycle::new();
        for _ in 0..4 {
            assert_eq!(cycle.next(URL, 1, false), Some(0));
        }
    }

    #[test]
    fn test_no_matches() {
        let mut cycle = FillCycle::new();
        assert_eq!(cycle.next(URL, 0, false), None);
        assert_eq!(cycle.position(), None);
    }

    #[test]
    fn test_url_change_restarts() {
        let mut cycle = FillCycle::new();
        cycle.next(URL, 3, false);
        cycle.next(URL, 3, false);
        assert_eq!(cycle.next("https://example.com/other", 3, false), Some(0));
    }

    #[test]
    fn test_count_change_restarts() {
        let mut cycle = FillCycle::new();
        cycle.next(URL, 3, false);
        cycle.next(URL, 3, false);
        assert_eq!(cycle.next(URL, 2, false), Some(0));
    }
}
