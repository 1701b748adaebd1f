//! Request-parameter stabilization
//!
//! Callers that rebuild their query parameters on every render or tick use
//! [`StableParams`] to learn whether anything actually changed before issuing
//! another request.

/// Remembers the last parameters a request was issued with
#[derive(Debug, Clone, Default)]
pub struct StableParams<P> {
    current: Option<P>,
}

impl<P: PartialEq + Clone> StableParams<P> {
    /// Creates an empty tracker; the first [`update`](Self::update) always reports a change
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Records `params`, returning true if they differ from the last recorded value
    pub fn update(&mut self, params: &P) -> bool {
        if self.current.as_ref() == Some(params) {
            return false;
        }
        self.current = Some(params.clone());
        true
    }

    /// Returns the last recorded parameters
    pub fn current(&self) -> Option<&P> {
        self.current.as_ref()
    }

    /// Forgets the recorded parameters so the next update reports a change
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct ExpenseQuery {
        month: u32,
        category: Option<String>,
    }

    #[test]
    fn test_first_update_is_a_change() {
        let mut params = StableParams::new();
        assert!(params.update(&ExpenseQuery {
            month: 3,
            category: None
        }));
    }

    #[test]
    fn test_equal_params_are_stable() {
        let mut params = StableParams::new();
        let query = ExpenseQuery {
            month: 3,
            category: Some("food".into()),
        };
        assert!(params.update(&query));
        assert!(!params.update(&query.clone()));

        let changed = ExpenseQuery {
            month: 4,
            ..query
        };
        assert!(params.update(&changed));
        assert_eq!(params.current(), Some(&changed));
    }

    #[test]
    fn test_invalidate_forces_change() {
        let mut params = StableParams::new();
        params.update(&1u32);
        params.invalidate();
        assert!(params.update(&1u32));
    }
}
