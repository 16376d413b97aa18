use crate::core::models::lattice::LatticeDisplacement;

/// Whether a fully visited shell contained at least one productive vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellSummary {
    pub shell: u32,
    pub productive: bool,
}

/// Integer vectors of shell `n` (max |coordinate| == n) in lexicographic order.
pub fn shell_vectors(n: u32) -> Vec<LatticeDisplacement> {
    let n = n as i32;
    let mut vectors = Vec::new();
    for i in -n..=n {
        for j in -n..=n {
            let on_face = i.abs() == n || j.abs() == n;
            if on_face {
                vectors.extend((-n..=n).map(|k| LatticeDisplacement::new(i, j, k)));
            } else if n > 0 {
                vectors.push(LatticeDisplacement::new(i, j, -n));
                vectors.push(LatticeDisplacement::new(i, j, n));
            }
        }
    }
    vectors
}

/// Lazy walk over the integer lattice, shell by shell outward from the origin.
///
/// Callers alternate [`next_displacement`](Self::next_displacement) and
/// [`report`](Self::report). The walk itself is unbounded; callers stop once
/// [`exhausted`](Self::exhausted) returns true.
#[derive(Debug, Clone)]
pub struct ShellEnumerator {
    shell: u32,
    vectors: Vec<LatticeDisplacement>,
    position: usize,
    shell_productive: bool,
    last_completed: Option<ShellSummary>,
}

impl Default for ShellEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellEnumerator {
    pub fn new() -> Self {
        Self {
            shell: 0,
            vectors: shell_vectors(0),
            position: 0,
            shell_productive: false,
            last_completed: None,
        }
    }

    /// Returns to shell 0 and forgets every reported verdict.
    pub fn restart(&mut self) {
        self.shell = 0;
        self.vectors = shell_vectors(0);
        self.position = 0;
        self.shell_productive = false;
        self.last_completed = None;
    }

    pub fn current_shell(&self) -> u32 {
        self.shell
    }

    pub fn next_displacement(&mut self) -> LatticeDisplacement {
        if self.position == self.vectors.len() {
            self.shell += 1;
            self.vectors = shell_vectors(self.shell);
            self.position = 0;
            self.shell_productive = false;
        }
        let vector = self.vectors[self.position];
        self.position += 1;
        vector
    }

    /// Records the verdict for the vector most recently returned.
    pub fn report(&mut self, productive: bool) {
        self.shell_productive |= productive;
        if self.position == self.vectors.len() {
            self.last_completed = Some(ShellSummary {
                shell: self.shell,
                productive: self.shell_productive,
            });
        }
    }

    pub fn last_completed_shell(&self) -> Option<ShellSummary> {
        self.last_completed
    }

    /// True once a completed shell beyond the origin yielded nothing productive.
    pub fn exhausted(&self) -> bool {
        matches!(
            self.last_completed,
            Some(ShellSummary { shell, productive: false }) if shell >= 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn shells_have_expected_sizes_and_reach() {
        assert_eq!(shell_vectors(0), vec![LatticeDisplacement::ZERO]);
        for n in 1..4u32 {
            let vectors = shell_vectors(n);
            let side = 2 * n as usize + 1;
            let inner = side - 2;
            assert_eq!(vectors.len(), side.pow(3) - inner.pow(3));
            assert!(vectors.iter().all(|v| v.reach() == n));
            assert_eq!(vectors.iter().collect::<HashSet<_>>().len(), vectors.len());
        }
    }

    #[test]
    fn shell_vectors_are_lexicographically_sorted() {
        let vectors = shell_vectors(2);
        assert!(vectors.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(vectors[0], LatticeDisplacement::new(-2, -2, -2));
        assert_eq!(*vectors.last().unwrap(), LatticeDisplacement::new(2, 2, 2));
    }

    fn walk_shell(enumerator: &mut ShellEnumerator, productive: bool) -> Vec<LatticeDisplacement> {
        let shell = if enumerator.position == enumerator.vectors.len() {
            enumerator.shell + 1
        } else {
            enumerator.shell
        };
        (0..shell_vectors(shell).len())
            .map(|_| {
                let v = enumerator.next_displacement();
                enumerator.report(productive);
                v
            })
            .collect()
    }

    #[test]
    fn unproductive_origin_shell_never_exhausts() {
        let mut enumerator = ShellEnumerator::new();
        walk_shell(&mut enumerator, false);
        assert_eq!(
            enumerator.last_completed_shell(),
            Some(ShellSummary {
                shell: 0,
                productive: false
            })
        );
        assert!(!enumerator.exhausted());
    }

    #[test]
    fn exhausts_after_first_unproductive_shell_beyond_origin() {
        let mut enumerator = ShellEnumerator::new();
        walk_shell(&mut enumerator, true);
        walk_shell(&mut enumerator, true);
        assert!(!enumerator.exhausted());
        let third = walk_shell(&mut enumerator, false);
        assert!(third.iter().all(|v| v.reach() == 2));
        assert!(enumerator.exhausted());
    }

    #[test]
    fn one_productive_vector_keeps_the_shell_alive() {
        let mut enumerator = ShellEnumerator::new();
        walk_shell(&mut enumerator, false);
        for index in 0..shell_vectors(1).len() {
            enumerator.next_displacement();
            enumerator.report(index == 5);
        }
        assert!(!enumerator.exhausted());
        assert_eq!(enumerator.last_completed_shell().map(|s| s.shell), Some(1));
    }

    #[test]
    fn restart_returns_to_origin() {
        let mut enumerator = ShellEnumerator::new();
        walk_shell(&mut enumerator, true);
        walk_shell(&mut enumerator, false);
        assert!(enumerator.exhausted());
        enumerator.restart();
        assert!(!enumerator.exhausted());
        assert_eq!(enumerator.next_displacement(), LatticeDisplacement::ZERO);
        assert_eq!(enumerator.current_shell(), 0);
    }
}
