//! Round-robin API token pool

use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed pool of bearer tokens handed out in round-robin order.
///
/// The pool is immutable after construction; rotation is a single atomic
/// increment, so any number of workers can call [`next()`](TokenPool::next)
/// without blocking each other. Remaining quota per token is not tracked —
/// exhaustion is discovered reactively through request failures.
pub struct TokenPool {
    tokens: Vec<String>,
    cursor: AtomicUsize,
}

impl TokenPool {
    /// Create a pool. Returns `None` for an empty token list.
    pub fn new(tokens: Vec<String>) -> Option<Self> {
        if tokens.is_empty() {
            return None;
        }
        Some(Self {
            tokens,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Next token in rotation.
    pub fn next(&self) -> &str {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        &self.tokens[i % self.tokens.len()]
    }

    /// Pool size.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false — construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl std::fmt::Debug for TokenPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tokens are secrets; show only the pool size
        f.debug_struct("TokenPool")
            .field("len", &self.tokens.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn pool(n: usize) -> TokenPool {
        TokenPool::new((0..n).map(|i| format!("token-{i}")).collect()).unwrap()
    }

    #[test]
    fn empty_pool_rejected() {
        assert!(TokenPool::new(Vec::new()).is_none());
    }

    #[test]
    fn round_robin_order() {
        let pool = pool(3);
        assert_eq!(pool.next(), "token-0");
        assert_eq!(pool.next(), "token-1");
        assert_eq!(pool.next(), "token-2");
        assert_eq!(pool.next(), "token-0");
    }

    #[test]
    fn fair_distribution() {
        // 7 calls over 3 tokens: each token returned ceil(7/3) or floor(7/3) times
        let pool = pool(3);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..7 {
            *counts.entry(pool.next().to_string()).or_default() += 1;
        }
        for count in counts.values() {
            assert!(*count == 2 || *count == 3);
        }
        assert_eq!(counts.values().sum::<usize>(), 7);
    }

    #[test]
    fn fair_under_concurrency() {
        let pool = Arc::new(pool(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    let mut counts: HashMap<String, usize> = HashMap::new();
                    for _ in 0..100 {
                        *counts.entry(pool.next().to_string()).or_default() += 1;
                    }
                    counts
                })
            })
            .collect();

        let mut totals: HashMap<String, usize> = HashMap::new();
        for handle in handles {
            for (token, count) in handle.join().unwrap() {
                *totals.entry(token).or_default() += count;
            }
        }
        // 400 calls over 4 tokens: exactly 100 each
        assert_eq!(totals.len(), 4);
        for count in totals.values() {
            assert_eq!(*count, 100);
        }
    }
}
