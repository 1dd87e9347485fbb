//! Backend selection.

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::ConfigError;

/// How the next backend is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    RoundRobin,
    Random,
}

impl Algorithm {
    /// Unknown names fall back to round-robin.
    pub fn from_name(name: &str) -> Self {
        match name {
            "random" => Algorithm::Random,
            _ => Algorithm::RoundRobin,
        }
    }
}

/// Fixed set of backend addresses shared by all client tasks.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<String>,
    algorithm: Algorithm,
    cursor: AtomicUsize,
}

impl BackendPool {
    /// Fails with `NoBackends` when `backends` is empty.
    pub fn new(backends: Vec<String>, algorithm: Algorithm) -> Result<Self, ConfigError> {
        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }
        Ok(BackendPool {
            backends,
            algorithm,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Pick the backend for the next request.
    pub fn next(&self) -> &str {
        let idx = match self.algorithm {
            Algorithm::RoundRobin => self.cursor.fetch_add(1, Ordering::Relaxed) % self.backends.len(),
            Algorithm::Random => rand::thread_rng().gen_range(0..self.backends.len()),
        };
        &self.backends[idx]
    }
}
