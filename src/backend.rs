//! Backend abstraction for single-instance lifecycle operations.
//!
//! Declarative front ends (resource schemas, CLIs) talk to the cluster
//! through this trait so they can be exercised against test doubles.

use std::future::Future;
use std::pin::Pin;

use crate::instance::{InstanceInfo, InstanceSpec};

/// Future returned by backend operations.
pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Minimal interface implemented by instance backends.
pub trait InstanceBackend {
    /// Backend specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the observed state of the named instance.
    fn read<'a>(&'a self, name: &'a str) -> BackendFuture<'a, InstanceInfo, Self::Error>;

    /// Creates an instance and resolves once the cluster reports the outcome.
    fn create(&self, spec: InstanceSpec) -> BackendFuture<'_, InstanceSpec, Self::Error>;

    /// Removes the named instance and resolves once the cluster reports the
    /// outcome.
    fn delete<'a>(&'a self, name: &'a str) -> BackendFuture<'a, (), Self::Error>;
}
