use std::collections::HashMap;

use crate::tracer::{EdgeTracer, ScanTracer, VectorProducer};

/// Registry for managing available tracers
///
/// The registry provides a central place to discover and instantiate
/// tracers. Tracers are registered by name and retrieved fresh for each
/// conversion, since they carry beam state.
pub struct TracerRegistry {
    tracers: HashMap<String, Box<dyn Fn() -> Box<dyn VectorProducer>>>,
}

impl TracerRegistry {
    /// Create a new registry with all built-in tracers
    pub fn new() -> Self {
        let mut registry = Self {
            tracers: HashMap::new(),
        };

        registry.register_builtin_tracers();
        registry
    }

    /// Register all built-in tracers
    fn register_builtin_tracers(&mut self) {
        self.tracers
            .insert("edge".to_string(), Box::new(|| Box::new(EdgeTracer::new())));

        self.tracers
            .insert("scan".to_string(), Box::new(|| Box::new(ScanTracer::new())));
    }

    /// Register a custom tracer
    ///
    /// # Arguments
    ///
    /// * `name` - Unique name for the tracer
    /// * `factory` - Function that creates new instances of the tracer
    pub fn register<F>(&mut self, name: String, factory: F)
    where
        F: Fn() -> Box<dyn VectorProducer> + 'static,
    {
        self.tracers.insert(name, Box::new(factory));
    }

    /// Get a tracer by name
    ///
    /// Returns a new instance of the requested tracer, or None if the
    /// tracer is not registered.
    pub fn get_tracer(&self, name: &str) -> Option<Box<dyn VectorProducer>> {
        self.tracers.get(name).map(|factory| factory())
    }

    /// Get all available tracer names
    pub fn available_tracers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tracers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a tracer is available
    pub fn has_tracer(&self, name: &str) -> bool {
        self.tracers.contains_key(name)
    }

    /// Get the number of registered tracers
    pub fn len(&self) -> usize {
        self.tracers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tracers.is_empty()
    }
}

impl Default for TracerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
