//! Listener chain
//!
//! Orders registered listeners and runs their hooks for one test.

use super::{TestContext, TestExecutionListener};
use crate::error::Result;

/// Runs [`TestExecutionListener`] hooks in listener order
///
/// Listeners are sorted by [`TestExecutionListener::order`], ascending. Listeners with
/// the same order keep their registration order.
///
/// # Example
///
/// ```rust,ignore
/// use mock_all::listener::{ListenerChain, TestContext};
/// use mock_all::MockAllListener;
///
/// let mut chain = ListenerChain::new();
/// chain.register(MockAllListener::new(catalog));
///
/// MockAllListener::reset_registry();
/// chain.prepare_test_instance(&TestContext::new(test_instance))?;
/// ```
pub struct ListenerChain {
    listeners: Vec<Box<dyn TestExecutionListener>>,
}

impl Default for ListenerChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerChain {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener
    pub fn register<L>(&mut self, listener: L) -> &mut Self
    where
        L: TestExecutionListener + 'static,
    {
        self.listeners.push(Box::new(listener));
        // Stable sort keeps registration order between equal orders.
        self.listeners.sort_by_key(|listener| listener.order());
        self
    }

    /// Execute all prepare_test_instance hooks
    ///
    /// Stops at the first failure, later listeners would see a half-prepared instance.
    pub fn prepare_test_instance(&mut self, context: &TestContext) -> Result<()> {
        tracing::info!("Preparing test instance {:?}...", context.test_instance());

        for listener in self.listeners.iter_mut() {
            tracing::debug!("Preparing with: {} (order {})", listener.name(), listener.order());
            listener.prepare_test_instance(context).map_err(|e| {
                tracing::error!("prepare_test_instance failed for {}: {}", listener.name(), e);
                e
            })?;
        }

        tracing::info!(
            "Test instance prepared ({} listeners executed)",
            self.listeners.len()
        );
        Ok(())
    }

    /// Execute all before_test_method hooks
    pub fn before_test_method(&mut self, context: &TestContext) -> Result<()> {
        for listener in self.listeners.iter_mut() {
            tracing::debug!("Before test method: {}", listener.name());
            listener.before_test_method(context).map_err(|e| {
                tracing::error!("before_test_method failed for {}: {}", listener.name(), e);
                e
            })?;
        }
        Ok(())
    }

    /// Execute all after_test_method hooks
    ///
    /// Hooks run in **reverse order**. A failing hook does not stop the others; the
    /// first failure is returned once all have run.
    pub fn after_test_method(&mut self, context: &TestContext) -> Result<()> {
        let mut first_error = None;

        for listener in self.listeners.iter_mut().rev() {
            tracing::debug!("After test method: {}", listener.name());
            if let Err(e) = listener.after_test_method(context) {
                // Log error but continue with other hooks
                tracing::error!("after_test_method failed for {}: {}", listener.name(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Orders of the registered listeners, in execution order
    pub fn orders(&self) -> Vec<i32> {
        self.listeners.iter().map(|listener| listener.order()).collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
