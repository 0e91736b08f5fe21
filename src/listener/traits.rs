use super::TestContext;
use crate::error::Result;

/// Hooks a test runner calls around each test.
///
/// # Example
///
/// ```rust
/// use mock_all::listener::{TestContext, TestExecutionListener};
/// use mock_all::Result;
///
/// struct CountingListener {
///     prepared: usize,
/// }
///
/// impl TestExecutionListener for CountingListener {
///     fn prepare_test_instance(&mut self, _context: &TestContext) -> Result<()> {
///         self.prepared += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait TestExecutionListener {
    /// Position among the runner's listeners. Higher values run later.
    fn order(&self) -> i32 {
        0
    }

    /// Name used in log output
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Called once per test instance, before any test method runs
    fn prepare_test_instance(&mut self, context: &TestContext) -> Result<()>;

    /// Called before each test method
    fn before_test_method(&mut self, _context: &TestContext) -> Result<()> {
        Ok(())
    }

    /// Called after each test method, even when the test failed
    fn after_test_method(&mut self, _context: &TestContext) -> Result<()> {
        Ok(())
    }
}
