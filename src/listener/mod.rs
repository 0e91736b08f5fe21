//! Test runner integration
//!
//! A host test runner drives every registered [`TestExecutionListener`] through the
//! phases of a test:
//!
//! ```text
//! 1. Test instance created by the runner
//!    ↓
//! 2. prepare_test_instance (each listener, ascending order)   ← fields injected here
//!    ↓
//! 3. before_test_method (each listener, ascending order)
//!    ↓
//! [Test body runs]
//!    ↓
//! 4. after_test_method (each listener, descending order)
//! ```

mod chain;
mod context;
mod traits;

pub use chain::ListenerChain;
pub use context::TestContext;
pub use traits::TestExecutionListener;
