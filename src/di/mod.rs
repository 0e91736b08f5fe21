mod builder;
mod container;

pub use builder::ApplicationContextBuilder;
pub use container::{ApplicationContext, BeanContainer};
