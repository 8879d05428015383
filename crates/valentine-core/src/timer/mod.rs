mod timeline;

pub use timeline::{TimerId, Timeline};
