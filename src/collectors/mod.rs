pub mod markers;
pub mod space;
pub mod topology;
