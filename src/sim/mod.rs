pub mod event;
pub mod round;
pub mod schedule;
pub mod spawn;
pub mod step;
pub mod world;
