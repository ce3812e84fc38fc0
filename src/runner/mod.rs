mod cursor;
mod weekloop;
mod worker;

pub use weekloop::Weekloop;
