mod restaurant;
mod schedule;
mod search;

pub use self::restaurant::*;
pub use self::schedule::*;
pub use self::search::*;
