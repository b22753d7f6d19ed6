mod restaurant;

pub use self::restaurant::*;
