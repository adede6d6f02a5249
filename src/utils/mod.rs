mod payoff;
mod plotting;
mod strikes;

pub use payoff::*;
pub use plotting::*;
pub use strikes::*;
