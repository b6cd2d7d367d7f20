mod hostname;
mod scoped_timer;

pub(crate) use hostname::*;
pub(crate) use scoped_timer::*;
