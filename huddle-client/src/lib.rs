mod driver;
mod media;
mod session;
mod transport;

pub use driver::*;
pub use media::*;
pub use session::*;
pub use transport::*;
