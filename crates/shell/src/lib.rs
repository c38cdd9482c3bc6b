//! The user-facing layer over the globe: panels, status banners, intents and
//! the mounted [`GlobeView`].

pub mod error;
pub mod format;
pub mod info;
pub mod intent;
pub mod options;
pub mod solar;
pub mod status;
pub mod view;

pub use error::*;
pub use info::*;
pub use intent::*;
pub use options::*;
pub use solar::*;
pub use status::*;
pub use view::*;
