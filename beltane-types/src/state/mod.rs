pub mod arrangement;
pub mod automation;
pub mod clip;
pub mod clipboard;
pub mod note;
pub mod selection;
pub mod session;
pub mod track;
pub mod transport;

pub use arrangement::*;
pub use automation::*;
pub use clip::*;
pub use clipboard::{duplicate_selection, Clipboard, ClipboardContents};
pub use note::*;
pub use selection::*;
pub use session::*;
pub use track::*;
pub use transport::*;
