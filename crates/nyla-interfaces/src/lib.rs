//! # Nyla Interfaces
//!
//! The data exchanged by the tracker (`PageviewEvent`, `PageviewOverrides`)
//! and the capabilities it needs from its host: reading the current page
//! (`PageContext`) and observing client-side navigation (`NavigationSource`).
//!
//! `MemoryPage` implements both capabilities in memory, with a history
//! stack, for tests and headless hosts.

mod event;
mod memory;
mod navigation;
mod page;

pub use event::*;
pub use memory::*;
pub use navigation::*;
pub use page::*;
