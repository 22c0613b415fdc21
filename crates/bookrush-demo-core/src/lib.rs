//! Headless demo harness for the bookrush engine.
//!
//! Wires a data-file shop, an engine, and an autopilot [`Clerk`] together so
//! a full shift can play out without a renderer. The clerk drives the engine
//! exclusively through the public command surface, which makes these
//! sessions double as end-to-end exercises of the input path.
//!
//! ```rust,ignore
//! use bookrush_demo_core::{ClerkStyle, DemoSession};
//!
//! let mut session = DemoSession::new(42, 1, ClerkStyle::Careful)?;
//! let result = session.run_day()?;
//! println!("{}", result.message);
//! ```

pub mod clerk;
pub mod error;
pub mod session;

pub use clerk::{Clerk, ClerkStyle};
pub use error::DemoError;
pub use session::{DemoSession, DEFAULT_STORE};
