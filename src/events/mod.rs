//! # Events Module
//!
//! Event-driven progress reporting.
//!
//! ## Design
//! The core library emits events through channels, so the CLI (or any other
//! front end) can drive progress bars while rayon workers do the work.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Match(MatchEvent::Evaluated { completed, total, .. }) = event {
//!             println!("Matched {}/{}", completed, total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&mut prompt, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
