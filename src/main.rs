//! # raw-match CLI
//!
//! Command-line interface for the raw matcher.
//!
//! ## Usage
//! ```bash
//! raw-match -p ~/Pictures/keepers -s /Volumes/CARD1 -d ~/Pictures/raw
//! raw-match --config raw-match.toml --yes --output json
//! ```

mod cli;

use raw_matcher::Result;

fn main() -> Result<()> {
    cli::run()
}
