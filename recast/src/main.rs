//! Main binary entry point for `recast`.
//!
//! Delegates to `entry_point::run_with_args()` so every entry point behaves
//! the same.

use anyhow::Result;

fn main() -> Result<()> {
    let code = recast::entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
