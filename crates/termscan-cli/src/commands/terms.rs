//! Terms command - list the built-in key terms.

use console::style;

use termscan_core::KEY_TERMS;

pub fn run() -> anyhow::Result<()> {
    println!("{}", style("Key terms (whole word, case-insensitive):").bold());
    for (i, term) in KEY_TERMS.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, term);
    }
    Ok(())
}
