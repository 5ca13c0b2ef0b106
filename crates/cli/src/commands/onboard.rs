//! `tutoragent onboard` — Print a starter configuration file.

use tutoragent_config::AppConfig;

pub fn run() {
    println!("# TutorAgent configuration — save as tutoragent.toml");
    println!("# Set GEMINI_API_KEY in the environment rather than writing it here.");
    println!();
    println!("{}", AppConfig::default_toml());
}
