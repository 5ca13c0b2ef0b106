//! `tutoragent doctor` — Diagnose configuration and connectivity.

use std::path::PathBuf;

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 TutorAgent Doctor — System Diagnostics");
    println!("=========================================\n");

    let mut issues = 0;

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue found. See above for details.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key — export GEMINI_API_KEY or add api_key to tutoragent.toml");
        issues += 1;
    }

    match tutoragent_store::build_from_config(&config).await {
        Ok(store) => match store.ping().await {
            Ok(()) => println!("  ✅ Session store reachable ({})", store.name()),
            Err(e) => {
                println!("  ❌ Session store ping failed: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Session store unavailable: {e}");
            issues += 1;
        }
    }

    if config.has_api_key() {
        match tutoragent_providers::build_from_config(&config) {
            Ok(provider) => match provider.health_check().await {
                Ok(true) => println!("  ✅ Model endpoint reachable ({})", provider.name()),
                Ok(false) => {
                    println!("  ⚠️  Model endpoint reachable but rejected the probe");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Model endpoint unreachable: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Provider setup failed: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
