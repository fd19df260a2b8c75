//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `dossier_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    let log_dir = std::env::temp_dir().join("dossier-logs");
    if let Some(dir) = log_dir.to_str() {
        if let Err(err) = dossier_core::init_logging(dossier_core::default_log_level(), dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("dossier_core version={}", dossier_core::core_version());
    let mission = dossier_core::Mission::new("RFV-2026-01");
    println!(
        "seeded mission sections={} status={}",
        mission.sections.len(),
        mission.status.as_str()
    );
}
