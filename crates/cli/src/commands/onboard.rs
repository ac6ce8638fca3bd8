//! `plancraft onboard`: First-time setup.

use super::CmdResult;
use plancraft_config::AppConfig;

pub fn run(config: &AppConfig) -> CmdResult {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let sessions_dir = config.sessions_dir();

    println!("plancraft — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !sessions_dir.exists() {
        std::fs::create_dir_all(&sessions_dir)?;
        println!("✅ Created sessions directory: {}", sessions_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Adjust [repair] and [converter] weights in {}", config_path.display());
        println!("   2. Run: plancraft session new");
        println!("   3. Feed generator output with: plancraft session ingest <id> <file>\n");
    }

    Ok(())
}
