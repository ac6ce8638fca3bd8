//! `plancraft status`: Show configuration and stored sessions.

use super::CmdResult;
use super::session::open_store;
use plancraft_config::AppConfig;

pub async fn run(config: &AppConfig) -> CmdResult {
    println!("plancraft Status");
    println!("================");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  Sessions:       {}", config.sessions_dir().display());
    println!("  Backend:        {}", config.session.backend);
    println!("  Log level:      {}", config.logging.level);
    println!(
        "  Converter:      category={:.2} item={:.2} min_distance={:.1}",
        config.converter.default_category_weight,
        config.converter.default_item_weight,
        config.converter.default_min_distance
    );
    println!(
        "  Repair:         hub={:.2} path-entrance={:.2} raise {:.2}→{:.2}",
        config.repair.hub_weight,
        config.repair.path_entrance_weight,
        config.repair.min_connection_weight,
        config.repair.raised_connection_weight
    );

    let sessions = open_store(config).list().await?;
    println!("  Stored:         {} session(s)", sessions.len());

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `plancraft onboard` first");
    }

    Ok(())
}
