use anyhow::Result;
use auto_media_organize::config::Config;
use auto_media_organize::init;
use auto_media_organize::menu::show_main_menu;
use console::{Term, style};
use log::{info, warn};

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let mut config = Config::new()?;
    info!("程式啟動");

    loop {
        match show_main_menu(&term, &mut config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style("再見！").green().bold());
                info!("程式正常結束");
                break;
            }
            Err(e) => {
                warn!("程式錯誤: {e:#}");
                eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}
