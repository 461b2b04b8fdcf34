use crate::component::{MediaOrganizer, VideoCombiner};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};

pub fn run_media_organizer(term: &Term, config: &Config) -> Result<()> {
    let organizer = MediaOrganizer::new(config.clone());

    if let Err(e) = organizer.run() {
        eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_video_combiner(term: &Term, config: &Config) -> Result<()> {
    let combiner = VideoCombiner::new(config.clone());

    if let Err(e) = combiner.run() {
        eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_folder_shuffler(term: &Term, config: &Config) -> Result<()> {
    if let Err(e) = VideoCombiner::new(config.clone()).run_shuffle_only() {
        eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_folder_stitcher(term: &Term, config: &Config) -> Result<()> {
    if let Err(e) = VideoCombiner::new(config.clone()).run_stitch() {
        eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}
