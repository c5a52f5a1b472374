use std::path::PathBuf;

use clap::Parser;
use framecast_core::frames::FrameCollection;

/// Default file the generated video is written to.
pub const DEFAULT_OUTPUT: &str = "framecast.mp4";

#[derive(Parser, Debug)]
#[command(name = "framecast", version, about = "Generate a short video from reference frames")]
pub struct Args {
    /// Text prompt describing the video.
    #[arg(short, long)]
    pub prompt: String,

    /// Reference images, in order. The first one conditions the video.
    #[arg(required = true, value_name = "FRAME")]
    pub frames: Vec<PathBuf>,

    /// Move the frame at this 1-based position to the front before
    /// generating.
    #[arg(long, value_name = "POSITION")]
    pub reference: Option<usize>,

    /// Where to write the generated video.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Ask for a silent video.
    #[arg(long, default_value_t = false)]
    pub no_sound: bool,
}

impl Args {
    pub fn include_sound(&self) -> bool {
        !self.no_sound
    }

    /// Apply `--reference` by dragging that frame onto the current first
    /// frame. Returns `false` when the position is out of range.
    pub fn apply_reference(&self, frames: &mut FrameCollection) -> bool {
        let Some(position) = self.reference else {
            return true;
        };
        let ids = frames.ids();
        match (position.checked_sub(1).and_then(|i| ids.get(i)), ids.first()) {
            (Some(&dragged), Some(&first)) => dragged == first || frames.reorder(dragged, first),
            _ => false,
        }
    }
}
