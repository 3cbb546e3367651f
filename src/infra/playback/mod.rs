//! Destinations a synthesized artifact can be handed to.

mod file_drop;
mod local;
pub mod speaker;

pub use file_drop::FileDrop;
pub use local::LocalPlayer;
pub use speaker::SpeakerServer;

/// Command other processes understand as "play the file in `data`".
const PLAY_COMMAND: &str = "play";

/// Where a consumer outside this process finds the artifact called `name`.
fn public_path(public_location: &str, name: &str) -> String {
  if public_location.is_empty() || public_location.ends_with(['/', '\\']) {
    format!("{}{}", public_location, name)
  } else {
    format!("{}/{}", public_location, name)
  }
}
