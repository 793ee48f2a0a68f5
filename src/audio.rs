//! Audio playback seam
//!
//! Decoding and mixing live outside this crate. The session only needs to
//! start the song once at the pre-roll boundary and stop it once at the end.

/// Song playback control
pub trait AudioSink {
    /// Start the song. May block while the backend spins up.
    fn play(&mut self);
    /// Stop the song
    fn stop(&mut self);
}

/// Audio sink for headless runs and theatre previews without a device
#[derive(Debug, Default)]
pub struct NullAudio {
    playing: bool,
}

impl NullAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl AudioSink for NullAudio {
    fn play(&mut self) {
        log::debug!("NullAudio: play");
        self.playing = true;
    }

    fn stop(&mut self) {
        log::debug!("NullAudio: stop");
        self.playing = false;
    }
}

impl<A: AudioSink + ?Sized> AudioSink for Box<A> {
    fn play(&mut self) {
        (**self).play();
    }

    fn stop(&mut self) {
        (**self).stop();
    }
}
