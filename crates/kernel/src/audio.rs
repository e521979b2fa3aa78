//! Bridge from scene events to an external audio player.

use serde::{Deserialize, Serialize};

use crate::cycle::CycleState;
use crate::event::SceneEvent;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub day_volume: f32,
    pub night_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            day_volume: 0.4,
            night_volume: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Begin the looping forest ambience.
    StartAmbientLoop,
    StopAmbient,
    Chime,
}

/// Anything that can play cues. Implemented by the host's audio backend.
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
    fn set_ambient_volume(&mut self, volume: f32);
}

/// The ambience drops as soon as night is requested, ahead of the visual ramp.
pub fn ambient_volume(cycle: CycleState, cfg: &AudioConfig) -> f32 {
    if cycle.target_night() {
        cfg.night_volume
    } else {
        cfg.day_volume
    }
}

pub fn cue_for(event: &SceneEvent) -> Option<AudioCue> {
    match event {
        SceneEvent::SessionStarted => Some(AudioCue::StartAmbientLoop),
        SceneEvent::SessionEnded => Some(AudioCue::StopAmbient),
        SceneEvent::OneShotFired { .. } => Some(AudioCue::Chime),
        _ => None,
    }
}

/// Forward a tick's worth of events and the current ambient volume to `sink`.
pub fn drive_audio<S: AudioSink + ?Sized>(sink: &mut S, events: &[SceneEvent], volume: f32) {
    for cue in events.iter().filter_map(cue_for) {
        tracing::trace!(?cue, "audio cue");
        sink.play(cue);
    }
    sink.set_ambient_volume(volume);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        cues: Vec<AudioCue>,
        volume: Option<f32>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, cue: AudioCue) {
            self.cues.push(cue);
        }

        fn set_ambient_volume(&mut self, volume: f32) {
            self.volume = Some(volume);
        }
    }

    #[test]
    fn volume_follows_target() {
        let cfg = AudioConfig::default();
        assert_eq!(ambient_volume(CycleState::day(), &cfg), 0.4);
        assert_eq!(ambient_volume(CycleState::day().toggled(), &cfg), 0.25);
    }

    #[test]
    fn only_session_and_one_shot_events_make_sound() {
        let events = vec![
            SceneEvent::SessionStarted,
            SceneEvent::NightToggled { night: true },
            SceneEvent::OneShotFired {
                zone: "npc".into(),
                label: "gift".into(),
            },
            SceneEvent::LinkRequested { url: "u".into() },
            SceneEvent::SessionEnded,
        ];
        let mut sink = Recorder::default();
        drive_audio(&mut sink, &events, 0.25);
        assert_eq!(
            sink.cues,
            vec![AudioCue::StartAmbientLoop, AudioCue::Chime, AudioCue::StopAmbient]
        );
        assert_eq!(sink.volume, Some(0.25));
    }
}
