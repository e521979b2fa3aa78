use std::fmt::Write;

use glam::{Mat4, Vec3};
use glade_kernel::{CelestialBody, SceneSnapshot};

use crate::overlay::{OverlayText, prompts};

/// Projection settings. The eye and gaze come from the snapshot's camera.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

impl RenderView {
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer only ever sees an immutable snapshot; it cannot reach back into
/// the world.
pub trait Renderer {
    type Output;

    /// Render one frame.
    fn render(&self, scene: &SceneSnapshot<'_>, view: &RenderView) -> Self::Output;
}

/// Plain-text dump of a frame for CLI output, logs, and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    text: OverlayText,
    /// List every scattered tree instead of just the count.
    pub list_scatter: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlay(text: OverlayText) -> Self {
        Self {
            text,
            list_scatter: false,
        }
    }
}

fn v3(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneSnapshot<'_>, view: &RenderView) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_frame(&mut out, scene, view);
        out
    }
}

impl DebugTextRenderer {
    fn write_frame(
        &self,
        out: &mut String,
        scene: &SceneSnapshot<'_>,
        view: &RenderView,
    ) -> std::fmt::Result {
        writeln!(
            out,
            "=== Scene (tick={}, t={:.2}s) ===",
            scene.tick, scene.elapsed_secs
        )?;
        writeln!(
            out,
            "Player: pos={} facing={:.2}",
            v3(scene.player.position),
            scene.player.facing
        )?;

        let sky = &scene.sky;
        let heading = if scene.cycle.target_night() { "night" } else { "day" };
        writeln!(
            out,
            "Cycle: mix={:.2} heading={} fog={} ambient={:.2} directional={:.2} lantern={:.2}",
            scene.cycle.mix(),
            heading,
            v3(sky.fog_color),
            sky.ambient_intensity,
            sky.directional_intensity,
            sky.lantern_intensity
        )?;
        let body = match sky.celestial.body {
            CelestialBody::Sun => "sun",
            CelestialBody::Moon => "moon",
        };
        writeln!(
            out,
            "Sky: {} at {}{}",
            body,
            v3(sky.celestial.position),
            if sky.celestial.visible { "" } else { " (below horizon)" }
        )?;
        writeln!(
            out,
            "Camera: eye={} look={} fov={:.0}",
            v3(scene.camera.position),
            v3(scene.camera.look_at),
            view.fov_degrees
        )?;

        writeln!(out, "Followers: {}", scene.followers.len())?;
        for f in &scene.followers {
            writeln!(
                out,
                "  [{}] {:?} pos={} facing={:.2} published={}",
                f.id,
                f.state,
                v3(f.pose.position),
                f.pose.facing,
                v3(f.published)
            )?;
        }

        writeln!(out, "Zones: {}", scene.zones.len())?;
        for z in &scene.zones {
            let mut flags = Vec::new();
            if z.near {
                flags.push("near");
            }
            if z.entered {
                flags.push("entered");
            }
            if z.spent {
                flags.push("spent");
            }
            writeln!(
                out,
                "  [{}] anchor=({:.2}, {:.2}) r={:.1} {}",
                z.id,
                z.anchor.x,
                z.anchor.y,
                z.radius,
                flags.join(" ")
            )?;
        }

        writeln!(out, "Scatter: {} trees", scene.scatter.len())?;
        if self.list_scatter {
            for tree in scene.scatter {
                writeln!(out, "  tree pos={} scale={:.2}", v3(tree.position), tree.scale)?;
            }
        }
        for landmark in scene.landmarks {
            writeln!(out, "Landmark: {} at {}", landmark.name, v3(landmark.position))?;
        }
        writeln!(
            out,
            "Fauna: {} birds, {} fireflies{}",
            scene.birds.len(),
            scene.fireflies.len(),
            if sky.fireflies_active { " (glowing)" } else { "" }
        )?;
        writeln!(out, "Audio: ambient volume {:.2}", scene.ambient_volume)?;

        for prompt in prompts(scene, &self.text) {
            writeln!(out, "UI[{:?}]: {}", prompt.slot, prompt.text.replace('\n', " / "))?;
        }
        Ok(())
    }
}
