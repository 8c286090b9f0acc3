//! Backend-independent draw requests
//!
//! Plain data produced by the frame loop; the GPU pipeline turns it into
//! triangles. Labels are static and built once at startup.

use glam::IVec2;

use crate::consts::*;
use crate::settings::{DisplayParams, Settings};
use crate::sim::BobPositions;

/// A straight stroked segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: IVec2,
    pub to: IVec2,
    pub width: f32,
    pub color: [u8; 3],
}

/// A filled circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: IVec2,
    pub radius: f32,
    pub color: [u8; 3],
}

/// Everything drawn for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRequest {
    /// Full-frame fill
    pub background: [u8; 3],
    /// Pivot to bob 1, bob 1 to bob 2
    pub lines: [LineSegment; 2],
    /// Bob 1, bob 2
    pub circles: [Circle; 2],
}

impl DrawRequest {
    pub fn for_pendulum(bobs: &BobPositions, display: &DisplayParams) -> Self {
        let (bob1, bob2) = bobs.to_pixels();
        let rod = |from, to| LineSegment {
            from,
            to,
            width: display.rod_width,
            color: display.rod_color,
        };
        let bob = |center| Circle {
            center,
            radius: display.bob_radius,
            color: display.bob_color,
        };

        Self {
            background: display.background,
            lines: [rod(display.origin, bob1), rod(bob1, bob2)],
            circles: [bob(bob1), bob(bob2)],
        }
    }
}

/// Text blitted at a fixed offset
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Top-left corner in pixels
    pub position: IVec2,
    /// Font size in pixels
    pub size: f32,
    pub color: [u8; 3],
}

/// Title and instructions
pub fn static_labels(settings: &Settings) -> [Label; 2] {
    let color = settings.display.text_color;
    [
        Label {
            text: TITLE_TEXT.to_string(),
            position: IVec2::new(TITLE_POS.0, TITLE_POS.1),
            size: TITLE_SIZE,
            color,
        },
        Label {
            text: INSTRUCTIONS_TEXT.to_string(),
            position: IVec2::new(INSTRUCTIONS_POS.0, INSTRUCTIONS_POS.1),
            size: INSTRUCTIONS_SIZE,
            color,
        },
    ]
}
