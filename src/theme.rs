//! Theme definitions for the topology panel
//!
//! Flat palette struct consumed by the engine when assigning node colors,
//! glow halos, and overlay tier ramps. Dark is the default; light exists for
//! hosts embedding the panel in a bright shell.

use eframe::egui::Color32;

use crate::glow::GlowKind;
use crate::scene::NodeKind;

/// Panel-wide color palette
#[derive(Clone, Copy)]
pub struct PanelTheme {
    /// Background color for the canvas
    pub canvas_bg: Color32,

    /// Grid line color
    pub grid_color: Color32,

    /// Room node fill
    pub node_room: Color32,

    /// User (connector) node fill
    pub node_user: Color32,

    /// Sensor node fill
    pub node_sensor: Color32,

    /// Attribute node fill
    pub node_attribute: Color32,

    /// Node outline
    pub node_stroke: Color32,

    /// Selected node highlight
    pub node_selected: Color32,

    /// Hovered node highlight
    pub node_hover: Color32,

    /// Structural edge color
    pub edge_color: Color32,

    /// Node label color
    pub label_color: Color32,

    /// Activity heatmap tiers, coldest to hottest
    pub heat_tiers: [Color32; 5],

    /// Freshness flash color (fresh event)
    pub fresh_flash: Color32,

    /// Attention level colors: high, medium, low, none
    pub attention_high: Color32,
    pub attention_medium: Color32,
    pub attention_low: Color32,
    pub attention_none: Color32,

    /// Glow halo palette
    pub glow_data: Color32,
    pub glow_attention: Color32,
    pub glow_heartbeat: Color32,
    pub glow_connect: Color32,
    pub glow_disconnect: Color32,

    /// River particle color
    pub river_particle: Color32,
}

impl PanelTheme {
    pub fn dark() -> Self {
        Self {
            canvas_bg: Color32::from_rgb(22, 24, 28), // #16181c
            grid_color: Color32::from_rgba_unmultiplied(255, 255, 255, 12),

            node_room: Color32::from_rgb(90, 98, 120),      // slate
            node_user: Color32::from_rgb(86, 156, 214),     // blue
            node_sensor: Color32::from_rgb(78, 201, 176),   // teal
            node_attribute: Color32::from_rgb(197, 134, 192), // violet
            node_stroke: Color32::from_rgb(60, 64, 72),

            node_selected: Color32::from_rgb(0, 120, 212),
            node_hover: Color32::from_rgb(130, 180, 255),

            edge_color: Color32::from_rgb(80, 86, 96),
            label_color: Color32::from_rgb(204, 204, 204),

            heat_tiers: [
                Color32::from_rgb(70, 90, 120),   // cold
                Color32::from_rgb(63, 185, 80),   // warm
                Color32::from_rgb(204, 167, 0),   // warmer
                Color32::from_rgb(255, 140, 60),  // hot
                Color32::from_rgb(248, 81, 73),   // hottest
            ],

            fresh_flash: Color32::from_rgb(255, 255, 210),

            attention_high: Color32::from_rgb(248, 81, 73),
            attention_medium: Color32::from_rgb(255, 180, 60),
            attention_low: Color32::from_rgb(204, 167, 0),
            attention_none: Color32::from_rgb(110, 118, 129),

            glow_data: Color32::from_rgb(100, 255, 150),
            glow_attention: Color32::from_rgb(255, 90, 80),
            glow_heartbeat: Color32::from_rgb(255, 120, 170),
            glow_connect: Color32::from_rgb(120, 200, 255),
            glow_disconnect: Color32::from_rgb(150, 150, 160),

            river_particle: Color32::from_rgb(120, 210, 255),
        }
    }

    pub fn light() -> Self {
        Self {
            canvas_bg: Color32::from_rgb(246, 247, 249),
            grid_color: Color32::from_rgba_unmultiplied(0, 0, 0, 12),

            node_room: Color32::from_rgb(130, 138, 158),
            node_user: Color32::from_rgb(0, 102, 184),
            node_sensor: Color32::from_rgb(18, 150, 120),
            node_attribute: Color32::from_rgb(150, 80, 145),
            node_stroke: Color32::from_rgb(180, 184, 190),

            node_selected: Color32::from_rgb(0, 120, 212),
            node_hover: Color32::from_rgb(60, 130, 220),

            edge_color: Color32::from_rgb(160, 166, 176),
            label_color: Color32::from_rgb(50, 50, 50),

            heat_tiers: [
                Color32::from_rgb(150, 170, 200),
                Color32::from_rgb(40, 160, 65),
                Color32::from_rgb(180, 145, 0),
                Color32::from_rgb(230, 120, 40),
                Color32::from_rgb(215, 58, 50),
            ],

            fresh_flash: Color32::from_rgb(255, 250, 160),

            attention_high: Color32::from_rgb(215, 58, 50),
            attention_medium: Color32::from_rgb(220, 150, 30),
            attention_low: Color32::from_rgb(180, 145, 0),
            attention_none: Color32::from_rgb(140, 148, 158),

            glow_data: Color32::from_rgb(40, 190, 100),
            glow_attention: Color32::from_rgb(225, 70, 60),
            glow_heartbeat: Color32::from_rgb(220, 80, 140),
            glow_connect: Color32::from_rgb(50, 150, 230),
            glow_disconnect: Color32::from_rgb(120, 120, 130),

            river_particle: Color32::from_rgb(50, 150, 230),
        }
    }

    /// Default fill for a node kind
    pub fn node_color(&self, kind: NodeKind) -> Color32 {
        match kind {
            NodeKind::Room => self.node_room,
            NodeKind::User => self.node_user,
            NodeKind::Sensor => self.node_sensor,
            NodeKind::Attribute => self.node_attribute,
        }
    }

    /// Halo color for a glow kind
    pub fn glow_color(&self, kind: GlowKind) -> Color32 {
        match kind {
            GlowKind::Data => self.glow_data,
            GlowKind::Attention => self.glow_attention,
            GlowKind::Heartbeat => self.glow_heartbeat,
            GlowKind::Connect => self.glow_connect,
            GlowKind::Disconnect => self.glow_disconnect,
        }
    }

    /// Heat tier color for a live event count
    pub fn heat_color(&self, tier: usize) -> Color32 {
        self.heat_tiers[tier.min(self.heat_tiers.len() - 1)]
    }
}

/// Lighten a color by a factor (0.0 - 1.0)
pub fn lighten(color: Color32, factor: f32) -> Color32 {
    let f = factor.clamp(0.0, 1.0);
    Color32::from_rgb(
        (color.r() as f32 + (255.0 - color.r() as f32) * f) as u8,
        (color.g() as f32 + (255.0 - color.g() as f32) * f) as u8,
        (color.b() as f32 + (255.0 - color.b() as f32) * f) as u8,
    )
}

/// Darken a color by a factor (0.0 - 1.0)
pub fn darken(color: Color32, factor: f32) -> Color32 {
    let f = 1.0 - factor.clamp(0.0, 1.0);
    Color32::from_rgb(
        (color.r() as f32 * f) as u8,
        (color.g() as f32 * f) as u8,
        (color.b() as f32 * f) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lighten_darken() {
        let c = Color32::from_rgb(100, 100, 100);
        let l = lighten(c, 0.5);
        let d = darken(c, 0.5);
        assert!(l.r() > c.r());
        assert!(d.r() < c.r());
    }

    #[test]
    fn test_heat_tier_clamps() {
        let theme = PanelTheme::dark();
        assert_eq!(theme.heat_color(99), theme.heat_tiers[4]);
    }
}
