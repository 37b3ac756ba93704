//! Game mechanics: directions, walking and the camera that follows the player.

use serde::{Deserialize, Serialize};

/// Discrete movement input from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Which way the player sprite faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Facing {
    /// Facing the camera, used when standing still.
    #[default]
    Front,
    Left,
    Right,
}

/// Animation state of the player sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnimationState {
    #[default]
    Standing,
    Walking,
}

/// Rules for 1-D walking and proximity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementRules {
    /// Distance covered per move event.
    pub walk_speed: f32,
    /// The player can't get closer than this to either end of a deck.
    pub edge_margin: f32,
    /// Maximum distance (exclusive) at which something can be interacted with.
    pub interact_radius: f32,
}

impl Default for MovementRules {
    fn default() -> Self {
        Self {
            walk_speed: 3.0,
            edge_margin: 30.0,
            interact_radius: 35.0,
        }
    }
}

impl MovementRules {
    /// Clamp a position to the walkable range `[margin, width - margin]`.
    pub fn clamp(&self, x: f32, level_width: f32) -> f32 {
        x.max(self.edge_margin).min(level_width - self.edge_margin)
    }

    /// Position after one step in the given direction.
    ///
    /// Vertical directions don't move the player on a deck.
    pub fn step(&self, x: f32, direction: Direction, level_width: f32) -> f32 {
        match direction {
            Direction::Left => (x - self.walk_speed).max(self.edge_margin),
            Direction::Right => (x + self.walk_speed).min(level_width - self.edge_margin),
            Direction::Up | Direction::Down => x,
        }
    }

    /// Check whether something at `target_x` is in reach of the player.
    pub fn in_reach(&self, player_x: f32, target_x: f32) -> bool {
        (player_x - target_x).abs() < self.interact_radius
    }
}

/// Horizontal camera over a deck.
///
/// The offset is the deck x-coordinate at the left edge of the screen. It is
/// negative when a deck is narrower than the viewport and gets centered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub viewport_width: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
        }
    }
}

impl Camera {
    pub fn new(viewport_width: f32) -> Self {
        Self { viewport_width }
    }

    /// Offset used when entering a deck: centered on the player, clamped to the content.
    pub fn frame(&self, player_x: f32, level_width: f32) -> f32 {
        if level_width <= self.viewport_width {
            return self.centered(level_width);
        }
        self.clamp(player_x - self.viewport_width / 2.0, level_width)
    }

    /// Offset after the player moved, keeping them inside the middle third.
    pub fn follow(&self, offset: f32, player_x: f32, level_width: f32) -> f32 {
        if level_width <= self.viewport_width {
            return self.centered(level_width);
        }

        let third = self.viewport_width / 3.0;
        let screen_x = player_x - offset;
        let wanted = if screen_x < third {
            player_x - third
        } else if screen_x > 2.0 * third {
            player_x - 2.0 * third
        } else {
            offset
        };

        self.clamp(wanted, level_width)
    }

    fn centered(&self, level_width: f32) -> f32 {
        -(self.viewport_width - level_width) / 2.0
    }

    fn clamp(&self, offset: f32, level_width: f32) -> f32 {
        offset.max(0.0).min(level_width - self.viewport_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clamps_to_margins() {
        let rules = MovementRules::default();

        assert_eq!(rules.step(100.0, Direction::Right, 1000.0), 103.0);
        assert_eq!(rules.step(100.0, Direction::Left, 1000.0), 97.0);
        assert_eq!(rules.step(31.0, Direction::Left, 1000.0), 30.0);
        assert_eq!(rules.step(969.0, Direction::Right, 1000.0), 970.0);
        assert_eq!(rules.step(500.0, Direction::Up, 1000.0), 500.0);
    }

    #[test]
    fn test_reach_is_exclusive() {
        let rules = MovementRules::default();
        assert!(rules.in_reach(100.0, 134.0));
        assert!(!rules.in_reach(100.0, 135.0));
        assert!(rules.in_reach(100.0, 66.0));
    }

    #[test]
    fn test_narrow_deck_is_centered() {
        let camera = Camera::new(800.0);
        assert_eq!(camera.frame(100.0, 600.0), -100.0);
        assert_eq!(camera.follow(0.0, 500.0, 600.0), -100.0);
    }

    #[test]
    fn test_frame_clamps_to_content() {
        let camera = Camera::new(800.0);
        assert_eq!(camera.frame(100.0, 2000.0), 0.0);
        assert_eq!(camera.frame(1000.0, 2000.0), 600.0);
        assert_eq!(camera.frame(1950.0, 2000.0), 1200.0);
    }

    #[test]
    fn test_follow_dead_zone() {
        let camera = Camera::new(900.0);

        // Middle third of the screen: no movement
        assert_eq!(camera.follow(300.0, 900.0, 3000.0), 300.0);

        // Past the right third boundary the camera pans with the player
        assert_eq!(camera.follow(300.0, 910.0, 3000.0), 310.0);

        // Past the left boundary it pans back
        assert_eq!(camera.follow(300.0, 590.0, 3000.0), 290.0);

        // Never past the content bounds
        assert_eq!(camera.follow(0.0, 100.0, 3000.0), 0.0);
        assert_eq!(camera.follow(2100.0, 2990.0, 3000.0), 2100.0);
    }
}
