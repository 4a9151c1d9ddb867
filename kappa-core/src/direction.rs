use thiserror::Error;

/// Viewing direction of one photo in a panorama group.
///
/// The direction is encoded in the last digit of the sensor id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Front,
    Right,
    Back,
    Left,
    Down,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("sensor id {0} has no viewing direction (last digit must be 0..=5)")]
pub struct DirectionError(pub u64);

impl Direction {
    /// Derive the direction from a sensor id. Only the last digit matters.
    pub fn from_sensor_id(sensor_id: u64) -> Result<Self, DirectionError> {
        match sensor_id % 10 {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Front),
            2 => Ok(Direction::Right),
            3 => Ok(Direction::Back),
            4 => Ok(Direction::Left),
            5 => Ok(Direction::Down),
            _ => Err(DirectionError(sensor_id)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Front => "front",
            Direction::Right => "right",
            Direction::Back => "back",
            Direction::Left => "left",
            Direction::Down => "down",
        }
    }

    /// Human-readable asset title, e.g. "Front photo".
    pub fn title(&self) -> String {
        let label = self.label();
        let mut chars = label.chars();
        match chars.next() {
            Some(first) => format!("{}{} photo", first.to_uppercase(), chars.as_str()),
            None => "photo".to_string(),
        }
    }
}
