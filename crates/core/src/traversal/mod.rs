use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, SonifyError};

/// Scan order used to visit image lines.
///
/// The circular variants are accepted by configuration parsing so that
/// settings files stay forward compatible, but every operation that would
/// need to traverse them fails with [`SonifyError::Unsupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
    CircleOutwards,
    CircleInwards,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::LeftToRight,
        Direction::RightToLeft,
        Direction::TopToBottom,
        Direction::BottomToTop,
        Direction::CircleOutwards,
        Direction::CircleInwards,
    ];

    /// Name used by the command line and configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::LeftToRight => "left-to-right",
            Direction::RightToLeft => "right-to-left",
            Direction::TopToBottom => "top-to-bottom",
            Direction::BottomToTop => "bottom-to-top",
            Direction::CircleOutwards => "circle-outwards",
            Direction::CircleInwards => "circle-inwards",
        }
    }

    /// Resolves the direction into a linear sweep over an image of the given
    /// size.
    pub fn sweep(&self, width: usize, height: usize) -> Result<LineSweep> {
        let (axis, reversed) = match self {
            Direction::LeftToRight => (Axis::Columns, false),
            Direction::RightToLeft => (Axis::Columns, true),
            Direction::TopToBottom => (Axis::Rows, false),
            Direction::BottomToTop => (Axis::Rows, true),
            Direction::CircleOutwards | Direction::CircleInwards => {
                return Err(SonifyError::unsupported(format!(
                    "`{self}` traversal is not implemented"
                )))
            }
        };

        let extent = match axis {
            Axis::Columns => width,
            Axis::Rows => height,
        };

        Ok(LineSweep {
            axis,
            reversed,
            extent,
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SonifyError;

    fn from_str(s: &str) -> Result<Self> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.as_str() == s)
            .ok_or_else(|| SonifyError::configuration(format!("invalid direction `{s}`")))
    }
}

/// Which family of lines a sweep visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// One line per column; brightness is averaged down the column.
    Columns,
    /// One line per row; brightness is averaged across the row.
    Rows,
}

/// A concrete, implemented traversal over one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSweep {
    pub axis: Axis,
    pub reversed: bool,
    /// Number of lines along the primary axis.
    pub extent: usize,
}

impl LineSweep {
    /// Image coordinate of the `order`-th visited line.
    pub fn line_at(&self, order: usize) -> usize {
        if self.reversed {
            self.extent - 1 - order
        } else {
            order
        }
    }

    /// Image coordinates in visiting order.
    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.extent).map(move |order| self.line_at(order))
    }
}

/// Number of samples emitted for every traversed line.
///
/// Both the engine and the playback cursor derive their line/sample mapping
/// from this function, so they always agree.
pub fn samples_per_unit(sample_rate: f32, seconds_per_unit: f32) -> usize {
    let raw = (f64::from(sample_rate) * f64::from(seconds_per_unit)).round();
    if raw.is_finite() && raw >= 1.0 {
        raw as usize
    } else {
        1
    }
}
