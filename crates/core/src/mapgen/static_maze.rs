//! Decoder for hand-drawn mazes stored as fixed-width ASCII blocks.
//!
//! A maze file holds one or more blocks of exactly `height` lines, each `width` characters
//! wide. Blank lines between blocks are ignored. Glyphs:
//!
//! | glyph | meaning |
//! |---|---|
//! | `#` | wall |
//! | `.` or space | floor |
//! | `D` | closed door on floor |
//! | `m` | floor with a monster |
//! | `-` | floor with a random item |
//! | `~` | floor with the level's unique artifact |

use std::fs;
use std::io;
use std::mem;
use std::path::Path;

use thiserror::Error;

use crate::grid::Grid;
use crate::types::{Pos, Stationary, Terrain};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MazeMarker {
    Monster,
    Item,
    Artifact,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticMaze {
    pub width: usize,
    pub height: usize,
    rows: Vec<Vec<u8>>,
}

#[derive(Debug, Error)]
pub enum StaticMazeError {
    #[error("maze file contains no mazes")]
    Empty,
    #[error("line {line}: expected {expected} columns, found {found}")]
    LineWidth { line: usize, expected: usize, found: usize },
    #[error("line {line}, column {column}: unknown maze glyph {glyph:?}")]
    UnknownGlyph { line: usize, column: usize, glyph: char },
    #[error("maze {index} ends after {found} of {expected} rows")]
    Truncated { index: usize, expected: usize, found: usize },
    #[error("failed to read maze file")]
    Io(#[from] io::Error),
}

const GLYPHS: &[u8] = b"#. Dm-~";

impl StaticMaze {
    pub fn to_grid(&self) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        for (pos, glyph) in self.cells() {
            if glyph == b'#' {
                continue;
            }
            grid.set_terrain(pos, Terrain::Floor);
            if glyph == b'D' {
                grid.set_stationary(pos, Some(Stationary::ClosedDoor));
            }
        }
        grid
    }

    pub fn markers(&self) -> Vec<(Pos, MazeMarker)> {
        self.cells()
            .filter_map(|(pos, glyph)| {
                let marker = match glyph {
                    b'm' => MazeMarker::Monster,
                    b'-' => MazeMarker::Item,
                    b'~' => MazeMarker::Artifact,
                    _ => return None,
                };
                Some((pos, marker))
            })
            .collect()
    }

    fn cells(&self) -> impl Iterator<Item = (Pos, u8)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, &glyph)| (Pos { y: y as i32, x: x as i32 }, glyph))
        })
    }
}

pub fn parse_mazes(
    text: &str,
    width: usize,
    height: usize,
) -> Result<Vec<StaticMaze>, StaticMazeError> {
    let mut mazes = Vec::new();
    let mut rows: Vec<Vec<u8>> = Vec::with_capacity(height);

    for (line_index, raw_line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            if !rows.is_empty() {
                return Err(StaticMazeError::Truncated {
                    index: mazes.len(),
                    expected: height,
                    found: rows.len(),
                });
            }
            continue;
        }
        if let Some((column, glyph)) = line.chars().enumerate().find(|(_, c)| !is_glyph(*c)) {
            return Err(StaticMazeError::UnknownGlyph {
                line: line_number,
                column: column + 1,
                glyph,
            });
        }
        if line.len() != width {
            return Err(StaticMazeError::LineWidth {
                line: line_number,
                expected: width,
                found: line.len(),
            });
        }
        rows.push(line.as_bytes().to_vec());
        if rows.len() == height {
            mazes.push(StaticMaze { width, height, rows: mem::take(&mut rows) });
        }
    }

    if !rows.is_empty() {
        return Err(StaticMazeError::Truncated {
            index: mazes.len(),
            expected: height,
            found: rows.len(),
        });
    }
    if mazes.is_empty() {
        return Err(StaticMazeError::Empty);
    }
    Ok(mazes)
}

pub fn load_mazes(
    path: &Path,
    width: usize,
    height: usize,
) -> Result<Vec<StaticMaze>, StaticMazeError> {
    let text = fs::read_to_string(path)?;
    parse_mazes(&text, width, height)
}

fn is_glyph(c: char) -> bool {
    c.is_ascii() && GLYPHS.contains(&(c as u8))
}
